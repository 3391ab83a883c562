//! Immutable catalogue of named regression models.
//!
//! A [`ModelRegistry`] maps unique names to [`ModelSpec`]s. It is built once
//! (the standard catalogue, an explicit descriptor list or a JSON file) and
//! then shared read-only; every training cycle asks it for a fresh instance.
//!
//! # Examples
//!
//! ```
//! use runpredict::registry::ModelRegistry;
//!
//! let registry = ModelRegistry::standard();
//! assert!(registry.contains("SVR"));
//! let model = registry.instantiate("kNN").expect("standard model");
//! assert!(!model.is_trained());
//! ```

use crate::error::{Result, RunpredictError};
use crate::models::{Kernel, ModelSpec, Regressor, SgdLoss};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A unique name bound to a model family and its hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Registry key, also the label the meta-classifier predicts
    pub name: String,
    /// Factory for fresh instances
    pub spec: ModelSpec,
}

impl ModelDescriptor {
    /// Creates a descriptor.
    pub fn new(name: impl Into<String>, spec: ModelSpec) -> Self {
        Self {
            name: name.into(),
            spec,
        }
    }
}

/// Ordered, immutable set of model descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ModelDescriptor>", into = "Vec<ModelDescriptor>")]
pub struct ModelRegistry {
    descriptors: Vec<ModelDescriptor>,
}

impl ModelRegistry {
    /// The standard catalogue: `ZeroR`, `LinReg`, `RandomF`, `SVR`, `kNN`,
    /// `ANN`, `SGD`, `Bagging`, `M5` and `CART`.
    #[must_use]
    pub fn standard() -> Self {
        let descriptors = vec![
            ModelDescriptor::new("ZeroR", ModelSpec::Mean),
            ModelDescriptor::new("LinReg", ModelSpec::Linear { ridge: 1e-8 }),
            ModelDescriptor::new(
                "RandomF",
                ModelSpec::RandomForest {
                    n_trees: 250,
                    max_depth: None,
                    max_features: None,
                    seed: 1,
                },
            ),
            ModelDescriptor::new(
                "SVR",
                ModelSpec::Kernel {
                    kernel: Kernel::Linear,
                    lambda: 1.0,
                    max_train_rows: 2_000,
                    seed: 1,
                },
            ),
            ModelDescriptor::new(
                "kNN",
                ModelSpec::Neighbors {
                    k: 5,
                    select_k_by_loo: true,
                    distance_weighted: true,
                },
            ),
            ModelDescriptor::new(
                "ANN",
                ModelSpec::Neural {
                    hidden: None,
                    learning_rate: 0.1,
                    momentum: 0.2,
                    epochs: 2_000,
                    seed: 1,
                },
            ),
            ModelDescriptor::new(
                "SGD",
                ModelSpec::Sgd {
                    learning_rate: 0.01,
                    epochs: 500,
                    lambda: 1e-4,
                    loss: SgdLoss::Huber,
                    seed: 1,
                },
            ),
            ModelDescriptor::new(
                "Bagging",
                ModelSpec::Bagging {
                    n_bags: 25,
                    max_depth: None,
                    min_samples_leaf: 2,
                    seed: 1,
                },
            ),
            ModelDescriptor::new(
                "M5",
                ModelSpec::ModelTree {
                    max_depth: None,
                    min_samples_leaf: 4,
                    ridge: 1e-8,
                },
            ),
            ModelDescriptor::new(
                "CART",
                ModelSpec::Tree {
                    max_depth: None,
                    min_samples_leaf: 2,
                },
            ),
        ];
        Self { descriptors }
    }

    /// Builds a registry from explicit descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InvalidHyperparameter`] for an empty list,
    /// a repeated name or an invalid spec.
    pub fn from_descriptors(descriptors: Vec<ModelDescriptor>) -> Result<Self> {
        if descriptors.is_empty() {
            return Err(RunpredictError::InvalidHyperparameter {
                param: "descriptors".to_string(),
                value: "[]".to_string(),
                constraint: "at least one model".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for descriptor in &descriptors {
            if !seen.insert(descriptor.name.as_str()) {
                return Err(RunpredictError::InvalidHyperparameter {
                    param: "name".to_string(),
                    value: descriptor.name.clone(),
                    constraint: "unique model name".to_string(),
                });
            }
            descriptor.spec.validate()?;
        }
        Ok(Self { descriptors })
    }

    /// Reads a JSON array of descriptors.
    ///
    /// # Errors
    ///
    /// Returns an I/O or serialization error for unreadable files, and the
    /// errors of [`Self::from_descriptors`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let descriptors: Vec<ModelDescriptor> = serde_json::from_str(&text)?;
        Self::from_descriptors(descriptors)
    }

    /// Model names in catalogue order.
    #[must_use]
    pub fn list_models(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    /// Descriptors in catalogue order.
    #[must_use]
    pub fn descriptors(&self) -> &[ModelDescriptor] {
        &self.descriptors
    }

    /// Looks up a descriptor by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModelDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of registered models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true for a registry without models.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Builds a fresh, untrained instance of the named model.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::UnknownModel`] if `name` is not registered.
    pub fn instantiate(&self, name: &str) -> Result<Box<dyn Regressor>> {
        let descriptor = self.get(name).ok_or_else(|| RunpredictError::UnknownModel {
            name: name.to_string(),
        })?;
        descriptor.spec.build()
    }
}

impl TryFrom<Vec<ModelDescriptor>> for ModelRegistry {
    type Error = RunpredictError;

    fn try_from(descriptors: Vec<ModelDescriptor>) -> Result<Self> {
        Self::from_descriptors(descriptors)
    }
}

impl From<ModelRegistry> for Vec<ModelDescriptor> {
    fn from(registry: ModelRegistry) -> Self {
        registry.descriptors
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
