//! Meta-classifier: maps meta-features to a recommended regression technique.
//!
//! A [`MetaClassifier`] is a decision tree trained on a corpus of
//! [`BestModelRow`]s produced by the evaluation harness. Given a table it
//! extracts the [`MetaFeatureVector`](crate::features::MetaFeatureVector)
//! and returns the registry name of the model expected to predict it best.
//!
//! # Examples
//!
//! ```
//! use runpredict::config::MetaClassifierConfig;
//! use runpredict::evaluation::BestModelRow;
//! use runpredict::features::MetaFeatureVector;
//! use runpredict::meta::MetaClassifier;
//! use runpredict::registry::ModelRegistry;
//! use runpredict::table::{ObservationTable, Schema};
//! use std::sync::Arc;
//!
//! let row = |size: f64, best: &str| BestModelRow {
//!     benchmark: "sort".to_string(),
//!     step: size as usize,
//!     features: MetaFeatureVector::from_array([size, 1.0, 10.0, 0.5, 0.9, 0.9, 0.8]),
//!     best_model: best.to_string(),
//! };
//! let corpus = vec![
//!     row(10.0, "LinReg"),
//!     row(20.0, "LinReg"),
//!     row(900.0, "kNN"),
//!     row(1000.0, "kNN"),
//! ];
//! let config = MetaClassifierConfig::default().with_pruning_folds(0);
//! let meta = MetaClassifier::train(Arc::new(ModelRegistry::standard()), &corpus, &config)
//!     .expect("non-empty corpus");
//!
//! let rows = (1..=12).map(|i| vec![i as f64, 3.0 * i as f64]).collect();
//! let schema = Schema::numeric(&["n"], "t").expect("unique names");
//! let table = ObservationTable::from_rows("t", schema, rows)
//!     .expect("valid rows");
//! assert_eq!(meta.recommend(&table).expect("known model"), "LinReg");
//! ```

mod tree;

pub use tree::{DecisionTreeClassifier, Leaf, Node, TreeNode};

use crate::config::MetaClassifierConfig;
use crate::error::{Result, RunpredictError};
use crate::evaluation::{read_corpus, BestModelRow};
use crate::features;
use crate::models::Regressor;
use crate::registry::ModelRegistry;
use crate::table::ObservationTable;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Serialized form of a trained classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SavedClassifier {
    classes: Vec<String>,
    tree: DecisionTreeClassifier,
}

/// Decision tree over meta-features predicting a registry model name.
#[derive(Debug, Clone)]
pub struct MetaClassifier {
    registry: Arc<ModelRegistry>,
    classes: Vec<String>,
    tree: DecisionTreeClassifier,
}

impl MetaClassifier {
    /// Fits the classifier from scratch on a best-model corpus.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InsufficientData`] for an empty corpus and
    /// [`RunpredictError::InvalidHyperparameter`] for an invalid config.
    #[instrument(skip_all, fields(rows = corpus.len()))]
    pub fn train(
        registry: Arc<ModelRegistry>,
        corpus: &[BestModelRow],
        config: &MetaClassifierConfig,
    ) -> Result<Self> {
        config.validate()?;
        if corpus.is_empty() {
            return Err(RunpredictError::insufficient("at least 1 corpus row", "0 rows"));
        }

        let mut classes: Vec<String> = Vec::new();
        let mut y = Vec::with_capacity(corpus.len());
        for row in corpus {
            let class = match classes.iter().position(|c| *c == row.best_model) {
                Some(idx) => idx,
                None => {
                    classes.push(row.best_model.clone());
                    classes.len() - 1
                }
            };
            y.push(class);
        }
        let x: Vec<Vec<f64>> = corpus.iter().map(|r| r.features.to_array().to_vec()).collect();

        let mut tree = DecisionTreeClassifier::new()
            .with_min_samples_leaf(config.min_samples_leaf)
            .with_max_depth(config.max_depth)
            .with_pruning_folds(config.pruning_folds)
            .with_seed(config.seed);
        tree.fit(&x, &y, classes.len())?;
        info!(
            classes = classes.len(),
            depth = tree.root().map_or(0, TreeNode::depth),
            "trained meta-classifier"
        );
        Ok(Self {
            registry,
            classes,
            tree,
        })
    }

    /// Trains on a corpus CSV written by the evaluation harness.
    ///
    /// # Errors
    ///
    /// Returns read errors of the corpus file and the errors of [`Self::train`].
    pub fn from_corpus_file<P: AsRef<Path>>(
        registry: Arc<ModelRegistry>,
        path: P,
        config: &MetaClassifierConfig,
    ) -> Result<Self> {
        let corpus = read_corpus(path)?;
        Self::train(registry, &corpus, config)
    }

    /// Recommends a registry model name for `table`.
    ///
    /// # Errors
    ///
    /// Returns the meta-feature extraction error for tables that are too
    /// small, and [`RunpredictError::UnknownModel`] if the predicted name is
    /// not in the registry.
    #[instrument(skip_all, fields(table = table.name(), rows = table.len()))]
    pub fn recommend(&self, table: &ObservationTable) -> Result<String> {
        let mf = features::extract(table)?;
        let class = self.tree.predict(&mf.to_array())?;
        let name = self
            .classes
            .get(class)
            .ok_or_else(|| RunpredictError::UnknownModel {
                name: format!("class #{class}"),
            })?;
        if !self.registry.contains(name) {
            return Err(RunpredictError::UnknownModel { name: name.clone() });
        }
        debug!(model = %name, "recommended model");
        Ok(name.clone())
    }

    /// Recommends a model and returns a fresh, untrained instance of it.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::recommend`].
    pub fn recommend_model(
        &self,
        table: &ObservationTable,
    ) -> Result<(String, Box<dyn Regressor>)> {
        let name = self.recommend(table)?;
        let model = self.registry.instantiate(&name)?;
        Ok((name, model))
    }

    /// The registry recommendations are resolved against.
    #[must_use]
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Model names the classifier can predict, in corpus order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// The underlying decision tree.
    #[must_use]
    pub fn tree(&self) -> &DecisionTreeClassifier {
        &self.tree
    }

    /// Writes the trained classifier as JSON.
    ///
    /// # Errors
    ///
    /// Returns an I/O or serialization error.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let saved = SavedClassifier {
            classes: self.classes.clone(),
            tree: self.tree.clone(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&saved)?)?;
        Ok(())
    }

    /// Reads a classifier written by [`Self::save_json`].
    ///
    /// # Errors
    ///
    /// Returns an I/O or serialization error, and
    /// [`RunpredictError::Format`] if the class names do not match the
    /// classes of the saved tree.
    pub fn load_json<P: AsRef<Path>>(registry: Arc<ModelRegistry>, path: P) -> Result<Self> {
        let saved: SavedClassifier = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        if saved.classes.len() != saved.tree.n_classes() {
            return Err(RunpredictError::Format {
                message: format!(
                    "saved classifier names {} classes but its tree has {}",
                    saved.classes.len(),
                    saved.tree.n_classes()
                ),
            });
        }
        Ok(Self {
            registry,
            classes: saved.classes,
            tree: saved.tree,
        })
    }
}

#[cfg(test)]
#[path = "meta_tests.rs"]
mod tests;
