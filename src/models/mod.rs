//! Regression model families behind one capability trait.
//!
//! Every family implements [`Regressor`]: train on a labeled
//! [`ObservationTable`], predict a scalar for a feature vector, describe
//! itself. A [`ModelSpec`] names a family together with its
//! hyperparameters and acts as the factory for fresh, untrained instances.
//!
//! | Spec | Type |
//! |------|------|
//! | [`ModelSpec::Mean`] | [`MeanRegressor`] |
//! | [`ModelSpec::Linear`] | [`LinearRegression`] |
//! | [`ModelSpec::Tree`] | [`RegressionTree`] |
//! | [`ModelSpec::RandomForest`] | [`RandomForestRegressor`] |
//! | [`ModelSpec::Kernel`] | [`KernelRidge`] |
//! | [`ModelSpec::Neighbors`] | [`KNearestNeighbors`] |
//! | [`ModelSpec::Neural`] | [`MultilayerPerceptron`] |
//! | [`ModelSpec::Sgd`] | [`SgdRegressor`] |
//! | [`ModelSpec::Bagging`] | [`BaggingRegressor`] |
//!
//! # Example
//!
//! ```
//! use runpredict::models::{ModelSpec, Regressor};
//! use runpredict::table::{ObservationTable, Schema};
//!
//! let rows = (0..20).map(|i| vec![i as f64, 3.0 * i as f64 + 1.0]).collect();
//! let schema = Schema::numeric(&["n"], "t").expect("unique names");
//! let table = ObservationTable::from_rows("linear", schema, rows)
//!     .expect("valid rows");
//!
//! let mut model = ModelSpec::Linear { ridge: 1e-8 }.build().expect("valid spec");
//! model.train(&table).expect("enough rows");
//! let y = model.predict(&[30.0]).expect("trained");
//! assert!((y - 91.0).abs() < 1e-3);
//! ```

mod bagging;
mod forest;
mod kernel;
mod linear;
mod mean;
mod model_tree;
mod neighbors;
mod neural;
mod preprocess;
mod sgd;
mod tree;

pub use bagging::BaggingRegressor;
pub use forest::RandomForestRegressor;
pub use kernel::{Kernel, KernelRidge};
pub use linear::LinearRegression;
pub use mean::MeanRegressor;
pub use model_tree::ModelTree;
pub use neighbors::KNearestNeighbors;
pub use neural::MultilayerPerceptron;
pub use preprocess::{Preprocessor, Scaling};
pub use sgd::{SgdLoss, SgdRegressor};
pub use tree::RegressionTree;

pub(crate) use linear::least_squares;

use crate::error::{Result, RunpredictError};
use crate::metrics::RegressionMetrics;
use crate::table::ObservationTable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A regression technique that can be trained on a table and queried.
pub trait Regressor: fmt::Debug + Send {
    /// Fits the model to every row of `table`.
    ///
    /// The fitted state is replaced only on success; a failed call leaves a
    /// previously trained model usable.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InsufficientData`] for too few rows and
    /// [`RunpredictError::Training`] when the fit itself fails.
    fn train(&mut self, table: &ObservationTable) -> Result<()>;

    /// Predicts the label for one input vector (without label).
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::Prediction`] if the model is untrained or
    /// the vector has the wrong arity.
    fn predict(&self, features: &[f64]) -> Result<f64>;

    /// Short human readable description including hyperparameters.
    fn describe(&self) -> String;

    /// Returns true once `train` has succeeded.
    fn is_trained(&self) -> bool;

    /// Scores the model on a labeled table.
    ///
    /// # Errors
    ///
    /// Propagates prediction errors and fails on an empty table.
    fn evaluate(&self, table: &ObservationTable) -> Result<RegressionMetrics> {
        let predictions = (0..table.len())
            .map(|i| self.predict(table.features(i)))
            .collect::<Result<Vec<f64>>>()?;
        RegressionMetrics::compute(&predictions, &table.labels())
    }
}

/// Model family plus hyperparameters; builds fresh untrained instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    /// Predicts the training mean
    Mean,
    /// Least squares on standardized inputs
    Linear {
        /// Ridge penalty added to the normal equations
        ridge: f64,
    },
    /// Single regression tree
    Tree {
        /// Maximum depth (root is depth 0)
        max_depth: Option<usize>,
        /// Minimum rows per leaf
        min_samples_leaf: usize,
    },
    /// Random forest of regression trees
    RandomForest {
        /// Number of trees
        n_trees: usize,
        /// Maximum depth of each tree
        max_depth: Option<usize>,
        /// Features tried per split (`None` = log2(p) + 1)
        max_features: Option<usize>,
        /// Bootstrap seed
        seed: u64,
    },
    /// Kernel ridge regression
    Kernel {
        /// Kernel function
        kernel: Kernel,
        /// Regularization strength
        lambda: f64,
        /// Largest training set solved in the dual; larger tables are subsampled
        max_train_rows: usize,
        /// Subsampling seed
        seed: u64,
    },
    /// k nearest neighbours
    Neighbors {
        /// Number of neighbours (upper bound when selecting by leave-one-out)
        k: usize,
        /// Pick the best `k' <= k` by leave-one-out error
        select_k_by_loo: bool,
        /// Weight neighbours by inverse distance
        distance_weighted: bool,
    },
    /// One-hidden-layer perceptron
    Neural {
        /// Hidden units (`None` = (inputs + 1) / 2)
        hidden: Option<usize>,
        /// Step size
        learning_rate: f64,
        /// Momentum
        momentum: f64,
        /// Passes over the training set
        epochs: usize,
        /// Weight initialization seed
        seed: u64,
    },
    /// Linear model fitted by stochastic gradient descent
    Sgd {
        /// Step size
        learning_rate: f64,
        /// Passes over the training set
        epochs: usize,
        /// L2 penalty
        lambda: f64,
        /// Loss function
        loss: SgdLoss,
        /// Shuffling seed
        seed: u64,
    },
    /// Bagged regression trees
    Bagging {
        /// Number of bootstrap bags
        n_bags: usize,
        /// Maximum depth of each tree
        max_depth: Option<usize>,
        /// Minimum rows per leaf
        min_samples_leaf: usize,
        /// Bootstrap seed
        seed: u64,
    },
    /// Regression tree with a least-squares model in every leaf
    ModelTree {
        /// Maximum depth (root is depth 0)
        max_depth: Option<usize>,
        /// Minimum rows per leaf
        min_samples_leaf: usize,
        /// Ridge penalty of the leaf fits
        ridge: f64,
    },
}

fn invalid(param: &str, value: impl fmt::Display, constraint: &str) -> RunpredictError {
    RunpredictError::InvalidHyperparameter {
        param: param.to_string(),
        value: value.to_string(),
        constraint: constraint.to_string(),
    }
}

fn require_positive(param: &str, value: usize) -> Result<()> {
    if value == 0 {
        Err(invalid(param, value, "> 0"))
    } else {
        Ok(())
    }
}

fn require_finite_non_negative(param: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(param, value, "finite and >= 0"))
    }
}

impl ModelSpec {
    /// Family name used in logs and error messages.
    #[must_use]
    pub fn family(&self) -> &'static str {
        match self {
            ModelSpec::Mean => "mean",
            ModelSpec::Linear { .. } => "linear regression",
            ModelSpec::Tree { .. } => "regression tree",
            ModelSpec::RandomForest { .. } => "random forest",
            ModelSpec::Kernel { .. } => "kernel ridge",
            ModelSpec::Neighbors { .. } => "nearest neighbours",
            ModelSpec::Neural { .. } => "multilayer perceptron",
            ModelSpec::Sgd { .. } => "sgd linear",
            ModelSpec::Bagging { .. } => "bagged trees",
            ModelSpec::ModelTree { .. } => "model tree",
        }
    }

    /// Checks hyperparameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InvalidHyperparameter`] for out of range values.
    pub fn validate(&self) -> Result<()> {
        match self {
            ModelSpec::Mean => Ok(()),
            ModelSpec::Linear { ridge } => require_finite_non_negative("ridge", *ridge),
            ModelSpec::Tree {
                min_samples_leaf, ..
            } => require_positive("min_samples_leaf", *min_samples_leaf),
            ModelSpec::RandomForest {
                n_trees,
                max_features,
                ..
            } => {
                require_positive("n_trees", *n_trees)?;
                match max_features {
                    Some(0) => Err(invalid("max_features", 0, "> 0")),
                    _ => Ok(()),
                }
            }
            ModelSpec::Kernel {
                kernel,
                lambda,
                max_train_rows,
                ..
            } => {
                if !(lambda.is_finite() && *lambda > 0.0) {
                    return Err(invalid("lambda", lambda, "finite and > 0"));
                }
                require_positive("max_train_rows", *max_train_rows)?;
                kernel.validate()
            }
            ModelSpec::Neighbors { k, .. } => require_positive("k", *k),
            ModelSpec::Neural {
                hidden,
                learning_rate,
                momentum,
                epochs,
                ..
            } => {
                if *hidden == Some(0) {
                    return Err(invalid("hidden", 0, "> 0"));
                }
                if !(learning_rate.is_finite() && *learning_rate > 0.0) {
                    return Err(invalid("learning_rate", learning_rate, "finite and > 0"));
                }
                if !(0.0..1.0).contains(momentum) {
                    return Err(invalid("momentum", momentum, "in [0, 1)"));
                }
                require_positive("epochs", *epochs)
            }
            ModelSpec::Sgd {
                learning_rate,
                epochs,
                lambda,
                ..
            } => {
                if !(learning_rate.is_finite() && *learning_rate > 0.0) {
                    return Err(invalid("learning_rate", learning_rate, "finite and > 0"));
                }
                require_finite_non_negative("lambda", *lambda)?;
                require_positive("epochs", *epochs)
            }
            ModelSpec::Bagging {
                n_bags,
                min_samples_leaf,
                ..
            } => {
                require_positive("n_bags", *n_bags)?;
                require_positive("min_samples_leaf", *min_samples_leaf)
            }
            ModelSpec::ModelTree {
                min_samples_leaf,
                ridge,
                ..
            } => {
                require_positive("min_samples_leaf", *min_samples_leaf)?;
                require_finite_non_negative("ridge", *ridge)
            }
        }
    }

    /// Builds a fresh, untrained instance.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InvalidHyperparameter`] for an invalid spec.
    pub fn build(&self) -> Result<Box<dyn Regressor>> {
        self.validate()?;
        let model: Box<dyn Regressor> = match self.clone() {
            ModelSpec::Mean => Box::new(MeanRegressor::new()),
            ModelSpec::Linear { ridge } => Box::new(LinearRegression::new().with_ridge(ridge)),
            ModelSpec::Tree {
                max_depth,
                min_samples_leaf,
            } => Box::new(
                RegressionTree::new()
                    .with_max_depth(max_depth)
                    .with_min_samples_leaf(min_samples_leaf),
            ),
            ModelSpec::RandomForest {
                n_trees,
                max_depth,
                max_features,
                seed,
            } => Box::new(
                RandomForestRegressor::new(n_trees)
                    .with_max_depth(max_depth)
                    .with_max_features(max_features)
                    .with_seed(seed),
            ),
            ModelSpec::Kernel {
                kernel,
                lambda,
                max_train_rows,
                seed,
            } => Box::new(
                KernelRidge::new(kernel)
                    .with_lambda(lambda)
                    .with_max_train_rows(max_train_rows)
                    .with_seed(seed),
            ),
            ModelSpec::Neighbors {
                k,
                select_k_by_loo,
                distance_weighted,
            } => Box::new(
                KNearestNeighbors::new(k)
                    .with_loo_selection(select_k_by_loo)
                    .with_distance_weighting(distance_weighted),
            ),
            ModelSpec::Neural {
                hidden,
                learning_rate,
                momentum,
                epochs,
                seed,
            } => Box::new(
                MultilayerPerceptron::new()
                    .with_hidden(hidden)
                    .with_learning_rate(learning_rate)
                    .with_momentum(momentum)
                    .with_epochs(epochs)
                    .with_seed(seed),
            ),
            ModelSpec::Sgd {
                learning_rate,
                epochs,
                lambda,
                loss,
                seed,
            } => Box::new(
                SgdRegressor::new(loss)
                    .with_learning_rate(learning_rate)
                    .with_epochs(epochs)
                    .with_lambda(lambda)
                    .with_seed(seed),
            ),
            ModelSpec::Bagging {
                n_bags,
                max_depth,
                min_samples_leaf,
                seed,
            } => Box::new(
                BaggingRegressor::new(n_bags)
                    .with_max_depth(max_depth)
                    .with_min_samples_leaf(min_samples_leaf)
                    .with_seed(seed),
            ),
            ModelSpec::ModelTree {
                max_depth,
                min_samples_leaf,
                ridge,
            } => Box::new(
                ModelTree::new()
                    .with_max_depth(max_depth)
                    .with_min_samples_leaf(min_samples_leaf)
                    .with_ridge(ridge),
            ),
        };
        Ok(model)
    }
}

/// Fails with [`RunpredictError::InsufficientData`] below `min_rows`.
pub(crate) fn require_rows(table: &ObservationTable, min_rows: usize, model: &str) -> Result<()> {
    if table.len() < min_rows {
        return Err(RunpredictError::insufficient(
            format!("{model} needs at least {min_rows} rows"),
            format!("{} rows", table.len()),
        ));
    }
    Ok(())
}

/// Checks the arity of a feature vector against the trained width.
pub(crate) fn check_arity(features: &[f64], n_inputs: usize) -> Result<()> {
    if features.len() != n_inputs {
        return Err(RunpredictError::prediction(format!(
            "expected {n_inputs} input values, got {}",
            features.len()
        )));
    }
    Ok(())
}

pub(crate) fn not_trained(model: &str) -> RunpredictError {
    RunpredictError::prediction(format!("{model} has not been trained"))
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
