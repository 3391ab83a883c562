//! Runpredict: adaptive model selection and online runtime prediction.
//!
//! Runpredict predicts the runtime (or any other scalar cost) of a
//! parameterized computation from a handful of observed measurements. It
//! characterizes the observations with meta-features, lets a
//! meta-classifier pick the regression technique expected to do best, and
//! keeps that model fresh as measurements arrive.
//!
//! # Quick Start
//!
//! ```
//! use runpredict::prelude::*;
//! use std::sync::Arc;
//!
//! // A corpus normally comes from `StepwiseEvaluation`
//! let corpus: Vec<BestModelRow> = (0..4)
//!     .map(|i| BestModelRow {
//!         benchmark: "sort".to_string(),
//!         step: 10 * (i + 1),
//!         features: MetaFeatureVector::from_array([
//!             10.0 * (i + 1) as f64,
//!             1.0,
//!             1.0,
//!             1.0,
//!             1.0,
//!             1.0,
//!             1.0,
//!         ]),
//!         best_model: "LinReg".to_string(),
//!     })
//!     .collect();
//! let registry = Arc::new(ModelRegistry::standard());
//! let meta = Arc::new(
//!     MetaClassifier::train(registry, &corpus, &MetaClassifierConfig::default())
//!         .expect("non-empty corpus"),
//! );
//!
//! let mut table = ObservationTable::new("sort", RuntimePredictor::empty_schema(1));
//! for n in 1..=30 {
//!     table.push(vec![n as f64, 4.0 * n as f64 + 2.0]).expect("valid row");
//! }
//! let mut predictor = RuntimePredictor::new(table, meta, PredictorConfig::default())
//!     .expect("trainable");
//! let runtime = predictor.predict(&[100.0]).expect("trained model");
//! assert!((runtime - 402.0).abs() < 1e-3);
//! ```
//!
//! # Modules
//!
//! - [`table`]: Observation tables, schemas and CSV/ARFF I/O
//! - [`stats`]: Descriptive statistics, correlation and t-tests
//! - [`metrics`]: Regression error metrics (MAE, MAPE, RMSE, RRSE)
//! - [`features`]: Meta-feature extraction
//! - [`models`]: The `Regressor` trait and the regression model families
//! - [`registry`]: Immutable catalogue of named models
//! - [`meta`]: Decision-tree meta-classifier
//! - [`predictor`]: Stateful runtime-prediction session
//! - [`evaluation`]: Stepwise evaluation and paired comparison
//! - [`simulation`]: Replay of recorded tables
//! - [`config`]: Settings loaded from JSON

pub mod config;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod meta;
pub mod metrics;
pub mod models;
pub mod predictor;
pub mod prelude;
pub mod primitives;
pub mod registry;
pub mod simulation;
pub mod stats;
pub mod table;

pub use error::{Result, RunpredictError};
