//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use runpredict::prelude::*;
//! ```

pub use crate::config::{
    ComparisonConfig, HarnessConfig, MetaClassifierConfig, PredictorConfig, Settings,
};
pub use crate::error::{Result, RunpredictError};
pub use crate::evaluation::{cross_validate, BestModelRow, PairedComparison, StepwiseEvaluation};
pub use crate::features::{extract, MetaFeatureVector};
pub use crate::meta::MetaClassifier;
pub use crate::metrics::{RegressionMetrics, ScoringMetric};
pub use crate::models::{ModelSpec, Regressor};
pub use crate::predictor::{PredictorState, RuntimePredictor, UNAVAILABLE};
pub use crate::registry::{ModelDescriptor, ModelRegistry};
pub use crate::table::{Attribute, ObservationTable, Schema};
