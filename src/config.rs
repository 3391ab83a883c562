//! Configuration for the predictor, meta-classifier and evaluation harness.
//!
//! Every section has defaults matching the reference experiments and can be
//! loaded from JSON; missing fields fall back to their defaults.
//!
//! # Example
//!
//! ```
//! use runpredict::config::Settings;
//!
//! let settings = Settings::from_json_str(r#"{"predictor": {"retrain_threshold": 0.25}}"#)
//!     .expect("valid settings");
//! assert_eq!(settings.predictor.retrain_threshold, 0.25);
//! assert_eq!(settings.harness.test_size, 1000);
//! ```

use crate::error::{Result, RunpredictError};
use crate::metrics::ScoringMetric;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn invalid(param: &str, value: impl ToString, constraint: &str) -> RunpredictError {
    RunpredictError::InvalidHyperparameter {
        param: param.to_string(),
        value: value.to_string(),
        constraint: constraint.to_string(),
    }
}

fn validate_steps(param: &str, steps: &[usize], test_size: usize) -> Result<()> {
    if steps.is_empty() {
        return Err(invalid(param, "[]", "at least one step"));
    }
    if steps.contains(&0) {
        return Err(invalid(param, format!("{steps:?}"), "steps > 0"));
    }
    if steps.windows(2).any(|w| w[0] >= w[1]) {
        return Err(invalid(param, format!("{steps:?}"), "strictly increasing steps"));
    }
    if test_size == 0 {
        return Err(invalid("test_size", test_size, "> 0"));
    }
    Ok(())
}

/// Runtime predictor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Retrain once `untrained > trained × retrain_threshold`
    pub retrain_threshold: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            retrain_threshold: 0.1,
        }
    }
}

impl PredictorConfig {
    /// Sets the retrain threshold.
    #[must_use]
    pub fn with_retrain_threshold(mut self, threshold: f64) -> Self {
        self.retrain_threshold = threshold;
        self
    }

    /// Checks the settings.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InvalidHyperparameter`] for a negative or
    /// non-finite threshold.
    pub fn validate(&self) -> Result<()> {
        if self.retrain_threshold.is_finite() && self.retrain_threshold >= 0.0 {
            Ok(())
        } else {
            Err(invalid("retrain_threshold", self.retrain_threshold, "finite and >= 0"))
        }
    }
}

/// Decision tree settings of the meta-classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaClassifierConfig {
    /// Minimum corpus rows per leaf
    pub min_samples_leaf: usize,
    /// Maximum tree depth (root has depth 0)
    pub max_depth: Option<usize>,
    /// Reduced-error pruning holds out `1 / pruning_folds` of the corpus; 0 or 1 disables
    pub pruning_folds: usize,
    /// Seed of the pruning holdout split
    pub seed: u64,
}

impl Default for MetaClassifierConfig {
    fn default() -> Self {
        Self {
            min_samples_leaf: 2,
            max_depth: None,
            pruning_folds: 5,
            seed: 1,
        }
    }
}

impl MetaClassifierConfig {
    /// Sets the minimum rows per leaf.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, n: usize) -> Self {
        self.min_samples_leaf = n;
        self
    }

    /// Sets the maximum depth.
    #[must_use]
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the pruning folds.
    #[must_use]
    pub fn with_pruning_folds(mut self, folds: usize) -> Self {
        self.pruning_folds = folds;
        self
    }

    /// Sets the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks the settings.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InvalidHyperparameter`] for a zero leaf size.
    pub fn validate(&self) -> Result<()> {
        if self.min_samples_leaf == 0 {
            return Err(invalid("min_samples_leaf", 0, "> 0"));
        }
        Ok(())
    }
}

/// Stepwise evaluation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Training-set sizes, increasing
    pub steps: Vec<usize>,
    /// Rows reserved as the held-out slice
    pub test_size: usize,
    /// Shuffle seed
    pub seed: u64,
    /// Directory receiving the CSV outputs
    pub evaluation_dir: PathBuf,
    /// Metric that decides the best model per step
    pub scoring: ScoringMetric,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            steps: vec![10, 100, 1_000, 9_000],
            test_size: 1_000,
            seed: 1,
            evaluation_dir: PathBuf::from("evaluation"),
            scoring: ScoringMetric::Mae,
        }
    }
}

impl HarnessConfig {
    /// Sets the steps.
    #[must_use]
    pub fn with_steps(mut self, steps: Vec<usize>) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the held-out size.
    #[must_use]
    pub fn with_test_size(mut self, test_size: usize) -> Self {
        self.test_size = test_size;
        self
    }

    /// Sets the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_evaluation_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.evaluation_dir = dir.into();
        self
    }

    /// Sets the scoring metric.
    #[must_use]
    pub fn with_scoring(mut self, scoring: ScoringMetric) -> Self {
        self.scoring = scoring;
        self
    }

    /// Checks the settings.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InvalidHyperparameter`] for empty,
    /// non-increasing or zero steps and a zero test size.
    pub fn validate(&self) -> Result<()> {
        validate_steps("steps", &self.steps, self.test_size)
    }
}

/// Paired comparison settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Training-set sizes, increasing
    pub steps: Vec<usize>,
    /// Rows reserved as the held-out slice
    pub test_size: usize,
    /// Shuffle seed
    pub seed: u64,
    /// Registry name of the fixed model the recommendation is compared with
    pub baseline: String,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            steps: vec![20, 50, 200, 700, 2_000, 4_500, 7_500],
            test_size: 1_000,
            seed: 1,
            baseline: "SVR".to_string(),
        }
    }
}

impl ComparisonConfig {
    /// Sets the steps.
    #[must_use]
    pub fn with_steps(mut self, steps: Vec<usize>) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the held-out size.
    #[must_use]
    pub fn with_test_size(mut self, test_size: usize) -> Self {
        self.test_size = test_size;
        self
    }

    /// Sets the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the baseline model name.
    #[must_use]
    pub fn with_baseline(mut self, baseline: impl Into<String>) -> Self {
        self.baseline = baseline.into();
        self
    }

    /// Checks the settings.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InvalidHyperparameter`] for bad steps, a
    /// zero test size or an empty baseline name.
    pub fn validate(&self) -> Result<()> {
        validate_steps("steps", &self.steps, self.test_size)?;
        if self.baseline.is_empty() {
            return Err(invalid("baseline", "\"\"", "a model name"));
        }
        Ok(())
    }
}

/// All configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Runtime predictor
    pub predictor: PredictorConfig,
    /// Meta-classifier
    pub meta: MetaClassifierConfig,
    /// Stepwise evaluation
    pub harness: HarnessConfig,
    /// Paired comparison
    pub comparison: ComparisonConfig,
}

impl Settings {
    /// Parses and validates settings from JSON text.
    ///
    /// # Errors
    ///
    /// Returns a serialization error for malformed JSON and
    /// [`RunpredictError::InvalidHyperparameter`] for invalid values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads and validates settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, and the errors of
    /// [`Self::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first section's validation error.
    pub fn validate(&self) -> Result<()> {
        self.predictor.validate()?;
        self.meta.validate()?;
        self.harness.validate()?;
        self.comparison.validate()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
