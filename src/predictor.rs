//! Stateful runtime-prediction session.
//!
//! A [`RuntimePredictor`] owns a growing [`ObservationTable`] and the model
//! currently serving predictions. Observations are absorbed without
//! retraining; the next prediction retrains (re-running the
//! meta-classifier's recommendation on the full table) once
//! `untrained > trained × retrain_threshold`.
//!
//! # Examples
//!
//! ```
//! use runpredict::config::PredictorConfig;
//! use runpredict::meta::MetaClassifier;
//! use runpredict::models::ModelSpec;
//! use runpredict::predictor::RuntimePredictor;
//! use runpredict::table::ObservationTable;
//! use std::sync::Arc;
//! # use runpredict::config::MetaClassifierConfig;
//! # use runpredict::evaluation::BestModelRow;
//! # use runpredict::features::MetaFeatureVector;
//! # use runpredict::registry::ModelRegistry;
//! # let corpus: Vec<BestModelRow> = (0..2).map(|i| BestModelRow {
//! #     benchmark: "b".into(), step: i,
//! #     features: MetaFeatureVector::from_array([i as f64; 7]),
//! #     best_model: "LinReg".into(),
//! # }).collect();
//! # let meta = Arc::new(MetaClassifier::train(
//! #     Arc::new(ModelRegistry::standard()), &corpus, &MetaClassifierConfig::default(),
//! # ).expect("non-empty corpus"));
//!
//! let mut table = ObservationTable::new("sort", RuntimePredictor::empty_schema(1));
//! for n in 1..=20 {
//!     table.push(vec![n as f64, 50.0 * n as f64]).expect("valid row");
//! }
//! let mut predictor = RuntimePredictor::new(table, meta, PredictorConfig::default())
//!     .expect("recommendation and training succeed");
//! predictor.add_observation_csv("21,1050").expect("well-formed line");
//! let runtime = predictor.predict_csv("30").expect("trained model");
//! assert!((runtime - 1500.0).abs() < 1e-3);
//! ```

use crate::config::PredictorConfig;
use crate::error::{Result, RunpredictError};
use crate::meta::MetaClassifier;
use crate::models::Regressor;
use crate::table::{ObservationTable, Schema};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Returned by the sentinel helpers when no prediction is available.
pub const UNAVAILABLE: f64 = -1.0;

/// Lifecycle state of a predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorState {
    /// The active model has not been trained yet
    Uninitialized,
    /// The active model reflects the table closely enough
    Trained,
    /// Enough observations arrived that the next prediction retrains
    Stale,
}

/// A runtime-prediction session over one observation table.
#[derive(Debug)]
pub struct RuntimePredictor {
    table: ObservationTable,
    model: Box<dyn Regressor>,
    model_name: String,
    meta: Arc<MetaClassifier>,
    config: PredictorConfig,
    trained: usize,
    untrained: usize,
}

impl RuntimePredictor {
    /// Recommends a model for `table` and trains it.
    ///
    /// # Errors
    ///
    /// Returns the recommendation or training error, or
    /// [`RunpredictError::InvalidHyperparameter`] for an invalid config.
    #[instrument(skip_all, fields(table = table.name(), rows = table.len()))]
    pub fn new(
        table: ObservationTable,
        meta: Arc<MetaClassifier>,
        config: PredictorConfig,
    ) -> Result<Self> {
        config.validate()?;
        let (model_name, mut model) = meta.recommend_model(&table)?;
        model.train(&table)?;
        info!(model = %model_name, "initial model trained");
        Ok(Self {
            trained: table.len(),
            untrained: 0,
            table,
            model,
            model_name,
            meta,
            config,
        })
    }

    /// Starts from an already chosen model, trained or not.
    ///
    /// Both counters start at zero, so the first absorbed observation makes
    /// the session stale. An untrained model is fitted on the table by the
    /// first prediction.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InvalidHyperparameter`] for an invalid config.
    pub fn with_model(
        table: ObservationTable,
        name: impl Into<String>,
        model: Box<dyn Regressor>,
        meta: Arc<MetaClassifier>,
        config: PredictorConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            table,
            model,
            model_name: name.into(),
            meta,
            config,
            trained: 0,
            untrained: 0,
        })
    }

    /// Monitoring schema `InputParam_0 … InputParam_{n-1}, Runtime(ns)`.
    #[must_use]
    pub fn empty_schema(n_inputs: usize) -> Schema {
        Schema::with_inputs(n_inputs)
    }

    /// Appends an encoded observation (inputs followed by the label).
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::SchemaMismatch`]; the row is not added.
    pub fn add_observation(&mut self, row: Vec<f64>) -> Result<()> {
        self.table.push(row)?;
        self.untrained += 1;
        Ok(())
    }

    /// Parses and appends a comma-separated observation including the label.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::SchemaMismatch`] for malformed tokens or
    /// wrong arity; the row is not added.
    pub fn add_observation_csv(&mut self, line: &str) -> Result<()> {
        let row = self.table.schema().parse_line(line, true)?;
        self.add_observation(row)
    }

    /// Returns true once `untrained > trained × retrain_threshold`.
    #[must_use]
    pub fn needs_retrain(&self) -> bool {
        self.untrained as f64 > self.trained as f64 * self.config.retrain_threshold
    }

    /// Re-runs the recommendation on the full table and trains a fresh model.
    ///
    /// On any failure the active model, its name and both counters are left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns the meta-feature, recommendation or training error.
    #[instrument(skip_all, fields(rows = self.table.len(), untrained = self.untrained))]
    pub fn retrain(&mut self) -> Result<()> {
        let (name, mut model) = self.meta.recommend_model(&self.table)?;
        model.train(&self.table)?;
        if name != self.model_name {
            info!(from = %self.model_name, to = %name, "switched model");
        }
        self.model = model;
        self.model_name = name;
        self.trained = self.table.len();
        self.untrained = 0;
        Ok(())
    }

    /// Fits the current model on the table without a new recommendation.
    fn train_active(&mut self) -> Result<()> {
        self.model.train(&self.table)?;
        self.trained = self.table.len();
        self.untrained = 0;
        debug!(model = %self.model_name, "trained favoured model");
        Ok(())
    }

    /// Predicts the label of an encoded input vector, retraining first when due.
    ///
    /// A failed retrain leaves the previous model and both counters in
    /// place, so the next call retries it.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::SchemaMismatch`] for an invalid vector, the
    /// error of a due [`Self::retrain`], or the training/prediction error of
    /// the active model.
    pub fn predict(&mut self, features: &[f64]) -> Result<f64> {
        self.table.schema().validate_inputs(features)?;
        if self.needs_retrain() {
            if let Err(e) = self.retrain() {
                warn!(error = %e, model = %self.model_name, "retrain failed; no prediction");
                return Err(e);
            }
        }
        if !self.model.is_trained() {
            self.train_active()?;
        }
        self.model.predict(features)
    }

    /// Parses a comma-separated input line (without label) and predicts it.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::SchemaMismatch`] for malformed lines and
    /// the errors of [`Self::predict`].
    pub fn predict_csv(&mut self, line: &str) -> Result<f64> {
        let features = self.table.schema().parse_line(line, false)?;
        self.predict(&features)
    }

    /// Like [`Self::predict`], returning [`UNAVAILABLE`] on failure.
    pub fn predict_or_unavailable(&mut self, features: &[f64]) -> f64 {
        self.predict(features).unwrap_or_else(|e| {
            warn!(error = %e, "prediction unavailable");
            UNAVAILABLE
        })
    }

    /// Like [`Self::predict_csv`], returning [`UNAVAILABLE`] on failure.
    pub fn predict_csv_or_unavailable(&mut self, line: &str) -> f64 {
        self.predict_csv(line).unwrap_or_else(|e| {
            warn!(error = %e, "prediction unavailable");
            UNAVAILABLE
        })
    }

    /// Predicts every non-empty line of a CSV file of input values.
    ///
    /// # Errors
    ///
    /// Returns a format error for a non-`.csv` path, an I/O error if the file
    /// cannot be read, and the first line's prediction error.
    pub fn predict_all_in_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Vec<f64>> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            return Err(RunpredictError::Format {
                message: format!("expected a .csv file, got {}", path.display()),
            });
        }
        let text = std::fs::read_to_string(path)?;
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| self.predict_csv(line))
            .collect()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PredictorState {
        if !self.model.is_trained() {
            PredictorState::Uninitialized
        } else if self.needs_retrain() {
            PredictorState::Stale
        } else {
            PredictorState::Trained
        }
    }

    /// Table size at the last retrain.
    #[must_use]
    pub fn trained(&self) -> usize {
        self.trained
    }

    /// Observations absorbed since the last retrain.
    #[must_use]
    pub fn untrained(&self) -> usize {
        self.untrained
    }

    /// Registry name of the model serving predictions.
    #[must_use]
    pub fn active_model(&self) -> &str {
        &self.model_name
    }

    /// The observation table.
    #[must_use]
    pub fn table(&self) -> &ObservationTable {
        &self.table
    }
}

#[cfg(test)]
#[path = "predictor_tests.rs"]
mod tests;
