//! Replays a recorded table into a [`RuntimePredictor`].
//!
//! The first rows seed the predictor; later rows are fed one by one as if
//! they were arriving measurements, and any not yet seen row can be
//! predicted and compared with its recorded label.

use crate::config::PredictorConfig;
use crate::error::{Result, RunpredictError};
use crate::meta::MetaClassifier;
use crate::predictor::RuntimePredictor;
use crate::table::{io, ObservationTable};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Replay of a recorded table.
#[derive(Debug)]
pub struct Simulation {
    source: ObservationTable,
    meta: Arc<MetaClassifier>,
    config: PredictorConfig,
    predictor: Option<RuntimePredictor>,
    next: usize,
}

impl Simulation {
    /// Creates a replay of `source`.
    #[must_use]
    pub fn new(
        source: ObservationTable,
        meta: Arc<MetaClassifier>,
        config: PredictorConfig,
    ) -> Self {
        Self {
            source,
            meta,
            config,
            predictor: None,
            next: 0,
        }
    }

    /// Loads the recorded table from a CSV or ARFF file.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`io::load`].
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        meta: Arc<MetaClassifier>,
        config: PredictorConfig,
    ) -> Result<Self> {
        Ok(Self::new(io::load(path)?, meta, config))
    }

    fn ensure_rows(&self, end: usize) -> Result<()> {
        if end > self.source.len() {
            return Err(RunpredictError::insufficient(
                format!("{end} recorded rows"),
                format!("{} rows", self.source.len()),
            ));
        }
        Ok(())
    }

    fn predictor_mut(&mut self) -> Result<&mut RuntimePredictor> {
        self.predictor
            .as_mut()
            .ok_or_else(|| RunpredictError::prediction("simulation has not been started"))
    }

    /// Seeds a new predictor with the first `batch` rows.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InsufficientData`] if the table is shorter
    /// than `batch`, and the errors of [`RuntimePredictor::new`].
    pub fn start(&mut self, batch: usize) -> Result<&RuntimePredictor> {
        self.ensure_rows(batch)?;
        let seed = self.source.slice(0, batch)?;
        let predictor = RuntimePredictor::new(seed, Arc::clone(&self.meta), self.config.clone())?;
        info!(batch, model = predictor.active_model(), "simulation started");
        self.next = batch;
        Ok(self.predictor.insert(predictor))
    }

    /// Feeds the next `n` recorded rows.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InsufficientData`] if fewer than `n` rows
    /// remain (nothing is fed), or a prediction error before [`Self::start`].
    pub fn add_next(&mut self, n: usize) -> Result<()> {
        let end = self.next + n;
        self.ensure_rows(end)?;
        let rows: Vec<Vec<f64>> = (self.next..end).map(|i| self.source.row(i).to_vec()).collect();
        let predictor = self.predictor_mut()?;
        for row in rows {
            predictor.add_observation(row)?;
        }
        self.next = end;
        Ok(())
    }

    /// Feeds every row up to index `k` and predicts row `k + 1`.
    ///
    /// Returns `(predicted, recorded)`.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InsufficientData`] if row `k + 1` was
    /// already learned or does not exist, and the prediction error otherwise.
    pub fn predict_after(&mut self, k: usize) -> Result<(f64, f64)> {
        let target = k + 1;
        if target < self.next {
            return Err(RunpredictError::insufficient(
                format!("an unseen row (row {target} has already been learned)"),
                format!("{} learned rows", self.next),
            ));
        }
        self.ensure_rows(target + 1)?;
        self.add_next(target - self.next)?;
        let features = self.source.features(target).to_vec();
        let recorded = self.source.label(target);
        let predicted = self.predictor_mut()?.predict(&features)?;
        Ok((predicted, recorded))
    }

    /// Index of the next row to be fed.
    #[must_use]
    pub fn position(&self) -> usize {
        self.next
    }

    /// The running predictor, once started.
    #[must_use]
    pub fn predictor(&self) -> Option<&RuntimePredictor> {
        self.predictor.as_ref()
    }
}

#[cfg(test)]
#[path = "simulation_tests.rs"]
mod tests;
