//! Evaluation harness: builds and validates the meta-classifier's policy.
//!
//! [`StepwiseEvaluation`] trains every catalogue model on growing training
//! slices of benchmark tables and records which one wins each step; the
//! winners form the corpus the [`MetaClassifier`](crate::meta::MetaClassifier)
//! learns from. [`PairedComparison`] then tests whether the classifier's picks
//! beat a fixed baseline model. [`cross_validate`] tracks the k-fold error of
//! a single model as its training data grows.

mod comparison;
mod cross_validation;
mod stepwise;

pub use comparison::{ComparisonReport, ComparisonSample, PairedComparison};
pub use cross_validation::{cross_validate, CrossValidationSummary};
pub use stepwise::{StepwiseEvaluation, StepwiseReport};

use crate::error::Result;
use crate::features::MetaFeatureVector;
use crate::metrics::RegressionMetrics;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Error summary of one model trained on one step of one benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Benchmark table name
    pub benchmark: String,
    /// Training-set size
    pub step: usize,
    /// Registry name of the model
    pub model: String,
    /// True for the row added for the meta-classifier's pick
    pub recommended: bool,
    /// Wall-clock training time in microseconds
    pub train_micros: u64,
    /// Mean absolute error
    pub mae: f64,
    /// Mean absolute percentage error (percent)
    pub mape: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Root relative squared error (percent)
    pub rrse: f64,
    /// Correlation of predictions with actual values
    pub correlation: f64,
}

impl EvaluationRecord {
    pub(crate) fn new(
        benchmark: &str,
        step: usize,
        model: &str,
        recommended: bool,
        train_micros: u64,
        metrics: RegressionMetrics,
    ) -> Self {
        Self {
            benchmark: benchmark.to_string(),
            step,
            model: model.to_string(),
            recommended,
            train_micros,
            mae: metrics.mae,
            mape: metrics.mape,
            rmse: metrics.rmse,
            rrse: metrics.rrse,
            correlation: metrics.correlation,
        }
    }

    /// The metrics part of the record.
    #[must_use]
    pub fn metrics(&self) -> RegressionMetrics {
        RegressionMetrics {
            mae: self.mae,
            mape: self.mape,
            rmse: self.rmse,
            rrse: self.rrse,
            correlation: self.correlation,
        }
    }
}

/// One corpus row: the meta-features of a training slice and its best model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestModelRow {
    /// Benchmark table name
    pub benchmark: String,
    /// Training-set size
    pub step: usize,
    /// Meta-features of the training slice
    pub features: MetaFeatureVector,
    /// Registry name of the model with the lowest held-out error
    pub best_model: String,
}

/// Flat CSV shape of [`BestModelRow`].
#[derive(Debug, Serialize, Deserialize)]
struct CorpusRecord {
    benchmark: String,
    step: usize,
    size: f64,
    parameter_count: f64,
    label_range: f64,
    label_cv: f64,
    max_correlation: f64,
    min_correlation: f64,
    r_squared: f64,
    best_model: String,
}

impl From<&BestModelRow> for CorpusRecord {
    fn from(row: &BestModelRow) -> Self {
        let f = row.features;
        Self {
            benchmark: row.benchmark.clone(),
            step: row.step,
            size: f.size,
            parameter_count: f.parameter_count,
            label_range: f.label_range,
            label_cv: f.label_cv,
            max_correlation: f.max_correlation,
            min_correlation: f.min_correlation,
            r_squared: f.r_squared,
            best_model: row.best_model.clone(),
        }
    }
}

impl From<CorpusRecord> for BestModelRow {
    fn from(r: CorpusRecord) -> Self {
        Self {
            benchmark: r.benchmark,
            step: r.step,
            features: MetaFeatureVector {
                size: r.size,
                parameter_count: r.parameter_count,
                label_range: r.label_range,
                label_cv: r.label_cv,
                max_correlation: r.max_correlation,
                min_correlation: r.min_correlation,
                r_squared: r.r_squared,
            },
            best_model: r.best_model,
        }
    }
}

/// Writes evaluation records as CSV with a header row.
///
/// # Errors
///
/// Returns an I/O or CSV error if the file cannot be written.
pub fn write_records<P: AsRef<Path>>(records: &[EvaluationRecord], path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a best-model corpus as CSV with a header row.
///
/// # Errors
///
/// Returns an I/O or CSV error if the file cannot be written.
pub fn write_corpus<P: AsRef<Path>>(rows: &[BestModelRow], path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(CorpusRecord::from(row))?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a corpus written by [`write_corpus`]. Undefined features are `NaN`.
///
/// # Errors
///
/// Returns an I/O or CSV error for unreadable or malformed files.
pub fn read_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<BestModelRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize::<CorpusRecord>()
        .map(|record| Ok(BestModelRow::from(record?)))
        .collect()
}

#[cfg(test)]
#[path = "evaluation_tests.rs"]
mod tests;
