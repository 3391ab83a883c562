//! Stepwise training-set-size sweep over benchmark tables.

use super::{write_corpus, write_records, BestModelRow, EvaluationRecord};
use crate::config::HarnessConfig;
use crate::error::{Result, RunpredictError};
use crate::features;
use crate::meta::MetaClassifier;
use crate::metrics::ScoringMetric;
use crate::registry::ModelRegistry;
use crate::table::ObservationTable;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Records and corpus rows produced by a sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepwiseReport {
    /// One row per (benchmark, step, model) that trained and scored
    pub records: Vec<EvaluationRecord>,
    /// One row per (benchmark, step) with at least one scored model
    pub corpus: Vec<BestModelRow>,
}

impl StepwiseReport {
    fn extend(&mut self, other: StepwiseReport) {
        self.records.extend(other.records);
        self.corpus.extend(other.corpus);
    }
}

/// Trains every catalogue model on growing slices of benchmark tables.
///
/// Each table is shuffled with the configured seed; its first `test_size`
/// rows form the held-out slice and step `s` trains on the next `s` rows.
#[derive(Debug, Clone)]
pub struct StepwiseEvaluation {
    registry: Arc<ModelRegistry>,
    meta: Option<Arc<MetaClassifier>>,
    config: HarnessConfig,
}

impl StepwiseEvaluation {
    /// Creates a harness over the given catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InvalidHyperparameter`] for an invalid config.
    pub fn new(registry: Arc<ModelRegistry>, config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry,
            meta: None,
            config,
        })
    }

    /// Also trains and records the meta-classifier's pick at every step.
    #[must_use]
    pub fn with_meta_classifier(mut self, meta: Arc<MetaClassifier>) -> Self {
        self.meta = Some(meta);
        self
    }

    /// The harness settings.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Sweeps one table.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InsufficientData`] if the table has no rows
    /// beyond the held-out slice.
    #[instrument(skip_all, fields(benchmark = table.name(), rows = table.len()))]
    pub fn evaluate_table(&self, table: &ObservationTable) -> Result<StepwiseReport> {
        let test_size = self.config.test_size;
        if table.len() <= test_size {
            return Err(RunpredictError::insufficient(
                format!("more than {test_size} rows"),
                format!("{} rows", table.len()),
            ));
        }
        let mut shuffled = table.clone();
        shuffled.shuffle(self.config.seed);
        let test = shuffled.slice(0, test_size)?;
        let available = shuffled.len() - test_size;

        let mut report = StepwiseReport::default();
        for &step in &self.config.steps {
            if step > available {
                break;
            }
            let train = shuffled.slice(test_size, step)?;
            let step_report = self.evaluate_step(table.name(), step, &train, &test);
            report.extend(step_report);
        }
        info!(
            records = report.records.len(),
            corpus_rows = report.corpus.len(),
            "evaluated benchmark"
        );
        Ok(report)
    }

    #[instrument(skip_all, fields(step = step))]
    fn evaluate_step(
        &self,
        benchmark: &str,
        step: usize,
        train: &ObservationTable,
        test: &ObservationTable,
    ) -> StepwiseReport {
        let mut report = StepwiseReport::default();
        for name in self.registry.list_models() {
            match train_and_score(&self.registry, name, train, test) {
                Ok((micros, metrics)) => report.records.push(EvaluationRecord::new(
                    benchmark, step, name, false, micros, metrics,
                )),
                Err(e) => warn!(benchmark, step, model = name, error = %e, "skipping model"),
            }
        }

        match features::extract(train) {
            Ok(features) => match best_model(&report.records, self.config.scoring) {
                Some(best) => report.corpus.push(BestModelRow {
                    benchmark: benchmark.to_string(),
                    step,
                    features,
                    best_model: best.to_string(),
                }),
                None => warn!(benchmark, step, "no model scored; no corpus row"),
            },
            Err(e) => {
                warn!(benchmark, step, error = %e, "meta-features unavailable; no corpus row");
            }
        }

        if let Some(meta) = &self.meta {
            let pick = meta.recommend(train).and_then(|name| {
                train_and_score(&self.registry, &name, train, test).map(|r| (name, r))
            });
            match pick {
                Ok((name, (micros, metrics))) => report.records.push(EvaluationRecord::new(
                    benchmark, step, &name, true, micros, metrics,
                )),
                Err(e) => warn!(benchmark, step, error = %e, "skipping meta-classifier pick"),
            }
        }
        report
    }

    /// Sweeps every table; tables that are too small are skipped with a warning.
    #[must_use]
    pub fn run(&self, tables: &[ObservationTable]) -> StepwiseReport {
        let mut total = StepwiseReport::default();
        for table in tables {
            match self.evaluate_table(table) {
                Ok(report) => total.extend(report),
                Err(e) => warn!(benchmark = table.name(), error = %e, "skipping benchmark"),
            }
        }
        total
    }

    /// Sweeps every table and writes `eval_<name>.csv` and
    /// `bestPredictor_<name>.csv` per table plus `bestPredictor_total.csv`
    /// into the evaluation directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O or CSV error if an output cannot be written.
    pub fn run_and_write(&self, tables: &[ObservationTable]) -> Result<StepwiseReport> {
        let dir = &self.config.evaluation_dir;
        std::fs::create_dir_all(dir)?;
        let mut total = StepwiseReport::default();
        for table in tables {
            let report = match self.evaluate_table(table) {
                Ok(report) => report,
                Err(e) => {
                    warn!(benchmark = table.name(), error = %e, "skipping benchmark");
                    continue;
                }
            };
            write_records(
                &report.records,
                self.output_path(&format!("eval_{}.csv", table.name())),
            )?;
            write_corpus(
                &report.corpus,
                self.output_path(&format!("bestPredictor_{}.csv", table.name())),
            )?;
            total.extend(report);
        }
        write_corpus(&total.corpus, self.output_path("bestPredictor_total.csv"))?;
        Ok(total)
    }

    fn output_path(&self, file: &str) -> PathBuf {
        self.config.evaluation_dir.join(file)
    }
}

/// Trains a fresh instance on `train` and scores it on `test`.
fn train_and_score(
    registry: &ModelRegistry,
    name: &str,
    train: &ObservationTable,
    test: &ObservationTable,
) -> Result<(u64, crate::metrics::RegressionMetrics)> {
    let mut model = registry.instantiate(name)?;
    let started = Instant::now();
    model.train(train)?;
    let micros = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    let metrics = model.evaluate(test)?;
    Ok((micros, metrics))
}

/// Name of the record with the lowest defined score; `NaN` scores never win.
fn best_model(records: &[EvaluationRecord], scoring: ScoringMetric) -> Option<&str> {
    records
        .iter()
        .filter(|r| !r.recommended)
        .map(|r| (r.metrics().get(scoring), r.model.as_str()))
        .filter(|(score, _)| !score.is_nan())
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, name)| name)
}

#[cfg(test)]
#[path = "stepwise_tests.rs"]
mod tests;
