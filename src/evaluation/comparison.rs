//! Paired-sample comparison of recommended models against a fixed baseline.

use crate::config::ComparisonConfig;
use crate::error::{Result, RunpredictError};
use crate::meta::MetaClassifier;
use crate::registry::ModelRegistry;
use crate::stats::{self, TTestResult};
use crate::table::ObservationTable;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// One paired sample: both models trained on the same slice of one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSample {
    /// Benchmark table name
    pub benchmark: String,
    /// Training-set size
    pub step: usize,
    /// Name the meta-classifier recommended
    pub recommended: String,
    /// `MAE(baseline) - MAE(recommended)`; positive when the pick is better
    pub difference: f64,
}

impl ComparisonSample {
    /// Returns true if the recommendation was the baseline itself.
    #[must_use]
    pub fn is_baseline_pick(&self, baseline: &str) -> bool {
        self.recommended == baseline
    }
}

/// Summary statistics of the paired differences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Baseline model name
    pub baseline: String,
    /// Every paired sample, in table and step order
    pub samples: Vec<ComparisonSample>,
    /// Steps where the recommendation was the baseline
    pub baseline_picks: usize,
    /// Mean difference
    pub mean: f64,
    /// Sample standard deviation of the differences
    pub std_dev: f64,
    /// One-sample t-test of the differences against 0; absent when the
    /// differences have no spread or there are fewer than two
    pub test: Option<TTestResult>,
}

impl ComparisonReport {
    /// Computes the statistics of a set of paired samples.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InsufficientData`] if there are no samples.
    pub fn from_samples(
        baseline: impl Into<String>,
        samples: Vec<ComparisonSample>,
    ) -> Result<Self> {
        let baseline = baseline.into();
        let differences: Vec<f64> = samples.iter().map(|s| s.difference).collect();
        let mean = stats::mean(&differences)?;
        let std_dev = stats::std_dev(&differences).unwrap_or(f64::NAN);
        let test = match stats::ttest_1samp(&differences, 0.0) {
            Ok(test) => Some(test),
            Err(
                e @ (RunpredictError::DivisionByZero { .. }
                | RunpredictError::InsufficientData { .. }),
            ) => {
                warn!(error = %e, "no t-test for the paired differences");
                None
            }
            Err(e) => return Err(e),
        };
        let baseline_picks = samples.iter().filter(|s| s.is_baseline_pick(&baseline)).count();
        Ok(Self {
            baseline,
            samples,
            baseline_picks,
            mean,
            std_dev,
            test,
        })
    }

    /// t-statistic `√n · mean / sd`.
    #[must_use]
    pub fn t_statistic(&self) -> Option<f64> {
        self.test.map(|t| t.statistic)
    }

    /// Degrees of freedom of the test.
    #[must_use]
    pub fn degrees_of_freedom(&self) -> Option<f64> {
        self.test.map(|t| t.df)
    }

    /// One-sided p-value for H₀ "the recommendation is not better than the
    /// baseline" (alternative: mean difference > 0).
    #[must_use]
    pub fn p_value(&self) -> Option<f64> {
        self.test.map(|t| t.pvalue_greater())
    }
}

/// Compares the meta-classifier's picks with a baseline model by MAE.
#[derive(Debug, Clone)]
pub struct PairedComparison {
    registry: Arc<ModelRegistry>,
    meta: Arc<MetaClassifier>,
    config: ComparisonConfig,
}

impl PairedComparison {
    /// Creates a comparison.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InvalidHyperparameter`] for an invalid
    /// config and [`RunpredictError::UnknownModel`] if the baseline is not
    /// registered.
    pub fn new(
        registry: Arc<ModelRegistry>,
        meta: Arc<MetaClassifier>,
        config: ComparisonConfig,
    ) -> Result<Self> {
        config.validate()?;
        if !registry.contains(&config.baseline) {
            return Err(RunpredictError::UnknownModel {
                name: config.baseline.clone(),
            });
        }
        Ok(Self {
            registry,
            meta,
            config,
        })
    }

    /// Collects the paired samples of one table; failing steps are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InsufficientData`] if the table has no rows
    /// beyond the held-out slice.
    #[instrument(skip_all, fields(benchmark = table.name(), rows = table.len()))]
    pub fn compare_table(&self, table: &ObservationTable) -> Result<Vec<ComparisonSample>> {
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

        let mut samples = Vec::new();
        for &step in &self.config.steps {
            if step > available {
                break;
            }
            let train = shuffled.slice(test_size, step)?;
            match self.compare_step(&train, &test) {
                Ok((recommended, difference)) => samples.push(ComparisonSample {
                    benchmark: table.name().to_string(),
                    step,
                    recommended,
                    difference,
                }),
                Err(e) => warn!(step, error = %e, "skipping comparison step"),
            }
        }
        Ok(samples)
    }

    fn compare_step(
        &self,
        train: &ObservationTable,
        test: &ObservationTable,
    ) -> Result<(String, f64)> {
        let (name, mut pick) = self.meta.recommend_model(train)?;
        if name == self.config.baseline {
            return Ok((name, 0.0));
        }
        let mut baseline = self.registry.instantiate(&self.config.baseline)?;
        baseline.train(train)?;
        pick.train(train)?;
        let difference = baseline.evaluate(test)?.mae - pick.evaluate(test)?.mae;
        Ok((name, difference))
    }

    /// Compares over every table and summarizes the differences.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InsufficientData`] if no table produced a sample.
    pub fn run(&self, tables: &[ObservationTable]) -> Result<ComparisonReport> {
        let mut samples = Vec::new();
        for table in tables {
            match self.compare_table(table) {
                Ok(s) => samples.extend(s),
                Err(e) => warn!(benchmark = table.name(), error = %e, "skipping benchmark"),
            }
        }
        let report = ComparisonReport::from_samples(self.config.baseline.clone(), samples)?;
        info!(
            samples = report.samples.len(),
            baseline_picks = report.baseline_picks,
            mean = report.mean,
            t = ?report.t_statistic(),
            "paired comparison finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "comparison_tests.rs"]
mod tests;
