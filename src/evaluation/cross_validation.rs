//! k-fold cross-validation of one model on growing prefixes of a table.

use crate::error::{Result, RunpredictError};
use crate::metrics::RegressionMetrics;
use crate::models::ModelSpec;
use crate::table::ObservationTable;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Seed of the fold permutation.
const FOLD_SEED: u64 = 1;

/// Pooled out-of-fold errors for one prefix of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationSummary {
    /// Rows in the prefix
    pub rows: usize,
    /// Number of folds
    pub folds: usize,
    /// Metrics over every out-of-fold prediction
    pub metrics: RegressionMetrics,
}

/// Splits `0..n` into `k` test folds over a seeded permutation.
///
/// The first `n % k` folds take one extra row.
fn fold_indices(n: usize, k: usize, seed: u64) -> Vec<(Vec<usize>, Vec<usize>)> {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let fold_size = n / k;
    let remainder = n % k;
    let mut result = Vec::with_capacity(k);
    let mut start = 0;
    for i in 0..k {
        let end = start + fold_size + usize::from(i < remainder);
        let test = indices[start..end].to_vec();
        let mut train = Vec::with_capacity(n - test.len());
        train.extend_from_slice(&indices[..start]);
        train.extend_from_slice(&indices[end..]);
        result.push((train, test));
        start = end;
    }
    result
}

fn invalid(param: &str, value: usize, constraint: &str) -> RunpredictError {
    RunpredictError::InvalidHyperparameter {
        param: param.to_string(),
        value: value.to_string(),
        constraint: constraint.to_string(),
    }
}

/// Cross-validates `spec` on the first `every`, `2 * every`, ... rows of `table`.
///
/// Each prefix is split into `folds` folds; a fresh model is trained on all
/// but one fold and predicts the held-out one. The summary for the prefix
/// pools the predictions of every fold. Rows past the last full multiple of
/// `every` are not evaluated.
///
/// # Errors
///
/// Returns [`RunpredictError::InvalidHyperparameter`] for `folds < 2`,
/// `every < folds` or an invalid spec, [`RunpredictError::InsufficientData`]
/// if the table has fewer than `every` rows, and any training or prediction
/// error of a fold model.
///
/// # Example
///
/// ```
/// use runpredict::evaluation::cross_validate;
/// use runpredict::models::ModelSpec;
/// use runpredict::table::{ObservationTable, Schema};
///
/// let rows = (0..50).map(|i| vec![i as f64, 3.0 * i as f64 - 2.0]).collect();
/// let schema = Schema::numeric(&["x"], "y").expect("unique names");
/// let table = ObservationTable::from_rows("line", schema, rows).expect("valid rows");
///
/// let summaries = cross_validate(&ModelSpec::Linear { ridge: 1e-8 }, &table, 5, 20)
///     .expect("enough rows");
/// assert_eq!(summaries.iter().map(|s| s.rows).collect::<Vec<_>>(), vec![20, 40]);
/// assert!(summaries.iter().all(|s| s.metrics.mae < 1e-3));
/// ```
#[instrument(
    skip_all,
    fields(model = spec.family(), rows = table.len(), folds = folds, every = every)
)]
pub fn cross_validate(
    spec: &ModelSpec,
    table: &ObservationTable,
    folds: usize,
    every: usize,
) -> Result<Vec<CrossValidationSummary>> {
    if folds < 2 {
        return Err(invalid("folds", folds, ">= 2"));
    }
    if every < folds {
        return Err(invalid("every", every, ">= folds"));
    }
    spec.validate()?;
    if table.len() < every {
        return Err(RunpredictError::insufficient(
            format!("at least {every} rows"),
            format!("{} rows", table.len()),
        ));
    }

    let mut summaries = Vec::with_capacity(table.len() / every);
    for rows in (every..=table.len()).step_by(every) {
        let prefix = table.slice(0, rows)?;
        let mut predictions = Vec::with_capacity(rows);
        let mut actual = Vec::with_capacity(rows);
        for (train_idx, test_idx) in fold_indices(rows, folds, FOLD_SEED) {
            let mut model = spec.build()?;
            model.train(&prefix.select(&train_idx))?;
            for &i in &test_idx {
                predictions.push(model.predict(prefix.features(i))?);
                actual.push(prefix.label(i));
            }
        }
        let metrics = RegressionMetrics::compute(&predictions, &actual)?;
        debug!(rows, mae = metrics.mae, rmse = metrics.rmse, "cross-validated prefix");
        summaries.push(CrossValidationSummary {
            rows,
            folds,
            metrics,
        });
    }
    info!(summaries = summaries.len(), "cross-validation finished");
    Ok(summaries)
}

#[cfg(test)]
#[path = "cross_validation_tests.rs"]
mod tests;
