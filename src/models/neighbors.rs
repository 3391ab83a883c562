//! k-nearest-neighbour regression.
//!
//! Inputs are normalized to `[0, 1]` so every column contributes equally to
//! the Euclidean distance.

use super::preprocess::{Preprocessor, Scaling};
use super::{check_arity, not_trained, require_rows, Regressor};
use crate::error::Result;
use crate::table::ObservationTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// K-Nearest Neighbors regressor.
///
/// With leave-one-out selection enabled, `k` is an upper bound: training
/// picks the `k' ∈ 1..=k` with the lowest leave-one-out absolute error.
///
/// # Example
///
/// ```
/// use runpredict::models::{KNearestNeighbors, Regressor};
/// use runpredict::table::{ObservationTable, Schema};
///
/// let rows = vec![vec![0.0, 1.0], vec![1.0, 1.0], vec![10.0, 5.0], vec![11.0, 5.0]];
/// let schema = Schema::numeric(&["x"], "y").expect("unique names");
/// let table = ObservationTable::from_rows("t", schema, rows)
///     .expect("valid rows");
///
/// let mut knn = KNearestNeighbors::new(2);
/// knn.train(&table).expect("non-empty table");
/// assert_eq!(knn.predict(&[0.5]).expect("trained"), 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNearestNeighbors {
    k: usize,
    select_k_by_loo: bool,
    distance_weighted: bool,
    fitted: Option<Fitted>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Fitted {
    pre: Preprocessor,
    x_train: Vec<Vec<f64>>,
    y_train: Vec<f64>,
    k: usize,
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Returns `(squared distance, index)` of the `k` nearest rows, nearest first.
fn nearest(
    x_train: &[Vec<f64>],
    query: &[f64],
    k: usize,
    exclude: Option<usize>,
) -> Vec<(f64, usize)> {
    let mut distances: Vec<(f64, usize)> = x_train
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != exclude)
        .map(|(i, row)| (squared_distance(row, query), i))
        .collect();
    let k = k.min(distances.len());
    if k == 0 {
        return Vec::new();
    }
    if k < distances.len() {
        distances.select_nth_unstable_by(k - 1, |a, b| a.0.total_cmp(&b.0));
        distances.truncate(k);
    }
    distances.sort_by(|a, b| a.0.total_cmp(&b.0));
    distances
}

/// Averages the labels of the neighbours, optionally by inverse distance.
///
/// Exact matches take all the weight when present.
fn aggregate(neighbours: &[(f64, usize)], y: &[f64], distance_weighted: bool) -> f64 {
    if !distance_weighted {
        return neighbours.iter().map(|&(_, i)| y[i]).sum::<f64>() / neighbours.len() as f64;
    }
    let exact: Vec<f64> = neighbours
        .iter()
        .filter(|(d, _)| *d == 0.0)
        .map(|&(_, i)| y[i])
        .collect();
    if !exact.is_empty() {
        return exact.iter().sum::<f64>() / exact.len() as f64;
    }
    let (num, den) = neighbours.iter().fold((0.0, 0.0), |(num, den), &(d2, i)| {
        let w = 1.0 / d2.sqrt();
        (num + w * y[i], den + w)
    });
    num / den
}

impl KNearestNeighbors {
    /// Creates a new K-Nearest Neighbors regressor.
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            k: k.max(1),
            select_k_by_loo: false,
            distance_weighted: false,
            fitted: None,
        }
    }

    /// Enables leave-one-out selection of `k`.
    #[must_use]
    pub fn with_loo_selection(mut self, enabled: bool) -> Self {
        self.select_k_by_loo = enabled;
        self
    }

    /// Enables inverse distance weighting.
    #[must_use]
    pub fn with_distance_weighting(mut self, enabled: bool) -> Self {
        self.distance_weighted = enabled;
        self
    }

    /// Neighbour count chosen by the last training run.
    #[must_use]
    pub fn effective_k(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.k)
    }

    fn select_k(&self, x: &[Vec<f64>], y: &[f64]) -> usize {
        let max_k = self.k.min(x.len().saturating_sub(1));
        if max_k <= 1 {
            return max_k.max(1);
        }
        let mut errors = vec![0.0; max_k];
        for (i, row) in x.iter().enumerate() {
            let neighbours = nearest(x, row, max_k, Some(i));
            for (k_idx, err) in errors.iter_mut().enumerate() {
                let prediction = aggregate(&neighbours[..=k_idx], y, self.distance_weighted);
                *err += (prediction - y[i]).abs();
            }
        }
        let best = errors
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map_or(1, |(idx, _)| idx + 1);
        debug!(k = best, max_k, "selected neighbour count by leave-one-out");
        best
    }
}

impl Regressor for KNearestNeighbors {
    fn train(&mut self, table: &ObservationTable) -> Result<()> {
        require_rows(table, 1, "nearest neighbours")?;
        let pre = Preprocessor::fit(table, Scaling::Normalize);
        let x_train = pre.transform_table(table)?;
        let y_train = table.labels();
        let k = if self.select_k_by_loo {
            self.select_k(&x_train, &y_train)
        } else {
            self.k
        };
        self.fitted = Some(Fitted {
            pre,
            x_train,
            y_train,
            k,
        });
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| not_trained("nearest neighbours"))?;
        check_arity(features, fitted.pre.n_inputs())?;
        let query = fitted.pre.transform(features)?;
        let neighbours = nearest(&fitted.x_train, &query, fitted.k, None);
        Ok(aggregate(&neighbours, &fitted.y_train, self.distance_weighted))
    }

    fn describe(&self) -> String {
        format!(
            "KNearestNeighbors(k={}, loo={}, weighted={}, chosen_k={:?})",
            self.k,
            self.select_k_by_loo,
            self.distance_weighted,
            self.effective_k()
        )
    }

    fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }
}

#[cfg(test)]
#[path = "neighbors_tests.rs"]
mod tests;
