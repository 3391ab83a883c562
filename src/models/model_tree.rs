//! Model tree: a regression tree with a linear model in every leaf.
//!
//! The tree is grown exactly like [`RegressionTree`] on the raw inputs; each
//! leaf then fits least squares on the standardized, indicator-expanded
//! inputs of its rows. A leaf with no more rows than encoded columns keeps
//! its mean instead of an underdetermined fit.

use super::preprocess::{Preprocessor, Scaling};
use super::tree::{table_xy, RegressionTree};
use super::{check_arity, least_squares, not_trained, require_rows, Regressor};
use crate::error::{Result, RunpredictError};
use crate::table::ObservationTable;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LeafModel {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LeafModel {
    fn constant(value: f64) -> Self {
        Self {
            coefficients: Vec::new(),
            intercept: value,
        }
    }

    fn eval(&self, x: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(x)
                .map(|(b, v)| b * v)
                .sum::<f64>()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Fitted {
    pre: Preprocessor,
    tree: RegressionTree,
    leaves: Vec<LeafModel>,
}

/// Regression tree with linear leaves, the `M5` family of the catalogue.
///
/// # Example
///
/// ```
/// use runpredict::models::{ModelTree, Regressor};
/// use runpredict::table::{ObservationTable, Schema};
///
/// // y = x below 50, y = 200 - 2x above
/// let rows = (0..100)
///     .map(|i| {
///         let x = i as f64;
///         vec![x, if x < 50.0 { x } else { 200.0 - 2.0 * x }]
///     })
///     .collect();
/// let schema = Schema::numeric(&["x"], "y").expect("unique names");
/// let table = ObservationTable::from_rows("hinge", schema, rows).expect("valid rows");
///
/// let mut tree = ModelTree::new();
/// tree.train(&table).expect("non-empty table");
/// assert!((tree.predict(&[20.5]).expect("trained") - 20.5).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelTree {
    max_depth: Option<usize>,
    min_samples_leaf: usize,
    ridge: f64,
    fitted: Option<Fitted>,
}

impl Default for ModelTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelTree {
    /// Creates an unbounded tree with at least 4 rows per leaf.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: None,
            min_samples_leaf: 4,
            ridge: 1e-8,
            fitted: None,
        }
    }

    /// Sets the maximum depth (root has depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the minimum number of rows per leaf (at least 1).
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Sets the ridge penalty of the leaf fits.
    #[must_use]
    pub fn with_ridge(mut self, ridge: f64) -> Self {
        self.ridge = ridge;
        self
    }

    /// Number of leaves of the fitted tree.
    #[must_use]
    pub fn n_leaves(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.leaves.len())
    }

    fn fit_leaf(&self, x: &[Vec<f64>], y: &[f64], rows: &[usize]) -> Result<LeafModel> {
        let labels: Vec<f64> = rows.iter().map(|&i| y[i]).collect();
        let mean = labels.iter().sum::<f64>() / labels.len().max(1) as f64;
        let width = x.first().map_or(0, Vec::len);
        if rows.len() <= width + 1 {
            return Ok(LeafModel::constant(mean));
        }
        let leaf_x: Vec<Vec<f64>> = rows.iter().map(|&i| x[i].clone()).collect();
        let (coefficients, intercept) = least_squares(&leaf_x, &labels, self.ridge)
            .map_err(|e| RunpredictError::training("model tree", e))?;
        Ok(LeafModel {
            coefficients,
            intercept,
        })
    }
}

impl Regressor for ModelTree {
    fn train(&mut self, table: &ObservationTable) -> Result<()> {
        require_rows(table, 1, "model tree")?;
        let (x, y) = table_xy(table);
        let pre = Preprocessor::fit(table, Scaling::Standardize);
        let encoded = pre.transform_table(table)?;

        let mut tree = RegressionTree::new()
            .with_max_depth(self.max_depth)
            .with_min_samples_leaf(self.min_samples_leaf);
        // every feature is a candidate, so the generator is never drawn from
        let mut rng = StdRng::seed_from_u64(0);
        tree.fit_rows(&x, &y, (0..x.len()).collect(), &mut rng);

        let mut groups = vec![Vec::new(); tree.n_leaves().unwrap_or(1)];
        for (i, row) in x.iter().enumerate() {
            if let Some(group) = tree.leaf_of(row).and_then(|leaf| groups.get_mut(leaf)) {
                group.push(i);
            }
        }
        let leaves = groups
            .iter()
            .map(|rows| self.fit_leaf(&encoded, &y, rows))
            .collect::<Result<Vec<_>>>()?;

        self.fitted = Some(Fitted { pre, tree, leaves });
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        let fitted = self.fitted.as_ref().ok_or_else(|| not_trained("model tree"))?;
        check_arity(features, fitted.pre.n_inputs())?;
        let leaf = fitted
            .tree
            .leaf_of(features)
            .and_then(|idx| fitted.leaves.get(idx))
            .ok_or_else(|| RunpredictError::prediction("model tree leaf out of range"))?;
        Ok(leaf.eval(&fitted.pre.transform(features)?))
    }

    fn describe(&self) -> String {
        format!(
            "ModelTree(max_depth={:?}, min_samples_leaf={}, ridge={}, leaves={:?})",
            self.max_depth,
            self.min_samples_leaf,
            self.ridge,
            self.n_leaves()
        )
    }

    fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }
}

#[cfg(test)]
#[path = "model_tree_tests.rs"]
mod tests;
