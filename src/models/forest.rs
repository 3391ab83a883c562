//! Random forest regressor.

use super::tree::{table_xy, RegressionTree};
use super::{check_arity, not_trained, require_rows, Regressor};
use crate::error::Result;
use crate::table::ObservationTable;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Draws `n_samples` row indices with replacement.
pub(crate) fn bootstrap_sample(n_samples: usize, rng: &mut StdRng) -> Vec<usize> {
    let dist = Uniform::from(0..n_samples);
    (0..n_samples).map(|_| dist.sample(rng)).collect()
}

/// Ensemble of regression trees trained on bootstrap samples, each split
/// drawn from a random feature subset. Predictions are averaged.
///
/// # Examples
///
/// ```
/// use runpredict::models::{RandomForestRegressor, Regressor};
/// use runpredict::table::{ObservationTable, Schema};
///
/// let rows = (0..40).map(|i| vec![i as f64, if i < 20 { 1.0 } else { 9.0 }]).collect();
/// let schema = Schema::numeric(&["x"], "y").expect("unique names");
/// let table = ObservationTable::from_rows("step", schema, rows)
///     .expect("valid rows");
///
/// let mut rf = RandomForestRegressor::new(10).with_seed(7);
/// rf.train(&table).expect("fit should succeed");
/// assert!(rf.predict(&[35.0]).expect("trained") > 5.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
    n_estimators: usize,
    max_depth: Option<usize>,
    max_features: Option<usize>,
    seed: u64,
    n_inputs: usize,
}

impl RandomForestRegressor {
    /// Creates a new Random Forest regressor with `n_estimators` trees.
    #[must_use]
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            max_features: None,
            seed: 1,
            n_inputs: 0,
        }
    }

    /// Sets the maximum depth for each tree.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the number of features tried per split.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Sets the seed; tree `i` uses `seed + i`.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of fitted trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for RandomForestRegressor {
    fn train(&mut self, table: &ObservationTable) -> Result<()> {
        require_rows(table, 1, "random forest")?;
        let (x, y) = table_xy(table);
        let n_features = table.n_inputs();
        let max_features = self
            .max_features
            .unwrap_or_else(|| (n_features.max(1) as f64).log2() as usize + 1);

        let mut trees = Vec::with_capacity(self.n_estimators);
        for i in 0..self.n_estimators {
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(i as u64));
            let sample = bootstrap_sample(x.len(), &mut rng);
            let mut tree = RegressionTree::new()
                .with_max_depth(self.max_depth)
                .with_min_samples_leaf(1)
                .with_max_features(Some(max_features));
            tree.fit_rows(&x, &y, sample, &mut rng);
            trees.push(tree);
        }
        debug!(trees = trees.len(), max_features, "fitted random forest");
        self.trees = trees;
        self.n_inputs = n_features;
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        if self.trees.is_empty() {
            return Err(not_trained("random forest"));
        }
        check_arity(features, self.n_inputs)?;
        let sum: f64 = self
            .trees
            .iter()
            .filter_map(|t| t.predict_unchecked(features))
            .sum();
        Ok(sum / self.trees.len() as f64)
    }

    fn describe(&self) -> String {
        format!(
            "RandomForest(trees={}, max_depth={:?}, max_features={:?}, seed={})",
            self.n_estimators, self.max_depth, self.max_features, self.seed
        )
    }

    fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }
}
