//! Bootstrap aggregation of full-feature regression trees.

use super::forest::bootstrap_sample;
use super::tree::{table_xy, RegressionTree};
use super::{check_arity, not_trained, require_rows, Regressor};
use crate::error::Result;
use crate::table::ObservationTable;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Averages trees grown on bootstrap bags. Unlike the random forest every
/// split considers every feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaggingRegressor {
    members: Vec<RegressionTree>,
    n_bags: usize,
    max_depth: Option<usize>,
    min_samples_leaf: usize,
    seed: u64,
    n_inputs: usize,
}

impl BaggingRegressor {
    /// Creates a bagger with `n_bags` members.
    #[must_use]
    pub fn new(n_bags: usize) -> Self {
        Self {
            members: Vec::new(),
            n_bags,
            max_depth: None,
            min_samples_leaf: 2,
            seed: 1,
            n_inputs: 0,
        }
    }

    /// Sets the maximum depth of each member.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the minimum rows per leaf of each member.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf.max(1);
        self
    }

    /// Sets the bootstrap seed; bag `i` uses `seed + i`.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Regressor for BaggingRegressor {
    fn train(&mut self, table: &ObservationTable) -> Result<()> {
        require_rows(table, 1, "bagging")?;
        let (x, y) = table_xy(table);
        let members = (0..self.n_bags)
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(i as u64));
                let bag = bootstrap_sample(x.len(), &mut rng);
                let mut tree = RegressionTree::new()
                    .with_max_depth(self.max_depth)
                    .with_min_samples_leaf(self.min_samples_leaf);
                tree.fit_rows(&x, &y, bag, &mut rng);
                tree
            })
            .collect();
        self.members = members;
        self.n_inputs = table.n_inputs();
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        if self.members.is_empty() {
            return Err(not_trained("bagging"));
        }
        check_arity(features, self.n_inputs)?;
        let sum: f64 = self
            .members
            .iter()
            .filter_map(|t| t.predict_unchecked(features))
            .sum();
        Ok(sum / self.members.len() as f64)
    }

    fn describe(&self) -> String {
        format!(
            "Bagging(bags={}, max_depth={:?}, min_samples_leaf={}, seed={})",
            self.n_bags, self.max_depth, self.min_samples_leaf, self.seed
        )
    }

    fn is_trained(&self) -> bool {
        !self.members.is_empty()
    }
}
