//! CART regression tree.
//!
//! Splits minimize the summed squared error of the two children; leaves
//! predict the mean label of their rows. Split search sorts each candidate
//! feature once and scans prefix sums, so a node costs `O(p · n log n)`.
//! Forests and bagging grow their members through [`RegressionTree::fit_rows`].

use super::{check_arity, not_trained, require_rows, Regressor};
use crate::error::Result;
use crate::table::ObservationTable;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Leaf node in a regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegressionLeaf {
    /// Mean label of the rows reaching this leaf
    pub value: f64,
    /// Number of training rows in this leaf
    pub n_samples: usize,
}

/// Internal node in a regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegressionNode {
    /// Index of the feature to split on
    pub feature_idx: usize,
    /// Rows with `x[feature_idx] <= threshold` go left
    pub threshold: f64,
    pub left: Box<RegressionTreeNode>,
    pub right: Box<RegressionTreeNode>,
}

/// A node in a regression tree (either internal node or leaf).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum RegressionTreeNode {
    Node(RegressionNode),
    Leaf(RegressionLeaf),
}

impl RegressionTreeNode {
    /// Leaf nodes have depth 0, internal nodes have depth 1 + max(left, right).
    pub fn depth(&self) -> usize {
        match self {
            RegressionTreeNode::Leaf(_) => 0,
            RegressionTreeNode::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    fn n_leaves(&self) -> usize {
        match self {
            RegressionTreeNode::Leaf(_) => 1,
            RegressionTreeNode::Node(node) => node.left.n_leaves() + node.right.n_leaves(),
        }
    }

    /// Index of the leaf `x` reaches, counting leaves left to right.
    fn leaf_index(&self, x: &[f64]) -> usize {
        let mut node = self;
        let mut index = 0;
        loop {
            match node {
                RegressionTreeNode::Leaf(_) => return index,
                RegressionTreeNode::Node(internal) => {
                    if x[internal.feature_idx] <= internal.threshold {
                        node = &internal.left;
                    } else {
                        index += internal.left.n_leaves();
                        node = &internal.right;
                    }
                }
            }
        }
    }

    fn predict(&self, x: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                RegressionTreeNode::Leaf(leaf) => return leaf.value,
                RegressionTreeNode::Node(internal) => {
                    node = if x[internal.feature_idx] <= internal.threshold {
                        &internal.left
                    } else {
                        &internal.right
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct GrowParams {
    max_depth: Option<usize>,
    min_samples_leaf: usize,
    max_features: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature_idx: usize,
    threshold: f64,
    sse: f64,
}

/// Best threshold on one feature by prefix-sum scan over the sorted rows.
fn best_split_for_feature(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    feature_idx: usize,
    node_mean: f64,
    min_leaf: usize,
) -> Option<Split> {
    let n = indices.len();
    let mut order = indices.to_vec();
    order.sort_by(|&a, &b| x[a][feature_idx].total_cmp(&x[b][feature_idx]));

    let (total_sum, total_sq) = order.iter().fold((0.0, 0.0), |(s, q), &i| {
        let d = y[i] - node_mean;
        (s + d, q + d * d)
    });

    let mut best: Option<Split> = None;
    let (mut sum, mut sq) = (0.0, 0.0);
    for pos in 1..n {
        let d = y[order[pos - 1]] - node_mean;
        sum += d;
        sq += d * d;
        if pos < min_leaf || n - pos < min_leaf {
            continue;
        }
        let lo = x[order[pos - 1]][feature_idx];
        let hi = x[order[pos]][feature_idx];
        if lo >= hi {
            continue;
        }
        let n_left = pos as f64;
        let n_right = (n - pos) as f64;
        let sse_left = sq - sum * sum / n_left;
        let sse_right = (total_sq - sq) - (total_sum - sum).powi(2) / n_right;
        let sse = sse_left + sse_right;
        if best.map_or(true, |b| sse < b.sse) {
            let mid = lo + (hi - lo) / 2.0;
            best = Some(Split {
                feature_idx,
                threshold: if mid < hi { mid } else { lo },
                sse,
            });
        }
    }
    best
}

fn candidate_features(
    n_features: usize,
    max_features: Option<usize>,
    rng: &mut StdRng,
) -> Vec<usize> {
    match max_features {
        Some(k) if k < n_features => rand::seq::index::sample(rng, n_features, k).into_vec(),
        _ => (0..n_features).collect(),
    }
}

fn grow(
    x: &[Vec<f64>],
    y: &[f64],
    indices: Vec<usize>,
    depth: usize,
    params: GrowParams,
    rng: &mut StdRng,
) -> RegressionTreeNode {
    let n = indices.len();
    let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / n as f64;
    let leaf = RegressionTreeNode::Leaf(RegressionLeaf {
        value: mean,
        n_samples: n,
    });

    if n < 2 * params.min_samples_leaf || params.max_depth.is_some_and(|d| depth >= d) {
        return leaf;
    }
    let sse_parent: f64 = indices.iter().map(|&i| (y[i] - mean).powi(2)).sum();
    if sse_parent <= 0.0 {
        return leaf;
    }

    let n_features = x[indices[0]].len();
    let mut best: Option<Split> = None;
    for feature_idx in candidate_features(n_features, params.max_features, rng) {
        if let Some(split) =
            best_split_for_feature(x, y, &indices, feature_idx, mean, params.min_samples_leaf)
        {
            if best.map_or(true, |b| split.sse < b.sse) {
                best = Some(split);
            }
        }
    }
    let Some(split) = best.filter(|s| s.sse < sse_parent * (1.0 - 1e-12)) else {
        return leaf;
    };

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&i| x[i][split.feature_idx] <= split.threshold);
    if left.is_empty() || right.is_empty() {
        return leaf;
    }

    let left_child = grow(x, y, left, depth + 1, params, rng);
    let right_child = grow(x, y, right, depth + 1, params, rng);
    RegressionTreeNode::Node(RegressionNode {
        feature_idx: split.feature_idx,
        threshold: split.threshold,
        left: Box::new(left_child),
        right: Box::new(right_child),
    })
}

/// Decision tree regressor using the CART algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    tree: Option<RegressionTreeNode>,
    n_inputs: usize,
    max_depth: Option<usize>,
    min_samples_leaf: usize,
    max_features: Option<usize>,
}

impl Default for RegressionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RegressionTree {
    /// Creates an unbounded tree with at least 2 rows per leaf.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: None,
            n_inputs: 0,
            max_depth: None,
            min_samples_leaf: 2,
            max_features: None,
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

    /// Restricts each split to a random subset of `k` features.
    #[must_use]
    pub fn with_max_features(mut self, k: Option<usize>) -> Self {
        self.max_features = k;
        self
    }

    /// Depth of the fitted tree.
    #[must_use]
    pub fn depth(&self) -> Option<usize> {
        self.tree.as_ref().map(RegressionTreeNode::depth)
    }

    /// Number of leaves of the fitted tree.
    #[must_use]
    pub fn n_leaves(&self) -> Option<usize> {
        self.tree.as_ref().map(RegressionTreeNode::n_leaves)
    }

    /// Grows the tree on the given rows (with repetitions, as bootstraps do).
    ///
    /// `x` holds raw input vectors, `sample` the row indices to use.
    pub(crate) fn fit_rows(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        sample: Vec<usize>,
        rng: &mut StdRng,
    ) {
        self.n_inputs = x.first().map_or(0, Vec::len);
        let params = GrowParams {
            max_depth: self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
        };
        self.tree = Some(grow(x, y, sample, 0, params, rng));
    }

    /// Leaf index reached by `features`; callers guarantee the width.
    pub(crate) fn leaf_of(&self, features: &[f64]) -> Option<usize> {
        self.tree.as_ref().map(|t| t.leaf_index(features))
    }

    /// Predicts without an arity check; callers guarantee the width.
    pub(crate) fn predict_unchecked(&self, features: &[f64]) -> Option<f64> {
        self.tree.as_ref().map(|t| t.predict(features))
    }
}

/// Raw input rows and labels of a table.
pub(crate) fn table_xy(table: &ObservationTable) -> (Vec<Vec<f64>>, Vec<f64>) {
    let x = (0..table.len()).map(|i| table.features(i).to_vec()).collect();
    (x, table.labels())
}

impl Regressor for RegressionTree {
    fn train(&mut self, table: &ObservationTable) -> Result<()> {
        require_rows(table, 1, "regression tree")?;
        let (x, y) = table_xy(table);
        // every feature is a candidate, so the generator is never drawn from
        let mut rng = StdRng::seed_from_u64(0);
        self.fit_rows(&x, &y, (0..x.len()).collect(), &mut rng);
        self.n_inputs = table.n_inputs();
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        let tree = self.tree.as_ref().ok_or_else(|| not_trained("regression tree"))?;
        check_arity(features, self.n_inputs)?;
        Ok(tree.predict(features))
    }

    fn describe(&self) -> String {
        format!(
            "RegressionTree(max_depth={:?}, min_samples_leaf={}, leaves={:?})",
            self.max_depth,
            self.min_samples_leaf,
            self.n_leaves()
        )
    }

    fn is_trained(&self) -> bool {
        self.tree.is_some()
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
