//! CART classification tree with Gini splits and reduced-error pruning.
//!
//! Features may be `NaN`. Split search ignores undefined values; at every
//! split the rows with an undefined feature (during training and at
//! prediction time) follow the child that received more training rows.

use crate::error::{Result, RunpredictError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Internal node in a classification tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Index of the feature to split on
    pub feature_idx: usize,
    /// Threshold value for the split
    pub threshold: f64,
    /// Rows with an undefined feature go left when true
    pub missing_left: bool,
    /// Majority class of the training rows that reached this node
    pub class_label: usize,
    /// Number of training rows that reached this node
    pub n_samples: usize,
    /// Left subtree (feature <= threshold)
    pub left: Box<TreeNode>,
    /// Right subtree (feature > threshold)
    pub right: Box<TreeNode>,
}

/// Leaf node holding the predicted class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    /// Predicted class label for this leaf
    pub class_label: usize,
    /// Number of training rows in this leaf
    pub n_samples: usize,
}

/// A node in a classification tree (either internal node or leaf).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal decision node with split condition
    Node(Node),
    /// Leaf node with class prediction
    Leaf(Leaf),
}

impl TreeNode {
    /// Returns the depth of the tree rooted at this node.
    ///
    /// Leaf nodes have depth 0, internal nodes have depth 1 + max(left, right).
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    /// Number of leaves below this node.
    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 1,
            TreeNode::Node(node) => node.left.n_leaves() + node.right.n_leaves(),
        }
    }

    fn predict(&self, x: &[f64]) -> usize {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return leaf.class_label,
                TreeNode::Node(internal) => {
                    node = if goes_left(x[internal.feature_idx], internal) {
                        &internal.left
                    } else {
                        &internal.right
                    };
                }
            }
        }
    }
}

fn goes_left(value: f64, node: &Node) -> bool {
    if value.is_nan() {
        node.missing_left
    } else {
        value <= node.threshold
    }
}

/// Gini impurity `1 - Σ p_i²` from class counts.
fn gini_impurity(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

/// Most frequent class; ties go to the lowest class index.
fn majority_class(y: &[usize], indices: &[usize], n_classes: usize) -> usize {
    let counts = class_counts(y, indices, n_classes);
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}

fn class_counts(y: &[usize], indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &i in indices {
        counts[y[i]] += 1;
    }
    counts
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature_idx: usize,
    threshold: f64,
    impurity: f64,
}

/// Lowest weighted Gini over the midpoints of one feature's defined values.
fn find_best_split_for_feature(
    x: &[Vec<f64>],
    y: &[usize],
    indices: &[usize],
    feature_idx: usize,
    n_classes: usize,
    min_leaf: usize,
) -> Option<Split> {
    let mut order: Vec<usize> = indices
        .iter()
        .copied()
        .filter(|&i| !x[i][feature_idx].is_nan())
        .collect();
    let n = order.len();
    if n < 2 * min_leaf.max(1) {
        return None;
    }
    order.sort_by(|&a, &b| x[a][feature_idx].total_cmp(&x[b][feature_idx]));

    let total = class_counts(y, &order, n_classes);
    let mut left = vec![0; n_classes];
    let mut best: Option<Split> = None;
    for pos in 1..n {
        left[y[order[pos - 1]]] += 1;
        if pos < min_leaf || n - pos < min_leaf {
            continue;
        }
        let lo = x[order[pos - 1]][feature_idx];
        let hi = x[order[pos]][feature_idx];
        if lo >= hi {
            continue;
        }
        let right: Vec<usize> = total.iter().zip(&left).map(|(t, l)| t - l).collect();
        let impurity = (pos as f64 * gini_impurity(&left, pos)
            + (n - pos) as f64 * gini_impurity(&right, n - pos))
            / n as f64;
        if best.map_or(true, |b| impurity < b.impurity) {
            let mid = lo + (hi - lo) / 2.0;
            best = Some(Split {
                feature_idx,
                threshold: if mid < hi { mid } else { lo },
                impurity,
            });
        }
    }
    best
}

#[derive(Debug, Clone, Copy)]
struct GrowParams {
    n_classes: usize,
    max_depth: Option<usize>,
    min_samples_leaf: usize,
}

fn build_tree(
    x: &[Vec<f64>],
    y: &[usize],
    indices: &[usize],
    depth: usize,
    params: GrowParams,
) -> TreeNode {
    let n_samples = indices.len();
    let class_label = majority_class(y, indices, params.n_classes);
    let leaf = TreeNode::Leaf(Leaf {
        class_label,
        n_samples,
    });

    let counts = class_counts(y, indices, params.n_classes);
    let current = gini_impurity(&counts, n_samples);
    if current == 0.0 || params.max_depth.is_some_and(|d| depth >= d) {
        return leaf;
    }

    let n_features = x.first().map_or(0, Vec::len);
    let best = (0..n_features)
        .filter_map(|f| {
            find_best_split_for_feature(x, y, indices, f, params.n_classes, params.min_samples_leaf)
        })
        .fold(None::<Split>, |best, s| match best {
            Some(b) if b.impurity <= s.impurity => Some(b),
            _ => Some(s),
        });
    let Some(split) = best else {
        return leaf;
    };
    if current - split.impurity <= 1e-12 {
        return leaf;
    }

    let (mut left, mut right, mut missing) = (Vec::new(), Vec::new(), Vec::new());
    for &i in indices {
        let v = x[i][split.feature_idx];
        if v.is_nan() {
            missing.push(i);
        } else if v <= split.threshold {
            left.push(i);
        } else {
            right.push(i);
        }
    }
    let missing_left = left.len() >= right.len();
    if missing_left {
        left.extend(missing);
    } else {
        right.extend(missing);
    }

    TreeNode::Node(Node {
        feature_idx: split.feature_idx,
        threshold: split.threshold,
        missing_left,
        class_label,
        n_samples,
        left: Box::new(build_tree(x, y, &left, depth + 1, params)),
        right: Box::new(build_tree(x, y, &right, depth + 1, params)),
    })
}

/// Bottom-up reduced-error pruning; returns the holdout errors of the kept subtree.
fn prune(node: &mut TreeNode, x: &[Vec<f64>], y: &[usize], holdout: &[usize]) -> usize {
    let internal = match node {
        TreeNode::Leaf(leaf) => {
            return holdout.iter().filter(|&&i| y[i] != leaf.class_label).count();
        }
        TreeNode::Node(internal) => internal,
    };
    let (left, right): (Vec<usize>, Vec<usize>) = holdout
        .iter()
        .partition(|&&i| goes_left(x[i][internal.feature_idx], internal));
    let subtree_errors =
        prune(&mut internal.left, x, y, &left) + prune(&mut internal.right, x, y, &right);
    let leaf_errors = holdout
        .iter()
        .filter(|&&i| y[i] != internal.class_label)
        .count();
    if leaf_errors <= subtree_errors {
        *node = TreeNode::Leaf(Leaf {
            class_label: internal.class_label,
            n_samples: internal.n_samples,
        });
        leaf_errors
    } else {
        subtree_errors
    }
}

/// Decision tree classifier over real-valued features that may be `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    tree: Option<TreeNode>,
    max_depth: Option<usize>,
    min_samples_leaf: usize,
    pruning_folds: usize,
    seed: u64,
    n_features: usize,
    n_classes: usize,
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeClassifier {
    /// Creates an unpruned tree with `min_samples_leaf = 2`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: None,
            max_depth: None,
            min_samples_leaf: 2,
            pruning_folds: 0,
            seed: 1,
            n_features: 0,
            n_classes: 0,
        }
    }

    /// Sets the maximum depth (root has depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the minimum number of rows per leaf.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Holds out `1 / folds` of the rows for reduced-error pruning (0 or 1 disables).
    #[must_use]
    pub fn with_pruning_folds(mut self, folds: usize) -> Self {
        self.pruning_folds = folds;
        self
    }

    /// Sets the seed of the holdout split.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fits the tree to class indices `y` (each `< n_classes`).
    ///
    /// # Errors
    ///
    /// Returns an error for an empty or ragged training set, or a label
    /// outside `0..n_classes`.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[usize], n_classes: usize) -> Result<()> {
        if x.is_empty() {
            return Err(RunpredictError::insufficient("at least 1 training row", "0 rows"));
        }
        if x.len() != y.len() {
            return Err(RunpredictError::arity_mismatch("labels per row", x.len(), y.len()));
        }
        let n_features = x[0].len();
        if let Some(row) = x.iter().find(|r| r.len() != n_features) {
            return Err(RunpredictError::arity_mismatch("features per row", n_features, row.len()));
        }
        if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
            return Err(RunpredictError::SchemaMismatch {
                expected: format!("class index below {n_classes}"),
                actual: bad.to_string(),
            });
        }

        let params = GrowParams {
            n_classes,
            max_depth: self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
        };
        let mut indices: Vec<usize> = (0..x.len()).collect();
        let n_holdout = if self.pruning_folds > 1 {
            x.len() / self.pruning_folds
        } else {
            0
        };
        let tree = if n_holdout == 0 || n_holdout == x.len() {
            build_tree(x, y, &indices, 0, params)
        } else {
            let mut rng = StdRng::seed_from_u64(self.seed);
            indices.shuffle(&mut rng);
            let (holdout, grow) = indices.split_at(n_holdout);
            let mut tree = build_tree(x, y, grow, 0, params);
            let leaves_before = tree.n_leaves();
            let errors = prune(&mut tree, x, y, holdout);
            debug!(
                leaves_before,
                leaves_after = tree.n_leaves(),
                holdout = holdout.len(),
                errors,
                "pruned classification tree"
            );
            tree
        };

        self.tree = Some(tree);
        self.n_features = n_features;
        self.n_classes = n_classes;
        Ok(())
    }

    /// Predicts the class index of one feature vector.
    ///
    /// # Errors
    ///
    /// Returns a prediction error if the tree is unfitted or the vector has
    /// the wrong length.
    pub fn predict(&self, x: &[f64]) -> Result<usize> {
        let tree = self
            .tree
            .as_ref()
            .ok_or_else(|| RunpredictError::prediction("classification tree is not trained"))?;
        if x.len() != self.n_features {
            return Err(RunpredictError::prediction(format!(
                "expected {} features, got {}",
                self.n_features,
                x.len()
            )));
        }
        Ok(tree.predict(x))
    }

    /// Root of the fitted tree.
    #[must_use]
    pub fn root(&self) -> Option<&TreeNode> {
        self.tree.as_ref()
    }

    /// Number of classes the tree was fitted for.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
