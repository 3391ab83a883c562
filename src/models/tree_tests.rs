pub(crate) use super::*;
use crate::table::Schema;

fn step_table() -> ObservationTable {
    let rows = (0..20)
        .map(|i| vec![i as f64, if i < 10 { 1.0 } else { 5.0 }])
        .collect();
    let schema = Schema::numeric(&["x"], "y").expect("unique names");
    ObservationTable::from_rows("step", schema, rows).expect("valid rows")
}

#[test]
fn test_tree_learns_step() {
    let mut tree = RegressionTree::new();
    tree.train(&step_table()).expect("enough rows");
    assert_eq!(tree.predict(&[3.0]).expect("trained"), 1.0);
    assert_eq!(tree.predict(&[15.0]).expect("trained"), 5.0);
    assert_eq!(tree.depth(), Some(1));
    assert_eq!(tree.n_leaves(), Some(2));
}

#[test]
fn test_split_threshold_is_midpoint() {
    let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
    let y: Vec<f64> = (0..20).map(|i| if i < 10 { 1.0 } else { 5.0 }).collect();
    let indices: Vec<usize> = (0..20).collect();
    let split = best_split_for_feature(&x, &y, &indices, 0, 3.0, 1).expect("separable");
    assert_eq!(split.threshold, 9.5);
    assert!(split.sse.abs() < 1e-9);
}

#[test]
fn test_no_split_on_constant_feature() {
    let x: Vec<Vec<f64>> = (0..6).map(|_| vec![2.0]).collect();
    let y = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let indices: Vec<usize> = (0..6).collect();
    assert!(best_split_for_feature(&x, &y, &indices, 0, 3.5, 1).is_none());
}

#[test]
fn test_constant_target_is_single_leaf() {
    let rows = (0..10).map(|i| vec![i as f64, 4.0]).collect();
    let schema = Schema::numeric(&["x"], "y").expect("unique names");
    let table = ObservationTable::from_rows("flat", schema, rows)
        .expect("valid rows");
    let mut tree = RegressionTree::new();
    tree.train(&table).expect("enough rows");
    assert_eq!(tree.depth(), Some(0));
    assert_eq!(tree.predict(&[99.0]).expect("trained"), 4.0);
}

#[test]
fn test_max_depth_zero_predicts_mean() {
    let mut tree = RegressionTree::new().with_max_depth(Some(0));
    tree.train(&step_table()).expect("enough rows");
    assert_eq!(tree.predict(&[0.0]).expect("trained"), 3.0);
}

#[test]
fn test_min_samples_leaf_respected() {
    let mut tree = RegressionTree::new().with_min_samples_leaf(15);
    tree.train(&step_table()).expect("enough rows");
    // 20 rows cannot be split into two leaves of 15
    assert_eq!(tree.n_leaves(), Some(1));
}
