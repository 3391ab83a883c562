pub(crate) use super::*;
use crate::table::Schema;

// y = x below 50, y = 200 - 2x from 50 on
fn hinge_table() -> ObservationTable {
    let rows = (0..100)
        .map(|i| {
            let x = i as f64;
            vec![x, if x < 50.0 { x } else { 200.0 - 2.0 * x }]
        })
        .collect();
    let schema = Schema::numeric(&["x"], "y").expect("unique names");
    ObservationTable::from_rows("hinge", schema, rows).expect("valid rows")
}

#[test]
fn test_model_tree_fits_piecewise_linear() {
    let mut tree = ModelTree::new();
    tree.train(&hinge_table()).expect("enough rows");
    for (x, y) in [(10.5, 10.5), (33.25, 33.25), (71.5, 57.0), (97.0, 6.0)] {
        let got = tree.predict(&[x]).expect("trained");
        assert!((got - y).abs() < 1e-4, "x={x}: {got} vs {y}");
    }
}

#[test]
fn test_model_tree_beats_constant_leaves() {
    let table = hinge_table();
    let mut model_tree = ModelTree::new().with_max_depth(Some(2));
    let mut cart = RegressionTree::new().with_max_depth(Some(2));
    model_tree.train(&table).expect("enough rows");
    cart.train(&table).expect("enough rows");
    let linear_leaves = model_tree.evaluate(&table).expect("trained");
    let constant_leaves = cart.evaluate(&table).expect("trained");
    assert!(linear_leaves.rmse < constant_leaves.rmse);
    assert!(model_tree.n_leaves().expect("trained") <= 4);
}

#[test]
fn test_small_leaf_keeps_its_mean() {
    let schema = Schema::numeric(&["x"], "y").expect("unique names");
    let table = ObservationTable::from_rows("pair", schema, vec![vec![1.0, 2.0], vec![3.0, 6.0]])
        .expect("valid rows");
    let mut tree = ModelTree::new();
    tree.train(&table).expect("enough rows");
    assert_eq!(tree.n_leaves(), Some(1));
    assert!((tree.predict(&[100.0]).expect("trained") - 4.0).abs() < 1e-12);
}

#[test]
fn test_model_tree_untrained_and_arity() {
    let mut tree = ModelTree::new();
    assert!(!tree.is_trained());
    assert!(matches!(tree.predict(&[1.0]), Err(RunpredictError::Prediction { .. })));
    tree.train(&hinge_table()).expect("enough rows");
    assert!(tree.is_trained());
    assert!(tree.predict(&[1.0, 2.0]).is_err());
    assert!(tree.describe().starts_with("ModelTree("));
}
