pub(crate) use super::*;
use crate::table::Schema;

fn line_table() -> ObservationTable {
    let rows = (0..10).map(|i| vec![i as f64, 10.0 * i as f64]).collect();
    let schema = Schema::numeric(&["x"], "y").expect("unique names");
    ObservationTable::from_rows("line", schema, rows).expect("valid rows")
}

#[test]
fn test_nearest_orders_by_distance() {
    let x = vec![vec![0.0], vec![5.0], vec![1.0], vec![3.0]];
    let found = nearest(&x, &[0.9], 2, None);
    let idx: Vec<usize> = found.iter().map(|&(_, i)| i).collect();
    assert_eq!(idx, vec![2, 0]);
}

#[test]
fn test_nearest_excludes_row() {
    let x = vec![vec![0.0], vec![1.0]];
    let found = nearest(&x, &[0.0], 5, Some(0));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].1, 1);
}

#[test]
fn test_weighted_aggregate_prefers_exact_match() {
    let y = vec![10.0, 20.0];
    assert_eq!(aggregate(&[(0.0, 0), (4.0, 1)], &y, true), 10.0);
    // weights 1/1 and 1/2
    let v = aggregate(&[(1.0, 0), (4.0, 1)], &y, true);
    assert!((v - (10.0 + 10.0) / 1.5).abs() < 1e-12);
}

#[test]
fn test_loo_prefers_single_neighbour_on_smooth_line() {
    let mut knn = KNearestNeighbors::new(5).with_loo_selection(true);
    knn.train(&line_table()).expect("enough rows");
    // neighbours on both sides average out exactly for k = 2, k = 1 misses by 10
    let k = knn.effective_k().expect("trained");
    assert!((1..=5).contains(&k));
    assert_eq!(k, 2);
}

#[test]
fn test_fixed_k_without_loo() {
    let mut knn = KNearestNeighbors::new(3);
    knn.train(&line_table()).expect("enough rows");
    assert_eq!(knn.effective_k(), Some(3));
    // neighbours of 0.0 are rows 0, 1 and 2
    assert!((knn.predict(&[0.0]).expect("trained") - 10.0).abs() < 1e-9);
}

#[test]
fn test_single_row_training() {
    let schema = Schema::numeric(&["x"], "y").expect("unique names");
    let table = ObservationTable::from_rows("one", schema, vec![vec![1.0, 4.0]])
        .expect("valid row");
    let mut knn = KNearestNeighbors::new(5).with_loo_selection(true);
    knn.train(&table).expect("one row is enough");
    assert_eq!(knn.predict(&[7.0]).expect("trained"), 4.0);
}
