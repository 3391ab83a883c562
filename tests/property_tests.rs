//! Property-based tests using proptest.
//!
//! These tests verify invariants of meta-feature extraction, the metrics and
//! the retraining policy.

use runpredict::metrics;
use runpredict::prelude::*;
use proptest::prelude::*;

// Strategy for generating tables with two numeric inputs
fn table_strategy(max_rows: usize) -> impl Strategy<Value = ObservationTable> {
    proptest::collection::vec(
        (-100.0f64..100.0, -100.0f64..100.0, 0.1f64..1000.0),
        5..max_rows,
    )
    .prop_map(|rows| {
        let rows = rows.into_iter().map(|(a, b, y)| vec![a, b, y]).collect();
        let schema = Schema::numeric(&["a", "b"], "y").expect("unique names");
        ObservationTable::from_rows("prop", schema, rows)
            .expect("Test data should be valid")
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn extraction_is_deterministic(table in table_strategy(40)) {
        let first = extract(&table).expect("enough rows").to_array();
        let second = extract(&table).expect("enough rows").to_array();
        for (a, b) in first.iter().zip(&second) {
            prop_assert!(a.to_bits() == b.to_bits());
        }
    }

    #[test]
    fn extraction_has_fixed_layout(table in table_strategy(40)) {
        let mf = extract(&table).expect("enough rows");
        let values = mf.to_array();
        prop_assert_eq!(values.len(), MetaFeatureVector::NAMES.len());
        prop_assert_eq!(values[0], table.len() as f64);
        prop_assert_eq!(values[1], 2.0);
        prop_assert!(mf.label_range >= 0.0);
        if !mf.max_correlation.is_nan() {
            prop_assert!(mf.min_correlation <= mf.max_correlation);
            prop_assert!(mf.max_correlation <= 1.0 + 1e-9);
            prop_assert!(mf.min_correlation >= -1.0 - 1e-9);
        }
        if !mf.r_squared.is_nan() {
            prop_assert!(mf.r_squared >= -1e-9);
            prop_assert!(mf.r_squared <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn row_order_does_not_change_features(table in table_strategy(30), seed in 0u64..1000) {
        let mut shuffled = table.clone();
        shuffled.shuffle(seed);
        let a = extract(&table).expect("enough rows");
        let b = extract(&shuffled).expect("enough rows");
        prop_assert_eq!(a.size, b.size);
        prop_assert!((a.label_range - b.label_range).abs() < 1e-9);
    }

    #[test]
    fn errors_are_non_negative(
        pairs in proptest::collection::vec((0.1f64..100.0, 0.1f64..100.0), 1..30)
    ) {
        let (actual, predicted): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        prop_assert!(metrics::mae(&actual, &predicted).expect("same length") >= 0.0);
        let rmse = metrics::rmse(&actual, &predicted).expect("same length");
        let mae = metrics::mae(&actual, &predicted).expect("same length");
        prop_assert!(rmse + 1e-9 >= mae);
    }

    #[test]
    fn metrics_vanish_on_perfect_predictions(
        actual in proptest::collection::vec(0.1f64..100.0, 1..30)
    ) {
        prop_assert_eq!(metrics::mae(&actual, &actual).expect("same length"), 0.0);
        prop_assert_eq!(metrics::rmse(&actual, &actual).expect("same length"), 0.0);
        prop_assert_eq!(metrics::mape(&actual, &actual).expect("same length"), 0.0);
    }
}
