pub(crate) use super::*;

#[test]
fn test_perfect_predictions() {
    let y = [1.0, 2.0, 3.0, 4.0];
    assert_eq!(mae(&y, &y).expect("same length"), 0.0);
    assert_eq!(rmse(&y, &y).expect("same length"), 0.0);
    assert!((r_squared(&y, &y).expect("non-constant") - 1.0).abs() < 1e-12);
    assert!((correlation(&y, &y).expect("non-constant") - 1.0).abs() < 1e-12);
}

#[test]
fn test_mse_and_rmse() {
    let y_true = [3.0, -0.5, 2.0, 7.0];
    let y_pred = [2.5, 0.0, 2.0, 8.0];
    assert!((mse(&y_pred, &y_true).expect("same length") - 0.375).abs() < 1e-12);
    assert!((rmse(&y_pred, &y_true).expect("same length") - 0.375_f64.sqrt()).abs() < 1e-12);
}

#[test]
fn test_mape_percent() {
    let y_true = [100.0, 200.0];
    let y_pred = [110.0, 180.0];
    assert!((mape(&y_pred, &y_true).expect("non-zero actuals") - 10.0).abs() < 1e-12);
}

#[test]
fn test_mape_zero_actual() {
    let err = mape(&[1.0, 2.0], &[0.0, 2.0]).expect_err("zero actual");
    assert!(err.is_division_by_zero());
}

#[test]
fn test_rrse_mean_predictor_is_hundred() {
    let y_true = [1.0, 2.0, 3.0];
    let y_pred = [2.0, 2.0, 2.0];
    assert!((rrse(&y_pred, &y_true).expect("non-constant") - 100.0).abs() < 1e-12);
}

#[test]
fn test_r_squared_negative_for_bad_predictions() {
    let y_true = [1.0, 2.0, 3.0, 4.0, 5.0];
    let y_pred = [10.0, 20.0, 30.0, 40.0, 50.0];
    assert!(r_squared(&y_pred, &y_true).expect("non-constant") < 0.0);
}

#[test]
fn test_length_mismatch_and_empty() {
    assert!(matches!(
        mae(&[1.0], &[1.0, 2.0]),
        Err(RunpredictError::SchemaMismatch { .. })
    ));
    assert!(matches!(
        mae(&[], &[]),
        Err(RunpredictError::InsufficientData { .. })
    ));
}

#[test]
fn test_compute_marks_undefined_metrics_nan() {
    let y_true = [0.0, 0.0, 0.0];
    let y_pred = [1.0, 0.0, -1.0];
    let m = RegressionMetrics::compute(&y_pred, &y_true).expect("same length");
    assert!((m.mae - 2.0 / 3.0).abs() < 1e-12);
    assert!(m.mape.is_nan());
    assert!(m.rrse.is_nan());
    assert!(m.correlation.is_nan());
}

#[test]
fn test_scoring_lookup() {
    let m = RegressionMetrics {
        mae: 1.0,
        mape: 2.0,
        rmse: 3.0,
        rrse: 4.0,
        correlation: 0.5,
    };
    assert_eq!(m.get(ScoringMetric::Mae), 1.0);
    assert_eq!(m.get(ScoringMetric::Rrse), 4.0);
    assert_eq!(ScoringMetric::default(), ScoringMetric::Mae);
}

#[test]
fn test_scoring_metric_serde_names() {
    let json = serde_json::to_string(&ScoringMetric::Mape).expect("serializable");
    assert_eq!(json, "\"mape\"");
}
