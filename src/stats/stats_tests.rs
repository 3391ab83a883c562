pub(crate) use super::*;

#[test]
fn test_mean_and_variance() {
    let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    assert!((mean(&values).expect("non-empty") - 5.0).abs() < 1e-12);
    // sum of squares 32 over n - 1 = 7
    assert!((variance(&values).expect("n >= 2") - 32.0 / 7.0).abs() < 1e-12);
    assert!((std_dev(&values).expect("n >= 2") - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
}

#[test]
fn test_empty_and_single_samples() {
    assert!(matches!(mean(&[]), Err(RunpredictError::InsufficientData { .. })));
    assert!(matches!(variance(&[1.0]), Err(RunpredictError::InsufficientData { .. })));
}

#[test]
fn test_min_max() {
    assert_eq!(min_max(&[3.0, -1.0, 8.0]), Some((-1.0, 8.0)));
    assert_eq!(min_max(&[]), None);
}

#[test]
fn test_coefficient_of_variation() {
    let cv = coefficient_of_variation(&[1.0, 2.0, 3.0]).expect("defined");
    assert!((cv - 0.5).abs() < 1e-12);
}

#[test]
fn test_coefficient_of_variation_zero_mean() {
    let err = coefficient_of_variation(&[-1.0, 1.0]).expect_err("zero mean");
    assert!(err.is_division_by_zero());
}

#[test]
fn test_coefficient_of_variation_constant_sample() {
    let err = coefficient_of_variation(&[4.0, 4.0, 4.0]).expect_err("zero spread");
    assert!(err.is_division_by_zero());
}

#[test]
fn test_pearson_signs() {
    let x = [1.0, 2.0, 3.0, 4.0, 5.0];
    let down = [10.0, 8.0, 6.0, 4.0, 2.0];
    assert!((pearson(&x, &down).expect("defined") + 1.0).abs() < 1e-12);

    let noisy = [1.1, 1.9, 3.2, 3.9, 5.1];
    let r = pearson(&x, &noisy).expect("defined");
    assert!(r > 0.99 && r <= 1.0);
}

#[test]
fn test_pearson_constant_column() {
    let err = pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).expect_err("constant x");
    assert!(err.is_division_by_zero());
}

#[test]
fn test_pearson_length_mismatch() {
    assert!(matches!(
        pearson(&[1.0, 2.0], &[1.0]),
        Err(RunpredictError::SchemaMismatch { .. })
    ));
}
