//! Descriptive statistics and correlation over `f64` samples.
//!
//! These are the building blocks of the meta-feature extractor and the
//! paired comparison in the evaluation harness. Degenerate inputs (empty
//! samples, zero mean, zero spread) are reported as errors rather than
//! silently producing zero.
//!
//! # Examples
//!
//! ```
//! use runpredict::stats;
//!
//! let x = [1.0, 2.0, 3.0, 4.0];
//! let y = [2.0, 4.0, 6.0, 8.0];
//! let r = stats::pearson(&x, &y).expect("non-constant samples");
//! assert!((r - 1.0).abs() < 1e-12);
//! ```

pub mod hypothesis;

pub use hypothesis::{ttest_1samp, ttest_rel, TTestResult};

use crate::error::{Result, RunpredictError};

/// Arithmetic mean.
///
/// # Errors
///
/// Returns [`RunpredictError::InsufficientData`] for an empty sample.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(RunpredictError::insufficient("at least 1 value", "0 values"));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Unbiased sample variance (divides by `n - 1`).
///
/// # Errors
///
/// Returns [`RunpredictError::InsufficientData`] for fewer than 2 values.
pub fn variance(values: &[f64]) -> Result<f64> {
    let n = values.len();
    if n < 2 {
        return Err(RunpredictError::insufficient(
            "at least 2 values",
            format!("{n} values"),
        ));
    }
    let m = mean(values)?;
    Ok(values.iter().map(|&v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64)
}

/// Sample standard deviation.
///
/// # Errors
///
/// Returns [`RunpredictError::InsufficientData`] for fewer than 2 values.
pub fn std_dev(values: &[f64]) -> Result<f64> {
    variance(values).map(f64::sqrt)
}

/// Smallest and largest value, or `None` for an empty sample.
#[must_use]
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Coefficient of variation: sample standard deviation over mean.
///
/// A constant sample has no defined variability and is reported the same way
/// as a zero mean.
///
/// # Errors
///
/// Returns [`RunpredictError::DivisionByZero`] if the mean is zero or the
/// sample has zero spread, and [`RunpredictError::InsufficientData`] for
/// fewer than 2 values.
pub fn coefficient_of_variation(values: &[f64]) -> Result<f64> {
    let sd = std_dev(values)?;
    let m = mean(values)?;
    if m == 0.0 {
        return Err(RunpredictError::division_by_zero("coefficient of variation (zero mean)"));
    }
    if sd == 0.0 {
        return Err(RunpredictError::division_by_zero(
            "coefficient of variation (zero variance)",
        ));
    }
    Ok(sd / m)
}

/// Pearson product-moment correlation of two equally long samples.
///
/// # Errors
///
/// Returns [`RunpredictError::SchemaMismatch`] for different lengths,
/// [`RunpredictError::InsufficientData`] for fewer than 2 pairs and
/// [`RunpredictError::DivisionByZero`] if either sample is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(RunpredictError::arity_mismatch("paired sample", x.len(), y.len()));
    }
    if x.len() < 2 {
        return Err(RunpredictError::insufficient(
            "at least 2 pairs",
            format!("{} pairs", x.len()),
        ));
    }
    let mx = mean(x)?;
    let my = mean(y)?;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Err(RunpredictError::division_by_zero("correlation of a constant sample"));
    }
    Ok((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
