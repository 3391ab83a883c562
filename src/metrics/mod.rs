//! Regression error metrics.
//!
//! Every metric takes predictions first and ground truth second. Metrics
//! that divide by a property of the ground truth (percentage error, relative
//! squared error) report [`RunpredictError::DivisionByZero`] when that
//! property vanishes. Percentage-style metrics are expressed in percent.

use crate::error::{Result, RunpredictError};
use crate::stats;
use serde::{Deserialize, Serialize};

fn check_lengths(y_pred: &[f64], y_true: &[f64]) -> Result<()> {
    if y_pred.len() != y_true.len() {
        return Err(RunpredictError::arity_mismatch(
            "predictions per actual value",
            y_true.len(),
            y_pred.len(),
        ));
    }
    if y_true.is_empty() {
        return Err(RunpredictError::insufficient("at least 1 prediction", "0"));
    }
    Ok(())
}

/// Mean Absolute Error: `(1/n) Σ|y_true - y_pred|`.
///
/// # Examples
///
/// ```
/// use runpredict::metrics::mae;
///
/// let y_true = [3.0, -0.5, 2.0, 7.0];
/// let y_pred = [2.5, 0.0, 2.0, 8.0];
/// let error = mae(&y_pred, &y_true).expect("same length");
/// assert!((error - 0.5).abs() < 1e-12);
/// ```
///
/// # Errors
///
/// Returns an error for empty or differently sized inputs.
pub fn mae(y_pred: &[f64], y_true: &[f64]) -> Result<f64> {
    check_lengths(y_pred, y_true)?;
    let sum: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()).sum();
    Ok(sum / y_true.len() as f64)
}

/// Mean Squared Error: `(1/n) Σ(y_true - y_pred)²`.
///
/// # Errors
///
/// Returns an error for empty or differently sized inputs.
pub fn mse(y_pred: &[f64], y_true: &[f64]) -> Result<f64> {
    check_lengths(y_pred, y_true)?;
    let sum: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    Ok(sum / y_true.len() as f64)
}

/// Root Mean Squared Error.
///
/// # Errors
///
/// Returns an error for empty or differently sized inputs.
pub fn rmse(y_pred: &[f64], y_true: &[f64]) -> Result<f64> {
    mse(y_pred, y_true).map(f64::sqrt)
}

/// Mean Absolute Percentage Error, in percent.
///
/// # Errors
///
/// Returns [`RunpredictError::DivisionByZero`] if any actual value is zero.
pub fn mape(y_pred: &[f64], y_true: &[f64]) -> Result<f64> {
    check_lengths(y_pred, y_true)?;
    if y_true.iter().any(|&t| t == 0.0) {
        return Err(RunpredictError::division_by_zero(
            "percentage error of a zero actual value",
        ));
    }
    let sum: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| ((t - p) / t).abs())
        .sum();
    Ok(100.0 * sum / y_true.len() as f64)
}

/// Root Relative Squared Error in percent: the squared error relative to
/// always predicting the mean of `y_true`.
///
/// # Errors
///
/// Returns [`RunpredictError::DivisionByZero`] if `y_true` is constant.
pub fn rrse(y_pred: &[f64], y_true: &[f64]) -> Result<f64> {
    check_lengths(y_pred, y_true)?;
    let mean = stats::mean(y_true)?;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Err(RunpredictError::division_by_zero(
            "relative squared error of a constant target",
        ));
    }
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    Ok(100.0 * (ss_res / ss_tot).sqrt())
}

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// # Errors
///
/// Returns [`RunpredictError::DivisionByZero`] if `y_true` is constant.
pub fn r_squared(y_pred: &[f64], y_true: &[f64]) -> Result<f64> {
    let relative = rrse(y_pred, y_true)? / 100.0;
    Ok(1.0 - relative * relative)
}

/// Pearson correlation between predictions and actual values.
///
/// # Errors
///
/// Returns [`RunpredictError::DivisionByZero`] if either side is constant.
pub fn correlation(y_pred: &[f64], y_true: &[f64]) -> Result<f64> {
    check_lengths(y_pred, y_true)?;
    stats::pearson(y_pred, y_true)
}

/// The error summary recorded for one trained model on a held-out slice.
///
/// Metrics that are undefined for the slice (e.g. percentage error with a
/// zero runtime) are stored as `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean absolute error
    pub mae: f64,
    /// Mean absolute percentage error (percent)
    pub mape: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Root relative squared error (percent)
    pub rrse: f64,
    /// Correlation of predictions with actual values
    pub correlation: f64,
}

impl RegressionMetrics {
    /// Computes all metrics.
    ///
    /// # Errors
    ///
    /// Returns an error only for empty or differently sized inputs.
    pub fn compute(y_pred: &[f64], y_true: &[f64]) -> Result<Self> {
        Ok(Self {
            mae: mae(y_pred, y_true)?,
            rmse: rmse(y_pred, y_true)?,
            mape: defined_or_nan(mape(y_pred, y_true))?,
            rrse: defined_or_nan(rrse(y_pred, y_true))?,
            correlation: defined_or_nan(correlation(y_pred, y_true))?,
        })
    }

    /// Looks up a metric by its column name.
    #[must_use]
    pub fn get(&self, metric: ScoringMetric) -> f64 {
        match metric {
            ScoringMetric::Mae => self.mae,
            ScoringMetric::Mape => self.mape,
            ScoringMetric::Rmse => self.rmse,
            ScoringMetric::Rrse => self.rrse,
        }
    }
}

fn defined_or_nan(value: Result<f64>) -> Result<f64> {
    match value {
        Err(e) if e.is_division_by_zero() => Ok(f64::NAN),
        other => other,
    }
}

/// Error column used to rank models; lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMetric {
    /// Mean absolute error
    #[default]
    Mae,
    /// Mean absolute percentage error
    Mape,
    /// Root mean squared error
    Rmse,
    /// Root relative squared error
    Rrse,
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
