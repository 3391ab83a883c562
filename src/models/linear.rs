//! Least squares linear regression.
//!
//! Solves the normal equations `(XᵀX + λnI) β = Xᵀy` on centered,
//! standardized inputs via Cholesky decomposition. When the system is not
//! positive definite the ridge is raised tenfold and the solve retried.

use super::preprocess::{Preprocessor, Scaling};
use super::{check_arity, not_trained, require_rows, Regressor};
use crate::error::{Result, RunpredictError};
use crate::primitives::Matrix;
use crate::table::ObservationTable;
use serde::{Deserialize, Serialize};

const MAX_RIDGE_RETRIES: usize = 10;

/// Fits `y ≈ x·β + intercept` by least squares with a ridge penalty.
///
/// Columns of `x` are centered internally; the returned coefficients apply
/// to the uncentered inputs.
///
/// # Errors
///
/// Returns an error if the rows are ragged or the system stays singular
/// after every ridge increase.
pub(crate) fn least_squares(
    x: &[Vec<f64>],
    y: &[f64],
    ridge: f64,
) -> std::result::Result<(Vec<f64>, f64), &'static str> {
    let n = x.len();
    if n == 0 || n != y.len() {
        return Err("Number of samples must match target length");
    }
    let p = x[0].len();
    if x.iter().any(|row| row.len() != p) {
        return Err("Rows must have equal length");
    }

    let y_mean = y.iter().sum::<f64>() / n as f64;
    if p == 0 {
        return Ok((Vec::new(), y_mean));
    }
    let x_means: Vec<f64> = (0..p)
        .map(|j| x.iter().map(|row| row[j]).sum::<f64>() / n as f64)
        .collect();

    // X^T X and X^T y on centered data
    let mut xtx = Matrix::zeros(p, p);
    let mut xty = vec![0.0; p];
    let mut centered = vec![0.0; p];
    for (row, &target) in x.iter().zip(y) {
        for j in 0..p {
            centered[j] = row[j] - x_means[j];
        }
        let dy = target - y_mean;
        for a in 0..p {
            xty[a] += centered[a] * dy;
            for b in a..p {
                let v = xtx.get(a, b) + centered[a] * centered[b];
                xtx.set(a, b, v);
            }
        }
    }
    for a in 0..p {
        for b in 0..a {
            xtx.set(a, b, xtx.get(b, a));
        }
    }

    let mut penalty = ridge * n as f64;
    let mut last_err = "Matrix is not positive definite";
    for _ in 0..=MAX_RIDGE_RETRIES {
        let mut system = xtx.clone();
        system.add_diagonal(penalty);
        match system.cholesky_solve(&xty) {
            Ok(beta) if beta.iter().all(|b| b.is_finite()) => {
                let intercept = y_mean - beta.iter().zip(&x_means).map(|(b, m)| b * m).sum::<f64>();
                return Ok((beta, intercept));
            }
            Ok(_) => last_err = "Solution is not finite",
            Err(e) => last_err = e,
        }
        penalty = if penalty > 0.0 {
            penalty * 10.0
        } else {
            1e-8 * n as f64
        };
    }
    Err(last_err)
}

/// Ordinary least squares linear regression.
///
/// Nominal inputs are expanded into indicator columns and all inputs are
/// standardized before solving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    ridge: f64,
    fitted: Option<Fitted>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Fitted {
    pre: Preprocessor,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    /// Creates a new `LinearRegression` with a negligible ridge.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ridge: 1e-8,
            fitted: None,
        }
    }

    /// Sets the ridge penalty.
    #[must_use]
    pub fn with_ridge(mut self, ridge: f64) -> Self {
        self.ridge = ridge;
        self
    }

    /// Coefficients on the standardized inputs, if trained.
    #[must_use]
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.coefficients.as_slice())
    }
}

impl Regressor for LinearRegression {
    fn train(&mut self, table: &ObservationTable) -> Result<()> {
        require_rows(table, 1, "linear regression")?;
        let pre = Preprocessor::fit(table, Scaling::Standardize);
        let x = pre.transform_table(table)?;
        let (coefficients, intercept) = least_squares(&x, &table.labels(), self.ridge)
            .map_err(|e| RunpredictError::training("linear regression", e))?;
        self.fitted = Some(Fitted {
            pre,
            coefficients,
            intercept,
        });
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| not_trained("linear regression"))?;
        check_arity(features, fitted.pre.n_inputs())?;
        let x = fitted.pre.transform(features)?;
        Ok(fitted.intercept
            + x.iter()
                .zip(&fitted.coefficients)
                .map(|(v, b)| v * b)
                .sum::<f64>())
    }

    fn describe(&self) -> String {
        format!("LinearRegression(ridge={})", self.ridge)
    }

    fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }
}

#[cfg(test)]
#[path = "linear_tests.rs"]
mod tests;
