//! Kernel ridge regression, the support-vector family of the catalogue.
//!
//! Inputs are normalized to `[0, 1]` and the label standardized before
//! fitting. A linear kernel is solved in the primal (`p × p` system); every
//! other kernel is solved in the dual on at most `max_train_rows` rows.

use super::preprocess::{label_scaling, Preprocessor, Scaling};
use super::{check_arity, least_squares, not_trained, require_rows, Regressor};
use crate::error::{Result, RunpredictError};
use crate::primitives::Matrix;
use crate::table::ObservationTable;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Kernel function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Kernel {
    /// `⟨a, b⟩`
    Linear,
    /// `(⟨a, b⟩ + coef0)^degree`
    Polynomial {
        /// Exponent
        degree: u32,
        /// Additive constant
        coef0: f64,
    },
    /// `exp(-gamma · |a - b|²)`
    Rbf {
        /// Width parameter
        gamma: f64,
    },
}

impl Kernel {
    fn eval(&self, a: &[f64], b: &[f64]) -> f64 {
        match *self {
            Kernel::Linear => dot(a, b),
            Kernel::Polynomial { degree, coef0 } => {
                (dot(a, b) + coef0).powi(i32::try_from(degree).unwrap_or(i32::MAX))
            }
            Kernel::Rbf { gamma } => {
                let d2: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
                (-gamma * d2).exp()
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let bad = |param: &str, value: String, constraint: &str| {
            RunpredictError::InvalidHyperparameter {
                param: param.to_string(),
                value,
                constraint: constraint.to_string(),
            }
        };
        match *self {
            Kernel::Linear => Ok(()),
            Kernel::Polynomial { degree, coef0 } => {
                if degree == 0 {
                    Err(bad("degree", degree.to_string(), ">= 1"))
                } else if !coef0.is_finite() {
                    Err(bad("coef0", coef0.to_string(), "finite"))
                } else {
                    Ok(())
                }
            }
            Kernel::Rbf { gamma } => {
                if gamma.is_finite() && gamma > 0.0 {
                    Ok(())
                } else {
                    Err(bad("gamma", gamma.to_string(), "finite and > 0"))
                }
            }
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Solution {
    Primal {
        weights: Vec<f64>,
        intercept: f64,
    },
    Dual {
        support: Vec<Vec<f64>>,
        alpha: Vec<f64>,
        offset: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Fitted {
    pre: Preprocessor,
    y_mean: f64,
    y_scale: f64,
    solution: Solution,
}

/// Kernel ridge regressor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelRidge {
    kernel: Kernel,
    lambda: f64,
    max_train_rows: usize,
    seed: u64,
    fitted: Option<Fitted>,
}

impl KernelRidge {
    /// Creates a regressor with the given kernel and `lambda = 1`.
    #[must_use]
    pub fn new(kernel: Kernel) -> Self {
        Self {
            kernel,
            lambda: 1.0,
            max_train_rows: 2_000,
            seed: 1,
            fitted: None,
        }
    }

    /// Sets the regularization strength.
    #[must_use]
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Caps the number of rows used by the dual solver.
    #[must_use]
    pub fn with_max_train_rows(mut self, max_train_rows: usize) -> Self {
        self.max_train_rows = max_train_rows.max(1);
        self
    }

    /// Sets the subsampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn solve_dual(&self, x: Vec<Vec<f64>>, y: Vec<f64>) -> Result<Solution> {
        let (support, targets): (Vec<Vec<f64>>, Vec<f64>) = if x.len() > self.max_train_rows {
            let mut rng = StdRng::seed_from_u64(self.seed);
            let keep = rand::seq::index::sample(&mut rng, x.len(), self.max_train_rows);
            debug!(rows = x.len(), kept = self.max_train_rows, "subsampled kernel training set");
            keep.iter().map(|i| (x[i].clone(), y[i])).unzip()
        } else {
            (x, y)
        };

        let m = support.len();
        let offset = targets.iter().sum::<f64>() / m as f64;
        let centered: Vec<f64> = targets.iter().map(|t| t - offset).collect();

        let mut gram = Matrix::zeros(m, m);
        for i in 0..m {
            for j in i..m {
                let k = self.kernel.eval(&support[i], &support[j]);
                gram.set(i, j, k);
                gram.set(j, i, k);
            }
        }
        gram.add_diagonal(self.lambda);
        let alpha = gram
            .cholesky_solve(&centered)
            .map_err(|e| RunpredictError::training("kernel ridge", e))?;
        Ok(Solution::Dual {
            support,
            alpha,
            offset,
        })
    }
}

impl Regressor for KernelRidge {
    fn train(&mut self, table: &ObservationTable) -> Result<()> {
        require_rows(table, 1, "kernel ridge")?;
        let pre = Preprocessor::fit(table, Scaling::Normalize);
        let x = pre.transform_table(table)?;
        let (y_mean, y_scale) = label_scaling(&table.labels());
        let y: Vec<f64> = table.labels().iter().map(|v| (v - y_mean) / y_scale).collect();

        let solution = match self.kernel {
            Kernel::Linear => {
                let ridge = self.lambda / x.len() as f64;
                let (weights, intercept) = least_squares(&x, &y, ridge)
                    .map_err(|e| RunpredictError::training("kernel ridge", e))?;
                Solution::Primal { weights, intercept }
            }
            _ => self.solve_dual(x, y)?,
        };
        self.fitted = Some(Fitted {
            pre,
            y_mean,
            y_scale,
            solution,
        });
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        let fitted = self.fitted.as_ref().ok_or_else(|| not_trained("kernel ridge"))?;
        check_arity(features, fitted.pre.n_inputs())?;
        let x = fitted.pre.transform(features)?;
        let standardized = match &fitted.solution {
            Solution::Primal { weights, intercept } => intercept + dot(weights, &x),
            Solution::Dual {
                support,
                alpha,
                offset,
            } => {
                offset
                    + support
                        .iter()
                        .zip(alpha)
                        .map(|(s, a)| a * self.kernel.eval(s, &x))
                        .sum::<f64>()
            }
        };
        Ok(fitted.y_mean + fitted.y_scale * standardized)
    }

    fn describe(&self) -> String {
        format!(
            "KernelRidge(kernel={:?}, lambda={}, max_train_rows={})",
            self.kernel, self.lambda, self.max_train_rows
        )
    }

    fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }
}
