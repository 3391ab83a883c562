//! Linear model fitted by stochastic gradient descent.

use super::preprocess::{label_scaling, Preprocessor, Scaling};
use super::{check_arity, not_trained, require_rows, Regressor};
use crate::error::{Result, RunpredictError};
use crate::table::ObservationTable;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Loss minimized by [`SgdRegressor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SgdLoss {
    /// Squared error
    Squared,
    /// Huber loss with unit threshold on the standardized label
    Huber,
}

impl SgdLoss {
    /// Derivative of the loss with respect to the prediction.
    fn gradient(self, residual: f64) -> f64 {
        match self {
            SgdLoss::Squared => residual,
            SgdLoss::Huber => residual.clamp(-1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Fitted {
    pre: Preprocessor,
    weights: Vec<f64>,
    bias: f64,
    y_mean: f64,
    y_scale: f64,
}

/// SGD linear regressor with L2 penalty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SgdRegressor {
    loss: SgdLoss,
    learning_rate: f64,
    epochs: usize,
    lambda: f64,
    seed: u64,
    fitted: Option<Fitted>,
}

impl SgdRegressor {
    /// Creates a regressor with learning rate 0.01, 500 epochs and `lambda = 1e-4`.
    #[must_use]
    pub fn new(loss: SgdLoss) -> Self {
        Self {
            loss,
            learning_rate: 0.01,
            epochs: 500,
            lambda: 1e-4,
            seed: 1,
            fitted: None,
        }
    }

    /// Sets the learning rate.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the number of epochs.
    #[must_use]
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the L2 penalty.
    #[must_use]
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Sets the shuffling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Regressor for SgdRegressor {
    fn train(&mut self, table: &ObservationTable) -> Result<()> {
        require_rows(table, 1, "sgd linear")?;
        let pre = Preprocessor::fit(table, Scaling::Standardize);
        let x = pre.transform_table(table)?;
        let labels = table.labels();
        let (y_mean, y_scale) = label_scaling(&labels);
        let y: Vec<f64> = labels.iter().map(|v| (v - y_mean) / y_scale).collect();

        let mut weights = vec![0.0; pre.n_outputs()];
        let mut bias = 0.0;
        let mut order: Vec<usize> = (0..x.len()).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);

        for epoch in 0..self.epochs {
            order.shuffle(&mut rng);
            // learning rate decays as 1/t
            let rate = self.learning_rate / (1.0 + epoch as f64 * self.learning_rate);
            for &i in &order {
                let prediction = bias + weights.iter().zip(&x[i]).map(|(w, v)| w * v).sum::<f64>();
                let g = self.loss.gradient(prediction - y[i]);
                for (w, v) in weights.iter_mut().zip(&x[i]) {
                    *w -= rate * (g * v + self.lambda * *w);
                }
                bias -= rate * g;
            }
        }
        if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(RunpredictError::training(
                "sgd linear",
                "weights diverged; lower the learning rate",
            ));
        }

        self.fitted = Some(Fitted {
            pre,
            weights,
            bias,
            y_mean,
            y_scale,
        });
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        let fitted = self.fitted.as_ref().ok_or_else(|| not_trained("sgd linear"))?;
        check_arity(features, fitted.pre.n_inputs())?;
        let x = fitted.pre.transform(features)?;
        let standardized = fitted.bias
            + fitted
                .weights
                .iter()
                .zip(&x)
                .map(|(w, v)| w * v)
                .sum::<f64>();
        Ok(fitted.y_mean + fitted.y_scale * standardized)
    }

    fn describe(&self) -> String {
        format!(
            "SGD(loss={:?}, lr={}, epochs={}, lambda={})",
            self.loss, self.learning_rate, self.epochs, self.lambda
        )
    }

    fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }
}
