//! One-hidden-layer perceptron trained by backpropagation.
//!
//! Sigmoid hidden units, a linear output unit, per-row gradient steps with
//! momentum. Inputs and the label are standardized.

use super::preprocess::{label_scaling, Preprocessor, Scaling};
use super::{check_arity, not_trained, require_rows, Regressor};
use crate::error::{Result, RunpredictError};
use crate::table::ObservationTable;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Network {
    /// hidden × (inputs + 1), bias last
    hidden_weights: Vec<Vec<f64>>,
    /// hidden + 1, bias last
    output_weights: Vec<f64>,
}

impl Network {
    fn init(n_inputs: usize, n_hidden: usize, rng: &mut StdRng) -> Self {
        let hidden_weights = (0..n_hidden)
            .map(|_| (0..=n_inputs).map(|_| rng.gen_range(-0.05..0.05)).collect())
            .collect();
        let output_weights = (0..=n_hidden).map(|_| rng.gen_range(-0.05..0.05)).collect();
        Self {
            hidden_weights,
            output_weights,
        }
    }

    fn hidden(&self, x: &[f64]) -> Vec<f64> {
        self.hidden_weights
            .iter()
            .map(|w| {
                let (bias, weights) = w.split_last().map_or((0.0, &w[..]), |(b, ws)| (*b, ws));
                sigmoid(bias + weights.iter().zip(x).map(|(a, b)| a * b).sum::<f64>())
            })
            .collect()
    }

    fn output(&self, hidden: &[f64]) -> f64 {
        let n = hidden.len();
        self.output_weights[n]
            + self.output_weights[..n]
                .iter()
                .zip(hidden)
                .map(|(a, b)| a * b)
                .sum::<f64>()
    }

    fn is_finite(&self) -> bool {
        self.output_weights.iter().all(|w| w.is_finite())
            && self
                .hidden_weights
                .iter()
                .all(|row| row.iter().all(|w| w.is_finite()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Fitted {
    pre: Preprocessor,
    network: Network,
    y_mean: f64,
    y_scale: f64,
}

/// Multilayer perceptron regressor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultilayerPerceptron {
    hidden: Option<usize>,
    learning_rate: f64,
    momentum: f64,
    epochs: usize,
    seed: u64,
    fitted: Option<Fitted>,
}

impl Default for MultilayerPerceptron {
    fn default() -> Self {
        Self::new()
    }
}

impl MultilayerPerceptron {
    /// Creates a perceptron with learning rate 0.1, momentum 0.2 and 500 epochs.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hidden: None,
            learning_rate: 0.1,
            momentum: 0.2,
            epochs: 500,
            seed: 1,
            fitted: None,
        }
    }

    /// Sets the hidden layer width (`None` = (inputs + 1) / 2).
    #[must_use]
    pub fn with_hidden(mut self, hidden: Option<usize>) -> Self {
        self.hidden = hidden;
        self
    }

    /// Sets the learning rate.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the momentum.
    #[must_use]
    pub fn with_momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    /// Sets the number of epochs.
    #[must_use]
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the initialization and shuffling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Regressor for MultilayerPerceptron {
    fn train(&mut self, table: &ObservationTable) -> Result<()> {
        require_rows(table, 1, "multilayer perceptron")?;
        let pre = Preprocessor::fit(table, Scaling::Standardize);
        let x = pre.transform_table(table)?;
        let labels = table.labels();
        let (y_mean, y_scale) = label_scaling(&labels);
        let y: Vec<f64> = labels.iter().map(|v| (v - y_mean) / y_scale).collect();

        let n_inputs = pre.n_outputs();
        let n_hidden = self.hidden.unwrap_or((n_inputs + 1) / 2).max(1);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut net = Network::init(n_inputs, n_hidden, &mut rng);
        let mut hidden_velocity = vec![vec![0.0; n_inputs + 1]; n_hidden];
        let mut output_velocity = vec![0.0; n_hidden + 1];
        let mut order: Vec<usize> = (0..x.len()).collect();

        for _ in 0..self.epochs {
            order.shuffle(&mut rng);
            for &i in &order {
                let h = net.hidden(&x[i]);
                let error = net.output(&h) - y[i];

                for j in 0..=n_hidden {
                    let input = h.get(j).copied().unwrap_or(1.0);
                    output_velocity[j] =
                        self.momentum * output_velocity[j] - self.learning_rate * error * input;
                }
                for (j, hj) in h.iter().enumerate() {
                    let delta = error * net.output_weights[j] * hj * (1.0 - hj);
                    for k in 0..=n_inputs {
                        let input = x[i].get(k).copied().unwrap_or(1.0);
                        hidden_velocity[j][k] = self.momentum * hidden_velocity[j][k]
                            - self.learning_rate * delta * input;
                        net.hidden_weights[j][k] += hidden_velocity[j][k];
                    }
                }
                for (w, v) in net.output_weights.iter_mut().zip(&output_velocity) {
                    *w += v;
                }
            }
            if !net.is_finite() {
                return Err(RunpredictError::training(
                    "multilayer perceptron",
                    "weights diverged; lower the learning rate",
                ));
            }
        }

        self.fitted = Some(Fitted {
            pre,
            network: net,
            y_mean,
            y_scale,
        });
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| not_trained("multilayer perceptron"))?;
        check_arity(features, fitted.pre.n_inputs())?;
        let x = fitted.pre.transform(features)?;
        let h = fitted.network.hidden(&x);
        Ok(fitted.y_mean + fitted.y_scale * fitted.network.output(&h))
    }

    fn describe(&self) -> String {
        format!(
            "MultilayerPerceptron(hidden={:?}, lr={}, momentum={}, epochs={})",
            self.hidden, self.learning_rate, self.momentum, self.epochs
        )
    }

    fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }
}
