//! Baseline that always predicts the training mean.

use super::{check_arity, not_trained, require_rows, Regressor};
use crate::error::Result;
use crate::table::ObservationTable;
use serde::{Deserialize, Serialize};

/// Predicts the mean label of the training table for every input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeanRegressor {
    fitted: Option<Fitted>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Fitted {
    mean: f64,
    n_inputs: usize,
}

impl MeanRegressor {
    /// Creates an untrained baseline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Regressor for MeanRegressor {
    fn train(&mut self, table: &ObservationTable) -> Result<()> {
        require_rows(table, 1, "mean predictor")?;
        let labels = table.labels();
        self.fitted = Some(Fitted {
            mean: labels.iter().sum::<f64>() / labels.len() as f64,
            n_inputs: table.n_inputs(),
        });
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        let fitted = self.fitted.ok_or_else(|| not_trained("mean predictor"))?;
        check_arity(features, fitted.n_inputs)?;
        Ok(fitted.mean)
    }

    fn describe(&self) -> String {
        match self.fitted {
            Some(f) => format!("ZeroR (mean = {})", f.mean),
            None => "ZeroR (untrained)".to_string(),
        }
    }

    fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }
}
