//! Input encoding shared by the numeric model families.
//!
//! Nominal columns are expanded into one indicator per value; every encoded
//! column is then shifted and scaled with statistics learned from the
//! training table.

use super::check_arity;
use crate::error::Result;
use crate::table::{AttributeKind, ObservationTable};
use serde::{Deserialize, Serialize};

/// How encoded columns are rescaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scaling {
    /// Leave values as they are
    Identity,
    /// Zero mean, unit (population) standard deviation
    Standardize,
    /// Map the training range onto `[0, 1]`
    Normalize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum ColumnEncoding {
    Numeric,
    Indicator(usize),
}

/// Learned input transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    encodings: Vec<ColumnEncoding>,
    offsets: Vec<f64>,
    scales: Vec<f64>,
}

impl Preprocessor {
    /// Learns encodings and scaling statistics from the inputs of `table`.
    #[must_use]
    pub fn fit(table: &ObservationTable, scaling: Scaling) -> Self {
        let encodings: Vec<ColumnEncoding> = table
            .schema()
            .inputs()
            .iter()
            .map(|attr| match &attr.kind {
                AttributeKind::Numeric => ColumnEncoding::Numeric,
                AttributeKind::Nominal(values) => ColumnEncoding::Indicator(values.len()),
            })
            .collect();
        let width = encodings
            .iter()
            .map(|e| match e {
                ColumnEncoding::Numeric => 1,
                ColumnEncoding::Indicator(n) => *n,
            })
            .sum();

        let mut pre = Self {
            encodings,
            offsets: vec![0.0; width],
            scales: vec![1.0; width],
        };
        if scaling == Scaling::Identity || table.is_empty() {
            return pre;
        }

        let encoded: Vec<Vec<f64>> = (0..table.len())
            .map(|i| pre.expand(table.features(i)))
            .collect();
        let n = encoded.len() as f64;
        for col in 0..width {
            let column = encoded.iter().map(|row| row[col]);
            let (offset, scale) = match scaling {
                Scaling::Standardize => {
                    let mean = column.clone().sum::<f64>() / n;
                    let var = column.map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                    (mean, var.sqrt())
                }
                Scaling::Normalize => {
                    let (lo, hi) = column.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                        (lo.min(v), hi.max(v))
                    });
                    (lo, hi - lo)
                }
                Scaling::Identity => (0.0, 1.0),
            };
            pre.offsets[col] = offset;
            pre.scales[col] = if scale > 0.0 && scale.is_finite() {
                scale
            } else {
                1.0
            };
        }
        pre
    }

    /// Number of raw input columns expected.
    #[must_use]
    pub fn n_inputs(&self) -> usize {
        self.encodings.len()
    }

    /// Number of encoded output columns.
    #[must_use]
    pub fn n_outputs(&self) -> usize {
        self.offsets.len()
    }

    fn expand(&self, features: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.offsets.len());
        for (encoding, &value) in self.encodings.iter().zip(features) {
            match encoding {
                ColumnEncoding::Numeric => out.push(value),
                ColumnEncoding::Indicator(n) => {
                    // unknown indices encode as all zeros
                    out.extend((0..*n).map(|v| if value == v as f64 { 1.0 } else { 0.0 }));
                }
            }
        }
        out
    }

    /// Encodes one raw input vector.
    ///
    /// # Errors
    ///
    /// Returns a prediction error on wrong arity.
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        check_arity(features, self.n_inputs())?;
        let mut out = self.expand(features);
        for ((v, offset), scale) in out.iter_mut().zip(&self.offsets).zip(&self.scales) {
            *v = (*v - offset) / scale;
        }
        Ok(out)
    }

    /// Encodes every row of a table with the schema this was fitted on.
    ///
    /// # Errors
    ///
    /// Returns a prediction error if the table has a different input width.
    pub fn transform_table(&self, table: &ObservationTable) -> Result<Vec<Vec<f64>>> {
        (0..table.len())
            .map(|i| self.transform(table.features(i)))
            .collect()
    }
}

/// Mean and population standard deviation of the labels (scale 1 if constant).
pub(crate) fn label_scaling(labels: &[f64]) -> (f64, f64) {
    let n = labels.len().max(1) as f64;
    let mean = labels.iter().sum::<f64>() / n;
    let sd = (labels.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / n).sqrt();
    (mean, if sd > 0.0 { sd } else { 1.0 })
}
