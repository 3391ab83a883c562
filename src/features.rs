//! Meta-features: statistics that characterize an observation table.
//!
//! A [`MetaFeatureVector`] is a pure function of a table's current rows. It
//! is what the meta-classifier looks at when it recommends a regression
//! technique, so it is recomputed on demand rather than cached.
//!
//! Statistics that are undefined for the table at hand (coefficient of
//! variation of a zero-mean label, correlations against a constant label)
//! are stored as `NaN` and listed by [`MetaFeatureVector::undefined_features`].
//!
//! # Examples
//!
//! ```
//! use runpredict::features;
//! use runpredict::table::{ObservationTable, Schema};
//!
//! let rows = (1..=10).map(|i| vec![i as f64, 2.0 * i as f64]).collect();
//! let schema = Schema::numeric(&["n"], "t").expect("unique names");
//! let table = ObservationTable::from_rows("t", schema, rows)
//!     .expect("valid rows");
//!
//! let mf = features::extract(&table).expect("enough rows");
//! assert_eq!(mf.size, 10.0);
//! assert!((mf.max_correlation - 1.0).abs() < 1e-9);
//! assert!(mf.undefined_features().is_empty());
//! ```

use crate::error::{Result, RunpredictError};
use crate::models::{least_squares, Preprocessor, Scaling};
use crate::stats;
use crate::table::{AttributeKind, ObservationTable};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fixed-order characterization of an observation table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetaFeatureVector {
    /// Number of rows
    pub size: f64,
    /// Number of input columns
    pub parameter_count: f64,
    /// Largest minus smallest label
    pub label_range: f64,
    /// Sample standard deviation of the label over its mean
    pub label_cv: f64,
    /// Largest signed input/label correlation
    pub max_correlation: f64,
    /// Smallest signed input/label correlation
    pub min_correlation: f64,
    /// Share of label variance explained by a least-squares fit
    pub r_squared: f64,
}

impl MetaFeatureVector {
    /// Feature names in vector order.
    pub const NAMES: [&'static str; 7] = [
        "size",
        "parameter_count",
        "label_range",
        "label_cv",
        "max_correlation",
        "min_correlation",
        "r_squared",
    ];

    /// Number of features.
    pub const LEN: usize = Self::NAMES.len();

    /// Values in [`Self::NAMES`] order.
    #[must_use]
    pub fn to_array(&self) -> [f64; Self::LEN] {
        [
            self.size,
            self.parameter_count,
            self.label_range,
            self.label_cv,
            self.max_correlation,
            self.min_correlation,
            self.r_squared,
        ]
    }

    /// Rebuilds a vector from values in [`Self::NAMES`] order.
    #[must_use]
    pub fn from_array(values: [f64; Self::LEN]) -> Self {
        let [
            size,
            parameter_count,
            label_range,
            label_cv,
            max_correlation,
            min_correlation,
            r_squared,
        ] = values;
        Self {
            size,
            parameter_count,
            label_range,
            label_cv,
            max_correlation,
            min_correlation,
            r_squared,
        }
    }

    /// Names of the features that are undefined (`NaN`) for this table.
    #[must_use]
    pub fn undefined_features(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .zip(self.to_array())
            .filter(|(_, v)| v.is_nan())
            .map(|(name, _)| *name)
            .collect()
    }
}

/// Turns a degenerate statistic into `NaN` and propagates everything else.
fn undefined_as_nan(value: Result<f64>) -> Result<f64> {
    match value {
        Err(e) if e.is_division_by_zero() => Ok(f64::NAN),
        other => other,
    }
}

/// Correlation of one numeric column with the label; a constant column gives 0.
fn numeric_correlation(column: &[f64], labels: &[f64]) -> Result<f64> {
    match stats::pearson(column, labels) {
        Err(e) if e.is_division_by_zero() => Ok(0.0),
        other => other,
    }
}

/// Frequency-weighted correlation of the per-value indicators of a nominal column.
fn nominal_correlation(column: &[f64], n_values: usize, labels: &[f64]) -> Result<f64> {
    let n = column.len() as f64;
    let mut weighted = 0.0;
    for value in 0..n_values {
        let indicator: Vec<f64> = column
            .iter()
            .map(|&c| if c == value as f64 { 1.0 } else { 0.0 })
            .collect();
        let count: f64 = indicator.iter().sum();
        if count == 0.0 {
            continue;
        }
        weighted += count / n * numeric_correlation(&indicator, labels)?;
    }
    Ok(weighted)
}

/// Explained over total sum of squares of a least-squares fit on every input.
fn explained_variance(table: &ObservationTable, labels: &[f64]) -> Result<f64> {
    let pre = Preprocessor::fit(table, Scaling::Standardize);
    let x = pre.transform_table(table)?;
    let (weights, intercept) = least_squares(&x, labels, 0.0)
        .map_err(|e| RunpredictError::training("meta-feature fit", e))?;

    let mean = stats::mean(labels)?;
    let (explained, total) = x.iter().zip(labels).fold((0.0, 0.0), |(ess, tss), (row, &y)| {
        let pred = intercept + weights.iter().zip(row).map(|(w, v)| w * v).sum::<f64>();
        (ess + (pred - mean).powi(2), tss + (y - mean).powi(2))
    });
    if total == 0.0 {
        return Err(RunpredictError::division_by_zero("r_squared (constant label)"));
    }
    Ok(explained / total)
}

/// Computes the meta-feature vector of `table`.
///
/// # Errors
///
/// Returns [`RunpredictError::InsufficientData`] for fewer than 2 rows or a
/// table without a numeric input column.
pub fn extract(table: &ObservationTable) -> Result<MetaFeatureVector> {
    if table.len() < 2 {
        return Err(RunpredictError::insufficient(
            "at least 2 rows",
            format!("{} rows", table.len()),
        ));
    }
    let inputs = table.schema().inputs();
    if !inputs.iter().any(|a| a.is_numeric()) {
        return Err(RunpredictError::insufficient(
            "at least 1 numeric input column",
            format!("0 numeric of {} inputs", inputs.len()),
        ));
    }

    let labels = table.labels();
    let (lo, hi) = stats::min_max(&labels).unwrap_or((f64::NAN, f64::NAN));
    let label_cv = undefined_as_nan(stats::coefficient_of_variation(&labels))?;

    let constant_label = lo == hi;
    let (max_correlation, min_correlation) = if constant_label {
        (f64::NAN, f64::NAN)
    } else {
        let mut correlations = Vec::with_capacity(inputs.len());
        for (col, attr) in inputs.iter().enumerate() {
            let column = table.column(col);
            let r = match &attr.kind {
                AttributeKind::Numeric => numeric_correlation(&column, &labels)?,
                AttributeKind::Nominal(values) => {
                    nominal_correlation(&column, values.len(), &labels)?
                }
            };
            correlations.push(r);
        }
        correlations
            .iter()
            .fold((f64::NEG_INFINITY, f64::INFINITY), |(mx, mn), &r| (mx.max(r), mn.min(r)))
    };
    let r_squared = undefined_as_nan(explained_variance(table, &labels))?;

    let features = MetaFeatureVector {
        size: table.len() as f64,
        parameter_count: inputs.len() as f64,
        label_range: hi - lo,
        label_cv,
        max_correlation,
        min_correlation,
        r_squared,
    };
    debug!(table = table.name(), ?features, "extracted meta-features");
    Ok(features)
}

#[cfg(test)]
#[path = "features_tests.rs"]
mod tests;
