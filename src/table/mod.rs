//! Observation tables: labeled parameter rows with a declared schema.
//!
//! A table holds rows of input-parameter values followed by exactly one
//! numeric label (the measured runtime). Nominal cells are stored as the
//! index of their value in the attribute's value list, so every row is a
//! plain `Vec<f64>`.
//!
//! # Examples
//!
//! ```
//! use runpredict::table::{ObservationTable, Schema};
//!
//! let schema = Schema::numeric(&["ArraySize"], "Runtime(ns)").expect("unique names");
//! let mut table = ObservationTable::new("sort", schema);
//! table.push(vec![100.0, 2_500.0]).expect("arity matches schema");
//! table.push_csv("200,5100").expect("numeric tokens");
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.labels(), vec![2_500.0, 5_100.0]);
//! ```

pub mod io;

use crate::error::{Result, RunpredictError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Type of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Real-valued column
    Numeric,
    /// Categorical column with its ordered value list
    Nominal(Vec<String>),
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Column name
    pub name: String,
    /// Column type
    pub kind: AttributeKind,
}

impl Attribute {
    /// Creates a numeric attribute.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Numeric,
        }
    }

    /// Creates a nominal attribute with the given values.
    pub fn nominal(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Nominal(values),
        }
    }

    /// Returns true for numeric attributes.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, AttributeKind::Numeric)
    }

    /// Converts a raw token into the stored cell value.
    fn encode(&self, token: &str) -> Result<f64> {
        let token = token.trim();
        match &self.kind {
            AttributeKind::Numeric => {
                let value: f64 = token.parse().map_err(|_| RunpredictError::SchemaMismatch {
                    expected: format!("numeric value for {}", self.name),
                    actual: format!("{token:?}"),
                })?;
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(RunpredictError::SchemaMismatch {
                        expected: format!("finite value for {}", self.name),
                        actual: token.to_string(),
                    })
                }
            }
            AttributeKind::Nominal(values) => values
                .iter()
                .position(|v| v == token)
                .map(|idx| idx as f64)
                .ok_or_else(|| RunpredictError::SchemaMismatch {
                    expected: format!("one of {values:?} for {}", self.name),
                    actual: format!("{token:?}"),
                }),
        }
    }

    /// Checks that an already encoded cell is valid for this attribute.
    fn validate(&self, value: f64) -> Result<()> {
        let ok = match &self.kind {
            AttributeKind::Numeric => value.is_finite(),
            AttributeKind::Nominal(values) => {
                value.fract() == 0.0 && value >= 0.0 && (value as usize) < values.len()
            }
        };
        if ok {
            Ok(())
        } else {
            Err(RunpredictError::SchemaMismatch {
                expected: format!("valid {:?} value for {}", self.kind, self.name),
                actual: value.to_string(),
            })
        }
    }
}

/// Ordered attribute list; the last attribute is the numeric label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Attribute>", into = "Vec<Attribute>")]
pub struct Schema {
    attributes: Vec<Attribute>,
}

impl Schema {
    /// Creates a schema from attributes; the last one is the label.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no attribute, the label is nominal, or
    /// names repeat.
    pub fn new(attributes: Vec<Attribute>) -> Result<Self> {
        let Some(label) = attributes.last() else {
            return Err(RunpredictError::insufficient(
                "at least a label attribute",
                "no attributes",
            ));
        };
        if !label.is_numeric() {
            return Err(RunpredictError::SchemaMismatch {
                expected: "numeric label column".to_string(),
                actual: format!("nominal column {}", label.name),
            });
        }
        let mut names: Vec<&str> = attributes.iter().map(|a| a.name.as_str()).collect();
        names.sort_unstable();
        if let Some(dup) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(RunpredictError::SchemaMismatch {
                expected: "unique attribute names".to_string(),
                actual: format!("duplicate {}", dup[0]),
            });
        }
        Ok(Self { attributes })
    }

    /// Schema with numeric inputs and a numeric label.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::SchemaMismatch`] if names repeat.
    pub fn numeric(inputs: &[&str], label: &str) -> Result<Self> {
        let attributes = inputs
            .iter()
            .map(|name| Attribute::numeric(*name))
            .chain(std::iter::once(Attribute::numeric(label)))
            .collect();
        Self::new(attributes)
    }

    /// Default monitoring schema: `InputParam_0..n` followed by `Runtime(ns)`.
    #[must_use]
    pub fn with_inputs(n_inputs: usize) -> Self {
        let attributes = (0..n_inputs)
            .map(|i| Attribute::numeric(format!("InputParam_{i}")))
            .chain(std::iter::once(Attribute::numeric("Runtime(ns)")))
            .collect();
        Self { attributes }
    }

    /// All attributes including the label.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Input attributes (everything but the label).
    #[must_use]
    pub fn inputs(&self) -> &[Attribute] {
        &self.attributes[..self.attributes.len() - 1]
    }

    /// The label attribute.
    #[must_use]
    pub fn label(&self) -> &Attribute {
        &self.attributes[self.attributes.len() - 1]
    }

    /// Number of columns including the label.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.attributes.len()
    }

    /// Number of input columns.
    #[must_use]
    pub fn n_inputs(&self) -> usize {
        self.attributes.len() - 1
    }

    /// Parses a comma-separated line into an encoded row.
    ///
    /// With `with_label` the line must carry every column; otherwise only the
    /// inputs.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::SchemaMismatch`] on wrong arity or a token
    /// that does not fit its column.
    pub fn parse_line(&self, line: &str, with_label: bool) -> Result<Vec<f64>> {
        let expected = if with_label {
            self.arity()
        } else {
            self.n_inputs()
        };
        let tokens: Vec<&str> = line.trim().split(',').collect();
        if tokens.len() != expected {
            return Err(RunpredictError::arity_mismatch(
                "comma separated line",
                expected,
                tokens.len(),
            ));
        }
        tokens
            .iter()
            .zip(&self.attributes)
            .map(|(token, attr)| attr.encode(token))
            .collect()
    }

    /// Validates an encoded row (with label).
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::SchemaMismatch`] on wrong arity or value.
    pub fn validate_row(&self, row: &[f64]) -> Result<()> {
        if row.len() != self.arity() {
            return Err(RunpredictError::arity_mismatch(
                "observation",
                self.arity(),
                row.len(),
            ));
        }
        self.attributes
            .iter()
            .zip(row)
            .try_for_each(|(attr, &value)| attr.validate(value))
    }

    /// Validates an encoded input vector (without label).
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::SchemaMismatch`] on wrong arity or value.
    pub fn validate_inputs(&self, features: &[f64]) -> Result<()> {
        if features.len() != self.n_inputs() {
            return Err(RunpredictError::arity_mismatch(
                "feature vector",
                self.n_inputs(),
                features.len(),
            ));
        }
        self.inputs()
            .iter()
            .zip(features)
            .try_for_each(|(attr, &value)| attr.validate(value))
    }
}

impl TryFrom<Vec<Attribute>> for Schema {
    type Error = RunpredictError;

    fn try_from(attributes: Vec<Attribute>) -> Result<Self> {
        Self::new(attributes)
    }
}

impl From<Schema> for Vec<Attribute> {
    fn from(schema: Schema) -> Self {
        schema.attributes
    }
}

/// In-memory dataset of parameter rows labeled with a measured scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationTable {
    name: String,
    schema: Schema,
    rows: Vec<Vec<f64>>,
}

impl ObservationTable {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
        }
    }

    /// Creates a table from encoded rows.
    ///
    /// # Errors
    ///
    /// Returns an error if any row violates the schema.
    pub fn from_rows(name: impl Into<String>, schema: Schema, rows: Vec<Vec<f64>>) -> Result<Self> {
        for row in &rows {
            schema.validate_row(row)?;
        }
        Ok(Self {
            name: name.into(),
            schema,
            rows,
        })
    }

    /// Dataset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of input columns.
    #[must_use]
    pub fn n_inputs(&self) -> usize {
        self.schema.n_inputs()
    }

    /// Appends a validated row.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::SchemaMismatch`]; the table is unchanged.
    pub fn push(&mut self, row: Vec<f64>) -> Result<()> {
        self.schema.validate_row(&row)?;
        self.rows.push(row);
        Ok(())
    }

    /// Parses and appends a comma-separated row that includes the label.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::SchemaMismatch`]; the table is unchanged.
    pub fn push_csv(&mut self, line: &str) -> Result<()> {
        let row = self.schema.parse_line(line, true)?;
        self.rows.push(row);
        Ok(())
    }

    /// Full row (inputs followed by label).
    #[must_use]
    pub fn row(&self, idx: usize) -> &[f64] {
        &self.rows[idx]
    }

    /// Input values of a row.
    #[must_use]
    pub fn features(&self, idx: usize) -> &[f64] {
        let row = &self.rows[idx];
        &row[..row.len() - 1]
    }

    /// Label of a row.
    #[must_use]
    pub fn label(&self, idx: usize) -> f64 {
        let row = &self.rows[idx];
        row[row.len() - 1]
    }

    /// All labels in row order.
    #[must_use]
    pub fn labels(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r[r.len() - 1]).collect()
    }

    /// All values of column `col` in row order.
    #[must_use]
    pub fn column(&self, col: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r[col]).collect()
    }

    /// Iterates over full rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Permutes the rows in place with a seeded generator.
    ///
    /// Any index previously taken into this table is invalidated.
    pub fn shuffle(&mut self, seed: u64) {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        self.rows.shuffle(&mut rng);
    }

    /// Copies `len` rows starting at `start` into a new table.
    ///
    /// # Errors
    ///
    /// Returns [`RunpredictError::InsufficientData`] if the range exceeds the table.
    pub fn slice(&self, start: usize, len: usize) -> Result<Self> {
        let end = start.checked_add(len).filter(|&end| end <= self.rows.len());
        let Some(end) = end else {
            return Err(RunpredictError::insufficient(
                format!("rows {start}..{}", start.saturating_add(len)),
                format!("{} rows", self.rows.len()),
            ));
        };
        Ok(Self {
            name: self.name.clone(),
            schema: self.schema.clone(),
            rows: self.rows[start..end].to_vec(),
        })
    }

    /// Copies the rows at the given indices into a new table.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            name: self.name.clone(),
            schema: self.schema.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Renders an input cell for output (nominal indices become their value).
    #[must_use]
    pub fn render_cell(&self, col: usize, value: f64) -> String {
        match &self.schema.attributes()[col].kind {
            AttributeKind::Numeric => value.to_string(),
            AttributeKind::Nominal(values) => values
                .get(value as usize)
                .cloned()
                .unwrap_or_else(|| value.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
