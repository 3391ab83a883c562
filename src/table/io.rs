//! Tabular file I/O for observation tables.
//!
//! Two input formats are understood:
//!
//! - CSV with a header row. A column whose every cell parses as a number is
//!   numeric; any other column is nominal with its values in first-seen order.
//! - ARFF-style self-describing files (`@relation`, `@attribute`, `@data`).
//!
//! The last column is always the label. Rows containing a missing value
//! (`?` or an empty cell) are skipped.

use super::{Attribute, AttributeKind, ObservationTable, Schema};
use crate::error::{Result, RunpredictError};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Loads a table, choosing the reader from the file extension.
///
/// # Errors
///
/// Returns an error for unknown extensions, unreadable files, or malformed
/// content.
pub fn load<P: AsRef<Path>>(path: P) -> Result<ObservationTable> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => read_csv(path),
        Some("arff") => read_arff(path),
        other => Err(RunpredictError::Format {
            message: format!(
                "unsupported table extension {other:?} for {} (expected csv or arff)",
                path.display()
            ),
        }),
    }
}

fn dataset_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string()
}

fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || cell == "?"
}

/// Infers column kinds and encodes string rows.
fn build_table(
    name: String,
    names: Vec<String>,
    records: Vec<Vec<String>>,
) -> Result<ObservationTable> {
    let n_cols = names.len();
    let mut attributes = Vec::with_capacity(n_cols);
    for (col, col_name) in names.into_iter().enumerate() {
        let cells = records.iter().map(|r| r[col].trim());
        let numeric = cells.clone().all(|c| c.parse::<f64>().is_ok());
        if numeric {
            attributes.push(Attribute::numeric(col_name));
        } else {
            let mut values: Vec<String> = Vec::new();
            for cell in cells {
                if !values.iter().any(|v| v == cell) {
                    values.push(cell.to_string());
                }
            }
            attributes.push(Attribute::nominal(col_name, values));
        }
    }
    let schema = Schema::new(attributes)?;
    let mut table = ObservationTable::new(name, schema);
    for record in &records {
        let cells: Vec<&str> = record.iter().map(String::as_str).collect();
        push_tokens(&mut table, &cells)?;
    }
    Ok(table)
}

/// Encodes already split cells against the table schema and appends them.
fn push_tokens(table: &mut ObservationTable, cells: &[&str]) -> Result<()> {
    let attributes = table.schema().attributes();
    if cells.len() != attributes.len() {
        return Err(RunpredictError::arity_mismatch(
            "data row",
            attributes.len(),
            cells.len(),
        ));
    }
    let row = cells
        .iter()
        .zip(attributes)
        .map(|(cell, attr)| attr.encode(cell))
        .collect::<Result<Vec<f64>>>()?;
    table.push(row)
}

/// Reads a CSV file with a header row.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a row has the wrong number
/// of cells, or the label column is not numeric.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<ObservationTable> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let names: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if names.is_empty() {
        return Err(RunpredictError::Format {
            message: format!("{} has no header row", path.display()),
        });
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() != names.len() {
            return Err(RunpredictError::Format {
                message: format!(
                    "line {}: expected {} cells, found {}",
                    line + 2,
                    names.len(),
                    record.len()
                ),
            });
        }
        if record.iter().any(is_missing) {
            skipped += 1;
            continue;
        }
        records.push(record.iter().map(str::to_string).collect());
    }
    if skipped > 0 {
        warn!(path = %path.display(), skipped, "skipped rows with missing values");
    }
    debug!(path = %path.display(), rows = records.len(), "read csv table");
    build_table(dataset_name(path), names, records)
}

/// Strips optional single or double quotes around a token.
fn unquote(token: &str) -> &str {
    let token = token.trim();
    token
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .or_else(|| token.strip_prefix('"').and_then(|t| t.strip_suffix('"')))
        .unwrap_or(token)
}

/// Parses one `@attribute` declaration.
fn parse_attribute(decl: &str, line_no: usize) -> Result<Attribute> {
    let decl = decl.trim();
    let (name, rest) = if let Some(stripped) = decl.strip_prefix('\'') {
        let end = stripped.find('\'').ok_or_else(|| RunpredictError::Format {
            message: format!("line {line_no}: unterminated attribute name"),
        })?;
        (&stripped[..end], &stripped[end + 1..])
    } else {
        decl.split_once(char::is_whitespace)
            .ok_or_else(|| RunpredictError::Format {
                message: format!("line {line_no}: attribute without type"),
            })?
    };
    let kind = rest.trim();
    if let Some(inner) = kind.strip_prefix('{').and_then(|k| k.strip_suffix('}')) {
        let values = inner.split(',').map(|v| unquote(v).to_string()).collect();
        return Ok(Attribute::nominal(name, values));
    }
    match kind.to_ascii_lowercase().as_str() {
        "numeric" | "real" | "integer" => Ok(Attribute::numeric(name)),
        other => Err(RunpredictError::Format {
            message: format!("line {line_no}: unsupported attribute type {other}"),
        }),
    }
}

/// Reads an ARFF-style file.
///
/// # Errors
///
/// Returns an error on unreadable files, unsupported attribute types, or
/// data rows that do not match the declared attributes.
pub fn read_arff<P: AsRef<Path>>(path: P) -> Result<ObservationTable> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let mut name = dataset_name(path);
    let mut attributes = Vec::new();
    let mut data_lines = Vec::new();
    let mut in_data = false;

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        if in_data {
            data_lines.push(line);
            continue;
        }
        let lower = line.to_ascii_lowercase();
        if lower.starts_with("@relation") {
            name = unquote(&line["@relation".len()..]).to_string();
        } else if lower.starts_with("@attribute") {
            attributes.push(parse_attribute(&line["@attribute".len()..], idx + 1)?);
        } else if lower.starts_with("@data") {
            in_data = true;
        } else {
            return Err(RunpredictError::Format {
                message: format!("line {}: unexpected header line {line}", idx + 1),
            });
        }
    }

    let mut table = ObservationTable::new(name, Schema::new(attributes)?);
    for line in data_lines {
        let cleaned: Vec<&str> = line.split(',').map(unquote).collect();
        if cleaned.iter().any(|c| is_missing(c)) {
            continue;
        }
        push_tokens(&mut table, &cleaned)?;
    }
    debug!(path = %path.display(), rows = table.len(), "read arff table");
    Ok(table)
}

/// Writes a table as CSV with a header row; nominal cells are written as values.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_csv<P: AsRef<Path>>(table: &ObservationTable, path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record(table.schema().attributes().iter().map(|a| a.name.as_str()))?;
    for row in table.rows() {
        writer.write_record(
            row.iter()
                .enumerate()
                .map(|(col, &value)| table.render_cell(col, value)),
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a table in the ARFF-style format.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_arff<P: AsRef<Path>>(table: &ObservationTable, path: P) -> Result<()> {
    let mut file = fs::File::create(path.as_ref())?;
    writeln!(file, "@relation '{}'", table.name())?;
    writeln!(file)?;
    for attr in table.schema().attributes() {
        match &attr.kind {
            AttributeKind::Numeric => writeln!(file, "@attribute '{}' numeric", attr.name)?,
            AttributeKind::Nominal(values) => {
                writeln!(file, "@attribute '{}' {{{}}}", attr.name, values.join(","))?;
            }
        }
    }
    writeln!(file)?;
    writeln!(file, "@data")?;
    for row in table.rows() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(col, &value)| table.render_cell(col, value))
            .collect();
        writeln!(file, "{}", cells.join(","))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "io_tests.rs"]
mod tests;
