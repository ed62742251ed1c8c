//! CSV decoding for contact bulk imports.
//!
//! This module has zero external dependencies (no DB, no async, no I/O).
//! It turns raw file text into an ordered sequence of header-keyed rows:
//!
//! - The first non-blank line is the header row.
//! - Blank lines are skipped entirely.
//! - A field wrapped in a pair of quote characters has its outer quotes
//!   stripped; fields are split on bare commas (no embedded-delimiter
//!   handling beyond the stripping).
//! - Row numbers are 1-based positions among non-blank data lines.

use std::collections::HashMap;

use crate::error::CoreError;

// ── Column names ─────────────────────────────────────────────────────

pub const HEADER_NOMBRE: &str = "nombre";
pub const HEADER_APELLIDO: &str = "apellido";
pub const HEADER_EMAIL: &str = "email";
pub const HEADER_TELEFONO: &str = "telefono";

/// Headers that must be present for a file to be importable.
pub const MANDATORY_HEADERS: &[&str] = &[HEADER_NOMBRE, HEADER_APELLIDO];

/// Downloadable template handed to users before their first import.
pub const CSV_TEMPLATE: &str = "\
nombre,apellido,email,telefono
Juan,Pérez,juan.perez@example.com,+34 600 123 456
María,García,maria.garcia@example.com,
";

// ── Types ────────────────────────────────────────────────────────────

/// A decoded data row: its 1-based position and header-keyed raw values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based position among non-blank data lines of the original file.
    pub row_number: i64,
    /// Raw field values keyed by (lowercased, trimmed) header name.
    pub fields: HashMap<String, String>,
}

// ── Parsing ──────────────────────────────────────────────────────────

/// Decode CSV file text into ordered rows.
///
/// Fails with [`CoreError::Validation`] when the content is empty or a
/// mandatory header is missing. A file containing only a valid header
/// row decodes to an empty vector, which is not an error.
pub fn parse_csv(content: &str) -> Result<Vec<CsvRow>, CoreError> {
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());

    let header_line = lines
        .next()
        .ok_or_else(|| CoreError::Validation("El archivo CSV está vacío".to_string()))?;

    let headers: Vec<String> = split_line(header_line)
        .into_iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let missing: Vec<&str> = MANDATORY_HEADERS
        .iter()
        .filter(|m| !headers.iter().any(|h| h == *m))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::Validation(format!(
            "El archivo CSV no contiene las columnas obligatorias: {}",
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    for (i, line) in lines.enumerate() {
        let values = split_line(line);
        let mut fields = HashMap::with_capacity(headers.len());
        for (j, header) in headers.iter().enumerate() {
            let value = values.get(j).cloned().unwrap_or_default();
            fields.insert(header.clone(), value);
        }
        rows.push(CsvRow {
            row_number: (i + 1) as i64,
            fields,
        });
    }

    Ok(rows)
}

/// Split a line on bare commas and strip one outer pair of quotes per field.
fn split_line(line: &str) -> Vec<String> {
    line.split(',').map(strip_outer_quotes).collect()
}

/// Capture a row's original field values as a JSON object for audit
/// storage. Only the four contact columns are kept; absent columns
/// default to empty strings so the audit export stays rectangular.
pub fn raw_values(row: &CsvRow) -> serde_json::Value {
    let get = |h: &str| row.fields.get(h).cloned().unwrap_or_default();
    serde_json::json!({
        HEADER_NOMBRE: get(HEADER_NOMBRE),
        HEADER_APELLIDO: get(HEADER_APELLIDO),
        HEADER_EMAIL: get(HEADER_EMAIL),
        HEADER_TELEFONO: get(HEADER_TELEFONO),
    })
}

/// Remove a single matching pair of surrounding double quotes, if present.
fn strip_outer_quotes(field: &str) -> String {
    if field.len() >= 2 && field.starts_with('"') && field.ends_with('"') {
        field[1..field.len() - 1].to_string()
    } else {
        field.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
