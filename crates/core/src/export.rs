//! Audit-log CSV report building and field escaping.
//!
//! Pure text assembly: the `api` layer loads the batch and its log
//! entries, this module turns them into the downloadable report.

use crate::csv::{HEADER_APELLIDO, HEADER_EMAIL, HEADER_NOMBRE, HEADER_TELEFONO};
use crate::types::Timestamp;

/// Column header line of the report's data section.
pub const REPORT_COLUMNS: &str = "Fila,Estado,Error,Nombre,Apellido,Email,Teléfono";

/// Batch summary fields shown in the report header block.
#[derive(Debug, Clone)]
pub struct ReportSummary<'a> {
    pub filename: &'a str,
    pub created_at: Timestamp,
    pub total_records: i32,
    pub successful_records: i32,
    pub failed_records: i32,
    pub status: &'a str,
}

/// One log entry as it appears in the report.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub row_number: i64,
    pub status: String,
    pub error_message: Option<String>,
    /// The row's original field values as captured at ingestion time.
    pub raw_data: serde_json::Value,
}

/// Build the full text report: summary block, blank separator line,
/// column header, then one line per entry ordered by row number.
pub fn build_log_report(summary: &ReportSummary<'_>, entries: &[ReportEntry]) -> String {
    let mut out = String::new();

    out.push_str("Informe de importación de contactos\n");
    out.push_str(&format!("Archivo: {}\n", summary.filename));
    out.push_str(&format!(
        "Fecha: {}\n",
        summary.created_at.format("%d/%m/%Y %H:%M")
    ));
    out.push_str(&format!("Total de filas: {}\n", summary.total_records));
    out.push_str(&format!("Exitosas: {}\n", summary.successful_records));
    out.push_str(&format!("Fallidas: {}\n", summary.failed_records));
    out.push_str(&format!("Estado: {}\n", summary.status));
    out.push('\n');
    out.push_str(REPORT_COLUMNS);
    out.push('\n');

    let mut ordered: Vec<&ReportEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.row_number);

    for entry in ordered {
        let (nombre, apellido, email, telefono) = raw_fields(&entry.raw_data);
        let line = [
            entry.row_number.to_string(),
            entry.status.clone(),
            entry.error_message.clone().unwrap_or_default(),
            nombre,
            apellido,
            email,
            telefono,
        ]
        .map(|f| escape_csv_field(&f))
        .join(",");
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Extract the four original contact fields from a captured raw-data
/// value. Anything unparseable defaults to empty strings rather than
/// failing the export.
fn raw_fields(raw: &serde_json::Value) -> (String, String, String, String) {
    let get = |key: &str| {
        raw.get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };
    (
        get(HEADER_NOMBRE),
        get(HEADER_APELLIDO),
        get(HEADER_EMAIL),
        get(HEADER_TELEFONO),
    )
}

/// Standard CSV escaping: wrap the value in quotes when it contains a
/// comma, quote, or newline, doubling internal quotes.
pub fn escape_csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn summary(filename: &str) -> ReportSummary<'_> {
        ReportSummary {
            filename,
            created_at: chrono::Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
            total_records: 2,
            successful_records: 1,
            failed_records: 1,
            status: "completed",
        }
    }

    fn entry(row_number: i64, status: &str, error: Option<&str>) -> ReportEntry {
        ReportEntry {
            row_number,
            status: status.to_string(),
            error_message: error.map(String::from),
            raw_data: serde_json::json!({
                "nombre": "Juan",
                "apellido": "Pérez",
                "email": "juan@x.com",
                "telefono": "600111222",
            }),
        }
    }

    // -- escape_csv_field -----------------------------------------------------

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(escape_csv_field("Juan"), "Juan");
    }

    #[test]
    fn comma_triggers_quoting() {
        assert_eq!(escape_csv_field("Juan, Jr."), "\"Juan, Jr.\"");
    }

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(escape_csv_field("alias \"Juanito\""), "\"alias \"\"Juanito\"\"\"");
    }

    #[test]
    fn newline_triggers_quoting() {
        assert_eq!(escape_csv_field("a\nb"), "\"a\nb\"");
    }

    #[test]
    fn empty_value_stays_empty() {
        assert_eq!(escape_csv_field(""), "");
    }

    // -- build_log_report -----------------------------------------------------

    #[test]
    fn report_has_summary_separator_and_columns() {
        let report = build_log_report(&summary("contactos.csv"), &[]);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "Informe de importación de contactos");
        assert_eq!(lines[1], "Archivo: contactos.csv");
        assert_eq!(lines[2], "Fecha: 14/03/2026 09:30");
        assert_eq!(lines[6], "Estado: completed");
        assert_eq!(lines[7], "");
        assert_eq!(lines[8], REPORT_COLUMNS);
    }

    #[test]
    fn entries_are_ordered_by_row_number() {
        let entries = vec![
            entry(3, "error", Some("dup")),
            entry(1, "success", None),
            entry(2, "success", None),
        ];
        let report = build_log_report(&summary("c.csv"), &entries);
        let data: Vec<&str> = report.lines().skip(9).collect();
        assert!(data[0].starts_with("1,"));
        assert!(data[1].starts_with("2,"));
        assert!(data[2].starts_with("3,"));
    }

    #[test]
    fn error_column_is_empty_for_success_rows() {
        let report = build_log_report(&summary("c.csv"), &[entry(1, "success", None)]);
        let data_line = report.lines().nth(9).unwrap();
        assert_eq!(data_line, "1,success,,Juan,Pérez,juan@x.com,600111222");
    }

    #[test]
    fn raw_values_with_commas_are_escaped() {
        let mut e = entry(1, "success", None);
        e.raw_data = serde_json::json!({ "nombre": "Juan, Jr.", "apellido": "Pérez" });
        let report = build_log_report(&summary("c.csv"), &[e]);
        let data_line = report.lines().nth(9).unwrap();
        assert_eq!(data_line, "1,success,,\"Juan, Jr.\",Pérez,,");
    }

    #[test]
    fn unparseable_raw_data_defaults_to_empty_fields() {
        let mut e = entry(1, "error", Some("boom"));
        e.raw_data = serde_json::Value::String("not an object".to_string());
        let report = build_log_report(&summary("c.csv"), &[e]);
        let data_line = report.lines().nth(9).unwrap();
        assert_eq!(data_line, "1,error,boom,,,,");
    }
}
