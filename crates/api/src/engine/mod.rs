//! The CSV import engine: read-only preview and transactional ingestion.
//!
//! Both entry points take the same uploaded payload; `preview` never
//! writes, `ingest` owns the batch lifecycle and per-row audit log.

pub mod ingest;
pub mod preview;

use base64::Engine as _;
use serde::Deserialize;

use crate::error::AppError;

/// Uploaded CSV payload: base64-encoded file content plus the original
/// filename (metadata only).
#[derive(Debug, Deserialize)]
pub struct CsvUpload {
    pub contenido_csv: String,
    pub nombre_archivo: String,
}

/// Decode the transport encoding into file text.
///
/// Invalid base64 or non-UTF-8 content is a client error, not a row
/// failure: no batch is created for an undecodable upload.
pub fn decode_payload(upload: &CsvUpload) -> Result<String, AppError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(upload.contenido_csv.as_bytes())
        .map_err(|e| AppError::BadRequest(format!("Invalid base64 payload: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::BadRequest(format!("CSV content is not valid UTF-8: {e}")))
}
