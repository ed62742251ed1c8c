//! Models for import batches and their per-row audit log.

use agenda_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ── Import batches ───────────────────────────────────────────────────

/// A row from the `import_batches` table. One per ingestion run.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportBatch {
    pub id: DbId,
    pub filename: String,
    pub total_records: i32,
    pub successful_records: i32,
    pub failed_records: i32,
    /// One of `pending|processing|completed|failed`.
    pub status: String,
    /// JSON-encoded list of unexpected processing errors, if any.
    pub errors: Option<String>,
    pub created_at: Timestamp,
    /// Null until the batch reaches a terminal state.
    pub completed_at: Option<Timestamp>,
}

/// DTO for opening a new import batch.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateImportBatch {
    pub filename: String,
    pub total_records: i32,
}

// ── Import log entries ───────────────────────────────────────────────

/// A row from the `import_log_entries` table. One per processed CSV
/// data row, append-only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportLogEntry {
    pub id: DbId,
    pub import_batch_id: DbId,
    /// 1-based position in the original CSV.
    pub row_number: i32,
    /// One of `success|error`.
    pub status: String,
    /// Present iff `status` is `error`.
    pub error_message: Option<String>,
    /// Original field values captured for audit export.
    pub raw_data: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for appending a log entry.
#[derive(Debug, Clone)]
pub struct CreateImportLogEntry {
    pub import_batch_id: DbId,
    pub row_number: i32,
    pub status: &'static str,
    pub error_message: Option<String>,
    pub raw_data: serde_json::Value,
}

// ── Status report DTO ────────────────────────────────────────────────

/// Progress snapshot returned by the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ImportStatusReport {
    pub batch_id: DbId,
    pub status: String,
    pub total_records: i32,
    /// Log entries written so far; may lag the final counts while the
    /// run is in flight.
    pub processed_records: i64,
    pub successful_records: i32,
    pub failed_records: i32,
    /// Batch-level error text first, then row errors, capped at 10.
    pub errors: Vec<String>,
}
