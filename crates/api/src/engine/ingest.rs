//! The ingestion orchestrator: turns a confirmed CSV payload into
//! persisted contacts plus an exhaustive per-row audit trail.
//!
//! Rows are processed strictly in ascending row order, in chunks of
//! [`CHUNK_SIZE`], each chunk inside one transaction. The per-row
//! duplicate check reads through the open transaction, so later rows
//! see contacts committed earlier in the same run — the first
//! occurrence of a value wins and later occurrences fail as
//! duplicates. Do not parallelize row processing: the ordering is
//! load-bearing for that visibility guarantee.

use agenda_core::csv::{self, raw_values, CsvRow};
use agenda_core::import::{final_status, CHUNK_SIZE};
use agenda_core::validation;
use agenda_db::models::contact::{Contact, CreateContact};
use agenda_db::models::import::{CreateImportBatch, CreateImportLogEntry, ImportBatch};
use agenda_db::repositories::{ContactRepo, ImportBatchRepo, ImportLogRepo};
use agenda_db::DbPool;
use sqlx::{Acquire, Postgres, Transaction};

use crate::error::{AppError, AppResult};

/// Outcome of one processed row within a chunk.
enum RowOutcome {
    /// Contact inserted, success entry logged.
    Inserted,
    /// Validation or duplicate failure, error entry logged.
    Failed,
    /// Unexpected fault, downgraded to a logged failure; the message
    /// also goes on the batch-level error list.
    Fault(String),
}

/// Counters and batch-level errors accumulated by one chunk.
#[derive(Default)]
struct ChunkOutcome {
    successful: i32,
    failed: i32,
    errors: Vec<String>,
}

/// Run a full ingestion: create the batch, process every chunk in
/// order, and close the batch with its terminal status.
///
/// Structural failures (empty content, missing mandatory headers)
/// propagate before any batch row is created. Row-level failures never
/// abort the run.
pub async fn run_import(pool: &DbPool, content: &str, filename: &str) -> AppResult<ImportBatch> {
    let rows = csv::parse_csv(content)?;

    let batch = ImportBatchRepo::create(
        pool,
        &CreateImportBatch {
            filename: filename.to_string(),
            total_records: rows.len() as i32,
        },
    )
    .await?;
    tracing::info!(batch_id = batch.id, total = rows.len(), "Import batch started");

    let mut successful = 0i32;
    let mut failed = 0i32;
    let mut batch_errors: Vec<String> = Vec::new();

    for chunk in rows.chunks(CHUNK_SIZE) {
        match process_chunk(pool, batch.id, chunk, successful, failed).await {
            Ok(outcome) => {
                successful += outcome.successful;
                failed += outcome.failed;
                batch_errors.extend(outcome.errors);
            }
            Err(e) => {
                // The chunk's transaction rolled back: none of its rows
                // were recorded. Count them failed and move on.
                let first = chunk.first().map(|r| r.row_number).unwrap_or_default();
                tracing::error!(batch_id = batch.id, first_row = first, error = %e,
                    "Chunk transaction failed");
                failed += chunk.len() as i32;
                batch_errors.push(format!("Error procesando el bloque desde la fila {first}: {e}"));
            }
        }
    }

    let status = final_status(successful, failed);
    let errors_json = if batch_errors.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&batch_errors).map_err(|e| {
            AppError::InternalError(format!("Failed to serialize batch errors: {e}"))
        })?)
    };

    let finalized = ImportBatchRepo::finalize(
        pool,
        batch.id,
        status.as_str(),
        successful,
        failed,
        errors_json.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::InternalError(format!("Import batch {} vanished", batch.id)))?;

    tracing::info!(batch_id = finalized.id, successful, failed, status = %status,
        "Import batch finished");
    Ok(finalized)
}

/// Process one chunk inside a single transaction, rows in ascending
/// order. Returns the chunk's counter deltas; the running totals are
/// persisted with the same commit so polling sees committed progress.
async fn process_chunk(
    pool: &DbPool,
    batch_id: i64,
    chunk: &[CsvRow],
    base_successful: i32,
    base_failed: i32,
) -> Result<ChunkOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut outcome = ChunkOutcome::default();

    for row in chunk {
        match process_row(&mut tx, batch_id, row).await? {
            RowOutcome::Inserted => outcome.successful += 1,
            RowOutcome::Failed => outcome.failed += 1,
            RowOutcome::Fault(message) => {
                outcome.failed += 1;
                outcome.errors.push(message);
            }
        }
    }

    ImportBatchRepo::update_counts(
        &mut tx,
        batch_id,
        base_successful + outcome.successful,
        base_failed + outcome.failed,
    )
    .await?;

    tx.commit().await?;
    Ok(outcome)
}

/// Process a single row: validate, duplicate-check through the open
/// transaction, insert, and log the outcome.
///
/// The insert runs under a savepoint so an unexpected database fault
/// poisons neither the chunk transaction nor the rows after it.
async fn process_row(
    tx: &mut Transaction<'_, Postgres>,
    batch_id: i64,
    row: &CsvRow,
) -> Result<RowOutcome, sqlx::Error> {
    let normalized = match validation::validate_row(row) {
        Ok(normalized) => normalized,
        Err(errors) => {
            log_row(tx, batch_id, row, "error", Some(errors.join("; "))).await?;
            return Ok(RowOutcome::Failed);
        }
    };

    // Duplicate check sees everything committed before this run plus
    // rows inserted earlier in this same transaction.
    if normalized.email.is_some() || normalized.telefono.is_some() {
        let existing = ContactRepo::find_by_email_or_telefono(
            &mut *tx,
            normalized.email.as_deref(),
            normalized.telefono.as_deref(),
        )
        .await?;

        if let Some(existing) = existing {
            let message = collision_message(&normalized, &existing);
            log_row(tx, batch_id, row, "error", Some(message)).await?;
            return Ok(RowOutcome::Failed);
        }
    }

    let mut savepoint = tx.begin().await?;
    let inserted = ContactRepo::insert(&mut savepoint, &CreateContact::from(normalized.clone())).await;

    match inserted {
        Ok(_) => {
            savepoint.commit().await?;
            log_row(tx, batch_id, row, "success", None).await?;
            Ok(RowOutcome::Inserted)
        }
        Err(e) => {
            savepoint.rollback().await?;
            if let Some(field) = unique_violation_field(&e) {
                // A concurrent run inserted the value between our check
                // and the insert; same outcome as the in-run check.
                let value = match field {
                    "email" => normalized.email.as_deref().unwrap_or_default(),
                    _ => normalized.telefono.as_deref().unwrap_or_default(),
                };
                let message = duplicate_message(field, value);
                log_row(tx, batch_id, row, "error", Some(message)).await?;
                Ok(RowOutcome::Failed)
            } else {
                let message = format!("Fila {}: {e}", row.row_number);
                tracing::error!(batch_id, row = row.row_number, error = %e,
                    "Unexpected error processing row");
                log_row(tx, batch_id, row, "error", Some(message.clone())).await?;
                Ok(RowOutcome::Fault(message))
            }
        }
    }
}

/// Append one audit log entry on the chunk transaction.
async fn log_row(
    tx: &mut Transaction<'_, Postgres>,
    batch_id: i64,
    row: &CsvRow,
    status: &'static str,
    error_message: Option<String>,
) -> Result<(), sqlx::Error> {
    ImportLogRepo::create(
        &mut *tx,
        &CreateImportLogEntry {
            import_batch_id: batch_id,
            row_number: row.row_number as i32,
            status,
            error_message,
            raw_data: raw_values(row),
        },
    )
    .await?;
    Ok(())
}

/// Name the field that collided with an existing contact.
fn collision_message(row: &agenda_core::validation::NormalizedRow, existing: &Contact) -> String {
    let email_matches = match (&row.email, &existing.email) {
        (Some(a), Some(b)) => a.to_lowercase() == b.to_lowercase(),
        _ => false,
    };
    if email_matches {
        duplicate_message("email", row.email.as_deref().unwrap_or_default())
    } else {
        duplicate_message("telefono", row.telefono.as_deref().unwrap_or_default())
    }
}

/// User-facing duplicate-conflict message for a field/value pair.
fn duplicate_message(field: &str, value: &str) -> String {
    match field {
        "email" => format!("Ya existe un contacto con el email '{value}'"),
        _ => format!("Ya existe un contacto con el teléfono '{value}'"),
    }
}

/// Extract the colliding field from a unique-constraint violation, if
/// that is what the error is.
fn unique_violation_field(err: &sqlx::Error) -> Option<&'static str> {
    if let sqlx::Error::Database(db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return match db_err.constraint() {
                Some("uq_contacts_email") => Some("email"),
                Some("uq_contacts_telefono") => Some("telefono"),
                _ => None,
            };
        }
    }
    None
}
