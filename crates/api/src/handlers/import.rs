//! Handlers for the CSV bulk-import pipeline: preview, ingestion,
//! status polling, audit log, and audit export.

use agenda_core::error::CoreError;
use agenda_core::export::{build_log_report, ReportEntry, ReportSummary};
use agenda_core::import::MAX_STATUS_ERRORS;
use agenda_core::types::DbId;
use agenda_db::models::import::{ImportBatch, ImportLogEntry, ImportStatusReport};
use agenda_db::repositories::{ImportBatchRepo, ImportLogRepo};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::engine::{self, ingest, preview};
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/contactos/import/preview
///
/// Validation-only dry run: decodes and classifies every row, flags
/// duplicates within the batch and against the store. Writes nothing.
pub async fn preview_import(
    State(state): State<AppState>,
    Json(upload): Json<engine::CsvUpload>,
) -> AppResult<Json<DataResponse<preview::ImportPreview>>> {
    let content = engine::decode_payload(&upload)?;
    let report = preview::preview_import(&state.pool, &content).await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/contactos/import
///
/// Run the full ingestion and return the finalized batch record.
pub async fn run_import(
    State(state): State<AppState>,
    Json(upload): Json<engine::CsvUpload>,
) -> AppResult<(StatusCode, Json<DataResponse<ImportBatch>>)> {
    let content = engine::decode_payload(&upload)?;
    let batch = ingest::run_import(&state.pool, &content, &upload.nombre_archivo).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: batch })))
}

/// GET /api/v1/contactos/import/{id}/estado
///
/// Progress snapshot for a batch. An unknown batch id yields
/// `data: null` rather than an error, so pollers can distinguish
/// "gone" from "failed request".
pub async fn get_status(
    State(state): State<AppState>,
    Path(batch_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Option<ImportStatusReport>>>> {
    let Some(batch) = ImportBatchRepo::find_by_id(&state.pool, batch_id).await? else {
        return Ok(Json(DataResponse { data: None }));
    };

    let processed_records = ImportLogRepo::count_by_batch(&state.pool, batch_id).await?;

    // Batch-level error text first, then row errors up to the cap.
    let mut errors: Vec<String> = Vec::new();
    if let Some(batch_errors) = &batch.errors {
        errors.push(batch_errors.clone());
    }
    let remaining = MAX_STATUS_ERRORS.saturating_sub(errors.len());
    if remaining > 0 {
        errors.extend(
            ImportLogRepo::list_error_messages(&state.pool, batch_id, remaining as i64).await?,
        );
    }

    Ok(Json(DataResponse {
        data: Some(ImportStatusReport {
            batch_id: batch.id,
            status: batch.status,
            total_records: batch.total_records,
            processed_records,
            successful_records: batch.successful_records,
            failed_records: batch.failed_records,
            errors,
        }),
    }))
}

/// GET /api/v1/contactos/import/{id}/log
///
/// All log entries for a batch ordered by row number. An unknown batch
/// yields an empty list.
pub async fn get_log(
    State(state): State<AppState>,
    Path(batch_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ImportLogEntry>>>> {
    let entries = ImportLogRepo::list_by_batch(&state.pool, batch_id).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/contactos/import/{id}/log/export
///
/// Download the audit report as CSV. Fails with 404 for an unknown
/// batch (unlike the status endpoint, a download must fail loudly).
pub async fn export_log(
    State(state): State<AppState>,
    Path(batch_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let batch = ImportBatchRepo::find_by_id(&state.pool, batch_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ImportBatch",
            id: batch_id,
        })?;

    let entries = ImportLogRepo::list_by_batch(&state.pool, batch_id).await?;
    let report_entries: Vec<ReportEntry> = entries
        .into_iter()
        .map(|e| ReportEntry {
            row_number: e.row_number as i64,
            status: e.status,
            error_message: e.error_message,
            raw_data: e.raw_data,
        })
        .collect();

    let report = build_log_report(
        &ReportSummary {
            filename: &batch.filename,
            created_at: batch.created_at,
            total_records: batch.total_records,
            successful_records: batch.successful_records,
            failed_records: batch.failed_records,
            status: &batch.status,
        },
        &report_entries,
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"informe_importacion_{batch_id}.csv\""),
            ),
        ],
        report,
    ))
}
