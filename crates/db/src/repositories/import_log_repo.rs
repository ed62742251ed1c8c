//! Repository for the `import_log_entries` table.

use agenda_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::import::{CreateImportLogEntry, ImportLogEntry};

/// Column list for import_log_entries queries.
const COLUMNS: &str =
    "id, import_batch_id, row_number, status, error_message, raw_data, created_at";

/// Provides append and read operations for per-row import log entries.
pub struct ImportLogRepo;

impl ImportLogRepo {
    /// Append one log entry inside the caller's chunk transaction.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateImportLogEntry,
    ) -> Result<ImportLogEntry, sqlx::Error> {
        let sql = format!(
            "INSERT INTO import_log_entries \
                (import_batch_id, row_number, status, error_message, raw_data) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportLogEntry>(&sql)
            .bind(input.import_batch_id)
            .bind(input.row_number)
            .bind(input.status)
            .bind(&input.error_message)
            .bind(&input.raw_data)
            .fetch_one(conn)
            .await
    }

    /// List all entries for a batch ordered by row number ascending.
    ///
    /// The explicit ORDER BY matters: chunked ingestion gives no
    /// guarantee that insertion order matches row order.
    pub async fn list_by_batch(
        pool: &PgPool,
        batch_id: DbId,
    ) -> Result<Vec<ImportLogEntry>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM import_log_entries \
             WHERE import_batch_id = $1 \
             ORDER BY row_number ASC"
        );
        sqlx::query_as::<_, ImportLogEntry>(&sql)
            .bind(batch_id)
            .fetch_all(pool)
            .await
    }

    /// Number of entries written so far for a batch.
    pub async fn count_by_batch(pool: &PgPool, batch_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM import_log_entries WHERE import_batch_id = $1")
                .bind(batch_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Error messages for a batch in log order, capped at `limit`.
    pub async fn list_error_messages(
        pool: &PgPool,
        batch_id: DbId,
        limit: i64,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(Option<String>,)> = sqlx::query_as(
            "SELECT error_message FROM import_log_entries \
             WHERE import_batch_id = $1 AND status = 'error' \
             ORDER BY id ASC \
             LIMIT $2",
        )
        .bind(batch_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().filter_map(|(message,)| message).collect())
    }
}
