//! Repository for the `import_batches` table.

use agenda_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::import::{CreateImportBatch, ImportBatch};

/// Column list for import_batches queries.
const COLUMNS: &str = "id, filename, total_records, successful_records, failed_records, \
     status, errors, created_at, completed_at";

/// Provides CRUD operations for import batches.
pub struct ImportBatchRepo;

impl ImportBatchRepo {
    /// Open a new batch in `processing` status with its final total
    /// known up front.
    pub async fn create(
        pool: &PgPool,
        input: &CreateImportBatch,
    ) -> Result<ImportBatch, sqlx::Error> {
        let sql = format!(
            "INSERT INTO import_batches (filename, total_records, status) \
             VALUES ($1, $2, 'processing') \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportBatch>(&sql)
            .bind(&input.filename)
            .bind(input.total_records)
            .fetch_one(pool)
            .await
    }

    /// Find a batch by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ImportBatch>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM import_batches WHERE id = $1");
        sqlx::query_as::<_, ImportBatch>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update the running success/failure counters.
    ///
    /// Called at the end of each chunk, inside the chunk's transaction,
    /// so status polling sees committed progress.
    pub async fn update_counts(
        conn: &mut PgConnection,
        id: DbId,
        successful_records: i32,
        failed_records: i32,
    ) -> Result<Option<ImportBatch>, sqlx::Error> {
        let sql = format!(
            "UPDATE import_batches SET \
                successful_records = $2, \
                failed_records = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportBatch>(&sql)
            .bind(id)
            .bind(successful_records)
            .bind(failed_records)
            .fetch_optional(conn)
            .await
    }

    /// Close the batch: set its terminal status, final counters, the
    /// optional batch-level error text, and `completed_at`.
    pub async fn finalize(
        pool: &PgPool,
        id: DbId,
        status: &str,
        successful_records: i32,
        failed_records: i32,
        errors: Option<&str>,
    ) -> Result<Option<ImportBatch>, sqlx::Error> {
        let sql = format!(
            "UPDATE import_batches SET \
                status = $2, \
                successful_records = $3, \
                failed_records = $4, \
                errors = $5, \
                completed_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportBatch>(&sql)
            .bind(id)
            .bind(status)
            .bind(successful_records)
            .bind(failed_records)
            .bind(errors)
            .fetch_optional(pool)
            .await
    }
}
