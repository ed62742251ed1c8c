//! Repository for the `contacts` table.

use agenda_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::contact::{Contact, CreateContact};

/// Column list for contacts queries.
const COLUMNS: &str = "id, nombre, apellido, email, telefono, created_at, updated_at";

/// Provides CRUD operations for contacts.
pub struct ContactRepo;

impl ContactRepo {
    /// Insert a new contact.
    ///
    /// Takes a connection rather than the pool so ingestion can run the
    /// insert inside its chunk transaction.
    pub async fn insert(
        conn: &mut PgConnection,
        input: &CreateContact,
    ) -> Result<Contact, sqlx::Error> {
        let sql = format!(
            "INSERT INTO contacts (nombre, apellido, email, telefono) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&sql)
            .bind(&input.nombre)
            .bind(&input.apellido)
            .bind(&input.email)
            .bind(&input.telefono)
            .fetch_one(conn)
            .await
    }

    /// Find a contact by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Contact>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM contacts WHERE id = $1");
        sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find one contact matching the given email (case-insensitive) or
    /// telefono (exact), whichever is present.
    ///
    /// Runs through the caller's transaction so an ingestion run sees
    /// rows it inserted earlier in the same chunk.
    pub async fn find_by_email_or_telefono(
        conn: &mut PgConnection,
        email: Option<&str>,
        telefono: Option<&str>,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM contacts \
             WHERE ($1::text IS NOT NULL AND email IS NOT NULL AND LOWER(email) = LOWER($1)) \
                OR ($2::text IS NOT NULL AND telefono = $2) \
             LIMIT 1"
        );
        sqlx::query_as::<_, Contact>(&sql)
            .bind(email)
            .bind(telefono)
            .fetch_optional(conn)
            .await
    }

    /// Find every contact whose email (lowercased) or telefono appears
    /// in the given sets. One round trip for the whole preview batch.
    pub async fn find_matching(
        pool: &PgPool,
        emails: &[String],
        telefonos: &[String],
    ) -> Result<Vec<Contact>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM contacts \
             WHERE (email IS NOT NULL AND LOWER(email) = ANY($1)) \
                OR (telefono IS NOT NULL AND telefono = ANY($2))"
        );
        sqlx::query_as::<_, Contact>(&sql)
            .bind(emails)
            .bind(telefonos)
            .fetch_all(pool)
            .await
    }

    /// List contacts, newest first.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Contact>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM contacts \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Contact>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of contacts.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contacts")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
