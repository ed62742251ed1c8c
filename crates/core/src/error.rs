//! Domain-level error type shared across the workspace.

use crate::types::DbId;

/// Errors produced by domain logic.
///
/// The HTTP layer maps each variant onto a status code in
/// `agenda-api`'s `AppError`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity was looked up by ID and does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Input failed validation. The message is user-facing.
    #[error("{0}")]
    Validation(String),

    /// The operation conflicts with existing state.
    #[error("{0}")]
    Conflict(String),

    /// An unexpected internal failure.
    #[error("{0}")]
    Internal(String),
}
