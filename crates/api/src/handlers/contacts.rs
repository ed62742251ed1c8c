//! Handlers for contact listing and the CSV import template.
//!
//! Thin wrappers: pagination listing and a static template download.

use agenda_core::csv::CSV_TEMPLATE;
use agenda_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use agenda_db::models::contact::Contact;
use agenda_db::repositories::ContactRepo;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Paginated contact listing payload.
#[derive(Debug, Serialize)]
pub struct ContactList {
    pub contacts: Vec<Contact>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// GET /api/v1/contactos
///
/// List contacts, newest first, with clamped pagination.
pub async fn list_contacts(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<ContactList>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let contacts = ContactRepo::list(&state.pool, limit, offset).await?;
    let total = ContactRepo::count(&state.pool).await?;

    Ok(Json(DataResponse {
        data: ContactList {
            contacts,
            total,
            limit,
            offset,
        },
    }))
}

/// GET /api/v1/contactos/import/plantilla
///
/// Download the static CSV template for bulk imports.
pub async fn get_template() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"plantilla_contactos.csv\"",
            ),
        ],
        CSV_TEMPLATE,
    )
}
