//! Route definitions for contacts and the CSV bulk importer.
//!
//! Mounted at `/contactos` by `api_routes()`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{contacts, import};
use crate::state::AppState;

/// Contact routes.
///
/// ```text
/// GET  /                            -> list_contacts
/// GET  /import/plantilla            -> get_template
/// POST /import/preview              -> preview_import
/// POST /import                      -> run_import
/// GET  /import/{id}/estado          -> get_status
/// GET  /import/{id}/log             -> get_log
/// GET  /import/{id}/log/export      -> export_log
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(contacts::list_contacts))
        .route("/import", post(import::run_import))
        .route("/import/plantilla", get(contacts::get_template))
        .route("/import/preview", post(import::preview_import))
        .route("/import/{id}/estado", get(import::get_status))
        .route("/import/{id}/log", get(import::get_log))
        .route("/import/{id}/log/export", get(import::export_log))
}
