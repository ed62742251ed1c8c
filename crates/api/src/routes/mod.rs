//! Route registration.
//!
//! Each feature area exposes a `router()`; `api_routes()` mounts them
//! under `/api/v1`.

pub mod contacts;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// All routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/contactos", contacts::router())
}
