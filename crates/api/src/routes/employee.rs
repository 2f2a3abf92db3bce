//! Route definitions for the `/employees` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::employee;
use crate::state::AppState;

/// Routes mounted at `/employees`.
///
/// ```text
/// GET  /                  -> list
/// POST /                  -> create
/// POST /{id}/deactivate   -> deactivate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(employee::list).post(employee::create))
        .route("/{id}/deactivate", post(employee::deactivate))
}
