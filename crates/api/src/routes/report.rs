//! Route definitions for the `/reports` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::work_report;
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// GET  /                -> list_mine
/// POST /                -> create
/// GET  /pending         -> list_pending
/// POST /{id}/approve    -> approve
/// POST /{id}/reject     -> reject
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(work_report::list_mine).post(work_report::create))
        .route("/pending", get(work_report::list_pending))
        .route("/{id}/approve", post(work_report::approve))
        .route("/{id}/reject", post(work_report::reject))
}
