//! Route definitions for the `/roles` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::role;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(role::list).post(role::create))
        .route("/{id}", put(role::update))
}
