//! Service health.

use axum::extract::State;
use axum::Json;
use pms_core::session::{SessionBackend, SessionMetricsSnapshot};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable or sessions
    /// are held in process.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub db_healthy: bool,
    pub session_backend: SessionBackend,
    pub fallback_sessions: usize,
    pub session_metrics: SessionMetricsSnapshot,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = pms_db::health_check(&state.pool).await.is_ok();
    let session_backend = state.sessions.backend();

    let status = if db_healthy && session_backend == SessionBackend::Persistent {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        session_backend,
        fallback_sessions: state.sessions.fallback_len().await,
        session_metrics: state.sessions.metrics().snapshot(),
    })
}
