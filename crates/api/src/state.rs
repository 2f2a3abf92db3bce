use std::sync::Arc;

use pms_core::session::SessionResolver;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: pms_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Tiered session lookup (persistent table with in-process fallback).
    pub sessions: Arc<SessionResolver>,
}
