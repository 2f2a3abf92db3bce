//! PostgreSQL-backed [`SessionStore`].

use async_trait::async_trait;
use pms_core::session::{NewSession, SessionStore, SessionStoreError};
use pms_core::types::DbId;
use sqlx::PgPool;

use crate::repositories::SessionRepo;
use crate::UNDEFINED_TABLE;

/// Persistent session tier backed by the `user_sessions` table.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Sort a database error into the two tiers the resolver distinguishes.
///
/// A missing table or an unreachable server means the store is unusable;
/// everything else is a per-request failure.
pub fn classify(err: sqlx::Error) -> SessionStoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNDEFINED_TABLE) => {
            SessionStoreError::Unavailable(err.to_string())
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => SessionStoreError::Unavailable(err.to_string()),
        _ => SessionStoreError::Backend(err.to_string()),
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn probe(&self) -> Result<(), SessionStoreError> {
        SessionRepo::probe(&self.pool).await.map_err(classify)
    }

    async fn insert(&self, session: &NewSession) -> Result<(), SessionStoreError> {
        SessionRepo::create(&self.pool, session)
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn find_employee(&self, token_hash: &str) -> Result<Option<DbId>, SessionStoreError> {
        SessionRepo::find_active_employee(&self.pool, token_hash)
            .await
            .map_err(classify)
    }

    async fn remove(&self, token_hash: &str) -> Result<bool, SessionStoreError> {
        SessionRepo::delete_by_token_hash(&self.pool, token_hash)
            .await
            .map_err(classify)
    }

    async fn remove_for_employee(&self, employee_id: DbId) -> Result<u64, SessionStoreError> {
        SessionRepo::delete_for_employee(&self.pool, employee_id)
            .await
            .map_err(classify)
    }

    async fn purge_expired(&self) -> Result<u64, SessionStoreError> {
        SessionRepo::cleanup_expired(&self.pool)
            .await
            .map_err(classify)
    }
}
