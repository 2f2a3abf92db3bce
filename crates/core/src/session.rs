//! Cookie sessions with a persistent store and an in-process fallback.
//!
//! The cookie carries an opaque random token. Stores only ever see its
//! SHA-256 digest ([`hash_token`]).
//!
//! [`SessionResolver`] talks to one tier at a time. It starts on the
//! persistent tier if the startup probe succeeds and switches to the
//! in-process [`InMemorySessionStore`] permanently the first time the
//! persistent tier reports itself [`SessionStoreError::Unavailable`]. The
//! fallback tier does not survive a restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::types::{DbId, Timestamp};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "pms_session";

/// Session lifetime in days.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Generate a new opaque session token (64 hex characters).
pub fn generate_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Compute the SHA-256 hex digest of a session token.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A session about to be written to a store.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub token_hash: String,
    pub employee_id: DbId,
    pub expires_at: Timestamp,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    /// The store is missing or unreachable. Switches the resolver to the
    /// fallback tier.
    #[error("Session store unavailable: {0}")]
    Unavailable(String),

    /// Any other failure. Surfaced to the caller as a server error.
    #[error("Session store error: {0}")]
    Backend(String),
}

/// Storage for sessions, keyed by token hash.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Check that the store is provisioned and reachable.
    async fn probe(&self) -> Result<(), SessionStoreError>;

    async fn insert(&self, session: &NewSession) -> Result<(), SessionStoreError>;

    /// Owner of an unexpired session whose employee is eligible to log in.
    async fn find_employee(&self, token_hash: &str) -> Result<Option<DbId>, SessionStoreError>;

    /// Delete one session. Returns `true` if it existed.
    async fn remove(&self, token_hash: &str) -> Result<bool, SessionStoreError>;

    /// Delete every session of an employee. Returns the number removed.
    async fn remove_for_employee(&self, employee_id: DbId) -> Result<u64, SessionStoreError>;

    /// Delete expired sessions. Returns the number removed.
    async fn purge_expired(&self) -> Result<u64, SessionStoreError>;
}

// ---------------------------------------------------------------------------
// In-process fallback
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct FallbackEntry {
    employee_id: DbId,
    expires_at: Timestamp,
}

/// Process-local session map.
///
/// Only checks expiry; it has no view of employee status.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, FallbackEntry>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn probe(&self) -> Result<(), SessionStoreError> {
        Ok(())
    }

    async fn insert(&self, session: &NewSession) -> Result<(), SessionStoreError> {
        self.sessions.write().await.insert(
            session.token_hash.clone(),
            FallbackEntry {
                employee_id: session.employee_id,
                expires_at: session.expires_at,
            },
        );
        Ok(())
    }

    async fn find_employee(&self, token_hash: &str) -> Result<Option<DbId>, SessionStoreError> {
        let now = Utc::now();
        Ok(self
            .sessions
            .read()
            .await
            .get(token_hash)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.employee_id))
    }

    async fn remove(&self, token_hash: &str) -> Result<bool, SessionStoreError> {
        Ok(self.sessions.write().await.remove(token_hash).is_some())
    }

    async fn remove_for_employee(&self, employee_id: DbId) -> Result<u64, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.employee_id != employee_id);
        Ok((before - sessions.len()) as u64)
    }

    async fn purge_expired(&self) -> Result<u64, SessionStoreError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Session counters for diagnostics. Reset when the process restarts.
#[derive(Debug, Default)]
pub struct SessionMetrics {
    created_persistent: AtomicU64,
    created_fallback: AtomicU64,
    resolved: AtomicU64,
    rejected: AtomicU64,
    degradations: AtomicU64,
}

/// Point-in-time copy of [`SessionMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionMetricsSnapshot {
    pub created_persistent: u64,
    pub created_fallback: u64,
    pub resolved: u64,
    pub rejected: u64,
    pub degradations: u64,
}

impl SessionMetrics {
    pub fn snapshot(&self) -> SessionMetricsSnapshot {
        SessionMetricsSnapshot {
            created_persistent: self.created_persistent.load(Ordering::Relaxed),
            created_fallback: self.created_fallback.load(Ordering::Relaxed),
            resolved: self.resolved.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            degradations: self.degradations.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Which tier is currently serving sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionBackend {
    Persistent,
    Fallback,
}

/// Outcome of resolving a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Authenticated(DbId),
    Unauthenticated,
}

/// A freshly issued session. `token` goes into the cookie.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: Timestamp,
    pub backend: SessionBackend,
}

/// Tiered session lookup with graceful degradation.
pub struct SessionResolver {
    persistent: Arc<dyn SessionStore>,
    fallback: InMemorySessionStore,
    persistent_available: AtomicBool,
    metrics: Arc<SessionMetrics>,
}

impl SessionResolver {
    /// Build a resolver and probe the persistent tier once.
    pub async fn start(persistent: Arc<dyn SessionStore>, metrics: Arc<SessionMetrics>) -> Self {
        let available = match persistent.probe().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Persistent session store unavailable, using in-process sessions");
                SessionMetrics::bump(&metrics.degradations);
                false
            }
        };
        Self {
            persistent,
            fallback: InMemorySessionStore::new(),
            persistent_available: AtomicBool::new(available),
            metrics,
        }
    }

    pub fn backend(&self) -> SessionBackend {
        if self.persistent_available.load(Ordering::Acquire) {
            SessionBackend::Persistent
        } else {
            SessionBackend::Fallback
        }
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Number of sessions held by the in-process tier.
    pub async fn fallback_len(&self) -> usize {
        self.fallback.len().await
    }

    /// Issue a session for `employee_id`. Never fails: a persistent write
    /// failure degrades to the in-process tier.
    pub async fn create_session(
        &self,
        employee_id: DbId,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> IssuedSession {
        let token = generate_token();
        let expires_at = Utc::now() + chrono::Duration::days(SESSION_TTL_DAYS);
        let session = NewSession {
            token_hash: hash_token(&token),
            employee_id,
            expires_at,
            ip_address,
            user_agent,
        };

        if self.backend() == SessionBackend::Persistent {
            match self.persistent.insert(&session).await {
                Ok(()) => {
                    SessionMetrics::bump(&self.metrics.created_persistent);
                    return IssuedSession {
                        token,
                        expires_at,
                        backend: SessionBackend::Persistent,
                    };
                }
                Err(e) => {
                    tracing::warn!(employee_id, error = %e, "Persisting session failed, storing in process");
                    if matches!(e, SessionStoreError::Unavailable(_)) {
                        self.degrade(&e);
                    }
                }
            }
        }

        // The in-process store cannot fail.
        let _ = self.fallback.insert(&session).await;
        SessionMetrics::bump(&self.metrics.created_fallback);
        IssuedSession {
            token,
            expires_at,
            backend: SessionBackend::Fallback,
        }
    }

    /// Turn a presented token into an identity.
    ///
    /// Absent, unknown, and expired tokens are [`Identity::Unauthenticated`].
    /// Only non-structural store failures are returned as errors.
    pub async fn resolve_identity(
        &self,
        token: Option<&str>,
    ) -> Result<Identity, SessionStoreError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            SessionMetrics::bump(&self.metrics.rejected);
            return Ok(Identity::Unauthenticated);
        };
        let token_hash = hash_token(token);

        let found = if self.backend() == SessionBackend::Persistent {
            match self.persistent.find_employee(&token_hash).await {
                Ok(Some(employee_id)) => Some(employee_id),
                // Sessions whose persistent write failed live in process.
                Ok(None) => self.fallback.find_employee(&token_hash).await?,
                Err(e @ SessionStoreError::Unavailable(_)) => {
                    self.degrade(&e);
                    self.fallback.find_employee(&token_hash).await?
                }
                Err(e) => return Err(e),
            }
        } else {
            self.fallback.find_employee(&token_hash).await?
        };

        Ok(match found {
            Some(employee_id) => {
                SessionMetrics::bump(&self.metrics.resolved);
                Identity::Authenticated(employee_id)
            }
            None => {
                SessionMetrics::bump(&self.metrics.rejected);
                Identity::Unauthenticated
            }
        })
    }

    /// End the session behind `token` in whichever tier holds it.
    pub async fn end_session(&self, token: &str) {
        let token_hash = hash_token(token);
        let _ = self.fallback.remove(&token_hash).await;
        if self.backend() == SessionBackend::Persistent {
            if let Err(e) = self.persistent.remove(&token_hash).await {
                tracing::warn!(error = %e, "Failed to delete persistent session");
            }
        }
    }

    /// End every session of an employee in both tiers.
    pub async fn end_sessions_for(&self, employee_id: DbId) -> u64 {
        let mut removed = self
            .fallback
            .remove_for_employee(employee_id)
            .await
            .unwrap_or(0);
        if self.backend() == SessionBackend::Persistent {
            match self.persistent.remove_for_employee(employee_id).await {
                Ok(n) => removed += n,
                Err(e) => {
                    tracing::warn!(employee_id, error = %e, "Failed to delete persistent sessions")
                }
            }
        }
        removed
    }

    /// Remove expired sessions from both tiers.
    pub async fn purge_expired(&self) -> Result<u64, SessionStoreError> {
        let mut purged = self.fallback.purge_expired().await?;
        if self.backend() == SessionBackend::Persistent {
            match self.persistent.purge_expired().await {
                Ok(n) => purged += n,
                Err(e @ SessionStoreError::Unavailable(_)) => self.degrade(&e),
                Err(e) => return Err(e),
            }
        }
        Ok(purged)
    }

    fn degrade(&self, cause: &SessionStoreError) {
        if self.persistent_available.swap(false, Ordering::AcqRel) {
            tracing::warn!(error = %cause, "Persistent session store lost, switching to in-process sessions");
            SessionMetrics::bump(&self.metrics.degradations);
        }
    }
}
