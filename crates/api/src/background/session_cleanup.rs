//! Periodic removal of expired sessions from both session tiers.

use std::sync::Arc;
use std::time::Duration;

use pms_core::session::SessionResolver;
use tokio_util::sync::CancellationToken;

/// Run the session cleanup loop until `cancel` is triggered.
///
/// The first sweep runs immediately.
pub async fn run(sessions: Arc<SessionResolver>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Session cleanup job started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                match sessions.purge_expired().await {
                    Ok(purged) if purged > 0 => {
                        tracing::info!(purged, backend = ?sessions.backend(), "Session cleanup: purged expired sessions");
                    }
                    Ok(_) => tracing::debug!("Session cleanup: nothing to purge"),
                    Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pms_core::session::{InMemorySessionStore, SessionMetrics};

    use super::*;

    #[tokio::test]
    async fn stops_on_cancel() {
        let sessions = Arc::new(
            SessionResolver::start(
                Arc::new(InMemorySessionStore::new()),
                Arc::new(SessionMetrics::default()),
            )
            .await,
        );
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(sessions, Duration::from_secs(3600), cancel.clone()));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("cleanup task should stop")
            .expect("cleanup task should not panic");
    }
}
