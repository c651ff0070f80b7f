//! Three-tier session identity resolution: in-memory cache, durable
//! lookup by transport session, then create-and-persist.

use std::sync::Arc;

use chrono::Duration;
use dashmap::DashMap;
use scribe_storage::models::{AgentSession, SessionStatus};
use scribe_storage::{queries, Database};
use uuid::Uuid;

use crate::error::{SessionError, SessionResult};

/// Idle TTL after which an active session is considered expired.
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 45;

/// Resolves and caches [`AgentSession`] identities keyed by their
/// transport-layer session identifier.
pub struct SessionManager {
    db: Arc<Database>,
    cache: DashMap<String, AgentSession>,
}

impl SessionManager {
    /// Build a manager backed by `db`, with an empty cache.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            cache: DashMap::new(),
        }
    }

    /// Resolve `transport_session_id` to a stable [`AgentSession`],
    /// creating one on first contact.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the storage layer fails.
    pub async fn resolve(
        &self,
        transport_session_id: &str,
        agent_kind: &str,
    ) -> SessionResult<AgentSession> {
        if let Some(cached) = self.cache.get(transport_session_id) {
            return Ok(cached.clone());
        }

        if let Some(found) = queries::sessions::find_by_transport_id(&self.db, transport_session_id)
            .await?
        {
            self.cache
                .insert(transport_session_id.to_string(), found.clone());
            return Ok(found);
        }

        let now = chrono::Utc::now();
        let session = AgentSession {
            session_id: Uuid::new_v4(),
            transport_session_id: transport_session_id.to_string(),
            agent_kind: agent_kind.to_string(),
            instance_id: transport_session_id.to_string(),
            started_at: now,
            last_active_at: now,
            status: SessionStatus::Active,
        };
        queries::sessions::create(&self.db, &session).await?;
        self.cache
            .insert(transport_session_id.to_string(), session.clone());
        Ok(session)
    }

    /// Refresh `last_active_at` for a session, both in cache and storage.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the storage layer fails.
    pub async fn heartbeat(&self, session_id: Uuid) -> SessionResult<()> {
        queries::sessions::heartbeat(&self.db, session_id).await?;
        for mut entry in self.cache.iter_mut() {
            if entry.session_id == session_id {
                entry.last_active_at = chrono::Utc::now();
                entry.status = SessionStatus::Active;
            }
        }
        Ok(())
    }

    /// Mark a session explicitly ended and evict it from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the storage layer fails.
    pub async fn end(&self, session_id: Uuid) -> SessionResult<()> {
        queries::sessions::end(&self.db, session_id).await?;
        for mut entry in self.cache.iter_mut() {
            if entry.session_id == session_id {
                entry.status = SessionStatus::Ended;
            }
        }
        Ok(())
    }

    /// Mark stale active sessions as expired using the default TTL,
    /// returning how many were affected. Evicts matching cache entries.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the storage layer fails.
    pub async fn cleanup_expired_sessions(&self) -> SessionResult<usize> {
        self.cleanup_expired_sessions_with_ttl(Duration::minutes(DEFAULT_SESSION_TTL_MINUTES))
            .await
    }

    /// Same as [`Self::cleanup_expired_sessions`] with an explicit TTL,
    /// exposed for tests and configuration overrides.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the storage layer fails.
    pub async fn cleanup_expired_sessions_with_ttl(&self, ttl: Duration) -> SessionResult<usize> {
        let count = queries::sessions::cleanup_expired(&self.db, ttl).await?;
        self.cache.clear();
        Ok(count)
    }

    /// Confirm that `session_id` is active, as a precondition for any
    /// project-context mutation performed on its behalf.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionLeaseExpired`] if the session is not
    /// active, or [`SessionError::SessionNotFound`] if it does not exist.
    pub async fn require_active(&self, agent_id: &str, session_id: Uuid) -> SessionResult<()> {
        if let Some(cached) = self
            .cache
            .iter()
            .find(|entry| entry.session_id == session_id)
        {
            return match cached.status {
                SessionStatus::Active => Ok(()),
                SessionStatus::Expired | SessionStatus::Ended => {
                    Err(SessionError::SessionLeaseExpired {
                        agent_id: agent_id.to_string(),
                    })
                },
            };
        }
        Err(SessionError::SessionNotFound(session_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn db() -> Arc<Database> {
        let db = Database::connect_memory().await.unwrap();
        scribe_storage::schema::setup(&db).await.unwrap();
        Arc::new(db)
    }

    #[tokio::test]
    async fn resolve_creates_then_caches() {
        let manager = SessionManager::new(db().await);
        let first = manager.resolve("transport-1", "codex").await.unwrap();
        let second = manager.resolve("transport-1", "codex").await.unwrap();
        assert_eq!(first.session_id, second.session_id);
    }

    #[tokio::test]
    async fn require_active_rejects_ended_session() {
        let manager = SessionManager::new(db().await);
        let session = manager.resolve("transport-2", "codex").await.unwrap();
        manager.end(session.session_id).await.unwrap();

        let result = manager.require_active("agent-a", session.session_id).await;
        assert!(matches!(
            result,
            Err(SessionError::SessionLeaseExpired { .. })
        ));
    }
}
