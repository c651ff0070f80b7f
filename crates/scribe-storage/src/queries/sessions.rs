//! Queries against `scribe_sessions`.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::db::Database;
use crate::error::StorageResult;
use crate::models::{AgentSession, SessionStatus};

/// Look up a session by its transport-layer identifier (cache-miss tier
/// two of the three-tier resolution in `scribe-sessions`).
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn find_by_transport_id(
    db: &Database,
    transport_session_id: &str,
) -> StorageResult<Option<AgentSession>> {
    let mut response = db
        .client()
        .query(
            "SELECT * FROM scribe_sessions WHERE transport_session_id = $tid LIMIT 1",
        )
        .bind(("tid", transport_session_id.to_string()))
        .await?
        .check()?;
    let rows: Vec<AgentSession> = response.take(0)?;
    Ok(rows.into_iter().next())
}

/// Create a new session row (tier three: nothing found, mint a fresh
/// identity and persist it).
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn create(db: &Database, session: &AgentSession) -> StorageResult<()> {
    db.client()
        .query("CREATE scribe_sessions CONTENT $session")
        .bind(("session", session.clone()))
        .await?
        .check()?;
    Ok(())
}

/// Refresh `last_active_at` and mark the session active again if it had
/// expired.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn heartbeat(db: &Database, session_id: Uuid) -> StorageResult<()> {
    db.client()
        .query(
            "UPDATE scribe_sessions SET last_active_at = $now, status = 'active' \
             WHERE session_id = $session_id",
        )
        .bind(("session_id", session_id.to_string()))
        .bind(("now", Utc::now()))
        .await?
        .check()?;
    Ok(())
}

/// Mark a session as explicitly ended.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn end(db: &Database, session_id: Uuid) -> StorageResult<()> {
    db.client()
        .query("UPDATE scribe_sessions SET status = 'ended' WHERE session_id = $session_id")
        .bind(("session_id", session_id.to_string()))
        .await?
        .check()?;
    Ok(())
}

/// Mark every session whose `last_active_at` is older than `ttl` as
/// expired, returning the number of rows changed.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn cleanup_expired(db: &Database, ttl: Duration) -> StorageResult<usize> {
    let cutoff: DateTime<Utc> = Utc::now() - ttl;
    let mut response = db
        .client()
        .query(
            "UPDATE scribe_sessions SET status = 'expired' \
             WHERE status = 'active' AND last_active_at < $cutoff RETURNING session_id",
        )
        .bind(("cutoff", cutoff))
        .await?
        .check()?;
    let rows: Vec<serde_json::Value> = response.take(0)?;
    Ok(rows.len())
}

/// Explicit `SessionStatus` setter, used in tests and admin tooling.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn set_status(
    db: &Database,
    session_id: Uuid,
    status: SessionStatus,
) -> StorageResult<()> {
    db.client()
        .query("UPDATE scribe_sessions SET status = $status WHERE session_id = $session_id")
        .bind(("session_id", session_id.to_string()))
        .bind(("status", status))
        .await?
        .check()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(transport_id: &str) -> AgentSession {
        AgentSession {
            session_id: Uuid::new_v4(),
            transport_session_id: transport_id.to_string(),
            agent_kind: "codex".to_string(),
            instance_id: transport_id.to_string(),
            started_at: Utc::now(),
            last_active_at: Utc::now(),
            status: SessionStatus::Active,
        }
    }

    #[tokio::test]
    async fn create_then_find_by_transport_id() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        let session = sample("transport-1");
        create(&db, &session).await.unwrap();
        let found = find_by_transport_id(&db, "transport-1").await.unwrap();
        assert_eq!(found.unwrap().session_id, session.session_id);
    }

    #[tokio::test]
    async fn cleanup_expired_marks_stale_sessions() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        let mut session = sample("transport-2");
        session.last_active_at = Utc::now() - Duration::hours(2);
        create(&db, &session).await.unwrap();

        let changed = cleanup_expired(&db, Duration::minutes(45)).await.unwrap();
        assert_eq!(changed, 1);
        let found = find_by_transport_id(&db, "transport-2")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.status, SessionStatus::Expired);
    }
}
