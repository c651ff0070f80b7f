//! Queries against `reminder_history`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::Database;
use crate::error::StorageResult;
use crate::models::ReminderHistoryEntry;

/// Record that a reminder was shown.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn insert(db: &Database, entry: &ReminderHistoryEntry) -> StorageResult<()> {
    db.client()
        .query("CREATE reminder_history CONTENT $entry")
        .bind(("entry", entry.clone()))
        .await?
        .check()?;
    Ok(())
}

/// Last time a reminder with this hash was shown in this session, if ever.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn last_shown(
    db: &Database,
    session_id: Uuid,
    reminder_hash: &str,
) -> StorageResult<Option<DateTime<Utc>>> {
    let mut response = db
        .client()
        .query(
            "SELECT shown_at FROM reminder_history \
             WHERE session_id = $session_id AND reminder_hash = $hash \
             ORDER BY shown_at DESC LIMIT 1",
        )
        .bind(("session_id", session_id.to_string()))
        .bind(("hash", reminder_hash.to_string()))
        .await?
        .check()?;
    let rows: Vec<DateTime<Utc>> = response.take("shown_at")?;
    Ok(rows.into_iter().next())
}

/// Count how many times a reminder key has fired in this session, used to
/// enforce the per-session teaching cap.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn count_for_key(
    db: &Database,
    session_id: Uuid,
    reminder_key: &str,
) -> StorageResult<usize> {
    let mut response = db
        .client()
        .query(
            "SELECT count() FROM reminder_history \
             WHERE session_id = $session_id AND reminder_key = $key GROUP ALL",
        )
        .bind(("session_id", session_id.to_string()))
        .bind(("key", reminder_key.to_string()))
        .await?
        .check()?;
    let counts: Vec<i64> = response.take("count")?;
    Ok(counts.first().copied().unwrap_or(0) as usize)
}

/// Delete all reminder history for a session (cascade on session delete).
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn delete_for_session(db: &Database, session_id: Uuid) -> StorageResult<()> {
    db.client()
        .query("DELETE reminder_history WHERE session_id = $session_id")
        .bind(("session_id", session_id.to_string()))
        .await?
        .check()?;
    Ok(())
}

/// Delete reminder history rows whose hash was derived from `project_root`
/// and `agent_id`, implementing `reset_cooldowns`.
///
/// # Errors
///
/// Returns [`crate::StorageError`] on a query failure.
pub async fn reset_cooldowns(
    db: &Database,
    project_root: &str,
    agent_id: &str,
) -> StorageResult<()> {
    db.client()
        .query(
            "DELETE reminder_history WHERE project_root = $project_root \
             AND agent_id = $agent_id",
        )
        .bind(("project_root", project_root.to_string()))
        .bind(("agent_id", agent_id.to_string()))
        .await?
        .check()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OperationStatus;
    use std::collections::HashMap;

    fn sample(session_id: Uuid, hash: &str, key: &str) -> ReminderHistoryEntry {
        ReminderHistoryEntry {
            session_id,
            reminder_hash: hash.to_string(),
            project_root: "/repo".to_string(),
            agent_id: "agent-a".to_string(),
            tool_name: "append_entry".to_string(),
            reminder_key: key.to_string(),
            shown_at: Utc::now(),
            operation_status: OperationStatus::Success,
            context_metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn last_shown_returns_none_before_any_record() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        let session_id = Uuid::new_v4();
        assert!(last_shown(&db, session_id, "hash-a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn count_for_key_tracks_teaching_cap() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        let session_id = Uuid::new_v4();
        insert(&db, &sample(session_id, "h1", "logging.stale_log"))
            .await
            .unwrap();
        insert(&db, &sample(session_id, "h2", "logging.stale_log"))
            .await
            .unwrap();
        let count = count_for_key(&db, session_id, "logging.stale_log")
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn delete_for_session_clears_rows() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        let session_id = Uuid::new_v4();
        insert(&db, &sample(session_id, "h1", "logging.stale_log"))
            .await
            .unwrap();
        delete_for_session(&db, session_id).await.unwrap();
        let count = count_for_key(&db, session_id, "logging.stale_log")
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
