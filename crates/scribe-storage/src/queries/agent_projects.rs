//! Queries against `agent_projects`, including the optimistic-CAS update.

use chrono::Utc;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{StorageError, StorageResult};
use crate::models::AgentProject;

/// Read-through fetch of an agent's current project pointer.
///
/// # Errors
///
/// Returns [`StorageError`] on a query failure.
pub async fn get(db: &Database, agent_id: &str) -> StorageResult<Option<AgentProject>> {
    let mut response = db
        .client()
        .query("SELECT * FROM agent_projects WHERE agent_id = $agent_id LIMIT 1")
        .bind(("agent_id", agent_id.to_string()))
        .await?
        .check()?;
    let rows: Vec<AgentProject> = response.take(0)?;
    Ok(rows.into_iter().next())
}

/// Set `agent_id`'s current project.
///
/// When `expected_version` is `Some`, performs a compare-and-swap: the
/// update only takes effect if the stored row's `version` equals it, and
/// zero rows affected is reported as [`StorageError::Conflict`]. When
/// `expected_version` is `None`, this is an upsert that creates the row at
/// version 1 if absent, or bumps the existing row's version by one.
///
/// # Errors
///
/// Returns [`StorageError::Conflict`] on a CAS mismatch, or
/// [`StorageError`] on any other query failure.
pub async fn set(
    db: &Database,
    agent_id: &str,
    project_name: Option<&str>,
    session_id: Uuid,
    expected_version: Option<i64>,
) -> StorageResult<AgentProject> {
    let now = Utc::now();

    if let Some(expected) = expected_version {
        let mut response = db
            .client()
            .query(
                "UPDATE agent_projects SET project_name = $project_name, \
                 version = version + 1, updated_at = $now, updated_by = $session_id, \
                 session_id = $session_id \
                 WHERE agent_id = $agent_id AND version = $expected RETURNING *",
            )
            .bind(("agent_id", agent_id.to_string()))
            .bind(("project_name", project_name.map(str::to_string)))
            .bind(("now", now))
            .bind(("session_id", session_id.to_string()))
            .bind(("expected", expected))
            .await?
            .check()?;
        let rows: Vec<AgentProject> = response.take(0)?;
        return rows.into_iter().next().ok_or(StorageError::Conflict {
            agent_id: agent_id.to_string(),
            expected_version: expected,
        });
    }

    match get(db, agent_id).await? {
        Some(_existing) => {
            let mut response = db
                .client()
                .query(
                    "UPDATE agent_projects SET project_name = $project_name, \
                     version = version + 1, updated_at = $now, updated_by = $session_id, \
                     session_id = $session_id \
                     WHERE agent_id = $agent_id RETURNING *",
                )
                .bind(("agent_id", agent_id.to_string()))
                .bind(("project_name", project_name.map(str::to_string)))
                .bind(("now", now))
                .bind(("session_id", session_id.to_string()))
                .await?
                .check()?;
            let rows: Vec<AgentProject> = response.take(0)?;
            rows.into_iter()
                .next()
                .ok_or_else(|| StorageError::Internal("upsert returned no row".into()))
        },
        None => {
            let row = AgentProject {
                agent_id: agent_id.to_string(),
                project_name: project_name.map(str::to_string),
                version: 1,
                updated_at: now,
                updated_by: session_id,
                session_id,
            };
            db.client()
                .query("CREATE agent_projects CONTENT $row")
                .bind(("row", row.clone()))
                .await?
                .check()?;
            Ok(row)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_creates_then_bumps_version() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        let session_id = Uuid::new_v4();

        let first = set(&db, "agent-a", Some("demo"), session_id, None)
            .await
            .unwrap();
        assert_eq!(first.version, 1);

        let second = set(&db, "agent-a", Some("other"), session_id, None)
            .await
            .unwrap();
        assert_eq!(second.version, 2);
    }

    #[tokio::test]
    async fn cas_rejects_stale_expected_version() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        let session_id = Uuid::new_v4();
        set(&db, "agent-a", Some("demo"), session_id, None)
            .await
            .unwrap();

        let err = set(&db, "agent-a", Some("q"), session_id, Some(99))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
    }

    #[tokio::test]
    async fn cas_succeeds_with_correct_expected_version() {
        let db = Database::connect_memory().await.unwrap();
        crate::schema::setup(&db).await.unwrap();
        let session_id = Uuid::new_v4();
        let created = set(&db, "agent-a", Some("demo"), session_id, None)
            .await
            .unwrap();

        let updated = set(&db, "agent-a", Some("q"), session_id, Some(created.version))
            .await
            .unwrap();
        assert_eq!(updated.version, created.version + 1);
        assert_eq!(updated.project_name.as_deref(), Some("q"));
    }
}
