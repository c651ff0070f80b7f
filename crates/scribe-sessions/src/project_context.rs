//! Agent-scoped project context: `set_current_project`/`get_current_project`
//! with optimistic CAS and an `AgentEvent` audit trail.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use scribe_storage::models::{AgentEvent, AgentEventType, AgentProject, VersionInfo};
use scribe_storage::{queries, Database};
use uuid::Uuid;

use crate::error::SessionResult;
use crate::manager::SessionManager;

/// Outcome of a successful `set_current_project`/`get_current_project`
/// call.
#[derive(Debug, Clone)]
pub struct ProjectPointer {
    /// The agent's current project, if any.
    pub project_name: Option<String>,
    /// Current CAS version.
    pub version: i64,
    /// Last time the pointer changed.
    pub updated_at: DateTime<Utc>,
}

impl From<AgentProject> for ProjectPointer {
    fn from(row: AgentProject) -> Self {
        Self {
            project_name: row.project_name,
            version: row.version,
            updated_at: row.updated_at,
        }
    }
}

/// Orchestrates reads/writes of an agent's current-project pointer,
/// validating the session lease and recording audit events.
pub struct ProjectContext {
    db: Arc<Database>,
}

impl ProjectContext {
    /// Build a context backed by `db`.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Read-through fetch of an agent's current project.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SessionError`] if the storage layer fails.
    pub async fn get_current_project(
        &self,
        agent_id: &str,
    ) -> SessionResult<Option<ProjectPointer>> {
        Ok(queries::agent_projects::get(&self.db, agent_id)
            .await?
            .map(ProjectPointer::from))
    }

    /// Set `agent_id`'s current project, validating that `session_id` owns
    /// the lease before attempting the compare-and-swap.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SessionError::SessionLeaseExpired`] if the session
    /// does not own the lease, or [`crate::SessionError::Conflict`] if the
    /// CAS fails on a stale `expected_version`.
    pub async fn set_current_project(
        &self,
        sessions: &SessionManager,
        agent_id: &str,
        project_name: Option<&str>,
        session_id: Uuid,
        expected_version: Option<i64>,
    ) -> SessionResult<ProjectPointer> {
        sessions.require_active(agent_id, session_id).await?;

        let before = queries::agent_projects::get(&self.db, agent_id).await?;
        let before_version = before.as_ref().map(|row| row.version);
        let before_project = before.as_ref().and_then(|row| row.project_name.clone());

        let result =
            queries::agent_projects::set(&self.db, agent_id, project_name, session_id, expected_version)
                .await;

        match result {
            Ok(row) => {
                let event_type = match &before_project {
                    None => AgentEventType::ProjectSet,
                    Some(prev) if Some(prev.as_str()) != project_name => {
                        AgentEventType::ProjectSwitched
                    },
                    Some(_) => AgentEventType::ProjectSet,
                };
                self.record_event(
                    event_type,
                    agent_id,
                    before_project,
                    project_name.map(str::to_string),
                    VersionInfo {
                        before: before_version,
                        expected: expected_version,
                        after: Some(row.version),
                    },
                    true,
                )
                .await?;
                Ok(row.into())
            },
            Err(err) => {
                if let scribe_storage::StorageError::Conflict {
                    agent_id: conflict_agent,
                    expected_version: conflict_expected,
                } = &err
                {
                    self.record_event(
                        AgentEventType::ConflictDetected,
                        agent_id,
                        before_project,
                        project_name.map(str::to_string),
                        VersionInfo {
                            before: before_version,
                            expected: Some(*conflict_expected),
                            after: None,
                        },
                        false,
                    )
                    .await?;
                    return Err(crate::error::SessionError::Conflict {
                        agent_id: conflict_agent.clone(),
                        expected_version: *conflict_expected,
                    });
                }
                Err(err.into())
            },
        }
    }

    async fn record_event(
        &self,
        event_type: AgentEventType,
        agent_id: &str,
        from_project: Option<String>,
        to_project: Option<String>,
        version_info: VersionInfo,
        success: bool,
    ) -> SessionResult<()> {
        let event = AgentEvent {
            event_type,
            agent_id: agent_id.to_string(),
            from_project,
            to_project,
            version_info,
            success,
            context: HashMap::new(),
            created_at: Utc::now(),
        };
        queries::agent_events::insert(&self.db, &event).await?;
        Ok(())
    }

    /// Fetch audit events, optionally filtered by agent and/or type.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SessionError`] if the storage layer fails.
    pub async fn get_agent_events(
        &self,
        agent_id: Option<&str>,
        event_type: Option<AgentEventType>,
        limit: usize,
    ) -> SessionResult<Vec<AgentEvent>> {
        Ok(queries::agent_events::list(&self.db, agent_id, event_type, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (Arc<Database>, SessionManager, ProjectContext) {
        let db = Database::connect_memory().await.unwrap();
        scribe_storage::schema::setup(&db).await.unwrap();
        let db = Arc::new(db);
        let sessions = SessionManager::new(db.clone());
        let ctx = ProjectContext::new(db.clone());
        (db, sessions, ctx)
    }

    #[tokio::test]
    async fn set_then_get_roundtrips() {
        let (_db, sessions, ctx) = setup().await;
        let session = sessions.resolve("transport-1", "codex").await.unwrap();

        let pointer = ctx
            .set_current_project(&sessions, "agent-a", Some("demo"), session.session_id, None)
            .await
            .unwrap();
        assert_eq!(pointer.project_name.as_deref(), Some("demo"));

        let fetched = ctx.get_current_project("agent-a").await.unwrap().unwrap();
        assert_eq!(fetched.project_name.as_deref(), Some("demo"));
    }

    #[tokio::test]
    async fn conflict_records_event_and_does_not_mutate() {
        let (db, sessions, ctx) = setup().await;
        let session = sessions.resolve("transport-1", "codex").await.unwrap();
        ctx.set_current_project(&sessions, "agent-a", Some("demo"), session.session_id, None)
            .await
            .unwrap();

        let err = ctx
            .set_current_project(
                &sessions,
                "agent-a",
                Some("other"),
                session.session_id,
                Some(99),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::SessionError::Conflict { .. }));

        let events = queries::agent_events::list(&db, Some("agent-a"), None, 10)
            .await
            .unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e.event_type, AgentEventType::ConflictDetected)));

        let current = ctx.get_current_project("agent-a").await.unwrap().unwrap();
        assert_eq!(current.project_name.as_deref(), Some("demo"));
    }

    #[tokio::test]
    async fn rejects_when_session_not_active() {
        let (_db, sessions, ctx) = setup().await;
        let session = sessions.resolve("transport-1", "codex").await.unwrap();
        sessions.end(session.session_id).await.unwrap();

        let err = ctx
            .set_current_project(&sessions, "agent-a", Some("demo"), session.session_id, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::SessionError::SessionLeaseExpired { .. }
        ));
    }
}
