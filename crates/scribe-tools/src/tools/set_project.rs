//! `set_project` — point the calling agent's current-project pointer at
//! a project, creating the project row on first use.

use std::sync::Arc;

use chrono::Utc;
use scribe_reminders::engine::ReminderCandidate;
use scribe_sessions::project_context::ProjectContext;
use scribe_storage::models::{Project, ProjectStatus};
use scribe_storage::queries;
use serde::Serialize;

use crate::healing::HealingNote;
use crate::router::ToolContext;
use crate::ToolResult;

/// Response payload for `set_project`.
#[derive(Debug, Serialize)]
pub struct SetProjectResult {
    /// The project now selected.
    pub project_name: String,
    /// CAS version after the update.
    pub version: i64,
    /// `true` if this call created the project row.
    pub created: bool,
}

/// Point `agent_id`'s current-project pointer at `project_name`.
///
/// If no project by that name exists yet, creates it with a progress
/// log path derived from the repository's configured log file name.
///
/// # Errors
///
/// Returns [`crate::ToolError::Session`] if the session's lease has
/// expired or the CAS loses a race, or a storage error if project
/// creation fails.
pub async fn run(
    ctx: &ToolContext,
    project_ctx: Arc<ProjectContext>,
    agent_id: &str,
    project_name: &str,
    progress_log_name: &str,
    expected_version: Option<i64>,
) -> ToolResult<(SetProjectResult, Vec<HealingNote>, Vec<ReminderCandidate>)> {
    let exec = scribe_core::context::current().await;

    let created = match queries::projects::get_by_name(&ctx.db, project_name).await? {
        Some(_) => false,
        None => {
            let now = Utc::now();
            let project = Project {
                name: project_name.to_string(),
                repo_root: exec.repo_root.display().to_string(),
                progress_log_path: progress_log_name.to_string(),
                status: ProjectStatus::InProgress,
                created_at: now,
                updated_at: now,
                last_entry_at: None,
                last_access_at: Some(now),
                last_status_change: Some(now),
                description: None,
                tags: Vec::new(),
                doc_hashes: std::collections::HashMap::new(),
                meta: std::collections::HashMap::new(),
            };
            queries::projects::create(&ctx.db, &project).await?;
            true
        },
    };

    let pointer = project_ctx
        .set_current_project(
            &ctx.sessions,
            agent_id,
            Some(project_name),
            exec.session_id,
            expected_version,
        )
        .await?;

    ctx.state
        .record_project_set(project_name, &exec.agent_identity.label())
        .await?;

    Ok((
        SetProjectResult {
            project_name: project_name.to_string(),
            version: pointer.version,
            created,
        },
        Vec::new(),
        Vec::new(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_reminders::cooldown::CooldownCache;
    use scribe_reminders::engine::ReminderEngine;
    use scribe_sandbox::{PathSandbox, PermissionChecker};
    use scribe_sessions::manager::SessionManager;
    use scribe_sessions::state::StateManager;
    use scribe_storage::Database;

    async fn test_ctx(tmp: &std::path::Path) -> (ToolContext, Arc<ProjectContext>) {
        let db = Arc::new(Database::connect_memory().await.unwrap());
        scribe_storage::schema::setup(&db).await.unwrap();
        let sessions = Arc::new(SessionManager::new(Arc::clone(&db)));
        let state = Arc::new(StateManager::load(&tmp.join("state.json")).unwrap());
        let reminders = Arc::new(ReminderEngine::new(
            Arc::clone(&db),
            CooldownCache::load(tmp.join("cooldown.json")),
            false,
        ));
        let ctx = ToolContext {
            db: Arc::clone(&db),
            sandbox: Arc::new(PathSandbox::new(tmp.to_path_buf())),
            repo_root_display: tmp.display().to_string(),
            permissions: PermissionChecker::default(),
            sessions,
            state,
            reminders,
            idle_threshold_minutes: 30,
        };
        (ctx, Arc::new(ProjectContext::new(db)))
    }

    #[tokio::test]
    async fn creates_project_on_first_use() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, project_ctx) = test_ctx(tmp.path()).await;

        let exec = scribe_core::context::ExecutionContext::builder()
            .repo_root(tmp.path())
            .mode(scribe_core::context::Mode::Project)
            .transport_session_id("t-1")
            .intent("start work")
            .build()
            .unwrap();

        let (result, notes, candidates) = scribe_core::context::scope(exec, || async {
            let exec = scribe_core::context::current().await;
            ctx.sessions
                .resolve("t-1", &exec.agent_identity.kind)
                .await
                .unwrap();
            run(&ctx, Arc::clone(&project_ctx), "agent-1", "demo", "progress.log", None).await
        })
        .await
        .unwrap();

        assert!(result.created);
        assert_eq!(result.project_name, "demo");
        assert!(notes.is_empty());
        assert!(candidates.is_empty());
    }
}
