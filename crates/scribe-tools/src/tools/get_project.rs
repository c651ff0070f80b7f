//! `get_project` — read the calling agent's current-project pointer.

use std::sync::Arc;

use scribe_reminders::engine::ReminderCandidate;
use scribe_sessions::project_context::ProjectContext;
use serde::Serialize;

use crate::error::ToolError;
use crate::healing::HealingNote;
use crate::ToolResult;

/// Response payload for `get_project`.
#[derive(Debug, Serialize)]
pub struct GetProjectResult {
    /// The agent's current project, if any is set.
    pub project_name: Option<String>,
    /// CAS version of the pointer.
    pub version: i64,
}

/// Read `agent_id`'s current-project pointer.
///
/// # Errors
///
/// Returns [`ToolError::NotFound`] if `require_project` is `true` for
/// this repository and no project is currently selected.
pub async fn run(
    project_ctx: Arc<ProjectContext>,
    agent_id: &str,
    require_project: bool,
) -> ToolResult<(GetProjectResult, Vec<HealingNote>, Vec<ReminderCandidate>)> {
    let pointer = project_ctx.get_current_project(agent_id).await?;

    match pointer {
        Some(pointer) => Ok((
            GetProjectResult {
                project_name: pointer.project_name,
                version: pointer.version,
            },
            Vec::new(),
            Vec::new(),
        )),
        None if require_project => Err(ToolError::NotFound(format!(
            "no project set for agent '{agent_id}'"
        ))),
        None => Ok((
            GetProjectResult {
                project_name: None,
                version: 0,
            },
            Vec::new(),
            Vec::new(),
        )),
    }
}
