//! `list_projects` — enumerate every project known in this repository.

use scribe_reminders::engine::ReminderCandidate;
use scribe_storage::models::ProjectStatus;
use scribe_storage::queries;
use serde::Serialize;

use crate::healing::HealingNote;
use crate::router::ToolContext;
use crate::ToolResult;

/// One project summary entry.
#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    /// Project name.
    pub name: String,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// Last time a log entry was recorded, if any.
    pub last_entry_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Response payload for `list_projects`.
#[derive(Debug, Serialize)]
pub struct ListProjectsResult {
    /// Every project in the repository, in storage order.
    pub projects: Vec<ProjectSummary>,
}

/// List every project in the repository, optionally restricted to
/// `status`.
///
/// # Errors
///
/// Returns a storage error if the query fails.
pub async fn run(
    ctx: &ToolContext,
    status: Option<ProjectStatus>,
) -> ToolResult<(ListProjectsResult, Vec<HealingNote>, Vec<ReminderCandidate>)> {
    let projects = queries::projects::list(&ctx.db).await?;
    let projects = projects
        .into_iter()
        .filter(|p| status.is_none_or(|s| s == p.status))
        .map(|p| ProjectSummary {
            name: p.name,
            status: p.status,
            last_entry_at: p.last_entry_at,
        })
        .collect();

    Ok((ListProjectsResult { projects }, Vec::new(), Vec::new()))
}
