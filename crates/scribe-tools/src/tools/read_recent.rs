//! `read_recent` — the most recent progress-log entries for a project,
//! response-size-limited per the caller's requested mode.

use scribe_reminders::engine::ReminderCandidate;
use scribe_storage::models::LogEntry;
use scribe_storage::queries;
use serde::Serialize;

use crate::entry_limit::{limit_entries, LimitMetadata, ResponseMode};
use crate::healing::HealingNote;
use crate::router::ToolContext;
use crate::ToolResult;

/// Response payload for `read_recent`.
#[derive(Debug, Serialize)]
pub struct ReadRecentResult {
    /// The retained entries, newest (by priority, then recency) first.
    pub entries: Vec<LogEntry>,
    /// How the full result set was truncated to fit the mode's cap.
    pub limit: LimitMetadata,
}

/// Fetch up to `fetch_limit` of the most recent entries for `project`,
/// then apply mode-based response limiting.
///
/// `fetch_limit` should be generous relative to every mode's cap so the
/// priority sort in [`limit_entries`] has a meaningful pool to work
/// from; the storage layer's own `recent` query is already newest-first
/// by timestamp only.
///
/// # Errors
///
/// Returns a storage error if the query fails.
pub async fn run(
    ctx: &ToolContext,
    project: &str,
    mode: &str,
    fetch_limit: usize,
) -> ToolResult<(ReadRecentResult, Vec<HealingNote>, Vec<ReminderCandidate>)> {
    let entries = queries::entries::recent(&ctx.db, project, fetch_limit).await?;
    let (entries, limit) = limit_entries(entries, ResponseMode::parse(mode));

    Ok((ReadRecentResult { entries, limit }, Vec::new(), Vec::new()))
}
