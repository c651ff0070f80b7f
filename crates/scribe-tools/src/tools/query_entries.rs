//! `query_entries` — a time-ranged, priority/category-filtered search
//! over a project's progress log.

use chrono::{DateTime, Utc};
use scribe_reminders::engine::ReminderCandidate;
use scribe_storage::models::{LogEntry, Priority};
use scribe_storage::queries::entries::EntryQuery;
use scribe_storage::queries;
use serde::Serialize;

use crate::entry_limit::{limit_entries, LimitMetadata, ResponseMode};
use crate::healing::HealingNote;
use crate::router::ToolContext;
use crate::ToolResult;

/// Arguments accepted by `query_entries`, already healed/typed.
#[derive(Debug, Clone, Default)]
pub struct QueryEntriesArgs {
    /// Restrict to entries at or after this timestamp.
    pub since: Option<DateTime<Utc>>,
    /// Restrict to entries at or before this timestamp.
    pub until: Option<DateTime<Utc>>,
    /// Restrict to a single priority.
    pub priority: Option<Priority>,
    /// Restrict to a single category.
    pub category: Option<String>,
    /// Minimum confidence, inclusive.
    pub min_confidence: Option<f64>,
    /// Response rendering mode, limiting how many rows come back.
    pub mode: String,
}

/// Response payload for `query_entries`.
#[derive(Debug, Serialize)]
pub struct QueryEntriesResult {
    /// The retained entries after priority sort and mode-based limiting.
    pub entries: Vec<LogEntry>,
    /// How the full result set was truncated to fit the mode's cap.
    pub limit: LimitMetadata,
}

/// Run a predicated search against `project`'s progress log.
///
/// # Errors
///
/// Returns a storage error if the query fails.
pub async fn run(
    ctx: &ToolContext,
    project: &str,
    args: QueryEntriesArgs,
) -> ToolResult<(QueryEntriesResult, Vec<HealingNote>, Vec<ReminderCandidate>)> {
    let mode = ResponseMode::parse(&args.mode);
    let filter = EntryQuery {
        since: args.since,
        until: args.until,
        priority: args.priority,
        category: args.category,
        min_confidence: args.min_confidence,
        limit: mode.limit().saturating_mul(4),
    };
    let entries = queries::entries::query(&ctx.db, project, &filter).await?;
    let (entries, limit) = limit_entries(entries, mode);

    Ok((QueryEntriesResult { entries, limit }, Vec::new(), Vec::new()))
}
