//! Sentinel-mode tools: repository-wide bug/security case tracking,
//! independent of any single project.
//!
//! `append_event` in project mode is just `append_entry` under another
//! name; in sentinel mode it writes to a day-bucketed JSONL file rather
//! than a project's progress log. `open_bug`/`open_security` assign a
//! per-day monotonic case ID and `link_fix` attaches a fix artifact to
//! one.

use std::path::{Path, PathBuf};

use chrono::Utc;
use scribe_reminders::engine::ReminderCandidate;
use scribe_storage::models::{SentinelCase, SentinelCaseKind};
use scribe_storage::queries;
use serde::Serialize;

use crate::error::ToolError;
use crate::healing::HealingNote;
use crate::router::ToolContext;
use crate::ToolResult;

/// Response payload for `open_bug`/`open_security`.
#[derive(Debug, Serialize)]
pub struct OpenCaseResult {
    /// The newly assigned case, e.g. `BUG-2026-07-27-0001`.
    pub case_id: String,
    /// Lifecycle status, always `"proposed"` on creation.
    pub landing_status: String,
}

impl From<SentinelCase> for OpenCaseResult {
    fn from(case: SentinelCase) -> Self {
        Self {
            case_id: case.case_id,
            landing_status: case.landing_status,
        }
    }
}

/// Open a new case of `kind`, assigning the next per-day sequence
/// number.
///
/// # Errors
///
/// Returns a storage error if the sequence counter or case insert
/// fails.
pub async fn open_case(
    ctx: &ToolContext,
    kind: SentinelCaseKind,
    day: &str,
    title: &str,
    symptoms: &str,
    affected_paths: Vec<String>,
) -> ToolResult<(OpenCaseResult, Vec<HealingNote>, Vec<ReminderCandidate>)> {
    let case = queries::sentinel::open_case(&ctx.db, kind, day, title, symptoms, affected_paths).await?;
    Ok((case.into(), Vec::new(), Vec::new()))
}

/// Response payload for `link_fix`.
#[derive(Debug, Serialize)]
pub struct LinkFixResult {
    /// The case the fix was linked against.
    pub case_id: String,
    /// Updated lifecycle status.
    pub landing_status: String,
    /// Total fix links now recorded against this case.
    pub fix_link_count: usize,
}

/// Attach a fix artifact to an already-open case and update its
/// lifecycle status.
///
/// # Errors
///
/// Returns [`crate::ToolError::ParameterValidation`] if `case_id` does
/// not carry a recognized `BUG-`/`SEC-` prefix, [`ToolError::NotFound`]
/// if no such case exists, or a storage error otherwise.
pub async fn link_fix(
    ctx: &ToolContext,
    case_id: &str,
    execution_id: &str,
    artifact_ref: &str,
    landing_status: &str,
) -> ToolResult<(LinkFixResult, Vec<HealingNote>, Vec<ReminderCandidate>)> {
    if !case_id.starts_with("BUG-") && !case_id.starts_with("SEC-") {
        return Err(ToolError::ParameterValidation(format!(
            "case_id '{case_id}' must start with 'BUG-' or 'SEC-'"
        )));
    }

    let case = queries::sentinel::link_fix(&ctx.db, case_id, execution_id, artifact_ref, landing_status)
        .await?;

    Ok((
        LinkFixResult {
            case_id: case.case_id,
            landing_status: case.landing_status,
            fix_link_count: case.fix_links.len(),
        },
        Vec::new(),
        Vec::new(),
    ))
}

/// One sentinel-mode event line, mirrored to a day-bucketed JSONL file
/// and a human-readable markdown sibling.
#[derive(Debug, Clone, Serialize)]
struct SentinelEvent {
    ts: chrono::DateTime<Utc>,
    agent: String,
    event_type: String,
    data: serde_json::Value,
}

/// Response payload for `append_event` in sentinel mode.
#[derive(Debug, Serialize)]
pub struct AppendSentinelEventResult {
    /// Path the JSONL mirror was appended to.
    pub jsonl_path: PathBuf,
    /// Path the markdown mirror was appended to.
    pub markdown_path: PathBuf,
}

/// Append one sentinel-mode event to the day's JSONL log and its
/// markdown mirror.
///
/// Sentinel events are repository-wide and not tied to a project's
/// progress log; they use plain file appends rather than the
/// `scribe-logging` pipeline because they carry no `entry_id`/priority
/// model.
///
/// # Errors
///
/// Returns a mapped file-I/O error if either append fails.
pub async fn append_event(
    _ctx: &ToolContext,
    sentinel_dir: &Path,
    day: &str,
    agent: &str,
    event_type: &str,
    data: serde_json::Value,
) -> ToolResult<(
    AppendSentinelEventResult,
    Vec<HealingNote>,
    Vec<ReminderCandidate>,
)> {
    let jsonl_path = sentinel_dir.join(format!("{day}.jsonl"));
    let markdown_path = sentinel_dir.join(format!("{day}.md"));

    let event = SentinelEvent {
        ts: Utc::now(),
        agent: agent.to_string(),
        event_type: event_type.to_string(),
        data: data.clone(),
    };
    let line = serde_json::to_string(&event)
        .map_err(|e| ToolError::ParameterValidation(format!("event is not serializable: {e}")))?;
    scribe_fileio::lock::locked_append(&jsonl_path, &line).await?;

    let heading = format!("- **{}** `{}` {}", event.ts.to_rfc3339(), event_type, agent);
    scribe_fileio::lock::locked_append(&markdown_path, &heading).await?;

    Ok((
        AppendSentinelEventResult {
            jsonl_path,
            markdown_path,
        },
        Vec::new(),
        Vec::new(),
    ))
}
