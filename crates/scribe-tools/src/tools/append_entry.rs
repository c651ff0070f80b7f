//! `append_entry` — the canonical structured progress-log write, with
//! optional bulk submission and tee-to-auxiliary-stream support.

use std::path::Path;

use scribe_logging::append::{append_bulk, append_entry, AppendOutcome, AppendRequest};
use scribe_logging::streams::Stream;
use scribe_reminders::catalog::MISSING_METADATA;
use scribe_reminders::engine::ReminderCandidate;
use serde::Serialize;
use serde_json::Value;

use crate::healing::{heal_object_list, HealingNote};
use crate::router::ToolContext;
use crate::ToolResult;

/// One appended entry as reported back to the caller.
#[derive(Debug, Serialize)]
pub struct AppendedEntry {
    /// Deterministic entry id.
    pub entry_id: String,
    /// SHA-256 of the rendered line.
    pub sha256: String,
    /// Whether the requested tee actually wrote to its auxiliary stream.
    pub teed: bool,
    /// Metadata keys missing for the requested tee, if it was skipped.
    pub missing_metadata: Vec<String>,
}

impl From<AppendOutcome> for AppendedEntry {
    fn from(outcome: AppendOutcome) -> Self {
        Self {
            entry_id: outcome.entry.entry_id,
            sha256: outcome.entry.sha256,
            teed: outcome.teed,
            missing_metadata: outcome.missing_metadata.unwrap_or_default(),
        }
    }
}

/// Response payload for `append_entry`.
#[derive(Debug, Serialize)]
pub struct AppendEntryResult {
    /// Every entry written, in submission order.
    pub entries: Vec<AppendedEntry>,
}

/// Append one entry, or (if `items` carries more than one element and
/// `allow_bulk_entries` permits it) several entries in one call.
///
/// `items` is pre-healed by the caller into a list of request objects
/// via [`heal_object_list`]; a single bare object is treated as a
/// one-element bulk submission.
///
/// # Errors
///
/// Returns [`crate::ToolError::ParameterValidation`] if `items` cannot
/// be coerced into a list of objects, a
/// [`crate::ToolError::PermissionDenied`]-mapped sandbox error if bulk
/// submission is attempted without permission, or a logging/storage
/// error if the append pipeline fails.
pub async fn run(
    ctx: &ToolContext,
    log_path: &Path,
    docs_dir: &Path,
    repo_slug: &str,
    project: &str,
    items: Value,
) -> ToolResult<(AppendEntryResult, Vec<HealingNote>, Vec<ReminderCandidate>)> {
    let mut notes = Vec::new();
    let raw_items = heal_object_list("items", items, &mut notes)?;

    if raw_items.len() > 1 {
        ctx.permissions
            .check(scribe_sandbox::Operation::BulkEntries)?;
    }

    let requests: Vec<AppendRequest> = raw_items
        .into_iter()
        .map(|obj| parse_request(repo_slug, project, obj))
        .collect::<ToolResult<Vec<_>>>()?;

    let outcomes = if requests.len() == 1 {
        vec![append_entry(&ctx.db, log_path, docs_dir, &ctx.sandbox, &requests[0]).await?]
    } else {
        append_bulk(&ctx.db, log_path, docs_dir, &ctx.sandbox, &requests).await?
    };

    let mut candidates = Vec::new();
    if outcomes
        .iter()
        .any(|o| o.missing_metadata.is_some())
    {
        candidates.push(ReminderCandidate {
            definition: MISSING_METADATA,
            message: "a tee write was skipped for missing required metadata".to_string(),
        });
    }

    let entries = outcomes.into_iter().map(AppendedEntry::from).collect();
    Ok((AppendEntryResult { entries }, notes, candidates))
}

fn parse_request(
    repo_slug: &str,
    project: &str,
    obj: serde_json::Map<String, Value>,
) -> ToolResult<AppendRequest> {
    let message = obj
        .get("message")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            crate::error::ToolError::ParameterValidation("message is required".to_string())
        })?
        .to_string();
    let agent = obj
        .get("agent")
        .and_then(Value::as_str)
        .unwrap_or("default")
        .to_string();
    let category = obj
        .get("category")
        .and_then(Value::as_str)
        .unwrap_or("progress")
        .to_string();
    let tags = obj
        .get("tags")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let confidence = obj
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(1.0);
    let status = obj
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_string);
    let meta = obj
        .get("meta")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();
    let tee_to = obj
        .get("tee_to")
        .and_then(Value::as_str)
        .and_then(|s| match s {
            "doc_updates" => Some(Stream::DocUpdates),
            "security" => Some(Stream::Security),
            "bugs" => Some(Stream::Bugs),
            _ => None,
        });

    Ok(AppendRequest {
        repo_slug: repo_slug.to_string(),
        project: project.to_string(),
        agent,
        message,
        priority: None,
        status,
        emoji: None,
        category,
        tags,
        confidence,
        meta,
        timestamp: None,
        tee_to,
    })
}
