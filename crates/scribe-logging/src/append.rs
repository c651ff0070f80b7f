//! The append pipeline: validate, normalize, compute the deterministic
//! ID, compose the line, append under lock, record the row and metrics,
//! then tee to an auxiliary stream when its metadata requirement is met.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use scribe_sandbox::PathSandbox;
use scribe_storage::models::LogEntry;
use scribe_storage::{queries, Database};

use crate::error::{LoggingError, LoggingResult};
use crate::format::{compose, format_timestamp, sanitize_message};
use crate::id::entry_id;
use crate::priority::{clamp_confidence, default_emoji_for_status, Priority};
use crate::streams::Stream;

/// Per-item stagger applied across a bulk submission to preserve
/// monotonic timestamps for items composed within the same call.
pub const BULK_STAGGER: chrono::Duration = chrono::Duration::seconds(1);

/// A single entry to append, before normalization.
#[derive(Debug, Clone)]
pub struct AppendRequest {
    /// Repository slug, used in the entry-ID hash input.
    pub repo_slug: String,
    /// Project name (and slug — the two coincide in this design).
    pub project: String,
    /// Agent name; empty becomes `"default"`.
    pub agent: String,
    /// Raw message, sanitized by [`sanitize_message`].
    pub message: String,
    /// Explicit priority, if the caller supplied one.
    pub priority: Option<Priority>,
    /// Status keyword used to infer priority/emoji when not explicit.
    pub status: Option<String>,
    /// Explicit emoji override.
    pub emoji: Option<String>,
    /// Category, one of the standard vocabulary (not validated here).
    pub category: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Confidence, validated via [`clamp_confidence`].
    pub confidence: f64,
    /// Free-form metadata.
    pub meta: BTreeMap<String, String>,
    /// Explicit timestamp override; defaults to now.
    pub timestamp: Option<DateTime<Utc>>,
    /// Auxiliary stream to tee this entry to, if any.
    pub tee_to: Option<Stream>,
}

/// Result of a single append, including whether a requested tee actually
/// happened.
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    /// The persisted entry.
    pub entry: LogEntry,
    /// `true` if `tee_to` was set and its metadata requirement was met.
    pub teed: bool,
    /// Metadata keys missing for the requested tee, if it was skipped.
    pub missing_metadata: Option<Vec<String>>,
}

/// Sanitize a metadata key to match `[A-Za-z_][A-Za-z0-9_]*`, replacing
/// any other character with `_`. A key that would otherwise start with a
/// digit is prefixed with `_`.
#[must_use]
pub fn sanitize_meta_key(raw: &str) -> String {
    let mut sanitized: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if sanitized
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
    {
        sanitized.insert(0, '_');
    }
    if sanitized.is_empty() {
        sanitized.push('_');
    }
    sanitized
}

fn normalize_meta(raw: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    raw.iter()
        .map(|(k, v)| (sanitize_meta_key(k), crate::format::sanitize_meta_value(v)))
        .collect()
}

/// Run the full append pipeline for one entry: validate, compose,
/// append under lock, record the row and metrics, then tee to the
/// requested auxiliary stream under `docs_dir` when its metadata
/// requirement is met.
///
/// # Errors
///
/// Returns [`LoggingError::EmptyMessage`] if the message is blank,
/// [`LoggingError::FileIo`] if an append fails,
/// [`LoggingError::Storage`] if the database write fails, or
/// [`LoggingError::Sandbox`] if the resolved auxiliary-stream path is
/// rejected.
pub async fn append_entry(
    db: &Database,
    log_path: &Path,
    docs_dir: &Path,
    sandbox: &PathSandbox,
    request: &AppendRequest,
) -> LoggingResult<AppendOutcome> {
    let message = sanitize_message(&request.message)?;
    let meta = normalize_meta(&request.meta);
    let agent = if request.agent.trim().is_empty() {
        "default".to_string()
    } else {
        request.agent.clone()
    };
    let timestamp = request.timestamp.unwrap_or_else(Utc::now);
    let normalized_ts = format_timestamp(timestamp);

    let priority = request.priority.unwrap_or_else(|| {
        request
            .status
            .as_deref()
            .map(Priority::infer_from_status)
            .unwrap_or(Priority::Medium)
    });
    let emoji = request
        .emoji
        .clone()
        .or_else(|| request.status.as_deref().map(|s| default_emoji_for_status(s).to_string()))
        .unwrap_or_else(|| default_emoji_for_status("info").to_string());
    let confidence = clamp_confidence(request.confidence);

    let id = entry_id(
        &request.repo_slug,
        &request.project,
        &normalized_ts,
        &agent,
        &message,
        &meta,
    );
    let raw_line = compose(&emoji, timestamp, &agent, &request.project, Some(&id), &message, &meta);
    let sha256 = scribe_core::hash::sha256_hex(raw_line.as_bytes());

    let entry = LogEntry {
        entry_id: id,
        project: request.project.clone(),
        ts: timestamp,
        emoji,
        agent,
        message,
        meta: meta.into_iter().collect(),
        raw_line: raw_line.clone(),
        sha256,
        priority,
        category: request.category.clone(),
        tags: request.tags.clone(),
        confidence,
    };

    scribe_fileio::lock::locked_append(log_path, &raw_line).await?;

    let already_present = queries::entries::get_by_id(db, &entry.entry_id)
        .await?
        .is_some();
    queries::entries::insert(db, &entry).await?;
    if !already_present {
        queries::metrics::record_entry(db, &entry.project, entry.priority).await?;
    }

    let (teed, missing_metadata) = match request.tee_to {
        None => (false, None),
        Some(stream) => {
            let missing = stream.missing_metadata(
                &entry
                    .meta
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            );
            if missing.is_empty() {
                let aux_path = sandbox.check(&stream.resolve_path(docs_dir))?;
                scribe_fileio::lock::locked_append(&aux_path, &raw_line).await?;
                (true, None)
            } else {
                (false, Some(missing))
            }
        },
    };

    Ok(AppendOutcome {
        entry,
        teed,
        missing_metadata,
    })
}

/// Append a batch of entries sequentially, each staggered by
/// [`BULK_STAGGER`] relative to the first (unless the caller supplied an
/// explicit distinct timestamp for that item) to keep on-disk timestamps
/// monotonic across items composed within the same call.
///
/// # Errors
///
/// Returns the first [`LoggingError`] encountered; prior items in the
/// batch remain committed (each append is independently durable).
pub async fn append_bulk(
    db: &Database,
    log_path: &Path,
    docs_dir: &Path,
    sandbox: &PathSandbox,
    requests: &[AppendRequest],
) -> LoggingResult<Vec<AppendOutcome>> {
    let base = Utc::now();
    let mut outcomes = Vec::with_capacity(requests.len());
    for (index, request) in requests.iter().enumerate() {
        let mut item = request.clone();
        if item.timestamp.is_none() {
            item.timestamp = Some(base + BULK_STAGGER * i32::try_from(index).unwrap_or(i32::MAX));
        }
        outcomes.push(append_entry(db, log_path, docs_dir, sandbox, &item).await?);
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request(project: &str, message: &str) -> AppendRequest {
        AppendRequest {
            repo_slug: "demo".to_string(),
            project: project.to_string(),
            agent: "Codex".to_string(),
            message: message.to_string(),
            priority: None,
            status: None,
            emoji: None,
            category: "implementation".to_string(),
            tags: Vec::new(),
            confidence: 1.0,
            meta: BTreeMap::new(),
            timestamp: None,
            tee_to: None,
        }
    }

    async fn db() -> Database {
        let db = Database::connect_memory().await.unwrap();
        scribe_storage::schema::setup(&db).await.unwrap();
        db
    }

    #[tokio::test]
    async fn append_then_reappend_is_idempotent() {
        let db = db().await;
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("progress.log");
        let docs_dir = dir.path().join("docs");
        let sandbox = PathSandbox::new(dir.path());

        let mut request = base_request("demo", "Smoke test");
        request.timestamp = Some(
            chrono::DateTime::parse_from_rfc3339("2025-12-17T02:38:42Z")
                .unwrap()
                .with_timezone(&Utc),
        );
        request
            .meta
            .insert("foo".to_string(), "bar".to_string());

        let first = append_entry(&db, &log_path, &docs_dir, &sandbox, &request).await.unwrap();
        let second = append_entry(&db, &log_path, &docs_dir, &sandbox, &request).await.unwrap();
        assert_eq!(first.entry.entry_id, second.entry.entry_id);

        let recent = queries::entries::recent(&db, "demo", 10).await.unwrap();
        assert_eq!(recent.len(), 1);
    }

    #[tokio::test]
    async fn tee_skipped_when_metadata_missing() {
        let db = db().await;
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("progress.log");
        let docs_dir = dir.path().join("docs");
        let sandbox = PathSandbox::new(dir.path());

        let mut request = base_request("demo", "bug occurred");
        request.tee_to = Some(Stream::Bugs);

        let outcome = append_entry(&db, &log_path, &docs_dir, &sandbox, &request).await.unwrap();
        assert!(!outcome.teed);
        assert_eq!(
            outcome.missing_metadata.unwrap(),
            vec!["severity", "component", "status"]
        );
        assert!(!docs_dir.join("BUG_LOG.md").exists());
    }

    #[tokio::test]
    async fn tee_succeeds_when_metadata_present() {
        let db = db().await;
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("progress.log");
        let docs_dir = dir.path().join("docs");
        let sandbox = PathSandbox::new(dir.path());

        let mut request = base_request("demo", "bug occurred");
        request.tee_to = Some(Stream::Bugs);
        request.meta.insert("severity".to_string(), "high".to_string());
        request.meta.insert("component".to_string(), "auth".to_string());
        request.meta.insert("status".to_string(), "open".to_string());

        let outcome = append_entry(&db, &log_path, &docs_dir, &sandbox, &request).await.unwrap();
        assert!(outcome.teed);
        assert!(outcome.missing_metadata.is_none());

        let bug_log = std::fs::read_to_string(docs_dir.join("BUG_LOG.md")).unwrap();
        assert_eq!(bug_log.trim_end(), outcome.entry.raw_line);
    }

    #[tokio::test]
    async fn bulk_append_staggers_timestamps() {
        let db = db().await;
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("progress.log");
        let docs_dir = dir.path().join("docs");
        let sandbox = PathSandbox::new(dir.path());

        let requests = vec![
            base_request("demo", "one"),
            base_request("demo", "two"),
            base_request("demo", "three"),
        ];
        let outcomes = append_bulk(&db, &log_path, &docs_dir, &sandbox, &requests).await.unwrap();
        assert!(outcomes[0].entry.ts < outcomes[1].entry.ts);
        assert!(outcomes[1].entry.ts < outcomes[2].entry.ts);
    }

    #[test]
    fn sanitize_meta_key_replaces_invalid_chars() {
        assert_eq!(sanitize_meta_key("foo|bar"), "foo_bar");
        assert_eq!(sanitize_meta_key("1abc"), "_1abc");
    }
}
