//! Row types for every table in §4.8 of the data model.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a [`Project`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Work has not yet started.
    Planning,
    /// Actively worked on.
    InProgress,
    /// Temporarily paused.
    Paused,
    /// Finished.
    Completed,
    /// Retained for history but no longer active.
    Archived,
}

/// A unit of agent work within a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique name within the repository.
    pub name: String,
    /// Canonicalized absolute repository root.
    pub repo_root: String,
    /// Path to the progress log, relative to `repo_root`.
    pub progress_log_path: String,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// When the project was first created.
    pub created_at: DateTime<Utc>,
    /// Last time any field was updated.
    pub updated_at: DateTime<Utc>,
    /// Last time a log entry was recorded.
    pub last_entry_at: Option<DateTime<Utc>>,
    /// Last time the project was accessed by any tool.
    pub last_access_at: Option<DateTime<Utc>>,
    /// Last time `status` changed.
    pub last_status_change: Option<DateTime<Utc>>,
    /// Free-text description.
    pub description: Option<String>,
    /// Tags for filtering/listing.
    pub tags: Vec<String>,
    /// Baseline and current content hashes of each well-known document.
    pub doc_hashes: HashMap<String, DocHashPair>,
    /// Arbitrary extra metadata.
    pub meta: HashMap<String, String>,
}

/// Baseline (first-seen) and current content hash of a tracked document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocHashPair {
    /// Hash recorded the first time the document was seen.
    pub baseline: Option<String>,
    /// Hash as of the most recent mutation.
    pub current: Option<String>,
}

/// Severity/urgency of a [`LogEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Lowest urgency.
    Low,
    /// Default urgency.
    Medium,
    /// Elevated urgency.
    High,
    /// Highest urgency.
    Critical,
}

impl Priority {
    /// Infer a priority from a status keyword, per §6's inference table.
    /// Falls back to [`Priority::Medium`] for anything unrecognized.
    #[must_use]
    pub fn infer_from_status(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "error" | "bug" => Self::High,
            "warn" | "success" | "plan" => Self::Medium,
            "info" => Self::Low,
            _ => Self::Medium,
        }
    }

    /// Parse an explicit priority string, defaulting to [`Priority::Medium`]
    /// for anything invalid rather than rejecting the call.
    #[must_use]
    pub fn parse_or_medium(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Medium,
        }
    }
}

/// An append-only progress-log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Deterministic 32-hex entry ID.
    pub entry_id: String,
    /// Owning project name.
    pub project: String,
    /// UTC timestamp at compose time.
    pub ts: DateTime<Utc>,
    /// Emoji prefix.
    pub emoji: String,
    /// Agent name that produced the entry.
    pub agent: String,
    /// Single-line message body (no pipes, no newlines).
    pub message: String,
    /// Metadata key/value pairs.
    pub meta: HashMap<String, String>,
    /// The fully rendered line, exactly as written to the log file.
    pub raw_line: String,
    /// SHA-256 hex of `raw_line`.
    pub sha256: String,
    /// Urgency.
    pub priority: Priority,
    /// Category, one of the vocabulary in §6.
    pub category: String,
    /// Comma-joined tags.
    pub tags: Vec<String>,
    /// Confidence, clamped to `[0.0, 1.0]`.
    pub confidence: f64,
}

/// Lease state of an [`AgentSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Session is within its idle TTL.
    Active,
    /// Session's idle TTL has elapsed.
    Expired,
    /// Session was explicitly ended.
    Ended,
}

/// A long-lived agent identity tied to a transport session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSession {
    /// Stable UUID, survives process restarts.
    pub session_id: Uuid,
    /// Opaque transport-layer session identifier.
    pub transport_session_id: String,
    /// Short agent kind.
    pub agent_kind: String,
    /// Agent instance identifier.
    pub instance_id: String,
    /// When the session was first created.
    pub started_at: DateTime<Utc>,
    /// Last time a tool call was made under this session.
    pub last_active_at: DateTime<Utc>,
    /// Lease state.
    pub status: SessionStatus,
}

/// Per-agent current-project pointer with an optimistic version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProject {
    /// Composite agent identity hash (see §4.1).
    pub agent_id: String,
    /// The currently selected project, if any.
    pub project_name: Option<String>,
    /// Monotonically increasing CAS version.
    pub version: i64,
    /// Last time this pointer changed.
    pub updated_at: DateTime<Utc>,
    /// Which session performed the last update.
    pub updated_by: Uuid,
    /// Owning session.
    pub session_id: Uuid,
}

/// Kind of [`AgentEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentEventType {
    /// A session was created.
    SessionStarted,
    /// A session was explicitly ended or expired.
    SessionEnded,
    /// A project was set for the first time.
    ProjectSet,
    /// A project was changed from one value to another.
    ProjectSwitched,
    /// A CAS attempt failed.
    ConflictDetected,
}

/// Audit record for a project-context change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEvent {
    /// Event discriminant.
    pub event_type: AgentEventType,
    /// The agent this event concerns.
    pub agent_id: String,
    /// Project prior to this event, if any.
    pub from_project: Option<String>,
    /// Project after this event, if any.
    pub to_project: Option<String>,
    /// Version before/expected/after, rendered as a small JSON object.
    pub version_info: VersionInfo,
    /// Whether the underlying operation succeeded.
    pub success: bool,
    /// Free-form contextual metadata.
    pub context: HashMap<String, String>,
    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
}

/// Version bookkeeping attached to an [`AgentEvent`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VersionInfo {
    /// Version read before the operation.
    pub before: Option<i64>,
    /// Version the caller expected (CAS input).
    pub expected: Option<i64>,
    /// Version after the operation, if it succeeded.
    pub after: Option<i64>,
}

/// Record of a successful document mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChange {
    /// Owning project.
    pub project: String,
    /// Well-known document name.
    pub doc_name: String,
    /// Section identifier, when the operation targeted one.
    pub section: Option<String>,
    /// Operation name (`replace_section`, `append`, …).
    pub action: String,
    /// Agent that performed the edit.
    pub agent: String,
    /// SHA-256 of the document content before the edit.
    pub sha_before: String,
    /// SHA-256 of the document content after the edit.
    pub sha_after: String,
    /// Operation-specific metadata.
    pub metadata: HashMap<String, String>,
    /// When the change was recorded.
    pub created_at: DateTime<Utc>,
}

/// Outcome of a tool call, for reminder cooldown bypass and history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// The triggering tool call succeeded.
    Success,
    /// The triggering tool call failed.
    Failure,
    /// Neither a clear success nor failure (e.g. a read-only query).
    Neutral,
}

/// Per-session record of a reminder having been shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderHistoryEntry {
    /// Owning session; rows are deleted when the session is deleted.
    pub session_id: Uuid,
    /// Content- and scope-derived cooldown key.
    pub reminder_hash: String,
    /// Repository root the reminder was shown in.
    pub project_root: String,
    /// Agent the reminder was shown to.
    pub agent_id: String,
    /// Tool call that triggered the reminder.
    pub tool_name: String,
    /// Dotted reminder catalog key.
    pub reminder_key: String,
    /// When the reminder was shown.
    pub shown_at: DateTime<Utc>,
    /// Outcome of the triggering call.
    pub operation_status: OperationStatus,
    /// Extra context captured at selection time.
    pub context_metadata: HashMap<String, String>,
}

/// Which kind of sentinel case an ID belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentinelCaseKind {
    /// `BUG-YYYY-MM-DD-NNNN`.
    Bug,
    /// `SEC-YYYY-MM-DD-NNNN`.
    Security,
}

impl SentinelCaseKind {
    /// The prefix used in a rendered case ID.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Bug => "BUG",
            Self::Security => "SEC",
        }
    }
}

/// A single fix artifact linked to a case via `link_fix`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixLink {
    /// Execution that produced the fix.
    pub execution_id: String,
    /// Reference to the artifact (commit, PR, patch path, …).
    pub artifact_ref: String,
    /// When the link was recorded.
    pub linked_at: DateTime<Utc>,
}

/// A BUG or SEC case opened in sentinel mode, with a per-day stable ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentinelCase {
    /// Rendered `{prefix}-{day}-{seq:04}` identifier.
    pub case_id: String,
    /// `BUG` or `SEC`.
    pub kind: SentinelCaseKind,
    /// Day bucket, `YYYY-MM-DD`.
    pub day: String,
    /// Per-day sequence number, starting at 1.
    pub seq: u32,
    /// Short case title.
    pub title: String,
    /// Observed symptoms.
    pub symptoms: String,
    /// Paths implicated by the case.
    pub affected_paths: Vec<String>,
    /// Current landing status (`proposed`, `fixed`, `verified`, …).
    pub landing_status: String,
    /// Fix artifacts linked so far.
    pub fix_links: Vec<FixLink>,
    /// When the case was opened.
    pub created_at: DateTime<Utc>,
    /// Last time the case was updated.
    pub updated_at: DateTime<Utc>,
}

/// Per-project counters, upserted alongside every entry insert.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectMetrics {
    /// Owning project name (primary key).
    pub project: String,
    /// Total entries ever recorded.
    pub total_entries: i64,
    /// Entries whose inferred/explicit priority implied success.
    pub success_count: i64,
    /// Entries at warning-equivalent priority.
    pub warn_count: i64,
    /// Entries at error-equivalent priority.
    pub error_count: i64,
    /// Last time these counters changed.
    pub last_update: Option<DateTime<Utc>>,
}
