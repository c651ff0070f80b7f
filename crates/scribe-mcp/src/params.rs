//! Per-tool parameter shapes. Every tool accepts [`Common`] flattened
//! alongside its own fields, since each MCP call is independently
//! resolved into an [`scribe_core::context::ExecutionContext`] — there is
//! no persistent per-connection session state above the three-tier
//! resolver in `scribe-sessions`.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

/// Fields present on every tool call, used to resolve the execution
/// context before the tool body runs.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct Common {
    /// Absolute path to the repository root this call is scoped to.
    pub repo_root: String,
    /// `"project"` or `"sentinel"`.
    pub mode: String,
    /// Raw transport-level session identifier supplied by the MCP client.
    pub transport_session_id: String,
    /// Explicit agent kind override, if the caller knows its own identity.
    pub agent_kind: Option<String>,
    /// Explicit agent model override.
    pub agent_model: Option<String>,
    /// Free-text statement of what the agent is trying to do.
    pub intent: String,
    /// Dev-plan project slugs this call is expected to touch.
    #[serde(default)]
    pub affected_dev_projects: Vec<String>,
    /// Sentinel-mode day bucket, required when `mode` is `"sentinel"`.
    pub sentinel_day: Option<String>,
}

/// Parameters for `set_project`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetProjectParams {
    #[serde(flatten)]
    pub common: Common,
    /// Identity of the calling agent.
    pub agent_id: String,
    /// Project to select, created if it does not already exist.
    pub project_name: String,
    /// Expected CAS version, for optimistic-concurrency callers.
    pub expected_version: Option<i64>,
}

/// Parameters for `get_project`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetProjectParams {
    #[serde(flatten)]
    pub common: Common,
    /// Identity of the calling agent.
    pub agent_id: String,
    /// If `true`, fail rather than return an empty pointer.
    #[serde(default)]
    pub require_project: bool,
}

/// Parameters for `list_projects`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListProjectsParams {
    #[serde(flatten)]
    pub common: Common,
    /// Restrict to one lifecycle status, e.g. `"in_progress"`.
    pub status: Option<String>,
}

/// Parameters for `append_entry`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AppendEntryParams {
    #[serde(flatten)]
    pub common: Common,
    /// Project the entry belongs to.
    pub project: String,
    /// A single entry object, or a list of them for a bulk submission.
    pub items: Value,
}

/// Parameters for `read_recent`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadRecentParams {
    #[serde(flatten)]
    pub common: Common,
    /// Project to read from.
    pub project: String,
    /// Response rendering mode, defaults to `"readable"`.
    pub mode: Option<String>,
    /// How many rows to fetch before mode-based limiting, defaults to 200.
    pub fetch_limit: Option<usize>,
}

/// Parameters for `query_entries`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryEntriesParams {
    #[serde(flatten)]
    pub common: Common,
    /// Project to query.
    pub project: String,
    /// Restrict to entries at or after this RFC 3339 timestamp.
    pub since: Option<String>,
    /// Restrict to entries at or before this RFC 3339 timestamp.
    pub until: Option<String>,
    /// Restrict to one priority, e.g. `"high"`.
    pub priority: Option<String>,
    /// Restrict to one category.
    pub category: Option<String>,
    /// Minimum confidence, inclusive.
    pub min_confidence: Option<f64>,
    /// Response rendering mode, defaults to `"readable"`.
    pub mode: Option<String>,
}

/// Parameters for `manage_docs`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ManageDocsParams {
    #[serde(flatten)]
    pub common: Common,
    /// Owning project slug.
    pub project: String,
    /// Well-known document name, e.g. `"dev_plan"`.
    pub doc_name: String,
    /// Section identifier, when the operation targets one.
    pub section: Option<String>,
    /// Agent performing the edit.
    pub agent: String,
    /// If `true`, compute the diff without writing.
    #[serde(default)]
    pub dry_run: bool,
    /// Tagged by `type`: `replace_section`, `append`, `apply_patch_unified`,
    /// `replace_block`, `replace_range`, `create_doc`, `generate_toc`,
    /// `normalize_headers`.
    pub operation: Value,
}

/// Parameters for `generate_doc_templates`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateDocTemplatesParams {
    #[serde(flatten)]
    pub common: Common,
    /// Project to scaffold documents for.
    pub project: String,
    /// Agent performing the scaffold.
    pub agent: String,
}

/// Parameters for `rotate_log`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RotateLogParams {
    #[serde(flatten)]
    pub common: Common,
    /// Project whose progress log should be rotated.
    pub project: String,
}

/// Parameters for `health_check`. Carries no fields beyond [`Common`].
#[derive(Debug, Deserialize, JsonSchema)]
pub struct HealthCheckParams {
    #[serde(flatten)]
    pub common: Common,
}

/// Parameters for `open_bug` and `open_security`; the case kind is
/// implied by which tool was called, not carried as a field.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct OpenCaseParams {
    #[serde(flatten)]
    pub common: Common,
    /// Day bucket, e.g. `"2026-07-27"`.
    pub day: String,
    /// Short case title.
    pub title: String,
    /// Observed symptoms.
    pub symptoms: String,
    /// Paths implicated by the case.
    #[serde(default)]
    pub affected_paths: Vec<String>,
}

/// Parameters for `link_fix`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LinkFixParams {
    #[serde(flatten)]
    pub common: Common,
    /// Case to attach the fix to, e.g. `"BUG-2026-07-27-0001"`.
    pub case_id: String,
    /// Execution id that produced the fix.
    pub execution_id: String,
    /// Reference to the fix artifact, e.g. a commit SHA.
    pub artifact_ref: String,
    /// Updated lifecycle status, e.g. `"landed"`.
    pub landing_status: String,
}

/// Parameters for `append_event`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AppendEventParams {
    #[serde(flatten)]
    pub common: Common,
    /// Day bucket the event belongs to.
    pub day: String,
    /// Agent reporting the event.
    pub agent: String,
    /// Free-form event type tag.
    pub event_type: String,
    /// Event payload.
    pub data: Value,
}
