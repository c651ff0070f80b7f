//! Tool invocation pipeline: resolves an [`ExecutionContext`], installs it
//! as the task-local for the duration of the call, records the call in
//! the advisory state cache, runs the tool body, then attaches reminders
//! and applies entry-limit post-processing to the response.
//!
//! # Sequential processing
//!
//! Each call to [`dispatch`] runs its tool body to completion before
//! returning; there is no queue. Concurrency comes from the MCP server
//! spawning one `dispatch` per inbound request, not from pipelining
//! within a single one.

use std::sync::Arc;

use scribe_core::context::{ExecutionContext, Mode};
use scribe_core::identity::AgentIdentity;
use scribe_reminders::context::ReminderContext;
use scribe_reminders::engine::{ReminderCandidate, ReminderEngine, SelectedReminder};
use scribe_sessions::manager::SessionManager;
use scribe_sessions::state::StateManager;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ToolResult;
use crate::healing::HealingNote;

/// Everything a single tool call needs resolved before its body runs.
pub struct CallRequest {
    /// Repository root the call is scoped to.
    pub repo_root: std::path::PathBuf,
    /// Project or sentinel mode.
    pub mode: Mode,
    /// Raw transport-level session identifier from the MCP client.
    pub transport_session_id: String,
    /// Explicit agent kind override, if the caller supplied one.
    pub agent_kind: Option<String>,
    /// Explicit agent model override, if the caller supplied one.
    pub agent_model: Option<String>,
    /// Free-text statement of what the agent is trying to do.
    pub intent: String,
    /// Dev-plan project slugs this call is expected to touch.
    pub affected_dev_projects: Vec<String>,
    /// Sentinel-mode day bucket, required when `mode` is [`Mode::Sentinel`].
    pub sentinel_day: Option<String>,
    /// Name of the tool being invoked, used for state/reminder bookkeeping.
    pub tool_name: String,
}

/// Shared dependencies every tool body may draw on, bundled so callers
/// don't thread them through individually.
#[derive(Clone)]
pub struct ToolContext {
    /// Database handle, passed through to tool bodies that query storage.
    pub db: Arc<scribe_storage::Database>,
    /// Path + permission sandbox.
    pub sandbox: Arc<scribe_sandbox::PathSandbox>,
    /// Repository root, rendered once for reminder cache keys.
    pub repo_root_display: String,
    /// Operation gate built from repository configuration.
    pub permissions: scribe_sandbox::PermissionChecker,
    /// Three-tier session identity resolver.
    pub sessions: Arc<SessionManager>,
    /// Advisory JSON state cache.
    pub state: Arc<StateManager>,
    /// Reminder selection engine.
    pub reminders: Arc<ReminderEngine>,
    /// Idle-gap threshold, in minutes, before a new state session window
    /// is considered to have started.
    pub idle_threshold_minutes: i64,
}

/// The full envelope returned to an MCP caller: the tool body's own
/// payload plus ambient bookkeeping every response carries.
#[derive(Debug, Serialize)]
pub struct ToolResponse<T> {
    /// The tool-specific result payload.
    #[serde(flatten)]
    pub payload: T,
    /// Execution id of this call, echoed for correlation with logs.
    pub execution_id: Uuid,
    /// Resolved durable session id.
    pub session_id: Uuid,
    /// Notes describing any parameter coercions that fired.
    pub validation_warnings: Vec<String>,
    /// Reminders selected for this call, newest-relevant first.
    pub reminders: Vec<SelectedReminder>,
}

/// Resolve a transport-level call into an installed [`ExecutionContext`],
/// run `body` inside its scope, then attach reminders to the result.
///
/// `body` receives the installed context and returns its own payload plus
/// any [`HealingNote`]s collected while healing its parameters, and a set
/// of [`ReminderCandidate`]s relevant to what it just did.
///
/// # Errors
///
/// Returns whatever error `body` returns, or a [`crate::error::ToolError`]
/// if context resolution, session resolution, or reminder selection
/// fails.
pub async fn dispatch<T, F, Fut>(
    request: CallRequest,
    ctx: &ToolContext,
    body: F,
) -> ToolResult<ToolResponse<T>>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = ToolResult<(T, Vec<HealingNote>, Vec<ReminderCandidate>)>>,
{
    let agent_identity = AgentIdentity::resolve(request.agent_kind.as_deref(), None);
    let session = ctx
        .sessions
        .resolve(&request.transport_session_id, &agent_identity.kind)
        .await?;

    let mut builder = ExecutionContext::builder()
        .repo_root(request.repo_root)
        .mode(request.mode)
        .session_id(session.session_id)
        .transport_session_id(request.transport_session_id)
        .agent_identity(agent_identity)
        .intent(request.intent)
        .affected_dev_projects(request.affected_dev_projects);
    if let Some(day) = request.sentinel_day {
        builder = builder.sentinel_day(day);
    }
    let exec_ctx = builder.build()?;
    let execution_id = exec_ctx.execution_id;
    let session_id = exec_ctx.session_id;

    ctx.state
        .record_tool_call(&request.tool_name, ctx.idle_threshold_minutes)
        .await?;

    let (payload, notes, candidates) = scribe_core::context::scope(exec_ctx, body).await?;

    let reminder_ctx = ReminderContext {
        tool_name: request.tool_name,
        project_name: None,
        project_root: ctx.repo_root_display.clone(),
        agent_id: session.agent_kind.clone(),
        session_id: Some(session.transport_session_id.clone()),
        total_entries: 0,
        minutes_since_log: None,
        last_log_time: None,
        docs_status: Default::default(),
        docs_changed: Vec::new(),
        current_phase: None,
        session_age_minutes: None,
        operation_status: scribe_storage::models::OperationStatus::Success,
        variables: Default::default(),
    };
    let reminders = ctx
        .reminders
        .select(&reminder_ctx, session_id, candidates)
        .await?;

    Ok(ToolResponse {
        payload,
        execution_id,
        session_id,
        validation_warnings: notes.iter().map(HealingNote::message).collect(),
        reminders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_response_serializes_payload_flattened() {
        #[derive(Serialize)]
        struct Payload {
            ok: bool,
        }
        let response = ToolResponse {
            payload: Payload { ok: true },
            execution_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            validation_warnings: vec!["tags was coerced".to_string()],
            reminders: vec![],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["ok"], serde_json::json!(true));
        assert!(value.get("payload").is_none());
    }
}
