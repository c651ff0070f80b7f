//! Call-scoped execution context.
//!
//! [`ExecutionContext`] is the Rust analogue of a `contextvars.ContextVar`:
//! it is installed once per tool invocation and read by every lower layer
//! (sandbox, logging, sessions, reminders) without being threaded through
//! every function signature.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::identity::AgentIdentity;

/// Which surface a call arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// A call scoped to a specific project within a repository.
    Project,
    /// A repository-wide call not tied to any single project.
    Sentinel,
}

impl Mode {
    /// Parse from the wire string, matching the validation rule in
    /// [`ExecutionContextBuilder::build`].
    pub fn parse(s: &str) -> CoreResult<Self> {
        match s {
            "project" => Ok(Self::Project),
            "sentinel" => Ok(Self::Sentinel),
            other => Err(CoreError::InvalidMode(other.to_string())),
        }
    }
}

/// The full set of ambient facts a tool invocation carries.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExecutionContext {
    /// Absolute path to the repository root.
    pub repo_root: PathBuf,
    /// Project or sentinel scope.
    pub mode: Mode,
    /// Resolved durable session identifier.
    pub session_id: Uuid,
    /// Unique identifier for this single call, used in error logs.
    pub execution_id: Uuid,
    /// Which agent kind/model is making the call.
    pub agent_identity: AgentIdentity,
    /// Free-text statement of what the agent is trying to do.
    pub intent: String,
    /// When this context was constructed.
    pub timestamp: DateTime<Utc>,
    /// Dev-plan project slugs this call is expected to touch.
    pub affected_dev_projects: Vec<String>,
    /// Sentinel-mode day bucket, e.g. `2026-07-27`.
    pub sentinel_day: Option<String>,
    /// Raw transport-level session identifier, before three-tier resolution.
    pub transport_session_id: Option<String>,
    /// Execution ID of the call that spawned this one, if any.
    pub parent_execution_id: Option<Uuid>,
}

impl ExecutionContext {
    /// Start building a new context.
    #[must_use]
    pub fn builder() -> ExecutionContextBuilder {
        ExecutionContextBuilder::default()
    }
}

/// Builder enforcing the validation rules from the data model.
#[derive(Debug, Default)]
pub struct ExecutionContextBuilder {
    repo_root: Option<PathBuf>,
    mode: Option<Mode>,
    session_id: Option<Uuid>,
    agent_identity: Option<AgentIdentity>,
    intent: Option<String>,
    affected_dev_projects: Vec<String>,
    sentinel_day: Option<String>,
    transport_session_id: Option<String>,
    parent_execution_id: Option<Uuid>,
}

impl ExecutionContextBuilder {
    /// Set the repository root. Must be absolute.
    #[must_use]
    pub fn repo_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.repo_root = Some(path.into());
        self
    }

    /// Set the mode.
    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set the already-resolved durable session id.
    #[must_use]
    pub fn session_id(mut self, id: Uuid) -> Self {
        self.session_id = Some(id);
        self
    }

    /// Set the raw transport session id, used when `session_id` is not yet
    /// resolved (three-tier resolution happens in `scribe-sessions`).
    #[must_use]
    pub fn transport_session_id(mut self, id: impl Into<String>) -> Self {
        self.transport_session_id = Some(id.into());
        self
    }

    /// Set the agent identity.
    #[must_use]
    pub fn agent_identity(mut self, identity: AgentIdentity) -> Self {
        self.agent_identity = Some(identity);
        self
    }

    /// Set the intent string.
    #[must_use]
    pub fn intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    /// Set the affected dev-plan project slugs.
    #[must_use]
    pub fn affected_dev_projects(mut self, projects: Vec<String>) -> Self {
        self.affected_dev_projects = projects;
        self
    }

    /// Set the sentinel-mode day bucket.
    #[must_use]
    pub fn sentinel_day(mut self, day: impl Into<String>) -> Self {
        self.sentinel_day = Some(day.into());
        self
    }

    /// Set the parent execution id, for sub-agent spawns.
    #[must_use]
    pub fn parent_execution_id(mut self, id: Uuid) -> Self {
        self.parent_execution_id = Some(id);
        self
    }

    /// Validate and construct the context.
    ///
    /// # Errors
    ///
    /// Returns an error if `repo_root` is not absolute, `mode` was not set,
    /// `intent` is empty, or neither `session_id` nor `transport_session_id`
    /// is resolvable.
    pub fn build(self) -> CoreResult<ExecutionContext> {
        let repo_root = self
            .repo_root
            .ok_or_else(|| CoreError::Internal("repo_root is required".into()))?;
        if !repo_root.is_absolute() {
            return Err(CoreError::RepoRootNotAbsolute(
                repo_root.display().to_string(),
            ));
        }
        let mode = self
            .mode
            .ok_or_else(|| CoreError::Internal("mode is required".into()))?;
        let intent = self.intent.unwrap_or_default();
        if intent.trim().is_empty() {
            return Err(CoreError::EmptyIntent);
        }
        let session_id = match (self.session_id, &self.transport_session_id) {
            (Some(id), _) => id,
            (None, Some(_)) => Uuid::new_v4(),
            (None, None) => return Err(CoreError::UnresolvedSession),
        };
        Ok(ExecutionContext {
            repo_root,
            mode,
            session_id,
            execution_id: Uuid::new_v4(),
            agent_identity: self
                .agent_identity
                .unwrap_or_else(|| AgentIdentity::new("default", None)),
            intent,
            timestamp: Utc::now(),
            affected_dev_projects: self.affected_dev_projects,
            sentinel_day: self.sentinel_day,
            transport_session_id: self.transport_session_id,
            parent_execution_id: self.parent_execution_id,
        })
    }
}

tokio::task_local! {
    static CURRENT: ExecutionContext;
}

/// Run `f` with `ctx` installed as the task-local execution context.
pub async fn scope<F, Fut, T>(ctx: ExecutionContext, f: F) -> T
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = T>,
{
    CURRENT.scope(ctx, f()).await
}

/// Read the currently installed execution context.
///
/// # Panics
///
/// Panics if called outside of [`scope`]. Every tool entry point installs a
/// context before touching lower layers, so this is a programming error if
/// it ever fires outside of tests.
pub async fn current() -> ExecutionContext {
    CURRENT.with(Clone::clone)
}

/// Try to read the currently installed execution context without panicking.
pub fn try_current() -> Option<ExecutionContext> {
    CURRENT.try_with(Clone::clone).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ExecutionContext {
        ExecutionContext::builder()
            .repo_root("/repo")
            .mode(Mode::Project)
            .transport_session_id("t-1")
            .agent_identity(AgentIdentity::new("codex", None))
            .intent("write docs")
            .build()
            .unwrap()
    }

    #[test]
    fn rejects_relative_repo_root() {
        let err = ExecutionContext::builder()
            .repo_root("relative")
            .mode(Mode::Project)
            .transport_session_id("t-1")
            .intent("x")
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::RepoRootNotAbsolute(_)));
    }

    #[test]
    fn rejects_empty_intent() {
        let err = ExecutionContext::builder()
            .repo_root("/repo")
            .mode(Mode::Project)
            .transport_session_id("t-1")
            .intent("   ")
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyIntent));
    }

    #[test]
    fn rejects_unresolved_session() {
        let err = ExecutionContext::builder()
            .repo_root("/repo")
            .mode(Mode::Project)
            .intent("x")
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::UnresolvedSession));
    }

    #[tokio::test]
    async fn scope_installs_context() {
        let built = ctx();
        let execution_id = built.execution_id;
        scope(built, || async move {
            let read = current().await;
            assert_eq!(read.execution_id, execution_id);
        })
        .await;
        assert!(try_current().is_none());
    }

    #[test]
    fn mode_parse_roundtrip() {
        assert_eq!(Mode::parse("project").unwrap(), Mode::Project);
        assert_eq!(Mode::parse("sentinel").unwrap(), Mode::Sentinel);
        assert!(Mode::parse("bogus").is_err());
    }
}
