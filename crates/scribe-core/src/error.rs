//! Base error taxonomy shared by the execution-context layer.

/// Errors raised while constructing or validating an [`crate::ExecutionContext`].
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// `repo_root` was not an absolute path.
    #[error("repo_root must be an absolute path: {0}")]
    RepoRootNotAbsolute(String),

    /// `mode` was neither `project` nor `sentinel`.
    #[error("invalid mode: {0}")]
    InvalidMode(String),

    /// `intent` was empty.
    #[error("intent must not be empty")]
    EmptyIntent,

    /// Neither `session_id` nor `transport_session_id` could be resolved.
    #[error("no session identity could be resolved")]
    UnresolvedSession,

    /// A generic internal failure, always logged before conversion.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
