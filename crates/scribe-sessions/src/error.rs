//! Session and project-context error taxonomy.

/// Errors from session identity resolution and agent-scoped project
/// context management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The storage layer reported a failure.
    #[error(transparent)]
    Storage(#[from] scribe_storage::StorageError),

    /// An optimistic-concurrency compare-and-swap lost a race.
    #[error("conflict updating {agent_id}: expected version {expected_version}")]
    Conflict {
        /// The agent whose project pointer was being updated.
        agent_id: String,
        /// The version the caller expected to still be current.
        expected_version: i64,
    },

    /// `session_id` does not currently hold the lease for `agent_id`.
    #[error("session lease expired for agent {agent_id}")]
    SessionLeaseExpired {
        /// The agent whose lease was checked.
        agent_id: String,
    },

    /// A reference to a session that does not exist.
    #[error("session not found: {0}")]
    SessionNotFound(String),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
