//! Storage error taxonomy.

/// Errors from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested row was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// An optimistic-concurrency compare-and-swap failed: zero rows matched
    /// the expected version.
    #[error("conflict updating {agent_id}: expected version {expected_version}")]
    Conflict {
        /// The agent whose project pointer was being updated.
        agent_id: String,
        /// The version the caller expected to still be current.
        expected_version: i64,
    },

    /// A query or connection-level failure.
    #[error("storage error: {0}")]
    Internal(String),

    /// Connecting to the embedded or networked backend failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// Serializing or deserializing a row failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A key or identifier was malformed.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
