//! Logging-core error taxonomy.

/// Errors from composing, validating, or appending a log entry.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The message was empty after trimming.
    #[error("message must not be empty")]
    EmptyMessage,

    /// A log stream's required metadata keys were not all present.
    #[error("missing metadata for stream {stream}: {missing:?}")]
    MissingMetadata {
        /// Stream name (e.g. `"bugs"`).
        stream: String,
        /// The keys that were required but absent.
        missing: Vec<String>,
    },

    /// The target stream name is not one of the known standard streams.
    #[error("unknown log stream: {0}")]
    UnknownStream(String),

    /// Underlying file I/O failed.
    #[error(transparent)]
    FileIo(#[from] scribe_fileio::FileIoError),

    /// The storage layer reported a failure.
    #[error(transparent)]
    Storage(#[from] scribe_storage::StorageError),

    /// The sandbox rejected the resolved auxiliary-stream path.
    #[error(transparent)]
    Sandbox(#[from] scribe_sandbox::SandboxError),
}

/// Result type for logging operations.
pub type LoggingResult<T> = Result<T, LoggingError>;
