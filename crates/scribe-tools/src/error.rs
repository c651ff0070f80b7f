//! Top-level tool error taxonomy: every lower crate's error folds into
//! one of the ten wire-level kinds a tool response reports.

/// The wire-level error kind reported in a tool response's `error.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A parameter failed validation or healing.
    ParameterValidation,
    /// The sandbox rejected a path or the operation gate denied a call.
    SecurityViolation,
    /// A repository configuration permission explicitly denied the call.
    PermissionDenied,
    /// The requested project, document, or case does not exist.
    NotFound,
    /// An optimistic-concurrency check lost a race.
    Conflict,
    /// Required log/stream metadata was missing.
    MetadataMissing,
    /// A file lock could not be acquired within its retry budget.
    LockTimeout,
    /// A write succeeded but post-write verification failed.
    VerificationFailed,
    /// The calling session's lease has expired.
    SessionExpired,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// The wire string reported in a tool response.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ParameterValidation => "parameter_validation",
            Self::SecurityViolation => "security_violation",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::MetadataMissing => "metadata_missing",
            Self::LockTimeout => "lock_timeout",
            Self::VerificationFailed => "verification_failed",
            Self::SessionExpired => "session_expired",
            Self::Internal => "internal",
        }
    }
}

/// A tool-surface error, carrying both a human message and a wire kind.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// A parameter was missing, malformed, or could not be healed.
    #[error("{0}")]
    ParameterValidation(String),

    /// A tool named in sentinel mode was called outside it, or vice versa.
    #[error("{0}")]
    ModeMismatch(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A session/project-context operation failed.
    #[error(transparent)]
    Session(#[from] scribe_sessions::SessionError),

    /// The execution context layer rejected the call.
    #[error(transparent)]
    Core(#[from] scribe_core::CoreError),

    /// The sandbox/permission layer rejected the call.
    #[error(transparent)]
    Sandbox(#[from] scribe_sandbox::SandboxError),

    /// Low-level file I/O failed.
    #[error(transparent)]
    FileIo(#[from] scribe_fileio::FileIoError),

    /// The storage layer reported a failure.
    #[error(transparent)]
    Storage(#[from] scribe_storage::StorageError),

    /// The logging pipeline rejected or failed to append an entry.
    #[error(transparent)]
    Logging(#[from] scribe_logging::LoggingError),

    /// The document-mutation engine reported a failure.
    #[error(transparent)]
    Doc(#[from] scribe_docs::DocError),

    /// The reminder engine reported a failure.
    #[error(transparent)]
    Reminder(#[from] scribe_reminders::ReminderError),

    /// Repository configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] scribe_config::ConfigError),
}

impl ToolError {
    /// Map this error to its wire-level kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ParameterValidation(_) | Self::ModeMismatch(_) => ErrorKind::ParameterValidation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Session(scribe_sessions::SessionError::SessionLeaseExpired { .. }) => {
                ErrorKind::SessionExpired
            },
            Self::Session(
                scribe_sessions::SessionError::Conflict { .. }
                | scribe_sessions::SessionError::SessionNotFound(_),
            ) => ErrorKind::Conflict,
            Self::Session(scribe_sessions::SessionError::Storage(_)) => ErrorKind::Internal,
            Self::Core(_) => ErrorKind::ParameterValidation,
            Self::Sandbox(scribe_sandbox::SandboxError::OperationDenied { .. }) => {
                ErrorKind::PermissionDenied
            },
            Self::Sandbox(_) => ErrorKind::SecurityViolation,
            Self::FileIo(scribe_fileio::FileIoError::LockTimeout { .. }) => ErrorKind::LockTimeout,
            Self::FileIo(_) => ErrorKind::Internal,
            Self::Storage(scribe_storage::StorageError::Conflict { .. }) => ErrorKind::Conflict,
            Self::Storage(scribe_storage::StorageError::NotFound(_)) => ErrorKind::NotFound,
            Self::Storage(_) => ErrorKind::Internal,
            Self::Logging(scribe_logging::LoggingError::EmptyMessage) => {
                ErrorKind::ParameterValidation
            },
            Self::Logging(scribe_logging::LoggingError::UnknownStream(_)) => {
                ErrorKind::ParameterValidation
            },
            Self::Logging(scribe_logging::LoggingError::MissingMetadata { .. }) => {
                ErrorKind::MetadataMissing
            },
            Self::Logging(scribe_logging::LoggingError::Sandbox(_)) => {
                ErrorKind::SecurityViolation
            },
            Self::Logging(_) => ErrorKind::Internal,
            Self::Doc(scribe_docs::DocError::VerificationFailed { .. }) => {
                ErrorKind::VerificationFailed
            },
            Self::Doc(
                scribe_docs::DocError::SectionNotFound(_)
                | scribe_docs::DocError::UnknownDocument(_),
            ) => ErrorKind::NotFound,
            Self::Doc(
                scribe_docs::DocError::StructuredEditAnchorNotFound { .. }
                | scribe_docs::DocError::StructuredEditAnchorAmbiguous { .. }
                | scribe_docs::DocError::RangeOutOfBounds { .. }
                | scribe_docs::DocError::PatchHunkMismatch { .. }
                | scribe_docs::DocError::CreateDocMissingContent
                | scribe_docs::DocError::FrontmatterParse(_),
            ) => ErrorKind::ParameterValidation,
            Self::Doc(scribe_docs::DocError::Sandbox(_)) => ErrorKind::SecurityViolation,
            Self::Doc(_) => ErrorKind::Internal,
            Self::Reminder(_) => ErrorKind::Internal,
            Self::Config(_) => ErrorKind::Internal,
        }
    }
}

/// Result alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_validation_maps_to_its_own_kind() {
        let err = ToolError::ParameterValidation("bad shape".to_string());
        assert_eq!(err.kind(), ErrorKind::ParameterValidation);
    }

    #[test]
    fn not_found_maps_correctly() {
        let err = ToolError::NotFound("demo".to_string());
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn sandbox_operation_denied_maps_to_permission_denied() {
        let err = ToolError::Sandbox(scribe_sandbox::SandboxError::OperationDenied {
            operation: "allow_rotate".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }
}
