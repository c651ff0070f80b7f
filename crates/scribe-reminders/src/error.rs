//! Reminder-engine error taxonomy.

/// Errors raised while selecting or persisting reminders.
#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    /// The underlying storage layer reported a failure.
    #[error(transparent)]
    Storage(#[from] scribe_storage::StorageError),

    /// Writing the cooldown cache file failed.
    #[error(transparent)]
    FileIo(#[from] scribe_fileio::FileIoError),

    /// The persisted cooldown cache did not parse as valid JSON.
    #[error("cooldown cache parse error: {0}")]
    CacheParse(String),
}

/// Result type for reminder-engine operations.
pub type ReminderResult<T> = Result<T, ReminderError>;
