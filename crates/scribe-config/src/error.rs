//! Repository-configuration error taxonomy.

use std::path::PathBuf;

/// Errors from repository discovery or configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No repository root marker was found walking up from the start path.
    #[error("could not find a repository root starting from {start}")]
    RepoRootNotFound {
        /// The path discovery started from.
        start: PathBuf,
    },

    /// A config file existed but failed to parse; discovery continues to
    /// the next candidate path rather than failing outright.
    #[error("failed to parse config at {path}: {source}")]
    ParseFailed {
        /// The config file that failed to parse.
        path: PathBuf,
        /// Underlying parse error message.
        source: String,
    },

    /// Writing the default config file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
