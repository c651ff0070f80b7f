//! File I/O error taxonomy.

use std::path::PathBuf;

/// Errors raised by locked append, atomic write, rotation, or tail read.
#[derive(Debug, thiserror::Error)]
pub enum FileIoError {
    /// An underlying I/O operation failed.
    #[error("io error on {path}: {source}")]
    Io {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The advisory lock could not be acquired within the retry budget.
    #[error("could not acquire lock on {path} after {attempts} attempts")]
    LockTimeout {
        /// The path whose lock was contended.
        path: PathBuf,
        /// How many attempts were made.
        attempts: u32,
    },

    /// A rotation's hash-chain link did not match the prior archive.
    #[error("hash chain broken rotating {path}")]
    ChainBroken {
        /// The log path being rotated.
        path: PathBuf,
    },
}

/// Result alias for file I/O operations.
pub type FileIoResult<T> = Result<T, FileIoError>;
