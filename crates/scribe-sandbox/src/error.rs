//! Sandbox error taxonomy.

use std::path::PathBuf;

/// Errors raised while checking or enforcing the path sandbox.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// The path contained a NUL byte.
    #[error("path contains a NUL byte")]
    NulByte,

    /// The path contained an encoded traversal sequence (`..%2f`, `..%5c`).
    #[error("path contains an encoded traversal sequence: {0}")]
    EncodedTraversal(String),

    /// A symlink was found along the path before realpath resolution.
    #[error("path traverses a symlink: {path}")]
    Symlink {
        /// The offending path component.
        path: PathBuf,
    },

    /// The resolved path falls outside every allowed root.
    #[error("path outside sandbox: {path}")]
    OutsideSandbox {
        /// The resolved path that was rejected.
        path: PathBuf,
    },

    /// The repository's permission configuration denies this operation.
    #[error("operation `{operation}` is denied by repository permissions")]
    OperationDenied {
        /// The operation name that was denied.
        operation: String,
    },

    /// An I/O failure occurred while resolving the path.
    #[error("io error resolving path: {0}")]
    Io(String),
}

/// Result alias for sandbox operations.
pub type SandboxResult<T> = Result<T, SandboxError>;
