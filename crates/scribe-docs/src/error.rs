//! Document-mutation-engine error taxonomy.

use std::path::PathBuf;

/// Errors from a document-mutation operation.
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    /// The sandbox refused the target path.
    #[error(transparent)]
    Sandbox(#[from] scribe_sandbox::SandboxError),

    /// Underlying file I/O failed.
    #[error(transparent)]
    FileIo(#[from] scribe_fileio::FileIoError),

    /// The storage layer reported a failure.
    #[error(transparent)]
    Storage(#[from] scribe_storage::StorageError),

    /// YAML front-matter failed to parse.
    #[error("frontmatter parse error: {0}")]
    FrontmatterParse(String),

    /// `create_doc` was called with neither a template nor a body.
    #[error("create_doc requires either a template or explicit body content")]
    CreateDocMissingContent,

    /// `replace_section` could not find `<!-- ID: section_id -->`.
    #[error("section not found: {0}")]
    SectionNotFound(String),

    /// A structured `replace_block` anchor matched no body line.
    #[error("structured edit anchor not found: {anchor}")]
    StructuredEditAnchorNotFound {
        /// The anchor text that was searched for.
        anchor: String,
    },

    /// A structured `replace_block` anchor matched more than one body
    /// line.
    #[error("structured edit anchor ambiguous: {anchor} matches lines {matches:?}")]
    StructuredEditAnchorAmbiguous {
        /// The anchor text that was searched for.
        anchor: String,
        /// 1-indexed line numbers of every match.
        matches: Vec<usize>,
    },

    /// `apply_patch(unified)` could not locate a hunk's context in the
    /// target content.
    #[error("patch hunk mismatch: hunk {hunk} did not apply")]
    PatchHunkMismatch {
        /// 1-indexed hunk number that failed to apply.
        hunk: usize,
    },

    /// A 1-indexed line range was out of bounds for the document body.
    #[error("line range out of bounds: {start}-{end} (body has {body_len} lines)")]
    RangeOutOfBounds {
        /// Requested start line.
        start: usize,
        /// Requested end line.
        end: usize,
        /// Number of lines in the body.
        body_len: usize,
    },

    /// Post-write verification found the re-read content's hash did not
    /// match the intended content's hash; the prior content was restored.
    #[error("verification failed for {path}: content was restored")]
    VerificationFailed {
        /// The file that failed verification.
        path: PathBuf,
    },

    /// A document name is not one of the recognized well-known names.
    #[error("unknown document: {0}")]
    UnknownDocument(String),
}

/// Result type for document operations.
pub type DocResult<T> = Result<T, DocError>;
