//! Mapping from [`scribe_tools::ToolError`] to the MCP wire error shape.

use rmcp::ErrorData;
use scribe_tools::{ErrorKind, ToolError};

/// Render a tool-surface error as an MCP `ErrorData`, preserving the
/// wire-level kind in `data` for clients that want to branch on it.
pub(crate) fn to_error_data(err: &ToolError) -> ErrorData {
    let kind = err.kind();
    let data = Some(serde_json::json!({ "kind": kind.as_str() }));
    let message = err.to_string();
    match kind {
        ErrorKind::ParameterValidation
        | ErrorKind::MetadataMissing
        | ErrorKind::NotFound
        | ErrorKind::SecurityViolation
        | ErrorKind::PermissionDenied => ErrorData::invalid_params(message, data),
        ErrorKind::Conflict
        | ErrorKind::LockTimeout
        | ErrorKind::VerificationFailed
        | ErrorKind::SessionExpired
        | ErrorKind::Internal => ErrorData::internal_error(message, data),
    }
}
