//! `rotate_log` — archive the live progress log, chaining the archive
//! to its predecessor by content hash.

use std::path::{Path, PathBuf};

use scribe_fileio::rotate::{rotate, RotationOutcome};
use scribe_reminders::engine::ReminderCandidate;
use scribe_sandbox::Operation;
use serde::Serialize;

use crate::healing::HealingNote;
use crate::router::ToolContext;
use crate::ToolResult;

/// Response payload for `rotate_log`.
#[derive(Debug, Serialize)]
pub struct RotateLogResult {
    /// Path the live log was archived to.
    pub archive_path: PathBuf,
    /// SHA-256 hex hash of the archived content.
    pub content_hash: String,
    /// Hash of the previous archive, if this was not the first rotation.
    pub previous_hash: Option<String>,
}

impl From<RotationOutcome> for RotateLogResult {
    fn from(outcome: RotationOutcome) -> Self {
        Self {
            archive_path: outcome.archive_path,
            content_hash: outcome.content_hash,
            previous_hash: outcome.previous_hash,
        }
    }
}

/// Rotate `log_path` into `archive_dir`.
///
/// # Errors
///
/// Returns [`crate::ToolError::PermissionDenied`] if `allow_rotate` is
/// `false` for this repository, or a mapped file-I/O error if the
/// rotation itself fails.
pub async fn run(
    ctx: &ToolContext,
    log_path: &Path,
    archive_dir: &Path,
    timestamp: &str,
) -> ToolResult<(RotateLogResult, Vec<HealingNote>, Vec<ReminderCandidate>)> {
    ctx.permissions.check(Operation::Rotate)?;
    let outcome = rotate(log_path, archive_dir, timestamp).await?;
    Ok((outcome.into(), Vec::new(), Vec::new()))
}
