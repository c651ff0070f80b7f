//! Advisory-locked, fsync'd line append.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fs2::FileExt;

use crate::error::{FileIoError, FileIoResult};

const MAX_LOCK_ATTEMPTS: u32 = 50;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(20);

/// Append `line` (without a trailing newline; one is added) to `path`,
/// creating the file if necessary, under an exclusive advisory lock, with
/// an fsync before the lock is released.
///
/// Runs on a blocking thread since `fs2`'s locking API is synchronous.
///
/// # Errors
///
/// Returns [`FileIoError::LockTimeout`] if the lock is still held by
/// another process after the retry budget is exhausted, or
/// [`FileIoError::Io`] for any other I/O failure.
pub async fn locked_append(path: &Path, line: &str) -> FileIoResult<()> {
    let path = path.to_path_buf();
    let line = line.to_string();
    tokio::task::spawn_blocking(move || locked_append_blocking(&path, &line))
        .await
        .map_err(|e| FileIoError::Io {
            path: PathBuf::new(),
            source: std::io::Error::other(e),
        })?
}

fn locked_append_blocking(path: &Path, line: &str) -> FileIoResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| FileIoError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| FileIoError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let mut attempts = 0;
    loop {
        match file.try_lock_exclusive() {
            Ok(()) => break,
            Err(_) if attempts < MAX_LOCK_ATTEMPTS => {
                attempts += 1;
                std::thread::sleep(LOCK_RETRY_DELAY);
            },
            Err(_) => {
                return Err(FileIoError::LockTimeout {
                    path: path.to_path_buf(),
                    attempts,
                });
            },
        }
    }

    let result = (|| {
        writeln!(file, "{line}").map_err(|source| FileIoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        file.sync_all().map_err(|source| FileIoError::Io {
            path: path.to_path_buf(),
            source,
        })
    })();

    let _ = FileExt::unlock(&file);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_lines_with_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.md");
        locked_append(&path, "line one").await.unwrap();
        locked_append(&path, "line two").await.unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "line one\nline two\n");
    }

    #[tokio::test]
    async fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/log.md");
        locked_append(&path, "hello").await.unwrap();
        assert!(path.exists());
    }
}
