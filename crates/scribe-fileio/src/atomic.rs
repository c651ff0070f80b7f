//! Atomic writes via temp file + fsync + rename, with cleanup of
//! abandoned temp files left behind by a crashed writer.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::{FileIoError, FileIoResult};

const STALE_TEMP_AGE: Duration = Duration::from_secs(5 * 60);

/// Write `contents` to `path` atomically: write to a sibling `.tmp-*` file,
/// fsync it, then rename over the destination.
///
/// # Errors
///
/// Returns [`FileIoError::Io`] if any step fails.
pub async fn atomic_write(path: &Path, contents: &[u8]) -> FileIoResult<()> {
    let path = path.to_path_buf();
    let contents = contents.to_vec();
    tokio::task::spawn_blocking(move || atomic_write_blocking(&path, &contents))
        .await
        .map_err(|e| FileIoError::Io {
            path: PathBuf::new(),
            source: std::io::Error::other(e),
        })?
}

fn atomic_write_blocking(path: &Path, contents: &[u8]) -> FileIoResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|source| FileIoError::Io {
        path: parent.to_path_buf(),
        source,
    })?;
    let temp_path = temp_path_for(path);
    {
        let mut file = std::fs::File::create(&temp_path).map_err(|source| FileIoError::Io {
            path: temp_path.clone(),
            source,
        })?;
        use std::io::Write;
        file.write_all(contents).map_err(|source| FileIoError::Io {
            path: temp_path.clone(),
            source,
        })?;
        file.sync_all().map_err(|source| FileIoError::Io {
            path: temp_path.clone(),
            source,
        })?;
    }
    std::fs::rename(&temp_path, path).map_err(|source| FileIoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state".to_string());
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.tmp-{pid}-{nanos}"))
}

/// Remove leftover `.{name}.tmp-*` files older than five minutes in `dir`.
///
/// Called opportunistically before a write; a crashed process can leave
/// temp files behind and this keeps them from accumulating.
///
/// # Errors
///
/// Returns [`FileIoError::Io`] if the directory cannot be read.
pub fn cleanup_stale_temp_files(dir: &Path) -> FileIoResult<usize> {
    let mut removed = 0;
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(source) => {
            return Err(FileIoError::Io {
                path: dir.to_path_buf(),
                source,
            });
        },
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with('.') || !name.contains(".tmp-") {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        let Ok(age) = SystemTime::now().duration_since(modified) else {
            continue;
        };
        if age > STALE_TEMP_AGE && std::fs::remove_file(entry.path()).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn atomic_write_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        atomic_write(&path, b"{\"version\":1}").await.unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "{\"version\":1}");
    }

    #[tokio::test]
    async fn atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        atomic_write(&path, b"data").await.unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn cleanup_ignores_fresh_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join(".state.json.tmp-123-456");
        std::fs::write(&temp, b"x").unwrap();
        let removed = cleanup_stale_temp_files(dir.path()).unwrap();
        assert_eq!(removed, 0);
        assert!(temp.exists());
    }
}
