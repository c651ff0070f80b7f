//! Bounded backward scan for reading the last N lines of a log file
//! without reading the whole file into memory.

use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{FileIoError, FileIoResult};

const CHUNK_SIZE: u64 = 64 * 1024;

/// Read the last `limit` lines of `path`, in original (oldest-first) order.
///
/// Appends are whole-line, fsync'd writes (see [`crate::lock::locked_append`]),
/// so no file lock is needed to read a consistent set of complete lines.
///
/// # Errors
///
/// Returns [`FileIoError::Io`] on any filesystem failure. A missing file
/// is not an error; it yields an empty vector.
pub async fn tail_read(path: &Path, limit: usize) -> FileIoResult<Vec<String>> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || tail_read_blocking(&path, limit))
        .await
        .map_err(|e| FileIoError::Io {
            path: PathBuf::new(),
            source: std::io::Error::other(e),
        })?
}

fn tail_read_blocking(path: &Path, limit: usize) -> FileIoResult<Vec<String>> {
    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(FileIoError::Io {
                path: path.to_path_buf(),
                source,
            });
        },
    };
    let file_len = file
        .metadata()
        .map_err(|source| FileIoError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len();

    let mut collected: Vec<String> = Vec::new();
    let mut cursor = file_len;
    let mut carry: Vec<u8> = Vec::new();

    while cursor > 0 && collected.len() <= limit {
        let read_size = CHUNK_SIZE.min(cursor);
        cursor -= read_size;
        file.seek(SeekFrom::Start(cursor))
            .map_err(|source| FileIoError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let mut buf = vec![0u8; read_size as usize];
        file.read_exact(&mut buf).map_err(|source| FileIoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        buf.extend_from_slice(&carry);
        carry.clear();

        let text = String::from_utf8_lossy(&buf);
        let mut lines: Vec<&str> = text.split('\n').collect();
        if cursor > 0 {
            // The first "line" in this chunk may be a partial line that
            // continues into the previous (earlier) chunk; carry it over.
            if let Some(partial) = lines.first() {
                carry = partial.as_bytes().to_vec();
            }
            lines.remove(0);
        }
        for line in lines.into_iter().rev() {
            if !line.is_empty() {
                collected.push(line.to_string());
            }
        }
    }

    collected.reverse();
    if collected.len() > limit {
        let skip = collected.len() - limit;
        collected.drain(0..skip);
    }
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_empty_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.log");
        let lines = tail_read(&path, 10).await.unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn returns_last_n_lines_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.md");
        let body: String = (0..10).map(|i| format!("line {i}\n")).collect();
        std::fs::write(&path, body).unwrap();
        let lines = tail_read(&path, 3).await.unwrap();
        assert_eq!(lines, vec!["line 7", "line 8", "line 9"]);
    }

    #[tokio::test]
    async fn handles_limit_larger_than_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.md");
        std::fs::write(&path, "only one\n").unwrap();
        let lines = tail_read(&path, 50).await.unwrap();
        assert_eq!(lines, vec!["only one"]);
    }
}
