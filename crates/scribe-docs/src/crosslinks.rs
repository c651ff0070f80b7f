//! Validation of `related_docs` front-matter entries, each formatted as
//! `PATH#anchor` (the anchor suffix is optional).

use std::path::Path;

use crate::toc::{scan_headings, slugify};

/// Result of validating a single `related_docs` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrosslinkCheck {
    /// The raw `related_docs` entry as written.
    pub entry: String,
    /// The path portion, resolved relative to the document root.
    pub path: String,
    /// The anchor portion, if the entry had a `#anchor` suffix.
    pub anchor: Option<String>,
    /// Whether the target file exists.
    pub path_exists: bool,
    /// Whether the anchor resolves to a heading in the target file.
    /// `None` if no anchor was requested, or the target file could
    /// not be read.
    pub anchor_exists: Option<bool>,
}

impl CrosslinkCheck {
    /// Whether this entry is fully valid: the path exists, and the
    /// anchor (if any) resolves.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.path_exists && self.anchor_exists != Some(false)
    }
}

/// Validate `entries` (raw `related_docs` values) against `docs_root`.
#[must_use]
pub fn validate_crosslinks(docs_root: &Path, entries: &[String]) -> Vec<CrosslinkCheck> {
    entries
        .iter()
        .map(|entry| validate_one(docs_root, entry))
        .collect()
}

fn validate_one(docs_root: &Path, entry: &str) -> CrosslinkCheck {
    let (path_part, anchor) = match entry.split_once('#') {
        Some((p, a)) => (p, Some(a.to_string())),
        None => (entry, None),
    };
    let target = docs_root.join(path_part);
    let path_exists = target.is_file();

    let anchor_exists = anchor.as_ref().map(|wanted| {
        if !path_exists {
            return false;
        }
        let Ok(content) = std::fs::read_to_string(&target) else {
            return false;
        };
        scan_headings(&content)
            .iter()
            .any(|h| &h.slug == wanted || slugify(&h.text) == *wanted)
    });

    CrosslinkCheck {
        entry: entry.to_string(),
        path: path_part.to_string(),
        anchor,
        path_exists,
        anchor_exists,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let checks = validate_crosslinks(dir.path(), &["missing.md".to_string()]);
        assert!(!checks[0].is_valid());
    }

    #[test]
    fn existing_file_without_anchor_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "# Hello\n").unwrap();
        let checks = validate_crosslinks(dir.path(), &["a.md".to_string()]);
        assert!(checks[0].is_valid());
        assert_eq!(checks[0].anchor_exists, None);
    }

    #[test]
    fn anchor_must_resolve_to_a_heading() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "# Hello World\n").unwrap();
        let ok = validate_crosslinks(dir.path(), &["a.md#hello-world".to_string()]);
        assert!(ok[0].is_valid());

        let bad = validate_crosslinks(dir.path(), &["a.md#nonexistent".to_string()]);
        assert!(!bad[0].is_valid());
    }
}
