//! Unified diff generation and patch application for document content.

use similar::{ChangeTag, TextDiff};

use crate::error::DocError;

/// Generate a unified diff between `before` and `after`, with `path`
/// used as the label in the `---`/`+++` header lines.
#[must_use]
pub fn unified_diff(path: &str, before: &str, after: &str) -> String {
    TextDiff::from_lines(before, after)
        .unified_diff()
        .context_radius(3)
        .header(path, path)
        .to_string()
}

/// A compact summary of a diff's shape, used for preview metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    /// Lines present only in `after`.
    pub insertions: usize,
    /// Lines present only in `before`.
    pub deletions: usize,
}

/// Count inserted/deleted lines between `before` and `after`.
#[must_use]
pub fn diff_stats(before: &str, after: &str) -> DiffStats {
    let diff = TextDiff::from_lines(before, after);
    let mut stats = DiffStats::default();
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => stats.insertions += 1,
            ChangeTag::Delete => stats.deletions += 1,
            ChangeTag::Equal => {},
        }
    }
    stats
}

/// Apply a unified diff patch to `original`, returning the patched text.
///
/// # Errors
///
/// Returns [`DocError::PatchHunkMismatch`] if a hunk's context could not
/// be located in `original`. `diffy` does not report which hunk failed,
/// so the hunk index is always reported as `0` when parsing or
/// application fails wholesale.
pub fn apply_patch(original: &str, unified: &str) -> Result<String, DocError> {
    let patch = diffy::Patch::from_str(unified)
        .map_err(|_| DocError::PatchHunkMismatch { hunk: 0 })?;
    diffy::apply(original, &patch).map_err(|_| DocError::PatchHunkMismatch { hunk: 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unified_diff_contains_path_header() {
        let out = unified_diff("notes.md", "a\nb\n", "a\nc\n");
        assert!(out.contains("notes.md"));
        assert!(out.contains("-b"));
        assert!(out.contains("+c"));
    }

    #[test]
    fn diff_stats_counts_changes() {
        let stats = diff_stats("a\nb\nc\n", "a\nc\nd\n");
        assert_eq!(stats.deletions, 1);
        assert_eq!(stats.insertions, 1);
    }

    #[test]
    fn apply_patch_round_trips() {
        let before = "line one\nline two\nline three\n";
        let after = "line one\nline TWO\nline three\n";
        let patch = unified_diff("doc.md", before, after);
        let applied = apply_patch(before, &patch).unwrap();
        assert_eq!(applied, after);
    }

    #[test]
    fn apply_patch_rejects_garbage() {
        let result = apply_patch("hello\n", "not a patch at all");
        assert!(matches!(result, Err(DocError::PatchHunkMismatch { hunk: 0 })));
    }
}
