//! Extraction of markdown checklist items (`- [ ]` / `- [x]`).

use std::sync::LazyLock;

use regex::Regex;

static CHECKLIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)[-*]\s+\[([ xX])\]\s+(.*)$").expect("valid regex"));

/// A single checklist item with its 1-indexed position in the full
/// document (front-matter lines included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    /// Line number within the full document, 1-indexed.
    pub line: usize,
    /// Whether the box is checked.
    pub checked: bool,
    /// Item text with the checkbox marker stripped.
    pub text: String,
    /// Indentation depth in spaces, for nested checklists.
    pub indent: usize,
}

/// Scan `body` for checklist items. `frontmatter_line_count` is the
/// number of lines the front-matter block occupied in the original
/// document (`0` if there was none), so that reported line numbers
/// refer to the full document rather than just the body.
#[must_use]
pub fn list_checklist_items(body: &str, frontmatter_line_count: usize) -> Vec<ChecklistItem> {
    body.lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            CHECKLIST_ITEM.captures(line).map(|caps| ChecklistItem {
                line: frontmatter_line_count + idx + 1,
                checked: caps[2].eq_ignore_ascii_case("x"),
                text: caps[3].trim().to_string(),
                indent: caps[1].len(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_checked_and_unchecked_items() {
        let body = "- [ ] todo one\n- [x] done one\n  - [ ] nested\n";
        let items = list_checklist_items(body, 0);
        assert_eq!(items.len(), 3);
        assert!(!items[0].checked);
        assert!(items[1].checked);
        assert_eq!(items[2].indent, 2);
    }

    #[test]
    fn line_numbers_account_for_frontmatter_offset() {
        let body = "# Title\n- [ ] item\n";
        let items = list_checklist_items(body, 4);
        assert_eq!(items[0].line, 6);
    }

    #[test]
    fn ignores_non_checklist_bullets() {
        let body = "- plain bullet\n- [ ] real item\n";
        let items = list_checklist_items(body, 0);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "real item");
    }
}
