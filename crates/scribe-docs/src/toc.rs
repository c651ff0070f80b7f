//! Table-of-contents generation: heading scan (skipping fenced code),
//! slug generation, and idempotent TOC block replacement.

use std::collections::HashMap;

use regex::Regex;
use std::sync::LazyLock;

const TOC_START: &str = "<!-- TOC:start -->";
const TOC_END: &str = "<!-- TOC:end -->";

static ATX_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$").expect("valid regex"));
static FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(```|~~~)").expect("valid regex"));

/// A single heading extracted from a document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading level, 1-6.
    pub level: u8,
    /// Heading text, with any trailing closing `#` stripped.
    pub text: String,
    /// Generated anchor slug.
    pub slug: String,
}

/// Whether `line` opens or closes a fenced code block (` ``` ` or `~~~`).
#[must_use]
pub fn is_fence_marker(line: &str) -> bool {
    FENCE.is_match(line.trim_start())
}

/// Scan `body` for ATX headings, skipping the contents of fenced code
/// blocks. Setext-style (`===`/`---` underline) headings are not
/// produced here; use [`crate::headers`] to normalize those to ATX
/// first.
#[must_use]
pub fn scan_headings(body: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut in_fence = false;
    let mut seen: HashMap<String, usize> = HashMap::new();

    for line in body.lines() {
        if is_fence_marker(line) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(caps) = ATX_HEADING.captures(line) {
            let level = caps[1].len() as u8;
            let text = caps[2].trim().to_string();
            let slug = unique_slug(&text, &mut seen);
            headings.push(Heading { level, text, slug });
        }
    }
    headings
}

/// Generate a GitHub-style anchor slug: lowercase, strip non
/// alphanumeric/hyphen/space/underscore characters (which drops emoji
/// and punctuation), collapse whitespace to single hyphens.
#[must_use]
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect();
    let collapsed = stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    collapsed
}

fn unique_slug(text: &str, seen: &mut HashMap<String, usize>) -> String {
    let base = slugify(text);
    let count = seen.entry(base.clone()).or_insert(0);
    let slug = if *count == 0 {
        base.clone()
    } else {
        format!("{base}-{count}")
    };
    *count += 1;
    slug
}

/// Render a markdown bullet list TOC from the given headings, indented
/// two spaces per level below the shallowest heading present.
#[must_use]
pub fn render_toc(headings: &[Heading]) -> String {
    let Some(min_level) = headings.iter().map(|h| h.level).min() else {
        return String::new();
    };
    let mut out = String::new();
    for heading in headings {
        let indent = "  ".repeat((heading.level - min_level) as usize);
        out.push_str(&format!(
            "{indent}- [{}](#{})\n",
            heading.text, heading.slug
        ));
    }
    out
}

/// Insert or replace the TOC block delimited by `<!-- TOC:start -->`
/// and `<!-- TOC:end -->` markers. If no markers are present, the
/// block is inserted immediately after the first top-level heading (or
/// at the top of the document if there is none). Running this twice in
/// a row on its own output is a no-op.
#[must_use]
pub fn generate_toc(body: &str) -> String {
    let headings = scan_headings(body);
    let toc_body = render_toc(&headings);
    let block = format!("{TOC_START}\n{toc_body}{TOC_END}");

    if let (Some(start), Some(end)) = (body.find(TOC_START), body.find(TOC_END)) {
        let end_of_marker = end + TOC_END.len();
        return format!("{}{}{}", &body[..start], block, &body[end_of_marker..]);
    }

    match body.lines().position(|l| l.starts_with('#')) {
        Some(idx) => {
            let lines: Vec<&str> = body.lines().collect();
            let mut out = lines[..=idx].join("\n");
            out.push_str("\n\n");
            out.push_str(&block);
            out.push('\n');
            if idx + 1 < lines.len() {
                out.push('\n');
                out.push_str(&lines[idx + 1..].join("\n"));
            }
            out
        },
        None => format!("{block}\n\n{body}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_headings_skips_fenced_code() {
        let body = "# Title\n```\n# not a heading\n```\n## Real\n";
        let headings = scan_headings(body);
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[1].text, "Real");
    }

    #[test]
    fn slugify_strips_emoji_and_collapses_spaces() {
        assert_eq!(slugify("Setup  Guide 🚀"), "setup-guide");
    }

    #[test]
    fn duplicate_headings_get_collision_suffixes() {
        let body = "# Intro\n# Intro\n";
        let headings = scan_headings(body);
        assert_eq!(headings[0].slug, "intro");
        assert_eq!(headings[1].slug, "intro-1");
    }

    #[test]
    fn generate_toc_is_idempotent() {
        let body = "# Title\n\nSome text.\n\n## Section\n";
        let first = generate_toc(body);
        let second = generate_toc(&first);
        assert_eq!(first, second);
    }

    #[test]
    fn generate_toc_inserts_after_first_heading_when_absent() {
        let body = "# Title\n\nbody\n";
        let out = generate_toc(body);
        assert!(out.contains(TOC_START));
        assert!(out.find(TOC_START).unwrap() > out.find("# Title").unwrap());
    }
}
