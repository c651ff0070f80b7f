//! Heading normalization: Setext-to-ATX conversion and hierarchical
//! numbering (`1`, `1.1`, `1.1.1`, ...).

use std::sync::LazyLock;

use regex::Regex;

static ATX_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$").expect("valid regex"));
static SETEXT_H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^=+\s*$").expect("valid regex"));
static SETEXT_H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-+\s*$").expect("valid regex"));
static EXISTING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)*\.?\s+").expect("valid regex"));
static FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(```|~~~)").expect("valid regex"));

/// Rewrite Setext-style (`===`/`---` underlined) headings as ATX
/// (`#`/`##`-prefixed) headings, skipping fenced code blocks.
#[must_use]
pub fn setext_to_atx(body: &str) -> String {
    let lines: Vec<&str> = body.lines().collect();
    let mut out = Vec::with_capacity(lines.len());
    let mut in_fence = false;
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if FENCE.is_match(line.trim_start()) {
            in_fence = !in_fence;
            out.push(line.to_string());
            i += 1;
            continue;
        }
        if !in_fence {
            if let Some(next) = lines.get(i + 1) {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    if SETEXT_H1.is_match(next) {
                        out.push(format!("# {trimmed}"));
                        i += 2;
                        continue;
                    }
                    if SETEXT_H2.is_match(next) {
                        out.push(format!("## {trimmed}"));
                        i += 2;
                        continue;
                    }
                }
            }
        }
        out.push(line.to_string());
        i += 1;
    }
    let mut result = out.join("\n");
    if body.ends_with('\n') {
        result.push('\n');
    }
    result
}

/// Apply hierarchical numbering (`1`, `1.1`, `1.1.1`, ...) to every
/// ATX heading in `body`, skipping fenced code blocks. Running this on
/// already-numbered output is idempotent: an existing leading number is
/// stripped before the new number is applied.
#[must_use]
pub fn normalize_headers(body: &str) -> String {
    let mut counters = [0u32; 6];
    let mut in_fence = false;
    let mut out = Vec::new();

    for line in body.lines() {
        if FENCE.is_match(line.trim_start()) {
            in_fence = !in_fence;
            out.push(line.to_string());
            continue;
        }
        if in_fence {
            out.push(line.to_string());
            continue;
        }
        if let Some(caps) = ATX_HEADING.captures(line) {
            let level = caps[1].len();
            let text = caps[2].trim();
            let text = EXISTING_NUMBER.replace(text, "").to_string();

            counters[level - 1] += 1;
            for counter in counters.iter_mut().skip(level) {
                *counter = 0;
            }
            let number = counters[..level]
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(".");
            let hashes = "#".repeat(level);
            out.push(format!("{hashes} {number} {text}"));
        } else {
            out.push(line.to_string());
        }
    }

    let mut result = out.join("\n");
    if body.ends_with('\n') {
        result.push('\n');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setext_headings_become_atx() {
        let body = "Title\n=====\n\nSection\n-------\n";
        let out = setext_to_atx(body);
        assert!(out.contains("# Title"));
        assert!(out.contains("## Section"));
    }

    #[test]
    fn setext_conversion_skips_fenced_code() {
        let body = "```\nfake\n----\n```\n";
        let out = setext_to_atx(body);
        assert_eq!(out, body);
    }

    #[test]
    fn normalize_headers_numbers_hierarchically() {
        let body = "# Intro\n## First\n## Second\n# Outro\n";
        let out = normalize_headers(body);
        assert!(out.contains("# 1 Intro"));
        assert!(out.contains("## 1.1 First"));
        assert!(out.contains("## 1.2 Second"));
        assert!(out.contains("# 2 Outro"));
    }

    #[test]
    fn normalize_headers_is_idempotent() {
        let body = "# Intro\n## First\n";
        let once = normalize_headers(body);
        let twice = normalize_headers(&once);
        assert_eq!(once, twice);
    }
}
