//! The canonical progress-log line: composed and parsed by the same
//! grammar, so a round trip through [`compose`] then [`parse`] is lossless
//! for every field except insignificant whitespace.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::LoggingError;

static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[(?P<emoji>.+?)\]\s+\[(?P<timestamp>.+?)\]\s+\[Agent:\s*(?P<agent>.+?)\]\s+\[Project:\s*(?P<project>.+?)\](?:\s+\[ID:\s*(?P<id>[0-9a-f]+)\])?\s+(?P<message>.*?)(?:\s+\|\s+(?P<meta>.+))?$",
    )
    .expect("log line pattern is valid")
});

/// The format string for the `<YYYY-MM-DD HH:MM:SS UTC>` timestamp segment.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// A successfully parsed canonical log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Emoji segment, verbatim.
    pub emoji: String,
    /// Timestamp segment, verbatim (not yet parsed into a `DateTime`).
    pub timestamp: String,
    /// Agent segment.
    pub agent: String,
    /// Project segment.
    pub project: String,
    /// Optional deterministic entry ID, when present in the line.
    pub entry_id: Option<String>,
    /// The message body.
    pub message: String,
    /// Parsed metadata pairs, in the order they appeared.
    pub meta: Vec<(String, String)>,
}

/// Render `ts` in the canonical on-disk timestamp format.
#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Sanitize a message for embedding in a single log line: trims, collapses
/// embedded newlines to spaces, and replaces pipe characters (which would
/// otherwise be mistaken for the metadata delimiter) with spaces.
///
/// # Errors
///
/// Returns [`LoggingError::EmptyMessage`] if the sanitized message is empty.
pub fn sanitize_message(raw: &str) -> Result<String, LoggingError> {
    let sanitized = raw
        .replace(['\n', '\r'], " ")
        .replace('|', " ")
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(LoggingError::EmptyMessage);
    }
    Ok(sanitized)
}

/// Sanitize a metadata value: trims, collapses newlines to spaces,
/// replaces `|` and `;` (which would corrupt the metadata suffix grammar)
/// with `_`.
#[must_use]
pub fn sanitize_meta_value(raw: &str) -> String {
    raw.replace(['\n', '\r'], " ")
        .replace(['|', ';'], "_")
        .trim()
        .to_string()
}

/// Render the metadata suffix (`k1=v1; k2=v2`), with keys sorted
/// alphabetically — matching the deterministic-ID composition and giving
/// the on-disk line a stable rendering independent of caller insertion
/// order.
#[must_use]
pub fn render_meta_suffix(meta: &BTreeMap<String, String>) -> Option<String> {
    if meta.is_empty() {
        return None;
    }
    Some(
        meta.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// Compose the full canonical line for one entry.
#[must_use]
pub fn compose(
    emoji: &str,
    ts: DateTime<Utc>,
    agent: &str,
    project: &str,
    entry_id: Option<&str>,
    message: &str,
    meta: &BTreeMap<String, String>,
) -> String {
    let mut line = format!(
        "[{emoji}] [{}] [Agent: {agent}] [Project: {project}]",
        format_timestamp(ts)
    );
    if let Some(id) = entry_id {
        line.push_str(&format!(" [ID: {id}]"));
    }
    line.push(' ');
    line.push_str(message);
    if let Some(suffix) = render_meta_suffix(meta) {
        line.push_str(" | ");
        line.push_str(&suffix);
    }
    line
}

/// Parse a canonical log line, or `None` if it does not match the
/// grammar at all. Unparseable lines are reported to the caller rather
/// than raising — callers that tail a log for display skip them.
#[must_use]
pub fn parse(line: &str) -> Option<ParsedLine> {
    let captures = LINE_PATTERN.captures(line.trim())?;
    let meta_text = captures.name("meta").map(|m| m.as_str());
    let mut meta = Vec::new();
    if let Some(meta_text) = meta_text {
        for chunk in meta_text.split(';') {
            let piece = chunk.trim();
            if piece.is_empty() {
                continue;
            }
            match piece.split_once('=') {
                Some((key, value)) => meta.push((key.trim().to_string(), value.trim().to_string())),
                None => meta.push((piece.to_string(), String::new())),
            }
        }
    }
    Some(ParsedLine {
        emoji: captures.name("emoji")?.as_str().to_string(),
        timestamp: captures.name("timestamp")?.as_str().to_string(),
        agent: captures.name("agent")?.as_str().to_string(),
        project: captures.name("project")?.as_str().to_string(),
        entry_id: captures.name("id").map(|m| m.as_str().to_string()),
        message: captures.name("message")?.as_str().to_string(),
        meta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 17, 2, 38, 42).unwrap()
    }

    #[test]
    fn compose_then_parse_roundtrips() {
        let mut meta = BTreeMap::new();
        meta.insert("foo".to_string(), "bar".to_string());
        let line = compose(
            "ℹ️",
            sample_ts(),
            "Codex",
            "demo",
            Some("abc123"),
            "Smoke test",
            &meta,
        );
        let parsed = parse(&line).expect("line should parse");
        assert_eq!(parsed.emoji, "ℹ️");
        assert_eq!(parsed.agent, "Codex");
        assert_eq!(parsed.project, "demo");
        assert_eq!(parsed.entry_id.as_deref(), Some("abc123"));
        assert_eq!(parsed.message, "Smoke test");
        assert_eq!(parsed.meta, vec![("foo".to_string(), "bar".to_string())]);
    }

    #[test]
    fn compose_without_id_or_meta_parses_cleanly() {
        let meta = BTreeMap::new();
        let line = compose("✅", sample_ts(), "Codex", "demo", None, "Done", &meta);
        let parsed = parse(&line).expect("line should parse");
        assert!(parsed.entry_id.is_none());
        assert!(parsed.meta.is_empty());
    }

    #[test]
    fn unparseable_line_returns_none() {
        assert!(parse("not a log line at all").is_none());
    }

    #[test]
    fn sanitize_message_rejects_blank() {
        assert!(matches!(
            sanitize_message("   \n  "),
            Err(LoggingError::EmptyMessage)
        ));
    }

    #[test]
    fn sanitize_message_strips_pipes_and_newlines() {
        let sanitized = sanitize_message("line one\nline two | extra").unwrap();
        assert!(!sanitized.contains('\n'));
        assert!(!sanitized.contains('|'));
    }

    #[test]
    fn bare_metadata_key_gets_empty_value() {
        let parsed = parse("[ℹ️] [2025-01-01 00:00:00 UTC] [Agent: a] [Project: p] hi | flag").unwrap();
        assert_eq!(parsed.meta, vec![("flag".to_string(), String::new())]);
    }
}
