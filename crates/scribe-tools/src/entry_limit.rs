//! Response-size limiting: a per-mode cap on how many log entries are
//! returned, applied after priority filtering and newest-first sort.

use scribe_storage::models::{LogEntry, Priority};

/// Retrieval shape a caller asked for, each with its own response cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// A condensed, one-line-per-entry summary.
    Summary,
    /// Human-oriented rendering with full message text.
    Readable,
    /// Readable, but sections are collapsed until expanded.
    Expandable,
    /// Every field verbatim, no truncation.
    Full,
    /// Dense machine-oriented rendering, many entries per response.
    Compact,
    /// JSON-structured rendering for programmatic consumers.
    Structured,
}

impl ResponseMode {
    /// Parse the mode from a tool-call `mode` argument, defaulting to
    /// [`ResponseMode::Readable`] on an unrecognized value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "summary" => Self::Summary,
            "expandable" => Self::Expandable,
            "full" => Self::Full,
            "compact" => Self::Compact,
            "structured" => Self::Structured,
            _ => Self::Readable,
        }
    }

    /// The maximum number of entries returned for this mode.
    #[must_use]
    pub fn limit(self) -> usize {
        match self {
            Self::Summary | Self::Readable | Self::Expandable => 50,
            Self::Full => 10,
            Self::Compact => 200,
            Self::Structured => 100,
        }
    }
}

fn priority_rank(priority: Priority) -> u8 {
    match priority {
        Priority::Critical => 0,
        Priority::High => 1,
        Priority::Medium => 2,
        Priority::Low => 3,
    }
}

/// Metadata describing how a set of entries was truncated to fit a
/// mode's response cap.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LimitMetadata {
    /// Entries present before any limiting was applied.
    pub total_available: usize,
    /// Entries remaining after any priority filter, before the cap.
    pub filtered_count: usize,
    /// Entries actually returned.
    pub returned_count: usize,
    /// Entries dropped purely to respect the mode's cap.
    pub entries_omitted: usize,
    /// The mode this limit was computed for.
    pub mode: String,
    /// The cap that was applied.
    pub limit_applied: usize,
}

/// Sort newest-first by priority then recency, and truncate to `mode`'s
/// cap. Returns the retained entries alongside a description of what
/// was dropped.
#[must_use]
pub fn limit_entries(mut entries: Vec<LogEntry>, mode: ResponseMode) -> (Vec<LogEntry>, LimitMetadata) {
    let total_available = entries.len();

    entries.sort_by(|a, b| {
        priority_rank(a.priority)
            .cmp(&priority_rank(b.priority))
            .then(b.ts.cmp(&a.ts))
    });

    let filtered_count = entries.len();
    let limit_applied = mode.limit();
    let returned_count = filtered_count.min(limit_applied);
    entries.truncate(limit_applied);

    let metadata = LimitMetadata {
        total_available,
        filtered_count,
        returned_count,
        entries_omitted: filtered_count.saturating_sub(returned_count),
        mode: format!("{mode:?}").to_ascii_lowercase(),
        limit_applied,
    };

    (entries, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use scribe_storage::models::LogEntry;

    fn entry(id: &str, priority: Priority, age_secs: i64) -> LogEntry {
        LogEntry {
            entry_id: id.to_string(),
            project: "demo".to_string(),
            ts: Utc::now() - Duration::seconds(age_secs),
            emoji: "\u{1f4dd}".to_string(),
            agent: "claude/sonnet".to_string(),
            message: "did a thing".to_string(),
            meta: std::collections::HashMap::new(),
            raw_line: "did a thing".to_string(),
            sha256: "deadbeef".to_string(),
            priority,
            category: "decision".to_string(),
            tags: Vec::new(),
            confidence: 1.0,
        }
    }

    #[test]
    fn parse_defaults_to_readable_on_unknown_mode() {
        assert_eq!(ResponseMode::parse("nonsense"), ResponseMode::Readable);
        assert_eq!(ResponseMode::parse("FULL"), ResponseMode::Full);
    }

    #[test]
    fn full_mode_caps_at_ten() {
        let entries: Vec<_> = (0..25)
            .map(|i| entry(&format!("e{i}"), Priority::Medium, i))
            .collect();
        let (limited, meta) = limit_entries(entries, ResponseMode::Full);
        assert_eq!(limited.len(), 10);
        assert_eq!(meta.total_available, 25);
        assert_eq!(meta.returned_count, 10);
        assert_eq!(meta.entries_omitted, 15);
        assert_eq!(meta.limit_applied, 10);
    }

    #[test]
    fn critical_entries_sort_before_low_priority_regardless_of_age() {
        let entries = vec![
            entry("old-critical", Priority::Critical, 1000),
            entry("new-low", Priority::Low, 1),
        ];
        let (limited, _) = limit_entries(entries, ResponseMode::Summary);
        assert_eq!(limited[0].entry_id, "old-critical");
        assert_eq!(limited[1].entry_id, "new-low");
    }

    #[test]
    fn within_cap_nothing_is_omitted() {
        let entries = vec![entry("only", Priority::High, 0)];
        let (limited, meta) = limit_entries(entries, ResponseMode::Compact);
        assert_eq!(limited.len(), 1);
        assert_eq!(meta.entries_omitted, 0);
    }
}
