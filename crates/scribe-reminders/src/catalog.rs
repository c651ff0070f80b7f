//! Reminder definitions and the catalog the engine ships with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Urgency tier, ordered urgent > warning > info by [`Level::priority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Low-urgency coaching note.
    Info,
    /// Hygiene issue that should be addressed soon.
    Warning,
    /// Needs attention now.
    Urgent,
}

impl Level {
    /// Sort priority, higher sorts first (urgent > warning > info).
    #[must_use]
    pub fn priority(self) -> u8 {
        match self {
            Self::Urgent => 2,
            Self::Warning => 1,
            Self::Info => 0,
        }
    }
}

/// Grouping used for teaching-cap suppression and category weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Counts toward the per-session teaching cap.
    Teaching,
    /// General hygiene/urgency reminder, uncapped.
    General,
}

/// A reminder definition: everything about a reminder key except the
/// context-specific variables used to render it.
#[derive(Debug, Clone)]
pub struct ReminderDefinition {
    /// Dotted key, e.g. `logging.stale_log`.
    pub key: &'static str,
    /// Urgency tier.
    pub level: Level,
    /// Selection score, used as the secondary sort key.
    pub score: i32,
    /// Teaching-cap / general-hygiene grouping.
    pub category: Category,
    /// Relative weight within its category, used as the tertiary sort key.
    pub category_weight: i32,
    /// Default cooldown, in minutes, before the same reminder-hash may
    /// fire again.
    pub cooldown_minutes: i64,
}

/// `logging.stale_log` — no entry within N minutes while a project is active.
pub const STALE_LOG: ReminderDefinition = ReminderDefinition {
    key: "logging.stale_log",
    level: Level::Warning,
    score: 60,
    category: Category::Teaching,
    category_weight: 10,
    cooldown_minutes: 20,
};

/// `logging.missing_metadata` — a tee to an auxiliary stream was
/// skipped for lack of required keys. Always teaching category, always
/// fired at failure-equivalent urgency regardless of operation status,
/// since it reports a dropped write.
pub const MISSING_METADATA: ReminderDefinition = ReminderDefinition {
    key: "logging.missing_metadata",
    level: Level::Urgent,
    score: 90,
    category: Category::Teaching,
    category_weight: 20,
    cooldown_minutes: 5,
};

/// `docs.toc_stale` — headings changed since the last `generate_toc`.
pub const TOC_STALE: ReminderDefinition = ReminderDefinition {
    key: "docs.toc_stale",
    level: Level::Info,
    score: 30,
    category: Category::General,
    category_weight: 5,
    cooldown_minutes: 60,
};

/// `docs.checklist_incomplete` — unresolved checklist items past a
/// configured phase boundary.
pub const CHECKLIST_INCOMPLETE: ReminderDefinition = ReminderDefinition {
    key: "docs.checklist_incomplete",
    level: Level::Warning,
    score: 50,
    category: Category::General,
    category_weight: 8,
    cooldown_minutes: 30,
};

/// `session.idle_resumed` — session_age_minutes reset since the last
/// call, signalling a fresh start.
pub const IDLE_RESUMED: ReminderDefinition = ReminderDefinition {
    key: "session.idle_resumed",
    level: Level::Info,
    score: 10,
    category: Category::General,
    category_weight: 1,
    cooldown_minutes: 0,
};

/// All standard catalog entries, keyed by dotted reminder key.
#[must_use]
pub fn standard_catalog() -> BTreeMap<&'static str, ReminderDefinition> {
    [
        STALE_LOG,
        MISSING_METADATA,
        TOC_STALE,
        CHECKLIST_INCOMPLETE,
        IDLE_RESUMED,
    ]
    .into_iter()
    .map(|def| (def.key, def))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_priority_orders_urgent_above_info() {
        assert!(Level::Urgent.priority() > Level::Warning.priority());
        assert!(Level::Warning.priority() > Level::Info.priority());
    }

    #[test]
    fn standard_catalog_has_five_entries() {
        assert_eq!(standard_catalog().len(), 5);
    }

    #[test]
    fn missing_metadata_is_teaching_category() {
        assert_eq!(MISSING_METADATA.category, Category::Teaching);
    }
}
