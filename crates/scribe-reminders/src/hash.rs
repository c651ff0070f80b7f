//! Reminder-hash computation for cooldown keying.

use scribe_core::hash::sha256_hex_joined;

/// Compute the reminder-hash used to key the cooldown cache.
///
/// When `session_id` is `Some` and `session_aware` is `true`, hashes
/// `{project_root}|{agent_id}|{tool_name}|{reminder_key}|{session_id}`;
/// otherwise hashes the same fields without the session segment.
#[must_use]
pub fn reminder_hash(
    project_root: &str,
    agent_id: &str,
    tool_name: &str,
    reminder_key: &str,
    session_id: Option<&str>,
    session_aware: bool,
) -> String {
    match session_id.filter(|_| session_aware) {
        Some(session_id) => sha256_hex_joined(&[
            project_root,
            agent_id,
            tool_name,
            reminder_key,
            session_id,
        ]),
        None => sha256_hex_joined(&[project_root, agent_id, tool_name, reminder_key]),
    }
}

/// Build the human-readable cooldown-cache key (distinct from the
/// SHA-256 reminder-hash, used for scoped `reset_cooldowns` matching).
#[must_use]
pub fn cooldown_cache_key(project_root: &str, agent_id: &str, tool_name: &str, reminder_key: &str) -> String {
    format!("{project_root}|{agent_id}|{tool_name}|{reminder_key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_hash_ignores_session_id_when_flag_off() {
        let with_session = reminder_hash("root", "agent", "tool", "key", Some("s1"), false);
        let without_session = reminder_hash("root", "agent", "tool", "key", None, false);
        assert_eq!(with_session, without_session);
    }

    #[test]
    fn session_aware_hash_differs_from_legacy() {
        let session_aware = reminder_hash("root", "agent", "tool", "key", Some("s1"), true);
        let legacy = reminder_hash("root", "agent", "tool", "key", None, true);
        assert_ne!(session_aware, legacy);
    }

    #[test]
    fn different_sessions_produce_different_hashes() {
        let a = reminder_hash("root", "agent", "tool", "key", Some("s1"), true);
        let b = reminder_hash("root", "agent", "tool", "key", Some("s2"), true);
        assert_ne!(a, b);
    }

    #[test]
    fn same_session_is_stable() {
        let a = reminder_hash("root", "agent", "tool", "key", Some("s1"), true);
        let b = reminder_hash("root", "agent", "tool", "key", Some("s1"), true);
        assert_eq!(a, b);
    }
}
