//! Priority and emoji inference tables.

pub use scribe_storage::models::Priority;

/// Default emoji for a status keyword, falling back to the info emoji for
/// anything unrecognized.
#[must_use]
pub fn default_emoji_for_status(status: &str) -> &'static str {
    match status.to_ascii_lowercase().as_str() {
        "success" => "✅",
        "warn" => "⚠️",
        "error" => "❌",
        "bug" => "🐞",
        "plan" => "🧭",
        _ => "ℹ️",
    }
}

/// Validate a confidence value, defaulting any out-of-range input
/// (including negative values) to `1.0` rather than clamping toward the
/// nearer bound.
#[must_use]
pub fn clamp_confidence(raw: f64) -> f64 {
    if (0.0..=1.0).contains(&raw) {
        raw
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_expected_emoji() {
        assert_eq!(default_emoji_for_status("error"), "❌");
        assert_eq!(default_emoji_for_status("unknown"), "ℹ️");
    }

    #[test]
    fn confidence_out_of_range_defaults_to_one() {
        assert_eq!(clamp_confidence(1.5), 1.0);
        assert_eq!(clamp_confidence(-0.5), 1.0);
        assert_eq!(clamp_confidence(0.3), 0.3);
    }
}
