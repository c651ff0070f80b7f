//! Parameter healing: a fixed coercion table applied at the tool-call
//! boundary, before arguments reach a tool body. Every coercion that
//! fires appends a note to the response's `validation_warnings` so a
//! calling agent learns the canonical shape instead of relying on it.

use serde_json::Value;

use crate::error::{ToolError, ToolResult};

/// One coercion applied while healing a single argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealingNote {
    /// The argument name that was coerced.
    pub param_name: String,
    /// The canonical shape the caller should supply next time.
    pub canonical_shape: String,
}

impl HealingNote {
    /// Render as the human-readable text placed in `validation_warnings`.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "{} was coerced; supply it as {} next time",
            self.param_name, self.canonical_shape
        )
    }
}

/// Coerce a value expected to be a JSON array of strings. A bare string
/// becomes a one-element list; an array is returned unchanged after
/// checking every item is a string.
///
/// # Errors
///
/// Returns [`ToolError::ParameterValidation`] if the value cannot be
/// coerced at all.
pub fn heal_string_list(
    param_name: &str,
    value: Value,
    notes: &mut Vec<HealingNote>,
) -> ToolResult<Vec<String>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(ToolError::ParameterValidation(format!(
                    "{param_name}: every item must be a string, got {other}"
                ))),
            })
            .collect(),
        Value::String(s) => {
            notes.push(HealingNote {
                param_name: param_name.to_string(),
                canonical_shape: "a list of strings".to_string(),
            });
            Ok(vec![s])
        },
        other => Err(ToolError::ParameterValidation(format!(
            "{param_name} must be a list of strings, got {other}"
        ))),
    }
}

/// Coerce a value expected to be a JSON array of objects. A bare object
/// becomes a one-element list.
///
/// # Errors
///
/// Returns [`ToolError::ParameterValidation`] if the value cannot be
/// coerced at all.
pub fn heal_object_list(
    param_name: &str,
    value: Value,
    notes: &mut Vec<HealingNote>,
) -> ToolResult<Vec<serde_json::Map<String, Value>>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(obj) => Ok(obj),
                other => Err(ToolError::ParameterValidation(format!(
                    "{param_name}: every item must be an object, got {other}"
                ))),
            })
            .collect(),
        Value::Object(obj) => {
            notes.push(HealingNote {
                param_name: param_name.to_string(),
                canonical_shape: "a list of objects".to_string(),
            });
            Ok(vec![obj])
        },
        other => Err(ToolError::ParameterValidation(format!(
            "{param_name} must be a list of objects, got {other}"
        ))),
    }
}

/// Coerce a value expected to be a number. A numeric string is parsed;
/// an unparseable string is rejected rather than silently dropped.
///
/// # Errors
///
/// Returns [`ToolError::ParameterValidation`] if the value is neither a
/// number nor a numeric string.
pub fn heal_number(param_name: &str, value: Value, notes: &mut Vec<HealingNote>) -> ToolResult<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| {
            ToolError::ParameterValidation(format!("{param_name}: number out of range"))
        }),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(parsed) => {
                notes.push(HealingNote {
                    param_name: param_name.to_string(),
                    canonical_shape: "a number".to_string(),
                });
                Ok(parsed)
            },
            Err(_) => Err(ToolError::ParameterValidation(format!(
                "{param_name} must be a number, got non-numeric string '{s}'"
            ))),
        },
        other => Err(ToolError::ParameterValidation(format!(
            "{param_name} must be a number, got {other}"
        ))),
    }
}

/// Coerce a value expected to be a boolean. `"true"`/`"false"`/`"1"`/`"0"`
/// (case-insensitive) are parsed.
///
/// # Errors
///
/// Returns [`ToolError::ParameterValidation`] if the value is neither a
/// boolean nor one of the recognized boolean-like strings.
pub fn heal_bool(param_name: &str, value: Value, notes: &mut Vec<HealingNote>) -> ToolResult<bool> {
    match value {
        Value::Bool(b) => Ok(b),
        Value::String(s) => {
            let parsed = match s.to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            };
            match parsed {
                Some(b) => {
                    notes.push(HealingNote {
                        param_name: param_name.to_string(),
                        canonical_shape: "a boolean".to_string(),
                    });
                    Ok(b)
                },
                None => Err(ToolError::ParameterValidation(format!(
                    "{param_name} must be a boolean, got non-boolean string '{s}'"
                ))),
            }
        },
        other => Err(ToolError::ParameterValidation(format!(
            "{param_name} must be a boolean, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_string_becomes_one_element_list() {
        let mut notes = Vec::new();
        let result = heal_string_list("tags", json!("decision"), &mut notes).unwrap();
        assert_eq!(result, vec!["decision".to_string()]);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].param_name, "tags");
    }

    #[test]
    fn list_of_strings_passes_through_without_a_note() {
        let mut notes = Vec::new();
        let result = heal_string_list("tags", json!(["a", "b"]), &mut notes).unwrap();
        assert_eq!(result, vec!["a".to_string(), "b".to_string()]);
        assert!(notes.is_empty());
    }

    #[test]
    fn unparseable_shape_is_rejected_not_dropped() {
        let mut notes = Vec::new();
        let err = heal_string_list("tags", json!(42), &mut notes).unwrap_err();
        assert!(matches!(err, ToolError::ParameterValidation(_)));
    }

    #[test]
    fn numeric_string_is_parsed() {
        let mut notes = Vec::new();
        let result = heal_number("confidence", json!("0.75"), &mut notes).unwrap();
        assert!((result - 0.75).abs() < f64::EPSILON);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn non_numeric_string_is_rejected() {
        let mut notes = Vec::new();
        let err = heal_number("confidence", json!("not a number"), &mut notes).unwrap_err();
        assert!(matches!(err, ToolError::ParameterValidation(_)));
    }

    #[test]
    fn boolean_like_strings_are_parsed_case_insensitively() {
        let mut notes = Vec::new();
        assert!(heal_bool("flag", json!("TRUE"), &mut notes).unwrap());
        assert!(!heal_bool("flag", json!("0"), &mut notes).unwrap());
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn single_object_becomes_one_element_list() {
        let mut notes = Vec::new();
        let result = heal_object_list("items", json!({"message": "hi"}), &mut notes).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(notes.len(), 1);
    }
}
