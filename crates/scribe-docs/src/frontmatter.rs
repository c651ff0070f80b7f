//! YAML front-matter parsing, preserving the original block's formatting
//! where the update is a simple scalar change and only rewriting
//! wholesale when a list/map value is introduced.

use std::collections::BTreeMap;

use serde_yaml::Value;

use crate::error::DocError;

const BOUNDARY: &str = "---";

/// A document split into its optional front-matter and body.
#[derive(Debug, Clone)]
pub struct Frontmatter {
    /// Whether the document opened with a `---` front-matter block.
    pub present: bool,
    /// The raw front-matter block, including both `---` delimiters.
    pub raw: String,
    /// Parsed front-matter fields.
    pub data: BTreeMap<String, Value>,
    /// Document body, i.e. everything after the front-matter block.
    pub body: String,
}

/// Split `text` into front-matter and body.
///
/// # Errors
///
/// Returns [`DocError::FrontmatterParse`] if a `---` opener has no
/// matching closer, or the block does not parse as a YAML mapping.
pub fn parse(text: &str) -> Result<Frontmatter, DocError> {
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(Frontmatter {
            present: false,
            raw: String::new(),
            data: BTreeMap::new(),
            body: text.to_string(),
        });
    };
    if first.trim_end() != BOUNDARY {
        return Ok(Frontmatter {
            present: false,
            raw: String::new(),
            data: BTreeMap::new(),
            body: text.to_string(),
        });
    }

    let remaining: Vec<&str> = lines.collect();
    let close_index = remaining
        .iter()
        .position(|line| line.trim_end() == BOUNDARY)
        .ok_or_else(|| {
            DocError::FrontmatterParse("missing closing '---' delimiter".to_string())
        })?;

    let frontmatter_content: String = remaining[..close_index].concat();
    let body: String = remaining[close_index + 1..].concat();
    let raw = format!("{first}{frontmatter_content}---\n");

    let value: Value = serde_yaml::from_str(&frontmatter_content)
        .map_err(|e| DocError::FrontmatterParse(e.to_string()))?;
    let data = match value {
        Value::Null => BTreeMap::new(),
        Value::Mapping(mapping) => mapping
            .into_iter()
            .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), v)))
            .collect(),
        _ => {
            return Err(DocError::FrontmatterParse(
                "frontmatter must be a mapping".to_string(),
            ));
        },
    };

    Ok(Frontmatter {
        present: true,
        raw,
        data,
        body,
    })
}

/// Render a front-matter block from scratch.
///
/// # Errors
///
/// Returns [`DocError::FrontmatterParse`] if serialization fails.
pub fn render(data: &BTreeMap<String, Value>) -> Result<String, DocError> {
    let rendered = serde_yaml::to_string(data).map_err(|e| DocError::FrontmatterParse(e.to_string()))?;
    Ok(format!("{BOUNDARY}\n{rendered}{BOUNDARY}\n"))
}

/// Apply `updates` to an existing front-matter block. Scalar-only
/// updates try to preserve the original block's line formatting;
/// introducing any list/map value rewrites the block wholesale.
///
/// # Errors
///
/// Returns [`DocError::FrontmatterParse`] if re-serialization fails.
pub fn apply_updates(
    current: &Frontmatter,
    updates: &BTreeMap<String, Value>,
) -> Result<Frontmatter, DocError> {
    if updates.is_empty() {
        return Ok(current.clone());
    }

    let mut merged = current.data.clone();
    for (key, value) in updates {
        merged.insert(key.clone(), value.clone());
    }

    let complex_update = updates
        .values()
        .any(|v| matches!(v, Value::Sequence(_) | Value::Mapping(_)));
    if complex_update || !current.present {
        let raw = render(&merged)?;
        return Ok(Frontmatter {
            present: true,
            raw,
            data: merged,
            body: current.body.clone(),
        });
    }

    let mut lines: Vec<String> = current.raw.lines().map(str::to_string).collect();
    let mut remaining: BTreeMap<String, Value> = updates.clone();
    for line in lines.iter_mut().skip(1) {
        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];
        let mut matched_key = None;
        for key in remaining.keys() {
            if trimmed.starts_with(&format!("{key}:")) {
                matched_key = Some(key.clone());
                break;
            }
        }
        if let Some(key) = matched_key {
            if let Some(value) = remaining.remove(&key) {
                let rendered = scalar_to_string(&value);
                *line = format!("{indent}{key}: {rendered}");
            }
        }
    }
    for (key, value) in remaining {
        let insert_at = lines.len().saturating_sub(1).max(1);
        lines.insert(insert_at, format!("{key}: {}", scalar_to_string(&value)));
    }

    Ok(Frontmatter {
        present: true,
        raw: format!("{}\n", lines.join("\n")),
        data: merged,
        body: current.body.clone(),
    })
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .unwrap_or_default()
            .trim()
            .to_string(),
    }
}

/// Reassemble a document from its front-matter and body.
#[must_use]
pub fn render_document(frontmatter: &Frontmatter) -> String {
    if frontmatter.present {
        format!("{}{}", frontmatter.raw, frontmatter.body)
    } else {
        frontmatter.body.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_frontmatter_is_reported_absent() {
        let parsed = parse("# Title\nbody text\n").unwrap();
        assert!(!parsed.present);
        assert_eq!(parsed.body, "# Title\nbody text\n");
    }

    #[test]
    fn parses_simple_mapping() {
        let text = "---\ntitle: demo\ncount: 3\n---\n# Body\n";
        let parsed = parse(text).unwrap();
        assert!(parsed.present);
        assert_eq!(
            parsed.data.get("title").unwrap().as_str(),
            Some("demo")
        );
        assert_eq!(parsed.body, "# Body\n");
    }

    #[test]
    fn missing_closing_delimiter_errors() {
        let text = "---\ntitle: demo\n# Body\n";
        assert!(matches!(parse(text), Err(DocError::FrontmatterParse(_))));
    }

    #[test]
    fn apply_updates_preserves_formatting_for_scalars() {
        let text = "---\ntitle: demo\ncount: 3\n---\nbody\n";
        let parsed = parse(text).unwrap();
        let mut updates = BTreeMap::new();
        updates.insert("count".to_string(), Value::Number(4.into()));
        let updated = apply_updates(&parsed, &updates).unwrap();
        assert!(updated.raw.contains("count: 4"));
        assert!(updated.raw.contains("title: demo"));
    }

    #[test]
    fn apply_updates_rewrites_on_complex_value() {
        let text = "---\ntitle: demo\n---\nbody\n";
        let parsed = parse(text).unwrap();
        let mut updates = BTreeMap::new();
        updates.insert(
            "tags".to_string(),
            Value::Sequence(vec![Value::String("a".to_string())]),
        );
        let updated = apply_updates(&parsed, &updates).unwrap();
        assert!(updated.data.contains_key("tags"));
    }
}
