//! Bracketed field-name paths
//!
//! Field names encode a path the way HTML forms post them:
//! - `integer` (root only)
//! - `test[en]` (keyed)
//! - `test1[]` (empty segment = next list slot)
//! - `test3[0][1][]` (nested)
//!
//! Parsing never fails. Unbalanced brackets produce best-effort segments.

use serde_json::Value;

/// Ordered path segments; segment 0 is the root field identifier
pub type PathSegments = Vec<String>;

/// Parse a field name into segments
///
/// Examples:
/// - "a[b][c]" → ["a", "b", "c"]
/// - "test1[]" → ["test1", ""]
pub fn parse(field_name: &str) -> PathSegments {
    field_name
        .replace(']', "")
        .split('[')
        .map(str::to_string)
        .collect()
}

/// Root identifier of a field name (segment 0)
pub fn root_name(field_name: &str) -> String {
    field_name
        .split('[')
        .next()
        .unwrap_or_default()
        .replace(']', "")
}

/// Rebuild the bracketed name from segments
///
/// `["test", "test1", "en"]` → `test[test1][en]`
pub fn qualified_name(segments: &[String]) -> String {
    let Some((root, rest)) = segments.split_first() else {
        return String::new();
    };

    let mut name = String::with_capacity(root.len() + rest.iter().map(|s| s.len() + 2).sum::<usize>());
    name.push_str(root);
    for segment in rest {
        name.push('[');
        name.push_str(segment);
        name.push(']');
    }
    name
}

/// Walk `value` along `segments`
///
/// Objects are addressed by key, arrays by decimal position.
/// Returns `None` as soon as a segment is missing or the current value
/// is not a container.
pub fn apply<'a>(value: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut current = value;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}
