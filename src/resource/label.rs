//! Object Labeler
//!
//! Derives a stable human-readable label for an arbitrary resource record.
//! The label is used both as a log token and as a report key.

use serde_json::Value;

/// Label fields probed in priority order; first present field wins.
/// The order is deliberate: `name` and `address` identify most kinds,
/// `display`/`model`/`description` cover the rest of the backend's schemas.
const LABEL_FIELDS: &[&str] = &["name", "address", "display", "model", "description"];

/// Derive a display label for a record.
///
/// Never fails and always returns a non-empty string; records without any
/// label field fall back to `"Object with ID {id}"` or `"Unknown Object"`.
pub fn label_for(record: &Value) -> String {
    for field in LABEL_FIELDS {
        if let Some(value) = record.get(field) {
            let label = render(value);
            if !label.is_empty() {
                return label;
            }
        }
    }

    match record.get("id") {
        Some(id) => format!("Object with ID {}", render(id)),
        None => "Unknown Object".to_string(),
    }
}

/// Render a field value without JSON string quoting
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
