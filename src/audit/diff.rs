//! Diff generation for audit entries
//!
//! Produces short human-readable summaries of what changed between two
//! JSON representations of an entity.

use serde_json::Value;

/// Generate a one-line diff summary between two JSON objects
///
/// Compares top-level fields and reports changed ones as
/// "field: old -> new". Returns None when nothing differs.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let (Value::Object(before_map), Value::Object(after_map)) = (before, after) else {
        return None;
    };

    let mut changes = Vec::new();

    for (key, after_value) in after_map {
        // Timestamps churn on every write and drown out real changes
        if key == "updated_at" || key == "created_at" {
            continue;
        }

        match before_map.get(key) {
            Some(before_value) if before_value != after_value => {
                changes.push(format!(
                    "{}: {} -> {}",
                    key,
                    render(before_value),
                    render(after_value)
                ));
            }
            None => changes.push(format!("{}: (added) {}", key, render(after_value))),
            _ => {}
        }
    }

    for key in before_map.keys() {
        if !after_map.contains_key(key) {
            changes.push(format!("{}: (removed)", key));
        }
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
