//! Field-level change summaries for audit entries

use serde_json::Value;

/// Fields that change on every save and carry no information for a reader
const IGNORED_FIELDS: &[&str] = &["updated_at"];

const MAX_STRING_LEN: usize = 40;

/// Summarize the top-level fields that differ between two serialized states
///
/// Returns `None` when nothing meaningful changed.
pub fn summarize_changes(before: &Value, after: &Value) -> Option<String> {
    let (Value::Object(before_obj), Value::Object(after_obj)) = (before, after) else {
        return (before != after).then(|| format!("{} -> {}", render(before), render(after)));
    };

    let mut changes: Vec<String> = Vec::new();

    for (key, old) in before_obj {
        if IGNORED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        match after_obj.get(key) {
            Some(new) if new != old => {
                changes.push(format!("{}: {} -> {}", key, render(old), render(new)))
            }
            Some(_) => {}
            None => changes.push(format!("{}: {} -> (removed)", key, render(old))),
        }
    }

    for (key, new) in after_obj {
        if !before_obj.contains_key(key) && !IGNORED_FIELDS.contains(&key.as_str()) {
            changes.push(format!("{}: (added) -> {}", key, render(new)));
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
        Value::String(s) if s.chars().count() > MAX_STRING_LEN => {
            let head: String = s.chars().take(MAX_STRING_LEN - 3).collect();
            format!("\"{}...\"", head)
        }
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_changes() {
        let v = json!({"name": "Acme", "archived": false});
        assert_eq!(summarize_changes(&v, &v), None);
    }

    #[test]
    fn test_updated_at_is_ignored() {
        let before = json!({"name": "Acme", "updated_at": "2024-01-01T00:00:00Z"});
        let after = json!({"name": "Acme", "updated_at": "2024-02-01T00:00:00Z"});
        assert_eq!(summarize_changes(&before, &after), None);
    }

    #[test]
    fn test_added_and_removed() {
        let before = json!({"phone": "555"});
        let after = json!({"email": "a@b.co"});
        let summary = summarize_changes(&before, &after).unwrap();
        assert!(summary.contains("phone: \"555\" -> (removed)"));
        assert!(summary.contains("email: (added) -> \"a@b.co\""));
    }

    #[test]
    fn test_collections_are_counted() {
        let before = json!({"line_items": [1]});
        let after = json!({"line_items": [1, 2]});
        assert_eq!(
            summarize_changes(&before, &after).as_deref(),
            Some("line_items: [1 items] -> [2 items]")
        );
    }

    #[test]
    fn test_long_strings_truncated() {
        let long = "x".repeat(100);
        let summary = summarize_changes(&json!({"notes": ""}), &json!({"notes": long})).unwrap();
        assert!(summary.ends_with("...\""));
        assert!(summary.len() < 80);
    }

    #[test]
    fn test_scalar_values() {
        assert_eq!(
            summarize_changes(&json!(1), &json!(2)).as_deref(),
            Some("1 -> 2")
        );
    }
}
