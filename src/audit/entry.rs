//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::diff::summarize_changes;

/// Kind of change recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        };
        f.write_str(label)
    }
}

/// Entities tracked by the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Client,
    Invoice,
    Estimate,
    Expense,
    ExpenseCategory,
    Settings,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntityType::Client => "Client",
            EntityType::Invoice => "Invoice",
            EntityType::Estimate => "Estimate",
            EntityType::Expense => "Expense",
            EntityType::ExpenseCategory => "ExpenseCategory",
            EntityType::Settings => "Settings",
        };
        f.write_str(label)
    }
}

/// One line of the audit log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub entity_type: EntityType,
    pub entity_id: String,

    /// Label shown to humans (client name, invoice number, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<String>,
}

impl AuditEntry {
    fn new(
        operation: Operation,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        label: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id: entity_id.into(),
            label,
            before: None,
            after: None,
            changes: None,
        }
    }

    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        label: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::new(Operation::Create, entity_type, entity_id, label);
        entry.after = serde_json::to_value(entity).ok();
        entry
    }

    /// Update entry; the change summary is computed from the two states
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        label: Option<String>,
        before: &T,
        after: &T,
    ) -> Self {
        let mut entry = Self::new(Operation::Update, entity_type, entity_id, label);
        entry.before = serde_json::to_value(before).ok();
        entry.after = serde_json::to_value(after).ok();
        if let (Some(b), Some(a)) = (&entry.before, &entry.after) {
            entry.changes = summarize_changes(b, a);
        }
        entry
    }

    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        label: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::new(Operation::Delete, entity_type, entity_id, label);
        entry.before = serde_json::to_value(entity).ok();
        entry
    }

    /// Single-line rendering used by `sleek audit`
    pub fn format_line(&self) -> String {
        let mut line = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );
        if let Some(label) = &self.label {
            line.push_str(&format!(" ({})", label));
        }
        if let Some(changes) = &self.changes {
            line.push_str(&format!("\n  {}", changes));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_has_only_after() {
        let entry = AuditEntry::create(
            EntityType::Client,
            "cli-1234abcd",
            Some("Acme".into()),
            &json!({"name": "Acme"}),
        );
        assert_eq!(entry.operation, Operation::Create);
        assert!(entry.before.is_none());
        assert_eq!(entry.after, Some(json!({"name": "Acme"})));
    }

    #[test]
    fn test_update_summarizes_changes() {
        let entry = AuditEntry::update(
            EntityType::Invoice,
            "inv-1",
            Some("INV-0001".into()),
            &json!({"status": "draft", "notes": ""}),
            &json!({"status": "sent", "notes": ""}),
        );
        assert_eq!(entry.changes.as_deref(), Some("status: \"draft\" -> \"sent\""));
    }

    #[test]
    fn test_delete_has_only_before() {
        let entry = AuditEntry::delete(EntityType::Expense, "exp-1", None, &json!({"a": 1}));
        assert!(entry.before.is_some());
        assert!(entry.after.is_none());
    }

    #[test]
    fn test_format_line() {
        let entry = AuditEntry::update(
            EntityType::Client,
            "cli-1",
            Some("Acme".into()),
            &json!({"email": null}),
            &json!({"email": "a@b.co"}),
        );
        let line = entry.format_line();
        assert!(line.contains("UPDATE Client cli-1 (Acme)"));
        assert!(line.contains("email: null -> \"a@b.co\""));
    }

    #[test]
    fn test_entity_type_serializes_snake_case() {
        let value = serde_json::to_value(EntityType::ExpenseCategory).unwrap();
        assert_eq!(value, json!("expense_category"));
    }
}
