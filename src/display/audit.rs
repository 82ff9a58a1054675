//! Audit trail display

use crate::audit::AuditEntry;

/// Render audit entries oldest first, one per line (plus a change summary
/// line for updates)
pub fn format_audit_entries(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No audit entries.".to_string();
    }

    let mut output = String::new();
    for entry in entries {
        output.push_str(&entry.format_line());
        output.push('\n');
    }
    output
}
