//! Client display formatting
//!
//! Formats clients for terminal output in table and detail views.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::import::{ClientImportResult, ImportField};
use crate::models::Client;

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

/// Format a list of clients as a table
pub fn format_client_list(clients: &[Client]) -> String {
    if clients.is_empty() {
        return "No clients found.".to_string();
    }

    let rows = clients.iter().map(|c| ClientRow {
        id: c.id.to_string(),
        name: c.name.clone(),
        email: c.email.clone().unwrap_or_default(),
        company: c.company_name.clone().unwrap_or_default(),
        status: if c.archived { "Archived" } else { "" },
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n{} client(s)\n", table, clients.len())
}

/// Format a single client's details
pub fn format_client_details(client: &Client) -> String {
    let mut output = String::new();

    output.push_str(&format!("Client: {}\n", client.name));
    output.push_str(&format!("  ID:       {}\n", client.id));

    let optional = [
        ("Email", &client.email),
        ("Phone", &client.phone),
        ("Company", &client.company_name),
        ("Address", &client.address),
        ("VAT", &client.vat_number),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            output.push_str(&format!("  {:<9} {}\n", format!("{}:", label), value));
        }
    }

    output.push_str(&format!(
        "  Archived: {}\n",
        if client.archived { "Yes" } else { "No" }
    ));

    if !client.notes.is_empty() {
        output.push('\n');
        output.push_str(&format!("  Notes: {}\n", client.notes));
    }

    output.push('\n');
    output.push_str(&format!(
        "  Created:  {}\n",
        client.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!(
        "  Modified: {}\n",
        client.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}

/// Summarize a CSV import: counts, then each row-level problem
pub fn format_import_result(result: &ClientImportResult, created: usize) -> String {
    let mut output = String::new();

    if !result.success {
        output.push_str("Import failed.\n");
    }
    output.push_str(&format!(
        "Rows: {}  Valid: {}  Invalid: {}  Imported: {}\n",
        result.total_rows,
        result.valid_rows(),
        result.invalid_rows,
        created
    ));

    if !result.errors.is_empty() {
        output.push_str("\nErrors:\n");
        for error in &result.errors {
            let location = match error.field {
                ImportField::Header => "header".to_string(),
                _ => format!("row {}", error.row),
            };
            output.push_str(&format!("  {}: {}\n", location, error.message));
        }
    }

    if !result.duplicates.is_empty() {
        output.push_str("\nDuplicates:\n");
        for duplicate in &result.duplicates {
            match duplicate.first_row {
                Some(first) => output.push_str(&format!(
                    "  row {}: {} (first seen on row {})\n",
                    duplicate.row, duplicate.email, first
                )),
                None => output.push_str(&format!(
                    "  row {}: {} (already a client)\n",
                    duplicate.row, duplicate.email
                )),
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::parse_csv_with_existing;

    #[test]
    fn test_format_client_list() {
        let mut archived = Client::new("Old Co");
        archived.archive();
        let clients = vec![
            Client::new("Acme").with_email("billing@acme.test"),
            archived,
        ];

        let output = format_client_list(&clients);
        assert!(output.contains("Acme"));
        assert!(output.contains("billing@acme.test"));
        assert!(output.contains("Archived"));
        assert!(output.contains("2 client(s)"));
    }

    #[test]
    fn test_format_empty_list() {
        assert!(format_client_list(&[]).contains("No clients found"));
    }

    #[test]
    fn test_format_client_details() {
        let mut client = Client::new("Acme").with_email("billing@acme.test");
        client.vat_number = Some("DE811907980".into());
        client.notes = "Net 30".into();

        let output = format_client_details(&client);
        assert!(output.contains("Client: Acme"));
        assert!(output.contains("billing@acme.test"));
        assert!(output.contains("DE811907980"));
        assert!(output.contains("Notes: Net 30"));
        assert!(!output.contains("Phone"));
    }

    #[test]
    fn test_format_import_result() {
        let csv = "name,email\nAcme,a@acme.test\n,missing@name.test\nDup,A@acme.test\nKnown,known@x.test\n";
        let result = parse_csv_with_existing(csv, ["known@x.test"]);

        let output = format_import_result(&result, result.clients.len());
        assert!(output.contains("Rows: 4"));
        assert!(output.contains("Invalid: 3"));
        assert!(output.contains("first seen on row 2"));
        assert!(output.contains("already a client"));
    }
}
