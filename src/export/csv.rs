//! CSV Export functionality
//!
//! Exports clients and invoices to CSV. The client export uses the same
//! column names the importer recognizes, so an exported file can be imported
//! into another data directory unchanged.

use std::collections::HashMap;
use std::io::Write;

use crate::error::{SleekError, SleekResult};
use crate::import::ClientField;
use crate::models::Client;
use crate::storage::Storage;

fn export_err(e: csv::Error) -> SleekError {
    SleekError::Export(e.to_string())
}

fn client_field(client: &Client, field: ClientField) -> &str {
    match field {
        ClientField::Name => &client.name,
        ClientField::Email => client.email.as_deref().unwrap_or(""),
        ClientField::Phone => client.phone.as_deref().unwrap_or(""),
        ClientField::Address => client.address.as_deref().unwrap_or(""),
        ClientField::Company => client.company_name.as_deref().unwrap_or(""),
        ClientField::Notes => &client.notes,
        ClientField::Vat => client.vat_number.as_deref().unwrap_or(""),
    }
}

/// Export clients to CSV, sorted by name
pub fn export_clients_csv<W: Write>(
    storage: &Storage,
    writer: W,
    include_archived: bool,
) -> SleekResult<usize> {
    let clients = storage.clients.list(include_archived)?;
    let mut wtr = csv::Writer::from_writer(writer);

    let header: Vec<&str> = ClientField::ALL
        .iter()
        .map(ClientField::canonical_header)
        .collect();
    wtr.write_record(&header).map_err(export_err)?;

    for client in &clients {
        let record: Vec<&str> = ClientField::ALL
            .iter()
            .map(|field| client_field(client, *field))
            .collect();
        wtr.write_record(&record).map_err(export_err)?;
    }

    wtr.flush().map_err(|e| SleekError::Export(e.to_string()))?;
    Ok(clients.len())
}

/// Export all invoices to CSV with their computed totals
pub fn export_invoices_csv<W: Write>(storage: &Storage, writer: W) -> SleekResult<usize> {
    let client_names: HashMap<_, _> = storage
        .clients
        .get_all()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let invoices = storage.invoices.list(None, None)?;
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "number",
        "client",
        "status",
        "issue_date",
        "due_date",
        "subtotal",
        "discount",
        "tax",
        "total",
        "paid",
        "balance",
        "currency",
    ])
    .map_err(export_err)?;

    for invoice in &invoices {
        let totals = invoice.totals();
        let paid = invoice.amount_paid();
        let client = client_names
            .get(&invoice.client_id)
            .map(String::as_str)
            .unwrap_or("Unknown");

        wtr.write_record([
            invoice.number.clone(),
            client.to_string(),
            invoice.status.to_string().to_lowercase(),
            invoice.issue_date.to_string(),
            invoice.due_date.to_string(),
            totals.subtotal.to_string(),
            totals.discount.to_string(),
            totals.tax.to_string(),
            totals.total.to_string(),
            paid.to_string(),
            (totals.total - paid).to_string(),
            invoice.currency.clone(),
        ])
        .map_err(export_err)?;
    }

    wtr.flush().map_err(|e| SleekError::Export(e.to_string()))?;
    Ok(invoices.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SleekPaths;
    use crate::import::parse_csv;
    use crate::models::{Discount, Invoice, InvoiceStatus, LineItem, Money};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SleekPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_client_export_reimports_cleanly() {
        let (_temp_dir, storage) = create_test_storage();

        let mut jane = Client::new("Jane Cooper").with_email("jane@cooperdesign.com");
        jane.company_name = Some("Cooper Design, Inc.".into());
        jane.notes = "Says \"hi\"".into();
        storage.clients.upsert(jane).unwrap();

        let mut lukas = Client::new("Lukas Weber");
        lukas.vat_number = Some("DE811907980".into());
        lukas.phone = Some("+49 30 1234567".into());
        storage.clients.upsert(lukas).unwrap();

        let mut old = Client::new("Old Client");
        old.archive();
        storage.clients.upsert(old).unwrap();

        let mut output = Vec::new();
        let count = export_clients_csv(&storage, &mut output, false).unwrap();
        assert_eq!(count, 2);

        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("name,email,phone,address,company,notes,vat_number\n"));

        let result = parse_csv(&text);
        assert!(result.success);
        assert!(result.errors.is_empty());
        assert_eq!(result.clients.len(), 2);
        assert_eq!(result.clients[0].name, "Jane Cooper");
        assert_eq!(
            result.clients[0].company_name.as_deref(),
            Some("Cooper Design, Inc.")
        );
        assert_eq!(result.clients[1].vat_number.as_deref(), Some("DE811907980"));
    }

    #[test]
    fn test_include_archived() {
        let (_temp_dir, storage) = create_test_storage();
        let mut old = Client::new("Old Client");
        old.archive();
        storage.clients.upsert(old).unwrap();

        let count = export_clients_csv(&storage, Vec::new(), true).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_export_invoices() {
        let (_temp_dir, storage) = create_test_storage();
        let client = Client::new("Acme, Ltd");
        storage.clients.upsert(client.clone()).unwrap();

        let issued = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let due = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let mut invoice = Invoice::new("INV-0001", client.id, issued, due, "USD");
        invoice.line_items = vec![
            LineItem::units("Design", 2, Money::from_cents(10000)),
            LineItem::units("Hosting", 1, Money::from_cents(15000)),
        ];
        invoice.tax_rate = Decimal::from(10);
        invoice.discount = Discount::Percentage(Decimal::from(5));
        invoice.status = InvoiceStatus::Sent;
        storage.invoices.upsert(invoice).unwrap();

        let mut output = Vec::new();
        export_invoices_csv(&storage, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("number,client,status,issue_date,due_date,subtotal,discount,tax,total,paid,balance,currency")
        );
        assert_eq!(
            lines.next(),
            Some("INV-0001,\"Acme, Ltd\",sent,2024-03-01,2024-03-31,350.00,17.50,33.25,365.75,0.00,365.75,USD")
        );
    }
}
