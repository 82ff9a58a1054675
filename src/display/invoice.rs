//! Invoice display formatting

use std::collections::HashMap;

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::{ClientId, Invoice, LineItem, Money};
use crate::totals::{line_amount, DocumentTotals};

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Issued")]
    issued: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Balance")]
    balance: String,
}

pub(crate) fn client_name(names: &HashMap<ClientId, String>, id: ClientId) -> String {
    names
        .get(&id)
        .cloned()
        .unwrap_or_else(|| id.to_string())
}

/// Format invoices as a table, with a total outstanding footer
pub fn format_invoice_list(
    invoices: &[Invoice],
    client_names: &HashMap<ClientId, String>,
    currency_symbol: &str,
) -> String {
    if invoices.is_empty() {
        return "No invoices found.".to_string();
    }

    let rows = invoices.iter().map(|invoice| InvoiceRow {
        number: invoice.number.clone(),
        client: client_name(client_names, invoice.client_id),
        issued: invoice.issue_date.to_string(),
        due: invoice.due_date.to_string(),
        status: invoice.status.to_string(),
        total: invoice.total().format_with_symbol(currency_symbol),
        balance: invoice.balance_due().format_with_symbol(currency_symbol),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .modify(Columns::new(5..), Alignment::right());

    let outstanding: Money = invoices
        .iter()
        .filter(|i| i.status.is_open())
        .map(Invoice::balance_due)
        .sum();

    format!(
        "{}\nOutstanding: {}\n",
        table,
        outstanding.format_with_symbol(currency_symbol)
    )
}

/// Line item rows shared by invoice and estimate detail views
pub(crate) fn format_line_items(items: &[LineItem], currency_symbol: &str) -> String {
    if items.is_empty() {
        return "  (no line items)\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "  {:>3}  {:<36} {:>8} {:>12} {:>12}\n",
        "#", "Description", "Qty", "Rate", "Amount"
    ));
    output.push_str(&format!("  {}\n", "-".repeat(75)));
    for (index, item) in items.iter().enumerate() {
        output.push_str(&format!(
            "  {:>3}  {:<36} {:>8} {:>12} {:>12}\n",
            index + 1,
            item.description,
            item.quantity.normalize(),
            item.rate.format_with_symbol(currency_symbol),
            line_amount(item).format_with_symbol(currency_symbol)
        ));
    }
    output
}

pub(crate) fn format_totals(totals: &DocumentTotals, currency_symbol: &str) -> String {
    let mut output = String::new();
    let row = |label: &str, amount: Money| {
        format!("  {:>62} {:>12}\n", label, amount.format_with_symbol(currency_symbol))
    };

    output.push_str(&row("Subtotal:", totals.subtotal));
    if !totals.discount.is_zero() {
        output.push_str(&row("Discount:", -totals.discount));
    }
    if !totals.tax.is_zero() {
        output.push_str(&row("Tax:", totals.tax));
    }
    output.push_str(&row("Total:", totals.total));
    output
}

/// Format a single invoice with its line items, totals and payments
pub fn format_invoice_details(invoice: &Invoice, client: &str, currency_symbol: &str) -> String {
    let mut output = String::new();
    let totals = invoice.totals();

    output.push_str(&format!("Invoice {}  [{}]\n", invoice.number, invoice.status));
    output.push_str(&format!("  ID:       {}\n", invoice.id));
    output.push_str(&format!("  Client:   {}\n", client));
    output.push_str(&format!("  Issued:   {}\n", invoice.issue_date));
    output.push_str(&format!("  Due:      {}\n", invoice.due_date));
    output.push_str(&format!("  Currency: {}\n", invoice.currency));
    if !invoice.discount.is_none() {
        output.push_str(&format!("  Discount: {}\n", invoice.discount));
    }
    if !invoice.tax_rate.is_zero() {
        output.push_str(&format!("  Tax rate: {}%\n", invoice.tax_rate.normalize()));
    }
    output.push('\n');

    output.push_str(&format_line_items(&invoice.line_items, currency_symbol));
    output.push('\n');
    output.push_str(&format_totals(&totals, currency_symbol));

    if !invoice.payments.is_empty() {
        output.push_str("\nPayments:\n");
        for payment in &invoice.payments {
            let reference = if payment.reference.is_empty() {
                String::new()
            } else {
                format!(" ({})", payment.reference)
            };
            output.push_str(&format!(
                "  {}  {:<14} {:>12}{}\n",
                payment.date,
                payment.method.to_string(),
                payment.amount.format_with_symbol(currency_symbol),
                reference
            ));
        }
    }

    output.push('\n');
    output.push_str(&format!(
        "  Paid:        {}\n",
        invoice.amount_paid().format_with_symbol(currency_symbol)
    ));
    output.push_str(&format!(
        "  Balance due: {}\n",
        invoice.balance_due().format_with_symbol(currency_symbol)
    ));

    if !invoice.notes.is_empty() {
        output.push_str(&format!("\n  Notes: {}\n", invoice.notes));
    }

    output
}
