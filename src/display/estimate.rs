//! Estimate display formatting

use std::collections::HashMap;

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use super::invoice::{client_name, format_line_items, format_totals};
use crate::models::{ClientId, Estimate};

#[derive(Tabled)]
struct EstimateRow {
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Issued")]
    issued: String,
    #[tabled(rename = "Expires")]
    expires: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Total")]
    total: String,
}

pub fn format_estimate_list(
    estimates: &[Estimate],
    client_names: &HashMap<ClientId, String>,
    currency_symbol: &str,
) -> String {
    if estimates.is_empty() {
        return "No estimates found.".to_string();
    }

    let rows = estimates.iter().map(|estimate| EstimateRow {
        number: estimate.number.clone(),
        client: client_name(client_names, estimate.client_id),
        issued: estimate.issue_date.to_string(),
        expires: estimate.expiry_date.to_string(),
        status: estimate.status.to_string(),
        total: estimate.totals().total.format_with_symbol(currency_symbol),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .modify(Columns::new(5..), Alignment::right());
    format!("{}\n", table)
}

pub fn format_estimate_details(
    estimate: &Estimate,
    client: &str,
    currency_symbol: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Estimate {}  [{}]\n", estimate.number, estimate.status));
    output.push_str(&format!("  ID:       {}\n", estimate.id));
    output.push_str(&format!("  Client:   {}\n", client));
    output.push_str(&format!("  Issued:   {}\n", estimate.issue_date));
    output.push_str(&format!("  Expires:  {}\n", estimate.expiry_date));
    if !estimate.discount.is_none() {
        output.push_str(&format!("  Discount: {}\n", estimate.discount));
    }
    if !estimate.tax_rate.is_zero() {
        output.push_str(&format!("  Tax rate: {}%\n", estimate.tax_rate.normalize()));
    }
    if let Some(invoice_id) = estimate.invoice_id {
        output.push_str(&format!("  Invoice:  {}\n", invoice_id));
    }
    output.push('\n');

    output.push_str(&format_line_items(&estimate.line_items, currency_symbol));
    output.push('\n');
    output.push_str(&format_totals(&estimate.totals(), currency_symbol));

    if !estimate.notes.is_empty() {
        output.push_str(&format!("\n  Notes: {}\n", estimate.notes));
    }

    output
}
