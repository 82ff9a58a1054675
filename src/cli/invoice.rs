//! Invoice CLI commands

use clap::Subcommand;

use super::args::{
    client_names, parse_date, parse_date_or_today, parse_decimal, parse_discount, parse_money,
};
use crate::config::Settings;
use crate::display::{format_invoice_details, format_invoice_list};
use crate::error::{SleekError, SleekResult};
use crate::models::{InvoiceStatus, LineItem, PaymentMethod};
use crate::services::{ClientService, ExpenseService, InvoiceService, NewInvoice};
use crate::storage::Storage;

/// Invoice subcommands
#[derive(Subcommand)]
pub enum InvoiceCommands {
    /// Create a draft invoice
    Create {
        /// Client name or ID
        client: String,
        /// Issue date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Due date (YYYY-MM-DD), defaults to the configured payment terms
        #[arg(long)]
        due: Option<String>,
        /// Tax rate in percent, defaults to the configured rate
        #[arg(short, long)]
        tax: Option<String>,
        /// Discount, "5%" or a fixed amount like "25.00"
        #[arg(long)]
        discount: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
        /// Add the client's unbilled billable expenses as line items
        #[arg(long)]
        bill_expenses: bool,
    },
    /// Add a line item to a draft invoice
    AddItem {
        /// Invoice number or ID
        invoice: String,
        description: String,
        /// Quantity (decimals allowed, e.g. 1.5 hours)
        quantity: String,
        /// Unit rate, e.g. "120.00"
        rate: String,
    },
    /// Remove a line item from a draft invoice
    RemoveItem {
        /// Invoice number or ID
        invoice: String,
        /// Line number as shown by `invoice show`
        line: usize,
    },
    /// Change tax rate and discount on a draft invoice
    Pricing {
        /// Invoice number or ID
        invoice: String,
        #[arg(short, long)]
        tax: Option<String>,
        #[arg(long)]
        discount: Option<String>,
    },
    /// Show an invoice
    Show {
        /// Invoice number or ID
        invoice: String,
    },
    /// List invoices
    List {
        /// Only this client's invoices
        #[arg(short, long)]
        client: Option<String>,
        /// Only invoices with this status
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Mark a draft invoice as sent
    Send {
        /// Invoice number or ID
        invoice: String,
    },
    /// Record a payment
    Pay {
        /// Invoice number or ID
        invoice: String,
        /// Amount paid
        amount: String,
        /// Payment date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// bank-transfer, card, cash, check, crypto or other
        #[arg(short, long, default_value = "bank-transfer")]
        method: String,
        /// Bank or processor reference
        #[arg(short, long)]
        reference: Option<String>,
    },
    /// Cancel an unpaid invoice
    Cancel {
        /// Invoice number or ID
        invoice: String,
    },
    /// Delete a draft or canceled invoice
    Delete {
        /// Invoice number or ID
        invoice: String,
    },
}

/// Handle an invoice command
pub fn handle_invoice_command(
    storage: &Storage,
    settings: &Settings,
    cmd: InvoiceCommands,
) -> SleekResult<()> {
    let service = InvoiceService::new(storage, settings);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        InvoiceCommands::Create {
            client,
            date,
            due,
            tax,
            discount,
            notes,
            bill_expenses,
        } => {
            let client = ClientService::new(storage).require(&client)?;

            let mut input = NewInvoice::new(client.id, parse_date_or_today(date.as_deref())?);
            input.due_date = due.as_deref().map(parse_date).transpose()?;
            input.tax_rate = tax
                .as_deref()
                .map(|t| parse_decimal(t, "tax rate"))
                .transpose()?;
            if let Some(discount) = discount.as_deref() {
                input.discount = parse_discount(discount)?;
            }
            input.notes = notes.unwrap_or_default();

            let mut invoice = service.create(input)?;
            println!("Created invoice {} for {}", invoice.number, client.name);
            println!("  Due: {}", invoice.due_date);

            if bill_expenses {
                let (updated, billed) = ExpenseService::new(storage).bill_to_invoice(invoice.id)?;
                println!("  Billed {} expense(s)", billed.len());
                invoice = updated;
            }
            println!("  ID: {}", invoice.id);
        }

        InvoiceCommands::AddItem {
            invoice,
            description,
            quantity,
            rate,
        } => {
            let found = service.require(&invoice)?;
            let item = LineItem::new(
                description,
                parse_decimal(&quantity, "quantity")?,
                parse_money(&rate)?,
            );
            let updated = service.add_line_item(found.id, item)?;
            println!(
                "Added item to {}. New total: {}",
                updated.number,
                updated.total().format_with_symbol(symbol)
            );
        }

        InvoiceCommands::RemoveItem { invoice, line } => {
            if line == 0 {
                return Err(SleekError::Validation("Line numbers start at 1".into()));
            }
            let found = service.require(&invoice)?;
            let updated = service.remove_line_item(found.id, line - 1)?;
            println!(
                "Removed line {} from {}. New total: {}",
                line,
                updated.number,
                updated.total().format_with_symbol(symbol)
            );
        }

        InvoiceCommands::Pricing {
            invoice,
            tax,
            discount,
        } => {
            let found = service.require(&invoice)?;
            let tax_rate = match tax.as_deref() {
                Some(t) => parse_decimal(t, "tax rate")?,
                None => found.tax_rate,
            };
            let discount = match discount.as_deref() {
                Some(d) => parse_discount(d)?,
                None => found.discount,
            };
            let updated = service.set_pricing(found.id, tax_rate, discount)?;
            println!(
                "Updated {}. New total: {}",
                updated.number,
                updated.total().format_with_symbol(symbol)
            );
        }

        InvoiceCommands::Show { invoice } => {
            let found = service.require(&invoice)?;
            let client = storage
                .clients
                .get(found.client_id)?
                .map(|c| c.name)
                .unwrap_or_else(|| found.client_id.to_string());
            print!("{}", format_invoice_details(&found, &client, symbol));
        }

        InvoiceCommands::List { client, status } => {
            let client_id = match client.as_deref() {
                Some(c) => Some(ClientService::new(storage).require(c)?.id),
                None => None,
            };
            let status = status
                .as_deref()
                .map(|s| {
                    InvoiceStatus::parse(s).ok_or_else(|| {
                        SleekError::Validation(format!(
                            "Invalid status: '{}'. Valid: draft, sent, partial, paid, overdue, canceled",
                            s
                        ))
                    })
                })
                .transpose()?;

            let invoices = service.list(client_id, status)?;
            print!(
                "{}",
                format_invoice_list(&invoices, &client_names(storage)?, symbol)
            );
        }

        InvoiceCommands::Send { invoice } => {
            let found = service.require(&invoice)?;
            let sent = service.mark_sent(found.id)?;
            println!(
                "Invoice {} marked as sent ({} due {})",
                sent.number,
                sent.total().format_with_symbol(symbol),
                sent.due_date
            );
        }

        InvoiceCommands::Pay {
            invoice,
            amount,
            date,
            method,
            reference,
        } => {
            let found = service.require(&invoice)?;
            let method = PaymentMethod::parse(&method).ok_or_else(|| {
                SleekError::Validation(format!(
                    "Invalid payment method: '{}'. Valid: bank-transfer, card, cash, check, crypto, other",
                    method
                ))
            })?;
            let updated = service.record_payment(
                found.id,
                parse_money(&amount)?,
                parse_date_or_today(date.as_deref())?,
                method,
                reference,
            )?;
            println!(
                "Recorded payment on {}. Status: {}, balance due: {}",
                updated.number,
                updated.status,
                updated.balance_due().format_with_symbol(symbol)
            );
        }

        InvoiceCommands::Cancel { invoice } => {
            let found = service.require(&invoice)?;
            let canceled = service.cancel(found.id)?;
            println!("Canceled invoice {}", canceled.number);
        }

        InvoiceCommands::Delete { invoice } => {
            let found = service.require(&invoice)?;
            let deleted = service.delete(found.id)?;
            println!("Deleted invoice {}", deleted.number);
        }
    }

    Ok(())
}
