//! Estimate CLI commands

use clap::Subcommand;

use super::args::{
    client_names, parse_date, parse_date_or_today, parse_decimal, parse_discount, parse_money,
};
use crate::config::Settings;
use crate::display::{format_estimate_details, format_estimate_list};
use crate::error::{SleekError, SleekResult};
use crate::models::{EstimateStatus, LineItem};
use crate::services::{ClientService, EstimateService, NewEstimate};
use crate::storage::Storage;

/// Estimate subcommands
#[derive(Subcommand)]
pub enum EstimateCommands {
    /// Create a draft estimate
    Create {
        /// Client name or ID
        client: String,
        /// Issue date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Expiry date (YYYY-MM-DD), defaults to the configured validity
        #[arg(long)]
        expires: Option<String>,
        /// Tax rate in percent
        #[arg(short, long)]
        tax: Option<String>,
        /// Discount, "5%" or a fixed amount like "25.00"
        #[arg(long)]
        discount: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Add a line item to a draft estimate
    AddItem {
        /// Estimate number or ID
        estimate: String,
        description: String,
        quantity: String,
        rate: String,
    },
    /// Show an estimate
    Show {
        /// Estimate number or ID
        estimate: String,
    },
    /// List estimates
    List {
        #[arg(short, long)]
        client: Option<String>,
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Mark a draft estimate as sent
    Send { estimate: String },
    /// Record the client's acceptance
    Accept { estimate: String },
    /// Record the client's refusal
    Decline { estimate: String },
    /// Turn a sent or accepted estimate into a draft invoice
    Convert {
        estimate: String,
        /// Invoice issue date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
}

/// Handle an estimate command
pub fn handle_estimate_command(
    storage: &Storage,
    settings: &Settings,
    cmd: EstimateCommands,
) -> SleekResult<()> {
    let service = EstimateService::new(storage, settings);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        EstimateCommands::Create {
            client,
            date,
            expires,
            tax,
            discount,
            notes,
        } => {
            let client = ClientService::new(storage).require(&client)?;

            let mut input = NewEstimate::new(client.id, parse_date_or_today(date.as_deref())?);
            input.expiry_date = expires.as_deref().map(parse_date).transpose()?;
            input.tax_rate = tax
                .as_deref()
                .map(|t| parse_decimal(t, "tax rate"))
                .transpose()?;
            if let Some(discount) = discount.as_deref() {
                input.discount = parse_discount(discount)?;
            }
            input.notes = notes.unwrap_or_default();

            let estimate = service.create(input)?;
            println!("Created estimate {} for {}", estimate.number, client.name);
            println!("  Expires: {}", estimate.expiry_date);
            println!("  ID: {}", estimate.id);
        }

        EstimateCommands::AddItem {
            estimate,
            description,
            quantity,
            rate,
        } => {
            let found = service.require(&estimate)?;
            let item = LineItem::new(
                description,
                parse_decimal(&quantity, "quantity")?,
                parse_money(&rate)?,
            );
            let updated = service.add_line_item(found.id, item)?;
            println!(
                "Added item to {}. New total: {}",
                updated.number,
                updated.totals().total.format_with_symbol(symbol)
            );
        }

        EstimateCommands::Show { estimate } => {
            let found = service.require(&estimate)?;
            let client = storage
                .clients
                .get(found.client_id)?
                .map(|c| c.name)
                .unwrap_or_else(|| found.client_id.to_string());
            print!("{}", format_estimate_details(&found, &client, symbol));
        }

        EstimateCommands::List { client, status } => {
            let client_id = match client.as_deref() {
                Some(c) => Some(ClientService::new(storage).require(c)?.id),
                None => None,
            };
            let status = status
                .as_deref()
                .map(|s| {
                    EstimateStatus::parse(s).ok_or_else(|| {
                        SleekError::Validation(format!(
                            "Invalid status: '{}'. Valid: draft, sent, accepted, declined, expired, converted",
                            s
                        ))
                    })
                })
                .transpose()?;

            let estimates = service.list(client_id, status)?;
            print!(
                "{}",
                format_estimate_list(&estimates, &client_names(storage)?, symbol)
            );
        }

        EstimateCommands::Send { estimate } => {
            let found = service.require(&estimate)?;
            let sent = service.mark_sent(found.id)?;
            println!("Estimate {} marked as sent", sent.number);
        }

        EstimateCommands::Accept { estimate } => {
            let found = service.require(&estimate)?;
            let accepted = service.accept(found.id)?;
            println!("Estimate {} accepted", accepted.number);
        }

        EstimateCommands::Decline { estimate } => {
            let found = service.require(&estimate)?;
            let declined = service.decline(found.id)?;
            println!("Estimate {} declined", declined.number);
        }

        EstimateCommands::Convert { estimate, date } => {
            let found = service.require(&estimate)?;
            let invoice =
                service.convert_to_invoice(found.id, parse_date_or_today(date.as_deref())?)?;
            println!(
                "Converted estimate {} into invoice {} ({})",
                found.number,
                invoice.number,
                invoice.total().format_with_symbol(symbol)
            );
        }
    }

    Ok(())
}
