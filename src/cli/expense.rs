//! Expense CLI commands

use clap::Subcommand;

use super::args::{parse_date, parse_date_or_today, parse_money};
use crate::config::Settings;
use crate::display::{format_category_list, format_expense_list};
use crate::error::{SleekError, SleekResult};
use crate::models::ExpenseId;
use crate::services::{ClientService, ExpenseService, NewExpense};
use crate::storage::Storage;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense
    Add {
        /// Who was paid
        vendor: String,
        /// Amount, e.g. "42.50"
        amount: String,
        /// Expense date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// Client the expense was incurred for
        #[arg(long)]
        client: Option<String>,
        /// Bill this expense to the client on their next invoice
        #[arg(short, long)]
        billable: bool,
        #[arg(long)]
        description: Option<String>,
    },
    /// List expenses, newest first
    List {
        /// From date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// To date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Category name or ID
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Delete an expense that has not been invoiced
    Delete {
        /// Expense ID
        expense: String,
    },
    /// Create an expense category
    CategoryAdd {
        name: String,
        /// Display color, #rgb or #rrggbb
        #[arg(long)]
        color: Option<String>,
    },
    /// List expense categories
    CategoryList,
    /// Delete a category (its expenses become uncategorized)
    CategoryDelete {
        /// Category name or ID
        category: String,
    },
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> SleekResult<()> {
    let service = ExpenseService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        ExpenseCommands::Add {
            vendor,
            amount,
            date,
            category,
            client,
            billable,
            description,
        } => {
            let mut input = NewExpense::new(
                vendor,
                parse_money(&amount)?,
                parse_date_or_today(date.as_deref())?,
            );
            if let Some(category) = category.as_deref() {
                input.category_id = Some(service.require_category(category)?.id);
            }
            if let Some(client) = client.as_deref() {
                input.client_id = Some(ClientService::new(storage).require(client)?.id);
            }
            input.billable = billable;
            input.description = description.unwrap_or_default();

            let expense = service.create(input)?;
            println!(
                "Recorded expense: {} {} on {}",
                expense.vendor,
                expense.amount.format_with_symbol(symbol),
                expense.date
            );
            println!("  ID: {}", expense.id);
        }

        ExpenseCommands::List { from, to, category } => {
            let from = from.as_deref().map(parse_date).transpose()?;
            let to = to.as_deref().map(parse_date).transpose()?;
            let category = match category.as_deref() {
                Some(c) => Some(service.require_category(c)?.id),
                None => None,
            };

            let expenses = service.list(from, to, category)?;
            let categories = service.list_categories()?;
            print!("{}", format_expense_list(&expenses, &categories, symbol));
        }

        ExpenseCommands::Delete { expense } => {
            let id = storage
                .expenses
                .resolve(&expense)?
                .map(|e| e.id)
                .ok_or_else(|| SleekError::expense_not_found(&expense))?;
            let deleted: ExpenseId = service.delete(id)?.id;
            println!("Deleted expense {}", deleted);
        }

        ExpenseCommands::CategoryAdd { name, color } => {
            let category = service.create_category(&name, color.as_deref())?;
            println!("Created category: {} ({})", category.name, category.color);
        }

        ExpenseCommands::CategoryList => {
            print!("{}", format_category_list(&service.list_categories()?));
        }

        ExpenseCommands::CategoryDelete { category } => {
            let found = service.require_category(&category)?;
            let deleted = service.delete_category(found.id)?;
            println!("Deleted category: {}", deleted.name);
        }
    }

    Ok(())
}
