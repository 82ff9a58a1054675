//! Expense display formatting

use std::collections::HashMap;

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::{Expense, ExpenseCategory, ExpenseCategoryId, Money};

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Billing")]
    billing: &'static str,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Color")]
    color: String,
}

fn billing_label(expense: &Expense) -> &'static str {
    if expense.is_invoiced() {
        "Invoiced"
    } else if expense.billable {
        "Billable"
    } else {
        ""
    }
}

/// Format expenses as a table with a total row
pub fn format_expense_list(
    expenses: &[Expense],
    categories: &[ExpenseCategory],
    currency_symbol: &str,
) -> String {
    if expenses.is_empty() {
        return "No expenses found.".to_string();
    }

    let names: HashMap<ExpenseCategoryId, &str> = categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let rows = expenses.iter().map(|expense| ExpenseRow {
        id: expense.id.to_string(),
        date: expense.date.to_string(),
        vendor: expense.vendor.clone(),
        category: expense
            .category_id
            .and_then(|id| names.get(&id).copied())
            .unwrap_or("")
            .to_string(),
        amount: expense.amount.format_with_symbol(currency_symbol),
        billing: billing_label(expense),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .modify(Columns::single(4), Alignment::right());

    let total: Money = expenses.iter().map(|e| e.amount).sum();
    format!(
        "{}\nTotal: {} ({} expense(s))\n",
        table,
        total.format_with_symbol(currency_symbol),
        expenses.len()
    )
}

pub fn format_category_list(categories: &[ExpenseCategory]) -> String {
    if categories.is_empty() {
        return "No expense categories found.".to_string();
    }

    let rows = categories.iter().map(|c| CategoryRow {
        name: c.name.clone(),
        color: c.color.clone(),
    });
    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}
