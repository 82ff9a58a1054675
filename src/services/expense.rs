//! Expense service
//!
//! Expense categories, recording expenses, per-category totals and billing
//! client expenses on an invoice.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::audit::EntityType;
use crate::error::{SleekError, SleekResult};
use crate::models::{
    ClientId, Expense, ExpenseCategory, ExpenseCategoryId, ExpenseId, Invoice, InvoiceId,
    LineItem, Money,
};
use crate::storage::Storage;
use crate::totals::checked_totals;

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub vendor: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub category_id: Option<ExpenseCategoryId>,
    pub client_id: Option<ClientId>,
    pub description: String,
    pub billable: bool,
}

impl NewExpense {
    pub fn new(vendor: impl Into<String>, amount: Money, date: NaiveDate) -> Self {
        Self {
            vendor: vendor.into(),
            amount,
            date,
            category_id: None,
            client_id: None,
            description: String::new(),
            billable: false,
        }
    }
}

/// Spend in one category over a period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category_id: Option<ExpenseCategoryId>,
    pub name: String,
    pub total: Money,
    pub count: usize,
}

pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create_category(&self, name: &str, color: Option<&str>) -> SleekResult<ExpenseCategory> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SleekError::Validation(
                "Category name cannot be empty".into(),
            ));
        }
        if self.storage.expense_categories.get_by_name(name)?.is_some() {
            return Err(SleekError::Duplicate {
                entity_type: "Expense category",
                identifier: name.to_string(),
            });
        }

        let mut category = ExpenseCategory::new(name);
        if let Some(color) = color {
            if !ExpenseCategory::is_valid_color(color) {
                return Err(SleekError::Validation(format!(
                    "Invalid color '{}': use #rgb or #rrggbb",
                    color
                )));
            }
            category.color = color.to_lowercase();
        }

        self.storage.expense_categories.upsert(category.clone())?;
        self.storage.expense_categories.save()?;
        self.storage.log_create(
            EntityType::ExpenseCategory,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;

        info!(category = %category.name, "expense category created");
        Ok(category)
    }

    pub fn list_categories(&self) -> SleekResult<Vec<ExpenseCategory>> {
        self.storage.expense_categories.list()
    }

    pub fn require_category(&self, identifier: &str) -> SleekResult<ExpenseCategory> {
        self.storage
            .expense_categories
            .resolve(identifier)?
            .ok_or_else(|| SleekError::expense_category_not_found(identifier))
    }

    /// Delete a category; its expenses become uncategorized
    pub fn delete_category(&self, id: ExpenseCategoryId) -> SleekResult<ExpenseCategory> {
        let category = self
            .storage
            .expense_categories
            .get(id)?
            .ok_or_else(|| SleekError::expense_category_not_found(id.to_string()))?;

        let members = self.storage.expenses.filter(|e| e.category_id == Some(id))?;
        let detached = members.len();
        for mut expense in members {
            expense.category_id = None;
            expense.updated_at = Utc::now();
            self.storage.expenses.upsert(expense)?;
        }
        if detached > 0 {
            self.storage.expenses.save()?;
        }

        self.storage.expense_categories.delete(id)?;
        self.storage.expense_categories.save()?;
        self.storage.log_delete(
            EntityType::ExpenseCategory,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;

        info!(category = %category.name, detached, "expense category deleted");
        Ok(category)
    }

    pub fn create(&self, input: NewExpense) -> SleekResult<Expense> {
        let vendor = input.vendor.trim();
        if vendor.is_empty() {
            return Err(SleekError::Validation("Vendor cannot be empty".into()));
        }
        if !input.amount.is_positive() {
            return Err(SleekError::Validation(format!(
                "Expense amount must be positive, got {}",
                input.amount
            )));
        }
        if let Some(category) = input.category_id {
            if !self.storage.expense_categories.exists(category)? {
                return Err(SleekError::expense_category_not_found(category.to_string()));
            }
        }
        if let Some(client) = input.client_id {
            if !self.storage.clients.exists(client)? {
                return Err(SleekError::client_not_found(client.to_string()));
            }
        }
        if input.billable && input.client_id.is_none() {
            return Err(SleekError::Validation(
                "A billable expense needs a client".into(),
            ));
        }

        let mut expense = Expense::new(vendor, input.amount, input.date);
        expense.category_id = input.category_id;
        expense.client_id = input.client_id;
        expense.description = input.description.trim().to_string();
        expense.billable = input.billable;

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;
        self.storage.log_create(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.vendor.clone()),
            &expense,
        )?;

        debug!(expense = %expense.id, amount = %expense.amount, "expense recorded");
        Ok(expense)
    }

    pub fn list(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        category: Option<ExpenseCategoryId>,
    ) -> SleekResult<Vec<Expense>> {
        self.storage.expenses.list(from, to, category)
    }

    pub fn delete(&self, id: ExpenseId) -> SleekResult<Expense> {
        let expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or_else(|| SleekError::expense_not_found(id.to_string()))?;
        if expense.is_invoiced() {
            return Err(SleekError::InvalidState(
                "Expense is billed on an invoice".into(),
            ));
        }

        self.storage.expenses.delete(id)?;
        self.storage.expenses.save()?;
        self.storage.log_delete(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.vendor.clone()),
            &expense,
        )?;
        Ok(expense)
    }

    /// Totals per category for a date range, largest first
    pub fn totals_by_category(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> SleekResult<Vec<CategoryTotal>> {
        let names: HashMap<ExpenseCategoryId, String> = self
            .storage
            .expense_categories
            .get_all()?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let mut totals: HashMap<Option<ExpenseCategoryId>, (Money, usize)> = HashMap::new();
        for expense in self.storage.expenses.list(from, to, None)? {
            // An id whose category is gone counts as uncategorized
            let key = expense.category_id.filter(|id| names.contains_key(id));
            let entry = totals.entry(key).or_insert((Money::zero(), 0));
            entry.0 += expense.amount;
            entry.1 += 1;
        }

        let mut result: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category_id, (total, count))| CategoryTotal {
                name: category_id
                    .and_then(|id| names.get(&id).cloned())
                    .unwrap_or_else(|| "Uncategorized".to_string()),
                category_id,
                total,
                count,
            })
            .collect();
        result.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
        Ok(result)
    }

    /// Add the client's unbilled billable expenses to a draft invoice as line
    /// items and mark them invoiced
    pub fn bill_to_invoice(&self, invoice_id: InvoiceId) -> SleekResult<(Invoice, Vec<Expense>)> {
        let before = self
            .storage
            .invoices
            .get(invoice_id)?
            .ok_or_else(|| SleekError::invoice_not_found(invoice_id.to_string()))?;
        if !before.status.is_editable() {
            return Err(SleekError::InvalidState(format!(
                "Invoice {} is {}; only drafts can take expenses",
                before.number, before.status
            )));
        }

        let expenses = self.storage.expenses.unbilled_for(before.client_id)?;
        if expenses.is_empty() {
            return Ok((before, expenses));
        }

        let mut invoice = before.clone();
        for expense in &expenses {
            let description = if expense.description.is_empty() {
                format!("{} ({})", expense.vendor, expense.date)
            } else {
                format!("{}: {}", expense.vendor, expense.description)
            };
            invoice
                .line_items
                .push(LineItem::new(description, Decimal::ONE, expense.amount));
        }
        checked_totals(&invoice.line_items, invoice.tax_rate, invoice.discount)?;
        invoice.updated_at = Utc::now();

        let now = Utc::now();
        let billed: Vec<Expense> = expenses
            .into_iter()
            .map(|mut e| {
                e.invoice_id = Some(invoice.id);
                e.updated_at = now;
                e
            })
            .collect();
        for expense in &billed {
            self.storage.expenses.upsert(expense.clone())?;
        }
        self.storage.expenses.save()?;

        self.storage.invoices.upsert(invoice.clone())?;
        self.storage.invoices.save()?;
        self.storage.log_update(
            EntityType::Invoice,
            invoice.id.to_string(),
            Some(invoice.number.clone()),
            &before,
            &invoice,
        )?;

        info!(invoice = %invoice.number, expenses = billed.len(), "expenses billed");
        Ok((invoice, billed))
    }
}
