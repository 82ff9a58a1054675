//! Expense and expense category persistence

use chrono::NaiveDate;

use crate::error::SleekError;
use crate::models::{ClientId, Expense, ExpenseCategory, ExpenseCategoryId, ExpenseId};

use super::repository::{JsonRepository, Record};

impl Record for Expense {
    type Id = ExpenseId;

    fn id(&self) -> ExpenseId {
        self.id
    }
}

impl Record for ExpenseCategory {
    type Id = ExpenseCategoryId;

    fn id(&self) -> ExpenseCategoryId {
        self.id
    }
}

pub type ExpenseRepository = JsonRepository<Expense>;
pub type ExpenseCategoryRepository = JsonRepository<ExpenseCategory>;

impl JsonRepository<Expense> {
    /// Expenses in a date range (inclusive), newest first
    pub fn list(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        category: Option<ExpenseCategoryId>,
    ) -> Result<Vec<Expense>, SleekError> {
        let mut expenses = self.filter(|e| {
            from.map_or(true, |d| e.date >= d)
                && to.map_or(true, |d| e.date <= d)
                && category.map_or(true, |c| e.category_id == Some(c))
        })?;
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.vendor.cmp(&b.vendor)));
        Ok(expenses)
    }

    /// Billable expenses for a client that have not been invoiced yet
    pub fn unbilled_for(&self, client: ClientId) -> Result<Vec<Expense>, SleekError> {
        let mut expenses = self.filter(|e| e.is_billable_to(client))?;
        expenses.sort_by_key(|e| e.date);
        Ok(expenses)
    }

    pub fn resolve(&self, identifier: &str) -> Result<Option<Expense>, SleekError> {
        if let Ok(id) = identifier.parse::<ExpenseId>() {
            if let Some(expense) = self.get(id)? {
                return Ok(Some(expense));
            }
        }
        self.find_unique(identifier, |e| e.id.matches_short(identifier))
    }
}

impl JsonRepository<ExpenseCategory> {
    pub fn list(&self) -> Result<Vec<ExpenseCategory>, SleekError> {
        let mut categories = self.get_all()?;
        categories.sort_by_key(|c| c.name.to_lowercase());
        Ok(categories)
    }

    pub fn get_by_name(&self, name: &str) -> Result<Option<ExpenseCategory>, SleekError> {
        let needle = name.trim().to_lowercase();
        self.find(|c| c.name.to_lowercase() == needle)
    }

    /// Name or short id
    pub fn resolve(&self, identifier: &str) -> Result<Option<ExpenseCategory>, SleekError> {
        if let Some(category) = self.get_by_name(identifier)? {
            return Ok(Some(category));
        }
        self.find_unique(identifier, |c| c.id.matches_short(identifier))
    }
}
