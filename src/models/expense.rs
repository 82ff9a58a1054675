//! Expense and expense category models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ClientId, ExpenseCategoryId, ExpenseId, InvoiceId};
use super::money::Money;

/// A bucket for grouping expenses in reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub id: ExpenseCategoryId,
    pub name: String,
    /// Hex color used by dashboards, e.g. "#4f46e5"
    #[serde(default = "default_color")]
    pub color: String,
    pub created_at: DateTime<Utc>,
}

fn default_color() -> String {
    "#6b7280".to_string()
}

impl ExpenseCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ExpenseCategoryId::new(),
            name: name.into(),
            color: default_color(),
            created_at: Utc::now(),
        }
    }

    /// Accepts `#rgb` and `#rrggbb`
    pub fn is_valid_color(color: &str) -> bool {
        let Some(hex) = color.strip_prefix('#') else {
            return false;
        };
        matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
    }
}

/// Money spent by the business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<ExpenseCategoryId>,

    /// Client the expense can be re-billed to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,

    pub vendor: String,
    pub amount: Money,
    pub date: NaiveDate,

    #[serde(default)]
    pub description: String,

    /// Whether the expense should be passed on to the client
    #[serde(default)]
    pub billable: bool,

    /// Invoice the expense was billed on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<InvoiceId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(vendor: impl Into<String>, amount: Money, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            category_id: None,
            client_id: None,
            vendor: vendor.into(),
            amount,
            date,
            description: String::new(),
            billable: false,
            invoice_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_invoiced(&self) -> bool {
        self.invoice_id.is_some()
    }

    /// Billable for `client` and not yet on an invoice
    pub fn is_billable_to(&self, client: ClientId) -> bool {
        self.billable && !self.is_invoiced() && self.client_id == Some(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_validation() {
        assert!(ExpenseCategory::is_valid_color("#fff"));
        assert!(ExpenseCategory::is_valid_color("#4F46E5"));
        assert!(!ExpenseCategory::is_valid_color("4f46e5"));
        assert!(!ExpenseCategory::is_valid_color("#4f46e"));
        assert!(!ExpenseCategory::is_valid_color("#gggggg"));
    }

    #[test]
    fn test_billable_to() {
        let client = ClientId::new();
        let mut expense = Expense::new(
            "Print Shop",
            Money::from_cents(4500),
            NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
        );
        assert!(!expense.is_billable_to(client));

        expense.billable = true;
        expense.client_id = Some(client);
        assert!(expense.is_billable_to(client));
        assert!(!expense.is_billable_to(ClientId::new()));

        expense.invoice_id = Some(InvoiceId::new());
        assert!(!expense.is_billable_to(client));
    }
}
