//! Invoice model
//!
//! An invoice owns its line items and the payments recorded against it.
//! Payments are cascade-deleted with the invoice.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ClientId, EstimateId, InvoiceId, PaymentId};
use super::line_item::{Discount, LineItem};
use super::money::Money;
use crate::totals::{calculate_totals, DocumentTotals};

/// Lifecycle status of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    /// Some, but not all, of the total has been paid
    Partial,
    Paid,
    /// Past due date with a balance outstanding
    Overdue,
    Canceled,
}

impl InvoiceStatus {
    /// Whether the invoice still expects money
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Sent | Self::Partial | Self::Overdue)
    }

    /// Whether line items, tax and discount may still change
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "partial" => Some(Self::Partial),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            "canceled" | "cancelled" => Some(Self::Canceled),
            _ => None,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "Draft"),
            Self::Sent => write!(f, "Sent"),
            Self::Partial => write!(f, "Partial"),
            Self::Paid => write!(f, "Paid"),
            Self::Overdue => write!(f, "Overdue"),
            Self::Canceled => write!(f, "Canceled"),
        }
    }
}

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    BankTransfer,
    Card,
    Cash,
    Check,
    Crypto,
    Other,
}

impl PaymentMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "bank_transfer" | "bank" | "transfer" | "wire" => Some(Self::BankTransfer),
            "card" | "credit_card" => Some(Self::Card),
            "cash" => Some(Self::Cash),
            "check" | "cheque" => Some(Self::Check),
            "crypto" => Some(Self::Crypto),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BankTransfer => write!(f, "Bank transfer"),
            Self::Card => write!(f, "Card"),
            Self::Cash => write!(f, "Cash"),
            Self::Check => write!(f, "Check"),
            Self::Crypto => write!(f, "Crypto"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A payment received against an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub amount: Money,
    pub date: NaiveDate,
    #[serde(default)]
    pub method: PaymentMethod,
    /// External reference (transaction hash, check number, ...)
    #[serde(default)]
    pub reference: String,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(amount: Money, date: NaiveDate, method: PaymentMethod) -> Self {
        Self {
            id: PaymentId::new(),
            amount,
            date,
            method,
            reference: String::new(),
            created_at: Utc::now(),
        }
    }
}

/// An invoice issued to a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,

    /// Human-facing number, e.g. "INV-0007"
    pub number: String,

    pub client_id: ClientId,

    #[serde(default)]
    pub status: InvoiceStatus,

    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,

    #[serde(default)]
    pub line_items: Vec<LineItem>,

    /// Tax rate in percent
    #[serde(default)]
    pub tax_rate: Decimal,

    #[serde(default)]
    pub discount: Discount,

    #[serde(default)]
    pub payments: Vec<Payment>,

    #[serde(default)]
    pub notes: String,

    /// ISO currency code
    pub currency: String,

    /// Estimate this invoice was converted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate_id: Option<EstimateId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(
        number: impl Into<String>,
        client_id: ClientId,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        currency: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: InvoiceId::new(),
            number: number.into(),
            client_id,
            status: InvoiceStatus::Draft,
            issue_date,
            due_date,
            line_items: Vec::new(),
            tax_rate: Decimal::ZERO,
            discount: Discount::None,
            payments: Vec::new(),
            notes: String::new(),
            currency: currency.into(),
            estimate_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn totals(&self) -> DocumentTotals {
        calculate_totals(&self.line_items, self.tax_rate, self.discount)
    }

    pub fn total(&self) -> Money {
        self.totals().total
    }

    /// Sum of recorded payments; never above the total for a valid invoice
    pub fn amount_paid(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }

    pub fn balance_due(&self) -> Money {
        self.total() - self.amount_paid()
    }

    /// Past its due date on `today` with money still owed
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status.is_open() && today > self.due_date && self.balance_due().is_positive()
    }

    /// Add a payment. The sum of payments may never exceed the total.
    pub fn record_payment(&mut self, payment: Payment) -> Result<(), InvoiceStateError> {
        if matches!(
            self.status,
            InvoiceStatus::Draft | InvoiceStatus::Canceled | InvoiceStatus::Paid
        ) {
            return Err(InvoiceStateError::NotPayable(self.status));
        }
        if !payment.amount.is_positive() {
            return Err(InvoiceStateError::NonPositivePayment);
        }
        let balance = self.balance_due();
        if payment.amount > balance {
            return Err(InvoiceStateError::Overpayment {
                amount: payment.amount,
                balance,
            });
        }

        self.payments.push(payment);
        self.sync_payment_status();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Derive paid/partial from the recorded payments
    pub fn sync_payment_status(&mut self) {
        if self.status == InvoiceStatus::Canceled || self.status == InvoiceStatus::Draft {
            return;
        }
        let paid = self.amount_paid();
        let total = self.total();
        self.status = if total.is_positive() && paid == total {
            InvoiceStatus::Paid
        } else if paid.is_positive() {
            InvoiceStatus::Partial
        } else if self.status == InvoiceStatus::Overdue {
            InvoiceStatus::Overdue
        } else {
            InvoiceStatus::Sent
        };
    }

    pub fn set_status(&mut self, status: InvoiceStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), InvoiceStateError> {
        if self.number.trim().is_empty() {
            return Err(InvoiceStateError::EmptyNumber);
        }
        if self.due_date < self.issue_date {
            return Err(InvoiceStateError::DueBeforeIssue);
        }
        let paid = self.amount_paid();
        let total = self.total();
        if paid > total {
            return Err(InvoiceStateError::Overpayment {
                amount: paid,
                balance: total,
            });
        }
        if self.status == InvoiceStatus::Paid && paid != total {
            return Err(InvoiceStateError::PaidMismatch { paid, total });
        }
        Ok(())
    }
}

/// Invoice invariant violations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceStateError {
    EmptyNumber,
    DueBeforeIssue,
    NotPayable(InvoiceStatus),
    NonPositivePayment,
    Overpayment { amount: Money, balance: Money },
    PaidMismatch { paid: Money, total: Money },
}

impl fmt::Display for InvoiceStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyNumber => write!(f, "Invoice number cannot be empty"),
            Self::DueBeforeIssue => write!(f, "Due date cannot be before issue date"),
            Self::NotPayable(status) => {
                write!(f, "Cannot record a payment on a {} invoice", status)
            }
            Self::NonPositivePayment => write!(f, "Payment amount must be positive"),
            Self::Overpayment { amount, balance } => write!(
                f,
                "Payment of {} exceeds the balance due of {}",
                amount, balance
            ),
            Self::PaidMismatch { paid, total } => write!(
                f,
                "Invoice marked paid but {} of {} received",
                paid, total
            ),
        }
    }
}

impl std::error::Error for InvoiceStateError {}
