//! Estimate (quote) model
//!
//! Estimates carry the same line items, tax and discount as invoices and can
//! be converted into an invoice once the client accepts.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ClientId, EstimateId, InvoiceId};
use super::line_item::{Discount, LineItem};
use crate::totals::{calculate_totals, DocumentTotals};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EstimateStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Declined,
    Expired,
    /// Turned into an invoice
    Converted,
}

impl EstimateStatus {
    /// Whether the estimate can still become an invoice
    pub fn is_convertible(&self) -> bool {
        matches!(self, Self::Sent | Self::Accepted)
    }

    /// Whether the client can still respond to it
    pub fn awaits_response(&self) -> bool {
        matches!(self, Self::Sent)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            "expired" => Some(Self::Expired),
            "converted" => Some(Self::Converted),
            _ => None,
        }
    }
}

impl fmt::Display for EstimateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "Draft"),
            Self::Sent => write!(f, "Sent"),
            Self::Accepted => write!(f, "Accepted"),
            Self::Declined => write!(f, "Declined"),
            Self::Expired => write!(f, "Expired"),
            Self::Converted => write!(f, "Converted"),
        }
    }
}

/// A priced proposal sent to a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estimate {
    pub id: EstimateId,

    /// Human-facing number, e.g. "EST-0003"
    pub number: String,

    pub client_id: ClientId,

    #[serde(default)]
    pub status: EstimateStatus,

    pub issue_date: NaiveDate,

    /// Last day the estimate is valid
    pub expiry_date: NaiveDate,

    #[serde(default)]
    pub line_items: Vec<LineItem>,

    #[serde(default)]
    pub tax_rate: Decimal,

    #[serde(default)]
    pub discount: Discount,

    #[serde(default)]
    pub notes: String,

    pub currency: String,

    /// Set once the estimate has been converted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<InvoiceId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Estimate {
    pub fn new(
        number: impl Into<String>,
        client_id: ClientId,
        issue_date: NaiveDate,
        expiry_date: NaiveDate,
        currency: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EstimateId::new(),
            number: number.into(),
            client_id,
            status: EstimateStatus::Draft,
            issue_date,
            expiry_date,
            line_items: Vec::new(),
            tax_rate: Decimal::ZERO,
            discount: Discount::None,
            notes: String::new(),
            currency: currency.into(),
            invoice_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn totals(&self) -> DocumentTotals {
        calculate_totals(&self.line_items, self.tax_rate, self.discount)
    }

    /// Whether the estimate lapsed on `today` without a response
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        matches!(self.status, EstimateStatus::Draft | EstimateStatus::Sent) && today > self.expiry_date
    }

    pub fn set_status(&mut self, status: EstimateStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
