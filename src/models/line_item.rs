//! Line items and discounts shared by invoices and estimates

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// One billable row: quantity × rate = amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,

    /// Quantity, may be fractional (hours, kilograms, ...)
    pub quantity: Decimal,

    /// Price per unit
    pub rate: Money,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: Decimal, rate: Money) -> Self {
        Self {
            description: description.into(),
            quantity,
            rate,
        }
    }

    /// Convenience constructor for whole-number quantities
    pub fn units(description: impl Into<String>, quantity: i64, rate: Money) -> Self {
        Self::new(description, Decimal::from(quantity), rate)
    }
}

/// Discount applied to a document subtotal before tax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Discount {
    #[default]
    None,
    /// Percentage of the subtotal (0-100)
    Percentage(Decimal),
    /// Fixed amount off the subtotal
    Fixed(Money),
}

impl Discount {
    /// Parse "5%" as a percentage and "25.00" as a fixed amount
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() || s == "0" {
            return Some(Self::None);
        }
        if let Some(pct) = s.strip_suffix('%') {
            return pct.trim().parse::<Decimal>().ok().map(Self::Percentage);
        }
        Money::parse(s).ok().map(Self::Fixed)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Percentage(p) => write!(f, "{}%", p.normalize()),
            Self::Fixed(m) => write!(f, "{}", m),
        }
    }
}
