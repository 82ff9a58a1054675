//! Invoice and estimate totals
//!
//! Totals are always computed in the same order:
//!
//! ```text
//! subtotal       = Σ round(quantity × rate)
//! discount       = percentage of subtotal, or a fixed amount (clamped to subtotal)
//! after_discount = subtotal - discount
//! tax            = round(after_discount × tax_rate / 100)
//! total          = after_discount + tax
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{SleekError, SleekResult};
use crate::models::{Discount, LineItem, Money};

/// Largest quantity accepted on a line item
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Largest unit rate accepted on a line item (1,000,000,000.00)
pub const MAX_RATE: Money = Money::from_cents(100_000_000_000);

/// Largest document total that can be stored (1,000,000,000,000.00)
pub const MAX_DOCUMENT_TOTAL: Money = Money::from_cents(100_000_000_000_000);

/// Computed totals for an invoice or estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

impl DocumentTotals {
    /// Subtotal minus discount, the base tax is charged on
    pub fn taxable(&self) -> Money {
        self.subtotal - self.discount
    }
}

/// Amount for a single line, rounded to the cent. Negative or overflowing
/// lines count as zero.
pub fn line_amount(item: &LineItem) -> Money {
    match item.rate.multiply(item.quantity) {
        Some(amount) if !amount.is_negative() => amount,
        _ => Money::zero(),
    }
}

/// Calculate document totals from line items, a tax rate in percent, and a
/// discount
///
/// Amounts saturate instead of overflowing. Stored documents are checked with
/// [`checked_totals`] first, so they never get near that point.
pub fn calculate_totals(items: &[LineItem], tax_rate: Decimal, discount: Discount) -> DocumentTotals {
    let subtotal: Money = items.iter().map(line_amount).sum();
    totals_from_subtotal(subtotal, tax_rate, discount)
}

/// Like [`calculate_totals`], but a line or sum that does not fit, or a total
/// above [`MAX_DOCUMENT_TOTAL`], is a validation error
pub fn checked_totals(
    items: &[LineItem],
    tax_rate: Decimal,
    discount: Discount,
) -> SleekResult<DocumentTotals> {
    let too_large = || {
        SleekError::Validation(format!(
            "Document total exceeds the maximum of {}",
            MAX_DOCUMENT_TOTAL
        ))
    };

    let mut subtotal = Money::zero();
    for item in items {
        let amount = item.rate.multiply(item.quantity).ok_or_else(too_large)?;
        if !amount.is_negative() {
            subtotal = subtotal.checked_add(amount).ok_or_else(too_large)?;
        }
    }

    let totals = totals_from_subtotal(subtotal, tax_rate, discount);
    if subtotal > MAX_DOCUMENT_TOTAL || totals.total > MAX_DOCUMENT_TOTAL {
        return Err(too_large());
    }
    Ok(totals)
}

fn totals_from_subtotal(subtotal: Money, tax_rate: Decimal, discount: Discount) -> DocumentTotals {
    let discount_amount = match discount {
        Discount::None => Money::zero(),
        Discount::Percentage(pct) => {
            let pct = pct.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
            subtotal.percentage(pct).unwrap_or(subtotal)
        }
        Discount::Fixed(amount) => {
            if amount.is_negative() {
                Money::zero()
            } else {
                amount.min(subtotal)
            }
        }
    };

    let after_discount = subtotal - discount_amount;
    let rate = tax_rate.max(Decimal::ZERO);
    let tax = after_discount.percentage(rate).unwrap_or_default();

    DocumentTotals {
        subtotal,
        discount: discount_amount,
        tax,
        total: after_discount + tax,
    }
}

/// Reject tax rates and discounts a user should never be able to store
pub fn validate_rates(tax_rate: Decimal, discount: Discount) -> SleekResult<()> {
    if tax_rate < Decimal::ZERO || tax_rate > Decimal::ONE_HUNDRED {
        return Err(SleekError::Validation(format!(
            "Tax rate must be between 0 and 100, got {}",
            tax_rate
        )));
    }

    match discount {
        Discount::Percentage(pct) if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED => {
            Err(SleekError::Validation(format!(
                "Discount percentage must be between 0 and 100, got {}",
                pct
            )))
        }
        Discount::Fixed(amount) if amount.is_negative() => Err(SleekError::Validation(
            "Fixed discount cannot be negative".into(),
        )),
        _ => Ok(()),
    }
}

/// Validate a single line item before it is stored
pub fn validate_line_item(item: &LineItem) -> SleekResult<()> {
    if item.description.trim().is_empty() {
        return Err(SleekError::Validation(
            "Line item description cannot be empty".into(),
        ));
    }
    if item.quantity <= Decimal::ZERO {
        return Err(SleekError::Validation(format!(
            "Line item quantity must be positive, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(SleekError::Validation(format!(
            "Line item quantity cannot exceed {}, got {}",
            MAX_QUANTITY, item.quantity
        )));
    }
    if item.rate.is_negative() {
        return Err(SleekError::Validation(
            "Line item rate cannot be negative".into(),
        ));
    }
    if item.rate > MAX_RATE {
        return Err(SleekError::Validation(format!(
            "Line item rate cannot exceed {}",
            MAX_RATE
        )));
    }
    Ok(())
}
