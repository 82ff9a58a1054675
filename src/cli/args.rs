//! Parsing helpers shared by the command handlers

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{SleekError, SleekResult};
use crate::models::{ClientId, Discount, Money};
use crate::storage::Storage;

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` date
pub(crate) fn parse_date(date_str: &str) -> SleekResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|_| {
        SleekError::Validation(format!(
            "Invalid date format: '{}'. Use YYYY-MM-DD",
            date_str
        ))
    })
}

/// Parse a date string or return today's date
pub(crate) fn parse_date_or_today(date_str: Option<&str>) -> SleekResult<NaiveDate> {
    date_str.map_or_else(|| Ok(today()), parse_date)
}

pub(crate) fn parse_money(amount: &str) -> SleekResult<Money> {
    Money::parse(amount).map_err(|e| {
        SleekError::Validation(format!(
            "Invalid amount: '{}'. Use a format like '1250.00'. Error: {}",
            amount, e
        ))
    })
}

/// Parse a plain decimal such as a quantity or a tax percentage
pub(crate) fn parse_decimal(value: &str, what: &str) -> SleekResult<Decimal> {
    Decimal::from_str(value.trim().trim_end_matches('%'))
        .map_err(|_| SleekError::Validation(format!("Invalid {}: '{}'", what, value)))
}

pub(crate) fn parse_discount(value: &str) -> SleekResult<Discount> {
    Discount::parse(value).ok_or_else(|| {
        SleekError::Validation(format!(
            "Invalid discount: '{}'. Use '5%' for a percentage or '25.00' for a fixed amount",
            value
        ))
    })
}

/// Client id to name, for list views
pub(crate) fn client_names(storage: &Storage) -> SleekResult<HashMap<ClientId, String>> {
    Ok(storage
        .clients
        .get_all()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect())
}
