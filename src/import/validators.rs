//! Field format checks shared by CSV import and client editing

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid EMAIL_REGEX pattern"));

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9\s\-().]{7,20}$").expect("Invalid PHONE_REGEX pattern"));

static VAT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}[A-Z0-9]{2,13}$").expect("Invalid VAT_REGEX pattern"));

/// Fewest digits a phone number may contain
const MIN_PHONE_DIGITS: usize = 7;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

pub fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    PHONE_REGEX.is_match(phone)
        && phone.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS
}

/// Canonical VAT form: whitespace removed, uppercased
pub fn normalize_vat(vat: &str) -> String {
    vat.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Checks the normalized form, so `de 123 456 789` is accepted
pub fn is_valid_vat(vat: &str) -> bool {
    VAT_REGEX.is_match(&normalize_vat(vat))
}
