//! User settings for SleekInvoices
//!
//! Business defaults (currency, numbering, payment terms, tax), image upload
//! limits and encryption parameters, persisted as `config.json`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::paths::SleekPaths;
use crate::crypto::key_derivation::KeyDerivationParams;
use crate::error::SleekError;

/// Limits and quality used when accepting logo/receipt uploads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
    /// Raster images are scaled down to fit this many pixels on their long edge
    pub max_dimension: u32,
    /// JPEG re-encode quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: 5 * 1024 * 1024,
            max_dimension: 2048,
            jpeg_quality: 82,
        }
    }
}

/// Encryption settings for stored secrets
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EncryptionSettings {
    /// Argon2 parameters used when the key comes from a passphrase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_params: Option<KeyDerivationParams>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Name printed on invoices and estimates
    #[serde(default)]
    pub business_name: String,

    /// ISO 4217 code stored on new documents
    #[serde(default = "default_currency_code")]
    pub currency_code: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default = "default_invoice_prefix")]
    pub invoice_prefix: String,

    #[serde(default = "default_estimate_prefix")]
    pub estimate_prefix: String,

    /// Days between issue date and due date
    #[serde(default = "default_payment_terms")]
    pub payment_terms_days: u32,

    /// Days an estimate stays valid
    #[serde(default = "default_estimate_valid_days")]
    pub estimate_valid_days: u32,

    /// Tax rate in percent applied to new documents
    #[serde(default)]
    pub default_tax_rate: Decimal,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default)]
    pub images: ImageSettings,

    #[serde(default)]
    pub encryption: EncryptionSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency_code() -> String {
    "USD".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_invoice_prefix() -> String {
    "INV".to_string()
}

fn default_estimate_prefix() -> String {
    "EST".to_string()
}

fn default_payment_terms() -> u32 {
    30
}

fn default_estimate_valid_days() -> u32 {
    30
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

/// Longest payment term or estimate validity period, about ten years
pub const MAX_TERM_DAYS: u32 = 3650;

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            business_name: String::new(),
            currency_code: default_currency_code(),
            currency_symbol: default_currency_symbol(),
            invoice_prefix: default_invoice_prefix(),
            estimate_prefix: default_estimate_prefix(),
            payment_terms_days: default_payment_terms(),
            estimate_valid_days: default_estimate_valid_days(),
            default_tax_rate: Decimal::ZERO,
            date_format: default_date_format(),
            images: ImageSettings::default(),
            encryption: EncryptionSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist yet
    pub fn load_or_create(paths: &SleekPaths) -> Result<Self, SleekError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| SleekError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| SleekError::Config(format!("Failed to parse settings file: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SleekPaths) -> Result<(), SleekError> {
        self.validate()?;
        crate::storage::write_json_atomic(paths.settings_file(), self)
    }

    /// Reject settings that would produce broken documents
    pub fn validate(&self) -> Result<(), SleekError> {
        if self.invoice_prefix.trim().is_empty() || self.estimate_prefix.trim().is_empty() {
            return Err(SleekError::Config("Document prefixes cannot be empty".into()));
        }
        if self.default_tax_rate < Decimal::ZERO || self.default_tax_rate > Decimal::ONE_HUNDRED {
            return Err(SleekError::Config(format!(
                "Default tax rate must be between 0 and 100, got {}",
                self.default_tax_rate
            )));
        }
        if self.payment_terms_days > MAX_TERM_DAYS || self.estimate_valid_days > MAX_TERM_DAYS {
            return Err(SleekError::Config(format!(
                "Payment terms and estimate validity cannot exceed {} days",
                MAX_TERM_DAYS
            )));
        }
        if !(1..=100).contains(&self.images.jpeg_quality) {
            return Err(SleekError::Config(format!(
                "JPEG quality must be between 1 and 100, got {}",
                self.images.jpeg_quality
            )));
        }
        if self.images.max_dimension == 0 || self.images.max_upload_bytes == 0 {
            return Err(SleekError::Config("Image limits must be positive".into()));
        }
        Ok(())
    }
}
