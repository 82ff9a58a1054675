//! Custom error types for SleekInvoices
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for SleekInvoices operations
#[derive(Error, Debug)]
pub enum SleekError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Operation not allowed in the entity's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Encryption errors
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Image validation or processing errors
    #[error("Image error: {0}")]
    Image(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SleekError {
    fn not_found(entity_type: &'static str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            identifier: identifier.into(),
        }
    }

    pub fn client_not_found(identifier: impl Into<String>) -> Self {
        Self::not_found("Client", identifier)
    }

    /// Not found by invoice number or id
    pub fn invoice_not_found(identifier: impl Into<String>) -> Self {
        Self::not_found("Invoice", identifier)
    }

    pub fn estimate_not_found(identifier: impl Into<String>) -> Self {
        Self::not_found("Estimate", identifier)
    }

    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::not_found("Expense", identifier)
    }

    pub fn expense_category_not_found(identifier: impl Into<String>) -> Self {
        Self::not_found("Expense category", identifier)
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for SleekError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SleekError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for SleekError {
    fn from(err: csv::Error) -> Self {
        Self::Import(err.to_string())
    }
}

/// Result type alias for SleekInvoices operations
pub type SleekResult<T> = Result<T, SleekError>;
