//! Reports module for SleekInvoices
//!
//! Provides the business summary: receivables, collections and expenses
//! over a date range.

pub mod summary;

pub use summary::BusinessSummary;
