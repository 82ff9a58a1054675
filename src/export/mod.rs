//! Export module for SleekInvoices
//!
//! CSV export of clients (import-compatible columns) and invoices.

pub mod csv;

pub use self::csv::{export_clients_csv, export_invoices_csv};
