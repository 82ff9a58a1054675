//! Service layer for SleekInvoices
//!
//! Services sit between the CLI and storage: they validate input, enforce
//! status rules, persist changes and write the audit trail.

pub mod client;
pub mod estimate;
pub mod expense;
pub mod invoice;

pub use client::{ClientChanges, ClientImportOutcome, ClientService, NewClient};
pub use estimate::{EstimateService, NewEstimate};
pub use expense::{CategoryTotal, ExpenseService, NewExpense};
pub use invoice::{InvoiceService, NewInvoice};
