//! Core data models for SleekInvoices
//!
//! This module contains the bookkeeping domain: clients, invoices, estimates,
//! payments and expenses.

pub mod client;
pub mod estimate;
pub mod expense;
pub mod ids;
pub mod invoice;
pub mod line_item;
pub mod money;

pub use client::Client;
pub use estimate::{Estimate, EstimateStatus};
pub use expense::{Expense, ExpenseCategory};
pub use ids::{ClientId, EstimateId, ExpenseCategoryId, ExpenseId, InvoiceId, PaymentId};
pub use invoice::{Invoice, InvoiceStateError, InvoiceStatus, Payment, PaymentMethod};
pub use line_item::{Discount, LineItem};
pub use money::Money;
