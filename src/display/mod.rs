//! Display formatting for terminal output
//!
//! List views are rendered with `tabled`; detail views are plain aligned
//! text.

pub mod audit;
pub mod client;
pub mod estimate;
pub mod expense;
pub mod invoice;

pub use audit::format_audit_entries;
pub use client::{format_client_details, format_client_list, format_import_result};
pub use estimate::{format_estimate_details, format_estimate_list};
pub use expense::{format_category_list, format_expense_list};
pub use invoice::{format_invoice_details, format_invoice_list};
