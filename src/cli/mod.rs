//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

mod args;
pub mod client;
pub mod config;
pub mod estimate;
pub mod expense;
pub mod export;
pub mod image;
pub mod invoice;
pub mod report;
pub mod secret;

pub use client::{handle_client_command, ClientCommands};
pub use config::{handle_config_command, ConfigArgs};
pub use estimate::{handle_estimate_command, EstimateCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportCommands};
pub use image::{handle_image_command, ImageCommands};
pub use invoice::{handle_invoice_command, InvoiceCommands};
pub use report::{handle_report_command, ReportCommands};
pub use secret::{handle_secret_command, SecretCommands};
