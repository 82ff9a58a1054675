//! SleekInvoices - invoicing and small-business bookkeeping
//!
//! This library provides the core of the SleekInvoices bookkeeping system:
//! clients, invoices, estimates, payments and expenses, stored as JSON files
//! and driven by the `sleek` command-line front end.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and user settings
//! - `error`: Custom error types
//! - `models`: Core data models (clients, invoices, estimates, expenses)
//! - `totals`: Subtotal, discount, tax and total calculation
//! - `storage`: JSON file storage layer
//! - `audit`: Audit logging of every create, update and delete
//! - `services`: Business rules on top of storage
//! - `import`: CSV client import with header synonyms and row validation
//! - `export`: CSV export of clients and invoices
//! - `reports`: Business summary report
//! - `crypto`: AES-256-GCM encryption of short secrets
//! - `images`: Upload sniffing and image optimization
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `sleek` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use sleek_invoices::config::{Settings, SleekPaths};
//! use sleek_invoices::services::{ClientService, NewClient};
//! use sleek_invoices::storage::Storage;
//!
//! let paths = SleekPaths::new()?;
//! let storage = Storage::open(paths)?;
//! let client = ClientService::new(&storage).create(NewClient::named("Acme"))?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod export;
pub mod images;
pub mod import;
pub mod logging;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;
pub mod totals;

pub use error::{SleekError, SleekResult};
