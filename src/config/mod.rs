//! Configuration module for SleekInvoices
//!
//! - Data directory resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::SleekPaths;
pub use settings::{ImageSettings, Settings};
