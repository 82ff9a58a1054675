//! Storage layer for SleekInvoices
//!
//! One JSON file per entity collection under `data/`, each written with an
//! atomic temp-file rename. `Storage` bundles the repositories with the
//! audit logger so services can persist and record a change in one place.

pub mod clients;
pub mod estimates;
pub mod expenses;
pub mod file_io;
pub mod init;
pub mod invoices;
pub mod repository;

pub use clients::ClientRepository;
pub use estimates::EstimateRepository;
pub use expenses::{ExpenseCategoryRepository, ExpenseRepository};
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use invoices::InvoiceRepository;
pub use repository::{JsonRepository, Record};

use serde::Serialize;
use tracing::debug;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::SleekPaths;
use crate::error::SleekError;

/// Parse the numeric suffix of a document number like `INV-0042`
pub(crate) fn sequence_of(number: &str, prefix: &str) -> Option<u32> {
    let rest = number.strip_prefix(prefix)?.strip_prefix('-')?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

/// Access point for every repository and the audit log
pub struct Storage {
    paths: SleekPaths,
    pub clients: ClientRepository,
    pub invoices: InvoiceRepository,
    pub estimates: EstimateRepository,
    pub expenses: ExpenseRepository,
    pub expense_categories: ExpenseCategoryRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a storage handle without reading anything from disk
    pub fn new(paths: SleekPaths) -> Result<Self, SleekError> {
        paths.ensure_directories()?;

        Ok(Self {
            clients: ClientRepository::new(paths.clients_file()),
            invoices: InvoiceRepository::new(paths.invoices_file()),
            estimates: EstimateRepository::new(paths.estimates_file()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            expense_categories: ExpenseCategoryRepository::new(paths.expense_categories_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Create a storage handle and load every collection
    pub fn open(paths: SleekPaths) -> Result<Self, SleekError> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    pub fn paths(&self) -> &SleekPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn load_all(&self) -> Result<(), SleekError> {
        self.clients.load()?;
        self.invoices.load()?;
        self.estimates.load()?;
        self.expenses.load()?;
        self.expense_categories.load()?;
        debug!(base = %self.paths.base_dir().display(), "loaded all collections");
        Ok(())
    }

    pub fn save_all(&self) -> Result<(), SleekError> {
        self.clients.save()?;
        self.invoices.save()?;
        self.estimates.save()?;
        self.expenses.save()?;
        self.expense_categories.save()?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        label: Option<String>,
        entity: &T,
    ) -> Result<(), SleekError> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, label, entity))
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        label: Option<String>,
        before: &T,
        after: &T,
    ) -> Result<(), SleekError> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            label,
            before,
            after,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        label: Option<String>,
        entity: &T,
    ) -> Result<(), SleekError> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, label, entity))
    }
}
