//! Invoice persistence (invoices.json)

use crate::error::SleekError;
use crate::models::{ClientId, Invoice, InvoiceId, InvoiceStatus};

use super::repository::{JsonRepository, Record};

impl Record for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> InvoiceId {
        self.id
    }
}

pub type InvoiceRepository = JsonRepository<Invoice>;

impl JsonRepository<Invoice> {
    /// Invoices ordered by issue date then number, newest last
    pub fn list(
        &self,
        client: Option<ClientId>,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>, SleekError> {
        let mut invoices = self.filter(|i| {
            client.map_or(true, |c| i.client_id == c) && status.map_or(true, |s| i.status == s)
        })?;
        invoices.sort_by(|a, b| {
            a.issue_date
                .cmp(&b.issue_date)
                .then_with(|| a.number.cmp(&b.number))
        });
        Ok(invoices)
    }

    pub fn get_by_number(&self, number: &str) -> Result<Option<Invoice>, SleekError> {
        let needle = number.trim();
        self.find(|i| i.number.eq_ignore_ascii_case(needle))
    }

    pub fn has_invoices_for(&self, client: ClientId) -> Result<bool, SleekError> {
        self.any(|i| i.client_id == client)
    }

    /// Highest numeric suffix among numbers of the form `{prefix}-{n}`
    pub fn max_sequence(&self, prefix: &str) -> Result<u32, SleekError> {
        Ok(self
            .read()?
            .values()
            .filter_map(|i| super::sequence_of(&i.number, prefix))
            .max()
            .unwrap_or(0))
    }

    /// Resolve by invoice number, then short or full id
    pub fn resolve(&self, identifier: &str) -> Result<Option<Invoice>, SleekError> {
        if let Some(invoice) = self.get_by_number(identifier)? {
            return Ok(Some(invoice));
        }
        if let Ok(id) = identifier.parse::<InvoiceId>() {
            if let Some(invoice) = self.get(id)? {
                return Ok(Some(invoice));
            }
        }
        self.find_unique(identifier, |i| i.id.matches_short(identifier))
    }
}
