//! Estimate service
//!
//! Estimates follow draft → sent → accepted/declined/expired, and an accepted
//! (or still outstanding) estimate can be converted into a draft invoice.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::audit::EntityType;
use crate::config::Settings;
use crate::error::{SleekError, SleekResult};
use crate::models::{
    ClientId, Discount, Estimate, EstimateId, EstimateStatus, Invoice, LineItem,
};
use crate::storage::Storage;
use crate::totals::{checked_totals, validate_line_item, validate_rates};

use super::invoice::{billable_client, days_after, format_number, state_error, InvoiceService};

#[derive(Debug, Clone)]
pub struct NewEstimate {
    pub client_id: ClientId,
    pub issue_date: NaiveDate,
    /// Defaults to the issue date plus the configured validity period
    pub expiry_date: Option<NaiveDate>,
    pub tax_rate: Option<Decimal>,
    pub discount: Discount,
    pub line_items: Vec<LineItem>,
    pub notes: String,
}

impl NewEstimate {
    pub fn new(client_id: ClientId, issue_date: NaiveDate) -> Self {
        Self {
            client_id,
            issue_date,
            expiry_date: None,
            tax_rate: None,
            discount: Discount::None,
            line_items: Vec::new(),
            notes: String::new(),
        }
    }
}

pub struct EstimateService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> EstimateService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    pub fn next_number(&self) -> SleekResult<String> {
        let prefix = self.settings.estimate_prefix.trim();
        let sequence = self.storage.estimates.max_sequence(prefix)? + 1;
        Ok(format_number(prefix, sequence))
    }

    pub fn create(&self, input: NewEstimate) -> SleekResult<Estimate> {
        let client = billable_client(self.storage, input.client_id)?;

        let expiry_date = match input.expiry_date {
            Some(expiry) => expiry,
            None => days_after(input.issue_date, self.settings.estimate_valid_days)?,
        };
        if expiry_date < input.issue_date {
            return Err(SleekError::Validation(
                "Expiry date cannot be before issue date".into(),
            ));
        }
        let tax_rate = input.tax_rate.unwrap_or(self.settings.default_tax_rate);
        validate_rates(tax_rate, input.discount)?;
        for item in &input.line_items {
            validate_line_item(item)?;
        }

        let mut estimate = Estimate::new(
            self.next_number()?,
            client.id,
            input.issue_date,
            expiry_date,
            self.settings.currency_code.clone(),
        );
        estimate.tax_rate = tax_rate;
        estimate.discount = input.discount;
        estimate.line_items = input.line_items;
        estimate.notes = input.notes.trim().to_string();
        checked_totals(&estimate.line_items, estimate.tax_rate, estimate.discount)?;

        self.storage.estimates.upsert(estimate.clone())?;
        self.storage.estimates.save()?;
        self.storage.log_create(
            EntityType::Estimate,
            estimate.id.to_string(),
            Some(estimate.number.clone()),
            &estimate,
        )?;

        info!(estimate = %estimate.number, client = %client.id, "estimate created");
        Ok(estimate)
    }

    pub fn get(&self, id: EstimateId) -> SleekResult<Option<Estimate>> {
        self.storage.estimates.get(id)
    }

    pub fn require(&self, identifier: &str) -> SleekResult<Estimate> {
        self.storage
            .estimates
            .resolve(identifier)?
            .ok_or_else(|| SleekError::estimate_not_found(identifier))
    }

    pub fn list(
        &self,
        client: Option<ClientId>,
        status: Option<EstimateStatus>,
    ) -> SleekResult<Vec<Estimate>> {
        self.storage.estimates.list(client, status)
    }

    pub fn add_line_item(&self, id: EstimateId, item: LineItem) -> SleekResult<Estimate> {
        validate_line_item(&item)?;
        let before = self.load(id)?;
        if before.status != EstimateStatus::Draft {
            return Err(SleekError::InvalidState(format!(
                "Estimate {} is {}; only drafts can be edited",
                before.number, before.status
            )));
        }
        let mut estimate = before.clone();
        estimate.line_items.push(item);
        checked_totals(&estimate.line_items, estimate.tax_rate, estimate.discount)?;
        estimate.updated_at = Utc::now();
        self.replace(&before, &estimate)?;
        Ok(estimate)
    }

    pub fn mark_sent(&self, id: EstimateId) -> SleekResult<Estimate> {
        self.transition(id, EstimateStatus::Sent, &[EstimateStatus::Draft])
    }

    pub fn accept(&self, id: EstimateId) -> SleekResult<Estimate> {
        self.transition(id, EstimateStatus::Accepted, &[EstimateStatus::Sent])
    }

    pub fn decline(&self, id: EstimateId) -> SleekResult<Estimate> {
        self.transition(id, EstimateStatus::Declined, &[EstimateStatus::Sent])
    }

    /// Expire drafts and sent estimates past their expiry date
    pub fn expire_due(&self, today: NaiveDate) -> SleekResult<Vec<Estimate>> {
        let lapsed = self.storage.estimates.filter(|e| e.is_expired_on(today))?;

        let mut changed = Vec::with_capacity(lapsed.len());
        for before in lapsed {
            let mut estimate = before.clone();
            estimate.set_status(EstimateStatus::Expired);
            self.storage.estimates.upsert(estimate.clone())?;
            self.storage.log_update(
                EntityType::Estimate,
                estimate.id.to_string(),
                Some(estimate.number.clone()),
                &before,
                &estimate,
            )?;
            changed.push(estimate);
        }

        if !changed.is_empty() {
            self.storage.estimates.save()?;
            info!(count = changed.len(), "estimates expired");
        }
        Ok(changed)
    }

    /// Turn a sent or accepted estimate into a draft invoice
    ///
    /// Items, tax and discount are copied; the estimate is marked converted
    /// and linked to the new invoice.
    pub fn convert_to_invoice(&self, id: EstimateId, issue_date: NaiveDate) -> SleekResult<Invoice> {
        let before = self.load(id)?;
        if !before.status.is_convertible() {
            warn!(estimate = %before.number, status = %before.status, "conversion refused");
            return Err(SleekError::InvalidState(format!(
                "Estimate {} is {}; only sent or accepted estimates can be converted",
                before.number, before.status
            )));
        }

        billable_client(self.storage, before.client_id)?;
        let invoices = InvoiceService::new(self.storage, self.settings);
        let due_date = days_after(issue_date, self.settings.payment_terms_days)?;

        let mut invoice = Invoice::new(
            invoices.next_number()?,
            before.client_id,
            issue_date,
            due_date,
            before.currency.clone(),
        );
        invoice.line_items = before.line_items.clone();
        invoice.tax_rate = before.tax_rate;
        invoice.discount = before.discount;
        invoice.notes = before.notes.clone();
        invoice.estimate_id = Some(before.id);
        invoice.validate().map_err(state_error)?;

        invoices.insert(&invoice)?;

        let mut estimate = before.clone();
        estimate.invoice_id = Some(invoice.id);
        estimate.set_status(EstimateStatus::Converted);
        self.replace(&before, &estimate)?;

        info!(
            estimate = %estimate.number,
            invoice = %invoice.number,
            "estimate converted"
        );
        Ok(invoice)
    }

    fn transition(
        &self,
        id: EstimateId,
        to: EstimateStatus,
        allowed_from: &[EstimateStatus],
    ) -> SleekResult<Estimate> {
        let before = self.load(id)?;
        if !allowed_from.contains(&before.status) {
            return Err(SleekError::InvalidState(format!(
                "Estimate {} is {}, cannot mark it {}",
                before.number, before.status, to
            )));
        }

        let mut estimate = before.clone();
        estimate.set_status(to);
        self.replace(&before, &estimate)?;
        info!(estimate = %estimate.number, status = %to, "estimate status changed");
        Ok(estimate)
    }

    fn replace(&self, before: &Estimate, after: &Estimate) -> SleekResult<()> {
        self.storage.estimates.upsert(after.clone())?;
        self.storage.estimates.save()?;
        self.storage.log_update(
            EntityType::Estimate,
            after.id.to_string(),
            Some(after.number.clone()),
            before,
            after,
        )
    }

    fn load(&self, id: EstimateId) -> SleekResult<Estimate> {
        self.storage
            .estimates
            .get(id)?
            .ok_or_else(|| SleekError::estimate_not_found(id.to_string()))
    }
}
