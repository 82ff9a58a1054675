//! Invoice service
//!
//! Numbering, line item editing, status transitions and payments.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::audit::EntityType;
use crate::config::Settings;
use crate::error::{SleekError, SleekResult};
use crate::models::{
    Client, ClientId, Discount, Invoice, InvoiceId, InvoiceStateError, InvoiceStatus, LineItem, Money,
    Payment, PaymentMethod,
};
use crate::storage::Storage;
use crate::totals::{checked_totals, validate_line_item, validate_rates, DocumentTotals};

/// Fields accepted when creating an invoice
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub client_id: ClientId,
    pub issue_date: NaiveDate,
    /// Defaults to the issue date plus the configured payment terms
    pub due_date: Option<NaiveDate>,
    /// Defaults to the configured tax rate
    pub tax_rate: Option<Decimal>,
    pub discount: Discount,
    pub line_items: Vec<LineItem>,
    pub notes: String,
}

impl NewInvoice {
    pub fn new(client_id: ClientId, issue_date: NaiveDate) -> Self {
        Self {
            client_id,
            issue_date,
            due_date: None,
            tax_rate: None,
            discount: Discount::None,
            line_items: Vec::new(),
            notes: String::new(),
        }
    }
}

/// Format a document number as `PREFIX-0001`
pub(crate) fn format_number(prefix: &str, sequence: u32) -> String {
    format!("{}-{:04}", prefix, sequence)
}

/// `date` moved forward by `days`, or a validation error past the calendar's end
pub(crate) fn days_after(date: NaiveDate, days: u32) -> SleekResult<NaiveDate> {
    date.checked_add_signed(Duration::days(i64::from(days)))
        .ok_or_else(|| {
            SleekError::Validation(format!("{} plus {} days is out of range", date, days))
        })
}

/// Load a client that new documents can be issued to
pub(crate) fn billable_client(storage: &Storage, id: ClientId) -> SleekResult<Client> {
    let client = storage
        .clients
        .get(id)?
        .ok_or_else(|| SleekError::client_not_found(id.to_string()))?;
    if client.archived {
        return Err(SleekError::InvalidState(format!(
            "Client '{}' is archived",
            client.name
        )));
    }
    Ok(client)
}

pub(crate) fn state_error(err: InvoiceStateError) -> SleekError {
    match err {
        InvoiceStateError::NotPayable(_) | InvoiceStateError::PaidMismatch { .. } => {
            SleekError::InvalidState(err.to_string())
        }
        _ => SleekError::Validation(err.to_string()),
    }
}

pub struct InvoiceService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> InvoiceService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    /// The number the next invoice will get
    pub fn next_number(&self) -> SleekResult<String> {
        let prefix = self.settings.invoice_prefix.trim();
        let sequence = self.storage.invoices.max_sequence(prefix)? + 1;
        Ok(format_number(prefix, sequence))
    }

    pub fn create(&self, input: NewInvoice) -> SleekResult<Invoice> {
        let client = billable_client(self.storage, input.client_id)?;

        let due_date = match input.due_date {
            Some(due) => due,
            None => days_after(input.issue_date, self.settings.payment_terms_days)?,
        };
        let tax_rate = input.tax_rate.unwrap_or(self.settings.default_tax_rate);
        validate_rates(tax_rate, input.discount)?;
        for item in &input.line_items {
            validate_line_item(item)?;
        }

        let mut invoice = Invoice::new(
            self.next_number()?,
            client.id,
            input.issue_date,
            due_date,
            self.settings.currency_code.clone(),
        );
        invoice.tax_rate = tax_rate;
        invoice.discount = input.discount;
        invoice.line_items = input.line_items;
        invoice.notes = input.notes.trim().to_string();
        checked_totals(&invoice.line_items, invoice.tax_rate, invoice.discount)?;
        invoice.validate().map_err(state_error)?;

        self.insert(&invoice)?;
        info!(invoice = %invoice.number, client = %client.id, "invoice created");
        Ok(invoice)
    }

    pub fn get(&self, id: InvoiceId) -> SleekResult<Option<Invoice>> {
        self.storage.invoices.get(id)
    }

    /// Look up by number, id or short id
    pub fn find(&self, identifier: &str) -> SleekResult<Option<Invoice>> {
        self.storage.invoices.resolve(identifier)
    }

    pub fn require(&self, identifier: &str) -> SleekResult<Invoice> {
        self.find(identifier)?
            .ok_or_else(|| SleekError::invoice_not_found(identifier))
    }

    pub fn list(
        &self,
        client: Option<ClientId>,
        status: Option<InvoiceStatus>,
    ) -> SleekResult<Vec<Invoice>> {
        self.storage.invoices.list(client, status)
    }

    pub fn totals(&self, id: InvoiceId) -> SleekResult<DocumentTotals> {
        Ok(self.load(id)?.totals())
    }

    pub fn add_line_item(&self, id: InvoiceId, item: LineItem) -> SleekResult<Invoice> {
        validate_line_item(&item)?;
        self.edit_draft(id, |invoice| {
            invoice.line_items.push(item);
            Ok(())
        })
    }

    /// Remove the line item at `index` (0-based)
    pub fn remove_line_item(&self, id: InvoiceId, index: usize) -> SleekResult<Invoice> {
        self.edit_draft(id, |invoice| {
            if index >= invoice.line_items.len() {
                return Err(SleekError::Validation(format!(
                    "Invoice has {} line items, no item {}",
                    invoice.line_items.len(),
                    index + 1
                )));
            }
            invoice.line_items.remove(index);
            Ok(())
        })
    }

    pub fn set_pricing(
        &self,
        id: InvoiceId,
        tax_rate: Decimal,
        discount: Discount,
    ) -> SleekResult<Invoice> {
        validate_rates(tax_rate, discount)?;
        self.edit_draft(id, |invoice| {
            invoice.tax_rate = tax_rate;
            invoice.discount = discount;
            Ok(())
        })
    }

    /// Draft to sent; an invoice needs a positive total to be sent
    pub fn mark_sent(&self, id: InvoiceId) -> SleekResult<Invoice> {
        let before = self.load(id)?;
        if before.status != InvoiceStatus::Draft {
            return Err(SleekError::InvalidState(format!(
                "Invoice {} is {}, only drafts can be sent",
                before.number, before.status
            )));
        }
        if !before.total().is_positive() {
            return Err(SleekError::Validation(format!(
                "Invoice {} has nothing to bill",
                before.number
            )));
        }

        let mut invoice = before.clone();
        invoice.set_status(InvoiceStatus::Sent);
        self.replace(&before, &invoice)?;
        info!(invoice = %invoice.number, "invoice sent");
        Ok(invoice)
    }

    /// Record a payment; the status follows the amount paid
    pub fn record_payment(
        &self,
        id: InvoiceId,
        amount: Money,
        date: NaiveDate,
        method: PaymentMethod,
        reference: Option<String>,
    ) -> SleekResult<Invoice> {
        let before = self.load(id)?;
        let mut invoice = before.clone();

        let mut payment = Payment::new(amount, date, method);
        payment.reference = reference.unwrap_or_default().trim().to_string();

        if let Err(e) = invoice.record_payment(payment) {
            warn!(invoice = %invoice.number, %amount, error = %e, "payment refused");
            return Err(state_error(e));
        }

        self.replace(&before, &invoice)?;
        info!(
            invoice = %invoice.number,
            %amount,
            status = %invoice.status,
            "payment recorded"
        );
        Ok(invoice)
    }

    pub fn cancel(&self, id: InvoiceId) -> SleekResult<Invoice> {
        let before = self.load(id)?;
        match before.status {
            InvoiceStatus::Paid | InvoiceStatus::Canceled => {
                return Err(SleekError::InvalidState(format!(
                    "Invoice {} is already {}",
                    before.number, before.status
                )))
            }
            _ if before.amount_paid().is_positive() => {
                return Err(SleekError::InvalidState(format!(
                    "Invoice {} has payments recorded",
                    before.number
                )))
            }
            _ => {}
        }

        let mut invoice = before.clone();
        invoice.set_status(InvoiceStatus::Canceled);
        self.replace(&before, &invoice)?;
        info!(invoice = %invoice.number, "invoice canceled");
        Ok(invoice)
    }

    /// Delete a draft or canceled invoice; expenses billed on it become unbilled
    pub fn delete(&self, id: InvoiceId) -> SleekResult<Invoice> {
        let invoice = self.load(id)?;
        if !matches!(
            invoice.status,
            InvoiceStatus::Draft | InvoiceStatus::Canceled
        ) {
            return Err(SleekError::InvalidState(format!(
                "Invoice {} is {}; cancel it before deleting",
                invoice.number, invoice.status
            )));
        }

        let billed = self.storage.expenses.filter(|e| e.invoice_id == Some(id))?;
        if !billed.is_empty() {
            for mut expense in billed {
                expense.invoice_id = None;
                expense.updated_at = Utc::now();
                self.storage.expenses.upsert(expense)?;
            }
            self.storage.expenses.save()?;
        }

        self.storage.invoices.delete(id)?;
        self.storage.invoices.save()?;
        self.storage.log_delete(
            EntityType::Invoice,
            invoice.id.to_string(),
            Some(invoice.number.clone()),
            &invoice,
        )?;

        info!(invoice = %invoice.number, "invoice deleted");
        Ok(invoice)
    }

    /// Flag open invoices whose due date has passed; returns the ones changed
    pub fn refresh_overdue(&self, today: NaiveDate) -> SleekResult<Vec<Invoice>> {
        let candidates = self
            .storage
            .invoices
            .filter(|i| i.status != InvoiceStatus::Overdue && i.is_past_due(today))?;

        let mut changed = Vec::with_capacity(candidates.len());
        for before in candidates {
            let mut invoice = before.clone();
            invoice.set_status(InvoiceStatus::Overdue);
            self.storage.invoices.upsert(invoice.clone())?;
            self.storage.log_update(
                EntityType::Invoice,
                invoice.id.to_string(),
                Some(invoice.number.clone()),
                &before,
                &invoice,
            )?;
            changed.push(invoice);
        }

        if !changed.is_empty() {
            self.storage.invoices.save()?;
            info!(count = changed.len(), "invoices marked overdue");
        }
        Ok(changed)
    }

    /// Store a new invoice built elsewhere (estimate conversion)
    pub(crate) fn insert(&self, invoice: &Invoice) -> SleekResult<()> {
        self.storage.invoices.upsert(invoice.clone())?;
        self.storage.invoices.save()?;
        self.storage.log_create(
            EntityType::Invoice,
            invoice.id.to_string(),
            Some(invoice.number.clone()),
            invoice,
        )
    }

    pub(crate) fn replace(&self, before: &Invoice, after: &Invoice) -> SleekResult<()> {
        self.storage.invoices.upsert(after.clone())?;
        self.storage.invoices.save()?;
        self.storage.log_update(
            EntityType::Invoice,
            after.id.to_string(),
            Some(after.number.clone()),
            before,
            after,
        )
    }

    pub(crate) fn edit_draft<F>(&self, id: InvoiceId, edit: F) -> SleekResult<Invoice>
    where
        F: FnOnce(&mut Invoice) -> SleekResult<()>,
    {
        let before = self.load(id)?;
        if !before.status.is_editable() {
            return Err(SleekError::InvalidState(format!(
                "Invoice {} is {}; only drafts can be edited",
                before.number, before.status
            )));
        }

        let mut invoice = before.clone();
        edit(&mut invoice)?;
        checked_totals(&invoice.line_items, invoice.tax_rate, invoice.discount)?;
        invoice.updated_at = Utc::now();

        self.replace(&before, &invoice)?;
        debug!(invoice = %invoice.number, total = %invoice.total(), "invoice edited");
        Ok(invoice)
    }

    fn load(&self, id: InvoiceId) -> SleekResult<Invoice> {
        self.storage
            .invoices
            .get(id)?
            .ok_or_else(|| SleekError::invoice_not_found(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SleekPaths;
    use crate::models::{Client, Expense};
    use tempfile::TempDir;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn setup() -> (TempDir, Storage, Settings, ClientId) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SleekPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        let client = Client::new("Acme");
        let client_id = client.id;
        storage.clients.upsert(client).unwrap();
        (temp_dir, storage, Settings::default(), client_id)
    }

    fn billable_invoice(service: &InvoiceService, client: ClientId) -> Invoice {
        let mut input = NewInvoice::new(client, date(3, 1));
        input.line_items = vec![
            LineItem::units("Design", 2, Money::from_cents(10000)),
            LineItem::units("Hosting", 1, Money::from_cents(15000)),
        ];
        input.tax_rate = Some(Decimal::from(10));
        input.discount = Discount::Percentage(Decimal::from(5));
        service.create(input).unwrap()
    }

    #[test]
    fn test_numbering_and_defaults() {
        let (_temp, storage, settings, client) = setup();
        let service = InvoiceService::new(&storage, &settings);

        let first = service.create(NewInvoice::new(client, date(3, 1))).unwrap();
        let second = service.create(NewInvoice::new(client, date(3, 2))).unwrap();

        assert_eq!(first.number, "INV-0001");
        assert_eq!(second.number, "INV-0002");
        assert_eq!(first.due_date, date(3, 31));
        assert_eq!(first.currency, "USD");
        assert_eq!(first.status, InvoiceStatus::Draft);
    }

    #[test]
    fn test_numbering_continues_after_gap() {
        let (_temp, storage, settings, client) = setup();
        let service = InvoiceService::new(&storage, &settings);
        storage
            .invoices
            .upsert(Invoice::new("INV-0041", client, date(1, 1), date(1, 31), "USD"))
            .unwrap();

        assert_eq!(service.next_number().unwrap(), "INV-0042");
    }

    #[test]
    fn test_reference_totals() {
        let (_temp, storage, settings, client) = setup();
        let service = InvoiceService::new(&storage, &settings);
        let invoice = billable_invoice(&service, client);

        let totals = service.totals(invoice.id).unwrap();
        assert_eq!(totals.subtotal, Money::from_cents(35000));
        assert_eq!(totals.discount, Money::from_cents(1750));
        assert_eq!(totals.tax, Money::from_cents(3325));
        assert_eq!(totals.total, Money::from_cents(36575));
    }

    #[test]
    fn test_unknown_or_archived_client() {
        let (_temp, storage, settings, _client) = setup();
        let service = InvoiceService::new(&storage, &settings);

        let err = service
            .create(NewInvoice::new(ClientId::new(), date(3, 1)))
            .unwrap_err();
        assert!(err.is_not_found());

        let mut archived = Client::new("Old");
        archived.archive();
        let archived_id = archived.id;
        storage.clients.upsert(archived).unwrap();
        let err = service
            .create(NewInvoice::new(archived_id, date(3, 1)))
            .unwrap_err();
        assert!(matches!(err, SleekError::InvalidState(_)));
    }

    #[test]
    fn test_payment_flow() {
        let (_temp, storage, settings, client) = setup();
        let service = InvoiceService::new(&storage, &settings);
        let invoice = billable_invoice(&service, client);

        // Drafts cannot take payments
        let err = service
            .record_payment(invoice.id, Money::from_cents(100), date(3, 5), PaymentMethod::Card, None)
            .unwrap_err();
        assert!(matches!(err, SleekError::InvalidState(_)));

        service.mark_sent(invoice.id).unwrap();

        let partial = service
            .record_payment(
                invoice.id,
                Money::from_cents(20000),
                date(3, 10),
                PaymentMethod::BankTransfer,
                Some("wire 991".into()),
            )
            .unwrap();
        assert_eq!(partial.status, InvoiceStatus::Partial);
        assert_eq!(partial.balance_due(), Money::from_cents(16575));

        let over = service
            .record_payment(
                invoice.id,
                Money::from_cents(16576),
                date(3, 11),
                PaymentMethod::Card,
                None,
            )
            .unwrap_err();
        assert!(over.is_validation());

        let paid = service
            .record_payment(
                invoice.id,
                Money::from_cents(16575),
                date(3, 12),
                PaymentMethod::Card,
                None,
            )
            .unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
        assert_eq!(paid.amount_paid(), paid.total());
        assert!(service.cancel(invoice.id).is_err());
    }

    #[test]
    fn test_cannot_send_empty_invoice() {
        let (_temp, storage, settings, client) = setup();
        let service = InvoiceService::new(&storage, &settings);
        let invoice = service.create(NewInvoice::new(client, date(3, 1))).unwrap();

        assert!(service.mark_sent(invoice.id).unwrap_err().is_validation());
    }

    #[test]
    fn test_editing_only_in_draft() {
        let (_temp, storage, settings, client) = setup();
        let service = InvoiceService::new(&storage, &settings);
        let invoice = billable_invoice(&service, client);

        let edited = service
            .add_line_item(invoice.id, LineItem::units("Extra", 1, Money::from_cents(500)))
            .unwrap();
        assert_eq!(edited.line_items.len(), 3);
        let edited = service.remove_line_item(invoice.id, 2).unwrap();
        assert_eq!(edited.line_items.len(), 2);
        assert!(service.remove_line_item(invoice.id, 5).is_err());

        service.mark_sent(invoice.id).unwrap();
        let err = service
            .set_pricing(invoice.id, Decimal::ZERO, Discount::None)
            .unwrap_err();
        assert!(matches!(err, SleekError::InvalidState(_)));
    }

    #[test]
    fn test_refresh_overdue() {
        let (_temp, storage, settings, client) = setup();
        let service = InvoiceService::new(&storage, &settings);
        let invoice = billable_invoice(&service, client);
        service.mark_sent(invoice.id).unwrap();

        assert!(service.refresh_overdue(date(3, 31)).unwrap().is_empty());
        let changed = service.refresh_overdue(date(4, 1)).unwrap();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].status, InvoiceStatus::Overdue);
        assert!(service.refresh_overdue(date(4, 2)).unwrap().is_empty());

        // A payment on an overdue invoice moves it to partial
        let partial = service
            .record_payment(invoice.id, Money::from_cents(100), date(4, 3), PaymentMethod::Cash, None)
            .unwrap();
        assert_eq!(partial.status, InvoiceStatus::Partial);
    }

    #[test]
    fn test_delete_rules() {
        let (_temp, storage, settings, client) = setup();
        let service = InvoiceService::new(&storage, &settings);
        let invoice = billable_invoice(&service, client);

        let mut expense = Expense::new("Courier", Money::from_cents(900), date(2, 1));
        expense.invoice_id = Some(invoice.id);
        let expense_id = expense.id;
        storage.expenses.upsert(expense).unwrap();

        service.mark_sent(invoice.id).unwrap();
        assert!(service.delete(invoice.id).is_err());

        service.cancel(invoice.id).unwrap();
        service.delete(invoice.id).unwrap();
        assert!(service.get(invoice.id).unwrap().is_none());
        assert_eq!(storage.expenses.get(expense_id).unwrap().unwrap().invoice_id, None);
    }

    #[test]
    fn test_due_date_before_issue_rejected() {
        let (_temp, storage, settings, client) = setup();
        let service = InvoiceService::new(&storage, &settings);
        let mut input = NewInvoice::new(client, date(3, 10));
        input.due_date = Some(date(3, 1));
        assert!(service.create(input).unwrap_err().is_validation());
    }

    #[test]
    fn test_oversized_documents_rejected() {
        let (_temp, storage, settings, client) = setup();
        let service = InvoiceService::new(&storage, &settings);

        let max_line = LineItem::new("Retainer", crate::totals::MAX_QUANTITY, crate::totals::MAX_RATE);
        let mut input = NewInvoice::new(client, date(3, 1));
        input.line_items = vec![max_line.clone()];
        assert!(service.create(input).unwrap_err().is_validation());

        let mut input = NewInvoice::new(client, date(3, 1));
        input.line_items = vec![LineItem::units("Huge", 1, Money::from_cents(i64::MAX))];
        assert!(service.create(input).unwrap_err().is_validation());

        let invoice = billable_invoice(&service, client);
        assert!(service
            .add_line_item(invoice.id, max_line)
            .unwrap_err()
            .is_validation());
        let stored = service.get(invoice.id).unwrap().unwrap();
        assert_eq!(stored.line_items.len(), 2);
        assert_eq!(stored.total(), invoice.total());
    }

    #[test]
    fn test_payment_terms_past_calendar_end() {
        let (_temp, storage, mut settings, client) = setup();
        settings.payment_terms_days = u32::MAX;
        let service = InvoiceService::new(&storage, &settings);

        let err = service.create(NewInvoice::new(client, date(3, 1))).unwrap_err();
        assert!(err.is_validation());
        assert!(storage.invoices.get_all().unwrap().is_empty());

        // An explicit due date does not need the terms
        let mut input = NewInvoice::new(client, date(3, 1));
        input.due_date = Some(date(4, 1));
        assert!(service.create(input).is_ok());
    }
}
