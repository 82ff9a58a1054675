//! Client service
//!
//! CRUD for clients, field validation shared with the CSV import, and the
//! import itself.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::audit::EntityType;
use crate::error::{SleekError, SleekResult};
use crate::import::validators::{is_valid_email, is_valid_phone, is_valid_vat, normalize_vat};
use crate::import::{parse_csv_with_existing, ClientImportResult};
use crate::models::{Client, ClientId};
use crate::storage::Storage;

/// Fields accepted when creating a client
#[derive(Debug, Clone, Default)]
pub struct NewClient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company_name: Option<String>,
    pub vat_number: Option<String>,
    pub notes: Option<String>,
}

impl NewClient {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial update; `Some("")` clears an optional field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company_name: Option<String>,
    pub vat_number: Option<String>,
    pub notes: Option<String>,
}

/// What a CSV import stored
#[derive(Debug, Clone)]
pub struct ClientImportOutcome {
    pub result: ClientImportResult,
    pub created: Vec<ClientId>,
}

pub struct ClientService<'a> {
    storage: &'a Storage,
}

impl<'a> ClientService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: NewClient) -> SleekResult<Client> {
        let mut client = Client::new(input.name.trim());
        client.email = clean(input.email);
        client.phone = clean(input.phone);
        client.address = clean(input.address);
        client.company_name = clean(input.company_name);
        client.vat_number = clean(input.vat_number).map(|v| normalize_vat(&v));
        client.notes = clean(input.notes).unwrap_or_default();

        self.check(&client)?;

        self.storage.clients.upsert(client.clone())?;
        self.storage.clients.save()?;
        self.storage.log_create(
            EntityType::Client,
            client.id.to_string(),
            Some(client.name.clone()),
            &client,
        )?;

        info!(client = %client.id, name = %client.name, "client created");
        Ok(client)
    }

    pub fn get(&self, id: ClientId) -> SleekResult<Option<Client>> {
        self.storage.clients.get(id)
    }

    /// Look up by id, short id or name
    pub fn find(&self, identifier: &str) -> SleekResult<Option<Client>> {
        self.storage.clients.resolve(identifier)
    }

    /// Like [`find`](Self::find) but a miss is an error
    pub fn require(&self, identifier: &str) -> SleekResult<Client> {
        self.find(identifier)?
            .ok_or_else(|| SleekError::client_not_found(identifier))
    }

    pub fn list(&self, include_archived: bool) -> SleekResult<Vec<Client>> {
        self.storage.clients.list(include_archived)
    }

    pub fn update(&self, id: ClientId, changes: ClientChanges) -> SleekResult<Client> {
        let before = self.load(id)?;
        let mut client = before.clone();

        if let Some(name) = changes.name {
            client.name = name.trim().to_string();
        }
        if let Some(email) = changes.email {
            client.email = clean(Some(email));
        }
        if let Some(phone) = changes.phone {
            client.phone = clean(Some(phone));
        }
        if let Some(address) = changes.address {
            client.address = clean(Some(address));
        }
        if let Some(company) = changes.company_name {
            client.company_name = clean(Some(company));
        }
        if let Some(vat) = changes.vat_number {
            client.vat_number = clean(Some(vat)).map(|v| normalize_vat(&v));
        }
        if let Some(notes) = changes.notes {
            client.notes = notes.trim().to_string();
        }
        client.updated_at = Utc::now();

        self.check(&client)?;

        self.storage.clients.upsert(client.clone())?;
        self.storage.clients.save()?;
        self.storage.log_update(
            EntityType::Client,
            client.id.to_string(),
            Some(client.name.clone()),
            &before,
            &client,
        )?;

        debug!(client = %client.id, "client updated");
        Ok(client)
    }

    pub fn set_archived(&self, id: ClientId, archived: bool) -> SleekResult<Client> {
        let before = self.load(id)?;
        let mut client = before.clone();
        if archived {
            client.archive();
        } else {
            client.unarchive();
        }

        self.storage.clients.upsert(client.clone())?;
        self.storage.clients.save()?;
        self.storage.log_update(
            EntityType::Client,
            client.id.to_string(),
            Some(client.name.clone()),
            &before,
            &client,
        )?;

        info!(client = %client.id, archived, "client archive flag changed");
        Ok(client)
    }

    /// Delete a client with no invoices or estimates
    ///
    /// Expenses pointing at the client are kept and detached.
    pub fn delete(&self, id: ClientId) -> SleekResult<Client> {
        let client = self.load(id)?;

        if self.storage.invoices.has_invoices_for(id)?
            || self.storage.estimates.has_estimates_for(id)?
        {
            warn!(client = %id, "refusing to delete client with documents");
            return Err(SleekError::InvalidState(format!(
                "Client '{}' has invoices or estimates; archive it instead",
                client.name
            )));
        }

        let linked = self.storage.expenses.filter(|e| e.client_id == Some(id))?;
        for mut expense in linked {
            expense.client_id = None;
            expense.billable = false;
            expense.updated_at = Utc::now();
            self.storage.expenses.upsert(expense)?;
        }
        self.storage.expenses.save()?;

        self.storage.clients.delete(id)?;
        self.storage.clients.save()?;
        self.storage.log_delete(
            EntityType::Client,
            client.id.to_string(),
            Some(client.name.clone()),
            &client,
        )?;

        info!(client = %id, "client deleted");
        Ok(client)
    }

    /// Parse a CSV export and store every valid, non-duplicate row
    pub fn import_csv(&self, text: &str) -> SleekResult<ClientImportOutcome> {
        let existing = self.storage.clients.email_keys()?;
        let result = parse_csv_with_existing(text, &existing);

        if !result.success {
            warn!(errors = result.errors.len(), "client import rejected");
            return Ok(ClientImportOutcome {
                result,
                created: Vec::new(),
            });
        }

        let clients: Vec<Client> = result.clients.iter().map(|c| c.to_client()).collect();
        for client in &clients {
            self.storage.clients.upsert(client.clone())?;
        }
        self.storage.clients.save()?;

        for client in &clients {
            self.storage.log_create(
                EntityType::Client,
                client.id.to_string(),
                Some(client.name.clone()),
                client,
            )?;
        }

        info!(
            imported = clients.len(),
            invalid = result.invalid_rows,
            duplicates = result.duplicates.len(),
            "client import finished"
        );

        Ok(ClientImportOutcome {
            created: clients.iter().map(|c| c.id).collect(),
            result,
        })
    }

    fn load(&self, id: ClientId) -> SleekResult<Client> {
        self.storage
            .clients
            .get(id)?
            .ok_or_else(|| SleekError::client_not_found(id.to_string()))
    }

    /// Field formats and email uniqueness
    fn check(&self, client: &Client) -> SleekResult<()> {
        client
            .validate()
            .map_err(|e| SleekError::Validation(e.to_string()))?;

        if let Some(email) = &client.email {
            if !is_valid_email(email) {
                return Err(SleekError::Validation(format!(
                    "Invalid email address: {}",
                    email
                )));
            }
            if let Some(other) = self.storage.clients.get_by_email(email)? {
                if other.id != client.id {
                    return Err(SleekError::Duplicate {
                        entity_type: "Client",
                        identifier: email.clone(),
                    });
                }
            }
        }
        if let Some(phone) = &client.phone {
            if !is_valid_phone(phone) {
                return Err(SleekError::Validation(format!(
                    "Invalid phone number: {}",
                    phone
                )));
            }
        }
        if let Some(vat) = &client.vat_number {
            if !is_valid_vat(vat) {
                return Err(SleekError::Validation(format!("Invalid VAT number: {}", vat)));
            }
        }
        Ok(())
    }
}

/// Trim an optional input, treating blank as absent
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SleekPaths;
    use crate::models::{Expense, Invoice, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SleekPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_create_normalizes_fields() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);

        let client = service
            .create(NewClient {
                name: "  Weber GmbH ".into(),
                email: Some(" lukas@weber.de ".into()),
                vat_number: Some("de 811 907 980".into()),
                phone: Some("".into()),
                ..NewClient::default()
            })
            .unwrap();

        assert_eq!(client.name, "Weber GmbH");
        assert_eq!(client.email.as_deref(), Some("lukas@weber.de"));
        assert_eq!(client.vat_number.as_deref(), Some("DE811907980"));
        assert_eq!(client.phone, None);
        assert_eq!(storage.audit().read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);

        assert!(service.create(NewClient::named("   ")).unwrap_err().is_validation());

        let bad_email = NewClient {
            email: Some("nope".into()),
            ..NewClient::named("Acme")
        };
        assert!(service.create(bad_email).unwrap_err().is_validation());
    }

    #[test]
    fn test_email_unique_case_insensitive() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);

        service
            .create(NewClient {
                email: Some("team@acme.com".into()),
                ..NewClient::named("Acme")
            })
            .unwrap();
        let err = service
            .create(NewClient {
                email: Some("TEAM@acme.com".into()),
                ..NewClient::named("Acme Again")
            })
            .unwrap_err();
        assert!(matches!(err, SleekError::Duplicate { .. }));
    }

    #[test]
    fn test_update_keeps_own_email() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);
        let client = service
            .create(NewClient {
                email: Some("a@acme.com".into()),
                ..NewClient::named("Acme")
            })
            .unwrap();

        let updated = service
            .update(
                client.id,
                ClientChanges {
                    email: Some("A@acme.com".into()),
                    phone: Some("+1 555 010 9999".into()),
                    ..ClientChanges::default()
                },
            )
            .unwrap();
        assert_eq!(updated.phone.as_deref(), Some("+1 555 010 9999"));

        let cleared = service
            .update(
                client.id,
                ClientChanges {
                    phone: Some(String::new()),
                    ..ClientChanges::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.phone, None);
    }

    #[test]
    fn test_archive_hides_from_list() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);
        let client = service.create(NewClient::named("Old Co")).unwrap();

        service.set_archived(client.id, true).unwrap();
        assert!(service.list(false).unwrap().is_empty());
        assert_eq!(service.list(true).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_refused_with_invoices() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);
        let client = service.create(NewClient::named("Busy Co")).unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        storage
            .invoices
            .upsert(Invoice::new("INV-0001", client.id, day, day, "USD"))
            .unwrap();

        let err = service.delete(client.id).unwrap_err();
        assert!(matches!(err, SleekError::InvalidState(_)));
        assert!(service.get(client.id).unwrap().is_some());
    }

    #[test]
    fn test_delete_detaches_expenses() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);
        let client = service.create(NewClient::named("Gone Co")).unwrap();

        let mut expense = Expense::new(
            "Courier",
            Money::from_cents(1500),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        );
        expense.client_id = Some(client.id);
        expense.billable = true;
        let expense_id = expense.id;
        storage.expenses.upsert(expense).unwrap();

        service.delete(client.id).unwrap();

        assert!(service.get(client.id).unwrap().is_none());
        let expense = storage.expenses.get(expense_id).unwrap().unwrap();
        assert_eq!(expense.client_id, None);
        assert!(!expense.billable);
    }

    #[test]
    fn test_import_skips_existing_emails() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);
        service
            .create(NewClient {
                email: Some("known@example.com".into()),
                ..NewClient::named("Known")
            })
            .unwrap();

        let csv = "name,email\nKnown Again,KNOWN@example.com\nFresh,fresh@example.com\n,bad\n";
        let outcome = service.import_csv(csv).unwrap();

        assert_eq!(outcome.created.len(), 1);
        assert_eq!(outcome.result.duplicates.len(), 1);
        assert_eq!(outcome.result.invalid_rows, 2);
        assert_eq!(service.list(false).unwrap().len(), 2);
    }

    #[test]
    fn test_import_file_error_stores_nothing() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);

        let outcome = service.import_csv("email\na@b.com\n").unwrap();
        assert!(!outcome.result.success);
        assert!(outcome.created.is_empty());
        assert_eq!(storage.clients.count().unwrap(), 0);
    }

    #[test]
    fn test_find_by_name_or_short_id() {
        let (_temp, storage) = create_test_storage();
        let service = ClientService::new(&storage);
        let client = service.create(NewClient::named("Findable")).unwrap();

        assert_eq!(service.require("findable").unwrap().id, client.id);
        assert_eq!(service.require(&client.id.to_string()).unwrap().id, client.id);
        assert!(service.require("missing").unwrap_err().is_not_found());
    }
}
