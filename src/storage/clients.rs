//! Client persistence (clients.json)

use crate::error::SleekError;
use crate::models::{Client, ClientId};

use super::repository::{JsonRepository, Record};

impl Record for Client {
    type Id = ClientId;

    fn id(&self) -> ClientId {
        self.id
    }
}

pub type ClientRepository = JsonRepository<Client>;

impl JsonRepository<Client> {
    /// Clients sorted by name, archived ones optionally excluded
    pub fn list(&self, include_archived: bool) -> Result<Vec<Client>, SleekError> {
        let mut clients = self.filter(|c| include_archived || !c.archived)?;
        clients.sort_by_key(|c| c.name.to_lowercase());
        Ok(clients)
    }

    /// Look up by email, ignoring case and surrounding whitespace
    pub fn get_by_email(&self, email: &str) -> Result<Option<Client>, SleekError> {
        let needle = email.trim().to_lowercase();
        self.find(|c| c.email_key().as_deref() == Some(needle.as_str()))
    }

    /// Normalized emails of every stored client, for import deduplication
    pub fn email_keys(&self) -> Result<Vec<String>, SleekError> {
        Ok(self.read()?.values().filter_map(Client::email_key).collect())
    }

    /// Resolve a user-typed identifier: short or full id, then exact name
    /// (case-insensitive). Ambiguous short ids and shared names are errors.
    pub fn resolve(&self, identifier: &str) -> Result<Option<Client>, SleekError> {
        if let Ok(id) = identifier.parse::<ClientId>() {
            if let Some(client) = self.get(id)? {
                return Ok(Some(client));
            }
        }
        let short = |c: &Client| c.id.matches_short(identifier);
        if let Some(client) = self.find_unique(identifier, short)? {
            return Ok(Some(client));
        }
        let needle = identifier.trim().to_lowercase();
        self.find_unique(identifier, |c| c.name.to_lowercase() == needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo() -> (ClientRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let repo = ClientRepository::new(temp_dir.path().join("clients.json"));
        (repo, temp_dir)
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let (repo, _temp) = repo();
        let mut archived = Client::new("Zeta");
        archived.archive();
        repo.upsert(archived).unwrap();
        repo.upsert(Client::new("beta")).unwrap();
        repo.upsert(Client::new("Alpha")).unwrap();

        let names: Vec<_> = repo.list(false).unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Alpha", "beta"]);
        assert_eq!(repo.list(true).unwrap().len(), 3);
    }

    #[test]
    fn test_lookup_by_email_ignores_case() {
        let (repo, _temp) = repo();
        repo.upsert(Client::new("Acme").with_email("Billing@Acme.com")).unwrap();

        assert!(repo.get_by_email(" billing@acme.COM ").unwrap().is_some());
        assert_eq!(repo.email_keys().unwrap(), vec!["billing@acme.com".to_string()]);
    }

    #[test]
    fn test_resolve() {
        let (repo, _temp) = repo();
        let client = Client::new("Acme Corp");
        let id = client.id;
        repo.upsert(client).unwrap();

        assert_eq!(repo.resolve(&id.to_string()).unwrap().unwrap().id, id);
        assert_eq!(repo.resolve("acme corp").unwrap().unwrap().id, id);
        assert_eq!(
            repo.resolve(&id.as_uuid().to_string()).unwrap().unwrap().id,
            id
        );
        assert!(repo.resolve("nobody").unwrap().is_none());
    }

    #[test]
    fn test_resolve_rejects_ambiguous_identifiers() {
        let (repo, _temp) = repo();
        let mut first = Client::new("Acme");
        first.id = ClientId::from(uuid::Uuid::from_u128(0xabcd_1111_u128 << 96));
        let mut second = Client::new("acme");
        second.id = ClientId::from(uuid::Uuid::from_u128(0xabcd_2222_u128 << 96));
        repo.upsert(first.clone()).unwrap();
        repo.upsert(second).unwrap();

        assert!(repo.resolve("cli-abcd").unwrap_err().is_validation());
        assert!(repo.resolve("Acme").unwrap_err().is_validation());
        assert_eq!(repo.resolve("cli-abcd1").unwrap().unwrap().id, first.id);
    }
}
