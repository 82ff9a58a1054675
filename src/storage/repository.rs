//! Generic JSON-file repository
//!
//! Every entity collection is held in memory behind an `RwLock` and written
//! back to its own file with an atomic write. Entity-specific queries live in
//! `impl JsonRepository<Entity>` blocks next to this module.

use std::collections::HashMap;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::SleekError;

use super::file_io::{read_json, write_json_atomic};

/// A record that can be stored in a [`JsonRepository`]
pub trait Record: Clone + Serialize + DeserializeOwned {
    type Id: Copy + Eq + Hash;

    fn id(&self) -> Self::Id;
}

/// On-disk layout of a repository file
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct FileData<T> {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    records: Vec<T>,
}

fn default_version() -> u32 {
    1
}

impl<T> Default for FileData<T> {
    fn default() -> Self {
        Self {
            version: default_version(),
            records: Vec::new(),
        }
    }
}

/// Repository for one entity collection
pub struct JsonRepository<T: Record> {
    path: PathBuf,
    data: RwLock<HashMap<T::Id, T>>,
}

impl<T: Record> JsonRepository<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<T::Id, T>>, SleekError> {
        self.data
            .read()
            .map_err(|e| SleekError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<T::Id, T>>, SleekError> {
        self.data
            .write()
            .map_err(|e| SleekError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Replace the in-memory contents with what is on disk
    pub fn load(&self) -> Result<(), SleekError> {
        let file_data: FileData<T> = read_json(&self.path)?;
        let mut data = self.write()?;
        data.clear();
        for record in file_data.records {
            data.insert(record.id(), record);
        }
        Ok(())
    }

    pub fn save(&self) -> Result<(), SleekError> {
        let data = self.read()?;
        let file_data = FileData {
            version: default_version(),
            records: data.values().cloned().collect(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn get(&self, id: T::Id) -> Result<Option<T>, SleekError> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// All records, in no particular order
    pub fn get_all(&self) -> Result<Vec<T>, SleekError> {
        Ok(self.read()?.values().cloned().collect())
    }

    /// First record matching `predicate`
    pub fn find<F>(&self, predicate: F) -> Result<Option<T>, SleekError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.read()?.values().find(|r| predicate(r)).cloned())
    }

    /// The single record matching `predicate`
    ///
    /// Used when resolving something the user typed (a short id, a name):
    /// more than one match is an error rather than an arbitrary pick.
    pub fn find_unique<F>(&self, identifier: &str, predicate: F) -> Result<Option<T>, SleekError>
    where
        F: Fn(&T) -> bool,
    {
        let data = self.read()?;
        let mut matches = data.values().filter(|r| predicate(r));
        let first = matches.next().cloned();
        let others = matches.count();
        if others > 0 {
            return Err(SleekError::Validation(format!(
                "'{}' matches {} records; use a longer id or the full id",
                identifier.trim(),
                others + 1
            )));
        }
        Ok(first)
    }

    /// All records matching `predicate`
    pub fn filter<F>(&self, predicate: F) -> Result<Vec<T>, SleekError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self
            .read()?
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect())
    }

    pub fn any<F>(&self, predicate: F) -> Result<bool, SleekError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.read()?.values().any(predicate))
    }

    /// Insert or replace a record
    pub fn upsert(&self, record: T) -> Result<(), SleekError> {
        self.write()?.insert(record.id(), record);
        Ok(())
    }

    /// Remove a record, returning it if it existed
    pub fn delete(&self, id: T::Id) -> Result<Option<T>, SleekError> {
        Ok(self.write()?.remove(&id))
    }

    pub fn exists(&self, id: T::Id) -> Result<bool, SleekError> {
        Ok(self.read()?.contains_key(&id))
    }

    pub fn count(&self) -> Result<usize, SleekError> {
        Ok(self.read()?.len())
    }
}
