//! Storage collaborators for domain records.
//!
//! # Responsibilities
//! - Load every record at startup and on reload
//! - Persist and remove single records on behalf of the registry
//!
//! # Design Decisions
//! - The registry never assumes a backing store; anything implementing
//!   `DomainStore` works
//! - `JsonFileStore` rewrites the whole file through a temp file and rename,
//!   so a crash never leaves a half-written file behind

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;

use crate::domain::{hostname, DomainRecord};
use crate::error::{DomainError, Result};

/// Backing store for domain records.
pub trait DomainStore: Send + Sync {
    /// Load every stored record.
    fn load_all(&self) -> Result<Vec<DomainRecord>>;

    /// Insert or replace a record.
    fn persist(&self, record: &DomainRecord) -> Result<()>;

    /// Remove a record by id.
    fn remove(&self, id: &str) -> Result<()>;

    /// Load the record with this hostname (case-insensitive).
    fn load_by_hostname(&self, hostname: &str) -> Result<DomainRecord>;
}

/// In-process store; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, DomainRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records, bypassing the registry.
    pub fn with_records(records: impl IntoIterator<Item = DomainRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.records.insert(record.id().to_string(), record);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl DomainStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<DomainRecord>> {
        Ok(self.records.iter().map(|r| r.value().clone()).collect())
    }

    fn persist(&self, record: &DomainRecord) -> Result<()> {
        self.records.insert(record.id().to_string(), record.clone());
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<()> {
        self.records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound(id.to_string()))
    }

    fn load_by_hostname(&self, host: &str) -> Result<DomainRecord> {
        let wanted = hostname::normalize(host);
        self.records
            .iter()
            .find(|r| hostname::normalize(r.value().hostname()) == wanted)
            .map(|r| r.value().clone())
            .ok_or_else(|| DomainError::NotFound(host.to_string()))
    }
}

/// Store keeping all records in one JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<BTreeMap<String, DomainRecord>>,
}

impl JsonFileStore {
    /// Open the store, reading the file if it exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            records: Mutex::new(BTreeMap::new()),
        };
        let loaded = store.read_file()?;
        tracing::info!(path = ?store.path, count = loaded.len(), "Opened domain record file");
        *store.lock() = loaded;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, DomainRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_file(&self) -> Result<BTreeMap<String, DomainRecord>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let file = File::open(&self.path)?;
        let records: Vec<DomainRecord> = serde_json::from_reader(BufReader::new(file))?;
        Ok(records
            .into_iter()
            .map(|r| (r.id().to_string(), r))
            .collect())
    }

    fn write_file(&self, records: &BTreeMap<String, DomainRecord>) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            let list: Vec<&DomainRecord> = records.values().collect();
            serde_json::to_writer_pretty(&mut writer, &list)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = ?self.path, count = records.len(), "Saved domain record file");
        Ok(())
    }
}

impl DomainStore for JsonFileStore {
    fn load_all(&self) -> Result<Vec<DomainRecord>> {
        // Re-read so edits made outside the process are picked up.
        let loaded = self.read_file()?;
        let mut records = self.lock();
        *records = loaded;
        Ok(records.values().cloned().collect())
    }

    fn persist(&self, record: &DomainRecord) -> Result<()> {
        let mut records = self.lock();
        let mut next = records.clone();
        next.insert(record.id().to_string(), record.clone());
        self.write_file(&next)?;
        *records = next;
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<()> {
        let mut records = self.lock();
        if !records.contains_key(id) {
            return Err(DomainError::NotFound(id.to_string()));
        }
        let mut next = records.clone();
        next.remove(id);
        self.write_file(&next)?;
        *records = next;
        Ok(())
    }

    fn load_by_hostname(&self, host: &str) -> Result<DomainRecord> {
        let wanted = hostname::normalize(host);
        self.lock()
            .values()
            .find(|r| hostname::normalize(r.hostname()) == wanted)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(host.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_operations() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.persist(&DomainRecord::new("example_com", "Example.com")).unwrap();
        assert_eq!(store.len(), 1);

        let found = store.load_by_hostname("EXAMPLE.COM").unwrap();
        assert_eq!(found.id(), "example_com");

        assert_eq!(
            store.load_by_hostname("other.com").unwrap_err(),
            DomainError::NotFound("other.com".into())
        );

        store.remove("example_com").unwrap();
        assert!(store.remove("example_com").is_err());
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("domains.json");

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.load_all().unwrap().is_empty());

        let mut record = DomainRecord::new("example_com", "example.com");
        record.set_redirect(Some(301));
        store.persist(&record).unwrap();
        store.persist(&DomainRecord::new("shop", "shop.example.com")).unwrap();
        store.remove("shop").unwrap();

        // A fresh instance sees the same file contents.
        let reopened = JsonFileStore::open(&path).unwrap();
        let all = reopened.load_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id(), "example_com");
        assert_eq!(all[0].redirect(), Some(301));
        assert_eq!(all[0].domain_id(), record.domain_id());
    }

    #[test]
    fn test_file_store_sees_external_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("domains.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.persist(&DomainRecord::new("a", "a.com")).unwrap();

        let other = JsonFileStore::open(&path).unwrap();
        other.persist(&DomainRecord::new("b", "b.com")).unwrap();

        assert_eq!(store.load_all().unwrap().len(), 2);
        assert_eq!(store.load_by_hostname("b.com").unwrap().id(), "b");
    }
}
