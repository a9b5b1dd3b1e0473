//! Domain registry.
//!
//! # Data Flow
//! ```text
//! Readers (resolver, admin list):
//!     state.load() → immutable Snapshot → lookups
//!
//! Writers (create/update/delete/set_default/enable/disable):
//!     writer lock
//!     → clone current Snapshot
//!     → validate + apply change to the clone
//!     → persist changed records (undo on failure)
//!     → atomic swap of Arc<Snapshot>
//!     → invalidate caches (non-fatal)
//! ```
//!
//! # Design Decisions
//! - Copy-on-write snapshots: readers never block and never observe a
//!   half-applied write, so a default swap is seen as one step
//! - Writers are serialized by a single mutex
//! - Uniqueness checks read the committed snapshot under the writer lock

pub mod invalidate;
pub mod store;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::domain::{hostname, DomainField, DomainRecord, DomainUpdate, NewDomain, Scheme};
use crate::error::{DomainError, Result};
use crate::observability::metrics;

pub use invalidate::{BroadcastInvalidator, CacheInvalidator, NoopInvalidator, INVALIDATION_TAGS};
pub use store::{DomainStore, JsonFileStore, MemoryStore};

/// Result of an explicit default promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultOutcome {
    /// The record became the default; the previous default lost the flag.
    Promoted,
    /// The record already was the default; nothing changed.
    AlreadyDefault,
}

/// Immutable view of every record at one point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    records: HashMap<String, DomainRecord>,
    /// Normalized hostname → record id.
    hosts: HashMap<String, String>,
    default_id: Option<String>,
}

impl Snapshot {
    fn from_records(records: Vec<DomainRecord>) -> Self {
        let mut snapshot = Self::default();
        for record in records {
            let host = hostname::normalize(record.hostname());
            if let Some(owner) = snapshot.hosts.get(&host) {
                tracing::warn!(
                    id = %record.id(),
                    owner = %owner,
                    hostname = %record.hostname(),
                    "Duplicate hostname in stored records; lookups use the first"
                );
                snapshot.records.insert(record.id().to_string(), record);
                continue;
            }
            snapshot.insert(record);
        }
        snapshot
    }

    fn insert(&mut self, record: DomainRecord) {
        if let Some(old) = self.records.get(record.id()) {
            let old_host = hostname::normalize(old.hostname());
            if self.hosts.get(&old_host).map(String::as_str) == Some(record.id()) {
                self.hosts.remove(&old_host);
            }
        }
        if record.is_default() {
            self.default_id = Some(record.id().to_string());
        } else if self.default_id.as_deref() == Some(record.id()) {
            self.default_id = None;
        }
        // A stored duplicate never takes the index entry from its owner.
        self.hosts
            .entry(hostname::normalize(record.hostname()))
            .or_insert_with(|| record.id().to_string());
        self.records.insert(record.id().to_string(), record);
    }

    fn same_records(&self, other: &Snapshot) -> bool {
        self.records.len() == other.records.len()
            && self.records.iter().all(|(id, record)| {
                other
                    .records
                    .get(id)
                    .is_some_and(|theirs| record.same_stored(theirs))
            })
    }

    fn remove(&mut self, id: &str) -> Option<DomainRecord> {
        let record = self.records.remove(id)?;
        let host = hostname::normalize(record.hostname());
        if self.hosts.get(&host).map(String::as_str) == Some(id) {
            self.hosts.remove(&host);
        }
        if self.default_id.as_deref() == Some(id) {
            self.default_id = None;
        }
        Some(record)
    }

    /// Id of the record owning this hostname, if any.
    fn host_owner(&self, host: &str) -> Option<&str> {
        self.hosts.get(&hostname::normalize(host)).map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&DomainRecord> {
        self.records.get(id)
    }

    /// Case-insensitive exact hostname lookup.
    pub fn by_hostname(&self, host: &str) -> Option<&DomainRecord> {
        self.host_owner(host).and_then(|id| self.records.get(id))
    }

    /// Most specific wildcard record covering `host`.
    pub fn wildcard_for(&self, host: &str) -> Option<&DomainRecord> {
        let host = hostname::normalize(host);
        let mut rest = host.as_str();
        while let Some(idx) = rest.find('.') {
            rest = &rest[idx + 1..];
            let candidate = format!("{}{}", hostname::WILDCARD_PREFIX, rest);
            if let Some(record) = self.by_hostname(&candidate) {
                return Some(record);
            }
        }
        None
    }

    pub fn default_record(&self) -> Option<&DomainRecord> {
        self.default_id.as_deref().and_then(|id| self.records.get(id))
    }

    /// All records ordered by weight, then id.
    pub fn list(&self) -> Vec<DomainRecord> {
        let mut list: Vec<DomainRecord> = self.records.values().cloned().collect();
        list.sort_by(|a, b| a.weight().cmp(&b.weight()).then_with(|| a.id().cmp(b.id())));
        list
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records with the default flag set.
    pub fn default_count(&self) -> usize {
        self.records.values().filter(|r| r.is_default()).count()
    }

    pub fn enabled_count(&self) -> usize {
        self.records.values().filter(|r| r.status()).count()
    }
}

/// A pending store write.
enum Change {
    Persist(DomainRecord),
    Remove(String),
}

impl Change {
    fn id(&self) -> &str {
        match self {
            Change::Persist(record) => record.id(),
            Change::Remove(id) => id,
        }
    }
}

/// Collection of domain records with a single invariant-preserving write path.
pub struct Registry {
    state: ArcSwap<Snapshot>,
    writer: Mutex<()>,
    store: Arc<dyn DomainStore>,
    invalidator: Arc<dyn CacheInvalidator>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("records", &self.state.load().len())
            .finish()
    }
}

impl Registry {
    /// Load every stored record and repair the default invariant if needed.
    pub fn open(store: Arc<dyn DomainStore>, invalidator: Arc<dyn CacheInvalidator>) -> Result<Self> {
        let registry = Self {
            state: ArcSwap::from_pointee(Snapshot::default()),
            writer: Mutex::new(()),
            store,
            invalidator,
        };
        {
            let _guard = registry.lock();
            let snapshot = registry.load_repaired()?;
            tracing::info!(
                records = snapshot.len(),
                default = ?snapshot.default_id,
                "Domain registry loaded"
            );
            metrics::record_domain_count(snapshot.len());
            registry.state.store(Arc::new(snapshot));
        }
        Ok(registry)
    }

    /// Registry over an empty in-memory store with no invalidation.
    pub fn in_memory() -> Self {
        Self {
            state: ArcSwap::from_pointee(Snapshot::default()),
            writer: Mutex::new(()),
            store: Arc::new(MemoryStore::new()),
            invalidator: Arc::new(NoopInvalidator),
        }
    }

    /// Re-read the store, e.g. after the backing file changed on disk.
    ///
    /// Returns false when the stored records match the published snapshot;
    /// nothing is published or invalidated then.
    pub fn reload(&self) -> Result<bool> {
        let _guard = self.lock();
        let snapshot = self.load_repaired()?;
        if snapshot.same_records(&self.state.load()) {
            tracing::debug!(records = snapshot.len(), "Domain records unchanged, skipping reload");
            return Ok(false);
        }
        tracing::info!(records = snapshot.len(), "Domain registry reloaded");
        self.publish("reload", snapshot);
        Ok(true)
    }

    /// Current committed state.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.state.load_full()
    }

    pub fn get(&self, id: &str) -> Result<DomainRecord> {
        self.state
            .load()
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(id.to_string()))
    }

    /// Case-insensitive exact hostname lookup.
    pub fn find_by_hostname(&self, host: &str) -> Result<DomainRecord> {
        self.state
            .load()
            .by_hostname(host)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(host.to_string()))
    }

    /// All records ordered by weight ascending.
    pub fn list_all(&self) -> Vec<DomainRecord> {
        self.state.load().list()
    }

    pub fn default_domain(&self) -> Option<DomainRecord> {
        self.state.load().default_record().cloned()
    }

    pub fn len(&self) -> usize {
        self.state.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.load().is_empty()
    }

    /// Create a record. `ambient_https` picks the scheme when none is given.
    pub fn create(&self, new: NewDomain, ambient_https: bool) -> Result<DomainRecord> {
        validate_id(&new.id)?;
        hostname::validate(&new.hostname)?;
        if let Some(canonical) = &new.canonical {
            hostname::validate_canonical(canonical)?;
        }

        let _guard = self.lock();
        let current = self.state.load_full();

        if current.get(&new.id).is_some() {
            return Err(DomainError::DuplicateId(new.id));
        }
        if current.host_owner(&new.hostname).is_some() {
            return Err(DomainError::DuplicateHostname(new.hostname));
        }

        let mut record = DomainRecord::new(new.id, new.hostname);
        if let Some(name) = new.name {
            record.set_name(name);
        }
        record.set_scheme(new.scheme.unwrap_or(Scheme::from_tls(ambient_https)));
        record.set_weight(new.weight.unwrap_or(current.len() as i32 + 1));
        record.set_status(new.status.unwrap_or(true));
        if let Some(code) = new.redirect {
            record.set_redirect(Some(code));
        }
        if new.canonical.is_some() {
            record.set_canonical(new.canonical);
        }

        // The first record always becomes the default.
        let previous = current.default_record();
        let is_default = previous.is_none() || new.is_default == Some(true);
        if is_default && !record.status() {
            return Err(DomainError::CannotDisableDefault(record.id().to_string()));
        }
        record.set_default_flag(is_default);

        let mut changes = Vec::new();
        if is_default {
            if let Some(previous) = previous {
                let mut cleared = previous.clone();
                cleared.set_default_flag(false);
                changes.push(Change::Persist(cleared));
            }
        }
        changes.push(Change::Persist(record.clone()));

        self.commit("create", &current, changes)?;
        tracing::info!(
            id = %record.id(),
            domain_id = record.domain_id(),
            hostname = %record.hostname(),
            is_default = record.is_default(),
            "Domain created"
        );
        Ok(record)
    }

    /// Apply a partial update. Setting `is_default` swaps the default atomically.
    pub fn update(&self, id: &str, update: DomainUpdate) -> Result<DomainRecord> {
        if let Some(host) = &update.hostname {
            hostname::validate(host)?;
        }
        if let Some(Some(canonical)) = &update.canonical {
            hostname::validate_canonical(canonical)?;
        }

        let _guard = self.lock();
        let current = self.state.load_full();
        let mut record = current
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(id.to_string()))?;

        if let Some(host) = update.hostname {
            if current.host_owner(&host).is_some_and(|owner| owner != id) {
                return Err(DomainError::DuplicateHostname(host));
            }
            record.set_hostname(host);
        }
        if let Some(name) = update.name {
            record.set_name(name);
        }
        if let Some(scheme) = update.scheme {
            record.set_scheme(scheme);
        }
        if let Some(weight) = update.weight {
            record.set_weight(weight);
        }
        match update.redirect {
            Some(Some(code)) => record.set_redirect(Some(code)),
            Some(None) => record.clear_redirect(),
            None => {}
        }
        if let Some(canonical) = update.canonical {
            record.set_canonical(canonical);
        }

        let promote = update.is_default == Some(true) && !record.is_default();
        if update.is_default == Some(false) && record.is_default() {
            return Err(DomainError::DefaultRequired(id.to_string()));
        }
        if let Some(status) = update.status {
            if !status && (record.is_default() || promote) {
                return Err(DomainError::CannotDisableDefault(id.to_string()));
            }
            record.set_status(status);
        }
        if promote && !record.status() {
            return Err(DomainError::CannotPromoteDisabled(id.to_string()));
        }

        let mut changes = Vec::new();
        if promote {
            changes.extend(self.clear_default(&current));
            record.set_default_flag(true);
        }
        changes.push(Change::Persist(record.clone()));

        self.commit("update", &current, changes)?;
        tracing::info!(id = %id, promoted = promote, "Domain updated");
        Ok(record)
    }

    /// Write one property by name; unknown names are rejected.
    pub fn save_property(&self, id: &str, field: &str, value: &str) -> Result<DomainRecord> {
        let field: DomainField = field.parse()?;
        let update = field.parse_update(value)?;
        let record = self.update(id, update)?;
        tracing::info!(
            id = %id,
            field = field.as_str(),
            value = %value,
            hostname = %record.hostname(),
            "Domain attribute set"
        );
        Ok(record)
    }

    /// Delete a record. The default survives while other records exist.
    pub fn delete(&self, id: &str) -> Result<DomainRecord> {
        let _guard = self.lock();
        let current = self.state.load_full();
        let record = current
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(id.to_string()))?;

        if record.is_default() && current.len() >= 2 {
            return Err(DomainError::CannotDeleteDefault(id.to_string()));
        }

        self.commit("delete", &current, vec![Change::Remove(id.to_string())])?;
        tracing::info!(id = %id, hostname = %record.hostname(), "Domain deleted");
        Ok(record)
    }

    /// Promote a record to default, clearing the previous default in the same step.
    pub fn set_default(&self, id: &str) -> Result<DefaultOutcome> {
        let _guard = self.lock();
        let current = self.state.load_full();
        let mut record = current
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(id.to_string()))?;

        if record.is_default() {
            tracing::info!(id = %id, "The selected domain is already the default");
            return Ok(DefaultOutcome::AlreadyDefault);
        }
        if !record.status() {
            return Err(DomainError::CannotPromoteDisabled(id.to_string()));
        }

        let mut changes = self.clear_default(&current);
        record.set_default_flag(true);
        changes.push(Change::Persist(record));

        self.commit("set_default", &current, changes)?;
        tracing::info!(id = %id, previous = ?current.default_id, "Default domain changed");
        Ok(DefaultOutcome::Promoted)
    }

    pub fn enable(&self, id: &str) -> Result<DomainRecord> {
        self.set_status(id, true)
    }

    /// Disable a record. The default cannot be disabled.
    pub fn disable(&self, id: &str) -> Result<DomainRecord> {
        self.set_status(id, false)
    }

    fn set_status(&self, id: &str, status: bool) -> Result<DomainRecord> {
        let _guard = self.lock();
        let current = self.state.load_full();
        let mut record = current
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(id.to_string()))?;

        if !status && record.is_default() {
            return Err(DomainError::CannotDisableDefault(id.to_string()));
        }
        record.set_status(status);

        let op = if status { "enable" } else { "disable" };
        self.commit(op, &current, vec![Change::Persist(record.clone())])?;
        tracing::info!(id = %id, status, "Domain status changed");
        Ok(record)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn clear_default(&self, current: &Snapshot) -> Vec<Change> {
        current
            .default_record()
            .map(|previous| {
                let mut cleared = previous.clone();
                cleared.set_default_flag(false);
                Change::Persist(cleared)
            })
            .into_iter()
            .collect()
    }

    /// Persist `changes` in order, then publish the resulting snapshot.
    ///
    /// Must be called with the writer lock held. If any write fails, the
    /// writes already applied are reverted and nothing is published.
    fn commit(&self, op: &'static str, current: &Snapshot, changes: Vec<Change>) -> Result<()> {
        for (done, change) in changes.iter().enumerate() {
            let result = match change {
                Change::Persist(record) => self.store.persist(record),
                Change::Remove(id) => self.store.remove(id),
            };
            if let Err(err) = result {
                tracing::error!(op, id = %change.id(), error = %err, "Store write failed; reverting");
                for applied in changes[..done].iter().rev() {
                    self.revert(current, applied);
                }
                return Err(err);
            }
        }

        let mut next = current.clone();
        for change in changes {
            match change {
                Change::Persist(record) => next.insert(record),
                Change::Remove(id) => {
                    next.remove(&id);
                }
            }
        }
        self.publish(op, next);
        Ok(())
    }

    fn revert(&self, before: &Snapshot, change: &Change) {
        let id = change.id();
        let result = match before.get(id) {
            Some(previous) => self.store.persist(previous),
            None => self.store.remove(id),
        };
        if let Err(err) = result {
            tracing::error!(id = %id, error = %err, "Failed to revert store write");
        }
    }

    fn publish(&self, op: &'static str, snapshot: Snapshot) {
        metrics::record_domain_count(snapshot.len());
        self.state.store(Arc::new(snapshot));
        metrics::record_mutation(op);

        if let Err(err) = self.invalidator.invalidate(&INVALIDATION_TAGS) {
            tracing::warn!(op, error = %err, "Cache invalidation failed; mutation kept");
            metrics::record_invalidation_failure();
        }
    }

    /// Load the store and enforce exactly one enabled default.
    fn load_repaired(&self) -> Result<Snapshot> {
        let mut records = self.store.load_all()?;
        records.sort_by(|a, b| a.weight().cmp(&b.weight()).then_with(|| a.id().cmp(b.id())));

        let keep = records
            .iter()
            .find(|r| r.is_default() && r.status())
            .or_else(|| records.iter().find(|r| r.status()))
            .map(|r| r.id().to_string());

        for record in records.iter_mut() {
            let should_be_default = keep.as_deref() == Some(record.id());
            if record.is_default() != should_be_default {
                tracing::warn!(
                    id = %record.id(),
                    is_default = should_be_default,
                    "Repairing default flag on stored domain"
                );
                record.set_default_flag(should_be_default);
                self.store.persist(record)?;
            }
        }

        Ok(Snapshot::from_records(records))
    }
}

fn validate_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(DomainError::InvalidValue {
            field: "id".to_string(),
            value: id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::domain::MatchType;

    #[derive(Default)]
    struct CountingInvalidator {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl CacheInvalidator for CountingInvalidator {
        fn invalidate(&self, tags: &[&str]) -> Result<()> {
            assert_eq!(tags, INVALIDATION_TAGS);
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(DomainError::InvalidatorFailure("down".into()));
            }
            Ok(())
        }
    }

    /// Memory store whose writes can be made to fail on demand.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_persist_of: Mutex<Option<String>>,
    }

    impl DomainStore for FlakyStore {
        fn load_all(&self) -> Result<Vec<DomainRecord>> {
            self.inner.load_all()
        }

        fn persist(&self, record: &DomainRecord) -> Result<()> {
            if self.fail_persist_of.lock().unwrap().as_deref() == Some(record.id()) {
                return Err(DomainError::Storage("disk full".into()));
            }
            self.inner.persist(record)
        }

        fn remove(&self, id: &str) -> Result<()> {
            self.inner.remove(id)
        }

        fn load_by_hostname(&self, hostname: &str) -> Result<DomainRecord> {
            self.inner.load_by_hostname(hostname)
        }
    }

    fn registry_with(names: &[(&str, &str)]) -> Registry {
        let registry = Registry::in_memory();
        for (id, host) in names {
            registry.create(NewDomain::new(*id, *host), false).unwrap();
        }
        registry
    }

    fn assert_one_default(registry: &Registry) {
        let snapshot = registry.snapshot();
        if snapshot.enabled_count() > 0 {
            assert_eq!(snapshot.default_count(), 1);
            assert!(snapshot.default_record().unwrap().status());
        }
    }

    #[test]
    fn test_first_record_becomes_default() {
        let registry = Registry::in_memory();
        let mut new = NewDomain::new("example_com", "example.com");
        new.is_default = Some(false);
        let record = registry.create(new, false).unwrap();

        assert!(record.is_default());
        assert_eq!(record.weight(), 1);
        assert_eq!(record.scheme(), Scheme::Http);
        assert!(record.status());
        assert_eq!(record.domain_id(), crate::domain::derive_domain_id("example_com"));
    }

    #[test]
    fn test_create_defaults() {
        let registry = registry_with(&[("a", "a.com"), ("b", "b.com")]);
        let c = registry.create(NewDomain::new("c", "c.com"), true).unwrap();

        assert_eq!(c.weight(), 3);
        assert_eq!(c.scheme(), Scheme::Https);
        assert!(!c.is_default());
        assert_eq!(registry.default_domain().unwrap().id(), "a");
    }

    #[test]
    fn test_duplicate_hostname_rejected() {
        let registry = registry_with(&[("a", "example.com")]);
        let err = registry
            .create(NewDomain::new("b", "EXAMPLE.com"), false)
            .unwrap_err();

        assert_eq!(err, DomainError::DuplicateHostname("EXAMPLE.com".into()));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("b").is_err());
    }

    #[test]
    fn test_duplicate_id_and_invalid_input() {
        let registry = registry_with(&[("a", "a.com")]);
        assert_eq!(
            registry.create(NewDomain::new("a", "other.com"), false).unwrap_err(),
            DomainError::DuplicateId("a".into())
        );
        assert!(matches!(
            registry.create(NewDomain::new("bad id", "b.com"), false),
            Err(DomainError::InvalidValue { .. })
        ));
        assert!(matches!(
            registry.create(NewDomain::new("b", "b.com/x"), false),
            Err(DomainError::InvalidHostname(_))
        ));
    }

    #[test]
    fn test_create_as_default_swaps() {
        let registry = registry_with(&[("a", "a.com")]);
        let mut new = NewDomain::new("b", "b.com");
        new.is_default = Some(true);
        registry.create(new, false).unwrap();

        assert!(!registry.get("a").unwrap().is_default());
        assert!(registry.get("b").unwrap().is_default());
        assert_one_default(&registry);
    }

    #[test]
    fn test_update_hostname_uniqueness() {
        let registry = registry_with(&[("a", "a.com"), ("b", "b.com")]);
        let update = DomainUpdate {
            hostname: Some("A.COM".into()),
            ..Default::default()
        };
        assert_eq!(
            registry.update("b", update).unwrap_err(),
            DomainError::DuplicateHostname("A.COM".into())
        );

        // Re-saving a record under its own hostname is fine.
        let update = DomainUpdate {
            hostname: Some("A.com".into()),
            ..Default::default()
        };
        let a = registry.update("a", update).unwrap();
        assert_eq!(a.hostname(), "A.com");
        assert_eq!(registry.find_by_hostname("a.com").unwrap().id(), "a");

        assert_eq!(
            registry.update("zz", DomainUpdate::default()).unwrap_err(),
            DomainError::NotFound("zz".into())
        );
    }

    #[test]
    fn test_update_promotes_default() {
        let registry = registry_with(&[("a", "a.com"), ("b", "b.com")]);
        let update = DomainUpdate {
            is_default: Some(true),
            ..Default::default()
        };
        let b = registry.update("b", update).unwrap();

        assert!(b.is_default());
        assert!(!registry.get("a").unwrap().is_default());
        assert_one_default(&registry);

        let clear = DomainUpdate {
            is_default: Some(false),
            ..Default::default()
        };
        assert_eq!(
            registry.update("b", clear).unwrap_err(),
            DomainError::DefaultRequired("b".into())
        );
    }

    #[test]
    fn test_update_refreshes_derived_path() {
        let registry = registry_with(&[("a", "a.com")]);
        let before = registry.get("a").unwrap().path().to_string();
        let update = DomainUpdate {
            hostname: Some("www.a.com".into()),
            scheme: Some(Scheme::Https),
            ..Default::default()
        };
        let after = registry.update("a", update).unwrap();
        assert_ne!(after.path(), before);
        assert_eq!(after.path(), "https://www.a.com/");
    }

    #[test]
    fn test_delete_rules() {
        let registry = registry_with(&[("a", "a.com"), ("b", "b.com")]);
        assert_eq!(
            registry.delete("a").unwrap_err(),
            DomainError::CannotDeleteDefault("a".into())
        );

        registry.delete("b").unwrap();
        assert_eq!(registry.delete("b").unwrap_err(), DomainError::NotFound("b".into()));

        // The sole remaining record may go, even though it is the default.
        registry.delete("a").unwrap();
        assert!(registry.is_empty());
        assert!(registry.default_domain().is_none());

        // The next record starts a fresh default.
        let c = registry.create(NewDomain::new("c", "c.com"), false).unwrap();
        assert!(c.is_default());
    }

    #[test]
    fn test_set_default_outcomes() {
        let registry = registry_with(&[("a", "a.com"), ("b", "b.com")]);
        assert_eq!(registry.set_default("a").unwrap(), DefaultOutcome::AlreadyDefault);
        assert_eq!(registry.set_default("b").unwrap(), DefaultOutcome::Promoted);
        assert_eq!(registry.default_domain().unwrap().id(), "b");
        assert_eq!(registry.set_default("x").unwrap_err(), DomainError::NotFound("x".into()));
        assert_one_default(&registry);
    }

    #[test]
    fn test_enable_disable() {
        let registry = registry_with(&[("a", "a.com"), ("b", "b.com")]);
        assert_eq!(
            registry.disable("a").unwrap_err(),
            DomainError::CannotDisableDefault("a".into())
        );

        assert!(!registry.disable("b").unwrap().status());
        assert_eq!(
            registry.set_default("b").unwrap_err(),
            DomainError::CannotPromoteDisabled("b".into())
        );
        assert!(registry.enable("b").unwrap().status());
        assert_eq!(registry.enable("zz").unwrap_err(), DomainError::NotFound("zz".into()));
    }

    #[test]
    fn test_save_property_whitelist() {
        let registry = registry_with(&[("a", "a.com"), ("b", "b.com")]);
        assert_eq!(
            registry.save_property("a", "domain_id", "5").unwrap_err(),
            DomainError::UnknownField("domain_id".into())
        );

        let b = registry.save_property("b", "weight", "-4").unwrap();
        assert_eq!(b.weight(), -4);
        assert_eq!(registry.list_all()[0].id(), "b");

        registry.save_property("b", "is_default", "1").unwrap();
        assert_eq!(registry.default_domain().unwrap().id(), "b");
    }

    #[test]
    fn test_list_ordered_by_weight() {
        let registry = registry_with(&[("a", "a.com"), ("b", "b.com"), ("c", "c.com")]);
        registry.save_property("c", "weight", "0").unwrap();
        let ids: Vec<String> = registry.list_all().iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_invalidation_after_each_mutation() {
        let invalidator = Arc::new(CountingInvalidator::default());
        let registry = Registry::open(Arc::new(MemoryStore::new()), invalidator.clone()).unwrap();

        registry.create(NewDomain::new("a", "a.com"), false).unwrap();
        registry.create(NewDomain::new("b", "b.com"), false).unwrap();
        registry.set_default("b").unwrap();
        registry.set_default("b").unwrap();
        registry.disable("a").unwrap();
        registry.enable("a").unwrap();
        registry.delete("a").unwrap();
        assert!(registry.delete("zz").is_err());
        registry.delete("b").unwrap();

        // The no-op promotion and the failed delete do not signal.
        assert_eq!(invalidator.calls.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_invalidator_failure_keeps_mutation() {
        let invalidator = Arc::new(CountingInvalidator::default());
        invalidator.fail.store(true, Ordering::SeqCst);
        let registry = Registry::open(Arc::new(MemoryStore::new()), invalidator.clone()).unwrap();

        registry.create(NewDomain::new("a", "a.com"), false).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(invalidator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_swap_rolls_back() {
        let store = Arc::new(FlakyStore::default());
        let registry = Registry::open(store.clone(), Arc::new(NoopInvalidator)).unwrap();
        registry.create(NewDomain::new("a", "a.com"), false).unwrap();
        registry.create(NewDomain::new("b", "b.com"), false).unwrap();

        *store.fail_persist_of.lock().unwrap() = Some("b".into());
        let err = registry.set_default("b").unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));

        // Neither the snapshot nor the store moved the default.
        assert_eq!(registry.default_domain().unwrap().id(), "a");
        let stored = store.inner.load_all().unwrap();
        let defaults: Vec<_> = stored.iter().filter(|r| r.is_default()).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id(), "a");
    }

    #[test]
    fn test_open_repairs_defaults() {
        let mut a = DomainRecord::new("a", "a.com");
        a.set_weight(1);
        a.set_default_flag(true);
        let mut b = DomainRecord::new("b", "b.com");
        b.set_weight(2);
        b.set_default_flag(true);
        let store = Arc::new(MemoryStore::with_records([a, b]));

        let registry = Registry::open(store.clone(), Arc::new(NoopInvalidator)).unwrap();
        assert_eq!(registry.default_domain().unwrap().id(), "a");
        assert_one_default(&registry);
        assert!(!store.load_by_hostname("b.com").unwrap().is_default());

        let mut c = DomainRecord::new("c", "c.com");
        c.set_status(false);
        c.set_default_flag(true);
        let d = DomainRecord::new("d", "d.com");
        let registry =
            Registry::open(Arc::new(MemoryStore::with_records([c, d])), Arc::new(NoopInvalidator)).unwrap();
        assert_eq!(registry.default_domain().unwrap().id(), "d");
    }

    #[test]
    fn test_reload_skips_unchanged_store() {
        let store = Arc::new(MemoryStore::new());
        let invalidator = Arc::new(CountingInvalidator::default());
        let registry = Registry::open(store.clone(), invalidator.clone()).unwrap();
        registry.create(NewDomain::new("a", "example.com"), false).unwrap();
        assert_eq!(invalidator.calls.load(Ordering::SeqCst), 1);

        // Reloading what the registry itself just wrote changes nothing.
        assert!(!registry.reload().unwrap());
        assert_eq!(invalidator.calls.load(Ordering::SeqCst), 1);

        let mut edited = store.load_by_hostname("example.com").unwrap();
        edited.set_weight(5);
        store.persist(&edited).unwrap();
        assert!(registry.reload().unwrap());
        assert_eq!(invalidator.calls.load(Ordering::SeqCst), 2);
        assert_eq!(registry.get("a").unwrap().weight(), 5);
    }

    #[test]
    fn test_canonical_override_is_persisted() {
        let store = Arc::new(MemoryStore::new());
        let registry = Registry::open(store.clone(), Arc::new(NoopInvalidator)).unwrap();

        let mut new = NewDomain::new("a", "example.com");
        new.canonical = Some("www.example.com".into());
        let record = registry.create(new, false).unwrap();
        assert_eq!(record.canonical(), "www.example.com");
        assert_eq!(store.load_by_hostname("example.com").unwrap().canonical(), "www.example.com");

        let err = registry.save_property("a", "canonical", "*.example.com").unwrap_err();
        assert_eq!(err, DomainError::InvalidHostname("*.example.com".into()));

        let record = registry.save_property("a", "canonical", "none").unwrap();
        assert_eq!(record.canonical(), "example.com");
        assert_eq!(store.load_by_hostname("example.com").unwrap().canonical(), "example.com");
    }

    #[test]
    fn test_stored_duplicate_keeps_owner_indexed() {
        let mut a = DomainRecord::new("a", "a.com");
        a.set_weight(1);
        a.set_default_flag(true);
        let mut b = DomainRecord::new("b", "shop.com");
        b.set_weight(2);
        let mut c = DomainRecord::new("c", "SHOP.com");
        c.set_weight(3);
        let registry =
            Registry::open(Arc::new(MemoryStore::with_records([a, b, c])), Arc::new(NoopInvalidator)).unwrap();
        assert_eq!(registry.find_by_hostname("shop.com").unwrap().id(), "b");

        // Touching the duplicate without renaming it does not steal the entry.
        registry.save_property("c", "weight", "9").unwrap();
        assert_eq!(registry.find_by_hostname("shop.com").unwrap().id(), "b");

        let update = DomainUpdate {
            hostname: Some("other.com".into()),
            ..Default::default()
        };
        registry.update("c", update).unwrap();
        assert_eq!(registry.find_by_hostname("shop.com").unwrap().id(), "b");
        assert_eq!(registry.find_by_hostname("other.com").unwrap().id(), "c");

        let resolved = crate::resolver::Resolver::new(Arc::new(registry)).resolve("shop.com").unwrap();
        assert_eq!(resolved.id(), "b");
        assert_eq!(resolved.match_type(), MatchType::Exact);
    }

    #[test]
    fn test_wildcard_lookup() {
        let registry = registry_with(&[("a", "example.com"), ("w", "*.example.com"), ("s", "*.shop.example.com")]);
        let snapshot = registry.snapshot();
        assert_eq!(snapshot.wildcard_for("blog.example.com").unwrap().id(), "w");
        assert_eq!(snapshot.wildcard_for("eu.shop.example.com").unwrap().id(), "s");
        assert!(snapshot.wildcard_for("example.org").is_none());
        assert!(snapshot.wildcard_for("example.com").is_none());
    }
}
