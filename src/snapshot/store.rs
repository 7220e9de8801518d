//! Keyed snapshot persistence.

use std::collections::BTreeMap;

use tracing::trace;

use crate::errors::ExpectResult;
use crate::value::Shared;

/// Storage contract for keyed snapshots.
///
/// Writes may be buffered; [`SnapshotStore::save`] flushes them.
pub trait SnapshotStore {
    fn read(&self, key: &str) -> ExpectResult<Option<String>>;

    fn write(&mut self, key: &str, snapshot: &str) -> ExpectResult<()>;

    fn delete(&mut self, key: &str) -> ExpectResult<()>;

    /// All stored keys, sorted.
    fn keys(&self) -> ExpectResult<Vec<String>>;

    fn save(&mut self) -> ExpectResult<()> {
        Ok(())
    }
}

/// In-process store. Clones share the same entries, so a test can keep a
/// handle and inspect what an assertion wrote.
#[derive(Clone, Default)]
pub struct MemorySnapshotStore {
    entries: Shared<BTreeMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with `entries`.
    pub fn with_entries<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let store = Self::new();
        store
            .entries
            .borrow_mut()
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        store
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn read(&self, key: &str) -> ExpectResult<Option<String>> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, snapshot: &str) -> ExpectResult<()> {
        trace!("Writing snapshot {}", key);
        self.entries.borrow_mut().insert(key.to_string(), snapshot.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> ExpectResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> ExpectResult<Vec<String>> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}
