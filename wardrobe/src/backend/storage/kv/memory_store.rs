use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::backend::storage::traits::KeyValueStore;

/// Key-value store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`
    pub fn with_entries(entries: BTreeMap<String, String>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn set(&self, key: &str, value: &str) {
        self.entries.write().insert(key.to_string(), value.to_string());
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn delete(&self, key: &str) {
        self.entries.write().remove(key);
    }

    fn get_all_keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    fn export_all(&self) -> BTreeMap<String, String> {
        self.entries.read().clone()
    }

    fn import_all(&self, data: BTreeMap<String, String>) {
        let mut entries = self.entries.write();
        entries.clear();
        entries.extend(data);
    }
}
