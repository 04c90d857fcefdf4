use anyhow::{Context, Result};
use log::{debug, error, info};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use super::memory_store::MemoryStore;
use crate::backend::storage::traits::KeyValueStore;

/// Key-value store persisted as a single JSON object on disk.
///
/// The file is read once when the store is opened. Writes go to memory and
/// mark the store dirty; `flush` (or dropping the store) writes the whole map
/// back with a temp-file rename so a crash never leaves a half-written file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
    dirty: AtomicBool,
}

impl FileStore {
    /// Open the store at `path`, creating parent directories as needed.
    /// A missing or empty file starts an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create store directory {}", parent.display())
                })?;
            }
        }

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store file {}", path.display()))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str::<BTreeMap<String, String>>(&content).with_context(|| {
                    format!("Store file {} is not a JSON object of strings", path.display())
                })?
            }
        } else {
            debug!("No store file at {}, starting empty", path.display());
            BTreeMap::new()
        };

        info!("Opened store {} with {} keys", path.display(), entries.len());

        Ok(Self {
            path,
            inner: MemoryStore::with_entries(entries),
            dirty: AtomicBool::new(false),
        })
    }

    /// Whether there are writes not yet flushed to disk
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    fn write_to_disk(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.inner.export_all())
            .context("Failed to serialize store contents")?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn set(&self, key: &str, value: &str) {
        self.inner.set(key, value);
        self.mark_dirty();
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.inner.get_string(key)
    }

    fn delete(&self, key: &str) {
        if self.inner.get_string(key).is_some() {
            self.inner.delete(key);
            self.mark_dirty();
        }
    }

    fn get_all_keys(&self) -> Vec<String> {
        self.inner.get_all_keys()
    }

    fn export_all(&self) -> BTreeMap<String, String> {
        self.inner.export_all()
    }

    fn import_all(&self, data: BTreeMap<String, String>) {
        self.inner.import_all(data);
        self.mark_dirty();
    }

    fn flush(&self) -> Result<()> {
        if !self.is_dirty() {
            return Ok(());
        }

        self.write_to_disk()?;
        self.dirty.store(false, Ordering::SeqCst);
        debug!("Flushed store to {}", self.path.display());
        Ok(())
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        if self.is_dirty() {
            if let Err(e) = self.flush() {
                error!("Failed to flush store {} on shutdown: {:#}", self.path.display(), e);
            }
        }
    }
}
