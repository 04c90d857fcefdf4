/// Test utilities module for automatic cleanup and consistent test infrastructure
///
/// This module provides RAII-based cleanup that guarantees test data is removed
/// even if tests panic or fail.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tempfile::TempDir;

use super::images::{path_to_uri, LocalImageStorage};
use super::kv::{FileStore, ItemRepository};
use super::traits::KeyValueStore;

/// RAII Test Environment that automatically cleans up on drop
///
/// Holds a file-backed store and an images directory under a temp dir.
pub struct TestEnvironment {
    /// The temporary directory - kept alive to prevent auto-cleanup until drop
    _temp_dir: TempDir,
    pub store: Arc<FileStore>,
    pub images: Arc<LocalImageStorage>,
    /// Base directory path for manual inspection if needed
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let store = Arc::new(FileStore::open(base_path.join("wardrobe_store.json"))?);
        let images = Arc::new(LocalImageStorage::new(base_path.join("images"))?);

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            store,
            images,
            base_path,
        })
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    pub fn item_repository(&self) -> ItemRepository {
        ItemRepository::new(self.store())
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }

    /// Write a fake photo outside the images directory and return its URI,
    /// as a camera capture would
    pub fn capture_photo(&self, file_name: &str) -> String {
        let captures = self.base_path.join("captures");
        let _ = fs::create_dir_all(&captures);
        let path = captures.join(file_name);
        let _ = fs::write(&path, file_name.as_bytes());
        path_to_uri(&path)
    }
}
