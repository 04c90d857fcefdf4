//! # Storage Traits
//!
//! Abstractions that let the domain layer work against any key-value backend
//! and any image file store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::backend::domain::errors::WardrobeError;

/// Process-local mapping from string keys to string values.
///
/// Every operation except `flush` is infallible: the store never looks at
/// value content, so malformed values only surface when a caller decodes them.
pub trait KeyValueStore: Send + Sync {
    /// Store a value, overwriting any previous one
    fn set(&self, key: &str, value: &str);

    /// Read a value
    fn get_string(&self, key: &str) -> Option<String>;

    /// Remove a key; no-op when absent
    fn delete(&self, key: &str);

    /// Every known key, in no particular order
    fn get_all_keys(&self) -> Vec<String>;

    /// Full snapshot of every key and its current value
    fn export_all(&self) -> BTreeMap<String, String>;

    /// Destructive replace: clear every key, then insert `data`
    fn import_all(&self, data: BTreeMap<String, String>);

    /// Persist pending writes. In-memory stores have nothing to do.
    fn flush(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// File operations on images referenced by `file://` URI
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Directory that holds images owned by the wardrobe
    fn images_directory(&self) -> &Path;

    /// Whether `uri` already points inside the images directory
    fn is_managed(&self, uri: &str) -> bool;

    /// Whether the file behind `uri` exists
    async fn exists(&self, uri: &str) -> bool;

    /// Delete the file behind `uri`
    async fn delete(&self, uri: &str) -> Result<(), WardrobeError>;

    /// Move the file behind `uri` into the images directory and return its new URI
    async fn move_into_library(&self, uri: &str) -> Result<String, WardrobeError>;

    /// Copy the file behind `uri` into `dest_dir`, returning the copied path
    async fn copy_to(&self, uri: &str, dest_dir: &Path) -> Result<PathBuf, WardrobeError>;

    /// Copy a file from outside the library (e.g. an unpacked backup) into the
    /// images directory and return its URI
    async fn restore_from(&self, source: &Path) -> Result<String, WardrobeError>;
}
