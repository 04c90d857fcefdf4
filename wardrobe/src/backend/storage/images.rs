use async_trait::async_trait;
use chrono::Utc;
use fs_extra::file::{copy as copy_file, move_file, CopyOptions};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::domain::errors::WardrobeError;
use crate::backend::storage::traits::ImageStorage;

const FILE_SCHEME: &str = "file://";

/// Resolve a `file://` URI to a local path. Any other scheme yields `None`.
pub fn uri_to_path(uri: &str) -> Option<PathBuf> {
    uri.strip_prefix(FILE_SCHEME)
        .filter(|rest| !rest.is_empty())
        .map(PathBuf::from)
}

pub fn path_to_uri(path: &Path) -> String {
    format!("{}{}", FILE_SCHEME, path.display())
}

/// Image files kept in a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalImageStorage {
    images_directory: PathBuf,
}

impl LocalImageStorage {
    /// Create the storage, creating `images_directory` if needed
    pub fn new<P: AsRef<Path>>(images_directory: P) -> anyhow::Result<Self> {
        let images_directory = images_directory.as_ref().to_path_buf();
        if !images_directory.exists() {
            fs::create_dir_all(&images_directory)?;
            info!("Created images directory: {}", images_directory.display());
        }
        Ok(Self { images_directory })
    }

    fn resolve(uri: &str) -> Result<PathBuf, WardrobeError> {
        uri_to_path(uri).ok_or_else(|| WardrobeError::file_operation(uri, "not a file:// URI"))
    }

    /// Pick a destination in `dir` for the source's file name. A taken name
    /// gets the current millis as prefix, plus a counter until it is free.
    fn free_destination(dir: &Path, source: &Path) -> PathBuf {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());

        let candidate = dir.join(&file_name);
        if !candidate.exists() {
            return candidate;
        }

        let millis = Utc::now().timestamp_millis();
        let mut candidate = dir.join(format!("{}_{}", millis, file_name));
        let mut counter = 1;
        while candidate.exists() {
            candidate = dir.join(format!("{}_{}_{}", millis, counter, file_name));
            counter += 1;
        }
        candidate
    }
}

#[async_trait]
impl ImageStorage for LocalImageStorage {
    fn images_directory(&self) -> &Path {
        &self.images_directory
    }

    fn is_managed(&self, uri: &str) -> bool {
        uri_to_path(uri)
            .map(|p| p.starts_with(&self.images_directory))
            .unwrap_or(false)
    }

    async fn exists(&self, uri: &str) -> bool {
        uri_to_path(uri).map(|p| p.is_file()).unwrap_or(false)
    }

    async fn delete(&self, uri: &str) -> Result<(), WardrobeError> {
        let path = Self::resolve(uri)?;
        fs::remove_file(&path).map_err(|e| WardrobeError::file_operation(uri, e))?;
        debug!("Deleted image {}", path.display());
        Ok(())
    }

    async fn move_into_library(&self, uri: &str) -> Result<String, WardrobeError> {
        let source = Self::resolve(uri)?;
        if !source.is_file() {
            return Err(WardrobeError::file_operation(uri, "source file does not exist"));
        }

        let destination = Self::free_destination(&self.images_directory, &source);
        move_file(&source, &destination, &CopyOptions::new())
            .map_err(|e| WardrobeError::file_operation(uri, e))?;

        info!("Moved image {} into {}", source.display(), destination.display());
        Ok(path_to_uri(&destination))
    }

    async fn copy_to(&self, uri: &str, dest_dir: &Path) -> Result<PathBuf, WardrobeError> {
        let source = Self::resolve(uri)?;
        if !source.is_file() {
            return Err(WardrobeError::file_operation(uri, "source file does not exist"));
        }

        if !dest_dir.exists() {
            fs::create_dir_all(dest_dir).map_err(|e| WardrobeError::file_operation(uri, e))?;
        }

        let destination = Self::free_destination(dest_dir, &source);
        copy_file(&source, &destination, &CopyOptions::new())
            .map_err(|e| WardrobeError::file_operation(uri, e))?;
        Ok(destination)
    }

    async fn restore_from(&self, source: &Path) -> Result<String, WardrobeError> {
        let source_uri = path_to_uri(source);
        if !source.is_file() {
            return Err(WardrobeError::file_operation(source_uri, "source file does not exist"));
        }

        let destination = Self::free_destination(&self.images_directory, source);
        copy_file(source, &destination, &CopyOptions::new())
            .map_err(|e| WardrobeError::file_operation(source_uri, e))?;
        Ok(path_to_uri(&destination))
    }
}
