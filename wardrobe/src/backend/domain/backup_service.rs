//! Backup and restore of the whole wardrobe.
//!
//! A backup document is a snapshot of every key in the store plus the list of
//! image files the items reference. Two flavours exist:
//!
//! - **JSON only** (`export_wardrobe` / `import_wardrobe`): the document as a
//!   string. Image files are listed but not carried along, so a restore on
//!   another device may point at images that do not exist there.
//! - **Backup directory** (`export_to_path` / `import_from_path`): the
//!   document plus an `images/` folder with copies of every referenced file.
//!   Restoring copies the images back into the library and rewrites the
//!   item URIs to match.
//!
//! Imports always validate before asking for confirmation and never touch
//! the store unless the user confirms.

use chrono::Utc;
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use shared::{
    BackupDocument, ExportToPathRequest, ExportToPathResponse, ImportFromPathRequest,
    ImportFromPathResponse,
};

use crate::backend::domain::errors::WardrobeError;
use crate::backend::domain::models::Notice;
use crate::backend::domain::notices::{ConfirmationPrompt, ImportConfirmation, NoticeSink};
use crate::backend::storage::{collect_image_uris, ImageStorage, ItemRepository, KeyValueStore, ITEMS_KEY};

pub const BACKUP_FILE_NAME: &str = "backup.json";
pub const IMAGES_DIR_NAME: &str = "images";
/// Maps each exported image URI to its file name inside `images/`
pub const IMAGE_MANIFEST_FILE_NAME: &str = "images_manifest.json";

/// Result of an import that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported { restored_keys: usize },
    /// The user declined the confirmation; nothing changed
    Cancelled,
}

/// Lenient view of a backup document: every field optional so missing ones
/// can be reported as a format error rather than a parse error
#[derive(Debug, Deserialize)]
struct RawBackupDocument {
    timestamp: Option<String>,
    version: Option<String>,
    data: Option<BTreeMap<String, String>>,
    images: Option<Vec<String>>,
}

/// Service that exports and imports the whole key-value store
#[derive(Clone)]
pub struct BackupService {
    store: Arc<dyn KeyValueStore>,
    images: Arc<dyn ImageStorage>,
    notices: Arc<dyn NoticeSink>,
    confirmation: Arc<dyn ImportConfirmation>,
    default_backup_directory: PathBuf,
}

impl BackupService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        images: Arc<dyn ImageStorage>,
        notices: Arc<dyn NoticeSink>,
        confirmation: Arc<dyn ImportConfirmation>,
        default_backup_directory: PathBuf,
    ) -> Self {
        Self {
            store,
            images,
            notices,
            confirmation,
            default_backup_directory,
        }
    }

    /// Snapshot the store into a document stamped with the current time
    pub fn build_document(&self) -> Result<BackupDocument, WardrobeError> {
        let data = self.store.export_all();
        let images = match data.get(ITEMS_KEY) {
            Some(raw) => collect_image_uris(&ItemRepository::decode_items(raw)?),
            None => Vec::new(),
        };
        Ok(BackupDocument::new(data, images))
    }

    /// Serialize the whole wardrobe. On failure the user is notified and
    /// `None` is returned.
    pub fn export_wardrobe(&self) -> Option<String> {
        info!("Exporting wardrobe as JSON");

        let result = self.build_document().and_then(|document| {
            serde_json::to_string_pretty(&document).map_err(|source| WardrobeError::Serialize {
                what: "backup document",
                source,
            })
        });

        match result {
            Ok(json) => {
                info!("Exported wardrobe backup ({} bytes)", json.len());
                Some(json)
            }
            Err(e) => {
                error!("Export failed: {}", e);
                self.notices
                    .notify(Notice::failure("Export Failed", "Unable to export wardrobe data."));
                None
            }
        }
    }

    /// Parse and validate a backup document. `timestamp` must be present and
    /// non-empty and `data` must be present (it may be empty). Unknown fields
    /// are ignored and any `version` is accepted.
    pub fn parse_document(json: &str) -> Result<BackupDocument, WardrobeError> {
        let raw: RawBackupDocument =
            serde_json::from_str(json).map_err(|e| WardrobeError::InvalidFormat(e.to_string()))?;

        let timestamp = raw
            .timestamp
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| WardrobeError::InvalidFormat("missing timestamp".to_string()))?;
        let data = raw
            .data
            .ok_or_else(|| WardrobeError::InvalidFormat("missing data".to_string()))?;

        if let Some(items) = data.get(ITEMS_KEY) {
            ItemRepository::decode_items(items)
                .map_err(|e| WardrobeError::InvalidFormat(e.to_string()))?;
        }

        Ok(BackupDocument {
            timestamp,
            version: raw.version.unwrap_or_default(),
            data,
            images: raw.images.unwrap_or_default(),
        })
    }

    /// Replace the wardrobe with the content of a JSON backup.
    ///
    /// Only the key-value data is restored; listed images are not.
    /// Returns true only when the import was confirmed and applied.
    pub async fn import_wardrobe(&self, json: &str) -> bool {
        matches!(self.import_document(json).await, Ok(ImportOutcome::Imported { .. }))
    }

    /// Validate a JSON backup, ask for confirmation and apply it.
    ///
    /// Every failure has already been reported to the notice sink when this
    /// returns. Declining the confirmation yields `ImportOutcome::Cancelled`.
    pub async fn import_document(&self, json: &str) -> Result<ImportOutcome, WardrobeError> {
        info!("Importing wardrobe from JSON ({} bytes)", json.len());

        let document = Self::parse_document(json).map_err(|e| {
            error!("Import failed: {}", e);
            self.notices
                .notify(Notice::failure("Import Failed", "Invalid backup file format."));
            e
        })?;

        if !self.confirm_replace().await {
            return Ok(ImportOutcome::Cancelled);
        }

        let restored_keys = self.commit(document.data)?;
        Ok(ImportOutcome::Imported { restored_keys })
    }

    /// Write a backup directory with `backup.json` and copies of every
    /// referenced image under `parent` (or the default backup directory).
    pub async fn export_to_path(&self, request: ExportToPathRequest) -> ExportToPathResponse {
        let parent = match request.custom_path.as_deref() {
            Some(custom) if !custom.trim().is_empty() => PathBuf::from(sanitize_path(custom)),
            _ => self.default_backup_directory.clone(),
        };
        info!("Exporting wardrobe backup under {}", parent.display());

        match self.write_backup_directory(&parent).await {
            Ok(response) => {
                self.notices.notify(Notice::success(
                    "Export Successful",
                    "Wardrobe data has been exported successfully!",
                ));
                if !response.missing_images.is_empty() {
                    self.notices.notify(Notice::info(
                        "Missing Images",
                        format!(
                            "{} image(s) could not be found and were left out of the backup.",
                            response.missing_images.len()
                        ),
                    ));
                }
                response
            }
            Err(e) => {
                error!("Export to {} failed: {}", parent.display(), e);
                self.notices
                    .notify(Notice::failure("Export Failed", "Unable to export wardrobe data."));
                ExportToPathResponse {
                    success: false,
                    message: format!("Failed to export wardrobe: {}", e),
                    backup_path: String::new(),
                    item_count: 0,
                    image_count: 0,
                    missing_images: Vec::new(),
                }
            }
        }
    }

    /// Restore a backup directory (or a bare `backup.json`), including the
    /// packaged images.
    pub async fn import_from_path(&self, request: ImportFromPathRequest) -> ImportFromPathResponse {
        let path = PathBuf::from(sanitize_path(&request.path));
        let (backup_dir, json_path) = if path.is_dir() {
            (path.clone(), path.join(BACKUP_FILE_NAME))
        } else {
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            (dir, path.clone())
        };
        info!("Importing wardrobe backup from {}", json_path.display());

        let document = match fs::read_to_string(&json_path)
            .map_err(|e| WardrobeError::file_operation(json_path.display().to_string(), e))
            .and_then(|json| Self::parse_document(&json))
        {
            Ok(document) => document,
            Err(e) => {
                error!("Import failed: {}", e);
                let message = match &e {
                    WardrobeError::FileOperation { .. } => "Unable to import wardrobe data.",
                    _ => "Invalid backup file format.",
                };
                self.notices.notify(Notice::failure("Import Failed", message));
                return import_failure(format!("Failed to import wardrobe: {}", e));
            }
        };

        if !self.confirm_replace().await {
            return import_failure("Import cancelled".to_string());
        }

        let mut data = document.data;
        let (rewrites, missing_images) = self.restore_images(&backup_dir, &document.images).await;

        if !rewrites.is_empty() {
            if let Some(raw) = data.get(ITEMS_KEY) {
                match rewrite_image_uris(raw, &rewrites) {
                    Ok(updated) => {
                        data.insert(ITEMS_KEY.to_string(), updated);
                    }
                    Err(e) => warn!("Could not point restored items at their images: {}", e),
                }
            }
        }

        match self.commit(data) {
            Ok(restored_keys) => {
                if !missing_images.is_empty() {
                    self.notices.notify(Notice::info(
                        "Missing Images",
                        format!(
                            "{} image(s) referenced by the backup were not found.",
                            missing_images.len()
                        ),
                    ));
                }
                ImportFromPathResponse {
                    success: true,
                    message: format!("Wardrobe imported from {}", backup_dir.display()),
                    restored_keys,
                    restored_images: rewrites.len(),
                    missing_images,
                }
            }
            Err(e) => {
                for restored in rewrites.values() {
                    if let Err(cleanup) = self.images.delete(restored).await {
                        warn!("Could not remove restored image {}: {}", restored, cleanup);
                    }
                }
                import_failure(format!("Failed to import wardrobe: {}", e))
            }
        }
    }

    async fn confirm_replace(&self) -> bool {
        let confirmed = self
            .confirmation
            .confirm(&ConfirmationPrompt::replace_wardrobe())
            .await;
        if !confirmed {
            info!("Import cancelled by user");
        }
        confirmed
    }

    /// Replace the store content and persist it. If persisting fails the
    /// previous content is put back so memory and disk stay in step.
    fn commit(&self, data: BTreeMap<String, String>) -> Result<usize, WardrobeError> {
        let restored_keys = data.len();
        let previous = self.store.export_all();

        self.store.import_all(data);
        if let Err(e) = self.store.flush() {
            error!("Import failed, restoring previous wardrobe: {:#}", e);
            self.store.import_all(previous);
            self.notices
                .notify(Notice::failure("Import Failed", "Unable to import wardrobe data."));
            return Err(WardrobeError::Persist(e));
        }

        info!("Imported {} keys into the store", restored_keys);
        self.notices
            .notify(Notice::success("Success", "Wardrobe imported successfully!"));
        Ok(restored_keys)
    }

    async fn write_backup_directory(&self, parent: &Path) -> Result<ExportToPathResponse, WardrobeError> {
        let document = self.build_document()?;
        let item_count = match document.data.get(ITEMS_KEY) {
            Some(raw) => ItemRepository::decode_items(raw)?.len(),
            None => 0,
        };

        let mut backup_dir = parent.join(format!("wardrobe_backup_{}", Utc::now().format("%Y%m%d_%H%M%S")));
        if backup_dir.exists() {
            backup_dir = parent.join(format!("wardrobe_backup_{}", Utc::now().timestamp_millis()));
        }
        let images_dir = backup_dir.join(IMAGES_DIR_NAME);
        fs::create_dir_all(&images_dir)
            .map_err(|e| WardrobeError::file_operation(images_dir.display().to_string(), e))?;

        let mut manifest = BTreeMap::new();
        let mut missing_images = Vec::new();
        for uri in &document.images {
            match self.images.copy_to(uri, &images_dir).await {
                Ok(copied) => {
                    let file_name = copied
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    manifest.insert(uri.clone(), file_name);
                }
                Err(e) => {
                    warn!("Leaving image out of backup: {}", e);
                    missing_images.push(uri.clone());
                }
            }
        }

        write_json(&backup_dir.join(IMAGE_MANIFEST_FILE_NAME), &manifest)?;
        write_json(&backup_dir.join(BACKUP_FILE_NAME), &document)?;

        info!(
            "Wrote backup to {} ({} items, {} images, {} missing)",
            backup_dir.display(),
            item_count,
            manifest.len(),
            missing_images.len()
        );

        Ok(ExportToPathResponse {
            success: true,
            message: format!("Wardrobe exported to {}", backup_dir.display()),
            backup_path: backup_dir.to_string_lossy().to_string(),
            item_count,
            image_count: manifest.len(),
            missing_images,
        })
    }

    /// Copy packaged images into the library. Returns the URI rewrites
    /// (original -> restored) and the images that could not be restored.
    async fn restore_images(
        &self,
        backup_dir: &Path,
        images: &[String],
    ) -> (BTreeMap<String, String>, Vec<String>) {
        let mut rewrites = BTreeMap::new();
        let mut missing = Vec::new();
        if images.is_empty() {
            return (rewrites, missing);
        }

        let manifest_path = backup_dir.join(IMAGE_MANIFEST_FILE_NAME);
        let manifest: BTreeMap<String, String> = match fs::read_to_string(&manifest_path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring unreadable image manifest {}: {}", manifest_path.display(), e);
                BTreeMap::new()
            }),
            Err(_) => {
                debug!("No image manifest at {}", manifest_path.display());
                BTreeMap::new()
            }
        };

        let images_dir = backup_dir.join(IMAGES_DIR_NAME);
        for uri in images {
            let packaged = match manifest.get(uri).and_then(|name| packaged_file_name(name)) {
                Some(file_name) => images_dir.join(file_name),
                None => {
                    missing.push(uri.clone());
                    continue;
                }
            };

            match self.images.restore_from(&packaged).await {
                Ok(restored) => {
                    rewrites.insert(uri.clone(), restored);
                }
                Err(e) => {
                    warn!("Could not restore image {}: {}", uri, e);
                    missing.push(uri.clone());
                }
            }
        }

        (rewrites, missing)
    }
}

/// A manifest entry must be a bare file name inside `images/`
fn packaged_file_name(name: &str) -> Option<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(name),
        _ => {
            warn!("Ignoring manifest entry outside the images folder: {}", name);
            None
        }
    }
}

fn import_failure(message: String) -> ImportFromPathResponse {
    ImportFromPathResponse {
        success: false,
        message,
        restored_keys: 0,
        restored_images: 0,
        missing_images: Vec::new(),
    }
}

/// Point every item whose image was restored at its new location
fn rewrite_image_uris(raw: &str, rewrites: &BTreeMap<String, String>) -> Result<String, WardrobeError> {
    let mut items = ItemRepository::decode_items(raw)?;
    for item in items.iter_mut() {
        if let Some(new_uri) = item.image_uri.as_ref().and_then(|uri| rewrites.get(uri)) {
            item.image_uri = Some(new_uri.clone());
        }
    }
    ItemRepository::encode_items(&items)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), WardrobeError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| WardrobeError::Serialize {
        what: "backup file",
        source,
    })?;
    fs::write(path, json).map_err(|e| WardrobeError::file_operation(path.display().to_string(), e))
}

/// Strip surrounding quotes and whitespace from a pasted path
fn sanitize_path(path: &str) -> String {
    path.trim().trim_matches('"').trim_matches('\'').trim().to_string()
}
