//! # Backend Module
//!
//! Contains all non-UI logic for the wardrobe application.
//!
//! This module brings together:
//! - **Storage**: the key-value store, the item repository and image files
//! - **Domain**: wardrobe management, outfit selection and backup/restore
//! - **IO**: the console surface that exposes the domain to a user
//!
//! ## Architecture
//!
//! ```text
//! UI / CLI
//!     ↓
//! IO Layer (console notices, confirmation, command dispatch)
//!     ↓
//! Domain Layer (services)
//!     ↓
//! Storage Layer (key-value store, image files)
//! ```
//!
//! The store is created once per session by [`initialize_backend`] and handed
//! to every service that needs it; [`AppState::shutdown`] flushes it.

pub mod config;
pub mod storage;
pub mod domain;
pub mod io;

use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;

use crate::backend::config::AppConfig;
use crate::backend::domain::{BackupService, ImportConfirmation, NoticeSink, WardrobeService};
use crate::backend::storage::{FileStore, ItemRepository, KeyValueStore, LocalImageStorage};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn KeyValueStore>,
    pub wardrobe_service: WardrobeService,
    pub backup_service: BackupService,
}

impl AppState {
    /// Flush pending store writes to disk
    pub fn shutdown(&self) -> Result<()> {
        info!("Shutting down, flushing store");
        self.store.flush().context("Failed to flush wardrobe store")
    }
}

/// Initialize the backend with all required services
pub fn initialize_backend(
    config: AppConfig,
    notices: Arc<dyn NoticeSink>,
    confirmation: Arc<dyn ImportConfirmation>,
) -> Result<AppState> {
    info!("Setting up storage in {}", config.data_directory.display());
    let store: Arc<dyn KeyValueStore> = Arc::new(
        FileStore::open(config.store_path()).context("Failed to open wardrobe store")?,
    );
    let images = Arc::new(
        LocalImageStorage::new(config.images_path()).context("Failed to prepare images directory")?,
    );

    info!("Setting up domain services");
    let wardrobe_service = WardrobeService::new(
        ItemRepository::new(store.clone()),
        images.clone(),
        notices.clone(),
    );
    let backup_service = BackupService::new(
        store.clone(),
        images,
        notices,
        confirmation,
        config.backup_path(),
    );

    Ok(AppState {
        config,
        store,
        wardrobe_service,
        backup_service,
    })
}
