//! # Domain Module
//!
//! Business logic for the wardrobe catalog, independent of any UI and of the
//! concrete storage backend.
//!
//! ## Module Organization
//!
//! - **wardrobe_service**: adding, listing and deleting clothing items
//! - **outfit_selector**: random and swipe-driven outfit assembly with locks
//! - **backup_service**: export/import of the whole store, with or without images
//! - **notices**: the user-facing notice and confirmation seams
//! - **errors**: the error taxonomy shared by storage and domain
//!
//! ## Business Rules
//!
//! - Item names are trimmed and must not be empty
//! - Items are never edited in place, only added or deleted
//! - Deleting an item removes its photo, but a missing photo never blocks it
//! - A locked outfit slot keeps its selection through generate and swipe
//! - Imports are validated first and only applied after explicit confirmation

pub mod errors;
pub mod models;
pub mod notices;
pub mod wardrobe_service;
pub mod outfit_selector;
pub mod backup_service;

pub use errors::WardrobeError;
pub use models::{Notice, NoticeKind};
pub use notices::{AlwaysConfirm, ConfirmationPrompt, ImportConfirmation, NoticeSink};
pub use wardrobe_service::WardrobeService;
pub use outfit_selector::{GenerateOutcome, OutfitSelector, OutfitSlot};
pub use backup_service::{BackupService, ImportOutcome};
