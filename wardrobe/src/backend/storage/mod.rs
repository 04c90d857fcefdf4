//! # Storage Module
//!
//! Handles all data persistence for the wardrobe catalog.
//!
//! Everything structured lives in a flat key-value store: the item collection
//! is a single JSON-encoded value under one well-known key, and backups are a
//! snapshot of every key. Image files are owned by the filesystem and are
//! only ever referenced by `file://` URI.
//!
//! ## Key Responsibilities
//!
//! - **Key-Value Store**: in-memory and JSON-file backed implementations of
//!   [`KeyValueStore`], injected into everything that needs them
//! - **Item Repository**: typed read-modify-write view over the items key
//! - **Image Storage**: moving, copying and deleting referenced image files
//!
//! ## Design Principles
//!
//! - **Whole-collection writes**: wardrobes are small, so there are no per-item
//!   keys or indexes
//! - **Dependency Inversion**: the domain layer only sees the traits
//! - **Testability**: the in-memory store and temp directories make every
//!   repository testable without touching user data

pub mod traits;
pub mod kv;
pub mod images;

#[cfg(test)]
pub mod test_utils;

pub use traits::{ImageStorage, KeyValueStore};
pub use kv::{collect_image_uris, FileStore, ItemRepository, MemoryStore, ITEMS_KEY};
pub use images::{path_to_uri, uri_to_path, LocalImageStorage};
