//! Key-value backed storage: the stores themselves and the item repository
//! layered on top of them.

pub mod memory_store;
pub mod file_store;
pub mod item_repository;

pub use memory_store::MemoryStore;
pub use file_store::FileStore;
pub use item_repository::{collect_image_uris, ItemRepository, ITEMS_KEY};
