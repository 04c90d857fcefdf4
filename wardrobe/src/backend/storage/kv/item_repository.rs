use chrono::Utc;
use log::{debug, info};
use std::collections::HashSet;
use std::sync::Arc;

use shared::{Category, ClothingItem, NewClothingItem};

use crate::backend::domain::errors::WardrobeError;
use crate::backend::domain::models::generate_item_id;
use crate::backend::storage::traits::KeyValueStore;

/// Well-known key holding the JSON-encoded item collection
pub const ITEMS_KEY: &str = "wardrobe_items";

/// Typed view over the item collection stored under [`ITEMS_KEY`].
///
/// Every mutation reads the whole collection, changes it and writes it back.
#[derive(Clone)]
pub struct ItemRepository {
    store: Arc<dyn KeyValueStore>,
}

impl ItemRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Decode a raw items value as stored under [`ITEMS_KEY`]
    pub fn decode_items(raw: &str) -> Result<Vec<ClothingItem>, WardrobeError> {
        serde_json::from_str(raw).map_err(|source| WardrobeError::StorageParse {
            key: ITEMS_KEY.to_string(),
            source,
        })
    }

    pub fn encode_items(items: &[ClothingItem]) -> Result<String, WardrobeError> {
        serde_json::to_string(items).map_err(|source| WardrobeError::Serialize {
            what: "wardrobe items",
            source,
        })
    }

    /// All items in insertion order; empty when nothing was ever stored
    pub fn get_all_items(&self) -> Result<Vec<ClothingItem>, WardrobeError> {
        match self.store.get_string(ITEMS_KEY) {
            Some(raw) => Self::decode_items(&raw),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the whole collection
    pub fn save_items(&self, items: &[ClothingItem]) -> Result<(), WardrobeError> {
        let raw = Self::encode_items(items)?;
        self.store.set(ITEMS_KEY, &raw);
        debug!("Saved {} items", items.len());
        Ok(())
    }

    /// Append a new item with a freshly generated id and return it
    pub fn add_item(&self, item: NewClothingItem) -> Result<ClothingItem, WardrobeError> {
        let mut items = self.get_all_items()?;
        let existing: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();

        let mut rng = rand::rng();
        let mut id = generate_item_id(Utc::now().timestamp_millis(), &mut rng);
        while existing.contains(id.as_str()) {
            id = generate_item_id(Utc::now().timestamp_millis(), &mut rng);
        }

        let created = ClothingItem {
            id,
            name: item.name,
            category: item.category,
            image_uri: item.image_uri,
            color: item.color,
        };

        items.push(created.clone());
        self.save_items(&items)?;

        info!("Stored item '{}' ({}) with ID: {}", created.name, created.category, created.id);
        Ok(created)
    }

    pub fn get_items_by_category(&self, category: Category) -> Result<Vec<ClothingItem>, WardrobeError> {
        Ok(self
            .get_all_items()?
            .into_iter()
            .filter(|i| i.category == category)
            .collect())
    }

    /// Remove the item with `id`, returning it. The collection is left
    /// untouched (and not rewritten) when no item matches.
    pub fn remove_item(&self, id: &str) -> Result<Option<ClothingItem>, WardrobeError> {
        let mut items = self.get_all_items()?;

        let position = match items.iter().position(|i| i.id == id) {
            Some(position) => position,
            None => return Ok(None),
        };

        let removed = items.remove(position);
        self.save_items(&items)?;

        info!("Removed item '{}' with ID: {}", removed.name, removed.id);
        Ok(Some(removed))
    }
}

/// Distinct `file://` image URIs referenced by `items`, in item order
pub fn collect_image_uris(items: &[ClothingItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(|i| i.image_uri.as_deref())
        .filter(|uri| uri.starts_with("file://"))
        .filter(|uri| seen.insert(*uri))
        .map(str::to_string)
        .collect()
}
