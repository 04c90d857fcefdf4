use log::{debug, info, warn};
use std::sync::Arc;

use shared::{Category, ClothingItem, NewClothingItem, WardrobeSummary};

use crate::backend::domain::errors::WardrobeError;
use crate::backend::domain::models::Notice;
use crate::backend::domain::notices::NoticeSink;
use crate::backend::domain::outfit_selector::OutfitSelector;
use crate::backend::storage::{uri_to_path, ImageStorage, ItemRepository};

const MAX_NAME_LEN: usize = 100;

/// Service for cataloguing clothing items
#[derive(Clone)]
pub struct WardrobeService {
    items: ItemRepository,
    images: Arc<dyn ImageStorage>,
    notices: Arc<dyn NoticeSink>,
}

impl WardrobeService {
    pub fn new(items: ItemRepository, images: Arc<dyn ImageStorage>, notices: Arc<dyn NoticeSink>) -> Self {
        Self { items, images, notices }
    }

    /// Add an item to the wardrobe.
    ///
    /// A photo living outside the images directory (fresh from the camera or
    /// gallery) is moved into it first. If the move fails the item keeps the
    /// original URI.
    pub async fn add_item(&self, request: NewClothingItem) -> Result<ClothingItem, WardrobeError> {
        info!("Adding item: name={}, category={}", request.name, request.category);

        let name = request.name.trim().to_string();
        if let Err(e) = Self::validate_name(&name) {
            self.notices.notify(Notice::failure("Error", e.to_string()));
            return Err(e);
        }

        // The photo only leaves its original location once the collection
        // is known to be readable
        self.items.get_all_items().map_err(|e| {
            warn!("Not adding '{}', wardrobe cannot be read: {}", name, e);
            self.notices.notify(Notice::failure("Error", "Failed to save item"));
            e
        })?;

        let image_uri = match request.image_uri {
            Some(uri) if uri_to_path(&uri).is_some() && !self.images.is_managed(&uri) => {
                match self.images.move_into_library(&uri).await {
                    Ok(moved) => Some(moved),
                    Err(e) => {
                        warn!("Keeping original image location for '{}': {}", name, e);
                        Some(uri)
                    }
                }
            }
            other => other,
        };

        let created = self
            .items
            .add_item(NewClothingItem {
                name,
                image_uri,
                ..request
            })
            .map_err(|e| {
                self.notices.notify(Notice::failure("Error", "Failed to save item"));
                e
            })?;

        self.notices.notify(Notice::success(
            "Item Added!",
            format!("{} has been added to your wardrobe.", created.name),
        ));
        Ok(created)
    }

    pub fn list_items(&self) -> Result<Vec<ClothingItem>, WardrobeError> {
        self.items.get_all_items().map_err(|e| self.load_failed(e))
    }

    pub fn items_by_category(&self, category: Category) -> Result<Vec<ClothingItem>, WardrobeError> {
        self.items
            .get_items_by_category(category)
            .map_err(|e| self.load_failed(e))
    }

    /// Delete an item and, best-effort, its image file.
    ///
    /// Returns false when no item has `item_id`. An image still referenced by
    /// another item is left on disk.
    pub async fn delete_item(&self, item_id: &str) -> Result<bool, WardrobeError> {
        info!("Deleting item: {}", item_id);

        let items = self.list_items()?;
        let item = match items.iter().find(|i| i.id == item_id) {
            Some(item) => item,
            None => {
                debug!("Item not found: {}", item_id);
                return Ok(false);
            }
        };

        if let Some(uri) = item.image_uri.as_deref().filter(|uri| uri_to_path(uri).is_some()) {
            let shared_image = items
                .iter()
                .any(|other| other.id != item.id && other.image_uri.as_deref() == Some(uri));

            if shared_image {
                debug!("Image {} is used by another item, keeping it", uri);
            } else if let Err(e) = self.images.delete(uri).await {
                warn!("Could not delete image for item {}: {}", item_id, e);
            }
        }

        self.items.remove_item(item_id).map_err(|e| {
            self.notices.notify(Notice::failure("Error", "Failed to delete item"));
            e
        })?;

        Ok(true)
    }

    /// Selector primed with the current Top, Bottom and Shoes lists
    pub fn outfit_selector(&self) -> Result<OutfitSelector, WardrobeError> {
        Ok(OutfitSelector::new(
            self.items_by_category(Category::Top)?,
            self.items_by_category(Category::Bottom)?,
            self.items_by_category(Category::Shoes)?,
        ))
    }

    /// Reload every outfit slot, keeping selections whose items survived
    pub fn refresh_selector(&self, selector: &mut OutfitSelector) -> Result<(), WardrobeError> {
        for category in Category::OUTFIT {
            selector.replace_items(category, self.items_by_category(category)?);
        }
        Ok(())
    }

    pub fn summary(&self) -> Result<WardrobeSummary, WardrobeError> {
        let items = self.list_items()?;
        let counts = Category::ALL
            .iter()
            .map(|c| (*c, items.iter().filter(|i| i.category == *c).count()))
            .collect();

        Ok(WardrobeSummary {
            total_items: items.len(),
            counts,
        })
    }

    fn validate_name(name: &str) -> Result<(), WardrobeError> {
        if name.is_empty() {
            return Err(WardrobeError::Validation("Please enter an item name".to_string()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(WardrobeError::Validation(format!(
                "Item name cannot exceed {} characters",
                MAX_NAME_LEN
            )));
        }
        Ok(())
    }

    fn load_failed(&self, e: WardrobeError) -> WardrobeError {
        warn!("Failed to load wardrobe: {}", e);
        self.notices.notify(Notice::failure("Error", "Unable to load wardrobe data."));
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::notices::testing::RecordingNoticeSink;
    use crate::backend::storage::test_utils::TestEnvironment;
    use crate::backend::storage::{path_to_uri, KeyValueStore, ITEMS_KEY};
    use std::fs;

    fn setup() -> (WardrobeService, Arc<RecordingNoticeSink>, TestEnvironment) {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let notices = Arc::new(RecordingNoticeSink::default());
        let service = WardrobeService::new(env.item_repository(), env.images.clone(), notices.clone());
        (service, notices, env)
    }

    #[tokio::test]
    async fn test_add_item_trims_name_and_notifies() {
        let (service, notices, _env) = setup();

        let item = service
            .add_item(NewClothingItem::new("  Red Cap ", Category::Accessory).with_color("#FF6B6B"))
            .await
            .expect("Failed to add item");

        assert_eq!(item.name, "Red Cap");
        assert_eq!(item.color.as_deref(), Some("#FF6B6B"));
        let notice = notices.last().unwrap();
        assert_eq!(notice.title, "Item Added!");
        assert_eq!(notice.message, "Red Cap has been added to your wardrobe.");
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected_before_storage() {
        let (service, notices, env) = setup();

        let err = service
            .add_item(NewClothingItem::new("   ", Category::Top))
            .await
            .unwrap_err();

        assert!(matches!(err, WardrobeError::Validation(_)));
        assert_eq!(notices.last().unwrap().message, "Please enter an item name");
        assert!(env.store.get_string(ITEMS_KEY).is_none());
    }

    #[tokio::test]
    async fn test_overlong_name_is_rejected() {
        let (service, _notices, _env) = setup();
        let name = "x".repeat(MAX_NAME_LEN + 1);

        let err = service.add_item(NewClothingItem::new(name, Category::Top)).await.unwrap_err();
        assert!(matches!(err, WardrobeError::Validation(_)));
    }

    #[tokio::test]
    async fn test_captured_photo_moves_into_library() {
        let (service, _notices, env) = setup();
        let captured = env.capture_photo("tee.jpg");

        let item = service
            .add_item(NewClothingItem::new("Tee", Category::Top).with_image_uri(captured.clone()))
            .await
            .unwrap();

        let stored_uri = item.image_uri.unwrap();
        assert_ne!(stored_uri, captured);
        assert!(env.images.is_managed(&stored_uri));
        assert!(uri_to_path(&stored_uri).unwrap().exists());
        assert!(!uri_to_path(&captured).unwrap().exists());
    }

    #[tokio::test]
    async fn test_failed_photo_move_keeps_original_uri() {
        let (service, _notices, env) = setup();
        let missing = path_to_uri(&env.base_directory().join("gone.jpg"));

        let item = service
            .add_item(NewClothingItem::new("Tee", Category::Top).with_image_uri(missing.clone()))
            .await
            .unwrap();

        assert_eq!(item.image_uri, Some(missing));
    }

    #[tokio::test]
    async fn test_delete_item_removes_image_file() {
        let (service, _notices, env) = setup();
        let item = service
            .add_item(NewClothingItem::new("Boots", Category::Shoes).with_image_uri(env.capture_photo("boots.jpg")))
            .await
            .unwrap();
        let image_path = uri_to_path(item.image_uri.as_deref().unwrap()).unwrap();
        assert!(image_path.exists());

        assert!(service.delete_item(&item.id).await.unwrap());

        assert!(!image_path.exists());
        assert!(service.list_items().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_item_proceeds_when_image_is_missing() {
        let (service, _notices, env) = setup();
        let item = service
            .add_item(NewClothingItem::new("Boots", Category::Shoes).with_image_uri(env.capture_photo("boots.jpg")))
            .await
            .unwrap();
        fs::remove_file(uri_to_path(item.image_uri.as_deref().unwrap()).unwrap()).unwrap();

        assert!(service.delete_item(&item.id).await.unwrap());
        assert!(service.list_items().unwrap().iter().all(|i| i.id != item.id));
    }

    #[tokio::test]
    async fn test_delete_keeps_image_shared_with_another_item() {
        let (service, _notices, env) = setup();
        let first = service
            .add_item(NewClothingItem::new("Tee", Category::Top).with_image_uri(env.capture_photo("tee.jpg")))
            .await
            .unwrap();
        let uri = first.image_uri.clone().unwrap();
        let second = service
            .add_item(NewClothingItem::new("Tee (copy)", Category::Top).with_image_uri(uri.clone()))
            .await
            .unwrap();

        assert!(service.delete_item(&first.id).await.unwrap());

        assert!(uri_to_path(&uri).unwrap().exists());
        assert_eq!(service.list_items().unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_returns_false() {
        let (service, _notices, _env) = setup();
        service.add_item(NewClothingItem::new("Tee", Category::Top)).await.unwrap();

        assert!(!service.delete_item("missing").await.unwrap());
        assert_eq!(service.list_items().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_collection_notifies_and_aborts() {
        let (service, notices, env) = setup();
        env.store.set(ITEMS_KEY, "garbage");

        assert!(service.list_items().is_err());
        assert_eq!(notices.last().unwrap().message, "Unable to load wardrobe data.");

        assert!(service.delete_item("any").await.is_err());
        assert_eq!(env.store.get_string(ITEMS_KEY), Some("garbage".to_string()));
    }

    #[tokio::test]
    async fn test_unreadable_collection_leaves_photo_in_place() {
        let (service, notices, env) = setup();
        env.store.set(ITEMS_KEY, "garbage");
        let captured = env.capture_photo("tee.jpg");

        let err = service
            .add_item(NewClothingItem::new("Tee", Category::Top).with_image_uri(captured.clone()))
            .await
            .unwrap_err();

        assert!(matches!(err, WardrobeError::StorageParse { .. }));
        assert!(uri_to_path(&captured).unwrap().exists());
        assert!(fs::read_dir(env.images.images_directory()).unwrap().next().is_none());
        assert_eq!(notices.last().unwrap().message, "Failed to save item");
        assert_eq!(env.store.get_string(ITEMS_KEY), Some("garbage".to_string()));
    }

    #[tokio::test]
    async fn test_summary_and_outfit_selector() {
        let (service, _notices, _env) = setup();
        for (name, category) in [
            ("Tee", Category::Top),
            ("Shirt", Category::Top),
            ("Jeans", Category::Bottom),
            ("Parka", Category::Outerwear),
        ] {
            service.add_item(NewClothingItem::new(name, category)).await.unwrap();
        }

        let summary = service.summary().unwrap();
        assert_eq!(summary.total_items, 4);
        assert!(summary.counts.contains(&(Category::Top, 2)));
        assert!(summary.counts.contains(&(Category::Shoes, 0)));

        let selector = service.outfit_selector().unwrap();
        assert_eq!(selector.slot(Category::Top).unwrap().items().len(), 2);
        assert_eq!(selector.slot(Category::Bottom).unwrap().items().len(), 1);
        assert!(selector.slot(Category::Shoes).unwrap().items().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_selector_picks_up_new_items() {
        let (service, _notices, _env) = setup();
        let mut selector = service.outfit_selector().unwrap();
        assert!(selector.slot(Category::Shoes).unwrap().items().is_empty());

        service.add_item(NewClothingItem::new("Boots", Category::Shoes)).await.unwrap();
        service.refresh_selector(&mut selector).unwrap();

        assert_eq!(selector.slot(Category::Shoes).unwrap().items().len(), 1);
    }
}
