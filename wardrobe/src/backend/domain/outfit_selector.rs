use log::debug;
use rand::Rng;

use shared::{Category, ClothingItem, Outfit, SwipeDirection};

use super::models::Notice;

/// One outfit position (Top, Bottom or Shoes) with its candidate items
#[derive(Debug, Clone)]
pub struct OutfitSlot {
    category: Category,
    items: Vec<ClothingItem>,
    index: usize,
    has_selection: bool,
    locked: bool,
}

impl OutfitSlot {
    pub fn new(category: Category, items: Vec<ClothingItem>) -> Self {
        Self {
            category,
            items,
            index: 0,
            has_selection: false,
            locked: false,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn items(&self) -> &[ClothingItem] {
        &self.items
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn selection(&self) -> Option<&ClothingItem> {
        if self.has_selection {
            self.items.get(self.index)
        } else {
            None
        }
    }

    fn can_change(&self) -> bool {
        !self.locked && !self.items.is_empty()
    }

    fn randomize<R: Rng>(&mut self, rng: &mut R) -> bool {
        if !self.can_change() {
            return false;
        }
        self.index = rng.random_range(0..self.items.len());
        self.has_selection = true;
        true
    }

    fn advance(&mut self, direction: SwipeDirection) -> bool {
        if !self.can_change() {
            return false;
        }
        let len = self.items.len();
        self.index = match direction {
            SwipeDirection::Forward => (self.index + 1) % len,
            SwipeDirection::Backward => (self.index + len - 1) % len,
        };
        self.has_selection = true;
        true
    }

    fn select_item(&mut self, item_id: &str) -> bool {
        if self.locked {
            return false;
        }
        match self.items.iter().position(|i| i.id == item_id) {
            Some(position) => {
                self.index = position;
                self.has_selection = true;
                true
            }
            None => false,
        }
    }

    /// Swap in a fresh item list, keeping the current selection when its
    /// item is still present
    fn replace_items(&mut self, items: Vec<ClothingItem>) {
        let selected_id = self.selection().map(|i| i.id.clone());
        self.items = items;

        match selected_id.and_then(|id| self.items.iter().position(|i| i.id == id)) {
            Some(position) => self.index = position,
            None => {
                self.index = 0;
                self.has_selection = false;
            }
        }
    }
}

/// What a call to [`OutfitSelector::generate`] did
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerateOutcome {
    /// Slots that received a new random pick
    pub changed: Vec<Category>,
    /// Slots with no items at all
    pub needs_more_items: Vec<Category>,
}

impl GenerateOutcome {
    pub fn is_complete(&self) -> bool {
        self.needs_more_items.is_empty()
    }

    /// "Add More Items" prompt listing the empty categories, if any
    pub fn needs_more_notice(&self) -> Option<Notice> {
        if self.needs_more_items.is_empty() {
            return None;
        }
        let labels: Vec<&str> = self.needs_more_items.iter().map(|c| c.plural_label()).collect();
        Some(Notice::info(
            "Add More Items",
            format!("Add more {} to get a complete outfit!", labels.join(", ")),
        ))
    }
}

/// Random and swipe-driven outfit assembly over the Top, Bottom and Shoes
/// lists. A locked slot keeps its selection until it is unlocked.
#[derive(Debug, Clone)]
pub struct OutfitSelector {
    slots: [OutfitSlot; 3],
}

impl OutfitSelector {
    pub fn new(tops: Vec<ClothingItem>, bottoms: Vec<ClothingItem>, shoes: Vec<ClothingItem>) -> Self {
        Self {
            slots: [
                OutfitSlot::new(Category::Top, tops),
                OutfitSlot::new(Category::Bottom, bottoms),
                OutfitSlot::new(Category::Shoes, shoes),
            ],
        }
    }

    pub fn slots(&self) -> &[OutfitSlot] {
        &self.slots
    }

    /// The slot for `category`; `None` for categories that are not part of an outfit
    pub fn slot(&self, category: Category) -> Option<&OutfitSlot> {
        self.slots.iter().find(|s| s.category == category)
    }

    fn slot_mut(&mut self, category: Category) -> Option<&mut OutfitSlot> {
        self.slots.iter_mut().find(|s| s.category == category)
    }

    /// Pick a random item for every unlocked, non-empty slot
    pub fn generate<R: Rng>(&mut self, rng: &mut R) -> GenerateOutcome {
        let mut outcome = GenerateOutcome::default();

        for slot in self.slots.iter_mut() {
            if slot.randomize(rng) {
                outcome.changed.push(slot.category);
            }
            if slot.items.is_empty() {
                outcome.needs_more_items.push(slot.category);
            }
        }

        debug!(
            "Generated outfit: changed={:?} needs_more_items={:?}",
            outcome.changed, outcome.needs_more_items
        );
        outcome
    }

    /// Step one slot forward or backward with wrap-around. Returns false when
    /// the slot is locked, empty, or not an outfit category.
    pub fn advance(&mut self, category: Category, direction: SwipeDirection) -> bool {
        self.slot_mut(category)
            .map(|slot| slot.advance(direction))
            .unwrap_or(false)
    }

    /// Flip the lock on a slot and return the new state
    pub fn toggle_lock(&mut self, category: Category) -> bool {
        match self.slot_mut(category) {
            Some(slot) => {
                slot.locked = !slot.locked;
                slot.locked
            }
            None => false,
        }
    }

    pub fn set_locked(&mut self, category: Category, locked: bool) {
        if let Some(slot) = self.slot_mut(category) {
            slot.locked = locked;
        }
    }

    pub fn is_locked(&self, category: Category) -> bool {
        self.slot(category).map(|s| s.locked).unwrap_or(false)
    }

    /// Point an unlocked slot at a specific item
    pub fn select_item(&mut self, category: Category, item_id: &str) -> bool {
        self.slot_mut(category)
            .map(|slot| slot.select_item(item_id))
            .unwrap_or(false)
    }

    /// Replace the candidate list of a slot after the wardrobe changed
    pub fn replace_items(&mut self, category: Category, items: Vec<ClothingItem>) {
        if let Some(slot) = self.slot_mut(category) {
            slot.replace_items(items);
        }
    }

    pub fn selection(&self, category: Category) -> Option<&ClothingItem> {
        self.slot(category).and_then(|s| s.selection())
    }

    pub fn current_outfit(&self) -> Outfit {
        Outfit {
            top: self.selection(Category::Top).cloned(),
            bottom: self.selection(Category::Bottom).cloned(),
            shoes: self.selection(Category::Shoes).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn items(category: Category, count: usize) -> Vec<ClothingItem> {
        (0..count)
            .map(|i| ClothingItem {
                id: format!("{}-{}", category, i),
                name: format!("{} #{}", category, i),
                category,
                image_uri: None,
                color: None,
            })
            .collect()
    }

    fn selector(tops: usize, bottoms: usize, shoes: usize) -> OutfitSelector {
        OutfitSelector::new(
            items(Category::Top, tops),
            items(Category::Bottom, bottoms),
            items(Category::Shoes, shoes),
        )
    }

    #[test]
    fn test_starts_without_selection() {
        let selector = selector(2, 2, 2);
        assert_eq!(selector.current_outfit(), Outfit::default());
    }

    #[test]
    fn test_generate_fills_every_slot() {
        let mut selector = selector(3, 4, 5);
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = selector.generate(&mut rng);

        assert_eq!(outcome.changed, Category::OUTFIT.to_vec());
        assert!(outcome.is_complete());
        assert!(outcome.needs_more_notice().is_none());
        for category in Category::OUTFIT {
            let slot = selector.slot(category).unwrap();
            assert!(slot.index() < slot.items().len());
            assert_eq!(selector.selection(category).unwrap().category, category);
        }
    }

    #[test]
    fn test_generate_reports_empty_categories() {
        let mut selector = selector(2, 0, 0);
        let mut rng = StdRng::seed_from_u64(2);

        let outcome = selector.generate(&mut rng);

        assert_eq!(outcome.changed, vec![Category::Top]);
        assert_eq!(outcome.needs_more_items, vec![Category::Bottom, Category::Shoes]);
        let notice = outcome.needs_more_notice().unwrap();
        assert_eq!(notice.title, "Add More Items");
        assert_eq!(notice.message, "Add more Bottoms, Shoes to get a complete outfit!");
        assert!(selector.selection(Category::Bottom).is_none());
    }

    #[test]
    fn test_generate_never_changes_locked_slot() {
        let mut selector = selector(5, 5, 5);
        assert!(selector.select_item(Category::Top, "Top-3"));
        assert!(selector.toggle_lock(Category::Top));

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = selector.generate(&mut rng);
            assert!(!outcome.changed.contains(&Category::Top));
            assert_eq!(selector.selection(Category::Top).unwrap().id, "Top-3");
        }
    }

    #[test]
    fn test_locked_empty_slot_still_needs_items() {
        let mut selector = selector(1, 1, 0);
        selector.set_locked(Category::Shoes, true);
        let mut rng = StdRng::seed_from_u64(3);

        let outcome = selector.generate(&mut rng);
        assert_eq!(outcome.needs_more_items, vec![Category::Shoes]);
    }

    #[test]
    fn test_advance_wraps_both_ends() {
        let mut selector = selector(3, 1, 1);
        assert_eq!(selector.slot(Category::Top).unwrap().index(), 0);

        assert!(selector.advance(Category::Top, SwipeDirection::Backward));
        assert_eq!(selector.slot(Category::Top).unwrap().index(), 2);
        assert_eq!(selector.selection(Category::Top).unwrap().id, "Top-2");

        assert!(selector.advance(Category::Top, SwipeDirection::Forward));
        assert_eq!(selector.slot(Category::Top).unwrap().index(), 0);

        assert!(selector.advance(Category::Top, SwipeDirection::Forward));
        assert!(selector.advance(Category::Top, SwipeDirection::Forward));
        assert_eq!(selector.slot(Category::Top).unwrap().index(), 2);
        assert!(selector.advance(Category::Top, SwipeDirection::Forward));
        assert_eq!(selector.slot(Category::Top).unwrap().index(), 0);
    }

    #[test]
    fn test_advance_is_noop_when_locked_or_empty() {
        let mut selector = selector(3, 0, 2);
        selector.advance(Category::Top, SwipeDirection::Forward);
        selector.toggle_lock(Category::Top);

        assert!(!selector.advance(Category::Top, SwipeDirection::Forward));
        assert_eq!(selector.slot(Category::Top).unwrap().index(), 1);

        assert!(!selector.advance(Category::Bottom, SwipeDirection::Backward));
        assert!(selector.selection(Category::Bottom).is_none());

        assert!(!selector.advance(Category::Outerwear, SwipeDirection::Forward));
    }

    #[test]
    fn test_unlock_then_generate_can_change_selection() {
        let mut selector = selector(4, 1, 1);
        selector.select_item(Category::Top, "Top-0");
        selector.toggle_lock(Category::Top);
        assert!(!selector.toggle_lock(Category::Top));

        let changed = (0..20).any(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            selector.generate(&mut rng);
            selector.selection(Category::Top).unwrap().id != "Top-0"
        });
        assert!(changed);
    }

    #[test]
    fn test_select_item_refuses_locked_slot() {
        let mut selector = selector(3, 1, 1);
        selector.set_locked(Category::Top, true);
        assert!(!selector.select_item(Category::Top, "Top-1"));
        assert!(!selector.select_item(Category::Bottom, "missing"));
    }

    #[test]
    fn test_replace_items_keeps_surviving_selection() {
        let mut selector = selector(3, 1, 1);
        selector.select_item(Category::Top, "Top-2");

        let mut refreshed = items(Category::Top, 3);
        refreshed.remove(0);
        selector.replace_items(Category::Top, refreshed);
        assert_eq!(selector.selection(Category::Top).unwrap().id, "Top-2");
        assert_eq!(selector.slot(Category::Top).unwrap().index(), 1);

        selector.replace_items(Category::Top, items(Category::Top, 1));
        assert!(selector.selection(Category::Top).is_none());
    }
}
