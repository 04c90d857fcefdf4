use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Schema version written into every backup document
pub const BACKUP_SCHEMA_VERSION: &str = "1.0.0";

/// Clothing category. The set is closed: stored records with any other
/// value fail to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Top,
    Bottom,
    Shoes,
    Outerwear,
    Accessory,
}

impl Category {
    /// Every category in display order
    pub const ALL: [Category; 5] = [
        Category::Top,
        Category::Bottom,
        Category::Shoes,
        Category::Outerwear,
        Category::Accessory,
    ];

    /// Categories that make up an outfit, in slot order
    pub const OUTFIT: [Category; 3] = [Category::Top, Category::Bottom, Category::Shoes];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Top => "Top",
            Category::Bottom => "Bottom",
            Category::Shoes => "Shoes",
            Category::Outerwear => "Outerwear",
            Category::Accessory => "Accessory",
        }
    }

    /// Plural label used in "add more items" prompts
    pub fn plural_label(&self) -> &'static str {
        match self {
            Category::Top => "Tops",
            Category::Bottom => "Bottoms",
            Category::Shoes => "Shoes",
            Category::Outerwear => "Outerwear",
            Category::Accessory => "Accessories",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Case-insensitive so command-line input like `shoes` works
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown category '{}'. Expected one of: Top, Bottom, Shoes, Outerwear, Accessory",
                    s
                )
            })
    }
}

/// A single catalogued clothing item, as stored under the items key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingItem {
    /// Epoch millis followed by a random base-36 suffix, assigned at creation
    pub id: String,
    /// Display name (never empty)
    pub name: String,
    pub category: Category,
    /// Reference to an image file, usually `file://` scheme
    #[serde(rename = "imageUri", default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    /// Fallback color swatch (hex) when no photo was taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Input for creating an item; the id is assigned by the repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClothingItem {
    pub name: String,
    pub category: Category,
    #[serde(rename = "imageUri", default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NewClothingItem {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            image_uri: None,
            color: None,
        }
    }

    pub fn with_image_uri(mut self, uri: impl Into<String>) -> Self {
        self.image_uri = Some(uri.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Versioned snapshot of the whole key-value store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupDocument {
    /// Creation time, ISO-8601 with millisecond precision
    pub timestamp: String,
    pub version: String,
    /// Every store key mapped to its raw value
    pub data: BTreeMap<String, String>,
    /// Distinct `file://` image URIs referenced by items at export time
    #[serde(default)]
    pub images: Vec<String>,
}

impl BackupDocument {
    /// Build a document stamped with the current time and schema version
    pub fn new(data: BTreeMap<String, String>, images: Vec<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            version: BACKUP_SCHEMA_VERSION.to_string(),
            data,
            images,
        }
    }
}

/// Direction of a swipe on an outfit slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwipeDirection {
    /// Next item (swipe right)
    Forward,
    /// Previous item (swipe left)
    Backward,
}

/// The currently presented outfit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Outfit {
    pub top: Option<ClothingItem>,
    pub bottom: Option<ClothingItem>,
    pub shoes: Option<ClothingItem>,
}

/// Item counts per category for the wardrobe screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardrobeSummary {
    pub total_items: usize,
    pub counts: Vec<(Category, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportToPathRequest {
    /// Target parent directory; the configured backup directory is used when absent
    pub custom_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportToPathResponse {
    pub success: bool,
    pub message: String,
    /// Directory that holds `backup.json` and `images/`
    pub backup_path: String,
    pub item_count: usize,
    pub image_count: usize,
    /// Referenced images that could not be packaged
    pub missing_images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportFromPathRequest {
    /// Backup directory, or a bare `backup.json` file
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportFromPathResponse {
    pub success: bool,
    pub message: String,
    pub restored_keys: usize,
    pub restored_images: usize,
    /// Images listed in the document that were not present in the backup
    pub missing_images: Vec<String>,
}
