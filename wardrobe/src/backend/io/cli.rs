use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use shared::{Category, ClothingItem, ExportToPathRequest, ImportFromPathRequest, NewClothingItem};

use crate::backend::domain::{ImportOutcome, NoticeSink, OutfitSelector};
use crate::backend::storage::path_to_uri;
use crate::backend::AppState;

#[derive(Debug, Parser)]
#[command(name = "wardrobe", version, about = "Catalog your clothes and put outfits together")]
pub struct Cli {
    /// Directory holding the store, images and config.yaml
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Answer yes to the import confirmation
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Reject flag combinations that cannot work at runtime
    pub fn validate(&self) -> Result<()> {
        if let Command::Import { path } = &self.command {
            if is_stdin(path) && !self.yes {
                bail!("Importing from stdin needs --yes; the confirmation prompt reads stdin too");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a clothing item
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: Category,
        /// Photo to move into the image library
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
        /// Hex swatch shown when there is no photo
        #[arg(long, value_name = "HEX")]
        color: Option<String>,
    },
    /// List items, optionally for one category
    List {
        #[arg(long)]
        category: Option<Category>,
    },
    /// Delete an item and its photo
    Delete { id: String },
    /// Pick a random top, bottom and shoes
    Outfit {
        /// Keep this top in place
        #[arg(long, value_name = "ID")]
        lock_top: Option<String>,
        #[arg(long, value_name = "ID")]
        lock_bottom: Option<String>,
        #[arg(long, value_name = "ID")]
        lock_shoes: Option<String>,
        /// Seed for a reproducible pick
        #[arg(long)]
        seed: Option<u64>,
        /// Print the outfit as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a backup directory, or print the JSON document with --json
    Export {
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Restore from a backup directory or JSON file ("-" reads stdin)
    Import { path: PathBuf },
    /// Item counts per category
    Summary,
}

/// Run one command against an initialized backend
pub async fn run_command(command: Command, state: &AppState, notices: Arc<dyn NoticeSink>) -> Result<()> {
    match command {
        Command::Add {
            name,
            category,
            image,
            color,
        } => {
            let mut request = NewClothingItem::new(name, category);
            if let Some(image) = image {
                let path = image
                    .canonicalize()
                    .with_context(|| format!("Image {} not found", image.display()))?;
                request = request.with_image_uri(path_to_uri(&path));
            }
            if let Some(color) = color {
                request = request.with_color(color);
            }
            let item = state.wardrobe_service.add_item(request).await?;
            println!("{}", item.id);
        }
        Command::List { category } => {
            let items = match category {
                Some(category) => state.wardrobe_service.items_by_category(category)?,
                None => state.wardrobe_service.list_items()?,
            };
            if items.is_empty() {
                println!("No items yet.");
            }
            for item in &items {
                println!("{}", format_item(item));
            }
        }
        Command::Delete { id } => {
            if state.wardrobe_service.delete_item(&id).await? {
                println!("Deleted {}", id);
            } else {
                bail!("No item with ID {}", id);
            }
        }
        Command::Outfit {
            lock_top,
            lock_bottom,
            lock_shoes,
            seed,
            json,
        } => {
            let mut selector = state.wardrobe_service.outfit_selector()?;
            pin(&mut selector, Category::Top, lock_top);
            pin(&mut selector, Category::Bottom, lock_bottom);
            pin(&mut selector, Category::Shoes, lock_shoes);

            let mut rng = StdRng::seed_from_u64(seed.unwrap_or_else(rand::random));
            let outcome = selector.generate(&mut rng);
            if let Some(notice) = outcome.needs_more_notice() {
                notices.notify(notice);
            }
            if json {
                let outfit = serde_json::to_string_pretty(&selector.current_outfit())
                    .context("Failed to serialize outfit")?;
                println!("{}", outfit);
            } else {
                print_outfit(&selector);
            }
        }
        Command::Export { output, json } => {
            if json {
                let document = state
                    .backup_service
                    .export_wardrobe()
                    .ok_or_else(|| anyhow!("Export failed"))?;
                println!("{}", document);
            } else {
                let response = state
                    .backup_service
                    .export_to_path(ExportToPathRequest {
                        custom_path: output.map(|p| p.to_string_lossy().into_owned()),
                    })
                    .await;
                if !response.success {
                    bail!(response.message);
                }
                println!("{}", response.message);
                for uri in &response.missing_images {
                    warn!("Image not included in backup: {}", uri);
                }
            }
        }
        Command::Import { path } => {
            if is_stdin(&path) {
                let mut json = String::new();
                std::io::stdin()
                    .read_to_string(&mut json)
                    .context("Failed to read backup from stdin")?;
                match state.backup_service.import_document(&json).await? {
                    ImportOutcome::Imported { restored_keys } => {
                        info!("Restored {} keys", restored_keys)
                    }
                    ImportOutcome::Cancelled => println!("Import cancelled"),
                }
            } else {
                let response = state
                    .backup_service
                    .import_from_path(ImportFromPathRequest {
                        path: path.to_string_lossy().into_owned(),
                    })
                    .await;
                if !response.success {
                    bail!(response.message);
                }
                info!(
                    "Restored {} keys and {} images",
                    response.restored_keys, response.restored_images
                );
            }
        }
        Command::Summary => {
            let summary = state.wardrobe_service.summary()?;
            println!("{} items", summary.total_items);
            for (category, count) in summary.counts {
                println!("  {:<12} {}", category.plural_label(), count);
            }
        }
    }
    Ok(())
}

fn pin(selector: &mut OutfitSelector, category: Category, item_id: Option<String>) {
    if let Some(id) = item_id {
        if selector.select_item(category, &id) {
            selector.set_locked(category, true);
        } else {
            warn!("No {} with ID {}, leaving it unlocked", category, id);
        }
    }
}

fn format_item(item: &ClothingItem) -> String {
    let look = item
        .image_uri
        .as_deref()
        .or(item.color.as_deref())
        .unwrap_or("-");
    format!("{}  {:<10} {}  {}", item.id, item.category, item.name, look)
}

fn print_outfit(selector: &OutfitSelector) {
    for slot in selector.slots() {
        let lock = if slot.is_locked() { " [locked]" } else { "" };
        match slot.selection() {
            Some(item) => println!("{:<8} {} ({}){}", slot.category(), item.name, item.id, lock),
            None => println!("{:<8} -", slot.category()),
        }
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_add_with_case_insensitive_category() {
        let cli = Cli::try_parse_from([
            "wardrobe", "--data-dir", "/tmp/w", "add", "--name", "Red Cap", "--category", "accessory",
        ])
        .unwrap();

        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/w")));
        match cli.command {
            Command::Add { name, category, image, .. } => {
                assert_eq!(name, "Red Cap");
                assert_eq!(category, Category::Accessory);
                assert!(image.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        assert!(Cli::try_parse_from(["wardrobe", "list", "--category", "hats"]).is_err());
    }

    #[test]
    fn test_global_yes_after_subcommand() {
        let cli = Cli::try_parse_from(["wardrobe", "import", "backup", "-y"]).unwrap();
        assert!(cli.yes);
        assert!(matches!(cli.command, Command::Import { .. }));
    }

    #[test]
    fn test_stdin_import_requires_yes() {
        let cli = Cli::try_parse_from(["wardrobe", "import", "-"]).unwrap();
        assert!(cli.validate().is_err());

        let cli = Cli::try_parse_from(["wardrobe", "--yes", "import", "-"]).unwrap();
        assert!(cli.validate().is_ok());

        let cli = Cli::try_parse_from(["wardrobe", "import", "backup_dir"]).unwrap();
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_format_item_prefers_image_over_color() {
        let item = ClothingItem {
            id: "1".to_string(),
            name: "Tee".to_string(),
            category: Category::Top,
            image_uri: None,
            color: Some("#ff0000".to_string()),
        };
        assert!(format_item(&item).ends_with("#ff0000"));
    }
}
