use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const DATA_DIR_ENV: &str = "WARDROBE_DATA_DIR";
const DEFAULT_DIR_NAME: &str = "Wardrobe";

/// Application settings, stored as `config.yaml` in the data directory.
///
/// Relative paths are resolved against the data directory. A missing file
/// means all defaults; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(skip)]
    pub data_directory: PathBuf,
    pub images_directory: PathBuf,
    pub store_file: PathBuf,
    /// Where backup directories go when no path is given
    pub backup_directory: Option<PathBuf>,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::new(),
            images_directory: PathBuf::from("images"),
            store_file: PathBuf::from("wardrobe_store.json"),
            backup_directory: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load the configuration for `data_directory`, creating the directory
    /// if needed. A missing `config.yaml` is written with the defaults.
    pub fn load<P: AsRef<Path>>(data_directory: P) -> Result<Self> {
        let data_directory = absolute(data_directory.as_ref())?;
        if !data_directory.exists() {
            fs::create_dir_all(&data_directory).with_context(|| {
                format!("Failed to create data directory {}", data_directory.display())
            })?;
            info!("Created data directory: {}", data_directory.display());
        }

        let config_path = data_directory.join(CONFIG_FILE_NAME);
        let first_run = !config_path.exists();
        let mut config = if !first_run {
            let yaml = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            if yaml.trim().is_empty() {
                AppConfig::default()
            } else {
                serde_yaml::from_str(&yaml)
                    .with_context(|| format!("Invalid configuration in {}", config_path.display()))?
            }
        } else {
            debug!("No {} found, using defaults", config_path.display());
            AppConfig::default()
        };

        config.data_directory = data_directory;
        if first_run {
            config.save()?;
        }
        Ok(config)
    }

    /// Write the configuration back to `config.yaml`
    pub fn save(&self) -> Result<()> {
        let config_path = self.data_directory.join(CONFIG_FILE_NAME);
        let yaml = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        let temp_path = config_path.with_extension("tmp");
        fs::write(&temp_path, yaml)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &config_path)
            .with_context(|| format!("Failed to replace {}", config_path.display()))?;

        info!("Saved configuration to {}", config_path.display());
        Ok(())
    }

    pub fn images_path(&self) -> PathBuf {
        self.resolve(&self.images_directory)
    }

    pub fn store_path(&self) -> PathBuf {
        self.resolve(&self.store_file)
    }

    pub fn backup_path(&self) -> PathBuf {
        match &self.backup_directory {
            Some(dir) => self.resolve(dir),
            None => self.data_directory.join("backups"),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_directory.join(path)
        }
    }
}

/// Pick the data directory: explicit override, then `WARDROBE_DATA_DIR`,
/// then `~/Documents/Wardrobe`, then `~/.wardrobe`
pub fn resolve_data_directory(cli_override: Option<PathBuf>) -> Result<PathBuf> {
    resolve_data_directory_from(
        cli_override,
        std::env::var(DATA_DIR_ENV).ok(),
        dirs::document_dir(),
        dirs::home_dir(),
    )
}

fn resolve_data_directory_from(
    cli_override: Option<PathBuf>,
    env_override: Option<String>,
    documents: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = cli_override {
        return Ok(dir);
    }
    if let Some(dir) = env_override.filter(|d| !d.trim().is_empty()) {
        return Ok(PathBuf::from(dir.trim()));
    }
    if let Some(documents) = documents {
        return Ok(documents.join(DEFAULT_DIR_NAME));
    }
    home.map(|h| h.join(".wardrobe"))
        .ok_or_else(|| anyhow!("Could not determine a data directory; set {}", DATA_DIR_ENV))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("Failed to read current directory")?
            .join(path))
    }
}
