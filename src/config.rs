//! Configuration loading and defaults.
//!
//! Settings live in `~/.bookshelf-manager/config.toml` (or the file named by
//! `BOOKSHELF_CONFIG`). Every section is optional; a missing file means
//! defaults.
//!
//! ```toml
//! [general]
//! log_level = "debug"
//!
//! [storage]
//! path = "/home/me/books.sqlite"
//! key = "BOOK_APPS"
//!
//! [search]
//! revert_delay_ms = 1500
//!
//! [ui]
//! notice_ttl_ms = 3000
//! max_notices = 3
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::db::DATA_DIR_NAME;
use crate::error::{Result, ShelfError};
use crate::persistence::DEFAULT_STORAGE_KEY;

/// Environment variable that points at an alternate config file.
pub const CONFIG_ENV: &str = "BOOKSHELF_CONFIG";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "bookshelf.sqlite";
const LOG_FILE_NAME: &str = "bookshelf.log";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub storage: StorageConfig,
    pub search: SearchConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub log_level: String,
    /// Log file location (None = inside the data directory)
    pub log_path: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            log_level: "info".to_string(),
            log_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file location (None = inside the data directory)
    pub path: Option<PathBuf>,
    /// Key the shelf is stored under
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            path: None,
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// How long an empty search result stays up before the full shelf returns
    pub revert_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            revert_delay_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub notice_ttl_ms: u64,
    /// Older notices are dropped beyond this many
    pub max_notices: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            notice_ttl_ms: 3000,
            max_notices: 3,
        }
    }
}

impl Config {
    /// Load from `BOOKSHELF_CONFIG` if set, otherwise the default location.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load_from(Path::new(&path)),
            None => Self::load_from(&Self::default_config_path()?),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Config::default());
        }

        info!(path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents).map_err(|e| ShelfError::Config {
            reason: format!("failed to parse {}: {e}", path.display()),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.storage.key.trim().is_empty() {
            return Err(ShelfError::Config {
                reason: "storage.key must not be empty".to_string(),
            });
        }
        if self.ui.max_notices == 0 {
            return Err(ShelfError::Config {
                reason: "ui.max_notices must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn default_data_dir() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new().ok_or_else(|| ShelfError::Config {
            reason: "could not locate home directory".to_string(),
        })?;
        Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_data_dir()?.join(CONFIG_FILE_NAME))
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::default_data_dir()?.join(DB_FILE_NAME)),
        }
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.general.log_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::default_data_dir()?.join(LOG_FILE_NAME)),
        }
    }

    pub fn revert_delay(&self) -> Duration {
        Duration::from_millis(self.search.revert_delay_ms)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.ui.notice_ttl_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.storage.key, "BOOK_APPS");
        assert_eq!(config.revert_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[search]\nrevert_delay_ms = 250\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.search.revert_delay_ms, 250);
        assert_eq!(config.ui.max_notices, 3);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn serialized_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.storage.path = Some(dir.path().join("books.sqlite"));
        config.general.log_level = "debug".to_string();
        fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.db_path().unwrap(), dir.path().join("books.sqlite"));
    }

    #[test]
    fn empty_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[storage]\nkey = \"  \"\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ShelfError::Config { .. })
        ));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[ui\nmax_notices = ").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ShelfError::Config { .. })
        ));
    }
}
