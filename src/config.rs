use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::viewer::ViewerSettings;

pub const ENV_PORT: &str = "MEMORY_WALL_PORT";
pub const ENV_CORS_ORIGIN: &str = "MEMORY_WALL_CORS_ORIGIN";
pub const ENV_BUCKET: &str = "MEMORY_WALL_BUCKET";
pub const ENV_PUBLIC_BASE_URL: &str = "MEMORY_WALL_PUBLIC_BASE_URL";
pub const ENV_DATABASE: &str = "MEMORY_WALL_DATABASE";
pub const ENV_STORAGE_DIR: &str = "MEMORY_WALL_STORAGE_DIR";
pub const ENV_BACKEND_URL: &str = "MEMORY_WALL_BACKEND_URL";
pub const ENV_BACKEND_KEY: &str = "MEMORY_WALL_BACKEND_KEY";

const DEFAULT_DATABASE: &str = "memory-wall.db";
const DEFAULT_STORAGE_DIR: &str = "storage";

/// Where the wall keeps its rows and images.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// SQLite database plus an image directory on this machine.
    Local {
        database: String,
        storage_dir: PathBuf,
    },
    /// Hosted table and storage APIs.
    Hosted { url: String, anon_key: String },
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Local {
            database: DEFAULT_DATABASE.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
        }
    }
}

/// Runtime configuration, read from an optional TOML file and then overridden
/// by `MEMORY_WALL_*` environment variables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    pub port: u16,
    pub cors_origin: Option<String>,
    pub bucket: String,
    /// Prefix for public image URLs of the local bucket; empty keeps them relative.
    pub public_base_url: String,
    pub backend: BackendConfig,
    pub viewer: ViewerSettings,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            cors_origin: None,
            bucket: "images".to_string(),
            public_base_url: String::new(),
            backend: BackendConfig::default(),
            viewer: ViewerSettings::default(),
        }
    }
}

impl WallConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(&Self::env_values());
        config
            .viewer
            .validate()
            .map_err(|reason| anyhow::anyhow!("Invalid viewer settings: {}", reason))?;
        Ok(config)
    }

    pub fn is_local(&self) -> bool {
        matches!(self.backend, BackendConfig::Local { .. })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn env_values() -> HashMap<String, String> {
        Self::tracked_keys()
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect()
    }

    fn tracked_keys() -> [&'static str; 8] {
        [
            ENV_PORT,
            ENV_CORS_ORIGIN,
            ENV_BUCKET,
            ENV_PUBLIC_BASE_URL,
            ENV_DATABASE,
            ENV_STORAGE_DIR,
            ENV_BACKEND_URL,
            ENV_BACKEND_KEY,
        ]
    }

    pub fn apply_overrides(&mut self, values: &HashMap<String, String>) {
        fn read<'a>(values: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
            values
                .get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        }

        if let Some(port) = read(values, ENV_PORT) {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(e) => warn!("Ignoring invalid {}={}: {}", ENV_PORT, port, e),
            }
        }
        if let Some(origin) = read(values, ENV_CORS_ORIGIN) {
            self.cors_origin = Some(origin.to_string());
        }
        if let Some(bucket) = read(values, ENV_BUCKET) {
            self.bucket = bucket.to_string();
        }
        if let Some(base) = read(values, ENV_PUBLIC_BASE_URL) {
            self.public_base_url = base.to_string();
        }

        match (read(values, ENV_BACKEND_URL), read(values, ENV_BACKEND_KEY)) {
            (Some(url), Some(key)) => {
                self.backend = BackendConfig::Hosted {
                    url: url.to_string(),
                    anon_key: key.to_string(),
                };
                return;
            }
            (Some(_), None) | (None, Some(_)) => warn!(
                "Both {} and {} are needed for the hosted backend, ignoring",
                ENV_BACKEND_URL, ENV_BACKEND_KEY
            ),
            (None, None) => {}
        }

        let database_override = read(values, ENV_DATABASE);
        let storage_override = read(values, ENV_STORAGE_DIR);
        if database_override.is_none() && storage_override.is_none() {
            return;
        }

        let (mut database, mut storage_dir) = match &self.backend {
            BackendConfig::Local {
                database,
                storage_dir,
            } => (database.clone(), storage_dir.clone()),
            BackendConfig::Hosted { .. } => (
                DEFAULT_DATABASE.to_string(),
                PathBuf::from(DEFAULT_STORAGE_DIR),
            ),
        };
        if let Some(path) = database_override {
            database = path.to_string();
        }
        if let Some(dir) = storage_override {
            storage_dir = PathBuf::from(dir);
        }
        self.backend = BackendConfig::Local {
            database,
            storage_dir,
        };
    }
}
