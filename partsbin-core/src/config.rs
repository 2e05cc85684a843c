//! Partsbin configuration
//!
//! ## Configuration Sources (in precedence order)
//!
//! 1. An explicit path (`--config`)
//! 2. `.partsbin/config.yml` - Project-level config
//! 3. `<config_dir>/partsbin/config.yml` - Global config
//! 4. Built-in defaults
//!
//! The first file found wins. Every field has a default, so a partial file
//! only overrides what it names:
//!
//! ```yaml
//! cache_ttl_seconds: 300
//! storage_dir: /path/to/data
//! weights:
//!   coverage: 100.0
//!   price_divisor: 10.0
//!   tiers: { s_plus: 1000.0, s: 800.0, a: 600.0, b: 400.0 }
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::catalog::DEFAULT_CACHE_TTL;
use crate::optimizer::OptimizerWeights;

/// Project-level config path, relative to the project root
pub const PROJECT_CONFIG_PATH: &str = ".partsbin/config.yml";

/// File name inside the global config directory
pub const GLOBAL_CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartsbinConfig {
    /// Catalog cache freshness window
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,

    /// Where the file store keeps its documents; the platform data dir when unset
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    #[serde(default)]
    pub weights: OptimizerWeights,
}

impl Default for PartsbinConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_cache_ttl_seconds(),
            storage_dir: None,
            weights: OptimizerWeights::default(),
        }
    }
}

fn default_cache_ttl_seconds() -> u64 {
    DEFAULT_CACHE_TTL.as_secs()
}

impl PartsbinConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml_ng::from_str(content)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Resolve configuration from the sources above.
    ///
    /// An explicit path must exist; the project and global files are optional.
    pub fn load(
        explicit: Option<&Path>,
        project_root: &Path,
        global_dir: Option<&Path>,
    ) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            info!("Using config file {}", path.display());
            return Self::from_file(path);
        }

        let project = project_root.join(PROJECT_CONFIG_PATH);
        if project.is_file() {
            info!("Using project config {}", project.display());
            return Self::from_file(&project);
        }

        if let Some(global) = global_dir.map(|dir| dir.join(GLOBAL_CONFIG_FILE)) {
            if global.is_file() {
                info!("Using global config {}", global.display());
                return Self::from_file(&global);
            }
        }

        debug!("No config file found; using defaults");
        Ok(Self::default())
    }

    /// Platform config directory for partsbin (`~/.config/partsbin` on Linux)
    pub fn global_config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "partsbin").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Platform data directory for partsbin (`~/.local/share/partsbin` on Linux)
    pub fn default_storage_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "partsbin").map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Configured storage dir, else the platform data dir
    pub fn resolve_storage_dir(&self) -> Result<PathBuf> {
        self.storage_dir
            .clone()
            .or_else(Self::default_storage_dir)
            .context("Could not determine a storage directory; set storage_dir in the config")
    }
}
