use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CairnConfig {
    pub cli: CliConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CliConfig {
    /// Owner identity used when the caller does not pass one explicitly.
    pub default_owner: String,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// `"sqlite"` or `"memory"`.
    pub backend: String,
    pub db_path: String,
    /// Upper bound on how long a storage call may wait on a locked database.
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_limit: usize,
    /// Hard cap on search result count; larger requested limits are clamped.
    pub max_limit: usize,
    pub default_threshold: f64,
}

impl Default for CairnConfig {
    fn default() -> Self {
        Self {
            cli: CliConfig::default(),
            storage: StorageConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_owner: "default".into(),
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Kept in tilde form so Default stays infallible; expansion happens
        // at open time via expand_tilde, which can report a missing home dir
        Self {
            backend: "sqlite".into(),
            db_path: "~/.cairn/knowledge.db".into(),
            busy_timeout_ms: 5000,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hashed".into(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
            default_threshold: 0.0,
        }
    }
}

/// Returns `~/.cairn/`, or an error when the home directory cannot be
/// resolved.
pub fn default_cairn_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("home directory could not be resolved")?;
    Ok(home.join(".cairn"))
}

/// Returns the default config file path: `~/.cairn/config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    Ok(default_cairn_dir()?.join("config.toml"))
}

impl CairnConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path()?)
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            CairnConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (CAIRN_DB, CAIRN_BACKEND,
    /// CAIRN_OWNER, CAIRN_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CAIRN_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("CAIRN_BACKEND") {
            self.storage.backend = val;
        }
        if let Ok(val) = std::env::var("CAIRN_OWNER") {
            self.cli.default_owner = val;
        }
        if let Ok(val) = std::env::var("CAIRN_LOG_LEVEL") {
            self.cli.log_level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> Result<PathBuf> {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().context("home directory could not be resolved")?;
        Ok(home.join(rest))
    } else {
        Ok(PathBuf::from(path))
    }
}
