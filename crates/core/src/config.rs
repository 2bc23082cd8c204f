//! Layered application configuration: defaults, then the config file, then
//! `PREPLINE_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use ::config::{Config, Environment, File, FileFormat};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    journal::{FileLogSink, LogFormat},
    session::DEFAULT_SERVED_TARGET,
};

const CONFIG_DIR: &str = "prepline";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "PREPLINE";

const DEFAULT_CONFIG: &str = r#"# prepline configuration
# Every key may also be set through a PREPLINE_<KEY> environment variable.

# One customer per line: `Name: ingredient, ingredient`
customers_path = "customers.txt"

# Ingredient tokens separated by commas or newlines
ingredients_path = "ingredients.txt"

# Session logs; defaults to the user's data directory when unset
# log_dir = "/path/to/logs"

# "text" or "json"
log_format = "text"

# Served customers after which the session ends
served_target = 5

# Fixed belt shuffle seed; random when unset
# seed = 42
"#;

/// Runtime settings for a kitchen session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Customer order file.
    pub customers_path: PathBuf,
    /// Belt ingredient file.
    pub ingredients_path: PathBuf,
    /// Directory receiving session logs.
    pub log_dir: PathBuf,
    /// Session log encoding.
    pub log_format: LogFormat,
    /// Served customers after which the session ends.
    pub served_target: usize,
    /// Belt shuffle seed.
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            customers_path: PathBuf::from("customers.txt"),
            ingredients_path: PathBuf::from("ingredients.txt"),
            log_dir: FileLogSink::default_root(),
            log_format: LogFormat::default(),
            served_target: DEFAULT_SERVED_TARGET,
            seed: None,
        }
    }
}

impl AppConfig {
    /// Load from the default config path and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load from `path` (optional on disk) and the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: AppConfig = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?
            .try_deserialize()
            .context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no session can run with.
    pub fn validate(&self) -> Result<()> {
        if self.served_target == 0 {
            bail!("served_target must be at least 1");
        }
        Ok(())
    }
}

/// Location of the user's config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write the commented default config unless one already exists.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    ensure_default_config_at(&path)?;
    Ok(path)
}

/// Write the commented default config to `path` unless it already exists.
/// Returns whether a file was created.
pub fn ensure_default_config_at(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote default configuration");
    Ok(true)
}
