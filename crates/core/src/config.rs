//! The kc configuration file
//!
//! Aliases live in one TOML file, `<config dir>/kc/config.toml`, or
//! `$KC_CONFIG_DIR/config.toml` when that variable is set. The file holds
//! secret keys and is only ever readable by its owner.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::alias::Alias;
use crate::error::{Error, Result};

/// Layout version written into every saved file
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable that relocates the configuration directory
pub const CONFIG_DIR_ENV: &str = "KC_CONFIG_DIR";

const FILE_NAME: &str = "config.toml";

/// On-disk configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub schema_version: u32,

    #[serde(default)]
    pub aliases: Vec<Alias>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            aliases: Vec::new(),
        }
    }
}

/// Directory holding the configuration file, `override_dir` first
fn config_dir(override_dir: Option<OsString>) -> Result<PathBuf> {
    match override_dir {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => dirs::config_dir()
            .map(|dir| dir.join("kc"))
            .ok_or_else(|| Error::Config("Could not determine config directory".into())),
    }
}

/// Bring a file written by an older kc up to [`SCHEMA_VERSION`]
fn migrate(mut config: Config) -> Config {
    tracing::info!(
        from = config.schema_version,
        to = SCHEMA_VERSION,
        "migrating configuration"
    );
    config.schema_version = SCHEMA_VERSION;
    config
}

/// Reads and writes the configuration file
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for the file in the default location
    pub fn new() -> Result<Self> {
        let dir = config_dir(std::env::var_os(CONFIG_DIR_ENV))?;
        Ok(Self::with_path(dir.join(FILE_NAME)))
    }

    /// Manager for an explicit file
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the file, or an empty configuration when there is none yet
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&content)?;

        match config.schema_version {
            v if v < SCHEMA_VERSION => Ok(migrate(config)),
            v if v > SCHEMA_VERSION => Err(Error::Config(format!(
                "Configuration file version {v} is newer than supported version {SCHEMA_VERSION}. Please upgrade kc."
            ))),
            _ => Ok(config),
        }
    }

    /// Write the file with owner-only permissions, creating its directory
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.config_path, toml::to_string_pretty(config)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.config_path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %self.config_path.display(), "configuration saved");
        Ok(())
    }
}
