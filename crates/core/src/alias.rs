//! Alias management
//!
//! Aliases are named Kodo account profiles: credentials plus the endpoint
//! settings that steer region resolution.

use serde::{Deserialize, Serialize};

use crate::config::ConfigManager;
use crate::error::{Error, Result};
use crate::zone::{ServiceRole, Zone};

/// Default batch endpoint
pub const DEFAULT_CENTRAL_RS_HOST: &str = "rs.qiniu.com";

/// Default bucket-management and zone-query endpoint
pub const DEFAULT_UC_HOST: &str = "uc.qbox.me";

/// Timeout configuration for an alias
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,

    /// Read timeout in milliseconds
    #[serde(default = "default_read_timeout")]
    pub read_ms: u64,
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_read_timeout() -> u64 {
    30000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_timeout(),
            read_ms: default_read_timeout(),
        }
    }
}

/// Explicit hosts that replace the resolved zone's host for a role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
}

impl HostOverrides {
    /// Override configured for a role, ignoring blank strings
    pub fn get(&self, role: ServiceRole) -> Option<&str> {
        let host = match role {
            ServiceRole::Rs => &self.rs,
            ServiceRole::Rsf => &self.rsf,
            ServiceRole::Io => &self.io,
            ServiceRole::Api => &self.api,
        };
        host.as_deref().filter(|h| !h.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        [
            ServiceRole::Rs,
            ServiceRole::Rsf,
            ServiceRole::Io,
            ServiceRole::Api,
        ]
        .into_iter()
        .all(|role| self.get(role).is_none())
    }
}

/// An alias represents a named Kodo account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alias {
    /// Unique name for this alias
    pub name: String,

    /// Access key
    pub access_key: String,

    /// Secret key
    pub secret_key: String,

    /// Talk to the service over HTTPS
    #[serde(default)]
    pub use_https: bool,

    /// Static region id; skips remote zone lookup when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Per-role host overrides
    #[serde(default, skip_serializing_if = "HostOverrides::is_empty")]
    pub hosts: HostOverrides,

    /// Host used for batch requests
    #[serde(default = "default_central_rs_host")]
    pub central_rs_host: String,

    /// Host used for bucket management and zone lookup
    #[serde(default = "default_uc_host")]
    pub uc_host: String,

    /// Timeout configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<TimeoutConfig>,
}

fn default_central_rs_host() -> String {
    DEFAULT_CENTRAL_RS_HOST.to_string()
}

fn default_uc_host() -> String {
    DEFAULT_UC_HOST.to_string()
}

impl Alias {
    /// Create a new alias with required fields
    pub fn new(
        name: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            use_https: false,
            region: None,
            hosts: HostOverrides::default(),
            central_rs_host: default_central_rs_host(),
            uc_host: default_uc_host(),
            timeout: None,
        }
    }

    /// Statically configured zone, if any
    pub fn zone(&self) -> Result<Option<Zone>> {
        self.region.as_deref().map(Zone::from_region_id).transpose()
    }

    /// Get the effective timeout configuration
    pub fn timeout_config(&self) -> TimeoutConfig {
        self.timeout.clone().unwrap_or_default()
    }
}

/// Manager for alias operations
pub struct AliasManager {
    config_manager: ConfigManager,
}

impl AliasManager {
    /// Create a new AliasManager with a specific ConfigManager
    pub fn with_config_manager(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Create a new AliasManager using the default config location
    pub fn new() -> Result<Self> {
        let config_manager = ConfigManager::new()?;
        Ok(Self { config_manager })
    }

    /// List all configured aliases
    pub fn list(&self) -> Result<Vec<Alias>> {
        let config = self.config_manager.load()?;
        Ok(config.aliases)
    }

    /// Get an alias by name
    pub fn get(&self, name: &str) -> Result<Alias> {
        let config = self.config_manager.load()?;
        config
            .aliases
            .into_iter()
            .find(|a| a.name == name)
            .ok_or_else(|| Error::AliasNotFound(name.to_string()))
    }

    /// Add or update an alias
    pub fn set(&self, alias: Alias) -> Result<()> {
        // Reject unknown regions before persisting
        alias.zone()?;

        let mut config = self.config_manager.load()?;
        config.aliases.retain(|a| a.name != alias.name);
        config.aliases.push(alias);

        self.config_manager.save(&config)
    }

    /// Remove an alias
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        let original_len = config.aliases.len();

        config.aliases.retain(|a| a.name != name);

        if config.aliases.len() == original_len {
            return Err(Error::AliasNotFound(name.to_string()));
        }

        self.config_manager.save(&config)
    }

    /// Check if an alias exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        let config = self.config_manager.load()?;
        Ok(config.aliases.iter().any(|a| a.name == name))
    }
}
