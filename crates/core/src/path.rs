//! Path parsing and resolution
//!
//! Handles parsing of remote paths in the format: alias/bucket[/key]

use crate::entry::Entry;
use crate::error::{Error, Result};

/// A parsed remote path pointing to a Kodo location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePath {
    /// Alias name
    pub alias: String,
    /// Bucket name
    pub bucket: String,
    /// Object key or prefix (empty for bucket root)
    pub key: String,
    /// Whether the path ends with a slash (directory semantics)
    pub is_dir: bool,
}

impl RemotePath {
    /// Create a new RemotePath
    pub fn new(
        alias: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let is_dir = key.ends_with('/') || key.is_empty();
        Self {
            alias: alias.into(),
            bucket: bucket.into(),
            key,
            is_dir,
        }
    }

    /// Get the full path as a string (alias/bucket/key)
    pub fn to_full_path(&self) -> String {
        if self.key.is_empty() {
            format!("{}/{}", self.alias, self.bucket)
        } else {
            format!("{}/{}/{}", self.alias, self.bucket, self.key)
        }
    }

    /// The addressed object
    pub fn entry(&self) -> Entry {
        Entry::new(&self.bucket, &self.key)
    }

    /// Same bucket and alias, different key
    pub fn with_key(&self, key: impl Into<String>) -> Self {
        Self::new(&self.alias, &self.bucket, key)
    }
}

impl std::fmt::Display for RemotePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_full_path())
    }
}

/// Either a bare alias or a path inside one of its buckets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Alias(String),
    Path(RemotePath),
}

/// Parse `alias`, `alias/` or `alias/bucket[/key]`
pub fn parse_target(path: &str) -> Result<Target> {
    let alias = path.split('/').next().unwrap_or_default();
    let rest = &path[alias.len()..];
    if rest.is_empty() || rest == "/" {
        if !is_valid_alias_name(alias) {
            return Err(Error::InvalidPath(format!("Invalid alias name in '{path}'")));
        }
        return Ok(Target::Alias(alias.to_string()));
    }
    parse_path(path).map(Target::Path)
}

/// Parse a path string into a RemotePath
///
/// Remote paths have the format: alias/bucket[/key]. The key keeps its
/// trailing slash, which marks a prefix.
pub fn parse_path(path: &str) -> Result<RemotePath> {
    if path.is_empty() {
        return Err(Error::InvalidPath("Path cannot be empty".into()));
    }

    let parts: Vec<&str> = path.splitn(3, '/').collect();
    if parts.len() < 2 {
        return Err(Error::InvalidPath(format!(
            "Path '{path}' is incomplete. Use format: alias/bucket[/key]"
        )));
    }

    let alias = parts[0];
    let bucket = parts[1];
    let key = parts.get(2).copied().unwrap_or_default();

    if !is_valid_alias_name(alias) {
        return Err(Error::InvalidPath(format!("Invalid alias name in '{path}'")));
    }

    if bucket.is_empty() {
        return Err(Error::InvalidPath("Bucket name cannot be empty".into()));
    }

    Ok(RemotePath::new(alias, bucket, key))
}

/// Check if a string is a valid alias name
fn is_valid_alias_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
