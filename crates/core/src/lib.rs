//! kc-core: Core library for the kc Kodo client
//!
//! This crate provides the SDK-independent pieces of kc:
//! - Configuration and alias management
//! - Path parsing and entry encoding
//! - Regional zone definitions
//! - Wire types of the control-plane API
//! - The ObjectStore and Signer traits
//! - The consumer side of streaming listings

pub mod alias;
pub mod config;
pub mod entry;
pub mod error;
pub mod model;
pub mod path;
pub mod stream;
pub mod traits;
pub mod zone;

pub use alias::{Alias, AliasManager, HostOverrides, TimeoutConfig};
pub use config::{Config, ConfigManager};
pub use entry::{Entry, encoded_entry, encoded_entry_without_key, urlsafe_encode};
pub use error::{Error, Result};
pub use model::{
    AsyncFetchParam, AsyncFetchRet, BatchOpData, BatchOpRet, DomainInfo, FetchRet, FileInfo,
    ListEntry, ListEntryKind, ListItem, ListPage, ListQuery, StatOptions, storage_class_name,
};
pub use path::{RemotePath, Target, parse_path, parse_target};
pub use stream::{ListSender, ListStream, StreamOutcome, list_channel};
pub use traits::{ObjectStore, Signer};
pub use zone::{ServiceRole, Zone, with_scheme};
