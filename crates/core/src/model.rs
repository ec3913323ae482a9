//! Wire types of the Kodo control-plane API
//!
//! Field names follow the service's JSON; missing fields decode to their
//! defaults because the service omits zero values.

use serde::{Deserialize, Serialize};

/// Convert a put-time in 100 ns units to a timestamp
fn put_time_to_timestamp(put_time: i64) -> Option<jiff::Timestamp> {
    jiff::Timestamp::from_nanosecond(i128::from(put_time) * 100).ok()
}

/// Human name of a storage class code
pub const fn storage_class_name(file_type: i32) -> &'static str {
    match file_type {
        0 => "STANDARD",
        1 => "IA",
        2 => "ARCHIVE",
        3 => "DEEP_ARCHIVE",
        4 => "ARCHIVE_IR",
        _ => "UNKNOWN",
    }
}

/// Metadata returned by `stat`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileInfo {
    pub hash: String,
    pub fsize: i64,
    /// Upload time in 100 ns units since the epoch
    pub put_time: i64,
    /// 1 while an archived object is being restored, 2 once restored
    pub restore_status: i32,
    pub mime_type: String,
    /// Storage class code, see [`storage_class_name`]
    #[serde(rename = "type")]
    pub file_type: i32,
    pub end_user: String,
    /// 0 enabled, 1 disabled
    pub status: i32,
    pub md5: String,
    pub expiration: i64,
    #[serde(rename = "transitionToIA")]
    pub transition_to_ia: i64,
    #[serde(rename = "transitionToARCHIVE")]
    pub transition_to_archive: i64,
    pub transition_to_deep_archive: i64,
    /// Part sizes, only present when requested
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<i64>,
}

impl FileInfo {
    pub fn put_timestamp(&self) -> Option<jiff::Timestamp> {
        put_time_to_timestamp(self.put_time)
    }
}

/// Options for `stat`
#[derive(Debug, Clone, Copy, Default)]
pub struct StatOptions {
    /// Also return the part sizes of multipart objects
    pub need_parts: bool,
}

/// Result of a server-side fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FetchRet {
    pub key: String,
    pub hash: String,
    pub fsize: i64,
    pub mime_type: String,
}

/// Domain bound to a bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainInfo {
    pub domain: String,
    /// Bucket name
    pub tbl: String,
    #[serde(rename = "uid")]
    pub owner: i64,
    pub refresh: bool,
    pub ctime: i64,
    pub utime: i64,
}

/// Request body of an asynchronous fetch job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AsyncFetchParam {
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
    pub bucket: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub md5: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub etag: String,
    #[serde(rename = "callbackurl", default, skip_serializing_if = "String::is_empty")]
    pub callback_url: String,
    #[serde(rename = "callbackbody", default, skip_serializing_if = "String::is_empty")]
    pub callback_body: String,
    #[serde(
        rename = "callbackbodytype",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub callback_body_type: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub file_type: i32,
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

/// Accepted asynchronous fetch job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsyncFetchRet {
    pub id: String,
    /// Estimated jobs queued ahead of this one
    pub wait: i64,
}

/// One object in a listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListItem {
    pub key: String,
    pub hash: String,
    pub fsize: i64,
    pub put_time: i64,
    pub mime_type: String,
    #[serde(rename = "type")]
    pub file_type: i32,
    pub end_user: String,
}

impl ListItem {
    /// Padding record sent by the service, never a real object
    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && self.hash.is_empty() && self.fsize == 0 && self.put_time == 0
    }

    pub fn put_timestamp(&self) -> Option<jiff::Timestamp> {
        put_time_to_timestamp(self.put_time)
    }
}

/// Filters shared by bounded and streaming listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub prefix: String,
    /// Non-empty groups keys into common prefixes
    pub delimiter: String,
    /// Opaque continuation token; empty starts from the beginning
    pub marker: String,
}

impl ListQuery {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }
}

/// One page of a bounded listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPage {
    pub items: Vec<ListItem>,
    pub common_prefixes: Vec<String>,
    pub next_marker: String,
    pub has_more: bool,
}

/// One record of a streaming listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    /// Continuation marker positioned after this record
    pub marker: String,
    pub kind: ListEntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListEntryKind {
    Object(ListItem),
    /// Common prefix, passed through as sent
    Dir(String),
    /// Record that only advances the marker
    Marker,
}

/// Positional result of one batch operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOpRet {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub data: Option<BatchOpData>,
}

/// Payload of a batch result; stat fields on success, `error` on failure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchOpData {
    pub hash: String,
    pub fsize: i64,
    pub put_time: i64,
    pub mime_type: String,
    #[serde(rename = "type")]
    pub file_type: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl BatchOpRet {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// Server message for a failed item
    pub fn error(&self) -> Option<&str> {
        if self.is_success() {
            return None;
        }
        Some(
            self.data
                .as_ref()
                .map(|d| d.error.as_str())
                .filter(|e| !e.is_empty())
                .unwrap_or("unknown error"),
        )
    }

    /// Stat payload of a successful item, if the operation returns one
    pub fn payload(&self) -> Option<&BatchOpData> {
        self.data.as_ref().filter(|_| self.is_success())
    }
}
