//! Service traits
//!
//! `ObjectStore` is the control-plane surface the CLI programs against;
//! `Signer` is the credential capability requests and private URLs are
//! signed with. Both keep callers independent of the HTTP adapter.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::entry::Entry;
use crate::error::Result;
use crate::model::{
    AsyncFetchParam, AsyncFetchRet, BatchOpRet, DomainInfo, FetchRet, FileInfo, ListPage,
    ListQuery, StatOptions,
};
use crate::stream::ListStream;

/// Credential capability
pub trait Signer: Send + Sync {
    /// Public half of the credential
    fn access_key(&self) -> &str;

    /// Sign `data`, returning `<access_key>:<signature>`
    fn sign(&self, data: &[u8]) -> Result<String>;
}

/// Control-plane operations on a Kodo account
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Object metadata
    async fn stat(&self, entry: &Entry, options: StatOptions) -> Result<FileInfo>;

    /// Delete one object
    async fn delete(&self, entry: &Entry) -> Result<()>;

    /// Server-side copy; `force` overwrites an existing destination
    async fn copy(&self, src: &Entry, dst: &Entry, force: bool) -> Result<()>;

    /// Server-side move or rename
    async fn move_to(&self, src: &Entry, dst: &Entry, force: bool) -> Result<()>;

    /// Enable or disable access to an object
    async fn change_status(&self, entry: &Entry, enabled: bool) -> Result<()>;

    async fn change_mime(&self, entry: &Entry, mime: &str) -> Result<()>;

    /// Change the storage class code
    async fn change_type(&self, entry: &Entry, file_type: i32) -> Result<()>;

    /// Restore an archived object for `freeze_after_days` days
    async fn restore_archive(&self, entry: &Entry, freeze_after_days: i32) -> Result<()>;

    /// Schedule deletion; 0 cancels a previous schedule
    async fn delete_after_days(&self, entry: &Entry, days: i32) -> Result<()>;

    /// Execute batch command lines; results are positional
    async fn batch(&self, operations: &[String]) -> Result<Vec<BatchOpRet>>;

    /// Fetch a remote URL into the bucket; without a key the content hash names the object
    async fn fetch(&self, url: &str, bucket: &str, key: Option<&str>) -> Result<FetchRet>;

    /// Refresh a mirrored object from its origin
    async fn prefetch(&self, entry: &Entry) -> Result<()>;

    async fn async_fetch(&self, param: AsyncFetchParam) -> Result<AsyncFetchRet>;

    /// One page of at most `limit` items, `limit` in `[1, 1000]`
    async fn list(&self, bucket: &str, query: &ListQuery, limit: i64) -> Result<ListPage>;

    /// Unbounded listing delivered record by record
    async fn list_stream(
        &self,
        bucket: &str,
        query: &ListQuery,
        cancel: &CancellationToken,
    ) -> Result<ListStream>;

    async fn list_domains(&self, bucket: &str) -> Result<Vec<DomainInfo>>;

    /// Bucket names; `shared` includes buckets shared with this account
    async fn buckets(&self, shared: bool) -> Result<Vec<String>>;

    async fn create_bucket(&self, bucket: &str, region_id: &str) -> Result<()>;

    async fn drop_bucket(&self, bucket: &str) -> Result<()>;
}
