//! BucketManager: the `ObjectStore` implementation over the Kodo HTTP API

use std::sync::Arc;

use async_trait::async_trait;
use kc_core::{
    Alias, AsyncFetchParam, AsyncFetchRet, BatchOpRet, DomainInfo, Entry, FetchRet, FileInfo,
    ListPage, ListQuery, ListStream, ObjectStore, Result, Signer, StatOptions,
};
use tokio_util::sync::CancellationToken;

use crate::auth::Credentials;
use crate::batch;
use crate::client::KodoClient;
use crate::listing::{self, MAX_LIST_LIMIT};
use crate::region::RegionResolver;
use crate::signed_url::make_private_url_v2;
use crate::transport::{HttpRequest, HttpTransport, Transport};
use crate::uri::{
    query_escape, uri_change_mime, uri_change_status, uri_change_type, uri_copy,
    uri_delete, uri_delete_after_days, uri_fetch, uri_move, uri_prefetch, uri_restore_archive,
    uri_set_image, uri_stat, uri_unset_image,
};

/// Control-plane client for one account
#[derive(Debug)]
pub struct BucketManager {
    client: KodoClient,
    resolver: RegionResolver,
}

impl BucketManager {
    /// Create a manager talking to the service over HTTP with the alias's credentials
    pub fn from_alias(alias: &Alias) -> Result<Self> {
        let transport = HttpTransport::new(&alias.timeout_config())?;
        let signer = Credentials::from_alias(alias);
        Self::with_parts(Arc::new(transport), Arc::new(signer), alias)
    }

    /// Create a manager over an explicit transport and signer
    pub fn with_parts(
        transport: Arc<dyn Transport>,
        signer: Arc<dyn Signer>,
        alias: &Alias,
    ) -> Result<Self> {
        let client = KodoClient::new(transport, signer);
        let resolver = RegionResolver::from_alias(client.clone(), alias)?;
        Ok(Self { client, resolver })
    }

    pub fn resolver(&self) -> &RegionResolver {
        &self.resolver
    }

    pub fn signer(&self) -> &Arc<dyn Signer> {
        self.client.signer()
    }

    async fn rs_call(&self, bucket: &str, uri: String) -> Result<()> {
        let host = self.resolver.rs_host(bucket).await?;
        self.client
            .request_no_response(HttpRequest::post(format!("{host}{uri}")))
            .await
    }

    /// Every object under `query`, paging until the marker runs out
    pub async fn list_all(&self, bucket: &str, query: &ListQuery) -> Result<ListPage> {
        let mut all = ListPage::default();
        let mut query = query.clone();
        loop {
            let page = self.list(bucket, &query, MAX_LIST_LIMIT).await?;
            all.items.extend(page.items);
            all.common_prefixes.extend(page.common_prefixes);
            if !page.has_more {
                return Ok(all);
            }
            query.marker = page.next_marker;
        }
    }

    /// Set the mirror source of `bucket`, optionally with the upstream `Host` header
    pub async fn set_image(&self, site_url: &str, bucket: &str, host: Option<&str>) -> Result<()> {
        let url = format!(
            "{}{}",
            self.resolver.pub_host(),
            uri_set_image(site_url, bucket, host)
        );
        self.client.request_no_response(HttpRequest::post(url)).await
    }

    pub async fn unset_image(&self, bucket: &str) -> Result<()> {
        let url = format!("{}{}", self.resolver.pub_host(), uri_unset_image(bucket));
        self.client.request_no_response(HttpRequest::post(url)).await
    }

    /// Signed download URL for `key` on `domain`, valid until `deadline`
    pub fn private_url(&self, domain: &str, key: &str, deadline: i64) -> Result<String> {
        make_private_url_v2(self.signer().as_ref(), domain, key, deadline)
    }
}

#[async_trait]
impl ObjectStore for BucketManager {
    async fn stat(&self, entry: &Entry, options: StatOptions) -> Result<FileInfo> {
        let host = self.resolver.rs_host(&entry.bucket).await?;
        let mut url = format!("{host}{}", uri_stat(entry));
        if options.need_parts {
            url.push_str("?needparts=true");
        }
        self.client.request(HttpRequest::post(url)).await
    }

    async fn delete(&self, entry: &Entry) -> Result<()> {
        self.rs_call(&entry.bucket, uri_delete(entry)).await
    }

    async fn copy(&self, src: &Entry, dst: &Entry, force: bool) -> Result<()> {
        self.rs_call(&src.bucket, uri_copy(src, dst, force)).await
    }

    async fn move_to(&self, src: &Entry, dst: &Entry, force: bool) -> Result<()> {
        self.rs_call(&src.bucket, uri_move(src, dst, force)).await
    }

    async fn change_status(&self, entry: &Entry, enabled: bool) -> Result<()> {
        self.rs_call(&entry.bucket, uri_change_status(entry, enabled))
            .await
    }

    async fn change_mime(&self, entry: &Entry, mime: &str) -> Result<()> {
        self.rs_call(&entry.bucket, uri_change_mime(entry, mime))
            .await
    }

    async fn change_type(&self, entry: &Entry, file_type: i32) -> Result<()> {
        self.rs_call(&entry.bucket, uri_change_type(entry, file_type))
            .await
    }

    async fn restore_archive(&self, entry: &Entry, freeze_after_days: i32) -> Result<()> {
        self.rs_call(&entry.bucket, uri_restore_archive(entry, freeze_after_days))
            .await
    }

    async fn delete_after_days(&self, entry: &Entry, days: i32) -> Result<()> {
        self.rs_call(&entry.bucket, uri_delete_after_days(entry, days))
            .await
    }

    async fn batch(&self, operations: &[String]) -> Result<Vec<BatchOpRet>> {
        let host = self.resolver.central_rs_host();
        batch::execute(&self.client, &host, operations).await
    }

    async fn fetch(&self, url: &str, bucket: &str, key: Option<&str>) -> Result<FetchRet> {
        let host = self.resolver.io_host(bucket).await?;
        let request = HttpRequest::post(format!("{host}{}", uri_fetch(url, bucket, key)));
        self.client.request(request).await
    }

    async fn prefetch(&self, entry: &Entry) -> Result<()> {
        let host = self.resolver.io_host(&entry.bucket).await?;
        let request = HttpRequest::post(format!("{host}{}", uri_prefetch(entry)));
        self.client.request_no_response(request).await
    }

    async fn async_fetch(&self, param: AsyncFetchParam) -> Result<AsyncFetchRet> {
        let host = self.resolver.api_host(&param.bucket).await?;
        let request = HttpRequest::post(format!("{host}/sisyphus/fetch")).json(&param)?;
        self.client.request(request).await
    }

    async fn list(&self, bucket: &str, query: &ListQuery, limit: i64) -> Result<ListPage> {
        listing::list_page(&self.client, &self.resolver, bucket, query, limit).await
    }

    async fn list_stream(
        &self,
        bucket: &str,
        query: &ListQuery,
        cancel: &CancellationToken,
    ) -> Result<ListStream> {
        listing::list_stream(&self.client, &self.resolver, bucket, query, cancel).await
    }

    async fn list_domains(&self, bucket: &str) -> Result<Vec<DomainInfo>> {
        let url = format!(
            "{}/v7/domain/list?tbl={}",
            self.resolver.legacy_api_host(),
            query_escape(bucket)
        );
        let domains: Option<Vec<DomainInfo>> = self.client.request(HttpRequest::get(url)).await?;
        Ok(domains.unwrap_or_default())
    }

    async fn buckets(&self, shared: bool) -> Result<Vec<String>> {
        let url = format!("{}/buckets?shared={shared}", self.resolver.uc_host());
        let buckets: Option<Vec<String>> = self.client.request(HttpRequest::post(url)).await?;
        Ok(buckets.unwrap_or_default())
    }

    async fn create_bucket(&self, bucket: &str, region_id: &str) -> Result<()> {
        let url = format!(
            "{}/mkbucketv3/{bucket}/region/{region_id}",
            self.resolver.uc_host()
        );
        self.client.request_no_response(HttpRequest::post(url)).await
    }

    async fn drop_bucket(&self, bucket: &str) -> Result<()> {
        let url = format!("{}/drop/{bucket}", self.resolver.uc_host());
        self.client.request_no_response(HttpRequest::post(url)).await
    }
}
