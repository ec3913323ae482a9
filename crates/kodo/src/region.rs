//! Bucket region resolution
//!
//! Every bucket lives in one region, and every region has its own set of
//! service hosts. The resolver maps a bucket to its [`Zone`] by asking the
//! uc service once per bucket and remembering the answer for its own
//! lifetime. A statically configured zone or an explicit host override
//! bypasses the lookup and is consulted on every call.

use std::collections::HashMap;
use std::sync::Arc;

use kc_core::{Alias, Error, HostOverrides, Result, ServiceRole, Zone, with_scheme};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::client::KodoClient;
use crate::transport::HttpRequest;

/// Mirror-source management host; plain HTTP only
pub const PUB_HOST: &str = "pu.qbox.me:10200";

#[derive(Debug, Default, Deserialize)]
struct HostGroup {
    #[serde(default)]
    main: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RoleHosts {
    #[serde(default)]
    acc: HostGroup,
    #[serde(default)]
    src: HostGroup,
}

impl RoleHosts {
    fn primary(&self) -> Option<&str> {
        self.acc
            .main
            .first()
            .or_else(|| self.src.main.first())
            .map(String::as_str)
            .filter(|h| !h.is_empty())
    }
}

/// Body of `GET /v2/query`
#[derive(Debug, Deserialize)]
struct ZoneQueryRet {
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    rs: RoleHosts,
    #[serde(default)]
    rsf: RoleHosts,
    #[serde(default)]
    io: RoleHosts,
    #[serde(default)]
    api: RoleHosts,
}

impl ZoneQueryRet {
    fn into_zone(self) -> std::result::Result<Zone, String> {
        let host = |role: ServiceRole, hosts: &RoleHosts| {
            hosts
                .primary()
                .map(str::to_string)
                .ok_or_else(|| format!("no {role} host in region answer"))
        };
        Ok(Zone {
            rs_host: host(ServiceRole::Rs, &self.rs)?,
            rsf_host: host(ServiceRole::Rsf, &self.rsf)?,
            io_host: host(ServiceRole::Io, &self.io)?,
            api_host: host(ServiceRole::Api, &self.api)?,
            region_id: self.region,
        })
    }
}

/// Maps buckets to regional service hosts
#[derive(Debug)]
pub struct RegionResolver {
    client: KodoClient,
    use_https: bool,
    static_zone: Option<Zone>,
    overrides: HostOverrides,
    uc_host: String,
    central_rs_host: String,
    cache: RwLock<HashMap<String, Arc<Zone>>>,
}

impl RegionResolver {
    pub fn new(client: KodoClient, uc_host: impl Into<String>, use_https: bool) -> Self {
        Self {
            client,
            use_https,
            static_zone: None,
            overrides: HostOverrides::default(),
            uc_host: uc_host.into(),
            central_rs_host: kc_core::alias::DEFAULT_CENTRAL_RS_HOST.to_string(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolver configured from an alias's region, host overrides and endpoints
    pub fn from_alias(client: KodoClient, alias: &Alias) -> Result<Self> {
        let resolver = Self::new(client, &alias.uc_host, alias.use_https)
            .with_overrides(alias.hosts.clone())
            .with_central_rs_host(&alias.central_rs_host);
        Ok(match alias.zone()? {
            Some(zone) => resolver.with_static_zone(zone),
            None => resolver,
        })
    }

    /// Always answer with `zone`, never asking the service
    pub fn with_static_zone(mut self, zone: Zone) -> Self {
        self.static_zone = Some(zone);
        self
    }

    pub fn with_overrides(mut self, overrides: HostOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_central_rs_host(mut self, host: impl Into<String>) -> Self {
        self.central_rs_host = host.into();
        self
    }

    pub fn use_https(&self) -> bool {
        self.use_https
    }

    /// Zone fixed by configuration, if any
    pub fn static_zone(&self) -> Option<&Zone> {
        self.static_zone.as_ref()
    }

    /// Zone serving `bucket`
    pub async fn resolve(&self, bucket: &str) -> Result<Arc<Zone>> {
        if let Some(zone) = &self.static_zone {
            return Ok(Arc::new(zone.clone()));
        }

        if let Some(zone) = self.cache.read().await.get(bucket) {
            tracing::debug!(bucket, "zone cache hit");
            return Ok(Arc::clone(zone));
        }

        tracing::debug!(bucket, "zone cache miss, querying uc");
        let zone = Arc::new(self.query(bucket).await?);

        // Concurrent first lookups for one bucket converge on whichever landed first
        let mut cache = self.cache.write().await;
        Ok(Arc::clone(cache.entry(bucket.to_string()).or_insert(zone)))
    }

    /// Whether `bucket` has been resolved remotely before
    pub async fn is_cached(&self, bucket: &str) -> bool {
        self.cache.read().await.contains_key(bucket)
    }

    async fn query(&self, bucket: &str) -> Result<Zone> {
        let url = format!(
            "{}/v2/query?ak={}&bucket={}",
            self.uc_host(),
            urlencoding::encode(self.client.signer().access_key()),
            urlencoding::encode(bucket)
        );
        let resolution = |reason: String| Error::Resolution {
            bucket: bucket.to_string(),
            reason,
        };

        let ret: ZoneQueryRet = self
            .client
            .request_unsigned(HttpRequest::get(url))
            .await
            .map_err(|e| resolution(e.to_string()))?;
        ret.into_zone().map_err(resolution)
    }

    /// Scheme-qualified host for `role` serving `bucket`
    ///
    /// A configured override wins over the resolved zone.
    pub async fn host(&self, role: ServiceRole, bucket: &str) -> Result<String> {
        if let Some(host) = self.overrides.get(role) {
            return Ok(with_scheme(host, self.use_https));
        }
        let zone = self.resolve(bucket).await?;
        Ok(zone.endpoint(role, self.use_https))
    }

    pub async fn rs_host(&self, bucket: &str) -> Result<String> {
        self.host(ServiceRole::Rs, bucket).await
    }

    pub async fn rsf_host(&self, bucket: &str) -> Result<String> {
        self.host(ServiceRole::Rsf, bucket).await
    }

    pub async fn io_host(&self, bucket: &str) -> Result<String> {
        self.host(ServiceRole::Io, bucket).await
    }

    pub async fn api_host(&self, bucket: &str) -> Result<String> {
        self.host(ServiceRole::Api, bucket).await
    }

    /// Fixed east-China api host serving the domain-list endpoint
    pub fn legacy_api_host(&self) -> String {
        Zone::huadong().endpoint(ServiceRole::Api, self.use_https)
    }

    /// Batch endpoint
    pub fn central_rs_host(&self) -> String {
        with_scheme(&self.central_rs_host, self.use_https)
    }

    /// Bucket management and zone lookup endpoint
    pub fn uc_host(&self) -> String {
        with_scheme(&self.uc_host, self.use_https)
    }

    pub fn pub_host(&self) -> String {
        with_scheme(PUB_HOST, false)
    }
}
