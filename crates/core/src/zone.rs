//! Regional service endpoints
//!
//! A zone is the set of hostnames serving one storage region. Every control
//! plane call goes to one of four roles: `rs` (object management), `rsf`
//! (listing), `io` (fetch/prefetch) and `api` (domains, async jobs).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Service role a request is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceRole {
    Rs,
    Rsf,
    Io,
    Api,
}

impl ServiceRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            ServiceRole::Rs => "rs",
            ServiceRole::Rsf => "rsf",
            ServiceRole::Io => "io",
            ServiceRole::Api => "api",
        }
    }
}

impl std::fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hostnames (without scheme) for each role of one region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    pub rs_host: String,
    pub rsf_host: String,
    pub io_host: String,
    pub api_host: String,
}

/// Built-in regions: (id, rs, rsf, io, api)
const REGIONS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "z0",
        "rs-z0.qiniuapi.com",
        "rsf-z0.qiniuapi.com",
        "iovip.qiniuio.com",
        "api.qiniuapi.com",
    ),
    (
        "cn-east-2",
        "rs-cn-east-2.qiniuapi.com",
        "rsf-cn-east-2.qiniuapi.com",
        "iovip-cn-east-2.qiniuio.com",
        "api-cn-east-2.qiniuapi.com",
    ),
    (
        "z1",
        "rs-z1.qiniuapi.com",
        "rsf-z1.qiniuapi.com",
        "iovip-z1.qiniuio.com",
        "api-z1.qiniuapi.com",
    ),
    (
        "z2",
        "rs-z2.qiniuapi.com",
        "rsf-z2.qiniuapi.com",
        "iovip-z2.qiniuio.com",
        "api-z2.qiniuapi.com",
    ),
    (
        "na0",
        "rs-na0.qiniuapi.com",
        "rsf-na0.qiniuapi.com",
        "iovip-na0.qiniuio.com",
        "api-na0.qiniuapi.com",
    ),
    (
        "as0",
        "rs-as0.qiniuapi.com",
        "rsf-as0.qiniuapi.com",
        "iovip-as0.qiniuio.com",
        "api-as0.qiniuapi.com",
    ),
];

impl Zone {
    /// Look up a built-in region by id
    pub fn from_region_id(id: &str) -> Result<Self> {
        REGIONS
            .iter()
            .find(|(region, ..)| *region == id)
            .map(|(region, rs, rsf, io, api)| Zone {
                region_id: Some((*region).to_string()),
                rs_host: (*rs).to_string(),
                rsf_host: (*rsf).to_string(),
                io_host: (*io).to_string(),
                api_host: (*api).to_string(),
            })
            .ok_or_else(|| {
                Error::Config(format!(
                    "Unknown region '{id}'. Known regions: {}",
                    Self::known_region_ids().join(", ")
                ))
            })
    }

    /// The east-China region, home of the legacy domain-list endpoint
    pub fn huadong() -> Self {
        let (region, rs, rsf, io, api) = REGIONS[0];
        Zone {
            region_id: Some(region.to_string()),
            rs_host: rs.to_string(),
            rsf_host: rsf.to_string(),
            io_host: io.to_string(),
            api_host: api.to_string(),
        }
    }

    pub fn known_region_ids() -> Vec<&'static str> {
        REGIONS.iter().map(|(id, ..)| *id).collect()
    }

    /// Bare hostname for a role
    pub fn host(&self, role: ServiceRole) -> &str {
        match role {
            ServiceRole::Rs => &self.rs_host,
            ServiceRole::Rsf => &self.rsf_host,
            ServiceRole::Io => &self.io_host,
            ServiceRole::Api => &self.api_host,
        }
    }

    /// Role hostname with the scheme applied
    pub fn endpoint(&self, role: ServiceRole, use_https: bool) -> String {
        with_scheme(self.host(role), use_https)
    }
}

/// Prefix a host with `http://` or `https://` unless it already carries a scheme
pub fn with_scheme(host: &str, use_https: bool) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else if use_https {
        format!("https://{host}")
    } else {
        format!("http://{host}")
    }
}
