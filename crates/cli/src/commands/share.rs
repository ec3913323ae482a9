//! share command - Generate a download URL
//!
//! Builds a public URL, or a private URL signed with the alias's keys that
//! expires after `--expire` seconds. Nothing is sent to the service.

use std::fmt;

use clap::Args;
use kc_core::{Signer, with_scheme};
use kc_kodo::{
    deadline_after, make_private_url_v2, make_private_url_v2_with_query_string,
    make_public_url_v2, make_public_url_v2_with_query_string,
};
use serde::Serialize;

use super::connect;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Default lifetime of a private URL in seconds
const DEFAULT_EXPIRE_SECS: i64 = 3600;

/// Generate a download URL
#[derive(Args, Debug)]
pub struct ShareArgs {
    /// Alias whose keys sign the URL
    pub alias: String,

    /// Download domain bound to the bucket (e.g. cdn.example.com)
    pub domain: String,

    /// Object key
    pub key: String,

    /// Seconds until a private URL expires
    #[arg(long, default_value_t = DEFAULT_EXPIRE_SECS)]
    pub expire: i64,

    /// Raw query such as an image-processing command (e.g. imageView2/1/w/200)
    #[arg(long)]
    pub query: Option<String>,

    /// Build an unsigned URL for a public bucket
    #[arg(long)]
    pub public: bool,
}

#[derive(Debug, Serialize)]
struct ShareOutput {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<i64>,
}

impl fmt::Display for ShareOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Build the URL; `deadline` is ignored for public URLs
fn build_url(
    signer: &dyn Signer,
    domain: &str,
    key: &str,
    query: Option<&str>,
    public: bool,
    deadline: i64,
) -> kc_core::Result<String> {
    match (public, query) {
        (true, Some(query)) => Ok(make_public_url_v2_with_query_string(domain, key, query)),
        (true, None) => Ok(make_public_url_v2(domain, key)),
        (false, Some(query)) => {
            make_private_url_v2_with_query_string(signer, domain, key, query, deadline)
        }
        (false, None) => make_private_url_v2(signer, domain, key, deadline),
    }
}

/// Execute the share command
pub async fn execute(args: ShareArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    if !args.public && args.expire <= 0 {
        formatter.error("--expire must be a positive number of seconds");
        return ExitCode::UsageError;
    }
    if args.key.is_empty() {
        formatter.error("Object key cannot be empty");
        return ExitCode::UsageError;
    }

    let manager = match connect(&args.alias, &formatter) {
        Ok(manager) => manager,
        Err(code) => return code,
    };

    let domain = with_scheme(&args.domain, manager.resolver().use_https());
    let deadline = deadline_after(args.expire);
    let url = match build_url(
        manager.signer().as_ref(),
        &domain,
        &args.key,
        args.query.as_deref(),
        args.public,
        deadline,
    ) {
        Ok(url) => url,
        Err(e) => return formatter.fail("Failed to build URL", &e),
    };

    formatter.output(&ShareOutput {
        url,
        expires_at: (!args.public).then_some(deadline),
    });
    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use kc_kodo::Credentials;

    #[test]
    fn test_build_private_url() {
        let credentials = Credentials::new("ak", "sk");
        let url = build_url(
            &credentials,
            "http://cdn.example.com",
            "a.txt",
            None,
            false,
            1_700_000_000,
        )
        .unwrap();
        assert_eq!(
            url,
            "http://cdn.example.com/a.txt?e=1700000000&token=ak:wU8qgMwgEE3OtDAy9VzKxWDAjOk="
        );
    }

    #[test]
    fn test_build_private_url_with_query() {
        let credentials = Credentials::new("ak", "sk");
        let url = build_url(
            &credentials,
            "http://cdn.example.com",
            "dir/my file.txt",
            Some("imageView2/1/w/200"),
            false,
            1_700_000_000,
        )
        .unwrap();
        assert!(url.starts_with(
            "http://cdn.example.com/dir/my%20file.txt?imageView2/1/w/200&e=1700000000&token=ak:"
        ));
    }

    #[test]
    fn test_build_public_url() {
        let credentials = Credentials::new("ak", "sk");
        let url = build_url(
            &credentials,
            "http://cdn.example.com",
            "dir/my file.txt",
            None,
            true,
            0,
        )
        .unwrap();
        assert_eq!(url, "http://cdn.example.com/dir/my%20file.txt");
    }

    #[test]
    fn test_share_output_display() {
        let output = ShareOutput {
            url: "http://cdn.example.com/a.txt".to_string(),
            expires_at: None,
        };
        assert_eq!(output.to_string(), "http://cdn.example.com/a.txt");
        let json = serde_json::to_string(&output).unwrap();
        assert!(!json.contains("expires_at"));
    }
}
