//! fetch command - Fetch a remote URL into a bucket
//!
//! The service downloads the URL itself. Without a key the object is named
//! after its content hash. `--async` queues the job and returns its id.

use clap::Args;
use kc_core::{AsyncFetchParam, FetchRet, ObjectStore as _, RemotePath};
use serde::Serialize;

use super::{connect, human_size, parse_remote};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Fetch a remote URL into a bucket
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Source URL
    pub url: String,

    /// Destination (alias/bucket[/key])
    pub target: String,

    /// Queue the fetch and return immediately
    #[arg(long = "async")]
    pub asynchronous: bool,

    /// Host header used when downloading the source (async only)
    #[arg(long, requires = "asynchronous")]
    pub host: Option<String>,

    /// Callback URL notified when the job finishes (async only)
    #[arg(long, requires = "asynchronous")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct FetchOutput {
    status: &'static str,
    target: String,
    #[serde(flatten)]
    result: FetchRet,
}

#[derive(Debug, Serialize)]
struct AsyncFetchOutput {
    status: &'static str,
    id: String,
    wait: i64,
}

/// Execute the fetch command
pub async fn execute(args: FetchArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    if !args.url.starts_with("http://") && !args.url.starts_with("https://") {
        formatter.error(&format!("'{}' is not an http(s) URL", args.url));
        return ExitCode::UsageError;
    }
    let target = match parse_remote(&args.target, &formatter) {
        Ok(target) => target,
        Err(code) => return code,
    };
    let manager = match connect(&target.alias, &formatter) {
        Ok(manager) => manager,
        Err(code) => return code,
    };

    if args.asynchronous {
        let param = async_param(&args, &target);
        return match manager.async_fetch(param).await {
            Ok(ret) => {
                if formatter.is_json() {
                    formatter.json(&AsyncFetchOutput {
                        status: "queued",
                        id: ret.id,
                        wait: ret.wait,
                    });
                } else {
                    formatter.success(&format!(
                        "Fetch queued as {} ({} jobs ahead)",
                        ret.id, ret.wait
                    ));
                }
                ExitCode::Success
            }
            Err(e) => formatter.fail(&format!("Failed to queue fetch of {}", args.url), &e),
        };
    }

    let key = (!target.key.is_empty()).then_some(target.key.as_str());
    match manager.fetch(&args.url, &target.bucket, key).await {
        Ok(result) => {
            let stored = target.with_key(&result.key);
            if formatter.is_json() {
                formatter.json(&FetchOutput {
                    status: "success",
                    target: stored.to_full_path(),
                    result,
                });
            } else {
                formatter.success(&format!(
                    "Fetched {} -> {stored} ({}, {})",
                    args.url,
                    human_size(result.fsize),
                    result.hash
                ));
            }
            ExitCode::Success
        }
        Err(e) => formatter.fail(&format!("Failed to fetch {}", args.url), &e),
    }
}

fn async_param(args: &FetchArgs, target: &RemotePath) -> AsyncFetchParam {
    AsyncFetchParam {
        url: args.url.clone(),
        host: args.host.clone().unwrap_or_default(),
        bucket: target.bucket.clone(),
        key: target.key.clone(),
        callback_url: args.callback_url.clone().unwrap_or_default(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::commands::{Cli, Commands};

    fn parse(argv: &[&str]) -> FetchArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Fetch(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_async_param() {
        let args = parse(&[
            "kc",
            "fetch",
            "--async",
            "--host",
            "origin.example.com",
            "https://example.com/a.jpg",
            "prod/photos/a.jpg",
        ]);
        let target = RemotePath::new("prod", "photos", "a.jpg");
        let param = async_param(&args, &target);

        assert_eq!(param.url, "https://example.com/a.jpg");
        assert_eq!(param.host, "origin.example.com");
        assert_eq!(param.bucket, "photos");
        assert_eq!(param.key, "a.jpg");
        assert!(param.callback_url.is_empty());
    }

    #[test]
    fn test_host_requires_async() {
        let result = Cli::try_parse_from([
            "kc",
            "fetch",
            "--host",
            "origin.example.com",
            "https://example.com/a.jpg",
            "prod/photos",
        ]);
        assert!(result.is_err());
    }
}
