//! mb command - Make bucket
//!
//! Creates a new bucket in a region of the account.

use clap::Args;
use kc_core::{ObjectStore as _, Zone};
use serde::Serialize;

use super::connect;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Status code the service answers when the bucket already exists
const BUCKET_EXISTS: u16 = 614;

/// Region used when neither `--region` nor the alias names one
const DEFAULT_REGION: &str = "z0";

/// Create a bucket
#[derive(Args, Debug)]
pub struct MbArgs {
    /// Target path (alias/bucket)
    pub target: String,

    /// Ignore error if bucket already exists
    #[arg(short = 'p', long)]
    pub ignore_existing: bool,

    /// Region id for the bucket (defaults to the alias region, then z0)
    #[arg(long)]
    pub region: Option<String>,
}

#[derive(Debug, Serialize)]
struct MbOutput {
    status: &'static str,
    bucket: String,
    region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Execute the mb command
pub async fn execute(args: MbArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (alias_name, bucket) = match parse_bucket_path(&args.target) {
        Ok(parsed) => parsed,
        Err(e) => {
            formatter.error(&e);
            return ExitCode::UsageError;
        }
    };
    let manager = match connect(&alias_name, &formatter) {
        Ok(manager) => manager,
        Err(code) => return code,
    };

    let region = args
        .region
        .or_else(|| {
            manager
                .resolver()
                .static_zone()
                .and_then(|zone| zone.region_id.clone())
        })
        .unwrap_or_else(|| DEFAULT_REGION.to_string());
    if let Err(e) = Zone::from_region_id(&region) {
        return formatter.fail("Invalid region", &e);
    }

    let report = |message: Option<String>| {
        if formatter.is_json() {
            formatter.json(&MbOutput {
                status: "success",
                bucket: bucket.clone(),
                region: region.clone(),
                message,
            });
        } else {
            formatter.success(&format!(
                "Bucket '{alias_name}/{bucket}' {} in {region}.",
                if message.is_some() { "already exists" } else { "created" }
            ));
        }
    };

    match manager.create_bucket(&bucket, &region).await {
        Ok(()) => {
            report(None);
            ExitCode::Success
        }
        Err(e) if args.ignore_existing && e.status() == Some(BUCKET_EXISTS) => {
            report(Some("Bucket already exists".to_string()));
            ExitCode::Success
        }
        Err(e) => formatter.fail(&format!("Failed to create bucket '{alias_name}/{bucket}'"), &e),
    }
}

/// Parse a target path into (alias, bucket)
pub(crate) fn parse_bucket_path(path: &str) -> Result<(String, String), String> {
    let path = path.trim_end_matches('/');

    if path.is_empty() {
        return Err("Path cannot be empty".to_string());
    }

    let parts: Vec<&str> = path.splitn(2, '/').collect();

    if parts.len() != 2 {
        return Err(format!(
            "Invalid path format: '{path}'. Expected: alias/bucket"
        ));
    }

    let alias = parts[0].to_string();
    let bucket = parts[1].to_string();

    if bucket.is_empty() {
        return Err("Bucket name cannot be empty".to_string());
    }

    if bucket.contains('/') {
        return Err(format!("'{path}' names an object, not a bucket"));
    }

    if bucket.len() < 3 || bucket.len() > 63 {
        return Err("Bucket name must be between 3 and 63 characters".to_string());
    }

    Ok((alias, bucket))
}
