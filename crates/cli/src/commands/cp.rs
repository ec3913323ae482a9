//! cp command - Copy objects
//!
//! Copies an object to another key or bucket of the same account. The copy
//! happens inside the service; no data passes through the client.

use clap::Args;
use kc_core::{ObjectStore as _, RemotePath};
use serde::Serialize;

use super::{connect, parse_object, parse_remote};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Copy objects
#[derive(Args, Debug)]
pub struct CpArgs {
    /// Source object (alias/bucket/key)
    pub source: String,

    /// Destination (alias/bucket/key, or alias/bucket/prefix/ to keep the name)
    pub target: String,

    /// Overwrite the destination if it exists
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct TransferOutput {
    pub status: &'static str,
    pub source: String,
    pub target: String,
}

/// Parse a source/destination pair for a server-side transfer
///
/// Both sides must belong to the same alias. A destination ending in `/`
/// (or naming only a bucket) receives the source's file name.
pub(crate) fn resolve_transfer(
    source: &str,
    target: &str,
    formatter: &Formatter,
) -> Result<(RemotePath, RemotePath), ExitCode> {
    let src = parse_object(source, formatter)?;
    let dst = parse_remote(target, formatter)?;
    if src.alias != dst.alias {
        formatter.error(&format!(
            "Source and destination must use the same alias ('{}' vs '{}')",
            src.alias, dst.alias
        ));
        return Err(ExitCode::UsageError);
    }
    let dst = destination_for(&src, dst);
    Ok((src, dst))
}

fn destination_for(src: &RemotePath, dst: RemotePath) -> RemotePath {
    if !dst.is_dir {
        return dst;
    }
    let name = src.key.rsplit('/').next().unwrap_or(&src.key);
    dst.with_key(format!("{}{name}", dst.key))
}

/// Execute the cp command
pub async fn execute(args: CpArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (src, dst) = match resolve_transfer(&args.source, &args.target, &formatter) {
        Ok(pair) => pair,
        Err(code) => return code,
    };
    let manager = match connect(&src.alias, &formatter) {
        Ok(manager) => manager,
        Err(code) => return code,
    };

    match manager.copy(&src.entry(), &dst.entry(), args.force).await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&TransferOutput {
                    status: "success",
                    source: src.to_full_path(),
                    target: dst.to_full_path(),
                });
            } else {
                formatter.success(&format!("Copied {src} -> {dst}"));
            }
            ExitCode::Success
        }
        Err(e) => formatter.fail(&format!("Failed to copy {src} to {dst}"), &e),
    }
}
