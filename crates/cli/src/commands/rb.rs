//! rb command - Remove bucket
//!
//! Drops an empty bucket from the account.

use clap::Args;
use kc_core::{ListQuery, ObjectStore as _};
use serde::Serialize;

use super::connect;
use super::mb::parse_bucket_path;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Remove a bucket
#[derive(Args, Debug)]
pub struct RbArgs {
    /// Target path (alias/bucket)
    pub target: String,

    /// Drop the bucket without checking that it is empty
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct RbOutput {
    status: &'static str,
    bucket: String,
}

/// Execute the rb command
pub async fn execute(args: RbArgs, output_config: OutputConfig) -> ExitCode {
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

    if !args.force {
        match manager.list(&bucket, &ListQuery::default(), 1).await {
            Ok(page) if !page.items.is_empty() => {
                formatter.error(&format!(
                    "Bucket '{alias_name}/{bucket}' is not empty. Remove its objects first or use --force."
                ));
                return ExitCode::Conflict;
            }
            Ok(_) => {}
            Err(e) => return formatter.fail(&format!("Failed to check '{alias_name}/{bucket}'"), &e),
        }
    }

    match manager.drop_bucket(&bucket).await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&RbOutput {
                    status: "success",
                    bucket,
                });
            } else {
                formatter.success(&format!(
                    "Bucket '{alias_name}/{bucket}' removed successfully."
                ));
            }
            ExitCode::Success
        }
        Err(e) => formatter.fail(&format!("Failed to remove bucket '{alias_name}/{bucket}'"), &e),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::commands::{Cli, Commands};

    #[test]
    fn test_rb_args_parse() {
        let cli = Cli::try_parse_from(["kc", "rb", "--force", "prod/old-bucket"]).unwrap();
        match cli.command {
            Commands::Rb(args) => {
                assert!(args.force);
                assert_eq!(args.target, "prod/old-bucket");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
