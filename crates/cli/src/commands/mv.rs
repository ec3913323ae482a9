//! mv command - Move or rename objects
//!
//! Moves an object to another key or bucket of the same account in a single
//! server-side call.

use clap::Args;
use kc_core::ObjectStore as _;

use super::connect;
use super::cp::{TransferOutput, resolve_transfer};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Move objects
#[derive(Args, Debug)]
pub struct MvArgs {
    /// Source object (alias/bucket/key)
    pub source: String,

    /// Destination (alias/bucket/key, or alias/bucket/prefix/ to keep the name)
    pub target: String,

    /// Overwrite the destination if it exists
    #[arg(short, long)]
    pub force: bool,
}

/// Execute the mv command
pub async fn execute(args: MvArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (src, dst) = match resolve_transfer(&args.source, &args.target, &formatter) {
        Ok(pair) => pair,
        Err(code) => return code,
    };
    if src == dst {
        formatter.error("Source and destination are the same object");
        return ExitCode::UsageError;
    }
    let manager = match connect(&src.alias, &formatter) {
        Ok(manager) => manager,
        Err(code) => return code,
    };

    match manager.move_to(&src.entry(), &dst.entry(), args.force).await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&TransferOutput {
                    status: "success",
                    source: src.to_full_path(),
                    target: dst.to_full_path(),
                });
            } else {
                formatter.success(&format!("Moved {src} -> {dst}"));
            }
            ExitCode::Success
        }
        Err(e) => formatter.fail(&format!("Failed to move {src} to {dst}"), &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::commands::{Cli, Commands};

    #[test]
    fn test_mv_args_parse() {
        let cli = Cli::try_parse_from(["kc", "mv", "-f", "prod/b/a", "prod/b/c"]).unwrap();
        match cli.command {
            Commands::Mv(args) => {
                assert!(args.force);
                assert_eq!(args.source, "prod/b/a");
                assert_eq!(args.target, "prod/b/c");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
