//! CLI command definitions and execution
//!
//! This module contains all CLI commands and their implementations.
//! Every remote command loads its alias, builds a [`BucketManager`] for it
//! and maps library errors onto exit codes through the formatter.

use clap::{Parser, Subcommand};
use kc_core::{AliasManager, Error, RemotePath, parse_path};
use kc_kodo::BucketManager;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod alias;
mod cp;
mod domains;
mod fetch;
mod ls;
mod mb;
mod mv;
mod rb;
mod rm;
mod share;
mod stat;

/// kc - Kodo control-plane CLI
///
/// A command-line interface for Qiniu Kodo object storage.
#[derive(Parser, Debug)]
#[command(name = "kc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress bar
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage account aliases
    #[command(subcommand)]
    Alias(alias::AliasCommands),

    /// List buckets and objects
    Ls(ls::LsArgs),

    /// Create a bucket
    Mb(mb::MbArgs),

    /// Remove a bucket
    Rb(rb::RbArgs),

    /// Show object metadata
    Stat(stat::StatArgs),

    /// Copy objects inside the service
    Cp(cp::CpArgs),

    /// Move or rename objects
    Mv(mv::MvArgs),

    /// Remove objects
    Rm(rm::RmArgs),

    /// Generate a download URL
    Share(share::ShareArgs),

    /// Fetch a remote URL into a bucket
    Fetch(fetch::FetchArgs),

    /// List domains bound to a bucket
    Domains(domains::DomainsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Alias(cmd) => alias::execute(cmd, output_config).await,
        Commands::Ls(args) => ls::execute(args, output_config).await,
        Commands::Mb(args) => mb::execute(args, output_config).await,
        Commands::Rb(args) => rb::execute(args, output_config).await,
        Commands::Stat(args) => stat::execute(args, output_config).await,
        Commands::Cp(args) => cp::execute(args, output_config).await,
        Commands::Mv(args) => mv::execute(args, output_config).await,
        Commands::Rm(args) => rm::execute(args, output_config).await,
        Commands::Share(args) => share::execute(args, output_config).await,
        Commands::Fetch(args) => fetch::execute(args, output_config).await,
        Commands::Domains(args) => domains::execute(args, output_config).await,
    }
}

/// Load `alias_name` and build a manager for it
///
/// Failures are reported through `formatter` and returned as the exit code
/// the command should end with.
pub(crate) fn connect(alias_name: &str, formatter: &Formatter) -> Result<BucketManager, ExitCode> {
    let alias_manager =
        AliasManager::new().map_err(|e| formatter.fail("Failed to load aliases", &e))?;
    let alias = alias_manager
        .get(alias_name)
        .map_err(|e| formatter.fail("Cannot use alias", &e))?;
    tracing::debug!(
        alias = alias_name,
        region = alias.region.as_deref().unwrap_or("auto"),
        "using alias"
    );
    BucketManager::from_alias(&alias).map_err(|e| formatter.fail("Failed to create client", &e))
}

/// Parse `alias/bucket/key`, requiring a non-empty key
pub(crate) fn parse_object_path(path: &str) -> kc_core::Result<RemotePath> {
    let remote = parse_path(path)?;
    if remote.key.is_empty() {
        return Err(Error::InvalidPath(format!(
            "'{path}' does not name an object. Expected: alias/bucket/key"
        )));
    }
    Ok(remote)
}

/// Parse an `alias/bucket[/key]` argument, reporting malformed paths
pub(crate) fn parse_remote(path: &str, formatter: &Formatter) -> Result<RemotePath, ExitCode> {
    parse_path(path).map_err(|e| formatter.fail("Invalid path", &e))
}

/// Parse an object argument, reporting malformed paths
pub(crate) fn parse_object(path: &str, formatter: &Formatter) -> Result<RemotePath, ExitCode> {
    parse_object_path(path).map_err(|e| formatter.fail("Invalid path", &e))
}

/// Format a timestamp the way every listing prints it
pub(crate) fn format_time(ts: Option<jiff::Timestamp>) -> String {
    ts.map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "                   ".to_string())
}

pub(crate) fn human_size(size: i64) -> String {
    humansize::format_size(size.max(0) as u64, humansize::BINARY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_path() {
        let path = parse_object_path("prod/photos/2024/a.jpg").unwrap();
        assert_eq!(path.alias, "prod");
        assert_eq!(path.bucket, "photos");
        assert_eq!(path.key, "2024/a.jpg");
    }

    #[test]
    fn test_parse_object_path_requires_key() {
        assert!(matches!(
            parse_object_path("prod/photos"),
            Err(Error::InvalidPath(_))
        ));
        assert!(parse_object_path("prod/photos/").is_err());
        assert!(parse_object_path("prod").is_err());
        assert!(parse_object_path("").is_err());
    }

    #[test]
    fn test_format_time_placeholder() {
        assert_eq!(format_time(None).len(), "2024-01-01 00:00:00".len());
    }

    #[test]
    fn test_human_size_clamps_negative() {
        assert_eq!(human_size(-1), "0 B");
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from(["kc", "--json", "--debug", "stat", "prod/b/k"]).unwrap();
        assert!(cli.json);
        assert!(cli.debug);
        assert!(matches!(cli.command, Commands::Stat(_)));
    }
}
