//! Alias management commands
//!
//! Aliases are named Kodo accounts: credentials plus the endpoint settings
//! that decide how bucket regions are resolved.

use clap::Subcommand;
use kc_core::alias::{DEFAULT_CENTRAL_RS_HOST, DEFAULT_UC_HOST};
use kc_core::{Alias, AliasManager, HostOverrides, TimeoutConfig};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Alias subcommands for managing accounts
#[derive(Subcommand, Debug)]
pub enum AliasCommands {
    /// Add or update an alias
    Set(SetArgs),

    /// List all configured aliases
    List(ListArgs),

    /// Remove an alias
    Remove(RemoveArgs),
}

/// Arguments for the `alias set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Alias name (e.g., "prod", "test")
    pub name: String,

    /// Access key
    pub access_key: String,

    /// Secret key
    pub secret_key: String,

    /// Talk to the service over HTTPS
    #[arg(long)]
    pub https: bool,

    /// Fixed region id (z0, cn-east-2, z1, z2, na0, as0); skips region lookup
    #[arg(long)]
    pub region: Option<String>,

    /// Host replacing the resolved rs host
    #[arg(long)]
    pub rs_host: Option<String>,

    /// Host replacing the resolved rsf host
    #[arg(long)]
    pub rsf_host: Option<String>,

    /// Host replacing the resolved io host
    #[arg(long)]
    pub io_host: Option<String>,

    /// Host replacing the resolved api host
    #[arg(long)]
    pub api_host: Option<String>,

    /// Host receiving batch requests
    #[arg(long, default_value = DEFAULT_CENTRAL_RS_HOST)]
    pub central_rs_host: String,

    /// Host for bucket management and region lookup
    #[arg(long, default_value = DEFAULT_UC_HOST)]
    pub uc_host: String,

    /// Connection timeout in milliseconds
    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    /// Read timeout in milliseconds
    #[arg(long)]
    pub read_timeout_ms: Option<u64>,
}

/// Arguments for the `alias list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show full details including hosts
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for the `alias remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the alias to remove
    pub name: String,
}

/// JSON output for alias list
#[derive(Serialize)]
struct AliasListOutput {
    aliases: Vec<AliasInfo>,
}

/// Alias information for JSON output (without the secret key)
#[derive(Serialize)]
struct AliasInfo {
    name: String,
    access_key: String,
    use_https: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<String>,
    #[serde(skip_serializing_if = "HostOverrides::is_empty")]
    hosts: HostOverrides,
    central_rs_host: String,
    uc_host: String,
}

impl From<&Alias> for AliasInfo {
    fn from(alias: &Alias) -> Self {
        Self {
            name: alias.name.clone(),
            access_key: alias.access_key.clone(),
            use_https: alias.use_https,
            region: alias.region.clone(),
            hosts: alias.hosts.clone(),
            central_rs_host: alias.central_rs_host.clone(),
            uc_host: alias.uc_host.clone(),
        }
    }
}

/// JSON output for alias set/remove operations
#[derive(Serialize)]
struct AliasOperationOutput {
    success: bool,
    alias: String,
    message: String,
}

/// Execute an alias subcommand
pub async fn execute(cmd: AliasCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let alias_manager = match AliasManager::new() {
        Ok(am) => am,
        Err(e) => return formatter.fail("Failed to load aliases", &e),
    };

    match cmd {
        AliasCommands::Set(args) => execute_set(args, &alias_manager, &formatter),
        AliasCommands::List(args) => execute_list(args, &alias_manager, &formatter),
        AliasCommands::Remove(args) => execute_remove(args, &alias_manager, &formatter),
    }
}

fn build_alias(args: SetArgs) -> Result<Alias, String> {
    if args.name.is_empty() {
        return Err("Alias name cannot be empty".into());
    }
    if args.access_key.is_empty() || args.secret_key.is_empty() {
        return Err("Access key and secret key cannot be empty".into());
    }

    let mut alias = Alias::new(args.name, args.access_key, args.secret_key);
    alias.use_https = args.https;
    alias.region = args.region;
    alias.hosts = HostOverrides {
        rs: args.rs_host,
        rsf: args.rsf_host,
        io: args.io_host,
        api: args.api_host,
    };
    alias.central_rs_host = args.central_rs_host;
    alias.uc_host = args.uc_host;
    if args.connect_timeout_ms.is_some() || args.read_timeout_ms.is_some() {
        let defaults = TimeoutConfig::default();
        alias.timeout = Some(TimeoutConfig {
            connect_ms: args.connect_timeout_ms.unwrap_or(defaults.connect_ms),
            read_ms: args.read_timeout_ms.unwrap_or(defaults.read_ms),
        });
    }
    Ok(alias)
}

fn execute_set(args: SetArgs, manager: &AliasManager, formatter: &Formatter) -> ExitCode {
    let alias = match build_alias(args) {
        Ok(alias) => alias,
        Err(msg) => {
            formatter.error(&msg);
            return ExitCode::UsageError;
        }
    };
    let name = alias.name.clone();

    match manager.set(alias) {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&AliasOperationOutput {
                    success: true,
                    alias: name.clone(),
                    message: format!("Alias '{name}' configured successfully"),
                });
            } else {
                formatter.success(&format!("Alias '{name}' configured successfully."));
            }
            ExitCode::Success
        }
        Err(e) => formatter.fail("Failed to save alias", &e),
    }
}

fn execute_list(args: ListArgs, manager: &AliasManager, formatter: &Formatter) -> ExitCode {
    let aliases = match manager.list() {
        Ok(aliases) => aliases,
        Err(e) => return formatter.fail("Failed to list aliases", &e),
    };

    if formatter.is_json() {
        formatter.json(&AliasListOutput {
            aliases: aliases.iter().map(AliasInfo::from).collect(),
        });
    } else if aliases.is_empty() {
        formatter.println("No aliases configured.");
    } else {
        for alias in &aliases {
            let region = alias.region.as_deref().unwrap_or("auto");
            if args.long {
                let scheme = if alias.use_https { "https" } else { "http" };
                formatter.println(&format!(
                    "{:<12} {} (region: {region}, {scheme}, uc: {}, batch: {})",
                    alias.name, alias.access_key, alias.uc_host, alias.central_rs_host
                ));
            } else {
                formatter.println(&format!("{:<12} {region}", alias.name));
            }
        }
    }
    ExitCode::Success
}

fn execute_remove(args: RemoveArgs, manager: &AliasManager, formatter: &Formatter) -> ExitCode {
    match manager.remove(&args.name) {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&AliasOperationOutput {
                    success: true,
                    alias: args.name.clone(),
                    message: format!("Alias '{}' removed successfully", args.name),
                });
            } else {
                formatter.success(&format!("Alias '{}' removed successfully.", args.name));
            }
            ExitCode::Success
        }
        Err(e) => formatter.fail("Failed to remove alias", &e),
    }
}
