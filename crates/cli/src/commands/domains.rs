//! domains command - List domains bound to a bucket

use clap::Args;
use comfy_table::{Table, presets};
use kc_core::{DomainInfo, ObjectStore as _};
use serde::Serialize;

use super::{connect, format_time, parse_remote};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// List domains bound to a bucket
#[derive(Args, Debug)]
pub struct DomainsArgs {
    /// Bucket path (alias/bucket)
    pub path: String,
}

#[derive(Debug, Serialize)]
struct DomainsOutput {
    bucket: String,
    domains: Vec<DomainInfo>,
}

fn seconds(ts: i64) -> String {
    format_time(jiff::Timestamp::from_second(ts).ok().filter(|_| ts > 0))
}

fn domain_table(domains: &[DomainInfo], utf8: bool) -> Table {
    let mut table = Table::new();
    table.load_preset(if utf8 {
        presets::UTF8_FULL_CONDENSED
    } else {
        presets::ASCII_FULL_CONDENSED
    });
    table.set_header(vec!["Domain", "Refresh", "Created", "Updated"]);
    for domain in domains {
        table.add_row(vec![
            domain.domain.clone(),
            domain.refresh.to_string(),
            seconds(domain.ctime),
            seconds(domain.utime),
        ]);
    }
    table
}

/// Execute the domains command
pub async fn execute(args: DomainsArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_remote(&args.path, &formatter) {
        Ok(path) => path,
        Err(code) => return code,
    };
    let manager = match connect(&path.alias, &formatter) {
        Ok(manager) => manager,
        Err(code) => return code,
    };

    match manager.list_domains(&path.bucket).await {
        Ok(domains) => {
            if formatter.is_json() {
                formatter.json(&DomainsOutput {
                    bucket: path.bucket,
                    domains,
                });
            } else if domains.is_empty() {
                formatter.println(&format!("No domains bound to {}.", path.bucket));
            } else {
                let table = domain_table(&domains, formatter.colors_enabled());
                formatter.println(&table.to_string());
            }
            ExitCode::Success
        }
        Err(e) => formatter.fail(&format!("Failed to list domains of {}", path.bucket), &e),
    }
}
