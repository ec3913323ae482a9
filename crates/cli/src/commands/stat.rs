//! stat command - Show object metadata
//!
//! Displays detailed metadata information about an object.

use clap::Args;
use kc_core::{FileInfo, ObjectStore as _, StatOptions, storage_class_name};
use serde::Serialize;

use super::{connect, human_size, parse_object};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Show object metadata
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Object path (alias/bucket/key)
    pub path: String,

    /// Also show the part sizes of multipart uploads
    #[arg(long)]
    pub parts: bool,
}

#[derive(Debug, Serialize)]
struct StatOutput {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<String>,
    size_bytes: i64,
    size_human: String,
    storage_class: &'static str,
    enabled: bool,
    #[serde(flatten)]
    info: FileInfo,
}

impl StatOutput {
    fn new(name: String, info: FileInfo) -> Self {
        Self {
            name,
            last_modified: info.put_timestamp().map(|t| t.to_string()),
            size_bytes: info.fsize,
            size_human: human_size(info.fsize),
            storage_class: storage_class_name(info.file_type),
            enabled: info.status == 0,
            info,
        }
    }

    fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Name      : {}", self.name)];
        if let Some(modified) = &self.last_modified {
            lines.push(format!("Date      : {modified}"));
        }
        lines.push(format!(
            "Size      : {} ({} bytes)",
            self.size_human, self.size_bytes
        ));
        lines.push(format!("Hash      : {}", self.info.hash));
        if !self.info.md5.is_empty() {
            lines.push(format!("MD5       : {}", self.info.md5));
        }
        lines.push(format!("Type      : {}", self.info.mime_type));
        lines.push(format!("Class     : {}", self.storage_class));
        lines.push(format!(
            "Status    : {}",
            if self.enabled { "enabled" } else { "disabled" }
        ));
        if !self.info.end_user.is_empty() {
            lines.push(format!("End user  : {}", self.info.end_user));
        }
        if self.info.expiration > 0 {
            lines.push(format!("Expires   : {}", self.info.expiration));
        }
        if !self.info.parts.is_empty() {
            let parts: Vec<String> = self.info.parts.iter().map(i64::to_string).collect();
            lines.push(format!("Parts     : {}", parts.join(", ")));
        }
        lines
    }
}

/// Execute the stat command
pub async fn execute(args: StatArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_object(&args.path, &formatter) {
        Ok(path) => path,
        Err(code) => return code,
    };
    let manager = match connect(&path.alias, &formatter) {
        Ok(manager) => manager,
        Err(code) => return code,
    };

    let options = StatOptions {
        need_parts: args.parts,
    };
    match manager.stat(&path.entry(), options).await {
        Ok(info) => {
            let output = StatOutput::new(path.key.clone(), info);
            if formatter.is_json() {
                formatter.json(&output);
            } else {
                for line in output.lines() {
                    formatter.println(&line);
                }
            }
            ExitCode::Success
        }
        Err(e) => formatter.fail(&format!("Failed to stat {path}"), &e),
    }
}
