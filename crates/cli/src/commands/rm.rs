//! rm command - Remove objects
//!
//! A single object is removed with one delete call. Several objects, or every
//! object under a prefix with `--recursive`, go through batch requests of at
//! most 1000 deletes each; failed items are reported one by one.

use clap::Args;
use kc_core::{BatchOpRet, ListQuery, ObjectStore as _, RemotePath};
use kc_kodo::uri::uri_delete;
use kc_kodo::{BucketManager, MAX_BATCH_OPS};
use serde::Serialize;

use super::{connect, parse_remote};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Status code the service answers for a missing object
const NO_SUCH_ENTRY: u16 = 612;

/// Remove objects
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Object path(s) to remove (alias/bucket/key or alias/bucket/prefix/)
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Remove every object under the given prefix
    #[arg(short, long)]
    pub recursive: bool,

    /// Do not treat missing objects as errors
    #[arg(short, long)]
    pub force: bool,

    /// Only show what would be deleted (dry run)
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    status: &'static str,
    deleted: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed: Vec<FailedItem>,
    total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct FailedItem {
    path: String,
    code: u16,
    error: String,
}

/// Outcome of removing a set of objects
#[derive(Debug, Default)]
struct Removal {
    deleted: Vec<String>,
    failed: Vec<FailedItem>,
    exit: Option<ExitCode>,
}

impl Removal {
    fn merge(&mut self, other: Removal) {
        self.deleted.extend(other.deleted);
        self.failed.extend(other.failed);
        if self.exit.is_none() {
            self.exit = other.exit;
        }
    }
}

/// Execute the rm command
pub async fn execute(args: RmArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let mut paths = Vec::with_capacity(args.paths.len());
    for raw in &args.paths {
        match parse_remote(raw, &formatter) {
            Ok(path) => paths.push(path),
            Err(code) => return code,
        }
    }
    if let Some(path) = paths.iter().find(|p| !args.recursive && p.key.is_empty()) {
        formatter.error(&format!(
            "{path} is a bucket. Use --recursive to remove its objects"
        ));
        return ExitCode::UsageError;
    }

    let mut result = Removal::default();
    for (alias, group) in group_by_alias(paths) {
        let manager = match connect(&alias, &formatter) {
            Ok(manager) => manager,
            Err(code) => return code,
        };
        let removal = remove_group(&manager, &group, &args, &formatter, &output_config).await;
        result.merge(removal);
    }

    let has_error = result.exit.is_some() || !result.failed.is_empty();
    if formatter.is_json() {
        formatter.json(&RmOutput {
            status: if has_error { "partial" } else { "success" },
            total: result.deleted.len(),
            deleted: result.deleted,
            failed: result.failed,
        });
    } else if !args.dry_run && !result.deleted.is_empty() {
        formatter.success(&format!("Removed {} object(s).", result.deleted.len()));
    }

    match result.exit {
        Some(code) => code,
        None if has_error => ExitCode::GeneralError,
        None => ExitCode::Success,
    }
}

/// Group paths by alias, keeping the order aliases first appear in
fn group_by_alias(paths: Vec<RemotePath>) -> Vec<(String, Vec<RemotePath>)> {
    let mut groups: Vec<(String, Vec<RemotePath>)> = Vec::new();
    for path in paths {
        match groups.iter_mut().find(|(alias, _)| *alias == path.alias) {
            Some((_, group)) => group.push(path),
            None => groups.push((path.alias.clone(), vec![path])),
        }
    }
    groups
}

async fn remove_group(
    manager: &BucketManager,
    paths: &[RemotePath],
    args: &RmArgs,
    formatter: &Formatter,
    output_config: &OutputConfig,
) -> Removal {
    let mut targets = Vec::new();
    for path in paths {
        if args.recursive {
            match manager.list_all(&path.bucket, &ListQuery::prefix(&path.key)).await {
                Ok(page) => {
                    if page.items.is_empty() && !args.force {
                        formatter.warning(&format!("No objects found under {path}"));
                    }
                    targets.extend(page.items.into_iter().map(|item| path.with_key(item.key)));
                }
                Err(e) => {
                    return Removal {
                        exit: Some(formatter.fail(&format!("Failed to list {path}"), &e)),
                        ..Default::default()
                    };
                }
            }
        } else {
            targets.push(path.clone());
        }
    }

    if args.dry_run {
        for target in &targets {
            formatter.println(&format!("Would remove: {target}"));
        }
        return Removal {
            deleted: targets.iter().map(RemotePath::to_full_path).collect(),
            ..Default::default()
        };
    }

    if targets.len() == 1 && !args.recursive {
        return delete_single(manager, &targets[0], args, formatter).await;
    }
    delete_batch(manager, &targets, args, formatter, output_config).await
}

async fn delete_single(
    manager: &BucketManager,
    target: &RemotePath,
    args: &RmArgs,
    formatter: &Formatter,
) -> Removal {
    match manager.delete(&target.entry()).await {
        Ok(()) => {
            if !formatter.is_json() {
                formatter.println(&format!("Removed: {target}"));
            }
            Removal {
                deleted: vec![target.to_full_path()],
                ..Default::default()
            }
        }
        Err(e) if args.force && e.status() == Some(NO_SUCH_ENTRY) => Removal::default(),
        Err(e) => Removal {
            exit: Some(formatter.fail(&format!("Failed to remove {target}"), &e)),
            ..Default::default()
        },
    }
}

async fn delete_batch(
    manager: &BucketManager,
    targets: &[RemotePath],
    args: &RmArgs,
    formatter: &Formatter,
    output_config: &OutputConfig,
) -> Removal {
    let progress = ProgressBar::counter(output_config, targets.len() as u64);
    let mut removal = Removal::default();

    for chunk in targets.chunks(MAX_BATCH_OPS) {
        let operations: Vec<String> = chunk
            .iter()
            .map(|target| uri_delete(&target.entry()))
            .collect();

        match manager.batch(&operations).await {
            Ok(results) => {
                let (deleted, failed) = pair_results(chunk, &results, args.force);
                if !formatter.is_json() {
                    for path in &deleted {
                        formatter.println(&format!("Removed: {path}"));
                    }
                }
                for item in &failed {
                    formatter.error(&format!(
                        "Failed to remove {}: {} ({})",
                        item.path, item.error, item.code
                    ));
                }
                removal.deleted.extend(deleted);
                removal.failed.extend(failed);
            }
            Err(e) => {
                progress.finish_and_clear();
                removal.exit = Some(formatter.fail("Batch delete failed", &e));
                return removal;
            }
        }
        progress.inc(chunk.len() as u64);
    }

    progress.finish_and_clear();
    removal
}

/// Match batch results to the targets they were issued for
fn pair_results(
    targets: &[RemotePath],
    results: &[BatchOpRet],
    force: bool,
) -> (Vec<String>, Vec<FailedItem>) {
    let mut deleted = Vec::new();
    let mut failed = Vec::new();
    for (target, result) in targets.iter().zip(results) {
        if result.is_success() {
            deleted.push(target.to_full_path());
        } else if force && result.code == NO_SUCH_ENTRY {
            continue;
        } else {
            failed.push(FailedItem {
                path: target.to_full_path(),
                code: result.code,
                error: result.error().unwrap_or_default().to_string(),
            });
        }
    }
    (deleted, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kc_core::BatchOpData;

    fn ret(code: u16, error: &str) -> BatchOpRet {
        BatchOpRet {
            code,
            data: (!error.is_empty()).then(|| BatchOpData {
                error: error.to_string(),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_group_by_alias_keeps_order() {
        let paths = vec![
            RemotePath::new("b", "bucket", "1"),
            RemotePath::new("a", "bucket", "2"),
            RemotePath::new("b", "other", "3"),
        ];
        let groups = group_by_alias(paths);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "b");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "a");
    }

    #[test]
    fn test_pair_results_reports_failed_items() {
        let targets = vec![
            RemotePath::new("prod", "b", "ok.txt"),
            RemotePath::new("prod", "b", "gone.txt"),
            RemotePath::new("prod", "b", "locked.txt"),
        ];
        let results = vec![
            ret(200, ""),
            ret(612, "no such file or directory"),
            ret(403, "permission denied"),
        ];

        let (deleted, failed) = pair_results(&targets, &results, false);
        assert_eq!(deleted, vec!["prod/b/ok.txt"]);
        assert_eq!(failed.len(), 2);
        assert_eq!(failed[0].path, "prod/b/gone.txt");
        assert_eq!(failed[0].code, 612);
        assert_eq!(failed[1].error, "permission denied");

        let output = RmOutput {
            status: "partial",
            total: deleted.len(),
            deleted,
            failed: failed[..1].to_vec(),
        };
        insta::assert_json_snapshot!(output, @r#"
        {
          "status": "partial",
          "deleted": [
            "prod/b/ok.txt"
          ],
          "failed": [
            {
              "path": "prod/b/gone.txt",
              "code": 612,
              "error": "no such file or directory"
            }
          ],
          "total": 1
        }
        "#);
    }

    #[test]
    fn test_pair_results_force_skips_missing() {
        let targets = vec![
            RemotePath::new("prod", "b", "gone.txt"),
            RemotePath::new("prod", "b", "locked.txt"),
        ];
        let results = vec![ret(612, "no such file or directory"), ret(403, "")];

        let (deleted, failed) = pair_results(&targets, &results, true);
        assert!(deleted.is_empty());
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].error, "unknown error");
    }

    #[test]
    fn test_removal_merge_keeps_first_exit() {
        let mut removal = Removal {
            exit: Some(ExitCode::AuthError),
            ..Default::default()
        };
        removal.merge(Removal {
            deleted: vec!["prod/b/k".to_string()],
            exit: Some(ExitCode::NotFound),
            ..Default::default()
        });
        assert_eq!(removal.exit, Some(ExitCode::AuthError));
        assert_eq!(removal.deleted.len(), 1);
    }
}
