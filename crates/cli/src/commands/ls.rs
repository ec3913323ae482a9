//! ls command - List buckets and objects
//!
//! Lists buckets when given an alias only, or lists objects when given a bucket path.
//! Objects are listed page by page, or with `--stream` over a single streaming
//! connection that Ctrl-C cancels.

use clap::Args;
use kc_core::{
    ListEntryKind, ListItem, ListPage, ListQuery, ObjectStore as _, RemotePath, StreamOutcome,
    Target, parse_target,
};
use kc_kodo::BucketManager;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::{connect, format_time, human_size};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// List buckets or objects
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Remote path (alias/ or alias/bucket[/prefix])
    pub path: String,

    /// List recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Fetch a single page of at most this many objects (1-1000)
    #[arg(long, conflicts_with = "stream")]
    pub limit: Option<i64>,

    /// Resume after this marker
    #[arg(long)]
    pub marker: Option<String>,

    /// Read the listing over one streaming connection
    #[arg(long)]
    pub stream: bool,

    /// Include buckets shared with this account when listing buckets
    #[arg(long)]
    pub shared: bool,

    /// Summarize output (show totals only)
    #[arg(long)]
    pub summarize: bool,
}

/// Output structure for ls command (JSON format)
#[derive(Debug, Serialize)]
struct LsOutput {
    items: Vec<ListItem>,
    prefixes: Vec<String>,
    has_more: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    next_marker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct BucketsOutput {
    buckets: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    total_objects: usize,
    total_size_bytes: i64,
    total_size_human: String,
}

impl Summary {
    fn add(&mut self, item: &ListItem) {
        self.total_objects += 1;
        self.total_size_bytes += item.fsize;
    }

    fn finish(mut self) -> Self {
        self.total_size_human = human_size(self.total_size_bytes);
        self
    }
}

/// Execute the ls command
pub async fn execute(args: LsArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let target = match parse_target(&args.path) {
        Ok(target) => target,
        Err(e) => return formatter.fail("Invalid path", &e),
    };

    let alias_name = match &target {
        Target::Alias(name) => name.as_str(),
        Target::Path(path) => path.alias.as_str(),
    };
    let manager = match connect(alias_name, &formatter) {
        Ok(manager) => manager,
        Err(code) => return code,
    };

    match target {
        Target::Alias(_) => list_buckets(&manager, &formatter, args.shared).await,
        Target::Path(path) => {
            let query = build_query(&path, &args);
            if args.stream {
                stream_objects(&manager, &path, &query, &args, &formatter, output_config).await
            } else {
                list_objects(&manager, &path, &query, &args, &formatter).await
            }
        }
    }
}

fn build_query(path: &RemotePath, args: &LsArgs) -> ListQuery {
    let mut query = ListQuery::prefix(&path.key);
    if !args.recursive {
        query = query.with_delimiter("/");
    }
    if let Some(marker) = &args.marker {
        query = query.with_marker(marker);
    }
    query
}

fn object_line(item: &ListItem) -> String {
    format!(
        "[{}] {:>10} {}",
        format_time(item.put_timestamp()),
        human_size(item.fsize),
        item.key
    )
}

fn prefix_line(prefix: &str) -> String {
    format!("[{}] {:>10} {prefix}", format_time(None), "PRE")
}

async fn list_buckets(manager: &BucketManager, formatter: &Formatter, shared: bool) -> ExitCode {
    match manager.buckets(shared).await {
        Ok(buckets) => {
            if formatter.is_json() {
                formatter.json(&BucketsOutput { buckets });
            } else {
                for bucket in &buckets {
                    formatter.println(&format!("{bucket}/"));
                }
            }
            ExitCode::Success
        }
        Err(e) => formatter.fail("Failed to list buckets", &e),
    }
}

async fn list_objects(
    manager: &BucketManager,
    path: &RemotePath,
    query: &ListQuery,
    args: &LsArgs,
    formatter: &Formatter,
) -> ExitCode {
    let result = match args.limit {
        Some(limit) => manager.list(&path.bucket, query, limit).await,
        None => manager.list_all(&path.bucket, query).await,
    };
    let page: ListPage = match result {
        Ok(page) => page,
        Err(e) => return formatter.fail(&format!("Failed to list {path}"), &e),
    };

    let mut summary = Summary::default();
    page.items.iter().for_each(|item| summary.add(item));
    let summary = summary.finish();

    if formatter.is_json() {
        formatter.json(&LsOutput {
            items: page.items,
            prefixes: page.common_prefixes,
            has_more: page.has_more,
            next_marker: page.next_marker,
            summary: args.summarize.then_some(summary),
        });
        return ExitCode::Success;
    }

    if !args.summarize {
        for prefix in &page.common_prefixes {
            formatter.println(&prefix_line(prefix));
        }
        for item in &page.items {
            formatter.println(&object_line(item));
        }
    }
    if page.has_more {
        formatter.println(&format!("\nMore objects after marker: {}", page.next_marker));
    }
    if args.summarize {
        formatter.println(&format!(
            "Total: {} objects, {}",
            summary.total_objects, summary.total_size_human
        ));
    }
    ExitCode::Success
}

async fn stream_objects(
    manager: &BucketManager,
    path: &RemotePath,
    query: &ListQuery,
    args: &LsArgs,
    formatter: &Formatter,
    output_config: OutputConfig,
) -> ExitCode {
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let mut stream = match manager.list_stream(&path.bucket, query, &cancel).await {
        Ok(stream) => stream,
        Err(e) => {
            signal.abort();
            return formatter.fail(&format!("Failed to list {path}"), &e);
        }
    };

    let spinner = ProgressBar::spinner(&output_config, &format!("Listing {path}"));
    let mut summary = Summary::default();
    let mut last_marker = query.marker.clone();

    while let Some(next) = stream.next().await {
        let entry = match next {
            Ok(entry) => entry,
            Err(e) => {
                spinner.finish_and_clear();
                signal.abort();
                if !last_marker.is_empty() {
                    formatter.warning(&format!("Resume with --marker {last_marker}"));
                }
                return formatter.fail(&format!("Listing {path} failed"), &e);
            }
        };
        if !entry.marker.is_empty() {
            last_marker = entry.marker.clone();
        }

        match &entry.kind {
            ListEntryKind::Object(item) => {
                summary.add(item);
                spinner.set_message(&format!("{} objects", summary.total_objects));
                if !args.summarize {
                    print_stream_entry(formatter, &entry, || object_line(item));
                }
            }
            ListEntryKind::Dir(prefix) => {
                if !args.summarize {
                    print_stream_entry(formatter, &entry, || prefix_line(prefix));
                }
            }
            ListEntryKind::Marker => {}
        }
    }
    spinner.finish_and_clear();
    signal.abort();

    let summary = summary.finish();
    if stream.outcome() == Some(StreamOutcome::Cancelled) {
        formatter.warning(&format!(
            "Listing interrupted after {} objects",
            summary.total_objects
        ));
        if !last_marker.is_empty() {
            formatter.warning(&format!("Resume with --marker {last_marker}"));
        }
        return ExitCode::Interrupted;
    }

    if args.summarize {
        if formatter.is_json() {
            formatter.json(&summary);
        } else {
            formatter.println(&format!(
                "Total: {} objects, {}",
                summary.total_objects, summary.total_size_human
            ));
        }
    }
    ExitCode::Success
}

/// One JSON document per line in JSON mode, the human line otherwise
fn print_stream_entry(
    formatter: &Formatter,
    entry: &kc_core::ListEntry,
    human: impl FnOnce() -> String,
) {
    if formatter.is_json() {
        formatter.json_line(entry);
    } else {
        formatter.println(&human());
    }
}
