//! Integration tests for kc CLI
//!
//! Offline tests only touch the local configuration. Live tests need a Kodo
//! account and an existing bucket, and are skipped when these are unset:
//!
//! ```bash
//! export TEST_KODO_ACCESS_KEY=...
//! export TEST_KODO_SECRET_KEY=...
//! export TEST_KODO_BUCKET=...
//! # optional: a small public file to fetch into the bucket
//! export TEST_KODO_FETCH_URL=https://example.com/robots.txt
//!
//! cargo test --features integration
//! ```

#![cfg(feature = "integration")]

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run kc with an isolated configuration directory
fn run_kc(args: &[&str], config_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kc"))
        .args(args)
        .env("KC_CONFIG_DIR", config_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute kc command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Live test configuration: (access key, secret key, bucket)
fn get_test_config() -> Option<(String, String, String)> {
    let access_key = std::env::var("TEST_KODO_ACCESS_KEY").ok()?;
    let secret_key = std::env::var("TEST_KODO_SECRET_KEY").ok()?;
    let bucket = std::env::var("TEST_KODO_BUCKET").ok()?;
    Some((access_key, secret_key, bucket))
}

/// Generate unique suffix for test resources
fn uuid_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{:x}", duration.as_nanos() % 0xFFFFFFFF)
}

/// Config directory holding an offline alias named `test`
fn offline_alias() -> TempDir {
    let config_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = run_kc(
        &["alias", "set", "test", "ak", "sk", "--region", "z0"],
        config_dir.path(),
    );
    assert!(output.status.success(), "alias set: {}", stderr(&output));
    config_dir
}

mod offline {
    use super::*;

    #[test]
    fn test_alias_roundtrip() {
        let config_dir = offline_alias();

        let output = run_kc(&["alias", "list", "--json"], config_dir.path());
        assert!(output.status.success());
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(json["aliases"][0]["name"], "test");
        assert_eq!(json["aliases"][0]["region"], "z0");
        assert!(!stdout(&output).contains("\"sk\""));

        let output = run_kc(&["alias", "remove", "test"], config_dir.path());
        assert!(output.status.success());

        let output = run_kc(&["alias", "remove", "test"], config_dir.path());
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_alias_rejects_unknown_region() {
        let config_dir = tempfile::tempdir().unwrap();
        let output = run_kc(
            &["alias", "set", "test", "ak", "sk", "--region", "mars-1"],
            config_dir.path(),
        );
        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn test_unknown_alias_is_not_found() {
        let config_dir = tempfile::tempdir().unwrap();
        let output = run_kc(&["stat", "nope/bucket/key"], config_dir.path());
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_invalid_path_is_usage_error() {
        let config_dir = offline_alias();
        let output = run_kc(&["stat", "test/bucket"], config_dir.path());
        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn test_list_limit_checked_before_network() {
        let config_dir = offline_alias();
        for limit in ["0", "1001"] {
            let output = run_kc(
                &["ls", "test/bucket", "--limit", limit],
                config_dir.path(),
            );
            assert_eq!(output.status.code(), Some(2), "limit {limit}");
            assert!(stderr(&output).contains("Invalid argument"));
        }
    }

    #[test]
    fn test_rm_bucket_requires_recursive() {
        let config_dir = offline_alias();
        let output = run_kc(&["rm", "test/bucket"], config_dir.path());
        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn test_share_private_url() {
        let config_dir = offline_alias();
        let output = run_kc(
            &[
                "share",
                "test",
                "cdn.example.com",
                "dir/my file.txt",
                "--expire",
                "600",
                "--json",
            ],
            config_dir.path(),
        );
        assert!(output.status.success(), "share: {}", stderr(&output));
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        let url = json["url"].as_str().unwrap();
        assert!(url.starts_with("http://cdn.example.com/dir/my%20file.txt?e="));
        assert!(url.contains("&token=ak:"));
        assert!(json["expires_at"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_share_public_url() {
        let config_dir = offline_alias();
        let output = run_kc(
            &["share", "test", "https://cdn.example.com", "a b.txt", "--public"],
            config_dir.path(),
        );
        assert!(output.status.success());
        assert_eq!(stdout(&output).trim(), "https://cdn.example.com/a%20b.txt");
    }
}

mod live {
    use super::*;

    /// Config directory with a live alias named `live`, plus the test bucket
    fn setup() -> Option<(TempDir, String)> {
        let (access_key, secret_key, bucket) = get_test_config()?;
        let config_dir = tempfile::tempdir().ok()?;
        let output = run_kc(
            &["alias", "set", "live", &access_key, &secret_key],
            config_dir.path(),
        );
        if !output.status.success() {
            eprintln!("Failed to set alias: {}", stderr(&output));
            return None;
        }
        Some((config_dir, bucket))
    }

    #[test]
    fn test_bucket_is_listed() {
        let Some((config_dir, bucket)) = setup() else {
            eprintln!("Skipping: Kodo test config not available");
            return;
        };
        let output = run_kc(&["ls", "live", "--json"], config_dir.path());
        assert!(output.status.success(), "ls: {}", stderr(&output));
        assert!(stdout(&output).contains(&bucket));
    }

    #[test]
    fn test_domains() {
        let Some((config_dir, bucket)) = setup() else {
            eprintln!("Skipping: Kodo test config not available");
            return;
        };
        let output = run_kc(
            &["domains", &format!("live/{bucket}"), "--json"],
            config_dir.path(),
        );
        assert!(output.status.success(), "domains: {}", stderr(&output));
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert!(json["domains"].is_array());
    }

    #[test]
    fn test_object_lifecycle() {
        let Some((config_dir, bucket)) = setup() else {
            eprintln!("Skipping: Kodo test config not available");
            return;
        };
        let Ok(fetch_url) = std::env::var("TEST_KODO_FETCH_URL") else {
            eprintln!("Skipping: TEST_KODO_FETCH_URL not set");
            return;
        };
        let prefix = format!("kc-test-{}/", uuid_suffix());
        let original = format!("live/{bucket}/{prefix}original.txt");
        let copy = format!("live/{bucket}/{prefix}copy.txt");
        let moved = format!("live/{bucket}/{prefix}moved.txt");
        let dir = config_dir.path();

        let output = run_kc(&["fetch", &fetch_url, &original], dir);
        assert!(output.status.success(), "fetch: {}", stderr(&output));

        let output = run_kc(&["stat", &original, "--json"], dir);
        assert!(output.status.success(), "stat: {}", stderr(&output));
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert!(json["size_bytes"].as_i64().unwrap() > 0);

        let output = run_kc(&["cp", &original, &copy], dir);
        assert!(output.status.success(), "cp: {}", stderr(&output));

        // Copy onto an existing key without --force conflicts
        let output = run_kc(&["cp", &original, &copy], dir);
        assert_eq!(output.status.code(), Some(6));

        let output = run_kc(&["mv", &copy, &moved], dir);
        assert!(output.status.success(), "mv: {}", stderr(&output));

        let output = run_kc(&["stat", &copy], dir);
        assert_eq!(output.status.code(), Some(5));

        let listing = format!("live/{bucket}/{prefix}");
        let output = run_kc(&["ls", &listing, "--limit", "1", "--json"], dir);
        assert!(output.status.success(), "ls: {}", stderr(&output));
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(json["items"].as_array().unwrap().len(), 1);
        assert_eq!(json["has_more"], true);

        let output = run_kc(&["ls", &listing, "--stream", "--recursive", "--json"], dir);
        assert!(output.status.success(), "ls --stream: {}", stderr(&output));
        let objects = stdout(&output)
            .lines()
            .filter(|line| line.contains("\"object\""))
            .count();
        assert_eq!(objects, 2);

        let output = run_kc(&["rm", "--recursive", &listing, "--json"], dir);
        assert!(output.status.success(), "rm: {}", stderr(&output));
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(json["total"], 2);
    }
}
