//! Integration tests for the ttlcache binary
//!
//! Runs the built binary against temporary cache files.

use std::fs;
use std::process::Command;

use tempfile::TempDir;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_ttlcache"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute ttlcache")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ttlcache"), "Help should mention ttlcache");
    assert!(stdout.contains("--ttl"), "Help should mention --ttl flag");
}

#[test]
fn test_invalid_ttl_prints_error_and_exits() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    let output = run_cli(&["--ttl", "soon", "--path", path.to_str().unwrap(), "--", "true"]);
    assert!(!output.status.success(), "Expected invalid ttl to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid ttl"),
        "Should print error message about invalid ttl: {}",
        stderr
    );
    assert!(!path.exists(), "Nothing should be cached");
}

#[test]
fn test_missing_command_is_rejected() {
    let output = run_cli(&["--ttl", "5"]);
    assert!(!output.status.success());
}

#[cfg(unix)]
#[test]
fn test_output_is_cached_between_runs() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("cache.json");
    let path_arg = path.to_str().unwrap();

    let first = run_cli(&["--ttl", "1h", "--path", path_arg, "--", "echo", "first"]);
    assert!(first.status.success());
    assert_eq!(String::from_utf8_lossy(&first.stdout), "first\n");
    assert!(path.exists(), "Cache file and its directory should be created");

    let second = run_cli(&["--ttl", "1h", "--path", path_arg, "--", "echo", "second"]);
    assert!(second.status.success());
    assert_eq!(
        String::from_utf8_lossy(&second.stdout),
        "first\n",
        "A fresh cache file should be reused"
    );
}

#[cfg(unix)]
#[test]
fn test_zero_ttl_reruns_command() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    let path_arg = path.to_str().unwrap();

    run_cli(&["--ttl", "1h", "--path", path_arg, "--", "echo", "old"]);
    let output = run_cli(&["--ttl", "0", "--path", path_arg, "--", "echo", "new"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "new\n");
}

#[cfg(unix)]
#[test]
fn test_failing_command_exits_with_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    let output = run_cli(&[
        "--path",
        path.to_str().unwrap(),
        "--",
        "sh",
        "-c",
        "echo unavailable >&2; exit 1",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unavailable"), "stderr was: {}", stderr);
    assert!(!path.exists());
}

#[cfg(unix)]
#[test]
fn test_corrupt_file_handling() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    fs::write(&path, "not json").unwrap();
    let path_arg = path.to_str().unwrap();

    let failed = run_cli(&["--path", path_arg, "--", "echo", "value"]);
    assert!(!failed.status.success(), "Corrupt file fails by default");
    assert_eq!(fs::read_to_string(&path).unwrap(), "not json");

    let refreshed = run_cli(&[
        "--path",
        path_arg,
        "--on-corrupt",
        "refresh",
        "--",
        "echo",
        "value",
    ]);
    assert!(refreshed.status.success());
    assert_eq!(String::from_utf8_lossy(&refreshed.stdout), "value\n");
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use std::time::Duration;
    use ttlcache::cli::{parse_ttl_arg, Cli, RunConfig};
    use ttlcache::CorruptPolicy;

    #[test]
    fn test_cli_ttl_defaults_to_thirty_seconds() {
        let cli = Cli::parse_from(["ttlcache", "--", "date"]);
        let config = RunConfig::from_cli(&cli).unwrap();
        assert_eq!(config.cache.expiry_seconds, 30);
        assert_eq!(config.cache.on_corrupt, CorruptPolicy::Fail);
        assert_eq!(config.command.program, "date");
        assert!(config.command.args.is_empty());
    }

    #[test]
    fn test_parse_ttl_arg_minutes() {
        assert_eq!(parse_ttl_arg("10m").unwrap(), Duration::from_secs(600));
    }

    #[test]
    fn test_parse_ttl_arg_invalid_returns_error() {
        assert!(parse_ttl_arg("ten").is_err());
    }

    #[test]
    fn test_run_config_from_cli_invalid_ttl() {
        let cli = Cli::parse_from(["ttlcache", "--ttl", "1w", "--", "date"]);
        assert!(RunConfig::from_cli(&cli).is_err());
    }
}
