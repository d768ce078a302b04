//! ttlcache - run a command at most once per TTL and reuse its output
//!
//! Prints the cached standard output of the given command, rerunning the
//! command only when the cache file is missing or stale.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ttlcache::cli::{Cli, RunConfig};
use ttlcache::TtlFileCache;

/// Sends logs to stderr so stdout carries only the cached value
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "ttlcache=debug" } else { "ttlcache=warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Builds the cache from CLI arguments and prints its value
fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = RunConfig::from_cli(cli)?;

    let mut cache = TtlFileCache::builder()
        .producer(config.command)
        .config(&config.cache)
        .build()?;

    let value = cache.get_data()?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(value.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
