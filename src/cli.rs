//! Command-line interface parsing for the `ttlcache` binary
//!
//! The binary caches the standard output of a command: it runs the command
//! only when the cache file is missing or older than `--ttl`, and otherwise
//! prints the stored output.

use std::path::PathBuf;
use std::process::Command;
use std::string::FromUtf8Error;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::cache::CorruptPolicy;
use crate::config::CacheConfig;
use crate::producer::Producer;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The TTL is not a non-negative number with an optional s/m/h suffix
    #[error("Invalid ttl: '{0}'. Expected seconds or a number with an s, m or h suffix (e.g. 90, 5m, 2h)")]
    InvalidTtl(String),
}

/// Cache the output of a command on disk for a fixed time
#[derive(Parser, Debug)]
#[command(name = "ttlcache")]
#[command(about = "Run a command at most once per TTL and cache its output in a file")]
#[command(version)]
pub struct Cli {
    /// How long the cached output stays fresh
    ///
    /// Examples:
    ///   ttlcache --ttl 90 -- date     # 90 seconds
    ///   ttlcache --ttl 5m -- date     # 5 minutes
    ///   ttlcache --ttl 0 -- date      # always rerun
    #[arg(long, value_name = "DURATION", default_value = "30", allow_hyphen_values = true)]
    pub ttl: String,

    /// Cache file location (defaults to the platform cache directory)
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// What to do when the cache file is corrupt
    #[arg(long, value_enum, default_value_t = CorruptArg::Fail)]
    pub on_corrupt: CorruptArg,

    /// Log cache decisions to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Command whose standard output is cached
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// `--on-corrupt` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CorruptArg {
    /// Exit with an error
    Fail,
    /// Rerun the command and overwrite the file
    Refresh,
}

impl From<CorruptArg> for CorruptPolicy {
    fn from(arg: CorruptArg) -> Self {
        match arg {
            CorruptArg::Fail => CorruptPolicy::Fail,
            CorruptArg::Refresh => CorruptPolicy::Refresh,
        }
    }
}

/// Parses a TTL argument into a duration.
///
/// # Arguments
/// * `s` - The ttl string from CLI, e.g. `30`, `45s`, `5m`, `2h`
///
/// # Returns
/// * `Ok(Duration)` if the string is a valid non-negative duration
/// * `Err(CliError::InvalidTtl)` otherwise
pub fn parse_ttl_arg(s: &str) -> Result<Duration, CliError> {
    let invalid = || CliError::InvalidTtl(s.to_string());
    let trimmed = s.trim();

    let (digits, multiplier) = match trimmed.char_indices().last() {
        Some((i, 's')) => (&trimmed[..i], 1),
        Some((i, 'm')) => (&trimmed[..i], 60),
        Some((i, 'h')) => (&trimmed[..i], 3600),
        Some(_) => (trimmed, 1),
        None => return Err(invalid()),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let secs = digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(invalid)?;
    Ok(Duration::from_secs(secs))
}

/// Everything the binary needs to run, derived from CLI arguments
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Cache settings
    pub cache: CacheConfig,
    /// The command to cache
    pub command: CommandProducer,
}

impl RunConfig {
    /// Creates a RunConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(RunConfig)` with the validated settings
    /// * `Err(CliError)` if the ttl is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let ttl = parse_ttl_arg(&cli.ttl)?;
        let expiry_seconds =
            i64::try_from(ttl.as_secs()).map_err(|_| CliError::InvalidTtl(cli.ttl.clone()))?;

        let (program, args) = cli
            .command
            .split_first()
            .map(|(program, args)| (program.clone(), args.to_vec()))
            .unwrap_or_default();

        Ok(RunConfig {
            cache: CacheConfig {
                expiry_seconds,
                storage_path: cli.path.clone(),
                on_corrupt: cli.on_corrupt.into(),
            },
            command: CommandProducer { program, args },
        })
    }
}

/// Errors from running the cached command
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command could not be started
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command exited unsuccessfully
    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// The command printed something that is not UTF-8
    #[error("'{program}' produced non UTF-8 output")]
    NonUtf8 {
        program: String,
        #[source]
        source: FromUtf8Error,
    },
}

/// Producer that runs a command and returns its standard output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandProducer {
    pub program: String,
    pub args: Vec<String>,
}

impl Producer for CommandProducer {
    type Value = String;
    type Error = CommandError;

    fn produce(&mut self) -> Result<String, CommandError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|source| CommandError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|source| CommandError::NonUtf8 {
            program: self.program.clone(),
            source,
        })
    }
}
