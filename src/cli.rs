// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `taskprint`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskprint",
    version,
    about = "Fingerprint task inputs and decide which tasks are up to date.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Taskprint.toml` in the current working directory. Relative
    /// input roots and the fingerprint store are resolved against the
    /// directory containing this file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only check this task.
    #[arg(long, value_name = "NAME")]
    pub task: Option<String>,

    /// Store the current fingerprints of every task that would execute, as
    /// if it had just run successfully.
    #[arg(long)]
    pub record: bool,

    /// Parse + validate, print the declared inputs, but don't fingerprint.
    #[arg(long)]
    pub dry_run: bool,

    /// Fingerprinting worker count. Overrides `[config].workers`.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKPRINT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let args = CliArgs::parse_from([
            "taskprint",
            "--config",
            "build/Taskprint.toml",
            "--task",
            "compile",
            "--record",
            "--workers",
            "3",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("build/Taskprint.toml")));
        assert_eq!(args.task.as_deref(), Some("compile"));
        assert!(args.record);
        assert!(!args.dry_run);
        assert_eq!(args.workers, Some(3));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }

    #[test]
    fn config_is_optional() {
        let args = CliArgs::parse_from(["taskprint"]);
        assert!(args.config.is_none());
        assert!(args.task.is_none());
    }
}
