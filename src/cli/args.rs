//! Command-line argument parsing for aftercare
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::monitor::Activity;

/// aftercare - post-discharge monitoring demo
#[derive(Parser, Debug)]
#[command(name = "aftercare")]
#[command(version)]
#[command(about = "Readmission risk, medication reminders and vitals monitoring after discharge", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand (defaults to the interactive shell)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start interactive REPL mode
    Start,

    /// Train the risk model and print its summary
    Train {
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        samples: Option<usize>,
    },

    /// Score one patient and explain the result
    Predict {
        /// JSON object mapping feature names to values
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Feature override, e.g. --set age=72 (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        overrides: Vec<String>,
    },

    /// Parse a discharge document
    Parse {
        file: PathBuf,

        /// Treat the file as PDF regardless of extension
        #[arg(long)]
        pdf: bool,
    },

    /// Print today's reminders for a medication list (JSON array)
    Schedule {
        meds: PathBuf,

        /// IANA timezone, defaults to the configured patient timezone
        #[arg(long)]
        tz: Option<String>,
    },

    /// Run the simulated wearable stream
    Stream {
        #[arg(short, long)]
        samples: Option<usize>,

        #[arg(short, long, value_enum, default_value_t = Activity::Rest)]
        activity: Activity,

        #[arg(long)]
        interval_ms: Option<u64>,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write a daily report for a fresh session
    Report {
        /// Output directory, defaults to report.output_dir
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Log filter used when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
        }
    }

    /// Check if should show progress bars
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should print every stream sample
    pub fn show_samples(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}

/// Split a `name=value` override
pub fn parse_override(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    Ok((name.trim().to_string(), value))
}
