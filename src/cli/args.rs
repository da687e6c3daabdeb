// CLI argument definitions using Clap

use clap::Parser;
use std::path::PathBuf;

/// Output format for the recorded call sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Console,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "console" | "text" => Ok(Self::Console),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// Replay a recorded test-engine event log through the reporter
#[derive(Parser, Debug)]
#[command(name = "rp-replay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Show the reporting calls a run would produce",
    long_about = "Reads newline-delimited JSON lifecycle events, feeds them through the \
                  reporter against an in-memory client and prints the resulting calls."
)]
pub struct Cli {
    /// Event log (one JSON event per line)
    #[arg(required = true)]
    pub events: PathBuf,

    /// Configuration file (defaults to .rpreporterrc.toml lookup)
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Output format (console, json)
    #[arg(long, default_value = "console")]
    pub format: OutputFormat,

    /// Pin every timestamp to this unix-millis value
    #[arg(long, value_name = "MILLIS")]
    pub fixed_time: Option<i64>,

    /// Directory holding `<test title>.png` screenshots
    #[arg(long, value_name = "DIR")]
    pub screenshots: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long, default_value_t = false)]
    pub show_config: bool,
}
