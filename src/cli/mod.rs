pub mod login;

use crate::analyzer::range::TimeFrame;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "social-report",
    about = "Social media performance report: time-window summaries and JSON API"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Login {
        #[arg(long)]
        passphrase: Option<String>,
    },
    Logout,
    Summary {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        #[arg(long, default_value_t = false)]
        save: bool,
    },
    Range {
        #[command(flatten)]
        range: RangeArgs,
    },
    Export {
        #[command(flatten)]
        range: RangeArgs,
    },
    Serve,
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    Status,
    Doctor,
}

#[derive(Debug, Args)]
pub struct RangeArgs {
    #[arg(long, default_value = "this_week")]
    pub time_frame: TimeFrame,
    /// Custom range start (YYYY-MM-DD), used with --time-frame custom
    #[arg(long)]
    pub start: Option<String>,
    /// Custom range end (YYYY-MM-DD), used with --time-frame custom
    #[arg(long)]
    pub end: Option<String>,
    /// Override today's date (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    Set { key: String, value: String },
    Get { key: String },
}
