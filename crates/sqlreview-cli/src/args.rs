//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "sqlreview")]
#[command(author, version, about = "SQL schema-change review tool")]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Review SQL files against the configured rules
    Check {
        /// SQL files to review (supports glob patterns)
        files: Vec<PathBuf>,

        /// Path to configuration file (default: search for sqlreview.toml)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// SQL dialect
        #[arg(short, long, env = "SQLREVIEW_DIALECT")]
        dialect: Option<String>,

        /// Rule to run, optionally with a level (e.g. table.require-pk=warning)
        #[arg(short, long = "rule", value_name = "RULE[=LEVEL]")]
        rules: Vec<String>,

        /// Charset passed to the parser
        #[arg(long)]
        charset: Option<String>,

        /// Collation passed to the parser
        #[arg(long)]
        collation: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// List the rules available for a dialect
    Rules {
        /// SQL dialect
        #[arg(short, long, default_value = "mysql")]
        dialect: String,
    },

    /// Parse SQL and display statements (for debugging)
    Parse {
        /// SQL file to parse
        file: PathBuf,

        /// SQL dialect
        #[arg(short, long, default_value = "mysql")]
        dialect: String,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output
    Json,
    /// SARIF output (for GitHub Code Scanning)
    Sarif,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}
