//! CLI parse: clap types for Pagesmith. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pagesmith - build one pending website request from templates and generated copy
#[derive(Parser)]
#[command(name = "pagesmith")]
#[command(about = "Generate, render and publish one pending website build")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (holds config/ and the default templates/)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Suppress all log output
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Debug-level logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the most recent pending request
    Run {
        /// Write pages into this local directory instead of the FTP server.
        /// The request status is left untouched and no notification is sent.
        #[arg(long, value_name = "DIR")]
        dry_run: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Check configuration and every theme in the template set
    Validate {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List themes and their pages
    Themes {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Command name used in log fields.
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Run { dry_run: Some(_), .. } => "run.dry_run",
        Commands::Run { .. } => "run",
        Commands::Validate { .. } => "validate",
        Commands::Themes { .. } => "themes",
    }
}
