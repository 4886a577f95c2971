//! Command-line interface for driftscan
//!
//! This module provides the main CLI structure and command handling. It uses
//! clap for argument parsing; the engine itself stays CLI-free.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

pub mod commands;
mod output;

pub use output::Output;

/// driftscan - Secret detection with a version-over-version audit trail
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Enable quiet output (minimal)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Scan files for secrets
    Scan(commands::scan::ScanArgs),
    /// Audit-diff a scan against the stored baseline
    #[command(subcommand)]
    Audit(AuditCommands),
    /// Audit history queries and export
    #[command(subcommand)]
    History(HistoryCommands),
    /// List active detection patterns
    Patterns,
    /// Show version information
    Version,
}

/// Audit subcommands
#[derive(Subcommand)]
pub enum AuditCommands {
    /// Scan, diff against the resolved baseline, and record the result
    Run(commands::audit::AuditArgs),
}

/// History subcommands
#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List recent audit records
    List {
        /// Number of records to show
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },
    /// Export the audit history
    Export {
        /// Export format (json, csv)
        #[arg(long, default_value = "json")]
        format: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        commands::setup_logging(self.verbose, self.quiet);

        let output = Output::new(self.verbose > 0, self.quiet);

        match self.command {
            Some(Commands::Scan(args)) => {
                commands::scan::execute(args, self.config.as_deref(), &output).await
            }
            Some(Commands::Audit(AuditCommands::Run(args))) => {
                commands::audit::execute(args, self.config.as_deref(), &output).await
            }
            Some(Commands::History(cmd)) => {
                commands::history::execute(cmd, self.config.as_deref(), &output).await
            }
            Some(Commands::Patterns) => {
                commands::patterns::execute(self.config.as_deref(), &output).await
            }
            Some(Commands::Version) => commands::version::execute(&output).await,
            None => {
                // Show help when no command is provided
                let mut cmd = Cli::command();
                cmd.print_help()?;
                Ok(())
            }
        }
    }
}
