//! CLI commands.

mod list;
mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// Cloud Foundry acceptance test runner.
#[derive(Debug, Parser)]
#[command(name = "cats")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List suites and their test cases.
    List(list::ListArgs),

    /// Run test cases against the configured platform.
    Run(run::RunArgs),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::List(args) => args.run(self.format),
            Commands::Run(args) => args.run(self.format).await,
        }
    }
}
