//! cats - runs the Cloud Foundry acceptance suites.
//!
//! ```bash
//! CONFIG=./integration_config.json cats run --suite apps --suite v3
//! cats list
//! ```

use anyhow::Result;
use clap::Parser;

mod commands;
mod error;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = cli.run().await {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
