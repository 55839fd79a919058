//! Error handling and display for the CLI.

use cfat_harness::ConfigError;
use colored::Colorize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No test cases selected")]
    NothingSelected,

    #[error("{failed} of {total} test cases failed")]
    TestsFailed { failed: usize, total: usize },
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        match cli_err {
            CliError::Config(ConfigError::MissingEnv(var)) => {
                eprintln!(
                    "\n{}",
                    format!("Hint: set {var} to the path of your config file, or pass --config.").yellow()
                );
            }
            CliError::NothingSelected => {
                eprintln!(
                    "\n{}",
                    "Hint: check --suite/--filter and the include_* flags in the config. `cats list` shows every case."
                        .yellow()
                );
            }
            _ => {}
        }
    }
}
