//! Output formatting for CLI commands.

use std::time::Duration;

use cfat_harness::TestOutcome;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
}

/// Print data in the specified format.
pub fn print_output<T: Serialize + Tabled>(data: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                println!("{}", "No items found.".dimmed());
            } else {
                println!("{}", Table::new(data));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// One line of the run report.
#[derive(Debug, Serialize, Tabled)]
pub struct OutcomeRow {
    #[tabled(rename = "Result")]
    pub result: String,
    #[tabled(rename = "Test case")]
    pub name: String,
    #[tabled(rename = "Time")]
    pub elapsed: String,
    #[tabled(rename = "Details")]
    pub details: String,
    #[tabled(skip)]
    pub passed: bool,
    #[tabled(skip)]
    pub teardown_failures: Vec<String>,
}

impl OutcomeRow {
    pub fn new(outcome: &TestOutcome) -> Self {
        let (result, details) = match &outcome.result {
            Ok(()) => ("PASS".to_string(), String::new()),
            Err(e) => (format!("FAIL ({})", e.reason_code()), e.to_string()),
        };
        Self {
            result,
            name: outcome.name.clone(),
            elapsed: format_elapsed(outcome.elapsed),
            details,
            passed: outcome.passed(),
            teardown_failures: outcome.teardown_failures.iter().map(ToString::to_string).collect(),
        }
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}

/// Prints the per-case report and a one-line summary.
pub fn print_summary(rows: &[OutcomeRow], format: OutputFormat) {
    if format == OutputFormat::Json {
        print_output(rows, format);
        return;
    }

    for row in rows {
        let status = if row.passed {
            row.result.green().bold()
        } else {
            row.result.red().bold()
        };
        println!("{status} {} {}", row.name, format!("({})", row.elapsed).dimmed());
        if !row.details.is_empty() {
            println!("    {}", row.details);
        }
        for failure in &row.teardown_failures {
            println!("    {} {failure}", "teardown:".yellow());
        }
    }

    let failed = rows.iter().filter(|r| !r.passed).count();
    let leaked: usize = rows.iter().map(|r| r.teardown_failures.len()).sum();
    let summary = format!("{} passed, {} failed", rows.len() - failed, failed);
    println!();
    if failed == 0 {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.red().bold());
    }
    if leaked > 0 {
        println!(
            "{}",
            format!("{leaked} resource(s) could not be torn down; check the platform for leftovers.").yellow()
        );
    }
}
