//! `cats list`

use anyhow::Result;
use cfat_acceptance::catalog;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_output, OutputFormat};

#[derive(Debug, Args)]
pub struct ListArgs {}

#[derive(Debug, Serialize, Tabled)]
struct CaseRow {
    #[tabled(rename = "Suite")]
    suite: String,
    #[tabled(rename = "Test case")]
    name: String,
}

impl ListArgs {
    pub fn run(self, format: OutputFormat) -> Result<()> {
        let rows: Vec<CaseRow> = catalog()
            .iter()
            .map(|case| CaseRow {
                suite: case.suite.to_string(),
                name: case.name.to_string(),
            })
            .collect();
        print_output(&rows, format);
        Ok(())
    }
}
