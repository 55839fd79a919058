//! `cats run`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cfat_acceptance::{select, Suite};
use cfat_harness::{logging, CatsConfig, Harness, TestOutcome};
use cfat_platform::{HttpClient, HttpClientConfig, Platform, ProcessExecutor};
use clap::Args;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::error::CliError;
use crate::output::{print_summary, OutcomeRow, OutputFormat};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Suite to run (apps, routing, services, v3). Repeatable; default all.
    #[arg(long = "suite", value_name = "NAME")]
    pub suites: Vec<Suite>,

    /// Only run cases whose `suite/name` contains this text.
    #[arg(long)]
    pub filter: Option<String>,

    /// Config file. Defaults to the path in $CONFIG.
    #[arg(long, env = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Maximum concurrently running test cases.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,
}

impl RunArgs {
    pub async fn run(self, format: OutputFormat) -> Result<()> {
        let config = self.load_config()?;
        // A subscriber may already be installed when embedded.
        let _ = logging::init(&config.log_level, self.json_logs);

        let cases = select(&config, &self.suites, self.filter.as_deref());
        if cases.is_empty() {
            return Err(CliError::NothingSelected.into());
        }

        let http = HttpClient::new(&HttpClientConfig {
            skip_ssl_validation: config.skip_ssl_validation,
            timeout: config.default_timeout(),
        })
        .context("building HTTP client")?;
        let platform = Platform::new(Arc::new(ProcessExecutor::new()), Arc::new(http));

        let concurrency = config.concurrency;
        let harness = Harness::new(config, platform).map_err(CliError::from)?;
        info!(
            run_id = %harness.run_id(),
            cases = cases.len(),
            concurrency,
            "Starting run"
        );

        let limiter = Arc::new(Semaphore::new(concurrency));
        let mut tasks = JoinSet::new();
        for (index, case) in cases.into_iter().enumerate() {
            let harness = harness.clone();
            let limiter = Arc::clone(&limiter);
            tasks.spawn(async move {
                let _permit = limiter.acquire_owned().await;
                (index, case.run(&harness).await)
            });
        }

        let mut outcomes: Vec<(usize, TestOutcome)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!(error = %e, "Test case task failed"),
            }
        }
        outcomes.sort_by_key(|(index, _)| *index);

        let rows: Vec<OutcomeRow> = outcomes.iter().map(|(_, o)| OutcomeRow::new(o)).collect();
        print_summary(&rows, format);

        let failed = rows.iter().filter(|r| !r.passed).count();
        if failed > 0 {
            return Err(CliError::TestsFailed {
                failed,
                total: rows.len(),
            }
            .into());
        }
        Ok(())
    }

    fn load_config(&self) -> Result<CatsConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = CatsConfig::load(path)?;
                config.apply_env_overrides()?;
                config
            }
            None => CatsConfig::from_env()?,
        };
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        config.validate()?;
        Ok(config)
    }
}
