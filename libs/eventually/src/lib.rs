//! Eventual-state assertions.
//!
//! Platform state converges asynchronously: a pushed app becomes routable a
//! few seconds after `cf push` returns, a task flips from `RUNNING` to
//! `SUCCEEDED` whenever the scheduler gets to it. Tests express this as an
//! [`Eventually`]: a probe that reads the current state, a pure predicate
//! over that state, and a finite time budget.
//!
//! # Invariants
//!
//! - The budget is always finite; expiry yields [`TimeoutError`], never a
//!   silent pass.
//! - A probe that never returns cannot extend the wait: every probe call is
//!   bounded by the remaining budget.
//! - Waiting suspends only the calling task.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Smallest poll interval accepted; zero would spin the executor.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Default wait budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default poll spacing.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// What the last poll saw before the budget ran out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// No probe call completed.
    Nothing,

    /// The probe returned a state that did not satisfy the predicate.
    State(String),

    /// The probe itself failed.
    ProbeError(String),
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nothing => f.write_str("<no completed poll>"),
            Self::State(state) => f.write_str(state),
            Self::ProbeError(err) => write!(f, "probe error: {err}"),
        }
    }
}

/// The predicate was not satisfied within the budget.
#[derive(Debug, Clone, Error)]
#[error(
    "timed out after {elapsed:?} waiting for {description} ({attempts} polls); last observed: {last_observed}"
)]
pub struct TimeoutError {
    pub description: String,
    pub elapsed: Duration,
    pub attempts: u32,
    pub last_observed: Observation,

    /// True when the budget expired while a probe call was still running.
    pub probe_in_flight: bool,
}

/// A predicate paired with a wait budget and a poll interval.
#[derive(Debug, Clone)]
pub struct Eventually {
    timeout: Duration,
    interval: Duration,
    description: String,
}

impl Default for Eventually {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_INTERVAL)
    }
}

impl Eventually {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval: interval.max(MIN_INTERVAL),
            description: "condition".to_string(),
        }
    }

    /// Names the condition for logs and the timeout message.
    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Polls `probe` until `predicate` accepts its result.
    ///
    /// The first poll happens immediately, later polls every `interval`.
    /// Probe errors are treated as "not yet" and recorded as the last
    /// observation. Returns the first accepted state.
    pub async fn until<S, E, P, Fut, F>(&self, mut probe: P, predicate: F) -> Result<S, TimeoutError>
    where
        S: fmt::Debug,
        E: fmt::Display,
        P: FnMut() -> Fut,
        Fut: Future<Output = Result<S, E>>,
        F: Fn(&S) -> bool,
    {
        let start = Instant::now();
        let deadline = start + self.timeout;
        let mut attempts = 0u32;
        let mut last_observed = Observation::Nothing;

        loop {
            attempts += 1;

            let probe_in_flight = match tokio::time::timeout_at(deadline, probe()).await {
                Ok(Ok(state)) => {
                    if predicate(&state) {
                        debug!(
                            description = %self.description,
                            attempts,
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            "Condition met"
                        );
                        return Ok(state);
                    }
                    trace!(description = %self.description, attempts, state = ?state, "Condition not met");
                    last_observed = Observation::State(format!("{state:?}"));
                    false
                }
                Ok(Err(e)) => {
                    trace!(description = %self.description, attempts, error = %e, "Probe failed");
                    last_observed = Observation::ProbeError(e.to_string());
                    false
                }
                Err(_) => true,
            };

            let now = Instant::now();
            if now >= deadline {
                let err = TimeoutError {
                    description: self.description.clone(),
                    elapsed: now - start,
                    attempts,
                    last_observed,
                    probe_in_flight,
                };
                debug!(error = %err, "Condition not met within budget");
                return Err(err);
            }

            tokio::time::sleep_until((now + self.interval).min(deadline)).await;
        }
    }

    /// Like [`until`](Self::until) for probes that cannot fail.
    pub async fn until_infallible<S, P, Fut, F>(&self, mut probe: P, predicate: F) -> Result<S, TimeoutError>
    where
        S: fmt::Debug,
        P: FnMut() -> Fut,
        Fut: Future<Output = S>,
        F: Fn(&S) -> bool,
    {
        self.until(
            || {
                let fut = probe();
                async move { Ok::<S, std::convert::Infallible>(fut.await) }
            },
            predicate,
        )
        .await
    }
}
