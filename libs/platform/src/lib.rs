//! Boundary between the harness and the platform under test.
//!
//! The harness needs exactly two capabilities from the outside world:
//!
//! - **Command execution** ([`CommandExecutor`]): run `cf` (or `curl`) with
//!   arguments and capture stdout, stderr and the exit code.
//! - **HTTP fetch** ([`HttpFetcher`]): issue a request and read back the
//!   status and body, used to poll pushed apps.
//!
//! Real implementations spawn processes ([`ProcessExecutor`]) and use
//! reqwest ([`HttpClient`]). Scripted implementations
//! ([`ScriptedExecutor`], [`ScriptedFetcher`]) replay canned replies and
//! record every call so the harness and suites can be tested offline.

mod command;
mod error;
mod http;
mod scripted;

use std::sync::Arc;

pub use command::{CommandExecutor, CommandOutput, Invocation, ProcessExecutor};
pub use error::PlatformError;
pub use http::{FetchResponse, HttpClient, HttpClientConfig, HttpFetcher, HttpRequest, Method};
pub use scripted::{Reply, ScriptedExecutor, ScriptedFetcher};

/// Both platform capabilities, cheaply cloneable across test tasks.
#[derive(Clone)]
pub struct Platform {
    executor: Arc<dyn CommandExecutor>,
    fetcher: Arc<dyn HttpFetcher>,
}

impl Platform {
    pub fn new(executor: Arc<dyn CommandExecutor>, fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self { executor, fetcher }
    }

    /// Runs a command. A non-zero exit code is not an error at this layer.
    pub async fn execute(&self, invocation: &Invocation) -> Result<CommandOutput, PlatformError> {
        self.executor.execute(invocation).await
    }

    /// Issues an HTTP request. Any status code is returned as `Ok`.
    pub async fn fetch(&self, request: &HttpRequest) -> Result<FetchResponse, PlatformError> {
        self.fetcher.fetch(request).await
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform").finish_non_exhaustive()
    }
}
