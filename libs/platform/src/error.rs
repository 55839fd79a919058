//! Errors raised while talking to the platform.

use std::time::Duration;

use thiserror::Error;

/// Transport-level failures. Non-zero exits and non-2xx statuses are not
/// errors here; callers decide what counts as failure.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` did not finish within {timeout:?}")]
    CommandTimedOut { command: String, timeout: Duration },

    #[error("{method} {url} failed: {message}")]
    Http {
        method: String,
        url: String,
        message: String,
    },

    #[error("invalid HTTP client configuration: {0}")]
    Client(String),

    #[error("scripted platform: {0}")]
    Scripted(String),
}

impl PlatformError {
    /// Returns true if the operation ran out of time rather than failing.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PlatformError::CommandTimedOut { .. })
    }
}
