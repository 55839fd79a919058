//! Error taxonomy.
//!
//! - [`ProvisioningError`] aborts the test case that asked for the resource.
//! - [`TimeoutError`] aborts the test case and carries the last observed
//!   state.
//! - [`TeardownError`] is never propagated; it is logged and collected into
//!   the test outcome.

use std::time::Duration;

use cfat_id::HandleId;
use cfat_platform::{CommandOutput, FetchResponse, PlatformError};
use thiserror::Error;

pub use cfat_eventually::TimeoutError;

use crate::handle::ResourceKind;

/// Why an external create or delete call did not succeed.
#[derive(Debug, Error)]
pub enum ExternalError {
    #[error("exit code {exit_code}: {excerpt}")]
    Exit { exit_code: i32, excerpt: String },

    #[error("HTTP {status}: {excerpt}")]
    Status { status: u16, excerpt: String },

    #[error("unexpected response: {0}")]
    Response(String),

    #[error("did not finish within {0:?}")]
    TimedOut(Duration),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl ExternalError {
    /// Failure for a command that exited non-zero.
    pub fn exit(output: &CommandOutput) -> Self {
        Self::Exit {
            exit_code: output.exit_code,
            excerpt: output.excerpt(),
        }
    }

    /// Failure for an HTTP call that returned a non-success status.
    pub fn status(response: &FetchResponse) -> Self {
        const MAX: usize = 512;
        let mut excerpt = response.body.trim().to_string();
        if excerpt.len() > MAX {
            let mut cut = MAX;
            while !excerpt.is_char_boundary(cut) {
                cut -= 1;
            }
            excerpt.truncate(cut);
            excerpt.push_str("...");
        }
        Self::Status {
            status: response.status,
            excerpt,
        }
    }

    /// Ok if `output` exited zero.
    pub fn check_exit(output: &CommandOutput) -> Result<(), Self> {
        if output.success() {
            Ok(())
        } else {
            Err(Self::exit(output))
        }
    }
}

/// The external creation call for a resource failed.
#[derive(Debug, Error)]
#[error("provisioning {kind} `{name}` failed: {cause}")]
pub struct ProvisioningError {
    pub kind: ResourceKind,
    pub name: String,
    #[source]
    pub cause: ExternalError,
}

/// Best-effort deletion of a resource failed.
#[derive(Debug, Error)]
#[error("tearing down {kind} `{name}` ({handle}) failed: {cause}")]
pub struct TeardownError {
    pub handle: HandleId,
    pub kind: ResourceKind,
    pub name: String,
    #[source]
    pub cause: ExternalError,
}

/// Everything that can end a test case unsuccessfully.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),

    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("{action} failed: {cause}")]
    External {
        action: String,
        #[source]
        cause: ExternalError,
    },

    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error("could not decode {what}: {message}")]
    Decode { what: String, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("test case exceeded its {0:?} deadline")]
    DeadlineExceeded(Duration),

    #[error("test case panicked: {0}")]
    Panicked(String),

    #[error("test case was cancelled")]
    Cancelled,
}

impl HarnessError {
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    /// A command or request made by the test body itself failed.
    pub fn external(action: impl Into<String>, cause: impl Into<ExternalError>) -> Self {
        Self::External {
            action: action.into(),
            cause: cause.into(),
        }
    }

    pub fn decode(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            what: what.into(),
            message: err.to_string(),
        }
    }

    /// Short machine-readable category, used in reports.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Provisioning(_) => "provisioning_failed",
            Self::Timeout(_) => "timeout",
            Self::Platform(_) => "platform_error",
            Self::External { .. } => "external_call_failed",
            Self::Assertion(_) => "assertion_failed",
            Self::Decode { .. } => "decode_failed",
            Self::NotFound(_) => "not_found",
            Self::DeadlineExceeded(_) => "deadline_exceeded",
            Self::Panicked(_) => "panicked",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Fails with an assertion error built lazily from `message` unless `condition` holds.
pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), HarnessError> {
    if condition {
        Ok(())
    } else {
        Err(HarnessError::Assertion(message()))
    }
}

/// Configuration could not be loaded or is invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("failed to read config from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config from {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid name prefix: {0}")]
    NamePrefix(#[from] cfat_id::NameError),
}
