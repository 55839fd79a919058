//! Command execution.

use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::PlatformError;

/// Default budget for a single command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit code reported when the process was terminated by a signal.
const SIGNALED_EXIT_CODE: i32 = 128;

/// A program, its arguments and a time budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub timeout: Duration,
    redacted: Vec<usize>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: Vec::new(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
            redacted: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends an argument that must never appear in logs.
    #[must_use]
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.redacted.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns true if `[program, args...]` starts with `prefix`.
    pub fn starts_with<S: AsRef<str>>(&self, prefix: &[S]) -> bool {
        let tokens = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        let mut matched = 0;
        for (token, expected) in tokens.zip(prefix) {
            if token != AsRef::<str>::as_ref(expected) {
                return false;
            }
            matched += 1;
        }
        matched == prefix.len()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for (i, arg) in self.args.iter().enumerate() {
            if self.redacted.contains(&i) {
                f.write_str(" ***")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    /// A successful run printing `stdout`.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    /// A failed run with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// True if stdout or stderr mentions `needle`.
    pub fn says(&self, needle: &str) -> bool {
        self.stdout.contains(needle) || self.stderr.contains(needle)
    }

    /// Last few hundred bytes of stderr (or stdout when stderr is empty),
    /// for error messages.
    pub fn excerpt(&self) -> String {
        const MAX: usize = 512;
        let source = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        let trimmed = source.trim();
        if trimmed.len() <= MAX {
            return trimmed.to_string();
        }
        let mut start = trimmed.len() - MAX;
        while !trimmed.is_char_boundary(start) {
            start += 1;
        }
        format!("...{}", &trimmed[start..])
    }
}

/// Runs commands on behalf of the harness.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Runs `invocation` to completion or until its timeout.
    async fn execute(&self, invocation: &Invocation) -> Result<CommandOutput, PlatformError>;
}

/// Spawns real processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    env: Vec<(String, String)>,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment applied to every spawned process, e.g. `CF_HOME`.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, invocation: &Invocation) -> Result<CommandOutput, PlatformError> {
        let started = Instant::now();
        debug!(command = %invocation, timeout_secs = invocation.timeout.as_secs(), "Running command");

        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(self.env.iter().cloned())
            .envs(invocation.env.iter().cloned())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PlatformError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(invocation.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| PlatformError::Spawn {
                program: invocation.program.clone(),
                source,
            })?,
            Err(_) => {
                warn!(command = %invocation, timeout_secs = invocation.timeout.as_secs(), "Command timed out");
                return Err(PlatformError::CommandTimedOut {
                    command: invocation.to_string(),
                    timeout: invocation.timeout,
                });
            }
        };

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(SIGNALED_EXIT_CODE),
        };

        debug!(
            command = %invocation,
            exit_code = result.exit_code,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );

        Ok(result)
    }
}
