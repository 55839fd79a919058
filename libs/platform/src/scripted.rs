//! Scripted platform doubles.
//!
//! Replies are registered against a command prefix (or an HTTP method and
//! URL). Each matching call consumes the next queued reply; the last reply
//! repeats once the queue is down to one. The most specific (longest)
//! matching prefix wins. Every call is recorded for later assertions.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::command::{CommandExecutor, CommandOutput, Invocation};
use crate::error::PlatformError;
use crate::http::{FetchResponse, HttpFetcher, HttpRequest, Method};

/// A canned reply.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    /// Return this value.
    Value(T),

    /// Return this value after a delay.
    Delayed(Duration, T),

    /// Fail at the transport level.
    Error(String),

    /// Never return.
    Hang,
}

impl<T: Clone> Reply<T> {
    async fn play(&self) -> Result<T, PlatformError> {
        match self {
            Self::Value(v) => Ok(v.clone()),
            Self::Delayed(delay, v) => {
                tokio::time::sleep(*delay).await;
                Ok(v.clone())
            }
            Self::Error(message) => Err(PlatformError::Scripted(message.clone())),
            Self::Hang => std::future::pending().await,
        }
    }
}

#[derive(Debug)]
struct Rule<K, T> {
    key: K,
    replies: VecDeque<Reply<T>>,
}

impl<K, T: Clone> Rule<K, T> {
    fn next_reply(&mut self) -> Option<Reply<T>> {
        if self.replies.len() > 1 {
            self.replies.pop_front()
        } else {
            self.replies.front().cloned()
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Command executor that replays registered replies.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    rules: Mutex<Vec<Rule<Vec<String>, CommandOutput>>>,
    calls: Mutex<Vec<Invocation>>,
    permissive: bool,
}

impl ScriptedExecutor {
    /// Unmatched commands fail with exit code 127.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unmatched commands succeed with empty output.
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::default()
        }
    }

    /// Queues `reply` for commands starting with `prefix`.
    pub fn on<S: AsRef<str>>(&self, prefix: &[S], reply: Reply<CommandOutput>) -> &Self {
        let key: Vec<String> = prefix.iter().map(|s| AsRef::<str>::as_ref(s).to_string()).collect();
        let mut rules = lock(&self.rules);
        match rules.iter_mut().find(|r| r.key == key) {
            Some(rule) => rule.replies.push_back(reply),
            None => rules.push(Rule {
                key,
                replies: VecDeque::from([reply]),
            }),
        }
        self
    }

    /// Shorthand for a successful reply with `stdout`.
    pub fn ok<S: AsRef<str>>(&self, prefix: &[S], stdout: impl Into<String>) -> &Self {
        self.on(prefix, Reply::Value(CommandOutput::ok(stdout)))
    }

    /// Shorthand for a non-zero exit.
    pub fn fail<S: AsRef<str>>(&self, prefix: &[S], exit_code: i32, stderr: impl Into<String>) -> &Self {
        self.on(prefix, Reply::Value(CommandOutput::failed(exit_code, stderr)))
    }

    /// Every invocation so far, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        lock(&self.calls).clone()
    }

    /// Number of invocations starting with `prefix`.
    pub fn count<S: AsRef<str>>(&self, prefix: &[S]) -> usize {
        lock(&self.calls).iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn reply_for(&self, invocation: &Invocation) -> Option<Reply<CommandOutput>> {
        let mut rules = lock(&self.rules);
        rules
            .iter_mut()
            .filter(|r| invocation.starts_with(r.key.as_slice()))
            .max_by_key(|r| r.key.len())
            .and_then(Rule::next_reply)
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(&self, invocation: &Invocation) -> Result<CommandOutput, PlatformError> {
        lock(&self.calls).push(invocation.clone());
        debug!(command = %invocation, "Scripted command");

        match self.reply_for(invocation) {
            Some(reply) => reply.play().await,
            None if self.permissive => Ok(CommandOutput::ok("")),
            None => Ok(CommandOutput::failed(
                127,
                format!("no scripted reply for `{invocation}`"),
            )),
        }
    }
}

/// HTTP fetcher that replays registered replies keyed by method and URL.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    rules: Mutex<Vec<Rule<(Method, String), FetchResponse>>>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl ScriptedFetcher {
    /// Unmatched requests fail as if the host were unreachable.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, method: Method, url: impl Into<String>, reply: Reply<FetchResponse>) -> &Self {
        let key = (method, url.into());
        let mut rules = lock(&self.rules);
        match rules.iter_mut().find(|r| r.key == key) {
            Some(rule) => rule.replies.push_back(reply),
            None => rules.push(Rule {
                key,
                replies: VecDeque::from([reply]),
            }),
        }
        self
    }

    /// Shorthand for a GET answered with `status` and `body`.
    pub fn get(&self, url: impl Into<String>, status: u16, body: impl Into<String>) -> &Self {
        self.on(Method::Get, url, Reply::Value(FetchResponse::new(status, body)))
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        lock(&self.calls).clone()
    }

    pub fn count(&self, method: Method, url: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }
}

#[async_trait]
impl HttpFetcher for ScriptedFetcher {
    async fn fetch(&self, request: &HttpRequest) -> Result<FetchResponse, PlatformError> {
        lock(&self.calls).push(request.clone());

        let reply = {
            let mut rules = lock(&self.rules);
            rules
                .iter_mut()
                .find(|r| r.key.0 == request.method && r.key.1 == request.url)
                .and_then(Rule::next_reply)
        };

        match reply {
            Some(reply) => reply.play().await,
            None => Err(PlatformError::Http {
                method: request.method.to_string(),
                url: request.url.clone(),
                message: "no scripted response".to_string(),
            }),
        }
    }
}
