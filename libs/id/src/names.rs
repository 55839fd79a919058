//! Collision-free resource names.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::error::NameError;
use crate::Ulid;

/// Longest name accepted, matching the DNS label limit apps are routed under.
pub const MAX_NAME_LEN: usize = 63;

const MAX_PREFIX_LEN: usize = 16;
const MAX_KIND_LEN: usize = 12;

/// A validated platform-facing resource name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceName(String);

impl ResourceName {
    /// Validates `s` as a lowercase DNS label.
    pub fn parse(s: &str) -> Result<Self, NameError> {
        validate(s)?;
        Ok(Self(s.to_string()))
    }

    /// Derives a related name, e.g. the second route of an app (`{name}-two`).
    pub fn with_suffix(&self, suffix: &str) -> Result<Self, NameError> {
        Self::parse(&format!("{}-{}", self.0, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn validate(s: &str) -> Result<(), NameError> {
    if s.is_empty() {
        return Err(NameError::Empty);
    }
    if s.len() > MAX_NAME_LEN {
        return Err(NameError::TooLong {
            len: s.len(),
            max: MAX_NAME_LEN,
        });
    }
    if let Some(c) = s
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(NameError::InvalidChar(c));
    }
    if s.starts_with('-') || s.ends_with('-') {
        return Err(NameError::EdgeHyphen);
    }
    Ok(())
}

/// Generates names of the form `{prefix}-{kind}-{session}-{seq}`.
///
/// Safe to share across tasks: the sequence is a single atomic counter, so
/// two calls on the same generator never observe the same value.
#[derive(Debug)]
pub struct NameGenerator {
    prefix: String,
    session: String,
    seq: AtomicU64,
}

impl NameGenerator {
    /// Creates a generator with a random session token.
    pub fn new(prefix: &str) -> Result<Self, NameError> {
        let random = Ulid::new().random() as u32;
        Self::with_session(prefix, &format!("{random:08x}"))
    }

    /// Creates a generator with a fixed session token.
    pub fn with_session(prefix: &str, session: &str) -> Result<Self, NameError> {
        let prefix = prefix.to_ascii_lowercase();
        validate(&prefix)?;
        if prefix.len() > MAX_PREFIX_LEN {
            return Err(NameError::TooLong {
                len: prefix.len(),
                max: MAX_PREFIX_LEN,
            });
        }
        validate(session)?;

        Ok(Self {
            prefix,
            session: session.to_string(),
            seq: AtomicU64::new(0),
        })
    }

    /// Returns the next unique name for a resource of `kind`.
    ///
    /// `kind` is reduced to lowercase alphanumerics and truncated, so any
    /// label is accepted.
    pub fn next(&self, kind: &str) -> ResourceName {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let kind: String = kind
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .take(MAX_KIND_LEN)
            .collect();

        let name = if kind.is_empty() {
            format!("{}-{}-{}", self.prefix, self.session, seq)
        } else {
            format!("{}-{}-{}-{}", self.prefix, kind, self.session, seq)
        };
        ResourceName(name)
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    /// Number of names handed out so far.
    pub fn issued(&self) -> u64 {
        self.seq.load(Ordering::Relaxed)
    }
}
