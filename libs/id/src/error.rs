//! Error types for ID and name parsing.

use thiserror::Error;

/// Errors that can occur when parsing a typed ID.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The ID string is empty.
    #[error("ID cannot be empty")]
    Empty,

    /// The ID has a prefix belonging to another ID type.
    #[error("invalid ID prefix: expected '{expected}', got '{actual}'")]
    InvalidPrefix {
        expected: &'static str,
        actual: String,
    },

    /// The ID is missing the underscore separator.
    #[error("ID missing underscore separator")]
    MissingSeparator,

    /// The ULID portion of the ID is invalid.
    #[error("invalid ULID: {0}")]
    InvalidUlid(String),
}

impl IdError {
    /// Returns true if this error indicates a prefix mismatch.
    pub fn is_prefix_error(&self) -> bool {
        matches!(self, IdError::InvalidPrefix { .. })
    }
}

/// Errors for resource names that the platform would reject.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("resource name cannot be empty")]
    Empty,

    #[error("resource name is {len} characters, maximum is {max}")]
    TooLong { len: usize, max: usize },

    #[error("resource name contains invalid character {0:?}")]
    InvalidChar(char),

    #[error("resource name must not start or end with '-'")]
    EdgeHyphen,
}
