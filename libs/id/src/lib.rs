//! # cfat-id
//!
//! Identifiers for the acceptance harness.
//!
//! Two kinds of identity live here:
//!
//! - **Handle IDs** are harness-side, typed and ULID-based
//!   (`hdl_01HV4Z2WQXKJNM8GPQY6VBKC3D`). They never leave the process and
//!   exist so logs and reports can refer to a provisioned resource without
//!   confusing it with a different kind.
//! - **Resource names** are what the platform sees (`cats-app-7k2m9q4x-12`).
//!   They must be unique across every test case running against the same
//!   deployment, lowercase, and usable as a DNS label because pushed apps
//!   are routed by name.
//!
//! ## Uniqueness
//!
//! A [`NameGenerator`] combines a random session token with an atomic
//! sequence number. Within one generator the sequence alone guarantees
//! distinct names; the session token separates concurrent runner processes.

mod error;
mod macros;
mod names;
mod types;

pub use error::{IdError, NameError};
pub use names::{NameGenerator, ResourceName, MAX_NAME_LEN};
pub use types::*;

/// Re-export ulid for consumers that need raw ULID operations
pub use ulid::Ulid;
