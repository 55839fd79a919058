//! Typed Cloud Controller responses.
//!
//! Each endpoint the suites read is decoded once into a struct. Lookups that
//! can miss return `HarnessError::NotFound` instead of silently doing
//! nothing.

pub mod v2;
pub mod v3;
