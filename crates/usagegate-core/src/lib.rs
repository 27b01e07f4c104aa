//! usagegate core: error taxonomy and wire types shared by the server and its tests.
//!
//! This crate defines the upstream usage payload, the downstream response
//! body, and the error surface of the caching proxy. It carries no transport
//! or runtime dependencies so the contracts can be reused by other front ends.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `UsageGateError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Error types and the shared `Result` alias, re-exported at the crate root.
pub use error::{ConfigError, Result, UsageGateError};
