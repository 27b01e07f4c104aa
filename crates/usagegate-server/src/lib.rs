//! usagegate server library entry.
//!
//! Wires configuration, the upstream usage client, the single-slot cache
//! gate, and the HTTP surface. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod api;
pub mod app_state;
pub mod cache;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod upstream;
