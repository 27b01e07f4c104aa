//! Wire formats.
//!
//! - `usage`: the upstream `GET /api/usage` payload and the downstream
//!   `/active_users` body.
//!
//! Decoding is panic-free: malformed input is reported as `UsageGateError`.

pub mod usage;
