//! Lightweight in-process metrics.
//!
//! Counters and a latency histogram stored as atomics, rendered in Prometheus
//! text format by the `/metrics` handler.

pub mod metrics;
