//! Single-slot cache in front of the upstream usage source.

pub mod gate;

pub use gate::{CacheEntry, CacheGate};
