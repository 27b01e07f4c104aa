//! Top-level facade crate for usagegate.
//!
//! Re-exports core types and the server library so users can depend on a single crate.

pub mod core {
    pub use usagegate_core::*;
}

pub mod server {
    pub use usagegate_server::*;
}
