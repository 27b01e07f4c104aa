//! Upstream usage source.
//!
//! The cache gate only sees [`UsageSource`]; [`HttpUsageSource`] is the
//! production implementation talking to `GET {API_URL}/api/usage`.

pub mod client;

use async_trait::async_trait;

use usagegate_core::error::Result;

pub use client::{fetch_active_user_count, HttpUsageSource};

/// Anything that can produce the current active user count.
///
/// One call is one upstream attempt; implementations must not retry.
#[async_trait]
pub trait UsageSource: Send + Sync {
    async fn fetch_active_user_count(&self) -> Result<u64>;
}
