//! Single-slot cache gate.
//!
//! One cached count guarded by one async mutex. The lock covers the whole
//! read-or-refresh sequence, so at most one upstream call is in flight and
//! callers never see a half-written entry. Requests that queued behind a
//! refresh get that refresh's outcome instead of starting another one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;

use usagegate_core::error::{Result, UsageGateError};

use crate::obs::metrics::GatewayMetrics;
use crate::upstream::UsageSource;

/// The cached value. `updated_at == None` means "never refreshed".
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheEntry {
    pub value: u64,
    pub updated_at: Option<Instant>,
}

impl CacheEntry {
    /// Cached value if it is younger than `window` at `now`.
    pub fn fresh_value(&self, now: Instant, window: Duration) -> Option<u64> {
        let updated_at = self.updated_at?;
        (now.saturating_duration_since(updated_at) < window).then_some(self.value)
    }
}

#[derive(Debug, Default)]
struct Slot {
    entry: CacheEntry,
    /// Outcome of the most recent refresh attempt.
    last_outcome: Option<Result<u64>>,
}

/// Time-windowed, mutually exclusive cache in front of a [`UsageSource`].
pub struct CacheGate {
    slot: Arc<Mutex<Slot>>,
    /// Completed refresh attempts. Bumped under the lock.
    attempts: Arc<AtomicU64>,
    source: Arc<dyn UsageSource>,
    window: Duration,
    wait_timeout: Option<Duration>,
    metrics: Arc<GatewayMetrics>,
}

impl CacheGate {
    pub fn new(source: Arc<dyn UsageSource>, window: Duration, metrics: Arc<GatewayMetrics>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            attempts: Arc::new(AtomicU64::new(0)),
            source,
            window,
            wait_timeout: None,
            metrics,
        }
    }

    /// Bound how long a request may wait for the slot. Unbounded by default.
    pub fn with_wait_timeout(mut self, wait_timeout: Option<Duration>) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    /// Snapshot of the cached entry (waits for any in-flight refresh).
    pub async fn entry(&self) -> CacheEntry {
        self.slot.lock().await.entry
    }

    pub async fn get(&self) -> Result<u64> {
        self.get_at(Instant::now()).await
    }

    /// Return the active user count as of `now`, refreshing from the
    /// upstream if the cached value is older than the window.
    pub async fn get_at(&self, now: Instant) -> Result<u64> {
        let seen = self.attempts.load(Ordering::Acquire);
        let mut slot = self.lock_slot().await?;

        // A refresh finished while we were queued: share its outcome.
        if self.attempts.load(Ordering::Acquire) != seen {
            if let Some(outcome) = slot.last_outcome.clone() {
                self.metrics.cache_lookups.inc(&[("outcome", "joined")]);
                tracing::debug!(ok = outcome.is_ok(), "joined in-flight refresh");
                return outcome;
            }
        }

        if let Some(value) = slot.entry.fresh_value(now, self.window) {
            self.metrics.cache_lookups.inc(&[("outcome", "hit")]);
            tracing::debug!(value, "returning cached result");
            return Ok(value);
        }

        self.metrics.cache_lookups.inc(&[("outcome", "miss")]);

        // The fetch runs on its own task holding the owned guard, so a
        // dropped request future cannot cancel it halfway.
        let source = Arc::clone(&self.source);
        let attempts = Arc::clone(&self.attempts);
        let metrics = Arc::clone(&self.metrics);
        let refresh = tokio::spawn(async move {
            let started = std::time::Instant::now();
            let outcome = source.fetch_active_user_count().await;
            metrics.upstream_duration.observe(&[], started.elapsed());

            match &outcome {
                Ok(value) => {
                    slot.entry = CacheEntry {
                        value: *value,
                        updated_at: Some(now),
                    };
                    tracing::info!(value, "active user count refreshed");
                }
                Err(e) => {
                    // updated_at untouched: the next request retries.
                    metrics
                        .upstream_errors
                        .inc(&[("code", e.client_code().as_str())]);
                    tracing::warn!(error = %e, "upstream refresh failed");
                }
            }
            slot.last_outcome = Some(outcome.clone());
            attempts.fetch_add(1, Ordering::Release);
            drop(slot);
            outcome
        });

        refresh
            .await
            .map_err(|e| UsageGateError::Internal(format!("refresh task failed: {e}")))?
    }

    async fn lock_slot(&self) -> Result<OwnedMutexGuard<Slot>> {
        let lock = Arc::clone(&self.slot).lock_owned();
        match self.wait_timeout {
            None => Ok(lock.await),
            Some(limit) => tokio::time::timeout(limit, lock).await.map_err(|_| {
                tracing::warn!(
                    wait_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    "gave up waiting for cache slot"
                );
                UsageGateError::Timeout
            }),
        }
    }
}
