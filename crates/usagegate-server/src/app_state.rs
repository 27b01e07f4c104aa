//! Shared application state for the usagegate server.
//!
//! Built once at startup and cloned into every handler. Owns the single
//! cache gate; there is no process-wide cache state outside of it.

use std::sync::Arc;

use usagegate_core::error::{ConfigError, Result};

use crate::cache::CacheGate;
use crate::config::ServerConfig;
use crate::obs::metrics::GatewayMetrics;
use crate::upstream::{HttpUsageSource, UsageSource};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    /// `Err` when upstream settings are missing; every lookup reports it.
    gate: std::result::Result<CacheGate, ConfigError>,
    metrics: Arc<GatewayMetrics>,
}

impl AppState {
    /// Build application state with the HTTP upstream client.
    ///
    /// Missing `API_URL`/`TOKEN` does not fail startup; the error is kept and
    /// returned by each `/active_users` request.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        let source = match cfg.upstream.credentials() {
            Ok(creds) => {
                let source = HttpUsageSource::new(creds, cfg.upstream.timeout)?;
                tracing::info!(api_url = %source.base_url(), "upstream configured");
                Ok(Arc::new(source) as Arc<dyn UsageSource>)
            }
            Err(e) => {
                tracing::warn!(error = %e, "upstream not configured, /active_users will fail");
                Err(e)
            }
        };
        Ok(Self::build(cfg, source))
    }

    /// Build application state around an arbitrary usage source.
    pub fn with_source(cfg: ServerConfig, source: Arc<dyn UsageSource>) -> Self {
        Self::build(cfg, Ok(source))
    }

    fn build(
        cfg: ServerConfig,
        source: std::result::Result<Arc<dyn UsageSource>, ConfigError>,
    ) -> Self {
        let metrics = Arc::new(GatewayMetrics::default());
        let gate = source.map(|source| {
            CacheGate::new(source, cfg.cache.window, Arc::clone(&metrics))
                .with_wait_timeout(cfg.cache.wait_timeout)
        });

        Self {
            inner: Arc::new(AppStateInner { cfg, gate, metrics }),
        }
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    /// The cache gate, or the configuration error that prevented building it.
    pub fn gate(&self) -> Result<&CacheGate> {
        self.inner.gate.as_ref().map_err(|e| e.clone().into())
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.inner.metrics
    }
}
