//! Server config loader. Everything is read once, at startup.

pub mod schema;

use std::time::Duration;

use usagegate_core::error::{ConfigError, Result};

pub use schema::{CacheSection, ListenSection, ServerConfig, UpstreamCredentials, UpstreamSection};

use schema::{API_URL, CACHE_TIMEOUT, CACHE_WAIT_TIMEOUT, PORT, TOKEN, UPSTREAM_TIMEOUT};

pub fn load_from_env() -> Result<ServerConfig> {
    load_from_lookup(|name| std::env::var(name).ok())
}

/// Build a config from any variable source (the process env in production,
/// a map in tests).
pub fn load_from_lookup<F>(lookup: F) -> Result<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let port = match get(PORT) {
        Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
            var: PORT,
            reason: format!("{raw:?}: {e}"),
        })?,
        None => ListenSection::default().port,
    };

    let window = match get(CACHE_TIMEOUT) {
        Some(raw) => parse_window(&raw),
        None => schema::default_window(),
    };

    let cfg = ServerConfig {
        listen: ListenSection { port },
        upstream: UpstreamSection {
            api_url: get(API_URL),
            token: get(TOKEN),
            timeout: get(UPSTREAM_TIMEOUT)
                .map(|raw| parse_secs(UPSTREAM_TIMEOUT, &raw))
                .transpose()?,
        },
        cache: CacheSection {
            window,
            wait_timeout: get(CACHE_WAIT_TIMEOUT)
                .map(|raw| parse_secs(CACHE_WAIT_TIMEOUT, &raw))
                .transpose()?,
        },
    };
    cfg.validate()?;
    Ok(cfg)
}

/// A bad window is not fatal: fall back to the default. Negative means
/// "never cache".
fn parse_window(raw: &str) -> Duration {
    match raw.trim().parse::<i64>() {
        Ok(secs) if secs <= 0 => Duration::ZERO,
        Ok(secs) => Duration::from_secs(secs.unsigned_abs()),
        Err(e) => {
            let fallback = schema::default_window();
            tracing::warn!(
                value = %raw,
                error = %e,
                fallback_secs = fallback.as_secs(),
                "invalid CACHE_TIMEOUT, using default"
            );
            fallback
        }
    }
}

fn parse_secs(var: &'static str, raw: &str) -> std::result::Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::Invalid {
            var,
            reason: format!("{raw:?}: {e}"),
        })
}
