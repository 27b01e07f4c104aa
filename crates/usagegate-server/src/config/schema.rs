use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use usagegate_core::error::{ConfigError, Result};

pub const API_URL: &str = "API_URL";
pub const TOKEN: &str = "TOKEN";
pub const CACHE_TIMEOUT: &str = "CACHE_TIMEOUT";
pub const PORT: &str = "PORT";
pub const UPSTREAM_TIMEOUT: &str = "UPSTREAM_TIMEOUT";
pub const CACHE_WAIT_TIMEOUT: &str = "CACHE_WAIT_TIMEOUT";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: ListenSection,
    pub upstream: UpstreamSection,
    pub cache: CacheSection,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        self.upstream.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ListenSection {
    pub port: u16,
}

impl Default for ListenSection {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl ListenSection {
    /// Bind on all interfaces.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

/// Upstream settings. `api_url`/`token` stay optional here: a missing value
/// does not stop the server, it fails each `/active_users` request instead.
#[derive(Debug, Clone, Default)]
pub struct UpstreamSection {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub timeout: Option<Duration>,
}

/// Resolved upstream credentials (both present and non-empty).
#[derive(Debug, Clone)]
pub struct UpstreamCredentials {
    pub api_url: String,
    pub token: String,
}

impl UpstreamSection {
    pub fn validate(&self) -> Result<()> {
        if self.timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid {
                var: UPSTREAM_TIMEOUT,
                reason: "must be greater than 0".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Both required settings, or the first one that is missing.
    pub fn credentials(&self) -> std::result::Result<UpstreamCredentials, ConfigError> {
        let api_url = non_empty(&self.api_url).ok_or(ConfigError::Missing(API_URL))?;
        let token = non_empty(&self.token).ok_or(ConfigError::Missing(TOKEN))?;
        Ok(UpstreamCredentials {
            api_url: api_url.to_string(),
            token: token.to_string(),
        })
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

#[derive(Debug, Clone)]
pub struct CacheSection {
    /// Freshness window. Zero disables caching.
    pub window: Duration,
    /// Bound on waiting for the cache slot. `None` waits indefinitely.
    pub wait_timeout: Option<Duration>,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            window: default_window(),
            wait_timeout: None,
        }
    }
}

impl CacheSection {
    pub fn validate(&self) -> Result<()> {
        if self.wait_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid {
                var: CACHE_WAIT_TIMEOUT,
                reason: "must be greater than 0".into(),
            }
            .into());
        }
        Ok(())
    }
}

fn default_port() -> u16 {
    8080
}

pub(crate) fn default_window() -> Duration {
    Duration::from_secs(60)
}
