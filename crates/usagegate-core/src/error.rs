//! Shared error type across usagegate crates.

use thiserror::Error;

/// Stable error codes, used as log fields and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Required configuration missing or invalid.
    Config,
    /// Transport failure talking to the upstream.
    Network,
    /// Upstream answered with a non-2xx status.
    UpstreamStatus,
    /// Upstream body did not match the expected shape.
    Decode,
    /// Gave up waiting for the cache slot.
    Timeout,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::Config => "CONFIG",
            ClientCode::Network => "NETWORK",
            ClientCode::UpstreamStatus => "UPSTREAM_STATUS",
            ClientCode::Decode => "DECODE",
            ClientCode::Timeout => "TIMEOUT",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Configuration problems detected while reading the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    Missing(&'static str),
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, UsageGateError>;

/// Unified error type used by core and server.
///
/// `Clone` so one failed refresh can be handed to every request that waited on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageGateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("network error: {0}")]
    Network(String),
    #[error("upstream returned {status} {reason}")]
    UpstreamStatus { status: u16, reason: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("timed out waiting for cache refresh")]
    Timeout,
    #[error("internal: {0}")]
    Internal(String),
}

impl UsageGateError {
    /// Map an error to its stable code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            UsageGateError::Config(_) => ClientCode::Config,
            UsageGateError::Network(_) => ClientCode::Network,
            UsageGateError::UpstreamStatus { .. } => ClientCode::UpstreamStatus,
            UsageGateError::Decode(_) => ClientCode::Decode,
            UsageGateError::Timeout => ClientCode::Timeout,
            UsageGateError::Internal(_) => ClientCode::Internal,
        }
    }
}
