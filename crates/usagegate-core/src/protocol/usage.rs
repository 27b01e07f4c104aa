//! Upstream usage payload and the active-users response body.

use serde::{Deserialize, Serialize};

use crate::error::{Result, UsageGateError};

/// Body of the upstream `GET /api/usage` response.
///
/// Unknown fields are ignored; only `user_ids` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct UsageResponse {
    /// Models currently in use (not consumed).
    #[serde(default)]
    pub model_ids: Vec<String>,
    /// Identifiers of users with recent activity. May contain duplicates.
    pub user_ids: Vec<String>,
}

impl UsageResponse {
    /// Decode an upstream body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| UsageGateError::Decode(e.to_string()))
    }

    /// Number of active users: the length of `user_ids`, duplicates included.
    pub fn active_user_count(&self) -> u64 {
        self.user_ids.len() as u64
    }
}

/// Body returned by `GET /active_users`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveUsers {
    pub active_users: u64,
}

impl From<u64> for ActiveUsers {
    fn from(active_users: u64) -> Self {
        Self { active_users }
    }
}
