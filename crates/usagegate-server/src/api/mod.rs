//! Public HTTP API.
//!
//! - `GET /active_users` : cached active user count

pub mod active_users;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use usagegate_core::error::UsageGateError;

/// HTTP wrapper for [`UsageGateError`]: always a plain-text 500.
#[derive(Debug)]
pub struct ApiError(pub UsageGateError);

impl From<UsageGateError> for ApiError {
    fn from(e: UsageGateError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let msg = match &self.0 {
            UsageGateError::Config(e) => e.to_string(),
            e => format!("error counting active users: {e}"),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
    }
}
