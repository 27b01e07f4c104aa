use axum::{extract::State, http::StatusCode, Json};

use usagegate_core::protocol::usage::ActiveUsers;

use super::ApiError;
use crate::app_state::AppState;

/// `GET /active_users`
pub async fn active_users(State(state): State<AppState>) -> Result<Json<ActiveUsers>, ApiError> {
    let outcome = match state.gate() {
        Ok(gate) => gate.get().await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(count) => {
            state
                .metrics()
                .http_responses
                .inc(&[("status", StatusCode::OK.as_str())]);
            Ok(Json(ActiveUsers::from(count)))
        }
        Err(e) => {
            state
                .metrics()
                .http_responses
                .inc(&[("status", StatusCode::INTERNAL_SERVER_ERROR.as_str())]);
            tracing::error!(code = e.client_code().as_str(), error = %e, "active_users failed");
            Err(e.into())
        }
    }
}
