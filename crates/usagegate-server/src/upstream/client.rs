//! HTTP client for the upstream usage API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;

use usagegate_core::error::{Result, UsageGateError};
use usagegate_core::protocol::usage::UsageResponse;

use super::UsageSource;
use crate::config::UpstreamCredentials;

const USAGE_PATH: &str = "/api/usage";

/// Issue one authenticated `GET {base_url}/api/usage` and count `user_ids`.
pub async fn fetch_active_user_count(
    client: &reqwest::Client,
    base_url: &str,
    auth_token: &str,
) -> Result<u64> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), USAGE_PATH);

    let response = client
        .get(&url)
        .header(AUTHORIZATION, format!("Bearer {auth_token}"))
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(UsageGateError::UpstreamStatus {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("unknown").to_string(),
        });
    }

    // Read the body first so transport errors are not reported as decode errors.
    let body = response
        .bytes()
        .await
        .map_err(transport_error)?;
    let usage = UsageResponse::from_slice(&body)?;

    Ok(usage.active_user_count())
}

/// Network error carrying the whole reqwest source chain; the top-level
/// message alone only says "error sending request".
fn transport_error(e: reqwest::Error) -> UsageGateError {
    let kind = if e.is_timeout() {
        "timed out"
    } else if e.is_connect() {
        "connect failed"
    } else {
        "transport failed"
    };

    let mut msg = format!("{kind}: {e}");
    let mut source = std::error::Error::source(&e);
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    UsageGateError::Network(msg)
}

/// [`UsageSource`] backed by the upstream HTTP API.
#[derive(Clone)]
pub struct HttpUsageSource {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpUsageSource {
    pub fn new(creds: UpstreamCredentials, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| UsageGateError::Internal(format!("http client build failed: {e}")))?;

        Ok(Self {
            client,
            base_url: creds.api_url,
            token: creds.token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl UsageSource for HttpUsageSource {
    async fn fetch_active_user_count(&self) -> Result<u64> {
        fetch_active_user_count(&self.client, &self.base_url, &self.token).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use std::net::SocketAddr;

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;

    use super::*;

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn usage(headers: HeaderMap) -> (StatusCode, &'static str) {
        match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            Some("Bearer secret") => (
                StatusCode::OK,
                r#"{"model_ids":["m"],"user_ids":["a","b","a"]}"#,
            ),
            _ => (StatusCode::UNAUTHORIZED, "nope"),
        }
    }

    #[tokio::test]
    async fn counts_users_with_bearer_token() {
        let addr = serve(Router::new().route("/api/usage", get(usage))).await;
        let client = reqwest::Client::new();

        let base = format!("http://{addr}/");
        let n = fetch_active_user_count(&client, &base, "secret").await.unwrap();
        assert_eq!(n, 3);
    }

    #[tokio::test]
    async fn wrong_token_is_a_status_error() {
        let addr = serve(Router::new().route("/api/usage", get(usage))).await;
        let client = reqwest::Client::new();

        let err = fetch_active_user_count(&client, &format!("http://{addr}"), "wrong")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            UsageGateError::UpstreamStatus {
                status: 401,
                reason: "Unauthorized".into()
            }
        );
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let app = Router::new().route("/api/usage", get(|| async { "not json" }));
        let addr = serve(app).await;
        let client = reqwest::Client::new();

        let err = fetch_active_user_count(&client, &format!("http://{addr}"), "t")
            .await
            .unwrap_err();
        assert!(matches!(err, UsageGateError::Decode(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_a_network_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpUsageSource::new(
            UpstreamCredentials {
                api_url: format!("http://{addr}"),
                token: "t".into(),
            },
            Some(Duration::from_secs(2)),
        )
        .unwrap();

        let err = source.fetch_active_user_count().await.unwrap_err();
        match err {
            UsageGateError::Network(msg) => assert!(msg.starts_with("connect failed:"), "{msg}"),
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn elapsed_upstream_timeout_is_a_network_error() {
        let app = Router::new().route(
            "/api/usage",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                r#"{"user_ids":["a"]}"#
            }),
        );
        let addr = serve(app).await;

        let source = HttpUsageSource::new(
            UpstreamCredentials {
                api_url: format!("http://{addr}"),
                token: "t".into(),
            },
            Some(Duration::from_secs(1)),
        )
        .unwrap();

        let started = std::time::Instant::now();
        let err = source.fetch_active_user_count().await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(4));
        match err {
            UsageGateError::Network(msg) => assert!(msg.starts_with("timed out:"), "{msg}"),
            other => panic!("expected network error, got {other:?}"),
        }
    }
}
