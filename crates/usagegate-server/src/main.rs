//! usagegate server
//!
//! - `GET /active_users`: active user count from the upstream usage API,
//!   cached for `CACHE_TIMEOUT` seconds
//! - `GET /healthz`, `GET /metrics`
//!
//! Configuration comes from the environment and is read once at startup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use usagegate_core::error::Result;
use usagegate_server::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "usagegate exited with error");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let state = AppState::new(config::load_from_env()?)?;
    let listen = state.cfg().listen.addr();
    let window_secs = state.cfg().cache.window.as_secs();
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| usagegate_core::UsageGateError::Internal(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, cache_timeout_secs = window_secs, "usagegate starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| usagegate_core::UsageGateError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
