use super::handlers::{handle_finalize, handle_health};
use super::{AppState, MAX_BODY_SIZE, REQUEST_TIMEOUT_SECS};

use crate::config::Config;
use crate::core::pipeline::Pipeline;
use crate::error::{GatewayError, Result};
use crate::observability::{Observer, create_observer};
use anyhow::Context;
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Returns true when the bind address is not a loopback address.
pub(super) fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

/// Run the HTTP gateway on `host:port`.
pub async fn run_gateway(host: &str, port: u16, config: Arc<Config>) -> Result<()> {
    if is_public_bind(host) && !config.gateway.allow_public_bind {
        return Err(GatewayError::PublicBind {
            host: host.to_string(),
        }
        .into());
    }

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| GatewayError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    run_gateway_with_listener(host, listener, config).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Arc<Config>,
) -> Result<()> {
    let actual_port = listener
        .local_addr()
        .context("get gateway listener local address")?
        .port();
    let display_addr = format!("{host}:{actual_port}");

    let observer: Arc<dyn Observer> = Arc::from(create_observer(&config.observability));
    let pipeline = Arc::new(Pipeline::new(config.pipeline.clone(), observer));
    let state = AppState { pipeline };

    print_gateway_banner(&display_addr);

    let app = build_app(state, &config.gateway.cors_origins);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve HTTP gateway")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("gateway shutting down");
}

fn print_gateway_banner(display_addr: &str) {
    println!("Gateway listening on {display_addr}");
    println!("  POST /v1/finalize");
    println!("  GET  /health");
}

pub(super) fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    let mut app = Router::new()
        .route("/health", get(handle_health))
        .route("/v1/finalize", post(handle_finalize))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ));

    if !cors_origins.is_empty() {
        let origins: Vec<_> = cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        );
    }

    app
}
