//! # cmdgate HTTP Server Implementation
//!
//! File: cli/src/srv/server_logic.rs
//!
//! ## Overview
//!
//! This module implements the HTTP side of the gateway: the Axum router with
//! its single `GET /{command}` route, request tracing, and the serve loop with
//! graceful shutdown.
//!
//! ## Architecture
//!
//! 1. Build the router around a shared `Dispatcher`
//! 2. Bind a `TcpListener` to the configured `Address:Port`
//! 3. Serve until Ctrl+C or SIGTERM
//!
//! Every request is logged with the caller's address, taken from the
//! `ConnectInfo` the listener attaches to each connection.
//!
//! Each request's dispatch runs in its own spawned task. If the client
//! disconnects, the handler future is dropped but the spawned task (and the
//! child process it waits on) runs to completion.
//!
use super::dispatch::{Dispatch, Dispatcher};
use crate::core::error::{GatewayError, Result};
use crate::core::substitution::QueryParams;
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::{rejection::PathRejection, ConnectInfo, Path, Query, State},
    http::{Extensions, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{error, info, info_span, warn, Level};

/// # Run HTTP Server (`run_server`)
///
/// Binds `bind_address` and serves the gateway until a shutdown signal.
///
/// ## Errors
///
/// Bind and serve failures are tagged `GatewayError::Server`.
pub async fn run_server(dispatcher: Arc<Dispatcher>, bind_address: &str) -> Result<()> {
    let listener = TcpListener::bind(bind_address).await.map_err(|e| {
        anyhow!(GatewayError::Server(format!(
            "Failed to bind TCP listener to address {}: {}",
            bind_address, e
        )))
    })?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| anyhow!(GatewayError::Server(e.to_string())))?;
    info!(
        "Listening on {} with {} command(s)",
        local_addr,
        dispatcher.registry().len()
    );

    let app = create_app(dispatcher);
    // Attach the peer address to every request so handlers and spans can log it.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| anyhow!(GatewayError::Server(format!("HTTP server failed: {}", e))))?;

    info!("Server shutdown complete.");
    Ok(())
}

/// # Create Axum Application (`create_app`)
///
/// Router with the command route and request tracing.
pub fn create_app(dispatcher: Arc<Dispatcher>) -> Router {
    // One span per request carrying method, URI, headers and the caller's address.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                headers = ?request.headers(),
                ip = %peer_address(request.extensions()),
            )
        })
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/{command}", get(command_handler))
        .layer(trace_layer)
        .with_state(dispatcher)
}

/// Caller address recorded by `into_make_service_with_connect_info`,
/// or `"unknown"` when the request did not come through a listener.
pub fn peer_address(extensions: &Extensions) -> String {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn command_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    extensions: Extensions,
    command: std::result::Result<Path<String>, PathRejection>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let peer = peer_address(&extensions);

    // A segment that does not decode to UTF-8 cannot name a registered command.
    let command = match command {
        Ok(Path(command)) => command,
        Err(rejection) => {
            warn!("Undecodable command name from <{}>: {}", peer, rejection);
            return Dispatch::NotFound.into_response();
        }
    };
    info!("Request from <{}> for command <{}>", peer, command);

    let query = QueryParams::from_pairs(pairs);

    // Run in a separate task so a client disconnect does not cancel the child.
    let task = tokio::spawn(async move { dispatcher.handle(&command, &query).await });
    match task.await {
        Ok(outcome) => outcome.into_response(),
        Err(e) => {
            error!("Dispatch task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown..."),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
            Err(e) => {
                error!(
                    "Failed to install SIGTERM handler: {}. Shutdown on SIGTERM might not work.",
                    e
                );
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
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CommandDefinition;
    use crate::core::error::{exit_code_for, EXIT_SERVER};
    use crate::core::registry::CommandRegistry;
    use axum::body::to_bytes;
    use axum::http::header;
    use std::path::PathBuf;
    use tower::ServiceExt; // for `oneshot`

    fn app() -> Router {
        let registry = CommandRegistry::new([
            CommandDefinition {
                name: "echo".into(),
                path: PathBuf::from("/bin/echo"),
                args: vec!["hello".into(), "$name".into()],
            },
            CommandDefinition {
                name: "fail".into(),
                path: PathBuf::from("/bin/sh"),
                args: vec!["-c".into(), "echo oops; exit 2".into()],
            },
        ]);
        create_app(Arc::new(Dispatcher::new(registry, "$")))
    }

    async fn send_get(uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_echo_with_query() {
        let (status, content_type, body) = send_get("/echo?name=world").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(body, r#"{"exit_code":0,"output_data":"hello world\n"}"#);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_echo_without_query_passes_template() {
        let (status, _, body) = send_get("/echo").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"exit_code":0,"output_data":"hello $name\n"}"#);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_repeated_key_uses_first_value() {
        let (_, _, body) = send_get("/echo?name=first&name=second").await;
        assert_eq!(body, r#"{"exit_code":0,"output_data":"hello first\n"}"#);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_percent_encoded_value() {
        let (_, _, body) = send_get("/echo?name=big%20world").await;
        assert_eq!(body, r#"{"exit_code":0,"output_data":"hello big world\n"}"#);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_returns_ok() {
        let (status, _, body) = send_get("/fail").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"exit_code":2,"output_data":"oops\n"}"#);
    }

    #[tokio::test]
    async fn test_unknown_command_is_404_with_empty_body() {
        let (status, _, body) = send_get("/unknown").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_command_name_is_404() {
        let (status, _, body) = send_get("/%FF").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_empty());
    }

    #[test]
    fn test_peer_address_from_connect_info() {
        let mut extensions = Extensions::new();
        assert_eq!(peer_address(&extensions), "unknown");

        let addr: SocketAddr = "192.0.2.7:40123".parse().unwrap();
        extensions.insert(ConnectInfo(addr));
        assert_eq!(peer_address(&extensions), "192.0.2.7:40123");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_request_with_connect_info() {
        let addr: SocketAddr = "192.0.2.7:40123".parse().unwrap();
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/echo?name=peer")
                    .extension(ConnectInfo(addr))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            &body[..],
            br#"{"exit_code":0,"output_data":"hello peer\n"}"#
        );
    }

    #[tokio::test]
    async fn test_post_not_allowed() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_run_server_bind_failure() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = occupied.local_addr().unwrap().to_string();
        let dispatcher = Arc::new(Dispatcher::new(CommandRegistry::default(), "$"));

        let err = run_server(dispatcher, &address).await.unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_SERVER);
    }

    /// Ensures the shutdown future can be created without panicking.
    #[tokio::test]
    async fn test_shutdown_signal_creation() {
        let shutdown_future = shutdown_signal();
        drop(shutdown_future);
    }
}
