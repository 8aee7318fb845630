//! # cmdgate Command Server
//!
//! File: cli/src/srv/mod.rs
//!
//! ## Overview
//!
//! This module exposes the configured commands over HTTP. A request
//! `GET /{command}?key=value` runs the named command and answers with its
//! exit code and standard output as JSON.
//!
//! ## Architecture
//!
//! - `dispatch.rs`: Lookup → substitution → execution → response pipeline
//! - `server_logic.rs`: Axum router, listener binding and graceful shutdown
//!
//! The main `handle_srv` function is the entry point once the configuration
//! has been loaded and validated.
//!
use crate::core::config::ServerConfig;
use crate::core::error::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Request pipeline shared by all handlers.
pub mod dispatch;

/// Axum-based HTTP server implementation.
pub mod server_logic;

/// # Handle Server (`handle_srv`)
///
/// Builds the dispatcher from `config` and serves until shutdown.
pub async fn handle_srv(config: &ServerConfig) -> Result<()> {
    let dispatcher = Arc::new(dispatch::Dispatcher::from_config(config));
    if dispatcher.registry().is_empty() {
        warn!("No [[Command]] entries declared; every request will answer 404.");
    }
    info!(
        "Serving commands: {}",
        dispatcher.registry().names().join(", ")
    );
    server_logic::run_server(dispatcher, &config.network.bind_address()).await
}
