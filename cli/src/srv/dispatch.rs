//! # cmdgate Request Dispatcher
//!
//! File: cli/src/srv/dispatch.rs
//!
//! ## Overview
//!
//! Turns one inbound request (command name + query parameters) into a
//! response. The pipeline is linear:
//!
//! 1. **Lookup**: find the command in the registry. Unknown names end here with 404.
//! 2. **Substitute**: rewrite the private copy of the argument template.
//! 3. **Execute**: run the program and wait for it.
//! 4. **Respond**: wrap exit code and output in a JSON payload, always with 200.
//!
//! The dispatcher holds no per-request state. Its registry and prefix are
//! read-only, so a single instance is shared by every request handler.
//!
use crate::common::process::{self, ExecutionResult};
use crate::core::config::{CommandDefinition, ServerConfig};
use crate::core::registry::CommandRegistry;
use crate::core::substitution::{self, QueryParams};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// JSON payload returned for a registered command.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub exit_code: i32,
    pub output_data: String,
}

impl CommandResponse {
    /// Serializes the payload. Falls back to an empty body if encoding fails.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            error!("Error encoding response to JSON: {}", e);
            String::new()
        })
    }
}

impl From<ExecutionResult> for CommandResponse {
    fn from(result: ExecutionResult) -> Self {
        Self {
            exit_code: result.exit_code,
            output_data: result.output,
        }
    }
}

/// A command definition after substitution, owned by a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub name: String,
    pub path: PathBuf,
    pub args: Vec<String>,
}

impl ResolvedCommand {
    /// Takes ownership of a looked-up copy and substitutes its arguments.
    pub fn resolve(definition: CommandDefinition, query: &QueryParams, prefix: &str) -> Self {
        let CommandDefinition { name, path, mut args } = definition;
        substitution::substitute(&mut args, query, prefix);
        Self { name, path, args }
    }
}

/// Terminal state of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    NotFound,
    Executed(CommandResponse),
}

impl IntoResponse for Dispatch {
    fn into_response(self) -> Response {
        match self {
            // Empty body: the status code alone tells the caller the name is unknown.
            Dispatch::NotFound => StatusCode::NOT_FOUND.into_response(),
            Dispatch::Executed(response) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                response.to_json(),
            )
                .into_response(),
        }
    }
}

/// Shared, read-only request orchestrator.
#[derive(Debug)]
pub struct Dispatcher {
    registry: CommandRegistry,
    prefix: String,
}

impl Dispatcher {
    pub fn new(registry: CommandRegistry, prefix: impl Into<String>) -> Self {
        Self {
            registry,
            prefix: prefix.into(),
        }
    }

    /// Builds the registry from the configured commands.
    pub fn from_config(config: &ServerConfig) -> Self {
        let registry = CommandRegistry::new(config.commands.iter().cloned());
        Self::new(registry, config.general.var_prefix.clone())
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Lookup and substitution, without executing anything.
    pub fn resolve(&self, name: &str, query: &QueryParams) -> Option<ResolvedCommand> {
        let definition = self.registry.lookup(name)?;
        Some(ResolvedCommand::resolve(definition, query, &self.prefix))
    }

    /// # Handle Request (`handle`)
    ///
    /// Runs the full pipeline for one request. A registered command always
    /// yields `Dispatch::Executed`, whatever its exit code.
    pub async fn handle(&self, name: &str, query: &QueryParams) -> Dispatch {
        info!("Received command <{}>", name);

        // Lookup and substitution; an unknown name ends the pipeline here.
        let Some(command) = self.resolve(name, query) else {
            warn!("Command <{}> not found", name);
            return Dispatch::NotFound;
        };

        debug!("Runnable command details: {:?}", command);

        // Execute. Spawn failures come back as a sentinel exit code, never as an error.
        let result = process::run(&command.path, &command.args).await;
        info!(
            "Command <{}> finished with exit code {}",
            command.name, result.exit_code
        );
        Dispatch::Executed(result.into())
    }
}
