//! # cmdgate Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads the gateway configuration from a TOML file, expands
//! paths, and validates it before the server starts. The resulting
//! `ServerConfig` is read-only for the remainder of the process lifetime
//! and is shared by reference with the request dispatcher.
//!
//! ## Architecture
//!
//! The file has three sections, each mapped onto a struct:
//! - `[General]`: log file location and the variable prefix used by substitution
//! - `[Network]`: listen address and port
//! - `[[Command]]`: one entry per exposed command (name, executable path, argument template)
//!
//! Loading happens in two steps, each with its own exit code on failure:
//! 1. `load_config` reads, parses and checks the file itself.
//! 2. `validate_commands` checks that every declared executable exists.
//!
//! ## Examples
//!
//! ```toml
//! [General]
//! Logfile = "/var/log/cmdgate.log"
//! Var_Prefix = "$"
//!
//! [Network]
//! Address = "127.0.0.1"
//! Port = 8080
//!
//! [[Command]]
//! Name = "echo"
//! Path = "/bin/echo"
//! Args = ["hello", "$name"]
//! ```
//!
use crate::core::error::{GatewayError, Result};
use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::collections::HashSet;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the whole configuration file.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(rename = "General", default)]
    pub general: GeneralConfig,
    #[serde(rename = "Network", default)]
    pub network: NetworkConfig,
    #[serde(rename = "Command", default)]
    pub commands: Vec<CommandDefinition>,
}

/// `[General]` section.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// File receiving the log output. Logs go to stderr when unset.
    #[serde(rename = "Logfile", default)]
    pub logfile: Option<PathBuf>,
    /// Marks argument tokens eligible for query-parameter substitution.
    #[serde(rename = "Var_Prefix", default = "default_var_prefix")]
    pub var_prefix: String,
}

/// `[Network]` section.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Host name or IP address to bind. Empty means all interfaces.
    #[serde(rename = "Address", default = "default_address")]
    pub address: String,
    #[serde(rename = "Port", default = "default_port")]
    pub port: u16,
}

/// A named, executable command as declared in a `[[Command]]` table.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CommandDefinition {
    /// Identifier used as the HTTP path segment.
    #[serde(rename = "Name")]
    pub name: String,
    /// Executable to spawn.
    #[serde(rename = "Path")]
    pub path: PathBuf,
    /// Argument template passed after the program name. May contain prefixed placeholders.
    #[serde(rename = "Args", default)]
    pub args: Vec<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            logfile: None,
            var_prefix: default_var_prefix(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

impl NetworkConfig {
    /// `address:port` string handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        let host = if self.address.is_empty() {
            "0.0.0.0"
        } else {
            self.address.as_str()
        };
        format!("{}:{}", host, self.port)
    }
}

fn default_var_prefix() -> String {
    "$".to_string()
}
fn default_address() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}

/// # Load Configuration (`load_config`)
///
/// Reads the TOML file at `path`, expands `~` in paths and checks the
/// file-level invariants (unique command names, non-empty names).
///
/// ## Errors
///
/// Every failure is tagged `GatewayError::Config`, so the caller exits with
/// the configuration-load status code.
pub fn load_config(path: &Path) -> Result<ServerConfig> {
    info!("Loading configuration from: {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| {
        anyhow!(GatewayError::Config(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        )))
    })?;
    let mut config = parse_config(&content)
        .with_context(|| format!("Invalid configuration file: {}", path.display()))?;
    expand_config_paths(&mut config);
    validate_config(&config)?;
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

/// Parses configuration text without touching the filesystem.
pub fn parse_config(content: &str) -> Result<ServerConfig> {
    toml::from_str(content)
        .map_err(|e| anyhow!(GatewayError::Config(format!("Failed to parse TOML: {}", e))))
}

fn expand_config_paths(config: &mut ServerConfig) {
    if let Some(logfile) = &config.general.logfile {
        let expanded = shellexpand::tilde(&logfile.to_string_lossy()).into_owned();
        config.general.logfile = Some(PathBuf::from(expanded));
    }
    for command in &mut config.commands {
        let expanded = shellexpand::tilde(&command.path.to_string_lossy()).into_owned();
        debug!("Expanded path for command '{}': {}", command.name, expanded);
        command.path = PathBuf::from(expanded);
    }
}

fn validate_config(config: &ServerConfig) -> Result<()> {
    if config.general.var_prefix.is_empty() {
        warn!("Var_Prefix is empty: every argument token is eligible for substitution.");
    }

    // Names are the HTTP lookup key, so each must be present and unique.
    let mut seen = HashSet::new();
    for command in &config.commands {
        if command.name.is_empty() {
            return Err(anyhow!(GatewayError::Config(format!(
                "Command with path '{}' has an empty name.",
                command.path.display()
            ))));
        }
        if !seen.insert(command.name.as_str()) {
            return Err(anyhow!(GatewayError::Config(format!(
                "Command name '{}' is declared more than once.",
                command.name
            ))));
        }
    }
    Ok(())
}

/// # Validate Command Executables (`validate_commands`)
///
/// Checks that every declared `Path` exists and, on Unix, is a regular file
/// with at least one execute bit set. The first offending command aborts
/// startup.
pub fn validate_commands(config: &ServerConfig) -> Result<()> {
    for command in &config.commands {
        // Missing path (or unreadable parent directory).
        let metadata = fs::metadata(&command.path).map_err(|_| {
            anyhow!(GatewayError::CommandNotFound {
                name: command.name.clone(),
                path: command.path.clone(),
            })
        })?;
        // Exists, but a directory or a file without any execute bit.
        if !is_executable(&metadata) {
            return Err(anyhow!(GatewayError::CommandNotExecutable {
                name: command.name.clone(),
                path: command.path.clone(),
            }));
        }
        debug!(
            "Command '{}' -> {} {:?}",
            command.name,
            command.path.display(),
            command.args
        );
    }
    info!("All {} command executables found.", config.commands.len());
    Ok(())
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(metadata: &fs::Metadata) -> bool {
    metadata.is_file()
}
