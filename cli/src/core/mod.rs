//! # cmdgate Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the components that the request pipeline is built
//! on: configuration, errors, logging, and the two pure stages of command
//! resolution (registry lookup and parameter substitution).
//!
//! ## Architecture
//!
//! - `config`: TOML loading and startup validation
//! - `error`: Error types and exit-code mapping
//! - `logging`: Global `tracing` subscriber setup
//! - `registry`: Read-only name → command table
//! - `substitution`: Query-parameter placeholder rewriting
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{GatewayError, Result}; // For error handling
//! use crate::core::registry::CommandRegistry; // For command lookup
//! ```
//!
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;
pub mod substitution;
