//! # Parameter Substitution
//!
//! File: cli/src/core/substitution.rs
//!
//! Rewrites an argument template with values taken from the request's query
//! string. A token is a placeholder when it starts with the configured
//! prefix; the rest of the token is the query key to look up.
//!
//! ```text
//! prefix "$", template ["hello", "$name"], query name=world&name=moon
//!   -> ["hello", "world"]
//! ```
//!
//! Only the first value of a repeated key is used. Placeholders with no
//! matching key are left as they are, prefix included.
//!
use std::collections::HashMap;
use tracing::debug;

/// Multi-valued query parameters, values kept in arrival order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    values: HashMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups decoded `key=value` pairs by key.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.insert(key, value);
        }
        params
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// First value supplied for `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// # Substitute Placeholders (`substitute`)
///
/// Rewrites `args` in place. The slice length and token order never change.
pub fn substitute(args: &mut [String], query: &QueryParams, prefix: &str) {
    // Nothing to substitute from.
    if query.is_empty() {
        return;
    }

    for arg in args.iter_mut() {
        // Tokens without the prefix are plain arguments.
        let Some(key) = arg.strip_prefix(prefix) else {
            continue;
        };
        // Unknown keys leave the placeholder as written.
        if let Some(value) = query.first(key) {
            debug!("Substituting argument '{}' with '{}'", arg, value);
            *arg = value.to_string();
        }
    }
}
