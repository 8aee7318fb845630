//! # Command Registry
//!
//! File: cli/src/core/registry.rs
//!
//! In-memory table of the configured commands, keyed by name. The registry
//! is built once at startup and never modified afterwards, so any number of
//! requests may read it concurrently without locking. Lookups hand out owned
//! copies: callers mutate their copy, never the stored template.
//!
//! Name uniqueness is checked when the configuration is loaded
//! (`config::load_config`); the registry itself does not re-check it.
//!
use crate::core::config::CommandDefinition;
use std::collections::HashMap;

/// Immutable name → definition table.
#[derive(Debug, Default, Clone)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandDefinition>,
}

impl CommandRegistry {
    /// Builds the registry. Should a name appear twice, the first definition is kept.
    pub fn new(definitions: impl IntoIterator<Item = CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        for definition in definitions {
            // First declaration wins, like a top-down scan of the file would.
            commands
                .entry(definition.name.clone())
                .or_insert(definition);
        }
        Self { commands }
    }

    /// # Look Up Command (`lookup`)
    ///
    /// Returns a deep copy of the definition named `name`, or `None` when no
    /// such command is registered. The returned argument list is independent
    /// of the registry's template.
    pub fn lookup(&self, name: &str) -> Option<CommandDefinition> {
        self.commands.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
