//! The command registry.
//!
//! Commands are nodes owned by the registry, keyed by canonical name,
//! with a separate alias index. Subcommand relationships are ownership
//! from parent to children; nothing holds a back-pointer.

use std::collections::HashMap;

use chat_command_core::CommandSpec;
use thiserror::Error;

use crate::command::Command;

/// Why a command could not be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The canonical name collides with an existing name or alias.
    #[error("command name already registered: {0}")]
    DuplicateName(String),
    /// An alias collides with an existing name or alias.
    #[error("alias already registered: {0}")]
    DuplicateAlias(String),
}

/// Top-level commands keyed by canonical name, with alias lookup.
///
/// # Examples
///
/// ```
/// use chat_command_core::CommandSpec;
/// use chat_command_engine::{CommandBuilder, CommandRegistry, ConverterRegistry};
///
/// let converters = ConverterRegistry::builtin();
/// let mut registry = CommandRegistry::new();
/// let ping = CommandBuilder::new(CommandSpec::new("ping").with_alias("p"))
///     .handler(|ctx, _| {
///         ctx.respond("pong");
///         Ok(())
///     })
///     .build(&converters)
///     .unwrap();
///
/// registry.register(ping).unwrap();
/// assert!(registry.get("ping").is_some());
/// assert!(registry.get("p").is_some());
/// ```
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
    aliases: HashMap<String, String>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a top-level command, rejecting name and alias
    /// collisions.
    pub fn register(&mut self, command: Command) -> Result<(), RegistryError> {
        let name = command.name().to_string();
        if self.known(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        for alias in &command.spec().aliases {
            if self.known(alias) {
                return Err(RegistryError::DuplicateAlias(alias.clone()));
            }
        }

        for alias in &command.spec().aliases {
            self.aliases.insert(alias.clone(), name.clone());
        }
        self.commands.insert(name, command);
        Ok(())
    }

    fn known(&self, name: &str) -> bool {
        self.commands.contains_key(name) || self.aliases.contains_key(name)
    }

    /// Looks up a command by canonical name or alias.
    pub fn get(&self, name: &str) -> Option<&Command> {
        if let Some(command) = self.commands.get(name) {
            return Some(command);
        }
        let canonical = self.aliases.get(name)?;
        self.commands.get(canonical)
    }

    /// All registered commands, unordered.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    /// Declared signatures of every registered command, sorted by name.
    /// Used for help and introspection output.
    pub fn specs(&self) -> Vec<&CommandSpec> {
        let mut specs: Vec<&CommandSpec> = self.commands.values().map(|c| c.spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }
}
