//! Runtime commands: validated signatures with resolved converters,
//! check predicates, and the command body.
//!
//! A [`CommandBuilder`] turns a declared [`CommandSpec`] into a runnable
//! [`Command`]: the signature is validated, each parameter's converter
//! tag is resolved against the registry exactly once, and subcommand
//! builders are assembled into an owned tree.

use chat_command_core::{CommandSpec, ValidationError, validate_command};
use thiserror::Error;

use crate::checks::{Check, CheckError};
use crate::context::Context;
use crate::convert::ConverterRegistry;
use crate::resolve::{BoundArguments, BoundParam};

/// A fault raised by a command body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The body could not complete.
    #[error("{0}")]
    Failed(String),
}

/// Why an invocation aborted after successful resolution.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// A check predicate vetoed the invocation.
    #[error(transparent)]
    Check(#[from] CheckError),
    /// A group was invoked without a usable subcommand and has no body of
    /// its own.
    #[error("No subcommand used! See \"{command}\" for a list of available commands!")]
    NoSubcommand { command: String },
    /// The command body failed.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Why a command could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The declared signature violates a structural invariant.
    #[error("invalid command signature: {0}")]
    InvalidSignature(#[from] ValidationError),
    /// A parameter declares a tag no converter is registered under.
    #[error("unknown converter tag: {0}")]
    UnknownConverter(String),
}

/// The command body.
pub type Handler = Box<dyn Fn(&Context, &BoundArguments) -> Result<(), CommandError> + Send + Sync>;

/// A registered, runnable command.
///
/// Owns its subcommands; children refer back to the parent by name only,
/// through the registry.
pub struct Command {
    spec: CommandSpec,
    params: Vec<BoundParam>,
    checks: Vec<Check>,
    handler: Option<Handler>,
    subcommands: Vec<Command>,
}

impl Command {
    /// The declared signature, including assembled subcommand signatures.
    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    /// Canonical name.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Checks the canonical name and aliases.
    pub fn matches(&self, name: &str) -> bool {
        self.spec.matches(name)
    }

    /// The parameters with their converters resolved.
    pub fn params(&self) -> &[BoundParam] {
        &self.params
    }

    /// Whether trailing unconsumed input is tolerated.
    pub fn ignore_extra(&self) -> bool {
        self.spec.ignore_extra
    }

    /// Finds an owned subcommand by name or alias.
    pub fn find_subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands.iter().find(|c| c.matches(name))
    }

    /// Runs the checks and, if all pass, the command body.
    ///
    /// Checks run in registration order; the first failure aborts with
    /// its specific error and the body never executes. The working
    /// indicator only turns on after the checks pass and is cleared on
    /// success and failure alike. Exactly one body execution happens per
    /// successful resolution.
    pub fn invoke(&self, ctx: &Context, args: &BoundArguments) -> Result<(), InvokeError> {
        for check in &self.checks {
            check(ctx)?;
        }

        let handler = self.handler.as_ref().ok_or_else(|| InvokeError::NoSubcommand {
            command: self.spec.name.clone(),
        })?;

        let _guard = self.spec.show_working.then(|| ctx.working_guard());
        handler(ctx, args)?;
        Ok(())
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("spec", &self.spec)
            .field("checks", &self.checks.len())
            .field("has_handler", &self.handler.is_some())
            .field("subcommands", &self.subcommands)
            .finish()
    }
}

/// Builder for a [`Command`] and its subcommand tree.
///
/// Subcommands are declared as nested builders, not on the spec; the
/// assembled signature (used for validation and introspection) is
/// completed during [`build`](CommandBuilder::build).
///
/// # Examples
///
/// ```
/// use chat_command_core::{CommandSpec, ParamSpec};
/// use chat_command_engine::{CommandBuilder, ConverterRegistry};
///
/// let registry = ConverterRegistry::builtin();
/// let command = CommandBuilder::new(
///     CommandSpec::new("echo").with_param(ParamSpec::required("text", "str").consume_rest()),
/// )
/// .handler(|ctx, args| {
///     ctx.respond(args.get("text").and_then(|v| v.as_str()).unwrap_or(""));
///     Ok(())
/// })
/// .build(&registry)
/// .unwrap();
///
/// assert_eq!(command.name(), "echo");
/// ```
pub struct CommandBuilder {
    spec: CommandSpec,
    checks: Vec<Check>,
    handler: Option<Handler>,
    children: Vec<CommandBuilder>,
}

impl CommandBuilder {
    /// Starts a builder from a declared signature.
    pub fn new(spec: CommandSpec) -> Self {
        Self {
            spec,
            checks: Vec::new(),
            handler: None,
            children: Vec::new(),
        }
    }

    /// Appends a check predicate. Checks run in the order added.
    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// Sets the command body.
    pub fn handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context, &BoundArguments) -> Result<(), CommandError> + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(f));
        self
    }

    /// Adds a subcommand.
    pub fn with_subcommand(mut self, child: CommandBuilder) -> Self {
        self.children.push(child);
        self
    }

    /// Validates the signature, resolves converter tags, and assembles
    /// the command tree.
    pub fn build(self, registry: &ConverterRegistry) -> Result<Command, BuildError> {
        let command = self.assemble(registry)?;
        if let Some(error) = validate_command(command.spec()).into_iter().next() {
            return Err(BuildError::InvalidSignature(error));
        }
        Ok(command)
    }

    fn assemble(self, registry: &ConverterRegistry) -> Result<Command, BuildError> {
        let mut spec = self.spec;

        let params = spec
            .params
            .iter()
            .map(|param| {
                registry
                    .resolve(&param.tag)
                    .map(|converter| BoundParam {
                        spec: param.clone(),
                        converter,
                    })
                    .ok_or_else(|| BuildError::UnknownConverter(param.tag.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut subcommands = Vec::new();
        for child in self.children {
            let child = child.assemble(registry)?;
            spec.subcommands.push(child.spec.clone());
            subcommands.push(child);
        }

        Ok(Command {
            spec,
            params,
            checks: self.checks,
            handler: self.handler,
            subcommands,
        })
    }
}
