//! End-to-end dispatch: prefix matching, command lookup, resolution,
//! invocation.
//!
//! The dispatcher is the layer that turns a raw message into one command
//! invocation. It never formats end-user prose itself; callers translate
//! the structured [`DispatchError`] payload into whatever the surface
//! shows users.

use thiserror::Error;

use crate::command::{Command, InvokeError};
use crate::context::Context;
use crate::registry::CommandRegistry;
use crate::resolve::{ResolveError, resolve_arguments};
use crate::stream::TokenStream;

/// Why a message did not result in a completed command body.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The message does not start with a configured prefix; not a
    /// command at all.
    #[error("message does not start with a known prefix")]
    NoPrefix,
    /// The prefix matched but no command answers to the given name.
    #[error("command not found: {0}")]
    CommandNotFound(String),
    /// Argument resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// A check vetoed the invocation or the body failed.
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

/// Routes raw messages to registered commands.
pub struct Dispatcher {
    registry: CommandRegistry,
    prefixes: Vec<String>,
}

impl Dispatcher {
    /// Creates a dispatcher over a registry and the accepted prefixes.
    ///
    /// Prefixes are sorted longest-first so that the longest match wins
    /// (e.g. `!!` before `!`).
    pub fn new(registry: CommandRegistry, mut prefixes: Vec<String>) -> Self {
        prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self { registry, prefixes }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Processes one raw message.
    ///
    /// Strips the prefix, looks up the command (alias-aware), descends
    /// into subcommands as long as the next word names one, resolves the
    /// remaining text against the matched command's signature, and
    /// invokes it. The context's `prefix` and `command` fields are filled
    /// in before resolution starts.
    pub fn dispatch(&self, ctx: &mut Context, message: &str) -> Result<(), DispatchError> {
        let (prefix, content) = self.split_prefix(message).ok_or(DispatchError::NoPrefix)?;

        let mut stream = TokenStream::new(content);
        stream.skip_whitespace();
        let word = stream.read_word();
        if word.is_empty() {
            return Err(DispatchError::NoPrefix);
        }

        let mut command = self
            .registry
            .get(&word)
            .ok_or_else(|| DispatchError::CommandNotFound(word.to_string()))?;
        let mut qualified = command.name().to_string();

        // Descend while the next word names a subcommand.
        loop {
            let checkpoint = stream.offset();
            stream.skip_whitespace();
            let next = stream.read_word();
            match command.find_subcommand(&next) {
                Some(child) => {
                    command = child;
                    qualified.push(' ');
                    qualified.push_str(child.name());
                }
                None => {
                    stream.rewind(stream.offset() - checkpoint);
                    break;
                }
            }
        }

        ctx.prefix = prefix.to_string();
        ctx.command = qualified.clone();
        tracing::debug!(command = %qualified, author = ctx.author.id, "dispatching command");

        let args = resolve_arguments(
            ctx,
            &qualified,
            command.params(),
            command.ignore_extra(),
            &mut stream,
        )?;
        command.invoke(ctx, &args)?;
        Ok(())
    }

    /// Looks up the command a message would invoke, without resolving or
    /// invoking it.
    pub fn find_command(&self, message: &str) -> Option<&Command> {
        let (_, content) = self.split_prefix(message)?;
        let mut stream = TokenStream::new(content);
        stream.skip_whitespace();
        let word = stream.read_word();
        self.registry.get(&word)
    }

    fn split_prefix<'m>(&self, message: &'m str) -> Option<(&str, &'m str)> {
        self.prefixes
            .iter()
            .find(|p| message.starts_with(p.as_str()))
            .map(|p| (p.as_str(), &message[p.len()..]))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chat_command_core::{ArgValue, CommandSpec, ParamSpec};

    use super::*;
    use crate::command::CommandBuilder;
    use crate::convert::ConverterRegistry;
    use crate::testutil::fixture_context;

    fn dispatcher() -> (Dispatcher, Arc<AtomicUsize>) {
        let converters = ConverterRegistry::builtin();
        let calls = Arc::new(AtomicUsize::new(0));

        let echo_calls = Arc::clone(&calls);
        let echo = CommandBuilder::new(
            CommandSpec::new("echo")
                .with_alias("say")
                .with_param(ParamSpec::required("text", "str").consume_rest()),
        )
        .handler(move |_, args| {
            assert!(args.get("text").is_some());
            echo_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .build(&converters)
        .unwrap();

        let get_calls = Arc::clone(&calls);
        let config = CommandBuilder::new(CommandSpec::new("config"))
            .with_subcommand(
                CommandBuilder::new(
                    CommandSpec::new("get").with_param(ParamSpec::required("key", "str")),
                )
                .handler(move |_, args| {
                    assert_eq!(args.get("key"), Some(&ArgValue::Str("prefix".to_string())));
                    get_calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .build(&converters)
            .unwrap();

        let mut registry = CommandRegistry::new();
        registry.register(echo).unwrap();
        registry.register(config).unwrap();

        (
            Dispatcher::new(registry, vec!["!".to_string(), "!!".to_string()]),
            calls,
        )
    }

    #[test]
    fn test_dispatch_invokes_matched_command() {
        let (dispatcher, calls) = dispatcher();
        let mut ctx = fixture_context();

        dispatcher.dispatch(&mut ctx, "!echo hello world").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.command, "echo");
        assert_eq!(ctx.prefix, "!");
    }

    #[test]
    fn test_dispatch_resolves_aliases() {
        let (dispatcher, calls) = dispatcher();
        let mut ctx = fixture_context();

        dispatcher.dispatch(&mut ctx, "!say hello").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.command, "echo");
    }

    #[test]
    fn test_dispatch_descends_into_subcommands() {
        let (dispatcher, calls) = dispatcher();
        let mut ctx = fixture_context();

        dispatcher.dispatch(&mut ctx, "!config get prefix").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.command, "config get");
    }

    #[test]
    fn test_dispatch_group_without_subcommand_errors() {
        let (dispatcher, _) = dispatcher();
        let mut ctx = fixture_context();

        let err = dispatcher.dispatch(&mut ctx, "!config").unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Invoke(InvokeError::NoSubcommand { .. })
        ));
    }

    #[test]
    fn test_dispatch_ignores_unprefixed_messages() {
        let (dispatcher, _) = dispatcher();
        let mut ctx = fixture_context();

        let err = dispatcher.dispatch(&mut ctx, "hello there").unwrap_err();
        assert!(matches!(err, DispatchError::NoPrefix));
    }

    #[test]
    fn test_dispatch_reports_unknown_commands() {
        let (dispatcher, _) = dispatcher();
        let mut ctx = fixture_context();

        let err = dispatcher.dispatch(&mut ctx, "!frobnicate").unwrap_err();
        match err {
            DispatchError::CommandNotFound(name) => assert_eq!(name, "frobnicate"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_longest_prefix_wins() {
        let converters = ConverterRegistry::builtin();
        let bang = CommandBuilder::new(CommandSpec::new("bang"))
            .handler(|_, _| Ok(()))
            .build(&converters)
            .unwrap();
        let mut registry = CommandRegistry::new();
        registry.register(bang).unwrap();

        let dispatcher = Dispatcher::new(registry, vec!["!".to_string(), "!!".to_string()]);
        let mut ctx = fixture_context();

        // "!!bang" must match the "!!" prefix, not "!" + command "!bang".
        dispatcher.dispatch(&mut ctx, "!!bang").unwrap();
    }
}
