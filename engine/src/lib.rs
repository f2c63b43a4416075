//! Argument parsing and invocation engine for chat commands.
//!
//! This crate turns a raw invocation string and a registered command's
//! declared signature into a fully bound argument list, then runs the
//! command through its check predicates:
//!
//! - [`TokenStream`] — cursor over the unparsed text, with quoting rules
//!   and byte-exact rewinding.
//! - [`Converter`] / [`ConverterRegistry`] — the pluggable conversion
//!   protocol; converters return a tagged [`Conversion`] that can hand
//!   unconsumed text back to the next parameter (the recall mechanism).
//! - [`resolve_arguments`] — the per-parameter state machine: defaults,
//!   recall rewinds, variadic collection, consume-rest capture.
//! - [`Command`] / [`CommandBuilder`] / [`CommandRegistry`] — runnable
//!   commands with checks, a working-indicator wrap, and owned
//!   subcommand trees.
//! - [`Dispatcher`] — prefix matching and end-to-end message processing.
//!
//! # Example
//!
//! ```
//! use chat_command_core::{ArgValue, CommandSpec, ParamSpec};
//! use chat_command_engine::*;
//!
//! let converters = ConverterRegistry::builtin();
//! let remind = CommandBuilder::new(
//!     CommandSpec::new("remind")
//!         .with_param(ParamSpec::required("when", "duration"))
//!         .with_param(
//!             ParamSpec::optional("text", "str", ArgValue::Str("something".into()))
//!                 .consume_rest(),
//!         ),
//! )
//! .handler(|ctx, args| {
//!     let seconds = args.get("when").and_then(|v| v.as_duration()).unwrap_or(0);
//!     ctx.respond(&format!("reminding you in {}", human_delta(seconds, true)));
//!     Ok(())
//! })
//! .build(&converters)
//! .unwrap();
//!
//! assert_eq!(remind.name(), "remind");
//! ```

pub mod builtins;
pub mod checks;
pub mod command;
pub mod context;
pub mod convert;
pub mod dispatch;
pub mod duration;
pub mod registry;
pub mod resolve;
pub mod stream;

pub use builtins::{
    BoolConverter, ChannelConverter, ChoiceConverter, IntConverter, MemberConverter,
    OptionalConverter, RoleConverter, StrConverter,
};
pub use checks::{
    Check, CheckError, admin_only, bot_has_permissions, guild_only, has_permissions, owner_only,
};
pub use command::{BuildError, Command, CommandBuilder, CommandError, Handler, InvokeError};
pub use context::{
    Channel, ChannelKind, Context, Directory, EntityQuery, Member, Permissions, Responder, Role,
    WorkingGuard,
};
pub use convert::{Conversion, ConvertError, Converter, ConverterRegistry, StreamConverter,
    ValueConverter};
pub use dispatch::{DispatchError, Dispatcher};
pub use duration::{DurationConverter, FutureTime, human_delta, parse_human_time};
pub use registry::{CommandRegistry, RegistryError};
pub use resolve::{BoundArguments, BoundParam, ResolveError, resolve_arguments};
pub use stream::TokenStream;

#[cfg(test)]
pub(crate) mod testutil {
    //! Shared fixtures for unit tests.

    use std::sync::{Arc, Mutex};

    use crate::context::{
        Channel, ChannelKind, Context, Directory, EntityQuery, Member, Permissions, Responder,
        Role,
    };

    /// Fixed directory: member 100 "fafhrd", channel 200 "general",
    /// role 300 "mods".
    pub struct FixtureDirectory;

    impl Directory for FixtureDirectory {
        fn member(&self, query: &EntityQuery<'_>) -> Option<Member> {
            match query {
                EntityQuery::Id(100) | EntityQuery::Name("fafhrd") => Some(
                    Member::new(100, "fafhrd").with_permissions(Permissions::ADD_REACTIONS),
                ),
                _ => None,
            }
        }

        fn channel(&self, query: &EntityQuery<'_>) -> Option<Channel> {
            match query {
                EntityQuery::Id(200) | EntityQuery::Name("general") => {
                    Some(Channel::new(200, "general", ChannelKind::Guild))
                }
                _ => None,
            }
        }

        fn role(&self, query: &EntityQuery<'_>) -> Option<Role> {
            match query {
                EntityQuery::Id(300) | EntityQuery::Name("mods") => Some(Role::new(300, "mods")),
                _ => None,
            }
        }
    }

    /// Responder that records everything it is asked to do.
    #[derive(Default)]
    pub struct RecordingResponder {
        pub sent: Vec<String>,
        pub working: Vec<bool>,
    }

    impl Responder for RecordingResponder {
        fn respond(&mut self, text: &str) {
            self.sent.push(text.to_string());
        }

        fn set_working(&mut self, working: bool) {
            self.working.push(working);
        }
    }

    /// A guild-channel context with a recording responder attached.
    pub fn recording_context() -> (Context, Arc<Mutex<RecordingResponder>>) {
        let responder = Arc::new(Mutex::new(RecordingResponder::default()));
        let ctx = Context::new(
            Member::new(1, "author"),
            Channel::new(200, "general", ChannelKind::Guild),
            Arc::new(FixtureDirectory),
            Arc::clone(&responder) as Arc<Mutex<dyn Responder>>,
        );
        (ctx, responder)
    }

    /// A guild-channel context.
    pub fn fixture_context() -> Context {
        recording_context().0
    }

    /// A direct-message context.
    pub fn direct_context() -> Context {
        let (mut ctx, _) = recording_context();
        ctx.channel = Channel::new(2, "dm", ChannelKind::Direct);
        ctx
    }
}
