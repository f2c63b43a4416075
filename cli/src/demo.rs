//! The demo world the shell runs against: a small in-memory directory,
//! a stdout responder, and a command set exercising every converter and
//! parameter shape the engine supports.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chat_command_core::{ArgValue, CommandSpec, ParamSpec};
use chat_command_engine::{
    Channel, ChannelKind, ChoiceConverter, CommandBuilder, CommandRegistry, Context, Converter,
    ConverterRegistry, Directory, Dispatcher, EntityQuery, FutureTime, IntConverter, Member,
    OptionalConverter, Permissions, Responder, Role, guild_only, has_permissions, human_delta,
};

/// Fixed entity fixtures backing member/channel/role lookups.
pub struct InMemoryDirectory {
    members: Vec<Member>,
    channels: Vec<Channel>,
    roles: Vec<Role>,
}

impl InMemoryDirectory {
    pub fn seeded() -> Self {
        let mouser = Member::new(100, "mouser")
            .with_permissions(Permissions::KICK_MEMBERS | Permissions::BAN_MEMBERS);
        Self {
            members: vec![mouser, Member::new(101, "dragonfly"), Member::new(102, "sloane")],
            channels: vec![
                Channel::new(200, "general", ChannelKind::Guild),
                Channel::new(201, "staff", ChannelKind::Guild),
            ],
            roles: vec![Role::new(300, "mods")],
        }
    }
}

impl Directory for InMemoryDirectory {
    fn member(&self, query: &EntityQuery<'_>) -> Option<Member> {
        self.members
            .iter()
            .find(|m| match query {
                EntityQuery::Id(id) => m.id == *id,
                EntityQuery::Name(name) => m.name == *name,
            })
            .cloned()
    }

    fn channel(&self, query: &EntityQuery<'_>) -> Option<Channel> {
        self.channels
            .iter()
            .find(|c| match query {
                EntityQuery::Id(id) => c.id == *id,
                EntityQuery::Name(name) => c.name == *name,
            })
            .cloned()
    }

    fn role(&self, query: &EntityQuery<'_>) -> Option<Role> {
        self.roles
            .iter()
            .find(|r| match query {
                EntityQuery::Id(id) => r.id == *id,
                EntityQuery::Name(name) => r.name == *name,
            })
            .cloned()
    }
}

/// Prints responses and the working indicator to stdout.
pub struct ConsoleResponder;

impl Responder for ConsoleResponder {
    fn respond(&mut self, text: &str) {
        println!("<<< {text}");
    }

    fn set_working(&mut self, working: bool) {
        if working {
            println!("[working]");
        }
    }
}

/// Creates the invocation context the shell dispatches under.
///
/// The author is `mouser`, who holds kick and ban permissions, speaking
/// in the `general` guild channel.
pub fn demo_context() -> Context {
    let directory = Arc::new(InMemoryDirectory::seeded());
    let author = directory
        .member(&EntityQuery::Name("mouser"))
        .unwrap_or_else(|| Member::new(100, "mouser"));
    let channel = directory
        .channel(&EntityQuery::Name("general"))
        .unwrap_or_else(|| Channel::new(200, "general", ChannelKind::Guild));
    Context::new(
        author,
        channel,
        directory,
        Arc::new(Mutex::new(ConsoleResponder)) as Arc<Mutex<dyn Responder>>,
    )
}

/// Builds the demo command set and wraps it in a dispatcher.
pub fn build_dispatcher(prefixes: Vec<String>) -> Result<Dispatcher, String> {
    let mut converters = ConverterRegistry::builtin();
    converters.register(
        "severity",
        Converter::Value(Box::new(OptionalConverter::new(Arc::new(Converter::Value(
            Box::new(ChoiceConverter::new(["SOFT", "NORMAL", "HARD"])),
        ))))),
    );
    converters.register(
        "optional-int",
        Converter::Value(Box::new(OptionalConverter::new(Arc::new(Converter::Value(
            Box::new(IntConverter),
        ))))),
    );

    let mut registry = CommandRegistry::new();
    for command in [
        echo_command(&converters)?,
        remind_command(&converters)?,
        ban_command(&converters)?,
        sum_command(&converters)?,
        take_command(&converters)?,
        config_command(&converters)?,
    ] {
        registry
            .register(command)
            .map_err(|e| format!("failed to register demo command: {e}"))?;
    }

    Ok(Dispatcher::new(registry, prefixes))
}

fn echo_command(converters: &ConverterRegistry) -> Result<chat_command_engine::Command, String> {
    CommandBuilder::new(
        CommandSpec::new("echo")
            .with_description("Repeats the given text back.")
            .with_alias("say")
            .with_param(
                ParamSpec::required("text", "str")
                    .consume_rest()
                    .with_description("Text to repeat"),
            ),
    )
    .handler(|ctx, args| {
        ctx.respond(args.get("text").and_then(|v| v.as_str()).unwrap_or(""));
        Ok(())
    })
    .build(converters)
    .map_err(|e| e.to_string())
}

fn remind_command(converters: &ConverterRegistry) -> Result<chat_command_engine::Command, String> {
    CommandBuilder::new(
        CommandSpec::new("remind")
            .with_description("Schedules a reminder after a human-readable delay.")
            .with_working_indicator()
            .with_param(
                ParamSpec::required("when", "duration").with_description("Delay, e.g. 2h30m"),
            )
            .with_param(
                ParamSpec::required("text", "str")
                    .consume_rest()
                    .with_description("What to be reminded about"),
            ),
    )
    .handler(|ctx, args| {
        let seconds = args.get("when").and_then(|v| v.as_duration()).unwrap_or(0);
        let text = args.get("text").and_then(|v| v.as_str()).unwrap_or("");
        let due = FutureTime::after(seconds);
        ctx.respond(&format!(
            "Reminding you in {} (at {}): {text}",
            human_delta(seconds, true),
            due.date.format("%Y-%m-%d %H:%M UTC"),
        ));
        Ok(())
    })
    .build(converters)
    .map_err(|e| e.to_string())
}

fn ban_command(converters: &ConverterRegistry) -> Result<chat_command_engine::Command, String> {
    CommandBuilder::new(
        CommandSpec::new("ban")
            .with_description("Bans a member, with an optional severity and reason.")
            .with_param(
                ParamSpec::required("target", "member").with_description("Member to ban"),
            )
            .with_param(
                ParamSpec::optional("severity", "severity", ArgValue::Choice("NORMAL".into()))
                    .with_description("One of soft, normal, hard"),
            )
            .with_param(
                ParamSpec::optional("reason", "str", ArgValue::Str("no reason given".into()))
                    .consume_rest()
                    .with_description("Audit log reason"),
            ),
    )
    .with_check(guild_only())
    .with_check(has_permissions(Permissions::BAN_MEMBERS))
    .handler(|ctx, args| {
        let target = args.get("target").and_then(|v| v.as_member()).unwrap_or(0);
        let severity = args.get("severity").and_then(|v| v.as_choice()).unwrap_or("NORMAL");
        let reason = args.get("reason").and_then(|v| v.as_str()).unwrap_or("");
        let name = ctx
            .directory()
            .member(&EntityQuery::Id(target))
            .map(|m| m.name)
            .unwrap_or_else(|| target.to_string());
        ctx.respond(&format!("Banned {name} ({}): {reason}", severity.to_lowercase()));
        Ok(())
    })
    .build(converters)
    .map_err(|e| e.to_string())
}

fn sum_command(converters: &ConverterRegistry) -> Result<chat_command_engine::Command, String> {
    CommandBuilder::new(
        CommandSpec::new("sum")
            .with_description("Adds up the given integers.")
            .with_param(
                ParamSpec::required("values", "int")
                    .variadic()
                    .with_description("Integers to add"),
            ),
    )
    .handler(|ctx, args| {
        let total: i64 = args.get_all("values").iter().filter_map(|v| v.as_int()).sum();
        ctx.respond(&total.to_string());
        Ok(())
    })
    .build(converters)
    .map_err(|e| e.to_string())
}

fn take_command(converters: &ConverterRegistry) -> Result<chat_command_engine::Command, String> {
    CommandBuilder::new(
        CommandSpec::new("take")
            .with_description("Takes the first N words of the given text.")
            .with_param(
                ParamSpec::optional("count", "optional-int", ArgValue::Str("1".into()))
                    .with_description("How many words to take"),
            )
            .with_param(
                ParamSpec::required("text", "str")
                    .consume_rest()
                    .with_description("Text to take words from"),
            ),
    )
    .handler(|ctx, args| {
        let count = args
            .get("count")
            .and_then(|v| match v {
                ArgValue::Int(n) => Some(*n),
                ArgValue::Str(s) => s.parse().ok(),
                _ => None,
            })
            .unwrap_or(1)
            .max(0) as usize;
        let text = args.get("text").and_then(|v| v.as_str()).unwrap_or("");
        let taken: Vec<&str> = text.split_whitespace().take(count).collect();
        ctx.respond(&taken.join(" "));
        Ok(())
    })
    .build(converters)
    .map_err(|e| e.to_string())
}

fn config_command(converters: &ConverterRegistry) -> Result<chat_command_engine::Command, String> {
    let store: Arc<Mutex<HashMap<String, String>>> = Arc::new(Mutex::new(HashMap::new()));

    let get_store = Arc::clone(&store);
    let get = CommandBuilder::new(
        CommandSpec::new("get")
            .with_description("Shows a configuration value.")
            .with_param(ParamSpec::required("key", "str").with_description("Setting name")),
    )
    .handler(move |ctx, args| {
        let key = args.get("key").and_then(|v| v.as_str()).unwrap_or("");
        let value = get_store
            .lock()
            .ok()
            .and_then(|s| s.get(key).cloned())
            .unwrap_or_else(|| "(unset)".to_string());
        ctx.respond(&format!("{key} = {value}"));
        Ok(())
    });

    let set_store = Arc::clone(&store);
    let set = CommandBuilder::new(
        CommandSpec::new("set")
            .with_description("Updates a configuration value.")
            .with_param(ParamSpec::required("key", "str").with_description("Setting name"))
            .with_param(
                ParamSpec::required("value", "str")
                    .consume_rest()
                    .with_description("New value"),
            ),
    )
    .handler(move |ctx, args| {
        let key = args.get("key").and_then(|v| v.as_str()).unwrap_or("");
        let value = args.get("value").and_then(|v| v.as_str()).unwrap_or("");
        if let Ok(mut s) = set_store.lock() {
            s.insert(key.to_string(), value.to_string());
        }
        ctx.ok();
        Ok(())
    });

    CommandBuilder::new(
        CommandSpec::new("config")
            .with_description("Reads and writes shell configuration values.")
            .with_alias("cfg"),
    )
    .with_subcommand(get)
    .with_subcommand(set)
    .build(converters)
    .map_err(|e| e.to_string())
}
