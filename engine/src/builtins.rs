//! Built-in converters for primitives, platform entities, and composites.

use std::sync::{Arc, LazyLock};

use chat_command_core::ArgValue;
use regex::Regex;

use crate::context::{Context, EntityQuery};
use crate::convert::{Conversion, ConvertError, Converter, ConverterRegistry, ValueConverter};
use crate::duration::DurationConverter;

static MEMBER_MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<@!?([0-9]+)>$").expect("static regex must compile"));
static CHANNEL_MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<#([0-9]+)>$").expect("static regex must compile"));
static ROLE_MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<@&([0-9]+)>$").expect("static regex must compile"));

/// Registers every built-in converter tag into `registry`.
pub(crate) fn register_builtins(registry: &mut ConverterRegistry) {
    registry.register("str", Converter::Value(Box::new(StrConverter)));
    registry.register("int", Converter::Value(Box::new(IntConverter)));
    registry.register("bool", Converter::Value(Box::new(BoolConverter)));
    registry.register("member", Converter::Value(Box::new(MemberConverter)));
    registry.register("channel", Converter::Value(Box::new(ChannelConverter)));
    registry.register("role", Converter::Value(Box::new(RoleConverter)));
    registry.register("duration", Converter::Stream(Box::new(DurationConverter)));
}

/// Identity converter: the token itself.
pub struct StrConverter;

impl ValueConverter for StrConverter {
    fn name(&self) -> &'static str {
        "str"
    }

    fn convert(&self, _ctx: &Context, argument: &str) -> Result<Conversion, ConvertError> {
        Ok(Conversion::Value(ArgValue::Str(argument.to_string())))
    }
}

/// Whole-number converter.
pub struct IntConverter;

impl ValueConverter for IntConverter {
    fn name(&self) -> &'static str {
        "int"
    }

    fn convert(&self, _ctx: &Context, argument: &str) -> Result<Conversion, ConvertError> {
        argument
            .parse::<i64>()
            .map(|n| Conversion::Value(ArgValue::Int(n)))
            .map_err(|_| ConvertError::bad(format!("\"{argument}\" is not a whole number")))
    }
}

/// Boolean converter accepting the usual spellings.
pub struct BoolConverter;

impl ValueConverter for BoolConverter {
    fn name(&self) -> &'static str {
        "bool"
    }

    fn convert(&self, _ctx: &Context, argument: &str) -> Result<Conversion, ConvertError> {
        match argument.to_lowercase().as_str() {
            "yes" | "y" | "true" | "t" | "1" | "enable" | "enabled" | "on" => {
                Ok(Conversion::Value(ArgValue::Bool(true)))
            }
            "no" | "n" | "false" | "f" | "0" | "disable" | "disabled" | "off" => {
                Ok(Conversion::Value(ArgValue::Bool(false)))
            }
            _ => Err(ConvertError::bad(format!(
                "\"{argument}\" is not a recognised boolean"
            ))),
        }
    }
}

fn entity_query<'a>(mention: &LazyLock<Regex>, argument: &'a str) -> EntityQuery<'a> {
    if let Some(caps) = mention.captures(argument) {
        if let Ok(id) = caps[1].parse::<u64>() {
            return EntityQuery::Id(id);
        }
    }
    if let Ok(id) = argument.parse::<u64>() {
        return EntityQuery::Id(id);
    }
    EntityQuery::Name(argument)
}

/// Member converter: mention syntax (`<@123>`, `<@!123>`), a raw id, or a
/// name, verified against the context's entity directory.
pub struct MemberConverter;

impl ValueConverter for MemberConverter {
    fn name(&self) -> &'static str {
        "member"
    }

    fn convert(&self, ctx: &Context, argument: &str) -> Result<Conversion, ConvertError> {
        let query = entity_query(&MEMBER_MENTION_RE, argument);
        ctx.directory()
            .member(&query)
            .map(|member| Conversion::Value(ArgValue::Member(member.id)))
            .ok_or_else(|| ConvertError::bad(format!("Member \"{argument}\" not found.")))
    }
}

/// Channel converter: mention syntax (`<#123>`), a raw id, or a name.
pub struct ChannelConverter;

impl ValueConverter for ChannelConverter {
    fn name(&self) -> &'static str {
        "channel"
    }

    fn convert(&self, ctx: &Context, argument: &str) -> Result<Conversion, ConvertError> {
        let query = entity_query(&CHANNEL_MENTION_RE, argument);
        ctx.directory()
            .channel(&query)
            .map(|channel| Conversion::Value(ArgValue::Channel(channel.id)))
            .ok_or_else(|| ConvertError::bad(format!("Channel \"{argument}\" not found.")))
    }
}

/// Role converter: mention syntax (`<@&123>`), a raw id, or a name.
pub struct RoleConverter;

impl ValueConverter for RoleConverter {
    fn name(&self) -> &'static str {
        "role"
    }

    fn convert(&self, ctx: &Context, argument: &str) -> Result<Conversion, ConvertError> {
        let query = entity_query(&ROLE_MENTION_RE, argument);
        ctx.directory()
            .role(&query)
            .map(|role| Conversion::Value(ArgValue::Role(role.id)))
            .ok_or_else(|| ConvertError::bad(format!("Role \"{argument}\" not found.")))
    }
}

/// Converter over a fixed set of symbolic names.
///
/// The input is matched case-sensitively against the declared names
/// first, then retried upper-cased. A miss lists the valid choices in
/// the error detail.
///
/// # Examples
///
/// ```
/// use chat_command_engine::ChoiceConverter;
///
/// let colours = ChoiceConverter::new(["RED", "GREEN", "BLUE"]);
/// assert_eq!(colours.choices(), ["RED", "GREEN", "BLUE"]);
/// ```
pub struct ChoiceConverter {
    choices: Vec<String>,
}

impl ChoiceConverter {
    /// Creates a choice converter over the given symbolic names.
    pub fn new<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    /// The declared symbolic names.
    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}

impl ValueConverter for ChoiceConverter {
    fn name(&self) -> &'static str {
        "choice"
    }

    fn convert(&self, _ctx: &Context, argument: &str) -> Result<Conversion, ConvertError> {
        if let Some(exact) = self.choices.iter().find(|c| *c == argument) {
            return Ok(Conversion::Value(ArgValue::Choice(exact.clone())));
        }
        let upper = argument.to_uppercase();
        if let Some(retried) = self.choices.iter().find(|c| **c == upper) {
            return Ok(Conversion::Value(ArgValue::Choice(retried.clone())));
        }
        let valid = self
            .choices
            .iter()
            .map(|c| c.to_lowercase())
            .collect::<Vec<_>>()
            .join(", ");
        Err(ConvertError::bad(format!(
            "Choose one of these options: {valid}"
        )))
    }
}

/// Makes another converter optional.
///
/// Runs the inner converter; on rejection the whole original argument is
/// recalled for the next parameter instead of failing the command, and
/// the parameter falls back to its declared default. An unexpected fault
/// in the inner converter still propagates.
pub struct OptionalConverter {
    inner: Arc<Converter>,
}

impl OptionalConverter {
    /// Wraps an inner converter. The inner converter must be the value
    /// shape; stream converters manage their own consumption and cannot
    /// be retried from a captured argument.
    pub fn new(inner: Arc<Converter>) -> Self {
        Self { inner }
    }
}

impl ValueConverter for OptionalConverter {
    fn name(&self) -> &'static str {
        "optional"
    }

    fn convert(&self, ctx: &Context, argument: &str) -> Result<Conversion, ConvertError> {
        let inner = match &*self.inner {
            Converter::Value(inner) => inner,
            Converter::Stream(inner) => {
                return Err(ConvertError::crash(format!(
                    "optional cannot wrap stream converter {}",
                    inner.name()
                )));
            }
        };
        match inner.convert(ctx, argument) {
            Ok(conversion) => Ok(conversion),
            Err(ConvertError::Bad { .. }) => Ok(Conversion::Recall(argument.to_string())),
            Err(crash @ ConvertError::Crash { .. }) => Err(crash),
        }
    }
}
