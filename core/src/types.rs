//! Signature type definitions for chat command modeling.
//!
//! This module defines the data model used to describe a command's formal
//! parameter list. The types are designed for serialization with [`serde`]
//! and are constructed once at command registration time, then shared
//! read-only across every invocation of that command.

use serde::{Deserialize, Serialize};

/// A resolved argument value.
///
/// Converters produce values from this closed set; command bodies receive
/// them through the bound argument list. Defaults declared on a parameter
/// are also expressed as an `ArgValue` and bound verbatim when the
/// parameter receives no usable input.
///
/// # Examples
///
/// ```
/// use chat_command_core::ArgValue;
///
/// let value = ArgValue::Int(42);
/// assert_eq!(value.as_int(), Some(42));
/// assert_eq!(value.as_str(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArgValue {
    /// Plain text.
    Str(String),
    /// Signed integer.
    Int(i64),
    /// Boolean.
    Bool(bool),
    /// Identifier of a known member.
    Member(u64),
    /// Identifier of a known channel.
    Channel(u64),
    /// Identifier of a known role.
    Role(u64),
    /// Time span in whole seconds.
    Duration(u64),
    /// Symbolic name selected from a fixed choice set.
    Choice(String),
}

impl ArgValue {
    /// Returns the text if this is a [`Str`](ArgValue::Str) value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an [`Int`](ArgValue::Int) value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean if this is a [`Bool`](ArgValue::Bool) value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the member id if this is a [`Member`](ArgValue::Member) value.
    pub fn as_member(&self) -> Option<u64> {
        match self {
            ArgValue::Member(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the channel id if this is a [`Channel`](ArgValue::Channel) value.
    pub fn as_channel(&self) -> Option<u64> {
        match self {
            ArgValue::Channel(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the role id if this is a [`Role`](ArgValue::Role) value.
    pub fn as_role(&self) -> Option<u64> {
        match self {
            ArgValue::Role(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the span in seconds if this is a [`Duration`](ArgValue::Duration) value.
    pub fn as_duration(&self) -> Option<u64> {
        match self {
            ArgValue::Duration(secs) => Some(*secs),
            _ => None,
        }
    }

    /// Returns the selected name if this is a [`Choice`](ArgValue::Choice) value.
    pub fn as_choice(&self) -> Option<&str> {
        match self {
            ArgValue::Choice(name) => Some(name),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArgValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgValue::Str(s) => f.write_str(s),
            ArgValue::Int(n) => write!(f, "{n}"),
            ArgValue::Bool(b) => write!(f, "{b}"),
            ArgValue::Member(id) => write!(f, "<@{id}>"),
            ArgValue::Channel(id) => write!(f, "<#{id}>"),
            ArgValue::Role(id) => write!(f, "<@&{id}>"),
            ArgValue::Duration(secs) => write!(f, "{secs}s"),
            ArgValue::Choice(name) => f.write_str(name),
        }
    }
}

/// Positional kind of a parameter.
///
/// Determines how the resolver pulls raw input from the token stream for
/// this parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ParamKind {
    /// One word (or one quoted phrase) per invocation — the default.
    #[default]
    Positional,
    /// Repeat the converter until the stream is exhausted or a conversion
    /// is rejected, collecting zero or more values. Must be declared last.
    Variadic,
    /// Capture all remaining text verbatim as a single raw argument.
    /// Must be declared last.
    ConsumeRest,
}

/// Static metadata for one formal parameter.
///
/// Built once at registration from the command's declared signature and
/// immutable afterwards. The `tag` names the converter to use; it is
/// resolved against the converter registry when the command is registered,
/// never per invocation.
///
/// # Examples
///
/// ```
/// use chat_command_core::{ArgValue, ParamKind, ParamSpec};
///
/// let member = ParamSpec::required("target", "member");
/// assert!(member.is_required());
///
/// let reason = ParamSpec::optional("reason", "str", ArgValue::Str("no reason".into()))
///     .consume_rest();
/// assert!(!reason.is_required());
/// assert_eq!(reason.kind, ParamKind::ConsumeRest);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name, unique within a command.
    pub name: String,
    /// Converter type tag (e.g. "int", "member", "duration").
    pub tag: String,
    /// Positional kind.
    #[serde(default)]
    pub kind: ParamKind,
    /// Default value bound when the parameter receives no usable input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ArgValue>,
    /// Short description for help output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParamSpec {
    /// Creates a required positional parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use chat_command_core::ParamSpec;
    ///
    /// let param = ParamSpec::required("count", "int");
    /// assert!(param.is_required());
    /// assert_eq!(param.tag, "int");
    /// ```
    pub fn required(name: &str, tag: &str) -> Self {
        Self {
            name: name.to_string(),
            tag: tag.to_string(),
            kind: ParamKind::Positional,
            default: None,
            description: None,
        }
    }

    /// Creates an optional positional parameter with a default value.
    ///
    /// # Examples
    ///
    /// ```
    /// use chat_command_core::{ArgValue, ParamSpec};
    ///
    /// let param = ParamSpec::optional("count", "int", ArgValue::Int(10));
    /// assert!(!param.is_required());
    /// assert_eq!(param.default, Some(ArgValue::Int(10)));
    /// ```
    pub fn optional(name: &str, tag: &str, default: ArgValue) -> Self {
        Self {
            name: name.to_string(),
            tag: tag.to_string(),
            kind: ParamKind::Positional,
            default: Some(default),
            description: None,
        }
    }

    /// Marks the parameter as variadic.
    pub fn variadic(mut self) -> Self {
        self.kind = ParamKind::Variadic;
        self
    }

    /// Marks the parameter as consuming all remaining text.
    pub fn consume_rest(mut self) -> Self {
        self.kind = ParamKind::ConsumeRest;
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Whether resolution must fail when no input is left for this
    /// parameter.
    ///
    /// Derived from the absence of a default; variadic parameters are never
    /// required because zero collected values is a valid outcome.
    pub fn is_required(&self) -> bool {
        self.default.is_none() && self.kind != ParamKind::Variadic
    }
}

/// Declared signature and behavior flags for a command.
///
/// Parameters are resolved strictly in declaration order. Subcommands are
/// owned by their parent; a child refers back to its parent by name only,
/// through the registry, never by reference.
///
/// # Examples
///
/// ```
/// use chat_command_core::*;
///
/// let spec = CommandSpec::new("ban")
///     .with_description("Ban a member")
///     .with_alias("b")
///     .with_param(ParamSpec::required("target", "member"))
///     .with_param(
///         ParamSpec::optional("reason", "str", ArgValue::Str("no reason given".into()))
///             .consume_rest(),
///     );
///
/// assert_eq!(spec.name, "ban");
/// assert!(spec.matches("b"));
/// assert_eq!(spec.params.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Canonical command name.
    pub name: String,
    /// Short description for help output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Alternative names this command answers to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Formal parameters in declaration order.
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    /// When false, trailing unconsumed input fails resolution.
    #[serde(default = "default_true")]
    pub ignore_extra: bool,
    /// Whether the invoker shows a working indicator while the body runs.
    #[serde(default)]
    pub show_working: bool,
    /// Owned subcommands (e.g. `config get`, `config set`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandSpec>,
}

fn default_true() -> bool {
    true
}

impl CommandSpec {
    /// Creates a new command signature with the given canonical name.
    ///
    /// # Examples
    ///
    /// ```
    /// use chat_command_core::CommandSpec;
    ///
    /// let spec = CommandSpec::new("remind");
    /// assert_eq!(spec.name, "remind");
    /// assert!(spec.ignore_extra);
    /// assert!(!spec.show_working);
    /// ```
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ignore_extra: true,
            ..Default::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Adds an alias.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Appends a parameter to the signature.
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Adds an owned subcommand.
    pub fn with_subcommand(mut self, sub: CommandSpec) -> Self {
        self.subcommands.push(sub);
        self
    }

    /// Rejects trailing unconsumed input after the last parameter.
    pub fn strict_extra(mut self) -> Self {
        self.ignore_extra = false;
        self
    }

    /// Shows a working indicator for the duration of the command body.
    pub fn with_working_indicator(mut self) -> Self {
        self.show_working = true;
        self
    }

    /// Checks whether `name` is this command's canonical name or an alias.
    ///
    /// # Examples
    ///
    /// ```
    /// use chat_command_core::CommandSpec;
    ///
    /// let spec = CommandSpec::new("purge").with_alias("clean");
    /// assert!(spec.matches("purge"));
    /// assert!(spec.matches("clean"));
    /// assert!(!spec.matches("clear"));
    /// ```
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    /// Finds a subcommand by name or alias.
    ///
    /// # Examples
    ///
    /// ```
    /// use chat_command_core::CommandSpec;
    ///
    /// let spec = CommandSpec::new("config")
    ///     .with_subcommand(CommandSpec::new("get"))
    ///     .with_subcommand(CommandSpec::new("set"));
    ///
    /// assert!(spec.find_subcommand("set").is_some());
    /// assert!(spec.find_subcommand("delete").is_none());
    /// ```
    pub fn find_subcommand(&self, name: &str) -> Option<&CommandSpec> {
        self.subcommands.iter().find(|s| s.matches(name))
    }

    /// Gets all subcommand names.
    pub fn subcommand_names(&self) -> Vec<&str> {
        self.subcommands.iter().map(|s| s.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_required_derived_from_default() {
        let required = ParamSpec::required("target", "member");
        assert!(required.is_required());

        let optional = ParamSpec::optional("count", "int", ArgValue::Int(10));
        assert!(!optional.is_required());
    }

    #[test]
    fn test_variadic_param_is_never_required() {
        let param = ParamSpec::required("values", "int").variadic();
        assert!(!param.is_required());
    }

    #[test]
    fn test_command_spec_matches_aliases() {
        let spec = CommandSpec::new("purge").with_alias("clean").with_alias("c");

        assert!(spec.matches("purge"));
        assert!(spec.matches("clean"));
        assert!(spec.matches("c"));
        assert!(!spec.matches("prune"));
    }

    #[test]
    fn test_command_spec_find_subcommand_by_alias() {
        let spec = CommandSpec::new("config")
            .with_subcommand(CommandSpec::new("get").with_alias("show"));

        assert!(spec.find_subcommand("show").is_some());
        assert!(spec.find_subcommand("set").is_none());
    }

    #[test]
    fn test_command_spec_serde_round_trip() {
        let spec = CommandSpec::new("remind")
            .with_description("Set a reminder")
            .with_param(ParamSpec::required("when", "duration"))
            .with_param(
                ParamSpec::optional("text", "str", ArgValue::Str("something".into()))
                    .consume_rest(),
            )
            .strict_extra();

        let json = serde_json::to_string(&spec).unwrap();
        let back: CommandSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}
