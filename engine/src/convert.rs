//! The converter protocol and the tag-keyed converter registry.
//!
//! A converter turns raw text (or direct stream access) into an
//! [`ArgValue`] for one parameter. Its result is a tagged
//! [`Conversion`]: a plain value, a recall of unconsumed text for the next
//! parameter, or both. Converters never signal rejection through the
//! recall mechanism — rejection is a typed [`ConvertError`].
//!
//! Converters are registered under a string tag and resolved once, at
//! command registration time, from the tag each parameter declares.

use std::collections::HashMap;
use std::sync::Arc;

use chat_command_core::ArgValue;
use thiserror::Error;

use crate::context::Context;
use crate::stream::TokenStream;

/// Outcome of a successful conversion.
///
/// `Recall` and `ValueAndRecall` carry unconsumed text that the resolver
/// pushes back onto the stream so the *next* declared parameter re-reads
/// it. The recalled text is always a trailing part of the text the
/// converter was given.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    /// The input produced a value.
    Value(ArgValue),
    /// The converter could not use the input (or used none of it); the
    /// whole text should be reused by the next parameter.
    Recall(String),
    /// Part of the input produced a value; the leftover should be reused
    /// by the next parameter.
    ValueAndRecall(ArgValue, String),
}

/// Conversion failure.
///
/// `Bad` is the normal "user typed something unusable" rejection. `Crash`
/// marks an unexpected fault inside a converter and is surfaced to the
/// operational log rather than treated as a user mistake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The converter rejected its input.
    #[error("{detail}")]
    Bad { detail: String },
    /// The converter failed in a way that is not a user mistake.
    #[error("converter fault: {detail}")]
    Crash { detail: String },
}

impl ConvertError {
    /// Creates a rejection with the given user-facing detail.
    pub fn bad(detail: impl Into<String>) -> Self {
        Self::Bad {
            detail: detail.into(),
        }
    }

    /// Creates an unexpected-fault error.
    pub fn crash(detail: impl Into<String>) -> Self {
        Self::Crash {
            detail: detail.into(),
        }
    }
}

/// A converter that receives one pre-extracted token.
///
/// Under a `Bad` rejection the stream has not moved past the token, so
/// the resolver can fall back to a default without leaving partial
/// consumption behind.
pub trait ValueConverter: Send + Sync {
    /// Converter name used in error payloads.
    fn name(&self) -> &'static str;

    fn convert(&self, ctx: &Context, argument: &str) -> Result<Conversion, ConvertError>;
}

/// A converter that receives the live token stream.
///
/// Stream converters manage their own advancement, which lets them
/// consume a variable number of words. A converter that rejects its input
/// must restore the cursor to where it started before returning `Bad`.
pub trait StreamConverter: Send + Sync {
    /// Converter name used in error payloads.
    fn name(&self) -> &'static str;

    fn convert(
        &self,
        ctx: &Context,
        stream: &mut TokenStream<'_>,
    ) -> Result<Conversion, ConvertError>;
}

/// The two converter shapes behind one dispatch point.
pub enum Converter {
    Value(Box<dyn ValueConverter>),
    Stream(Box<dyn StreamConverter>),
}

impl Converter {
    /// Converter name used in error payloads.
    pub fn name(&self) -> &'static str {
        match self {
            Converter::Value(c) => c.name(),
            Converter::Stream(c) => c.name(),
        }
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Converter::Value(c) => write!(f, "Converter::Value({})", c.name()),
            Converter::Stream(c) => write!(f, "Converter::Stream({})", c.name()),
        }
    }
}

/// Converters keyed by the type tag parameters declare.
///
/// Tags are resolved when a command is built, never per invocation.
///
/// # Examples
///
/// ```
/// use chat_command_engine::ConverterRegistry;
///
/// let registry = ConverterRegistry::builtin();
/// assert!(registry.resolve("int").is_some());
/// assert!(registry.resolve("no-such-tag").is_none());
/// ```
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<Converter>>,
}

impl ConverterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Creates a registry pre-populated with the built-in tags:
    /// `str`, `int`, `bool`, `member`, `channel`, `role`, `duration`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        crate::builtins::register_builtins(&mut registry);
        registry
    }

    /// Registers a converter under `tag`, replacing any previous one.
    pub fn register(&mut self, tag: &str, converter: Converter) {
        self.converters.insert(tag.to_string(), Arc::new(converter));
    }

    /// Looks up the converter registered under `tag`.
    pub fn resolve(&self, tag: &str) -> Option<Arc<Converter>> {
        self.converters.get(tag).cloned()
    }

    /// All registered tags, unordered.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.converters.keys().map(String::as_str)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
