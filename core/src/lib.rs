//! Core signature types and validation for chat commands.
//!
//! This crate defines the foundational types for modeling text-command
//! signatures:
//!
//! - [`CommandSpec`] — a command's declared signature (parameters, aliases,
//!   behavior flags, owned subcommands).
//! - [`ParamSpec`] — one formal parameter: name, converter tag, positional
//!   kind, and optional default.
//! - [`ParamKind`] — positional, variadic, or consume-rest.
//! - [`ArgValue`] — the closed set of values converters can produce.
//!
//! Validation ([`validate_command`]) catches structural errors such as
//! misplaced consume-rest or variadic parameters, duplicate names, and
//! subcommand cycles at registration time.
//!
//! # Example
//!
//! ```
//! use chat_command_core::*;
//!
//! let spec = CommandSpec::new("remind")
//!     .with_description("Set a reminder")
//!     .with_param(ParamSpec::required("when", "duration"))
//!     .with_param(
//!         ParamSpec::optional("text", "str", ArgValue::Str("something".into()))
//!             .consume_rest(),
//!     );
//!
//! assert!(validate_command(&spec).is_empty());
//! assert!(spec.params[0].is_required());
//! ```

mod types;
mod validate;

pub use types::{ArgValue, CommandSpec, ParamKind, ParamSpec};
pub use validate::{ValidationError, validate_command};
