//! Command signature validation.
//!
//! Validates structural invariants of command signatures at registration
//! time, catching errors such as misplaced consume-rest parameters,
//! duplicate parameter names, and subcommand name cycles before any
//! invocation can observe them.
//!
//! # Examples
//!
//! ```
//! use chat_command_core::*;
//!
//! let spec = CommandSpec::new("ban")
//!     .with_param(ParamSpec::required("target", "member"))
//!     .with_param(ParamSpec::required("reason", "str").consume_rest());
//! assert!(validate_command(&spec).is_empty());
//!
//! // Invalid: consume-rest is not the last parameter
//! let bad = CommandSpec::new("ban")
//!     .with_param(ParamSpec::required("reason", "str").consume_rest())
//!     .with_param(ParamSpec::required("target", "member"));
//! assert!(!validate_command(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{CommandSpec, ParamKind, ParamSpec};

/// Signature validation errors.
///
/// Each variant describes a specific structural problem found during
/// validation. The `Display` impl provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// Parameter name is empty or whitespace-only.
    #[error("parameter name cannot be empty in command: {0}")]
    EmptyParamName(String),
    /// Two parameters in the same command share a name.
    #[error("duplicate parameter name: {0}")]
    DuplicateParam(String),
    /// A consume-rest parameter is followed by further parameters.
    #[error("consume-rest parameter must be declared last: {0}")]
    ConsumeRestNotLast(String),
    /// A variadic parameter is followed by further parameters.
    #[error("variadic parameter must be declared last: {0}")]
    VariadicNotLast(String),
    /// A variadic parameter declares a default value.
    #[error("variadic parameter cannot declare a default: {0}")]
    VariadicWithDefault(String),
    /// Two subcommands in the same scope share a name or alias.
    #[error("duplicate subcommand in scope: {0}")]
    DuplicateSubcommand(String),
    /// A subcommand path reuses an ancestor name (e.g. `config get config`).
    #[error("subcommand cycle detected at path: {0}")]
    SubcommandCycle(String),
}

/// Validates a command signature and its subcommand tree.
///
/// Checks parameter naming and placement invariants, then walks the
/// subcommand tree for duplicates and name cycles. Returns the first
/// problem found, or an empty vector when the signature is valid.
///
/// Note that an optional parameter is allowed to precede a required one:
/// optional-in-the-middle arguments are resolved through the recall
/// mechanism, not forbidden by the signature.
///
/// # Examples
///
/// ```
/// use chat_command_core::*;
///
/// // Optional before required is fine.
/// let spec = CommandSpec::new("remind")
///     .with_param(ParamSpec::optional("when", "duration", ArgValue::Duration(600)))
///     .with_param(ParamSpec::required("text", "str").consume_rest());
/// assert!(validate_command(&spec).is_empty());
///
/// // Subcommand cycle: config → get → config
/// let mut get = CommandSpec::new("get");
/// get.subcommands.push(CommandSpec::new("config"));
/// let spec = CommandSpec::new("config").with_subcommand(get);
/// let errors = validate_command(&spec);
/// assert!(errors.iter().any(|e| matches!(e, ValidationError::SubcommandCycle(_))));
/// ```
pub fn validate_command(spec: &CommandSpec) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if spec.name.trim().is_empty() {
        errors.push(ValidationError::EmptyCommandName);
        return errors;
    }

    errors.extend(validate_params(&spec.name, &spec.params));
    if !errors.is_empty() {
        return errors;
    }

    let mut path = vec![spec.name.clone()];
    errors.extend(validate_subcommands(&spec.subcommands, &mut path));

    errors
}

fn validate_params(command: &str, params: &[ParamSpec]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let last = params.len().saturating_sub(1);

    for (index, param) in params.iter().enumerate() {
        let name = param.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyParamName(command.to_string()));
            return errors;
        }

        if !seen.insert(name) {
            errors.push(ValidationError::DuplicateParam(name.to_string()));
            return errors;
        }

        match param.kind {
            ParamKind::ConsumeRest if index != last => {
                errors.push(ValidationError::ConsumeRestNotLast(name.to_string()));
                return errors;
            }
            ParamKind::Variadic if index != last => {
                errors.push(ValidationError::VariadicNotLast(name.to_string()));
                return errors;
            }
            ParamKind::Variadic if param.default.is_some() => {
                errors.push(ValidationError::VariadicWithDefault(name.to_string()));
                return errors;
            }
            _ => {}
        }
    }

    errors
}

fn validate_subcommands(
    subcommands: &[CommandSpec],
    path: &mut Vec<String>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for sub in subcommands {
        let name = sub.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyCommandName);
            return errors;
        }

        for known in std::iter::once(name).chain(sub.aliases.iter().map(|a| a.as_str())) {
            if !seen.insert(known) {
                errors.push(ValidationError::DuplicateSubcommand(known.to_string()));
                return errors;
            }
        }

        if path.iter().any(|segment| segment == name) {
            let cycle_path = path
                .iter()
                .cloned()
                .chain(std::iter::once(name.to_string()))
                .collect::<Vec<_>>()
                .join(" ");
            errors.push(ValidationError::SubcommandCycle(cycle_path));
            return errors;
        }

        errors.extend(validate_params(name, &sub.params));
        if !errors.is_empty() {
            return errors;
        }

        path.push(name.to_string());
        errors.extend(validate_subcommands(&sub.subcommands, path));
        path.pop();
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use crate::ArgValue;

    use super::*;

    #[test]
    fn test_validate_rejects_consume_rest_not_last() {
        let spec = CommandSpec::new("echo")
            .with_param(ParamSpec::required("text", "str").consume_rest())
            .with_param(ParamSpec::required("count", "int"));

        let errors = validate_command(&spec);
        assert_eq!(
            errors,
            vec![ValidationError::ConsumeRestNotLast("text".to_string())]
        );
    }

    #[test]
    fn test_validate_rejects_variadic_not_last() {
        let spec = CommandSpec::new("sum")
            .with_param(ParamSpec::required("values", "int").variadic())
            .with_param(ParamSpec::required("label", "str"));

        let errors = validate_command(&spec);
        assert_eq!(
            errors,
            vec![ValidationError::VariadicNotLast("values".to_string())]
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_params() {
        let spec = CommandSpec::new("move")
            .with_param(ParamSpec::required("channel", "channel"))
            .with_param(ParamSpec::required("channel", "channel"));

        let errors = validate_command(&spec);
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateParam("channel".to_string())]
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_subcommand_alias() {
        let spec = CommandSpec::new("config")
            .with_subcommand(CommandSpec::new("get"))
            .with_subcommand(CommandSpec::new("fetch").with_alias("get"));

        let errors = validate_command(&spec);
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateSubcommand("get".to_string())]
        );
    }

    #[test]
    fn test_validate_rejects_subcommand_cycle() {
        let mut get = CommandSpec::new("get");
        get.subcommands.push(CommandSpec::new("config"));
        let spec = CommandSpec::new("config").with_subcommand(get);

        let errors = validate_command(&spec);
        assert_eq!(
            errors,
            vec![ValidationError::SubcommandCycle(
                "config get config".to_string()
            )]
        );
    }

    #[test]
    fn test_validate_accepts_optional_before_required() {
        let spec = CommandSpec::new("remind")
            .with_param(ParamSpec::optional(
                "when",
                "duration",
                ArgValue::Duration(600),
            ))
            .with_param(ParamSpec::required("text", "str").consume_rest());

        assert!(validate_command(&spec).is_empty());
    }
}
