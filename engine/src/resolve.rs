//! Argument resolution: walking a parameter list against the token stream.
//!
//! The resolver visits the declared parameters strictly in order, pulls
//! raw input from the stream per parameter kind, dispatches to the
//! parameter's converter, and applies the defaulting and recall rules.
//! The first failure aborts the whole resolution; no partial binding is
//! ever exposed to a command body.

use std::sync::Arc;

use chat_command_core::{ArgValue, ParamKind, ParamSpec};
use thiserror::Error;
use tracing::warn;

use crate::context::Context;
use crate::convert::{Conversion, ConvertError, Converter};
use crate::stream::TokenStream;

/// A parameter with its converter resolved from the registry.
///
/// Built at command registration; immutable and shared across every
/// invocation of the command.
#[derive(Debug, Clone)]
pub struct BoundParam {
    pub spec: ParamSpec,
    pub converter: Arc<Converter>,
}

/// Why a resolution failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The stream was exhausted (or the input fully recalled) where a
    /// value was mandatory.
    #[error("missing required argument: {parameter}")]
    MissingRequiredArgument { parameter: String },
    /// A converter rejected its input.
    #[error("bad argument for \"{parameter}\" ({converter}): {detail}")]
    BadArgument {
        parameter: String,
        converter: String,
        detail: String,
    },
    /// Trailing unconsumed input with extras disallowed.
    #[error("too many arguments passed to {command}")]
    TooManyArguments { command: String },
    /// A converter failed unexpectedly; an operational error, not a user
    /// mistake.
    #[error("converter {converter} failed unexpectedly for \"{parameter}\": {detail}")]
    ConversionCrash {
        parameter: String,
        converter: String,
        detail: String,
    },
}

/// The fully bound argument list, one entry per resolved parameter.
///
/// Variadic parameters expand to repeated entries under the same name.
///
/// # Examples
///
/// ```
/// use chat_command_core::ArgValue;
/// use chat_command_engine::BoundArguments;
///
/// let mut args = BoundArguments::new();
/// args.push("values", ArgValue::Int(1));
/// args.push("values", ArgValue::Int(2));
///
/// assert_eq!(args.get("values"), Some(&ArgValue::Int(1)));
/// assert_eq!(args.get_all("values").len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    entries: Vec<(String, ArgValue)>,
}

impl BoundArguments {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bound value.
    pub fn push(&mut self, name: &str, value: ArgValue) {
        self.entries.push((name.to_string(), value));
    }

    /// The first value bound under `name`.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Every value bound under `name`, in binding order.
    pub fn get_all(&self, name: &str) -> Vec<&ArgValue> {
        self.entries
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v)
            .collect()
    }

    /// Number of bound entries (variadic values count individually).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, value)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// Resolves the ordered parameter list against the stream.
///
/// `command` names the invoked command in the
/// [`TooManyArguments`](ResolveError::TooManyArguments) payload.
pub fn resolve_arguments(
    ctx: &Context,
    command: &str,
    params: &[BoundParam],
    ignore_extra: bool,
    stream: &mut TokenStream<'_>,
) -> Result<BoundArguments, ResolveError> {
    let mut args = BoundArguments::new();

    for param in params {
        match param.spec.kind {
            ParamKind::Variadic => collect_variadic(ctx, param, stream, &mut args)?,
            ParamKind::Positional | ParamKind::ConsumeRest => {
                let value = transform(ctx, param, stream)?;
                args.push(&param.spec.name, value);
            }
        }
    }

    if !ignore_extra {
        stream.skip_whitespace();
        if !stream.at_end() {
            return Err(ResolveError::TooManyArguments {
                command: command.to_string(),
            });
        }
    }

    Ok(args)
}

/// Resolves one positional or consume-rest parameter.
fn transform(
    ctx: &Context,
    param: &BoundParam,
    stream: &mut TokenStream<'_>,
) -> Result<ArgValue, ResolveError> {
    stream.skip_whitespace();

    if stream.at_end() {
        return default_or_missing(param);
    }

    let conversion = run_converter(ctx, param, stream)?;

    match conversion {
        Conversion::Value(value) => Ok(value),
        Conversion::Recall(text) => {
            // The parameter received no usable value.
            if param.spec.is_required() {
                return Err(ResolveError::MissingRequiredArgument {
                    parameter: param.spec.name.clone(),
                });
            }
            stream.rewind(text.len());
            default_or_missing(param)
        }
        Conversion::ValueAndRecall(value, text) => {
            stream.rewind(text.len());
            Ok(value)
        }
    }
}

/// Collects zero or more values for a variadic parameter.
///
/// A rejected conversion stops collection without failing the command:
/// the token that produced the rejection is rewound so downstream
/// processing sees it unconsumed. An unexpected converter fault still
/// aborts.
fn collect_variadic(
    ctx: &Context,
    param: &BoundParam,
    stream: &mut TokenStream<'_>,
    args: &mut BoundArguments,
) -> Result<(), ResolveError> {
    loop {
        stream.skip_whitespace();
        if stream.at_end() {
            return Ok(());
        }

        let before = stream.offset();
        let outcome = match &*param.converter {
            Converter::Stream(converter) => converter.convert(ctx, stream),
            Converter::Value(converter) => {
                let word = stream.read_word();
                converter.convert(ctx, &word)
            }
        };

        match outcome {
            Ok(Conversion::Value(value)) => args.push(&param.spec.name, value),
            Ok(Conversion::ValueAndRecall(value, text)) => {
                args.push(&param.spec.name, value);
                stream.rewind(text.len());
            }
            Ok(Conversion::Recall(text)) => {
                stream.rewind(text.len());
                return Ok(());
            }
            Err(ConvertError::Bad { .. }) => {
                stream.rewind(stream.offset() - before);
                return Ok(());
            }
            Err(ConvertError::Crash { detail }) => {
                return Err(crash(param, detail));
            }
        }
    }
}

fn run_converter(
    ctx: &Context,
    param: &BoundParam,
    stream: &mut TokenStream<'_>,
) -> Result<Conversion, ResolveError> {
    let outcome = match &*param.converter {
        Converter::Stream(converter) => converter.convert(ctx, stream),
        Converter::Value(converter) => {
            if param.spec.kind == ParamKind::ConsumeRest {
                // Leading whitespace is already skipped; drop the trailing
                // run and move the cursor back over it so any recalled text
                // stays byte-aligned with the stream.
                let rest = stream.read_rest();
                let trimmed = rest.trim_end();
                stream.rewind(rest.len() - trimmed.len());
                converter.convert(ctx, trimmed)
            } else {
                let word = stream.read_word();
                converter.convert(ctx, &word)
            }
        }
    };

    outcome.map_err(|err| match err {
        ConvertError::Bad { detail } => ResolveError::BadArgument {
            parameter: param.spec.name.clone(),
            converter: param.converter.name().to_string(),
            detail,
        },
        ConvertError::Crash { detail } => crash(param, detail),
    })
}

fn crash(param: &BoundParam, detail: String) -> ResolveError {
    warn!(
        parameter = %param.spec.name,
        converter = %param.converter.name(),
        %detail,
        "converter failed unexpectedly"
    );
    ResolveError::ConversionCrash {
        parameter: param.spec.name.clone(),
        converter: param.converter.name().to_string(),
        detail,
    }
}

fn default_or_missing(param: &BoundParam) -> Result<ArgValue, ResolveError> {
    match &param.spec.default {
        Some(default) => Ok(default.clone()),
        None => Err(ResolveError::MissingRequiredArgument {
            parameter: param.spec.name.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{IntConverter, OptionalConverter, StrConverter};
    use crate::testutil::fixture_context;

    fn bound(spec: ParamSpec, converter: Converter) -> BoundParam {
        BoundParam {
            spec,
            converter: Arc::new(converter),
        }
    }

    fn int_param(name: &str) -> BoundParam {
        bound(
            ParamSpec::required(name, "int"),
            Converter::Value(Box::new(IntConverter)),
        )
    }

    fn str_rest_param(name: &str) -> BoundParam {
        bound(
            ParamSpec::required(name, "str").consume_rest(),
            Converter::Value(Box::new(StrConverter)),
        )
    }

    #[test]
    fn test_missing_required_argument_names_the_parameter() {
        let ctx = fixture_context();
        let params = [int_param("count")];
        let mut stream = TokenStream::new("");

        let err = resolve_arguments(&ctx, "test", &params, true, &mut stream).unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingRequiredArgument {
                parameter: "count".to_string()
            }
        );
    }

    #[test]
    fn test_optional_binds_default_when_stream_is_empty() {
        let ctx = fixture_context();
        let params = [bound(
            ParamSpec::optional("count", "int", ArgValue::Int(10)),
            Converter::Value(Box::new(IntConverter)),
        )];
        let mut stream = TokenStream::new("");

        let args = resolve_arguments(&ctx, "test", &params, true, &mut stream).unwrap();
        assert_eq!(args.get("count"), Some(&ArgValue::Int(10)));
    }

    #[test]
    fn test_bad_argument_carries_parameter_and_converter() {
        let ctx = fixture_context();
        let params = [int_param("count")];
        let mut stream = TokenStream::new("twelve");

        let err = resolve_arguments(&ctx, "test", &params, true, &mut stream).unwrap_err();
        match err {
            ResolveError::BadArgument {
                parameter,
                converter,
                ..
            } => {
                assert_eq!(parameter, "count");
                assert_eq!(converter, "int");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_consume_rest_captures_everything() {
        let ctx = fixture_context();
        let params = [int_param("count"), str_rest_param("reason")];
        let mut stream = TokenStream::new("3 spamming \"quoted\" words");

        let args = resolve_arguments(&ctx, "test", &params, true, &mut stream).unwrap();
        assert_eq!(args.get("count"), Some(&ArgValue::Int(3)));
        assert_eq!(
            args.get("reason"),
            Some(&ArgValue::Str("spamming \"quoted\" words".to_string()))
        );
    }

    #[test]
    fn test_variadic_stops_at_rejected_token_and_rewinds_it() {
        let ctx = fixture_context();
        let params = [bound(
            ParamSpec::required("values", "int").variadic(),
            Converter::Value(Box::new(IntConverter)),
        )];
        let mut stream = TokenStream::new("1 2 3 stop 4");

        let args = resolve_arguments(&ctx, "test", &params, true, &mut stream).unwrap();
        assert_eq!(
            args.get_all("values"),
            vec![&ArgValue::Int(1), &ArgValue::Int(2), &ArgValue::Int(3)]
        );
        assert_eq!(stream.remaining(), "stop 4");
    }

    #[test]
    fn test_variadic_with_extras_disallowed_reports_too_many() {
        let ctx = fixture_context();
        let params = [bound(
            ParamSpec::required("values", "int").variadic(),
            Converter::Value(Box::new(IntConverter)),
        )];
        let mut stream = TokenStream::new("1 2 3 stop 4");

        let err = resolve_arguments(&ctx, "sum", &params, false, &mut stream).unwrap_err();
        assert_eq!(
            err,
            ResolveError::TooManyArguments {
                command: "sum".to_string()
            }
        );
    }

    #[test]
    fn test_variadic_accepts_zero_matches() {
        let ctx = fixture_context();
        let params = [bound(
            ParamSpec::required("values", "int").variadic(),
            Converter::Value(Box::new(IntConverter)),
        )];
        let mut stream = TokenStream::new("");

        let args = resolve_arguments(&ctx, "test", &params, true, &mut stream).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_optional_recall_binds_default_and_recalls_everything() {
        // (n: Optional[int] = 5, rest: str) with "not-a-number some text"
        let ctx = fixture_context();
        let optional = OptionalConverter::new(Arc::new(Converter::Value(Box::new(IntConverter))));
        let params = [
            bound(
                ParamSpec::optional("n", "optional-int", ArgValue::Str("5".into())),
                Converter::Value(Box::new(optional)),
            ),
            str_rest_param("rest"),
        ];
        let mut stream = TokenStream::new("not-a-number some text");

        let args = resolve_arguments(&ctx, "test", &params, true, &mut stream).unwrap();
        assert_eq!(args.get("n"), Some(&ArgValue::Str("5".to_string())));
        assert_eq!(
            args.get("rest"),
            Some(&ArgValue::Str("not-a-number some text".to_string()))
        );
    }

    #[test]
    fn test_required_parameter_fully_recalled_is_missing() {
        let ctx = fixture_context();
        let optional = OptionalConverter::new(Arc::new(Converter::Value(Box::new(IntConverter))));
        let params = [bound(
            ParamSpec::required("n", "optional-int"),
            Converter::Value(Box::new(optional)),
        )];
        let mut stream = TokenStream::new("not-a-number");

        let err = resolve_arguments(&ctx, "test", &params, true, &mut stream).unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingRequiredArgument {
                parameter: "n".to_string()
            }
        );
    }

    #[test]
    fn test_conversion_crash_is_distinguished_from_bad_argument() {
        struct Faulty;
        impl crate::convert::ValueConverter for Faulty {
            fn name(&self) -> &'static str {
                "faulty"
            }
            fn convert(&self, _: &Context, _: &str) -> Result<Conversion, ConvertError> {
                Err(ConvertError::crash("directory unavailable"))
            }
        }

        let ctx = fixture_context();
        let params = [bound(
            ParamSpec::required("target", "faulty"),
            Converter::Value(Box::new(Faulty)),
        )];
        let mut stream = TokenStream::new("anything");

        let err = resolve_arguments(&ctx, "test", &params, true, &mut stream).unwrap_err();
        assert!(matches!(err, ResolveError::ConversionCrash { .. }));
    }
}
