//! Human-written time spans.
//!
//! Parses spans like `1w2d`, `2 hours 30 minutes`, or `in 10m` from the
//! front of free text, returning the parsed seconds together with the
//! text that was not part of the span. The leftover is what makes the
//! [`DurationConverter`] useful mid-command: `remind 2h finish the report`
//! hands `finish the report` to the next parameter.

use std::sync::LazyLock;

use chat_command_core::ArgValue;
use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;

use crate::context::Context;
use crate::convert::{Conversion, ConvertError, StreamConverter};
use crate::stream::TokenStream;

const MINUTE: u64 = 60;
const HOUR: u64 = MINUTE * 60;
const DAY: u64 = HOUR * 24;
const WEEK: u64 = DAY * 7;
const MONTH: u64 = DAY * 30;
const YEAR: u64 = DAY * 365;

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(me )?(in )?(?:(?P<months>[0-9]+)( ?months?| ?mo))? ?(?:(?P<weeks>[0-9]+)( ?weeks?| ?w))? ?(?:(?P<days>[0-9]+)( ?days?|d))? ?(?:(?P<hours>[0-9]+)( ?hours?| ?hrs?| ?h))? ?(?:(?P<minutes>[0-9]+)( ?minutes?| ?mins?| ?m))? ?((?P<seconds>[0-9]+)( ?seconds?| ?secs?| ?s))? ?(about |to )?(?P<rest>(?s:.*))",
    )
    .expect("static regex must compile")
});

/// Parses a leading human time span out of `argument`.
///
/// Returns the span in whole seconds and the remaining text. A text with
/// no recognisable span yields zero seconds and the whole argument back.
///
/// # Examples
///
/// ```
/// use chat_command_engine::parse_human_time;
///
/// let (seconds, rest) = parse_human_time("2h30m finish the report");
/// assert_eq!(seconds, 2 * 3600 + 30 * 60);
/// assert_eq!(rest, "finish the report");
///
/// let (seconds, rest) = parse_human_time("no time here");
/// assert_eq!(seconds, 0);
/// assert_eq!(rest, "no time here");
/// ```
pub fn parse_human_time(argument: &str) -> (u64, &str) {
    let Some(caps) = TIME_RE.captures(argument) else {
        return (0, argument);
    };

    let mut total: u64 = 0;
    for (group, unit) in [
        ("months", MONTH),
        ("weeks", WEEK),
        ("days", DAY),
        ("hours", HOUR),
        ("minutes", MINUTE),
        ("seconds", 1),
    ] {
        if let Some(m) = caps.name(group) {
            // Absurdly large spans saturate rather than overflow.
            let value = m.as_str().parse::<u64>().unwrap_or(u64::MAX);
            total = total.saturating_add(value.saturating_mul(unit));
        }
    }

    let rest = caps.name("rest").map_or(argument, |m| m.as_str());
    if total == 0 {
        // No span recognised; hand the argument back untouched.
        return (0, argument);
    }
    (total, rest)
}

/// Formats a number of seconds as a human readable delta.
///
/// With `short`, only the three biggest units appear.
///
/// # Examples
///
/// ```
/// use chat_command_engine::human_delta;
///
/// assert_eq!(human_delta(0, true), "0s");
/// assert_eq!(human_delta(90, true), "1m and 30s");
/// assert_eq!(human_delta(3 * 86_400 + 4 * 3600 + 5 * 60 + 6, true), "3d, 4h and 5m");
/// ```
pub fn human_delta(seconds: u64, short: bool) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }

    let (years, rest) = (seconds / YEAR, seconds % YEAR);
    let (months, rest) = (rest / MONTH, rest % MONTH);
    let (days, rest) = (rest / DAY, rest % DAY);
    let (hours, rest) = (rest / HOUR, rest % HOUR);
    let (minutes, secs) = (rest / MINUTE, rest % MINUTE);

    let periods: Vec<String> = [
        ("y", years),
        ("mo", months),
        ("d", days),
        ("h", hours),
        ("m", minutes),
        ("s", secs),
    ]
    .iter()
    .filter(|(_, value)| *value > 0)
    .map(|(name, value)| format!("{value}{name}"))
    .collect();

    if periods.len() > 2 {
        if short {
            return format!("{}, {} and {}", periods[0], periods[1], periods[2]);
        }
        let head = periods[..periods.len() - 1].join(", ");
        return format!("{} and {}", head, periods[periods.len() - 1]);
    }
    periods.join(" and ")
}

/// A point in the future, derived from a parsed span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FutureTime {
    /// The span in whole seconds.
    pub seconds: u64,
    /// The target instant.
    pub date: DateTime<Utc>,
}

impl FutureTime {
    /// Creates a future time `seconds` from now.
    ///
    /// Spans beyond the calendar's range clamp to the latest representable
    /// instant instead of failing.
    pub fn after(seconds: u64) -> Self {
        let delta = i64::try_from(seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        let date = Utc::now()
            .checked_add_signed(delta)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { seconds, date }
    }
}

/// Stream converter for human time spans.
///
/// Reads the rest of the input, parses the leading span, and recalls the
/// unmatched remainder for the next parameter. Rejects input containing
/// no span at all, restoring the cursor before returning.
pub struct DurationConverter;

impl StreamConverter for DurationConverter {
    fn name(&self) -> &'static str {
        "duration"
    }

    fn convert(
        &self,
        _ctx: &Context,
        stream: &mut TokenStream<'_>,
    ) -> Result<Conversion, ConvertError> {
        let text = stream.read_rest();
        let (seconds, rest) = parse_human_time(text);
        if seconds == 0 {
            stream.rewind(text.len());
            return Err(ConvertError::bad(
                "Can't locate a time span in the argument.",
            ));
        }
        Ok(Conversion::ValueAndRecall(
            ArgValue::Duration(seconds),
            rest.to_string(),
        ))
    }
}
