//! Engine-level template functions
//!
//! Formatting functions read the formatters and locale of the current render
//! from the `context` binding.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate};
use minijinja::{Environment, Error, ErrorKind, State, Value};

use crate::context::{CONTEXT_BINDING, ContextObject, ContextState};

/// Names of the functions every engine registers
pub const ENGINE_FUNCTIONS: &[&str] = &["format_date", "format_number", "locale", "escape_js"];

pub(crate) fn register(env: &mut Environment<'static>) {
    env.add_function("format_date", format_date);
    env.add_function("format_number", format_number);
    env.add_function("locale", locale);
    env.add_function("escape_js", escape_js);
    env.add_filter("format_date", format_date);
    env.add_filter("format_number", format_number);
    env.add_filter("escape_js", escape_js);
}

fn context_state(state: &State) -> Result<Arc<ContextState>, Error> {
    state
        .lookup(CONTEXT_BINDING)
        .and_then(|value| value.downcast_object::<ContextObject>())
        .map(|object| Arc::clone(&object.0))
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                "`context` is not bound to a render context",
            )
        })
}

/// Format a date with the render's date format
///
/// Usage: {{ format_date(post.published) }} or {{ post.published|format_date }}
pub fn format_date(state: &State, date: Value) -> Result<String, Error> {
    let date = parse_date(&date)?;
    Ok(context_state(state)?.format_date(&date))
}

/// Format a number with the render's number format
///
/// Usage: {{ format_number(order.total) }}
pub fn format_number(state: &State, value: f64) -> Result<String, Error> {
    Ok(context_state(state)?.format_number(value))
}

/// The request locale as a language tag
///
/// Usage: <html lang="{{ locale() }}">
pub fn locale(state: &State) -> Result<String, Error> {
    Ok(context_state(state)?.locale().to_string())
}

/// Escape a value for use inside a JavaScript string literal
///
/// Usage: var name = "{{ escape_js(user.name) }}";
pub fn escape_js(value: String) -> Value {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '<' | '>' | '&' | '\u{2028}' | '\u{2029}' => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    Value::from_safe_string(out)
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DD` dates and Unix seconds
pub(crate) fn parse_date(value: &Value) -> Result<DateTime<FixedOffset>, Error> {
    let invalid = |detail: String| Error::new(ErrorKind::InvalidOperation, detail);

    if let Some(text) = value.as_str() {
        if let Ok(date) = DateTime::parse_from_rfc3339(text) {
            return Ok(date);
        }
        return NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| midnight.and_utc().fixed_offset())
            .ok_or_else(|| invalid(format!("cannot parse `{}` as a date", text)));
    }

    if let Some(seconds) = value.as_i64() {
        return DateTime::from_timestamp(seconds, 0)
            .map(|date| date.fixed_offset())
            .ok_or_else(|| invalid(format!("timestamp {} is out of range", seconds)));
    }

    Err(invalid(format!("cannot format {} as a date", value.kind())))
}
