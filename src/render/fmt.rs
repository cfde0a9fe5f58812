//! Formats interpolated values according to the output mode.

use crate::{Mode, Result, Value};

/// Formats a value for a `#{..}` interpolation, or a `${..}` one if `raw`.
pub fn format(buf: &mut String, mode: Mode, raw: bool, value: &Value) -> Result<()> {
    match (raw, mode) {
        (true, _) | (false, Mode::Default) => plain(buf, value),
        (false, Mode::Sql) => sql(buf, value),
        (false, Mode::Json) => json(buf, value)?,
    }
    Ok(())
}

/// The plain string form of a value.
///
/// Values are formatted as follows:
/// - [`Value::None`]: empty string
/// - [`Value::Bool`]: `true` or `false`
/// - [`Value::Integer`]: the integer formatted using [`Display`][std::fmt::Display]
/// - [`Value::Float`]: the float formatted using [`Display`][std::fmt::Display]
/// - [`Value::String`]: the string, unescaped
/// - [`Value::List`]: each element in its plain form, separated by `,`
/// - [`Value::Map`]: compact JSON
pub fn plain(buf: &mut String, value: &Value) {
    match value {
        Value::None => {}
        Value::Bool(b) => buf.push_str(if *b { "true" } else { "false" }),
        Value::Integer(n) => buf.push_str(&n.to_string()),
        Value::Float(n) => buf.push_str(&n.to_string()),
        Value::String(s) => buf.push_str(s),
        Value::List(list) => {
            for (i, item) in list.iter().enumerate() {
                if i > 0 {
                    buf.push(',');
                }
                plain(buf, item);
            }
        }
        Value::Map(_) => {
            if let Ok(s) = serde_json::to_string(value) {
                buf.push_str(&s);
            }
        }
    }
}

/// Returns the plain string form of a value.
pub fn to_plain(value: &Value) -> String {
    let mut buf = String::new();
    plain(&mut buf, value);
    buf
}

/// The escaped SQL literal form of a value.
fn sql(buf: &mut String, value: &Value) {
    match value {
        Value::None => buf.push_str("NULL"),
        Value::Bool(_) | Value::Integer(_) | Value::Float(_) => plain(buf, value),
        Value::String(s) => sql_string(buf, s),
        Value::List(list) => {
            for (i, item) in list.iter().enumerate() {
                if i > 0 {
                    buf.push_str(", ");
                }
                match item {
                    Value::List(_) => {
                        buf.push('(');
                        sql(buf, item);
                        buf.push(')');
                    }
                    item => sql(buf, item),
                }
            }
        }
        Value::Map(_) => sql_string(buf, &to_plain(value)),
    }
}

fn sql_string(buf: &mut String, s: &str) {
    buf.reserve(s.len() + 2);
    buf.push('\'');
    for c in s.chars() {
        match c {
            '\0' => buf.push_str("\\0"),
            '\x08' => buf.push_str("\\b"),
            '\t' => buf.push_str("\\t"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\x1a' => buf.push_str("\\Z"),
            '"' => buf.push_str("\\\""),
            '\'' => buf.push_str("\\'"),
            '\\' => buf.push_str("\\\\"),
            c => buf.push(c),
        }
    }
    buf.push('\'');
}

/// The JSON literal form of a value.
fn json(buf: &mut String, value: &Value) -> Result<()> {
    buf.push_str(&serde_json::to_string(value)?);
    Ok(())
}
