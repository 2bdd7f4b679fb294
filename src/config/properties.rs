//! Properties file parsing.
//!
//! Supports the usual `.properties` syntax plus two extensions:
//!
//! - `${name}` interpolation, resolved against keys defined earlier in the
//!   same file and then against the [`Environment`]
//! - JSON coercion: a value that parses as JSON is stored as that value's
//!   text (`"bar"` becomes `bar`, `[1, 2]` becomes `[1,2]`)

use crate::config::source::Environment;
use crate::core::Context;
use crate::core::context::value_to_string;
use crate::error::ConfigError;

/// One logical entry after joining continuation lines.
struct Line {
    /// 1-based number of the first physical line.
    number: usize,
    text: String,
}

/// Parses properties text into a context.
///
/// `path` is used only for error messages.
///
/// # Errors
///
/// Returns [`ConfigError::ParseFailed`] for malformed escapes, unterminated
/// or undefined `${...}` references.
///
/// # Examples
///
/// ```
/// use token_filter::config::{Environment, parse_properties};
///
/// let env = Environment::new().with("host", "example.org");
/// let ctx = parse_properties("url = https://${host}/\nport: 8080", "app.properties", &env).unwrap();
/// assert_eq!(ctx.get("url"), Some("https://example.org/"));
/// assert_eq!(ctx.get("port"), Some("8080"));
/// ```
pub fn parse_properties(
    text: &str,
    path: &str,
    env: &Environment,
) -> Result<Context, ConfigError> {
    let mut context = Context::new();

    for line in logical_lines(text) {
        let (raw_key, raw_value) = split_entry(&line.text);
        let fail = |reason: String| ConfigError::ParseFailed {
            path: path.to_string(),
            line: Some(line.number),
            reason,
        };

        let key = unescape(raw_key, None).map_err(&fail)?;
        let value = unescape(raw_value, Some((&context, env))).map_err(&fail)?;
        context.insert(key, coerce(value));
    }

    Ok(context)
}

/// Joins continuation lines and drops blanks and comments.
fn logical_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current: Option<Line> = None;

    for (index, physical) in text.lines().enumerate() {
        let trimmed = physical.trim_start();
        let mut line = match current.take() {
            Some(mut line) => {
                line.text.push_str(trimmed);
                line
            }
            None if trimmed.is_empty() || trimmed.starts_with(['#', '!']) => continue,
            None => Line {
                number: index + 1,
                text: trimmed.to_string(),
            },
        };

        if ends_with_continuation(&line.text) {
            line.text.pop();
            current = Some(line);
        } else {
            lines.push(line);
        }
    }

    // A continuation on the last line just ends the entry.
    lines.extend(current);
    lines
}

/// True if the text ends in an odd number of backslashes.
fn ends_with_continuation(text: &str) -> bool {
    text.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

/// Splits an entry at the first unescaped `=`, `:` or whitespace.
fn split_entry(text: &str) -> (&str, &str) {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'=' | b':' => {
                return (&text[..i], text[i + 1..].trim_start());
            }
            b if b.is_ascii_whitespace() => {
                let rest = text[i..].trim_start();
                let rest = rest
                    .strip_prefix('=')
                    .or_else(|| rest.strip_prefix(':'))
                    .map_or(rest, str::trim_start);
                return (&text[..i], rest);
            }
            _ => i += 1,
        }
    }
    (text, "")
}

/// Resolves escapes and, when `scope` is given, `${name}` references.
fn unescape(raw: &str, scope: Option<(&Context, &Environment)>) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match (c, scope) {
            ('\\', _) => match chars.next() {
                Some('t') => out.push('\t'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('f') => out.push('\u{c}'),
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).collect();
                    let decoded = u32::from_str_radix(&hex, 16)
                        .ok()
                        .filter(|_| hex.len() == 4)
                        .and_then(char::from_u32)
                        .ok_or_else(|| format!("malformed \\u escape: \\u{hex}"))?;
                    out.push(decoded);
                }
                Some(other) => out.push(other),
                None => {}
            },
            ('$', Some((context, env))) if chars.as_str().starts_with('{') => {
                chars.next();
                let rest = chars.as_str();
                let end = rest
                    .find('}')
                    .ok_or_else(|| "unterminated variable reference".to_string())?;
                let name = &rest[..end];
                let value = context
                    .get(name)
                    .or_else(|| env.get(name))
                    .ok_or_else(|| format!("undefined variable: {name}"))?;
                out.push_str(value);
                chars = rest[end + 1..].chars();
            }
            (other, _) => out.push(other),
        }
    }

    Ok(out)
}

/// Applies JSON coercion to a value.
fn coerce(value: String) -> String {
    if value.is_empty() {
        return value;
    }
    serde_json::from_str::<serde_json::Value>(&value).map_or(value, value_to_string)
}
