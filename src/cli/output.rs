//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::core::Context;
use crate::error::{CommandError, Error, Result};
use crate::filter::PipeStats;
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats a resolved context.
///
/// Text output is one `key=value` line per entry, sorted by key.
///
/// # Errors
///
/// Returns [`CommandError::OutputFormat`] if JSON serialization fails.
pub fn format_context(context: &Context, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            for (key, value) in context.iter() {
                let _ = writeln!(output, "{key}={}", escape_text(value));
            }
            Ok(output)
        }
        OutputFormat::Json => Ok(format_json(context)?),
    }
}

/// Formats the summary of a filter run written to a file.
///
/// # Errors
///
/// Returns [`CommandError::OutputFormat`] if JSON serialization fails.
pub fn format_stats(stats: &PipeStats, output: &str, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format!(
            "Filtered {} bytes into {} bytes ({} chunks) -> {output}\n",
            stats.bytes_in, stats.bytes_out, stats.chunks
        )),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct Summary<'a> {
                output: &'a str,
                chunks: usize,
                bytes_in: usize,
                bytes_out: usize,
            }
            Ok(format_json(&Summary {
                output,
                chunks: stats.chunks,
                bytes_in: stats.bytes_in,
                bytes_out: stats.bytes_out,
            })?)
        }
    }
}

/// Formats an error.
///
/// Falls back to the plain message if the JSON envelope cannot be built.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorResponse {
                error: String,
                kind: &'static str,
            }
            let kind = match error {
                Error::Config(_) => "config",
                Error::Filter(_) => "filter",
                Error::Io(_) => "io",
                Error::Command(_) => "command",
            };
            format_json(&ErrorResponse {
                error: error.to_string(),
                kind,
            })
            .unwrap_or_else(|_| error.to_string())
        }
    }
}

fn format_json<T: Serialize>(value: &T) -> std::result::Result<String, CommandError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Escapes line breaks so each entry stays on one line.
fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}
