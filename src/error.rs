//! Error types for token filtering.
//!
//! This module provides the error hierarchy using `thiserror` for context
//! resolution, stream transformation, I/O, and CLI commands.

use thiserror::Error;

/// Result type alias for token filter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Context resolution errors (reading or parsing configuration sources).
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Stream transform errors.
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    /// I/O errors (stream and file operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),
}

/// Errors raised while resolving a context from configuration sources.
///
/// Any of these fails the whole resolution; no partial context is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A configuration source could not be read.
    #[error("failed to read {path}: {reason}")]
    ReadFailed {
        /// Path of the source.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// A configuration source could not be parsed per its kind.
    #[error("failed to parse {path}{}: {reason}", line_suffix(.line))]
    ParseFailed {
        /// Path of the source.
        path: String,
        /// 1-based line number, when known.
        line: Option<usize>,
        /// Reason for failure.
        reason: String,
    },

    /// Resolution exceeded the caller's deadline.
    #[error("context resolution timed out after {millis}ms")]
    Timeout {
        /// Deadline in milliseconds.
        millis: u64,
    },

    /// The resolution task ended without producing a result.
    #[error("context resolution did not complete: {0}")]
    ResolverFailed(String),
}

/// Errors raised by the streaming transform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The token delimiter was empty.
    #[error("token delimiter must not be empty")]
    EmptyDelimiter,

    /// The token pattern could not be compiled.
    #[error("invalid token pattern: {0}")]
    InvalidPattern(String),

    /// Context resolution failed; the filter accepts no further input.
    #[error("context resolution failed: {reason}")]
    ContextFailed {
        /// Description of the resolution failure.
        reason: String,
    },

    /// The stream was finished while the context was still pending.
    #[error("cannot finish while the context is still pending")]
    ContextPending,

    /// A second context-ready event was delivered.
    #[error("context has already been resolved")]
    ContextAlreadyResolved,

    /// Input arrived after the stream was finished.
    #[error("write after finish")]
    Finished,

    /// Input arrived after a terminal failure.
    #[error("filter has failed and rejects further input")]
    Rejected,

    /// Unrecognized character encoding label.
    #[error("unknown character encoding: {name}")]
    UnknownEncoding {
        /// The label that was not recognized.
        name: String,
    },
}

/// I/O-specific errors for stream and file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Failed to read input.
    #[error("failed to read {path}: {reason}")]
    ReadFailed {
        /// Path (or `<stdin>`).
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to write output.
    #[error("failed to write {path}: {reason}")]
    WriteFailed {
        /// Path (or `<stdout>`).
        path: String,
        /// Kind of the underlying I/O error.
        kind: std::io::ErrorKind,
        /// Reason for failure.
        reason: String,
    },
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Output format error.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

#[allow(clippy::ref_option)]
fn line_suffix(line: &Option<usize>) -> String {
    line.map_or_else(String::new, |l| format!(" at line {l}"))
}

impl Error {
    /// True if writing failed because the reader went away (e.g. `| head`).
    #[must_use]
    pub fn is_broken_pipe(&self) -> bool {
        matches!(
            self,
            Self::Io(IoError::WriteFailed {
                kind: std::io::ErrorKind::BrokenPipe,
                ..
            })
        )
    }
}

impl From<regex::Error> for FilterError {
    fn from(err: regex::Error) -> Self {
        Self::InvalidPattern(err.to_string())
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::OutputFormat(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ReadFailed {
            path: "missing.json".to_string(),
            reason: "No such file or directory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to read missing.json: No such file or directory"
        );

        let err = ConfigError::ParseFailed {
            path: "a.properties".to_string(),
            line: Some(3),
            reason: "undefined variable: home".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to parse a.properties at line 3: undefined variable: home"
        );

        let err = ConfigError::ParseFailed {
            path: "a.json".to_string(),
            line: None,
            reason: "expected object".to_string(),
        };
        assert_eq!(err.to_string(), "failed to parse a.json: expected object");
    }

    #[test]
    fn test_filter_error_display() {
        assert_eq!(
            FilterError::EmptyDelimiter.to_string(),
            "token delimiter must not be empty"
        );
        let err = FilterError::ContextFailed {
            reason: "bad json".to_string(),
        };
        assert!(err.to_string().contains("bad json"));
    }

    #[test]
    fn test_config_timeout_display() {
        let err = ConfigError::Timeout { millis: 250 };
        assert_eq!(err.to_string(), "context resolution timed out after 250ms");
    }

    #[test]
    fn test_broken_pipe_detected_by_kind() {
        let err: Error = IoError::WriteFailed {
            path: "<stdout>".to_string(),
            kind: std::io::ErrorKind::BrokenPipe,
            reason: "Tuyau cass\u{e9}".to_string(),
        }
        .into();
        assert!(err.is_broken_pipe());

        let err: Error = IoError::WriteFailed {
            path: "out.txt".to_string(),
            kind: std::io::ErrorKind::PermissionDenied,
            reason: "Broken pipe".to_string(),
        }
        .into();
        assert!(!err.is_broken_pipe());
    }

    #[test]
    fn test_error_from_config() {
        let err: Error = ConfigError::ResolverFailed("cancelled".to_string()).into();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().starts_with("configuration error:"));
    }

    #[test]
    fn test_error_from_filter() {
        let err: Error = FilterError::Finished.into();
        assert!(matches!(err, Error::Filter(FilterError::Finished)));
    }

    #[test]
    #[allow(clippy::invalid_regex)]
    fn test_from_regex_error_to_filter_error() {
        let regex_err = regex::Regex::new("[invalid").unwrap_err();
        let err: FilterError = regex_err.into();
        assert!(matches!(err, FilterError::InvalidPattern(_)));
    }

    #[test]
    fn test_from_serde_json_error_to_command_error() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: CommandError = json_err.into();
        assert!(matches!(err, CommandError::OutputFormat(_)));
    }
}
