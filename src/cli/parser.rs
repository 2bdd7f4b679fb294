//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::config::{BASEDIR_KEY, ConfigSource, ContextSource, Environment};
use crate::core::{Context, Delimiter};
use crate::error::{CommandError, Result};
use crate::filter::{DEFAULT_HIGH_WATER_MARK, FilterOptions};
use crate::io::Encoding;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Token filter: replaces `@name@` tokens in a stream with values from
/// properties or JSON files.
#[derive(Parser, Debug)]
#[command(name = "token-filter")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file to read (`.properties` or `.json`). Repeatable;
    /// later files override earlier ones.
    #[arg(short = 'c', long = "config", global = true, value_name = "FILE")]
    pub configs: Vec<PathBuf>,

    /// Inline context entry. Repeatable; replaces configuration files.
    #[arg(
        short = 'D',
        long = "define",
        global = true,
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        conflicts_with = "configs"
    )]
    pub defines: Vec<(String, String)>,

    /// Interpolation variable for `${name}` in properties files. Repeatable.
    #[arg(
        short = 'e',
        long = "env",
        global = true,
        value_name = "KEY=VALUE",
        value_parser = parse_key_value
    )]
    pub env: Vec<(String, String)>,

    /// Value of `${basedir}` (defaults to the current directory).
    #[arg(long, global = true, value_name = "DIR")]
    pub basedir: Option<PathBuf>,

    /// Token delimiter.
    #[arg(
        short,
        long,
        global = true,
        env = "TOKEN_FILTER_DELIMITER",
        default_value = "@"
    )]
    pub delimiter: String,

    /// Character encoding of input and output (any WHATWG label, e.g.
    /// utf-8, latin1, utf-16le, shift_jis).
    #[arg(long, global = true, default_value = "utf-8")]
    pub encoding: String,

    /// Read size and pending-input threshold in bytes.
    #[arg(long, global = true, default_value_t = DEFAULT_HIGH_WATER_MARK)]
    pub high_water_mark: usize,

    /// Deadline for context resolution in milliseconds.
    #[arg(long, global = true, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Filter a stream, replacing tokens.
    ///
    /// Reads INPUT (or stdin) and writes to OUTPUT (or stdout).
    Filter {
        /// Input file (stdin if not specified).
        input: Option<PathBuf>,

        /// Output file (stdout if not specified).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve the configuration and print the merged context.
    Context,
}

impl Cli {
    /// Where the context comes from: inline definitions or config files.
    #[must_use]
    pub fn context_source(&self) -> ContextSource {
        if self.defines.is_empty() {
            ContextSource::Files(self.configs.iter().map(ConfigSource::new).collect())
        } else {
            ContextSource::Inline(self.defines.iter().cloned().collect::<Context>())
        }
    }

    /// The interpolation environment from `--basedir` and `--env`.
    #[must_use]
    pub fn environment(&self) -> Environment {
        let mut env = Environment::new();
        if let Some(basedir) = &self.basedir {
            env.set(BASEDIR_KEY, basedir.to_string_lossy());
        }
        env.extend(self.env.iter().cloned());
        env
    }

    /// Filter options from `--delimiter`, `--encoding` and `--high-water-mark`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delimiter is empty or the encoding unknown.
    pub fn filter_options(&self) -> Result<FilterOptions> {
        let delimiter = Delimiter::new(self.delimiter.as_str())?;
        let encoding = Encoding::for_label(&self.encoding)?;
        Ok(FilterOptions::new()
            .with_delimiter(delimiter)
            .with_encoding(encoding)
            .with_high_water_mark(self.high_water_mark))
    }

    /// The resolution deadline, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_millis)
    }
}

/// Parses a `KEY=VALUE` argument.
fn parse_key_value(arg: &str) -> std::result::Result<(String, String), CommandError> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(CommandError::InvalidArgument(format!(
            "expected KEY=VALUE, got '{arg}'"
        ))),
    }
}
