//! CLI layer for the token filter.
//!
//! Provides the command-line interface using clap, with commands for
//! filtering a stream and inspecting the resolved context.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
