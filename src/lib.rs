//! # token-filter
//!
//! Streaming token substitution.
//!
//! Replaces delimited tokens such as `@name@` in a byte stream with values
//! from a context, correctly even when a token is split across chunks. The
//! context is supplied directly or resolved asynchronously from
//! `.properties` and `.json` files while input is already arriving.
//!
//! ## Features
//!
//! - **Chunk-boundary safe**: output is identical however the input is chunked
//! - **Async resolution**: configuration files are read concurrently and
//!   merged in list order; early input is queued, not blocked
//! - **Pass-through**: an empty context copies input byte for byte
//! - **Encodings**: any WHATWG encoding via `encoding_rs`; multi-byte
//!   sequences split across chunks are reassembled
//!
//! ## Example
//!
//! ```
//! use token_filter::core::Context;
//! use token_filter::filter::{FilterOptions, TokenFilter};
//!
//! let context: Context = [("city", "Topeka")].into_iter().collect();
//! let mut filter = TokenFilter::new(context, FilterOptions::default()).unwrap();
//!
//! let mut out = filter.consume(b"Hello, @ci").unwrap();
//! out.extend(filter.consume(b"ty@!").unwrap());
//! out.extend(filter.finish().unwrap());
//! assert_eq!(out, b"Hello, Topeka!");
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod filter;
pub mod io;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{Context, Delimiter, TokenPattern};

// Re-export context resolution types
pub use config::{
    ConfigSource, ContextResolver, ContextSource, Diagnostic, Environment, Reporter, SourceKind,
};

// Re-export filter types
pub use filter::{
    ContextState, FilterOptions, FilterPipe, Mode, PipeStats, TokenFilter, replace_tokens,
};

// Re-export I/O types
pub use io::Encoding;

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
