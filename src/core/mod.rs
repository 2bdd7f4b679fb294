//! Core domain types for token filtering.
//!
//! The substitution context, token delimiters, and the compiled token
//! pattern. These are pure domain types with no I/O dependencies.

pub mod context;
pub mod token;

pub use context::Context;
pub use token::{DEFAULT_DELIMITER, Delimiter, Token, TokenPattern, is_word_byte};
