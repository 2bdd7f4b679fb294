//! I/O utilities for token filtering.
//!
//! Provides `encoding_rs`-backed character encodings with chunk-boundary-safe
//! streaming decoding and encoding, and
//! async input/output endpoints for files and standard streams.

pub mod encoding;
pub mod files;

pub use encoding::{Decoder, Encoder, Encoding};
pub use files::{Input, Output, endpoint_name, open_input, open_output};
