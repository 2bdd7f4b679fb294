//! Streaming token replacement.
//!
//! [`TokenFilter`] is the synchronous state machine that replaces tokens
//! chunk by chunk; [`FilterPipe`] drives it between async endpoints while
//! the context is resolved.

pub mod options;
pub mod pipe;
pub mod scanner;
pub mod transform;

pub use options::{DEFAULT_HIGH_WATER_MARK, FilterOptions};
pub use pipe::{ContextState, FilterPipe, PipeStats};
pub use scanner::{Scanned, replace_tokens, scan};
pub use transform::{Mode, TokenFilter};
