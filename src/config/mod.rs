//! Context resolution from configuration files.
//!
//! Given an ordered list of sources, reads and parses each one according
//! to its kind and merges them into a single flat [`Context`](crate::core::Context):
//!
//! - **structured-properties** (`.properties`): `key = value` lines with
//!   `${name}` interpolation and JSON value coercion
//! - **plain-json** (`.json`): a single JSON object
//! - anything else is skipped with a [`Diagnostic`]

pub mod diagnostic;
pub mod json;
pub mod properties;
pub mod resolver;
pub mod source;

pub use diagnostic::{Diagnostic, DiagnosticKind, Reporter, TracingReporter};
pub use json::parse_json;
pub use properties::parse_properties;
pub use resolver::ContextResolver;
pub use source::{BASEDIR_KEY, ConfigSource, ContextSource, Environment, SourceKind};
