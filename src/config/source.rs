//! Configuration sources and the interpolation environment.

use crate::core::Context;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment key that always holds the base directory.
pub const BASEDIR_KEY: &str = "basedir";

/// Format of a configuration source, inferred from its file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Line-oriented `key = value` properties (`.properties`).
    StructuredProperties,
    /// A single JSON object (`.json`).
    PlainJson,
    /// Anything else; skipped with a warning.
    Unknown(String),
}

impl SourceKind {
    /// Infers the kind from a path's extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "properties" => Self::StructuredProperties,
            "json" => Self::PlainJson,
            _ => Self::Unknown(extension),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuredProperties => f.write_str("structured-properties"),
            Self::PlainJson => f.write_str("plain-json"),
            Self::Unknown(ext) if ext.is_empty() => f.write_str("unknown"),
            Self::Unknown(ext) => write!(f, "unknown (.{ext})"),
        }
    }
}

/// A configuration file to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    /// File path.
    pub path: PathBuf,
    /// Inferred or explicit format.
    pub kind: SourceKind,
}

impl ConfigSource {
    /// Creates a source, inferring its kind from the extension.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = SourceKind::from_path(&path);
        Self { path, kind }
    }

    /// Overrides the inferred kind.
    #[must_use]
    pub fn with_kind(mut self, kind: SourceKind) -> Self {
        self.kind = kind;
        self
    }

    /// Path as a display string.
    #[must_use]
    pub fn display_path(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

/// Where a filter's context comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextSource {
    /// Supplied directly; no resolution step.
    Inline(Context),
    /// Read from configuration files by the resolver.
    Files(Vec<ConfigSource>),
}

impl From<Context> for ContextSource {
    fn from(context: Context) -> Self {
        Self::Inline(context)
    }
}

impl From<Vec<ConfigSource>> for ContextSource {
    fn from(sources: Vec<ConfigSource>) -> Self {
        Self::Files(sources)
    }
}

/// Variables available to `${name}` interpolation in properties files.
///
/// Always contains `basedir`, defaulting to the current working directory.
///
/// # Examples
///
/// ```
/// use token_filter::config::Environment;
///
/// let env = Environment::new().with("home", "/home/me");
/// assert!(env.get("basedir").is_some());
/// assert_eq!(env.get("home"), Some("/home/me"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Creates an environment with `basedir` set to the working directory.
    #[must_use]
    pub fn new() -> Self {
        let basedir = std::env::current_dir()
            .map_or_else(|_| ".".to_string(), |p| p.to_string_lossy().to_string());
        let mut vars = BTreeMap::new();
        vars.insert(BASEDIR_KEY.to_string(), basedir);
        Self { vars }
    }

    /// Sets a variable, replacing any previous value (including `basedir`).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a variable.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Looks up a variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// The base directory.
    #[must_use]
    pub fn basedir(&self) -> &str {
        self.get(BASEDIR_KEY).unwrap_or(".")
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Environment {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}
