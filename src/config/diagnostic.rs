//! Non-fatal resolution diagnostics.
//!
//! Sources that cannot contribute keys but should not fail resolution are
//! reported through an injected [`Reporter`].

use std::fmt;
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// What went wrong with a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The source kind is not recognized; the source was skipped.
    UnknownSourceKind {
        /// Lowercased file extension (empty if none).
        extension: String,
    },
}

/// A structured warning about one configuration source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Path of the source.
    pub path: String,
    /// Diagnostic detail.
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::UnknownSourceKind { extension } if extension.is_empty() => {
                write!(f, "skipping {}: unknown source kind", self.path)
            }
            DiagnosticKind::UnknownSourceKind { extension } => {
                write!(f, "skipping {}: unknown source kind .{extension}", self.path)
            }
        }
    }
}

/// Receives diagnostics produced during resolution.
pub trait Reporter: Send + Sync {
    /// Handles one diagnostic.
    fn report(&self, diagnostic: &Diagnostic);
}

/// Default reporter: logs each diagnostic as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, diagnostic: &Diagnostic) {
        tracing::warn!(path = %diagnostic.path, "{diagnostic}");
    }
}

/// Reporter that keeps diagnostics in memory.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct CollectingReporter {
    diagnostics: Arc<Mutex<Vec<Diagnostic>>>,
}

#[cfg(test)]
impl CollectingReporter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl Reporter for CollectingReporter {
    fn report(&self, diagnostic: &Diagnostic) {
        if let Ok(mut diagnostics) = self.diagnostics.lock() {
            diagnostics.push(diagnostic.clone());
        }
    }
}
