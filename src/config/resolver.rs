//! Asynchronous context resolution.
//!
//! Reads every configuration source concurrently, then merges the parsed
//! mappings in source-list order so the result does not depend on which
//! read finishes first.

use crate::config::diagnostic::{Diagnostic, DiagnosticKind, Reporter, TracingReporter};
use crate::config::json::parse_json;
use crate::config::properties::parse_properties;
use crate::config::source::{ConfigSource, Environment, SourceKind};
use crate::core::Context;
use crate::error::{ConfigError, Result};
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Resolves configuration sources into a single [`Context`].
///
/// Cheap to clone; clones share the reporter.
///
/// # Examples
///
/// ```no_run
/// use token_filter::config::{ConfigSource, ContextResolver};
///
/// # async fn run() -> token_filter::Result<()> {
/// let resolver = ContextResolver::new();
/// let context = resolver
///     .resolve(&[ConfigSource::new("defaults.json"), ConfigSource::new("local.properties")])
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ContextResolver {
    env: Environment,
    reporter: Arc<dyn Reporter>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for ContextResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextResolver")
            .field("env", &self.env)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Default for ContextResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextResolver {
    /// Creates a resolver with the default environment and a tracing reporter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
            reporter: Arc::new(TracingReporter),
            timeout: None,
        }
    }

    /// Uses `env` for `${name}` interpolation.
    #[must_use]
    pub fn with_environment(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    /// Routes diagnostics to `reporter`.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Fails resolution if it takes longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The interpolation environment.
    #[must_use]
    pub const fn environment(&self) -> &Environment {
        &self.env
    }

    /// Reads, parses and merges `sources`.
    ///
    /// An empty list resolves to an empty context. Sources of unknown kind
    /// are reported and skipped. Later sources override earlier keys.
    ///
    /// # Errors
    ///
    /// Fails with the first read or parse error in source-list order, or
    /// [`ConfigError::Timeout`] if a deadline was set and exceeded. No partial
    /// context is ever returned.
    pub async fn resolve(&self, sources: &[ConfigSource]) -> Result<Context> {
        if sources.is_empty() {
            return Ok(Context::new());
        }

        let Some(limit) = self.timeout else {
            return self.resolve_all(sources).await;
        };
        tokio::time::timeout(limit, self.resolve_all(sources))
            .await
            .map_err(|_| ConfigError::Timeout {
                millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            })?
    }

    async fn resolve_all(&self, sources: &[ConfigSource]) -> Result<Context> {
        let loaded = join_all(sources.iter().map(|source| self.load(source))).await;

        let mut context = Context::new();
        for part in loaded {
            if let Some(part) = part? {
                context.merge(part);
            }
        }
        tracing::debug!(
            sources = sources.len(),
            keys = context.len(),
            "context resolved"
        );
        Ok(context)
    }

    async fn load(&self, source: &ConfigSource) -> std::result::Result<Option<Context>, ConfigError> {
        let path = source.display_path();

        if let SourceKind::Unknown(extension) = &source.kind {
            self.reporter.report(&Diagnostic {
                path,
                kind: DiagnosticKind::UnknownSourceKind {
                    extension: extension.clone(),
                },
            });
            return Ok(None);
        }

        let text = tokio::fs::read_to_string(&source.path)
            .await
            .map_err(|e| ConfigError::ReadFailed {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        tracing::debug!(path = %path, kind = %source.kind, bytes = text.len(), "read config source");

        let context = match source.kind {
            SourceKind::PlainJson => parse_json(&text, &path)?,
            _ => parse_properties(&text, &path, &self.env)?,
        };
        Ok(Some(context))
    }
}
