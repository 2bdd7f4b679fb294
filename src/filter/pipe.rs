//! Async driver connecting a reader, a [`TokenFilter`] and a writer.
//!
//! Context resolution runs as a spawned task while input is read, so
//! input that arrives first is queued inside the filter instead of
//! blocking the reader. Observers can follow resolution through a
//! [`watch`] channel.

use crate::config::{ContextResolver, ContextSource};
use crate::core::Context;
use crate::error::{ConfigError, IoError, Result};
use crate::filter::options::FilterOptions;
use crate::filter::transform::TokenFilter;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Published state of context resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextState {
    /// Resolution is still running.
    Pending,
    /// The context is available.
    Ready(Context),
    /// Resolution failed with the given reason.
    Failed(String),
}

/// Counters for one pipe run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipeStats {
    /// Number of chunks read.
    pub chunks: usize,
    /// Bytes read from the input.
    pub bytes_in: usize,
    /// Bytes written to the output.
    pub bytes_out: usize,
}

/// Streams input through a token filter.
///
/// # Examples
///
/// ```
/// use token_filter::core::Context;
/// use token_filter::filter::{FilterOptions, FilterPipe};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> token_filter::Result<()> {
/// let context: Context = [("city", "Topeka")].into_iter().collect();
/// let pipe = FilterPipe::with_context(context, FilterOptions::default())?;
///
/// let mut out = Vec::new();
/// pipe.run(&b"Hello, @city@!"[..], &mut out).await?;
/// assert_eq!(out, b"Hello, Topeka!");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FilterPipe {
    filter: TokenFilter,
    resolution: Option<JoinHandle<Result<Context>>>,
    state: watch::Sender<ContextState>,
    input_name: String,
    output_name: String,
}

impl FilterPipe {
    /// Creates a pipe for `source`.
    ///
    /// An inline context is used immediately. A file list is resolved by a
    /// task spawned here, so this must be called within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter cannot be built from `options`.
    pub fn new(
        source: ContextSource,
        resolver: ContextResolver,
        options: FilterOptions,
    ) -> Result<Self> {
        match source {
            ContextSource::Inline(context) => Self::with_context(context, options),
            ContextSource::Files(sources) => {
                let filter = TokenFilter::awaiting_context(options)?;
                tracing::debug!(sources = sources.len(), "spawning context resolution");
                let handle = tokio::spawn(async move { resolver.resolve(&sources).await });
                let (state, _) = watch::channel(ContextState::Pending);
                Ok(Self {
                    filter,
                    resolution: Some(handle),
                    state,
                    input_name: "<input>".to_string(),
                    output_name: "<output>".to_string(),
                })
            }
        }
    }

    /// Creates a pipe with a directly supplied context.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter cannot be built from `options`.
    pub fn with_context(context: Context, options: FilterOptions) -> Result<Self> {
        let filter = TokenFilter::new(context.clone(), options)?;
        let (state, _) = watch::channel(ContextState::Ready(context));
        Ok(Self {
            filter,
            resolution: None,
            state,
            input_name: "<input>".to_string(),
            output_name: "<output>".to_string(),
        })
    }

    /// Names the input and output in I/O errors.
    #[must_use]
    pub fn with_endpoints(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.input_name = input.into();
        self.output_name = output.into();
        self
    }

    /// Subscribes to context resolution updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ContextState> {
        self.state.subscribe()
    }

    /// The underlying filter.
    #[must_use]
    pub const fn filter(&self) -> &TokenFilter {
        &self.filter
    }

    /// Reads `reader` to the end, writing filtered output to `writer`.
    ///
    /// The writer is flushed and shut down on success.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::ContextFailed`](crate::error::FilterError::ContextFailed)
    /// if context resolution fails, or an I/O error if reading or writing fails.
    pub async fn run<R, W>(mut self, mut reader: R, mut writer: W) -> Result<PipeStats>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = vec![0u8; self.filter.options().high_water_mark()];
        let mut stats = PipeStats::default();
        let mut input_open = true;

        if let Some(mut handle) = self.resolution.take() {
            loop {
                tokio::select! {
                    joined = &mut handle => {
                        let resolved = joined.unwrap_or_else(|e| {
                            Err(ConfigError::ResolverFailed(e.to_string()).into())
                        });
                        let out = self.settle(resolved)?;
                        self.write(&mut writer, &out, &mut stats).await?;
                        break;
                    }
                    read = reader.read(&mut buf), if input_open => {
                        let n = read.map_err(|e| self.read_error(&e))?;
                        if n == 0 {
                            input_open = false;
                            continue;
                        }
                        stats.chunks += 1;
                        stats.bytes_in += n;
                        let out = self.filter.consume(&buf[..n])?;
                        self.write(&mut writer, &out, &mut stats).await?;
                    }
                }
            }
        }

        while input_open {
            let n = reader
                .read(&mut buf)
                .await
                .map_err(|e| self.read_error(&e))?;
            if n == 0 {
                input_open = false;
                continue;
            }
            stats.chunks += 1;
            stats.bytes_in += n;
            let out = self.filter.consume(&buf[..n])?;
            self.write(&mut writer, &out, &mut stats).await?;
        }

        let out = self.filter.finish()?;
        self.write(&mut writer, &out, &mut stats).await?;
        writer.flush().await.map_err(|e| self.write_error(&e))?;
        writer.shutdown().await.map_err(|e| self.write_error(&e))?;

        tracing::debug!(
            chunks = stats.chunks,
            bytes_in = stats.bytes_in,
            bytes_out = stats.bytes_out,
            "filter pipe finished"
        );
        Ok(stats)
    }

    fn settle(&mut self, resolved: Result<Context>) -> Result<Vec<u8>> {
        let published = match &resolved {
            Ok(context) => ContextState::Ready(context.clone()),
            Err(e) => ContextState::Failed(e.to_string()),
        };
        self.state.send_replace(published);
        self.filter.context_ready(resolved)
    }

    async fn write<W>(&self, writer: &mut W, bytes: &[u8], stats: &mut PipeStats) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        if bytes.is_empty() {
            return Ok(());
        }
        writer
            .write_all(bytes)
            .await
            .map_err(|e| self.write_error(&e))?;
        stats.bytes_out += bytes.len();
        Ok(())
    }

    fn read_error(&self, e: &std::io::Error) -> IoError {
        IoError::ReadFailed {
            path: self.input_name.clone(),
            reason: e.to_string(),
        }
    }

    fn write_error(&self, e: &std::io::Error) -> IoError {
        IoError::WriteFailed {
            path: self.output_name.clone(),
            kind: e.kind(),
            reason: e.to_string(),
        }
    }
}
