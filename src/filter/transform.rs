//! The streaming token transform state machine.
//!
//! A [`TokenFilter`] is in exactly one [`Mode`]:
//!
//! | Mode | `consume` | Leaves on |
//! |---|---|---|
//! | `AwaitingContext` | queue the chunk | context ready / failed |
//! | `PassThrough` | emit unchanged | - |
//! | `Filtering` | scan and replace | - |
//! | `Failed` | reject | - |
//!
//! The filter does no I/O itself: every operation returns the bytes to
//! emit. [`FilterPipe`](crate::filter::FilterPipe) drives it from an async
//! reader to an async writer.

use crate::core::{Context, TokenPattern};
use crate::error::{FilterError, Result};
use crate::filter::options::FilterOptions;
use crate::filter::scanner::scan;
use crate::io::{Decoder, Encoder};
use std::collections::VecDeque;

/// Transform mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Context is being resolved; input is queued.
    AwaitingContext,
    /// Empty context; input is emitted unchanged.
    PassThrough,
    /// Tokens are replaced from the context.
    Filtering,
    /// Context resolution failed; input is rejected.
    Failed,
}

#[derive(Debug)]
enum State {
    AwaitingContext {
        queue: VecDeque<Vec<u8>>,
        queued_bytes: usize,
    },
    PassThrough,
    Filtering {
        context: Context,
    },
    Failed {
        reason: String,
    },
}

impl State {
    fn ready(context: Context) -> Self {
        if context.is_empty() {
            Self::PassThrough
        } else {
            Self::Filtering { context }
        }
    }
}

/// Chunk-boundary-safe token filter.
///
/// # Examples
///
/// ```
/// use token_filter::core::Context;
/// use token_filter::filter::{FilterOptions, TokenFilter};
///
/// let context: Context = [("city", "Topeka")].into_iter().collect();
/// let mut filter = TokenFilter::new(context, FilterOptions::default()).unwrap();
///
/// let mut out = filter.consume(b"Hello, @ci").unwrap();
/// out.extend(filter.consume(b"ty@!").unwrap());
/// out.extend(filter.finish().unwrap());
/// assert_eq!(out, b"Hello, Topeka!");
/// ```
#[derive(Debug)]
pub struct TokenFilter {
    options: FilterOptions,
    pattern: TokenPattern,
    state: State,
    decoder: Decoder,
    encoder: Encoder,
    /// Unfinished token carried over from the previous chunk.
    fragment: Option<String>,
    finished: bool,
}

impl TokenFilter {
    /// Creates a filter with a directly supplied context.
    ///
    /// Starts in [`Mode::Filtering`], or [`Mode::PassThrough`] if the
    /// context is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the token pattern cannot be built.
    pub fn new(context: Context, options: FilterOptions) -> Result<Self> {
        Self::build(options, State::ready(context))
    }

    /// Creates a filter that queues input until [`Self::context_ready`].
    ///
    /// # Errors
    ///
    /// Returns an error if the token pattern cannot be built.
    pub fn awaiting_context(options: FilterOptions) -> Result<Self> {
        Self::build(
            options,
            State::AwaitingContext {
                queue: VecDeque::new(),
                queued_bytes: 0,
            },
        )
    }

    fn build(options: FilterOptions, state: State) -> Result<Self> {
        let pattern = TokenPattern::new(options.delimiter().clone())?;
        let decoder = options.encoding().new_decoder();
        let encoder = options.encoding().new_encoder();
        tracing::debug!(
            delimiter = %options.delimiter(),
            encoding = %options.encoding(),
            output_encoding = options.encoding().output_name(),
            "token filter created"
        );
        Ok(Self {
            options,
            pattern,
            state,
            decoder,
            encoder,
            fragment: None,
            finished: false,
        })
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        match self.state {
            State::AwaitingContext { .. } => Mode::AwaitingContext,
            State::PassThrough => Mode::PassThrough,
            State::Filtering { .. } => Mode::Filtering,
            State::Failed { .. } => Mode::Failed,
        }
    }

    /// The context in use, once filtering.
    #[must_use]
    pub const fn context(&self) -> Option<&Context> {
        match &self.state {
            State::Filtering { context } => Some(context),
            _ => None,
        }
    }

    /// The options this filter was built with.
    #[must_use]
    pub const fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// The carried-over partial token, if any.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Number of chunks waiting for the context.
    #[must_use]
    pub fn queued_chunks(&self) -> usize {
        match &self.state {
            State::AwaitingContext { queue, .. } => queue.len(),
            _ => 0,
        }
    }

    /// Failure reason, once failed.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            State::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    /// True once [`Self::finish`] has succeeded.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Accepts the next chunk of input and returns the bytes to emit.
    ///
    /// While awaiting the context the chunk is queued and nothing is emitted.
    ///
    /// # Errors
    ///
    /// [`FilterError::Finished`] after [`Self::finish`];
    /// [`FilterError::Rejected`] after a resolution failure.
    pub fn consume(&mut self, chunk: &[u8]) -> Result<Vec<u8>> {
        if self.finished {
            return Err(FilterError::Finished.into());
        }
        match self.mode() {
            Mode::AwaitingContext => {
                self.enqueue(chunk);
                Ok(Vec::new())
            }
            Mode::PassThrough => Ok(chunk.to_vec()),
            Mode::Filtering => Ok(self.filter_chunk(chunk)),
            Mode::Failed => Err(FilterError::Rejected.into()),
        }
    }

    /// Delivers the context-ready event and drains queued input.
    ///
    /// On success the filter switches to [`Mode::Filtering`] (or
    /// [`Mode::PassThrough`] for an empty context) and returns the queued
    /// chunks, in arrival order, transformed by that mode.
    ///
    /// # Errors
    ///
    /// [`FilterError::ContextFailed`] if `resolved` is an error; the filter
    /// is then [`Mode::Failed`] and the queue is discarded.
    /// [`FilterError::ContextAlreadyResolved`] if not awaiting a context.
    pub fn context_ready(&mut self, resolved: Result<Context>) -> Result<Vec<u8>> {
        let queue = match std::mem::replace(&mut self.state, State::PassThrough) {
            State::AwaitingContext { queue, .. } => queue,
            other => {
                self.state = other;
                return Err(FilterError::ContextAlreadyResolved.into());
            }
        };

        match resolved {
            Ok(context) => {
                self.state = State::ready(context);
                tracing::debug!(mode = ?self.mode(), queued = queue.len(), "context ready");
                let mut out = Vec::new();
                for chunk in queue {
                    out.extend(self.emit(&chunk));
                }
                Ok(out)
            }
            Err(err) => {
                let reason = err.to_string();
                tracing::debug!(%reason, dropped = queue.len(), "context resolution failed");
                self.state = State::Failed {
                    reason: reason.clone(),
                };
                Err(FilterError::ContextFailed { reason }.into())
            }
        }
    }

    /// Signals end of input and returns the final bytes.
    ///
    /// Any carried-over fragment is flushed. A fragment is never a complete
    /// token unless the delimiter consists of key characters, in which case
    /// it is replaced like any other token.
    ///
    /// # Errors
    ///
    /// [`FilterError::ContextPending`] while awaiting the context,
    /// [`FilterError::Rejected`] after a failure, [`FilterError::Finished`]
    /// if already finished.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        if self.finished {
            return Err(FilterError::Finished.into());
        }
        match self.mode() {
            Mode::AwaitingContext => return Err(FilterError::ContextPending.into()),
            Mode::Failed => return Err(FilterError::Rejected.into()),
            Mode::PassThrough | Mode::Filtering => {}
        }
        self.finished = true;

        let State::Filtering { context } = &self.state else {
            return Ok(Vec::new());
        };
        let mut text = self.fragment.take().unwrap_or_default();
        text.push_str(&self.decoder.decode(&[], true));
        let scanned = scan(&self.pattern, context, &text, true);
        Ok(self.encoder.encode(&scanned.output, true))
    }

    fn enqueue(&mut self, chunk: &[u8]) {
        let high_water_mark = self.options.high_water_mark();
        if let State::AwaitingContext {
            queue,
            queued_bytes,
        } = &mut self.state
        {
            queue.push_back(chunk.to_vec());
            *queued_bytes += chunk.len();
            if *queued_bytes > high_water_mark {
                tracing::debug!(
                    queued_bytes = *queued_bytes,
                    high_water_mark,
                    "pending input above high water mark"
                );
            }
        }
    }

    fn emit(&mut self, chunk: &[u8]) -> Vec<u8> {
        match self.mode() {
            Mode::Filtering => self.filter_chunk(chunk),
            _ => chunk.to_vec(),
        }
    }

    fn filter_chunk(&mut self, chunk: &[u8]) -> Vec<u8> {
        let State::Filtering { context } = &self.state else {
            return chunk.to_vec();
        };

        let decoded = self.decoder.decode(chunk, false);
        let text = match self.fragment.take() {
            Some(mut fragment) => {
                fragment.push_str(&decoded);
                fragment
            }
            None => decoded,
        };

        let scanned = scan(&self.pattern, context, &text, false);
        self.fragment = scanned.carry;
        self.encoder.encode(&scanned.output, false)
    }
}
