//! Token scan-and-replace over one piece of text.
//!
//! Scans left to right, replacing every complete token. Unless the input
//! has ended, a trailing suffix that could still become a token is not
//! emitted but returned as carry-over, to be prepended to the next chunk.

use crate::core::{Context, TokenPattern};

/// Result of scanning one piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scanned {
    /// Text ready to emit, tokens replaced.
    pub output: String,
    /// Held suffix starting at an unfinished token, if any.
    pub carry: Option<String>,
}

/// Scans `text`, replacing tokens found in `context`.
///
/// Tokens whose key is missing from `context` are emitted unchanged,
/// delimiters included. When `at_end` is false the earliest suffix that
/// could still grow into a token is held back as [`Scanned::carry`].
#[must_use]
pub fn scan(pattern: &TokenPattern, context: &Context, text: &str, at_end: bool) -> Scanned {
    let mut output = String::with_capacity(text.len());
    let mut pos = 0;
    let mut hold = if at_end {
        None
    } else {
        pattern.open_token_start(text, 0)
    };

    loop {
        // A replaced token may have swallowed the held position.
        if let Some(start) = hold
            && start < pos
        {
            hold = pattern.open_token_start(text, pos);
        }
        let limit = hold.unwrap_or(text.len());

        match pattern.find_at(text, pos) {
            Some(token) if token.start < limit => {
                output.push_str(&text[pos..token.start]);
                output.push_str(context.get(token.key).unwrap_or(token.text));
                pos = token.end;
            }
            _ => {
                output.push_str(&text[pos..limit]);
                return Scanned {
                    output,
                    carry: hold.map(|start| text[start..].to_string()),
                };
            }
        }
    }
}

/// Replaces all tokens in a complete text.
///
/// Equivalent to feeding `text` as a single chunk and finishing.
#[must_use]
pub fn replace_tokens(pattern: &TokenPattern, context: &Context, text: &str) -> String {
    scan(pattern, context, text, true).output
}
