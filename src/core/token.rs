//! Token delimiters and the token pattern.
//!
//! A token is `delimiter + word characters + delimiter`, where word
//! characters are ASCII letters, digits and underscore. The same delimiter
//! opens and closes a token.

use crate::error::FilterError;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Default token delimiter.
pub const DEFAULT_DELIMITER: &str = "@";

/// Character class for token keys.
const WORD_CLASS: &str = "[0-9A-Za-z_]";

/// Returns true for bytes that may appear in a token key.
#[must_use]
pub const fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// A non-empty token delimiter.
///
/// # Examples
///
/// ```
/// use token_filter::core::Delimiter;
///
/// assert_eq!(Delimiter::default().as_str(), "@");
/// assert!(Delimiter::new("__").is_ok());
/// assert!(Delimiter::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Delimiter(String);

impl Delimiter {
    /// Creates a delimiter, rejecting the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::EmptyDelimiter`] if `delimiter` is empty.
    pub fn new(delimiter: impl Into<String>) -> Result<Self, FilterError> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(FilterError::EmptyDelimiter);
        }
        Ok(Self(delimiter))
    }

    /// Returns the delimiter text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Self(DEFAULT_DELIMITER.to_string())
    }
}

impl FromStr for Delimiter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A complete token found in a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'t> {
    /// Byte offset of the opening delimiter.
    pub start: usize,
    /// Byte offset just past the closing delimiter.
    pub end: usize,
    /// The key between the delimiters.
    pub key: &'t str,
    /// The whole token, delimiters included.
    pub text: &'t str,
}

/// Compiled token pattern for a delimiter.
#[derive(Debug, Clone)]
pub struct TokenPattern {
    delimiter: Delimiter,
    regex: Regex,
}

impl TokenPattern {
    /// Compiles the pattern for `delimiter`.
    ///
    /// The delimiter is matched literally; regex metacharacters are escaped.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidPattern`] if the regex fails to compile.
    pub fn new(delimiter: Delimiter) -> Result<Self, FilterError> {
        let escaped = regex::escape(delimiter.as_str());
        let regex = Regex::new(&format!("{escaped}({WORD_CLASS}+){escaped}"))?;
        Ok(Self { delimiter, regex })
    }

    /// Returns the delimiter this pattern was built from.
    #[must_use]
    pub const fn delimiter(&self) -> &Delimiter {
        &self.delimiter
    }

    /// Finds the leftmost complete token starting at or after `start`.
    #[must_use]
    pub fn find_at<'t>(&self, text: &'t str, start: usize) -> Option<Token<'t>> {
        let found = self.regex.find_at(text, start)?;
        let width = self.delimiter.len();
        Some(Token {
            start: found.start(),
            end: found.end(),
            key: &text[found.start() + width..found.end() - width],
            text: found.as_str(),
        })
    }

    /// Finds where an unfinished token begins at the end of `text`.
    ///
    /// Returns the earliest offset `>= from` whose suffix could still grow
    /// into a token (or a longer token) once more input arrives: a partial
    /// delimiter at the very end, or a delimiter followed only by key
    /// characters and optionally a partial closing delimiter.
    #[must_use]
    pub fn open_token_start(&self, text: &str, from: usize) -> Option<usize> {
        let width = self.delimiter.len();
        // Bytes at or past `guard` may belong to a partial closing delimiter.
        let guard = text.len().saturating_sub(width - 1);
        let floor = text.as_bytes()[..guard]
            .iter()
            .rposition(|b| !is_word_byte(*b))
            .map_or(0, |i| (i + 1).saturating_sub(width));

        (from.max(floor)..text.len())
            .filter(|&pos| text.is_char_boundary(pos))
            .find(|&pos| self.is_open_token(&text[pos..]))
    }

    fn is_open_token(&self, suffix: &str) -> bool {
        let delimiter = self.delimiter.as_str();
        if suffix.len() < delimiter.len() {
            return delimiter.starts_with(suffix);
        }
        let Some(rest) = suffix.strip_prefix(delimiter) else {
            return false;
        };
        let key_len = rest.bytes().take_while(|b| is_word_byte(*b)).count();
        if key_len == rest.len() {
            return true;
        }
        (1..=key_len).any(|split| {
            let tail = &rest[split..];
            tail.len() < delimiter.len() && delimiter.starts_with(tail)
        })
    }
}
