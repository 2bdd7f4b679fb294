//! Filter construction options.

use crate::core::Delimiter;
use crate::io::Encoding;

/// Default buffering threshold in bytes (64 KiB, same as a file read stream).
pub const DEFAULT_HIGH_WATER_MARK: usize = 64 * 1024;

/// Options for a [`TokenFilter`](crate::filter::TokenFilter).
///
/// # Examples
///
/// ```
/// use token_filter::core::Delimiter;
/// use token_filter::filter::FilterOptions;
///
/// let options = FilterOptions::new()
///     .with_delimiter(Delimiter::new("__").unwrap())
///     .with_high_water_mark(16 * 1024);
/// assert_eq!(options.delimiter().as_str(), "__");
/// assert_eq!(options.high_water_mark(), 16 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    delimiter: Delimiter,
    encoding: Encoding,
    high_water_mark: usize,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterOptions {
    /// Default options: `@` delimiter, UTF-8, 64 KiB high-water mark.
    #[must_use]
    pub fn new() -> Self {
        Self {
            delimiter: Delimiter::default(),
            encoding: Encoding::default(),
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
        }
    }

    /// Sets the token delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the character encoding.
    #[must_use]
    pub const fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the high-water mark. Zero restores the default.
    #[must_use]
    pub const fn with_high_water_mark(mut self, bytes: usize) -> Self {
        self.high_water_mark = if bytes == 0 {
            DEFAULT_HIGH_WATER_MARK
        } else {
            bytes
        };
        self
    }

    /// The token delimiter.
    #[must_use]
    pub const fn delimiter(&self) -> &Delimiter {
        &self.delimiter
    }

    /// The character encoding.
    #[must_use]
    pub const fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The high-water mark in bytes: the read size of a pipe and the
    /// queue size above which pending input is logged. Not a hard cap.
    #[must_use]
    pub const fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FilterOptions::default();
        assert_eq!(options.delimiter().as_str(), "@");
        assert_eq!(options.encoding().name(), "UTF-8");
        assert_eq!(options.high_water_mark(), 65536);
    }

    #[test]
    fn test_zero_high_water_mark_means_default() {
        let options = FilterOptions::new().with_high_water_mark(0);
        assert_eq!(options.high_water_mark(), DEFAULT_HIGH_WATER_MARK);
    }

    #[test]
    fn test_with_encoding() {
        let latin1 = Encoding::for_label("latin1").unwrap();
        let options = FilterOptions::new().with_encoding(latin1);
        assert_eq!(options.encoding(), latin1);
    }
}
