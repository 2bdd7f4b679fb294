//! Character encodings for the filtered stream.
//!
//! Labels resolve through `encoding_rs`, so every WHATWG label is accepted
//! (`utf-8`, `latin1`, `utf-16le`, `shift_jis`, ...). Input chunks are cut
//! wherever the upstream source decides; the [`Decoder`] keeps a split
//! multi-byte sequence until the rest arrives.
//!
//! Output uses the encoding's output encoding: UTF-16 input is written
//! back as UTF-8, as `encoding_rs` has no UTF-16 encoder.

use crate::error::FilterError;
use encoding_rs::{CoderResult, EncoderResult};
use std::fmt;
use std::str::FromStr;

/// A character encoding resolved from a label.
///
/// # Examples
///
/// ```
/// use token_filter::io::Encoding;
///
/// let latin1: Encoding = "ISO-8859-1".parse().unwrap();
/// assert_eq!(latin1.name(), "windows-1252");
/// assert!("ebcdic".parse::<Encoding>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoding(&'static encoding_rs::Encoding);

impl Default for Encoding {
    fn default() -> Self {
        Self(encoding_rs::UTF_8)
    }
}

impl Encoding {
    /// Resolves a WHATWG encoding label (case-insensitive, trimmed).
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownEncoding`] for unknown labels and for
    /// labels of the `replacement` encoding, which cannot carry text.
    pub fn for_label(label: &str) -> Result<Self, FilterError> {
        encoding_rs::Encoding::for_label_no_replacement(label.as_bytes())
            .map(Self)
            .ok_or_else(|| FilterError::UnknownEncoding {
                name: label.to_string(),
            })
    }

    /// Canonical name, e.g. `UTF-8`.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.0.name()
    }

    /// Name of the encoding output is written in.
    #[must_use]
    pub fn output_name(self) -> &'static str {
        self.0.output_encoding().name()
    }

    /// Creates a streaming decoder. A byte order mark is treated as text.
    #[must_use]
    pub fn new_decoder(self) -> Decoder {
        Decoder {
            encoding: self,
            inner: self.0.new_decoder_without_bom_handling(),
        }
    }

    /// Creates a streaming encoder for the output encoding.
    #[must_use]
    pub fn new_encoder(self) -> Encoder {
        Encoder {
            encoding: self,
            inner: self.0.new_encoder(),
        }
    }
}

impl FromStr for Encoding {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::for_label(s)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Streaming decoder that carries incomplete sequences across chunks.
///
/// Malformed input becomes U+FFFD.
///
/// # Examples
///
/// ```
/// use token_filter::io::Encoding;
///
/// let mut decoder = Encoding::default().new_decoder();
/// let euro = "\u{20ac}".as_bytes();
/// assert_eq!(decoder.decode(&euro[..1], false), "");
/// assert_eq!(decoder.decode(&euro[1..], false), "\u{20ac}");
/// assert_eq!(decoder.decode(&[], true), "");
/// ```
pub struct Decoder {
    encoding: Encoding,
    inner: encoding_rs::Decoder,
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

impl Decoder {
    /// Decodes the next chunk. Pass `last = true` once, at end of input,
    /// to flush a truncated trailing sequence as U+FFFD.
    pub fn decode(&mut self, chunk: &[u8], last: bool) -> String {
        let mut out = String::new();
        let mut rest = chunk;
        loop {
            let needed = self
                .inner
                .max_utf8_buffer_length(rest.len())
                .unwrap_or(rest.len().saturating_mul(3).saturating_add(16));
            out.reserve(needed);
            let (result, read, _) = self.inner.decode_to_string(rest, &mut out, last);
            rest = &rest[read..];
            match result {
                CoderResult::InputEmpty => return out,
                CoderResult::OutputFull => {}
            }
        }
    }
}

/// Streaming encoder for filtered output.
///
/// Characters the output encoding cannot represent are written as `?`.
pub struct Encoder {
    encoding: Encoding,
    inner: encoding_rs::Encoder,
}

impl fmt::Debug for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

impl Encoder {
    /// Encodes the next piece of text. Pass `last = true` once, at end of
    /// output, so stateful encodings can return to their initial state.
    pub fn encode(&mut self, text: &str, last: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len() + 16);
        let mut rest = text;
        loop {
            let (result, read) =
                self.inner
                    .encode_from_utf8_to_vec_without_replacement(rest, &mut out, last);
            rest = &rest[read..];
            match result {
                EncoderResult::InputEmpty => return out,
                EncoderResult::OutputFull => out.reserve(rest.len() + 16),
                EncoderResult::Unmappable(_) => out.push(b'?'),
            }
        }
    }
}
