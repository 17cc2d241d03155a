//! Binary document reader/writer primitives.
//!
//! A document is an ordered sequence of named, typed fields terminated by an
//! end marker. Generated codecs drive these traits directly; they never touch
//! raw bytes themselves. [`raw`] provides the in-memory implementation of the
//! binary layout.

pub mod raw;

use std::fmt;

use thiserror::Error;

/// Result alias for wire-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by document readers and writers.
///
/// Decode-time failures on malformed or truncated input originate here and
/// are propagated through codecs unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// The input ended before a complete value could be read.
    #[error("unexpected end of document bytes")]
    UnexpectedEof,

    /// An element tag byte that names no known element type.
    #[error("invalid element type tag 0x{0:02x}")]
    InvalidTag(u8),

    /// A string or name that is not valid UTF-8.
    #[error("document contains invalid UTF-8")]
    InvalidUtf8,

    /// The reader or writer was driven out of protocol order.
    #[error("invalid {side} state: expected {expected}")]
    InvalidState {
        side: &'static str,
        expected: &'static str,
    },

    /// A typed read found a different element type on the wire.
    #[error("expected element type {expected:?} but found {actual:?}")]
    UnexpectedElementType {
        expected: ElementType,
        actual: ElementType,
    },

    /// A type-erased codec received a value of the wrong concrete type.
    #[error("value passed to codec is not a '{expected}'")]
    UnexpectedValueType { expected: &'static str },
}

impl Error {
    pub(crate) fn reader_state(expected: &'static str) -> Self {
        Self::InvalidState {
            side: "reader",
            expected,
        }
    }

    pub(crate) fn writer_state(expected: &'static str) -> Self {
        Self::InvalidState {
            side: "writer",
            expected,
        }
    }
}

/// On-the-wire element type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementType {
    /// Terminates a document or array; never carries a name or value.
    EndOfDocument = 0x00,
    Double = 0x01,
    String = 0x02,
    Document = 0x03,
    Array = 0x04,
    Boolean = 0x08,
    Int32 = 0x10,
    Int64 = 0x12,
}

impl ElementType {
    /// Decode a tag byte.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0x00 => Ok(Self::EndOfDocument),
            0x01 => Ok(Self::Double),
            0x02 => Ok(Self::String),
            0x03 => Ok(Self::Document),
            0x04 => Ok(Self::Array),
            0x08 => Ok(Self::Boolean),
            0x10 => Ok(Self::Int32),
            0x12 => Ok(Self::Int64),
            other => Err(Error::InvalidTag(other)),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Write access to a binary document stream.
///
/// Non-reentrant: one writer serves one encode call at a time. Nested
/// documents and arrays are opened with the corresponding `write_start_*`
/// call after the field name has been written; array elements are named
/// automatically by the writer.
pub trait DocumentWriter {
    fn write_start_document(&mut self) -> Result<()>;
    fn write_end_document(&mut self) -> Result<()>;
    fn write_start_array(&mut self) -> Result<()>;
    fn write_end_array(&mut self) -> Result<()>;

    /// Write the name of the next field. Must precede exactly one value
    /// write (or a nested start) inside a document.
    fn write_name(&mut self, name: &str) -> Result<()>;

    fn write_boolean(&mut self, value: bool) -> Result<()>;
    fn write_int32(&mut self, value: i32) -> Result<()>;
    fn write_int64(&mut self, value: i64) -> Result<()>;
    fn write_double(&mut self, value: f64) -> Result<()>;
    fn write_string(&mut self, value: &str) -> Result<()>;
}

/// Read access to a binary document stream.
///
/// The per-field protocol is `read_element_type`, then `read_name`, then
/// exactly one typed read (or [`DocumentReader::skip_value`]). A returned
/// [`ElementType::EndOfDocument`] ends the field loop and is confirmed with
/// `read_end_document` / `read_end_array`.
pub trait DocumentReader {
    fn read_start_document(&mut self) -> Result<()>;
    fn read_end_document(&mut self) -> Result<()>;
    fn read_start_array(&mut self) -> Result<()>;
    fn read_end_array(&mut self) -> Result<()>;

    /// Read the next field's element type tag.
    fn read_element_type(&mut self) -> Result<ElementType>;

    /// Read the current field's name.
    fn read_name(&mut self) -> Result<String>;

    /// Discard the current field's value unread.
    fn skip_value(&mut self) -> Result<()>;

    fn read_boolean(&mut self) -> Result<bool>;
    fn read_int32(&mut self) -> Result<i32>;
    fn read_int64(&mut self) -> Result<i64>;
    fn read_double(&mut self) -> Result<f64>;
    fn read_string(&mut self) -> Result<String>;
}
