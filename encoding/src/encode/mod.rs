//! Encoding of DICOM attribute and item headers to a byte stream.

use byteordered::Endianness;
use dicom_stream_core::header::DataElementHeader;
use dicom_stream_core::Tag;
use snafu::{Backtrace, ResultExt, Snafu};
use std::io::{self, Write};

pub mod basic;
pub mod explicit_le;

/// Module-level error type: for errors which may occur while encoding a
/// header to a byte stream.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Failed to write a tag.
    #[snafu(display("failed to write tag: {}", source))]
    WriteTag {
        backtrace: Option<Backtrace>,
        source: io::Error,
    },

    /// Failed to write an attribute header.
    #[snafu(display("failed to write element header: {}", source))]
    WriteHeader {
        backtrace: Option<Backtrace>,
        source: io::Error,
    },

    /// Failed to write an item header.
    #[snafu(display("failed to write item header: {}", source))]
    WriteItemHeader {
        backtrace: Option<Backtrace>,
        source: io::Error,
    },

    /// Failed to write an item delimiter.
    #[snafu(display("failed to write item delimiter: {}", source))]
    WriteItemDelimiter {
        backtrace: Option<Backtrace>,
        source: io::Error,
    },

    /// Failed to write a sequence delimiter.
    #[snafu(display("failed to write sequence delimiter: {}", source))]
    WriteSequenceDelimiter {
        backtrace: Option<Backtrace>,
        source: io::Error,
    },

    /// Failed to write raw value bytes.
    #[snafu(display("failed to write value bytes: {}", source))]
    WriteBytes {
        backtrace: Option<Backtrace>,
        source: io::Error,
    },
}

/// Type alias for a result from this module.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Type trait for an encoder of basic numeric properties. Unlike
/// [`Encode`], this trait is not object safe, but it doesn't need to
/// be: this codec only ever instantiates its little endian form.
pub trait BasicEncode {
    /// Retrieve the encoder's endianness.
    fn endianness(&self) -> Endianness;

    /// Encode an unsigned short value to the given writer.
    fn encode_us<W>(&self, to: W, value: u16) -> io::Result<()>
    where
        W: Write;

    /// Encode an unsigned long value to the given writer.
    fn encode_ul<W>(&self, to: W, value: u32) -> io::Result<()>
    where
        W: Write;
}

/// Type trait for an encoder of DICOM attribute and item headers, plus
/// the raw bytes of an attribute's value. This codec never interprets
/// those bytes; it writes exactly what the caller hands it.
pub trait Encode {
    /// Encode and write a bare attribute tag.
    fn encode_tag<W>(&self, to: W, tag: Tag) -> Result<()>
    where
        W: Write;

    /// Encode and write an attribute header. Returns the number of
    /// bytes written.
    fn encode_element_header<W>(&self, to: W, de: DataElementHeader) -> Result<usize>
    where
        W: Write;

    /// Encode and write an item-start header with the given declared
    /// length (which may be the undefined-length sentinel).
    fn encode_item_header<W>(&self, to: W, len: u32) -> Result<()>
    where
        W: Write;

    /// Encode and write an item delimiter.
    fn encode_item_delimiter<W>(&self, mut to: W) -> Result<()>
    where
        W: Write,
    {
        self.encode_tag(&mut to, Tag(0xFFFE, 0xE00D))?;
        to.write_all(&[0u8; 4]).context(WriteItemDelimiterSnafu)
    }

    /// Encode and write a sequence delimiter.
    fn encode_sequence_delimiter<W>(&self, mut to: W) -> Result<()>
    where
        W: Write,
    {
        self.encode_tag(&mut to, Tag(0xFFFE, 0xE0DD))?;
        to.write_all(&[0u8; 4]).context(WriteSequenceDelimiterSnafu)
    }

    /// Write a chunk of raw value bytes verbatim. Returns the number of
    /// bytes written (always `chunk.len()` on success).
    fn encode_bytes<W>(&self, mut to: W, chunk: &[u8]) -> Result<usize>
    where
        W: Write,
    {
        to.write_all(chunk).context(WriteBytesSnafu)?;
        Ok(chunk.len())
    }
}

impl<T: ?Sized> Encode for &T
where
    T: Encode,
{
    fn encode_tag<W>(&self, to: W, tag: Tag) -> Result<()>
    where
        W: Write,
    {
        (**self).encode_tag(to, tag)
    }

    fn encode_element_header<W>(&self, to: W, de: DataElementHeader) -> Result<usize>
    where
        W: Write,
    {
        (**self).encode_element_header(to, de)
    }

    fn encode_item_header<W>(&self, to: W, len: u32) -> Result<()>
    where
        W: Write,
    {
        (**self).encode_item_header(to, len)
    }
}

impl<T: ?Sized> Encode for Box<T>
where
    T: Encode,
{
    fn encode_tag<W>(&self, to: W, tag: Tag) -> Result<()>
    where
        W: Write,
    {
        (**self).encode_tag(to, tag)
    }

    fn encode_element_header<W>(&self, to: W, de: DataElementHeader) -> Result<usize>
    where
        W: Write,
    {
        (**self).encode_element_header(to, de)
    }

    fn encode_item_header<W>(&self, to: W, len: u32) -> Result<()>
    where
        W: Write,
    {
        (**self).encode_item_header(to, len)
    }
}
