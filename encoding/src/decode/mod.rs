//! Decoding of DICOM attribute and item headers from a byte stream.

use byteordered::Endianness;
use dicom_stream_core::header::{DataElementHeader, SequenceItemHeader};
use dicom_stream_core::Tag;
use snafu::{Backtrace, Snafu};
use std::io::{self, Read};

pub mod basic;
pub mod explicit_le;

/// Module-level error type: for errors which may occur while decoding a
/// header from a byte stream.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read the header's tag field.
    #[snafu(display("failed to read the header's tag field: {}", source))]
    ReadHeaderTag {
        backtrace: Option<Backtrace>,
        source: io::Error,
    },

    /// Failed to read an item header.
    #[snafu(display("failed to read the item header: {}", source))]
    ReadItemHeader {
        backtrace: Option<Backtrace>,
        source: io::Error,
    },

    /// Failed to read an item delimiter's length field.
    #[snafu(display("failed to read the item's length field: {}", source))]
    ReadItemLength {
        backtrace: Option<Backtrace>,
        source: io::Error,
    },

    /// Failed to read a bare tag.
    #[snafu(display("failed to read the tag field: {}", source))]
    ReadTag {
        backtrace: Option<Backtrace>,
        source: io::Error,
    },

    /// Failed to read the long-form header's reserved bytes.
    #[snafu(display("failed to read the header's reserved bytes: {}", source))]
    ReadReserved {
        backtrace: Option<Backtrace>,
        source: io::Error,
    },

    /// Failed to read the header's value length field.
    #[snafu(display("failed to read the header's length field: {}", source))]
    ReadLength {
        backtrace: Option<Backtrace>,
        source: io::Error,
    },

    /// Failed to read the header's two VR bytes.
    #[snafu(display("failed to read the header's value representation: {}", source))]
    ReadVr {
        backtrace: Option<Backtrace>,
        source: io::Error,
    },

    /// The decoded tag/length pair does not describe a recognized item,
    /// item delimiter, or sequence delimiter.
    #[snafu(display(
        "bad sequence item header: tag {} with length {:#010x} is not a valid item, \
         item delimiter or sequence delimiter",
        tag,
        len
    ))]
    BadSequenceHeader { tag: Tag, len: u32 },

    /// The two VR bytes of a header were not both uppercase ASCII letters.
    #[snafu(display("invalid value representation bytes {bytes:?}"))]
    InvalidVr { bytes: [u8; 2] },

    /// The long-form header's two reserved bytes were not both zero.
    #[snafu(display("reserved field of long-form header is nonzero: {value:#06x}"))]
    ReservedNotZero { value: u16 },
}

/// Type alias for a result from this module.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Type trait for reading basic numeric values from a byte stream,
/// honoring a fixed endianness. Unlike [`Decode`], this trait is not
/// object safe, but it doesn't need to be: there are only ever two
/// possible implementations, little endian and big endian, and this
/// codec only ever instantiates the little endian one.
pub trait BasicDecode {
    /// Retrieve the source's endianness, as expected by this decoder.
    fn endianness(&self) -> Endianness;

    /// Decode an unsigned short value from the given source.
    fn decode_us<S>(&self, source: S) -> io::Result<u16>
    where
        S: Read;

    /// Decode an unsigned long value from the given source.
    fn decode_ul<S>(&self, source: S) -> io::Result<u32>
    where
        S: Read;

    /// Decode a DICOM attribute tag from the given source.
    fn decode_tag<S>(&self, mut source: S) -> io::Result<Tag>
    where
        S: Read,
    {
        let g = self.decode_us(&mut source)?;
        let e = self.decode_us(source)?;
        Ok(Tag(g, e))
    }
}

/// Type trait for reading and decoding DICOM attribute and item headers.
///
/// Decoding an item or sequence delimiter tag is valid input and must be
/// handled: the value representation returned for those is `UN`, since
/// delimiters carry no VR of their own on the wire.
pub trait Decode {
    /// Fetch and decode the next attribute header from the given
    /// source. At the end of this operation, the source points at the
    /// start of the attribute's value data (or, for a sequence/pixel
    /// data with undefined length, at the first nested item). Returns
    /// the header and the exact number of bytes consumed.
    fn decode_header<S>(&self, source: &mut S) -> Result<(DataElementHeader, usize)>
    where
        S: ?Sized + Read;

    /// Fetch and decode the next item-level header (an item start, an
    /// item delimiter, or a sequence delimiter) from the given source.
    /// This is a separate method because item headers carry no VR.
    fn decode_item_header<S>(&self, source: &mut S) -> Result<SequenceItemHeader>
    where
        S: ?Sized + Read;

    /// Decode a bare DICOM attribute tag from the given source.
    fn decode_tag<S>(&self, source: &mut S) -> Result<Tag>
    where
        S: ?Sized + Read;
}

impl<T: ?Sized> Decode for Box<T>
where
    T: Decode,
{
    fn decode_header<S>(&self, source: &mut S) -> Result<(DataElementHeader, usize)>
    where
        S: ?Sized + Read,
    {
        (**self).decode_header(source)
    }

    fn decode_item_header<S>(&self, source: &mut S) -> Result<SequenceItemHeader>
    where
        S: ?Sized + Read,
    {
        (**self).decode_item_header(source)
    }

    fn decode_tag<S>(&self, source: &mut S) -> Result<Tag>
    where
        S: ?Sized + Read,
    {
        (**self).decode_tag(source)
    }
}

impl<'a, T: ?Sized> Decode for &'a T
where
    T: Decode,
{
    fn decode_header<S>(&self, source: &mut S) -> Result<(DataElementHeader, usize)>
    where
        S: ?Sized + Read,
    {
        (**self).decode_header(source)
    }

    fn decode_item_header<S>(&self, source: &mut S) -> Result<SequenceItemHeader>
    where
        S: ?Sized + Read,
    {
        (**self).decode_item_header(source)
    }

    fn decode_tag<S>(&self, source: &mut S) -> Result<Tag>
    where
        S: ?Sized + Read,
    {
        (**self).decode_tag(source)
    }
}
