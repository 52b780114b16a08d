//! Error taxonomy shared by the wire codec and the stateful reader/writer.
//!
//! Every fault the core can detect is represented here rather than as a
//! generic string, so that callers can match on `kind()` instead of
//! parsing a message.

use crate::header::Tag;
use snafu::Snafu;
use std::io;

/// Type alias for a result from this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The taxonomy of faults the core can report: `Io`, `UnexpectedEof`,
/// `InvalidVr`, `ReservedNotZero`, `InvalidLength`, `OutOfOrder`,
/// `InvalidArgument`.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// A lower-level I/O failure from the byte source, propagated verbatim.
    #[snafu(display("I/O error at byte offset {position}: {source}"))]
    Io { position: u64, source: io::Error },

    /// Fewer bytes than required were available mid-header or mid-value.
    #[snafu(display(
        "unexpected end of stream at byte offset {position}, needed {needed} more byte(s)"
    ))]
    UnexpectedEof { position: u64, needed: usize },

    /// The two VR bytes were not both uppercase ASCII letters.
    #[snafu(display("invalid value representation bytes {bytes:?} at byte offset {position}"))]
    InvalidVr { position: u64, bytes: [u8; 2] },

    /// The long-form header's two reserved bytes were not both zero.
    #[snafu(display(
        "reserved field of long-form header at byte offset {position} is nonzero: {value:#06x}"
    ))]
    ReservedNotZero { position: u64, value: u16 },

    /// The length was odd where an even length is required, or the
    /// undefined-length sentinel was used on a VR/tag that disallows it.
    #[snafu(display(
        "invalid value length {length:#010x} for tag {tag} at byte offset {position}: {reason}"
    ))]
    InvalidLength {
        position: u64,
        tag: Tag,
        length: u32,
        reason: &'static str,
    },

    /// An attribute tag was not strictly greater than the previous tag
    /// decoded within the same item.
    #[snafu(display(
        "tag {tag} at byte offset {position} is not greater than the previous tag {previous}"
    ))]
    OutOfOrder {
        position: u64,
        previous: Tag,
        tag: Tag,
    },

    /// The caller passed a malformed descriptor to the writer.
    #[snafu(display("invalid argument: {reason}"))]
    InvalidArgument { reason: &'static str },
}

impl Error {
    /// A short, stable name for the kind of fault, independent of the
    /// dynamic fields carried by the variant. Useful for tests and for
    /// callers that want to branch on fault category without a full
    /// pattern match.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::UnexpectedEof { .. } => ErrorKind::UnexpectedEof,
            Error::InvalidVr { .. } => ErrorKind::InvalidVr,
            Error::ReservedNotZero { .. } => ErrorKind::ReservedNotZero,
            Error::InvalidLength { .. } => ErrorKind::InvalidLength,
            Error::OutOfOrder { .. } => ErrorKind::OutOfOrder,
            Error::InvalidArgument { .. } => ErrorKind::InvalidArgument,
        }
    }
}

/// The stable, field-less counterpart of [`Error`]'s variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`Error::Io`].
    Io,
    /// See [`Error::UnexpectedEof`].
    UnexpectedEof,
    /// See [`Error::InvalidVr`].
    InvalidVr,
    /// See [`Error::ReservedNotZero`].
    ReservedNotZero,
    /// See [`Error::InvalidLength`].
    InvalidLength,
    /// See [`Error::OutOfOrder`].
    OutOfOrder,
    /// See [`Error::InvalidArgument`].
    InvalidArgument,
}
