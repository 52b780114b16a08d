//! Error handling for the reader and writer.
//!
//! Both ends of the event stream report faults through
//! [`dicom_stream_core::Error`]; this module only bridges the lower-level
//! wire-codec errors into that single taxonomy, attaching the stream
//! position at which the fault was observed.

use dicom_stream_core::error::{
    InvalidLengthSnafu, InvalidVrSnafu, IoSnafu, ReservedNotZeroSnafu, UnexpectedEofSnafu,
};
pub use dicom_stream_core::{Error, Result};
use snafu::IntoError;
use std::io;

/// Turn a header-decoding fault into the crate-wide error type, recording
/// the stream position at which the read was attempted.
///
/// The first element of the pair is true when the failure happened while
/// reading the very first field of a header (the tag itself); a caller
/// waiting for the next token at a scope boundary uses that to tell a
/// clean end of stream apart from a truncated one.
pub(crate) fn from_decode_error(
    position: u64,
    err: dicom_stream_encoding::decode::Error,
) -> (bool, Error) {
    use dicom_stream_encoding::decode::Error as D;
    match err {
        D::ReadHeaderTag { source, .. } => (true, io_or_eof(position, source, 4)),
        D::ReadItemHeader { source, .. } => (true, io_or_eof(position, source, 8)),
        D::ReadItemLength { source, .. } => (false, io_or_eof(position, source, 4)),
        D::ReadTag { source, .. } => (true, io_or_eof(position, source, 4)),
        D::ReadReserved { source, .. } => (false, io_or_eof(position, source, 2)),
        D::ReadLength { source, .. } => (false, io_or_eof(position, source, 4)),
        D::ReadVr { source, .. } => (false, io_or_eof(position, source, 2)),
        D::BadSequenceHeader { tag, len } => (
            false,
            InvalidLengthSnafu {
                position,
                tag,
                length: len,
                reason: "tag/length is not a valid item, item delimiter, or sequence delimiter",
            }
            .build(),
        ),
        D::InvalidVr { bytes } => (false, InvalidVrSnafu { position, bytes }.build()),
        D::ReservedNotZero { value } => (false, ReservedNotZeroSnafu { position, value }.build()),
    }
}

/// Turn a header/value-encoding fault into the crate-wide error type.
pub(crate) fn from_encode_error(position: u64, err: dicom_stream_encoding::encode::Error) -> Error {
    use dicom_stream_encoding::encode::Error as E;
    let source = match err {
        E::WriteTag { source, .. } => source,
        E::WriteHeader { source, .. } => source,
        E::WriteItemHeader { source, .. } => source,
        E::WriteItemDelimiter { source, .. } => source,
        E::WriteSequenceDelimiter { source, .. } => source,
        E::WriteBytes { source, .. } => source,
    };
    IoSnafu { position }.into_error(source)
}

fn io_or_eof(position: u64, source: io::Error, needed: usize) -> Error {
    if source.kind() == io::ErrorKind::UnexpectedEof {
        UnexpectedEofSnafu { position, needed }.build()
    } else {
        IoSnafu { position }.into_error(source)
    }
}
