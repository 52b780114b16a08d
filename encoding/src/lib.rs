#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]
//! The Explicit VR Little Endian wire codec.
//!
//! This crate turns a byte stream into the tag/VR/length triples of
//! [`DataElementHeader`](dicom_stream_core::DataElementHeader) and
//! [`SequenceItemHeader`](dicom_stream_core::SequenceItemHeader), and back.
//! It never reads or writes an attribute's value payload: that is left
//! to the caller, since this crate has no notion of what the bytes
//! between headers mean.
//!
//! Only the Explicit VR Little Endian transfer syntax is supported, in
//! line with the scope of the streaming reader/writer this codec
//! serves.

pub mod decode;
pub mod encode;

pub use byteordered::Endianness;
pub use decode::explicit_le::ExplicitVRLittleEndianDecoder;
pub use decode::Decode;
pub use encode::explicit_le::ExplicitVRLittleEndianEncoder;
pub use encode::Encode;
