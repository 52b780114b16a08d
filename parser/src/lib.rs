#![deny(trivial_casts, trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    unused_qualifications,
    unused_import_braces
)]

//! The streaming reader and writer for the DICOM event model.
//!
//! This crate wires [`dicom_stream_core`]'s vocabulary (tags, VRs,
//! lengths, headers) and [`dicom_stream_encoding`]'s wire codec into a
//! pull-based [`reader::Reader`] and a push-based [`writer::Writer`],
//! each driven by the shared [`event::Event`] vocabulary. Neither type
//! interprets an attribute's value bytes, resolves a transfer syntax
//! registry, or does anything with a file-meta preamble — those are
//! left to the caller, per the scope this crate covers.

pub mod error;
pub mod event;
pub mod reader;
pub mod writer;

mod position;

pub use dicom_stream_core::{Error, ErrorKind, Result};
pub use event::Event;
pub use reader::{Reader, EXPLICIT_VR_LITTLE_ENDIAN};
pub use writer::Writer;
