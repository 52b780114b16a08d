#![deny(trivial_casts, trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    unused_import_braces
)]

//! Core types for a streaming DICOM event model.
//!
//! This crate defines the vocabulary shared by the wire codec and the
//! stateful reader/writer: the attribute [`Tag`], the [`VR`] (value
//! representation) enumeration and its short/long-form classification, the
//! [`Length`] type (which models the undefined-length sentinel used by
//! sequences and encapsulated pixel data), and [`DataElementHeader`] /
//! [`SequenceItemHeader`], the two header shapes a reader ever produces.
//!
//! This crate does not perform I/O and does not interpret element values:
//! it is purely the set of types that the wire codec decodes into and that
//! the stateful reader hands back to callers.

pub mod error;
pub mod header;

pub use error::{Error, ErrorKind, Result};
pub use header::{DataElementHeader, Header, Length, SequenceItemHeader, Tag, VrForm, VR};
