//! The event vocabulary shared by the reader and the writer.

use dicom_stream_core::header::{DataElementHeader, Length};
use dicom_stream_core::{Error, Tag};

/// One token of the stream a [`Reader`](crate::reader::Reader) produces
/// and a [`Writer`](crate::writer::Writer) consumes.
///
/// A complete stream follows the grammar:
///
/// ```text
/// Stream     := StartModel Attribute* EndModel Eof
/// Attribute  := StartAttribute Value* EndAttribute
///             | StartSequence Item* EndSequence
///             | StartFragments Fragment* EndFragments
/// Item       := StartItem Attribute* EndItem
/// Fragment   := StartFragment Value* EndFragment
/// ```
///
/// `Value` is a signal, not a payload: it tells the caller that the
/// attribute's raw bytes are now available to be pulled, one chunk at a
/// time, through [`Reader::read_value`](crate::reader::Reader::read_value)
/// (or pushed through [`Writer::write_value`](crate::writer::Writer::write_value)).
/// Carrying the bytes on the event itself would force every value, no
/// matter how large, to be buffered whole before it could be reported.
#[derive(Debug)]
pub enum Event {
    /// The start of the data set. Always the first event of a stream.
    StartModel,
    /// The end of the data set, once every top-level attribute has been
    /// reported.
    EndModel,
    /// The header of a primitive (non-sequence, non-fragmented)
    /// attribute.
    StartAttribute(DataElementHeader),
    /// The close of a primitive attribute, once its value has been fully
    /// drained. A no-op in this binary encoding, but a symmetry point a
    /// textual renderer would hook into.
    EndAttribute,
    /// Signals that a chunk of the currently open value (attribute or
    /// fragment) is available to be read or is expected to be written.
    Value,
    /// The header of a sequence-of-items attribute.
    StartSequence {
        /// the sequence attribute's tag
        tag: Tag,
        /// the sequence's declared length (may be undefined)
        len: Length,
    },
    /// The close of a sequence, once every item has been reported.
    EndSequence,
    /// The start of one item within a sequence.
    StartItem {
        /// the item's declared length (may be undefined)
        len: Length,
    },
    /// The close of an item.
    EndItem,
    /// The start of an encapsulated (fragmented) pixel data attribute.
    StartFragments {
        /// the pixel data attribute's tag
        tag: Tag,
    },
    /// The close of a fragment sequence.
    EndFragments,
    /// The start of one fragment (including the basic offset table,
    /// which is reported as the first fragment).
    StartFragment {
        /// the fragment's declared length (always definite)
        len: Length,
    },
    /// The close of a fragment.
    EndFragment,
    /// The reader has reached a clean end of stream. Returned repeatedly
    /// once reached.
    Eof,
    /// The reader encountered malformed input and has latched into a
    /// poisoned terminal state. Carries the fault that triggered it.
    /// Reported exactly once; every subsequent call behaves as [`Eof`](Event::Eof).
    Invalid(Error),
}
