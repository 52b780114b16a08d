//! The event-driven writer.
//!
//! A [`Writer`] is the mirror image of [`crate::reader::Reader`]: it is
//! fed the same [`Event`] stream and serializes it to a byte sink with
//! the Explicit VR Little Endian wire codec. It holds no read-ahead
//! state beyond the currently open attribute or fragment and a small
//! stack of open sequence/item/fragments scopes, just deep enough to
//! know whether a given `EndSequence`/`EndItem`/`EndFragments` needs to
//! physically emit a delimiter: a scope opened with a definite length
//! closes implicitly once the declared number of bytes has been
//! written, while an undefined-length scope only closes once the
//! matching delimiter is written to the wire.

use crate::error::from_encode_error;
use crate::event::Event;
use crate::position::CountingWriter;
use dicom_stream_core::header::{DataElementHeader, Length};
use dicom_stream_core::error::InvalidArgumentSnafu;
use dicom_stream_core::{Error, Result};
use dicom_stream_encoding::encode::explicit_le::ExplicitVRLittleEndianEncoder;
use dicom_stream_encoding::encode::Encode;
use smallvec::SmallVec;
use std::io::Write;

/// The kind of scope a [`SeqToken`] was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Sequence,
    Item,
    Fragments,
}

/// A writer-side bookkeeping token for one open sequence, item, or
/// fragments scope: remembers only enough to decide, on the matching
/// `End*` event, whether a delimiter must be physically written.
#[derive(Debug)]
struct SeqToken {
    kind: ScopeKind,
    len: Length,
}

/// What value (if any) is currently open for writing via [`Writer::write_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenValue {
    None,
    Attribute,
    Fragment,
}

/// A push-based writer of a single Explicit VR Little Endian data set.
///
/// Feed it the same event vocabulary a [`crate::reader::Reader`]
/// produces, in the order described by the grammar in
/// [`crate::event::Event`]'s documentation. Whenever a `Value` event is
/// written, follow it with one or more [`Writer::write_value`] calls
/// before writing the next event.
#[derive(Debug)]
pub struct Writer<'a, S: ?Sized> {
    sink: CountingWriter<&'a mut S>,
    encoder: ExplicitVRLittleEndianEncoder,
    scopes: SmallVec<[SeqToken; 16]>,
    open_value: OpenValue,
}

impl<'a, S: Write + ?Sized> Writer<'a, S> {
    /// Build a writer over the given byte sink.
    pub fn new(sink: &'a mut S) -> Self {
        Writer {
            sink: CountingWriter::new(sink),
            encoder: ExplicitVRLittleEndianEncoder::default(),
            scopes: SmallVec::new(),
            open_value: OpenValue::None,
        }
    }

    /// Write one event to the underlying sink.
    ///
    /// `StartModel` and `EndModel` are no-ops in this binary encoding;
    /// they exist purely so the same event stream can drive a textual
    /// or structured renderer. `Eof` and `Invalid` are reader-only
    /// signals and are rejected with [`Error::InvalidArgument`].
    pub fn write_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::StartModel | Event::EndModel => Ok(()),
            Event::StartAttribute(header) => self.start_attribute(header),
            Event::Value => {
                // Nothing to write here: the caller pushes the bytes
                // themselves through `write_value`. This event exists
                // so that a caller driving both a `Reader` and a
                // `Writer` from the same loop sees a symmetrical
                // vocabulary.
                Ok(())
            }
            Event::EndAttribute => self.end_attribute(),
            Event::StartSequence { tag, len } => self.start_sequence(tag, len),
            Event::EndSequence => self.end_scope(ScopeKind::Sequence),
            Event::StartItem { len } => self.start_item(len),
            Event::EndItem => self.end_scope(ScopeKind::Item),
            Event::StartFragments { tag } => self.start_fragments(tag),
            Event::EndFragments => self.end_scope(ScopeKind::Fragments),
            Event::StartFragment { len } => self.start_fragment(len),
            Event::EndFragment => self.end_fragment(),
            Event::Eof | Event::Invalid(_) => Err(InvalidArgumentSnafu {
                reason: "Eof and Invalid are reader-only events and cannot be written",
            }
            .build()),
        }
    }

    /// Write a chunk of the currently open attribute's or fragment's
    /// value, verbatim. Returns the number of bytes written (always
    /// `chunk.len()` on success).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if no value is currently open
    /// (i.e. the last event written was not `Value`).
    pub fn write_value(&mut self, chunk: &[u8]) -> Result<usize> {
        if self.open_value == OpenValue::None {
            return Err(InvalidArgumentSnafu {
                reason: "write_value called with no attribute or fragment value open",
            }
            .build());
        }
        let position = self.sink.position();
        self.encoder
            .encode_bytes(&mut self.sink, chunk)
            .map_err(|e| from_encode_error(position, e))
    }

    fn start_attribute(&mut self, header: DataElementHeader) -> Result<()> {
        let position = self.sink.position();
        self.encoder
            .encode_element_header(&mut self.sink, header)
            .map_err(|e| from_encode_error(position, e))?;
        self.open_value = OpenValue::Attribute;
        Ok(())
    }

    fn end_attribute(&mut self) -> Result<()> {
        self.open_value = OpenValue::None;
        Ok(())
    }

    fn start_sequence(&mut self, tag: dicom_stream_core::Tag, len: Length) -> Result<()> {
        let header = DataElementHeader::new(tag, dicom_stream_core::VR::SQ, len);
        let position = self.sink.position();
        self.encoder
            .encode_element_header(&mut self.sink, header)
            .map_err(|e| from_encode_error(position, e))?;
        self.scopes.push(SeqToken {
            kind: ScopeKind::Sequence,
            len,
        });
        Ok(())
    }

    fn start_item(&mut self, len: Length) -> Result<()> {
        let position = self.sink.position();
        self.encoder
            .encode_item_header(&mut self.sink, len.0)
            .map_err(|e| from_encode_error(position, e))?;
        self.scopes.push(SeqToken {
            kind: ScopeKind::Item,
            len,
        });
        Ok(())
    }

    fn start_fragments(&mut self, tag: dicom_stream_core::Tag) -> Result<()> {
        let header =
            DataElementHeader::new(tag, dicom_stream_core::VR::OB, Length::UNDEFINED);
        let position = self.sink.position();
        self.encoder
            .encode_element_header(&mut self.sink, header)
            .map_err(|e| from_encode_error(position, e))?;
        self.scopes.push(SeqToken {
            kind: ScopeKind::Fragments,
            len: Length::UNDEFINED,
        });
        Ok(())
    }

    fn start_fragment(&mut self, len: Length) -> Result<()> {
        let position = self.sink.position();
        self.encoder
            .encode_item_header(&mut self.sink, len.0)
            .map_err(|e| from_encode_error(position, e))?;
        self.open_value = OpenValue::Fragment;
        Ok(())
    }

    fn end_fragment(&mut self) -> Result<()> {
        self.open_value = OpenValue::None;
        Ok(())
    }

    /// Pop the innermost open scope and, if it was opened with an
    /// undefined length, physically write its closing delimiter. A
    /// definite-length scope closes implicitly: the reader on the other
    /// end determines its extent from byte accounting alone.
    fn end_scope(&mut self, expected: ScopeKind) -> Result<()> {
        let token = self.scopes.pop().ok_or_else(|| {
            InvalidArgumentSnafu {
                reason: "End event written with no matching open scope",
            }
            .build()
        })?;
        if token.kind != expected {
            return Err(InvalidArgumentSnafu {
                reason: "End event does not match the innermost open scope's kind",
            }
            .build());
        }
        if token.len.is_undefined() {
            let position = self.sink.position();
            let result = match expected {
                ScopeKind::Item => self.encoder.encode_item_delimiter(&mut self.sink),
                ScopeKind::Sequence | ScopeKind::Fragments => {
                    self.encoder.encode_sequence_delimiter(&mut self.sink)
                }
            };
            result.map_err(|e| from_encode_error(position, e))?;
        }
        Ok(())
    }
}
