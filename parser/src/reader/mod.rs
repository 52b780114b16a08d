//! The event-driven reader.
//!
//! A [`Reader`] wraps a byte source and drives it through a stack of
//! nested scopes — one [`item::ItemsFrame`] per open sequence (the root
//! data set counts as one), one [`fragments::FragmentsFrame`] per open
//! encapsulated pixel data attribute — surfacing the wire content as a
//! flat stream of [`Event`]s. It never buffers more than the header of
//! the attribute currently in view; large values are drained by the
//! caller in caller-sized chunks through [`Reader::read_value`].

mod fragments;
mod item;

use crate::error::from_decode_error;
use crate::event::Event;
use crate::position::CountingReader;
use dicom_stream_core::header::{DataElementHeader, Length};
use dicom_stream_core::{Error, Result};
use dicom_stream_encoding::decode::explicit_le::ExplicitVRLittleEndianDecoder;
use dicom_stream_encoding::decode::Decode;
use fragments::{FragmentsFrame, FragmentsState, FragmentsStep};
use item::{ItemsFrame, ItemsState, ItemsStep};
use smallvec::{smallvec, SmallVec};
use std::io::Read;

/// The transfer syntax UID this reader (and [`crate::writer::Writer`])
/// implements: Explicit VR Little Endian.
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";

enum Frame {
    Items(ItemsFrame),
    Fragments(FragmentsFrame),
}

/// A pull-based reader over a single Explicit VR Little Endian data set.
///
/// Call [`Reader::next_event`] in a loop until it reports [`Event::Eof`].
/// Whenever it reports [`Event::Value`], drain the value first by calling
/// [`Reader::read_value`] in a loop until it returns `0`, before asking
/// for the next event again — the reader refuses to advance past a value
/// it considers only partially read.
#[derive(Debug)]
pub struct Reader<'a, S: ?Sized> {
    source: CountingReader<&'a mut S>,
    decoder: ExplicitVRLittleEndianDecoder,
    stack: SmallVec<[Frame; 16]>,
    started: bool,
    ended: bool,
    last_attribute: Option<DataElementHeader>,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frame::Items(x) => x.fmt(f),
            Frame::Fragments(x) => x.fmt(f),
        }
    }
}

impl<'a, S: Read + ?Sized> Reader<'a, S> {
    /// Build a reader over the given byte source.
    pub fn new(source: &'a mut S) -> Self {
        Reader {
            source: CountingReader::new(source),
            decoder: ExplicitVRLittleEndianDecoder::default(),
            stack: smallvec![Frame::Items(ItemsFrame::root())],
            started: false,
            ended: false,
            last_attribute: None,
        }
    }

    /// Whether a subsequent call to [`Reader::next_event`] can still
    /// produce something other than [`Event::Eof`].
    pub fn has_next(&self) -> bool {
        !self.ended
    }

    /// Advance the reader and return the next event.
    pub fn next_event(&mut self) -> Event {
        if self.ended {
            return Event::Eof;
        }
        if !self.started {
            self.started = true;
            return Event::StartModel;
        }
        match self.step() {
            Ok(Event::EndModel) => {
                self.ended = true;
                Event::EndModel
            }
            Ok(ev) => ev,
            Err(e) => {
                self.ended = true;
                Event::Invalid(e)
            }
        }
    }

    /// The header of the most recently reported attribute or fragment,
    /// if any has been reported yet.
    pub fn get_attribute(&self) -> Option<DataElementHeader> {
        self.last_attribute
    }

    /// The declared length of the value currently open for reading.
    /// Only meaningful right after an [`Event::Value`]: for a primitive
    /// attribute's value this is the attribute's own declared length,
    /// but for a pixel-data fragment's value it is that fragment's
    /// length, not the encapsulating attribute's (undefined) one.
    pub fn get_value_length(&self) -> Option<Length> {
        match self.stack.last() {
            Some(Frame::Items(f)) => match f.state {
                ItemsState::ValueOpen { header, .. } => Some(header.len),
                _ => self.last_attribute.map(|h| h.len),
            },
            Some(Frame::Fragments(f)) => match f.state {
                FragmentsState::ValueOpen { len, .. } => Some(Length(len)),
                _ => None,
            },
            None => self.last_attribute.map(|h| h.len),
        }
    }

    /// The transfer syntax UID this reader implements.
    pub fn get_encoding(&self) -> &'static str {
        EXPLICIT_VR_LITTLE_ENDIAN
    }

    /// Copy up to `dst.len()` bytes of the currently open value into
    /// `dst`, advancing the reader's internal cursor. Returns `0` once
    /// the value has been fully drained, or when no value is currently
    /// open.
    pub fn read_value(&mut self, dst: &mut [u8]) -> Result<usize> {
        if self.stack.is_empty() || dst.is_empty() {
            return Ok(0);
        }
        let idx = self.stack.len() - 1;
        let remaining: u32 = match &self.stack[idx] {
            Frame::Items(f) => match f.state {
                ItemsState::ValueOpen { header, consumed } => {
                    header.len.get().unwrap_or(0).saturating_sub(consumed)
                }
                _ => 0,
            },
            Frame::Fragments(f) => match f.state {
                FragmentsState::ValueOpen { len, consumed } => len.saturating_sub(consumed),
                _ => 0,
            },
        };
        let n = dst.len().min(remaining as usize);
        if n == 0 {
            return Ok(0);
        }

        let position = self.source.position();
        let read = self.source.read(&mut dst[..n]).map_err(|source| {
            use dicom_stream_core::error::IoSnafu;
            use snafu::IntoError;
            IoSnafu { position }.into_error(source)
        })?;
        if read == 0 {
            use dicom_stream_core::error::UnexpectedEofSnafu;
            return Err(UnexpectedEofSnafu { position, needed: n }.build());
        }

        match &mut self.stack[idx] {
            Frame::Items(f) => {
                if let ItemsState::ValueOpen { consumed, .. } = &mut f.state {
                    *consumed += read as u32;
                }
            }
            Frame::Fragments(f) => {
                if let FragmentsState::ValueOpen { consumed, .. } = &mut f.state {
                    *consumed += read as u32;
                }
            }
        }
        Ok(read)
    }

    fn step(&mut self) -> Result<Event> {
        let idx = self.stack.len() - 1;
        let is_items = matches!(self.stack[idx], Frame::Items(_));
        if is_items {
            self.step_items(idx)
        } else {
            self.step_fragments(idx)
        }
    }

    fn step_items(&mut self, idx: usize) -> Result<Event> {
        let position = self.source.position();

        let auto = match &mut self.stack[idx] {
            Frame::Items(f) => f.auto_close(position),
            Frame::Fragments(_) => unreachable!(),
        };
        if let Some(step) = auto {
            return Ok(match step {
                ItemsStep::Event(ev) => ev,
                ItemsStep::PopSequence => {
                    self.stack.pop();
                    Event::EndSequence
                }
            });
        }

        let state = match &self.stack[idx] {
            Frame::Items(f) => f.state,
            Frame::Fragments(_) => unreachable!(),
        };

        match state {
            ItemsState::Ready => {
                let is_root = match &self.stack[idx] {
                    Frame::Items(f) => f.root,
                    Frame::Fragments(_) => unreachable!(),
                };
                match self.decoder.decode_header(&mut self.source) {
                    Ok((header, _bytes_read)) => {
                        let end_of_header = self.source.position();
                        let step = match &mut self.stack[idx] {
                            Frame::Items(f) => f.on_header(position, end_of_header, header)?,
                            Frame::Fragments(_) => unreachable!(),
                        };
                        match step {
                            ItemsStep::Event(ev) => {
                                if let Event::StartAttribute(h) = &ev {
                                    self.last_attribute = Some(*h);
                                }
                                Ok(ev)
                            }
                            ItemsStep::PopSequence => {
                                self.stack.pop();
                                Ok(Event::EndSequence)
                            }
                            ItemsStep::OpenSequence {
                                tag,
                                len,
                                base_offset,
                            } => {
                                self.last_attribute = Some(header);
                                self.stack
                                    .push(Frame::Items(ItemsFrame::nested(base_offset, len)));
                                Ok(Event::StartSequence { tag, len })
                            }
                            ItemsStep::OpenFragments { tag } => {
                                self.last_attribute = Some(header);
                                self.stack.push(Frame::Fragments(FragmentsFrame::new()));
                                Ok(Event::StartFragments { tag })
                            }
                        }
                    }
                    Err(e) => {
                        let (is_first_field, err) = from_decode_error(position, e);
                        if is_first_field && is_root {
                            Ok(Event::EndModel)
                        } else {
                            Err(err)
                        }
                    }
                }
            }
            ItemsState::AttributeOpen(header) => {
                match &mut self.stack[idx] {
                    Frame::Items(f) => f.open_value(header),
                    Frame::Fragments(_) => unreachable!(),
                }
                Ok(Event::Value)
            }
            ItemsState::ValueOpen { header, consumed } => {
                match &mut self.stack[idx] {
                    Frame::Items(f) => f.on_value_drained(header, consumed)?,
                    Frame::Fragments(_) => unreachable!(),
                }
                Ok(Event::EndAttribute)
            }
        }
    }

    fn step_fragments(&mut self, idx: usize) -> Result<Event> {
        let position = self.source.position();
        let state = match &self.stack[idx] {
            Frame::Fragments(f) => f.state,
            Frame::Items(_) => unreachable!(),
        };

        match state {
            FragmentsState::Ready => match self.decoder.decode_header(&mut self.source) {
                Ok((header, _bytes_read)) => {
                    let step = match &mut self.stack[idx] {
                        Frame::Fragments(f) => f.on_header(position, header)?,
                        Frame::Items(_) => unreachable!(),
                    };
                    match step {
                        FragmentsStep::Event(ev) => Ok(ev),
                        FragmentsStep::PopFragments => {
                            self.stack.pop();
                            Ok(Event::EndFragments)
                        }
                    }
                }
                Err(e) => {
                    let (_, err) = from_decode_error(position, e);
                    Err(err)
                }
            },
            FragmentsState::FragmentOpen(len) => {
                let ev = match &mut self.stack[idx] {
                    Frame::Fragments(f) => f.on_fragment_open(len),
                    Frame::Items(_) => unreachable!(),
                };
                Ok(ev)
            }
            FragmentsState::ValueOpen { len, consumed } => {
                match &mut self.stack[idx] {
                    Frame::Fragments(f) => f.on_value_drained(len, consumed)?,
                    Frame::Items(_) => unreachable!(),
                }
                Ok(Event::EndFragment)
            }
        }
    }
}
