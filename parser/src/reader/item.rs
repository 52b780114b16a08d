//! The substate machine for one items-of-a-sequence scope: either the
//! top-level data set, or the contents of one `SQ` attribute.

use dicom_stream_core::header::{DataElementHeader, Length, Tag, VR};
use dicom_stream_core::header::{ITEM_DELIMITER_TAG, ITEM_TAG, PIXEL_DATA_TAG, SEQUENCE_DELIMITER_TAG};
use dicom_stream_core::error::InvalidLengthSnafu;
use dicom_stream_core::Error;

/// The lower bound every scope's first attribute tag must exceed. Chosen
/// one below `(0008,0000)` so that the ordinary monotonic-tag check also
/// rejects any user attribute below the group reserved for commands and
/// file-meta information, without a dedicated invariant of its own.
pub(crate) const LOW_BOUND_TAG: Tag = Tag(0x0007, 0xFFFF);

#[derive(Debug, Clone, Copy)]
pub(crate) enum ItemsState {
    /// Waiting for the next token: an attribute header (at the root, or
    /// inside an open item) or an item-level header (between items, at
    /// the top of a nested sequence scope).
    Ready,
    /// A primitive (non-sequence, non-fragmented) attribute header was
    /// just reported; its value is opened on the next step.
    AttributeOpen(DataElementHeader),
    /// The attribute's value is open; `consumed` tracks how many bytes
    /// of it have been handed to the caller so far.
    ValueOpen {
        header: DataElementHeader,
        consumed: u32,
    },
}

/// One items-of-a-sequence scope: the root data set, or the body of one
/// `SQ` attribute. Items are not tracked as a further nesting level; an
/// open item is just a sub-extent (`item_bound`) of this same scope.
#[derive(Debug)]
pub(crate) struct ItemsFrame {
    pub(crate) root: bool,
    seq_base_offset: u64,
    seq_len: Length,
    /// `Some((base_offset, len))` while positioned inside an item whose
    /// own declared length is tracked for auto-closing; `None` at the
    /// root, or between items of a nested sequence.
    item_bound: Option<(u64, Length)>,
    last_tag: Tag,
    pub(crate) state: ItemsState,
}

/// What a single step of this scope produced.
pub(crate) enum ItemsStep {
    Event(crate::event::Event),
    /// The scope's sequence itself has closed; pop this frame and emit
    /// `EndSequence`.
    PopSequence,
    /// A sequence-valued attribute was just opened: push a nested
    /// items frame and emit `StartSequence` directly, with no
    /// preceding `StartAttribute`. A single attribute is reported as
    /// exactly one of a primitive value, a sequence, or an
    /// encapsulated pixel data train — never as a `StartAttribute`
    /// followed by one of the other two.
    OpenSequence {
        tag: Tag,
        len: Length,
        base_offset: u64,
    },
    /// Encapsulated pixel data was just opened: push a fragments frame
    /// and emit `StartFragments` directly, for the same reason.
    OpenFragments { tag: Tag },
}

impl ItemsFrame {
    pub(crate) fn root() -> Self {
        ItemsFrame {
            root: true,
            seq_base_offset: 0,
            seq_len: Length::UNDEFINED,
            item_bound: None,
            last_tag: LOW_BOUND_TAG,
            state: ItemsState::Ready,
        }
    }

    pub(crate) fn nested(base_offset: u64, len: Length) -> Self {
        ItemsFrame {
            root: false,
            seq_base_offset: base_offset,
            seq_len: len,
            item_bound: None,
            last_tag: LOW_BOUND_TAG,
            state: ItemsState::Ready,
        }
    }

    /// Check, without touching the wire, whether the current position
    /// has reached the declared end of the open item or of this
    /// sequence. Only meaningful while in state `Ready`.
    pub(crate) fn auto_close(&mut self, position: u64) -> Option<ItemsStep> {
        if !matches!(self.state, ItemsState::Ready) {
            return None;
        }
        if let Some((base, len)) = self.item_bound {
            if let Some(l) = len.get() {
                let end = base + u64::from(l);
                if position >= end {
                    if position > end {
                        tracing::warn!(
                            item_end = end,
                            position,
                            "item's last attribute overran its declared length"
                        );
                    }
                    self.item_bound = None;
                    return Some(ItemsStep::Event(crate::event::Event::EndItem));
                }
            }
        } else if !self.root {
            if let Some(l) = self.seq_len.get() {
                let end = self.seq_base_offset + u64::from(l);
                if position >= end {
                    if position > end {
                        tracing::warn!(
                            seq_end = end,
                            position,
                            "sequence's last item overran its declared length"
                        );
                    }
                    return Some(ItemsStep::PopSequence);
                }
            }
        }
        None
    }

    /// Dispatch a freshly decoded header while in state `Ready`. `header`
    /// may describe an ordinary attribute or one of the three delimiter
    /// tags (item-start, item-end, sequence-end), which share the same
    /// wire shape. `end_of_header` is the stream position immediately
    /// after the header's bytes, used as the base offset for a nested
    /// sequence's byte accounting.
    pub(crate) fn on_header(
        &mut self,
        position: u64,
        end_of_header: u64,
        header: DataElementHeader,
    ) -> Result<ItemsStep, Error> {
        if header.tag.group() == 0xFFFE {
            return self.on_delimiter(position, header);
        }

        if !self.root && self.item_bound.is_none() {
            return Err(InvalidLengthSnafu {
                position,
                tag: header.tag,
                length: header.len.0,
                reason: "an attribute header is not valid between items of a sequence",
            }
            .build());
        }

        if header.tag <= self.last_tag {
            use dicom_stream_core::error::OutOfOrderSnafu;
            return Err(OutOfOrderSnafu {
                position,
                previous: self.last_tag,
                tag: header.tag,
            }
            .build());
        }
        validate_attribute(position, header)?;
        self.last_tag = header.tag;

        if header.vr == VR::SQ {
            Ok(ItemsStep::OpenSequence {
                tag: header.tag,
                len: header.len,
                base_offset: end_of_header,
            })
        } else if header.tag == PIXEL_DATA_TAG && header.vr == VR::OB && header.len.is_undefined()
        {
            Ok(ItemsStep::OpenFragments { tag: header.tag })
        } else {
            self.state = ItemsState::AttributeOpen(header);
            Ok(ItemsStep::Event(crate::event::Event::StartAttribute(header)))
        }
    }

    fn on_delimiter(
        &mut self,
        position: u64,
        header: DataElementHeader,
    ) -> Result<ItemsStep, Error> {
        let bad = |reason: &'static str| {
            InvalidLengthSnafu {
                position,
                tag: header.tag,
                length: header.len.0,
                reason,
            }
            .build()
        };
        match header.tag {
            ITEM_TAG => {
                if self.root || self.item_bound.is_some() {
                    return Err(bad("an item-start is not valid here"));
                }
                self.item_bound = Some((position, header.len));
                self.last_tag = LOW_BOUND_TAG;
                Ok(ItemsStep::Event(crate::event::Event::StartItem {
                    len: header.len,
                }))
            }
            ITEM_DELIMITER_TAG => {
                if header.len != Length(0) {
                    return Err(bad("an item delimiter must carry zero length"));
                }
                if self.item_bound.is_none() {
                    return Err(bad("an item delimiter is not valid here"));
                }
                self.item_bound = None;
                Ok(ItemsStep::Event(crate::event::Event::EndItem))
            }
            SEQUENCE_DELIMITER_TAG => {
                if header.len != Length(0) {
                    return Err(bad("a sequence delimiter must carry zero length"));
                }
                if self.root || self.item_bound.is_some() {
                    return Err(bad("a sequence delimiter is not valid here"));
                }
                Ok(ItemsStep::PopSequence)
            }
            _ => Err(bad(
                "tag has the reserved group 0xFFFE but is not a recognized delimiter",
            )),
        }
    }

    /// Open the value of an already-reported primitive attribute
    /// (never called for a sequence or encapsulated pixel data, since
    /// those bypass `AttributeOpen` entirely — see [`Self::on_header`]).
    pub(crate) fn open_value(&mut self, header: DataElementHeader) {
        self.state = ItemsState::ValueOpen {
            header,
            consumed: 0,
        };
    }

    /// Attempt to close the currently open value. Fails if the caller
    /// has not yet drained it via `read_value`.
    pub(crate) fn on_value_drained(
        &mut self,
        header: DataElementHeader,
        consumed: u32,
    ) -> Result<(), Error> {
        use dicom_stream_core::error::InvalidArgumentSnafu;
        let total = header.len.get().unwrap_or(0);
        if consumed < total {
            return Err(InvalidArgumentSnafu {
                reason: "read_value has not fully drained the attribute's value yet",
            }
            .build());
        }
        self.state = ItemsState::Ready;
        Ok(())
    }
}

fn validate_attribute(position: u64, header: DataElementHeader) -> Result<(), Error> {
    let is_seq = header.vr == VR::SQ;
    let is_encapsulable_pixel_data = header.tag == PIXEL_DATA_TAG && header.vr == VR::OB;

    if header.len.is_undefined() {
        if !(is_seq || is_encapsulable_pixel_data) {
            return Err(InvalidLengthSnafu {
                position,
                tag: header.tag,
                length: header.len.0,
                reason: "undefined length is legal only for a sequence or encapsulated pixel data",
            }
            .build());
        }
    } else if !is_seq {
        let len = header.len.get().unwrap();
        if len % 2 != 0 {
            return Err(InvalidLengthSnafu {
                position,
                tag: header.tag,
                length: len,
                reason: "a definite value length must be even",
            }
            .build());
        }
    }

    if header.tag.group() % 2 == 1 && header.tag.element() == 0 && header.vr != VR::LO {
        return Err(InvalidLengthSnafu {
            position,
            tag: header.tag,
            length: header.len.0,
            reason: "a private creator tag (odd group, element 0) must have VR LO",
        }
        .build());
    }

    Ok(())
}
