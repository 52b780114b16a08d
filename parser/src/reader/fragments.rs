//! The substate machine for an encapsulated pixel data (sequence of
//! fragments) scope.

use crate::event::Event;
use dicom_stream_core::error::InvalidLengthSnafu;
use dicom_stream_core::header::{DataElementHeader, Length, ITEM_TAG, SEQUENCE_DELIMITER_TAG};
use dicom_stream_core::Error;

#[derive(Debug, Clone, Copy)]
pub(crate) enum FragmentsState {
    /// Waiting for a fragment item header or the closing sequence
    /// delimiter.
    Ready,
    /// A fragment item header was just reported; its declared length is
    /// known.
    FragmentOpen(u32),
    /// The fragment's value is open.
    ValueOpen { len: u32, consumed: u32 },
}

#[derive(Debug)]
pub(crate) struct FragmentsFrame {
    pub(crate) state: FragmentsState,
}

pub(crate) enum FragmentsStep {
    Event(Event),
    /// The fragments scope has closed; pop this frame and emit
    /// `EndFragments`.
    PopFragments,
}

impl FragmentsFrame {
    pub(crate) fn new() -> Self {
        FragmentsFrame {
            state: FragmentsState::Ready,
        }
    }

    pub(crate) fn on_header(
        &mut self,
        position: u64,
        header: DataElementHeader,
    ) -> Result<FragmentsStep, Error> {
        let bad = |reason: &'static str| {
            InvalidLengthSnafu {
                position,
                tag: header.tag,
                length: header.len.0,
                reason,
            }
            .build()
        };
        if header.tag == ITEM_TAG {
            let len = header
                .len
                .get()
                .ok_or_else(|| bad("a pixel-data fragment must have a definite length"))?;
            self.state = FragmentsState::FragmentOpen(len);
            Ok(FragmentsStep::Event(Event::StartFragment {
                len: Length(len),
            }))
        } else if header.tag == SEQUENCE_DELIMITER_TAG {
            if header.len != Length(0) {
                return Err(bad("a sequence delimiter must carry zero length"));
            }
            Ok(FragmentsStep::PopFragments)
        } else {
            Err(bad("expected a pixel-data fragment item or a sequence delimiter"))
        }
    }

    pub(crate) fn on_fragment_open(&mut self, len: u32) -> Event {
        self.state = FragmentsState::ValueOpen { len, consumed: 0 };
        Event::Value
    }

    pub(crate) fn on_value_drained(&mut self, len: u32, consumed: u32) -> Result<(), Error> {
        use dicom_stream_core::error::InvalidArgumentSnafu;
        if consumed < len {
            return Err(InvalidArgumentSnafu {
                reason: "read_value has not fully drained the fragment's value yet",
            }
            .build());
        }
        self.state = FragmentsState::Ready;
        Ok(())
    }
}
