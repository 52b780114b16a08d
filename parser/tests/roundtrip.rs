//! End-to-end scenarios: feeding raw bytes through a [`Reader`], and
//! feeding a hand-built event sequence through a [`Writer`] and reading
//! the result back.

use dicom_stream_core::header::{DataElementHeader, Header, Length};
use dicom_stream_core::{ErrorKind, Tag, VR};
use dicom_stream_parser::event::Event;
use dicom_stream_parser::reader::Reader;
use dicom_stream_parser::writer::Writer;

fn drain_value(reader: &mut Reader<'_, impl std::io::Read>, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    let mut filled = 0;
    loop {
        let n = reader.read_value(&mut out[filled..]).expect("read_value");
        if n == 0 {
            break;
        }
        filled += n;
    }
    assert_eq!(filled, len, "value conservation: must read exactly `len` bytes");
    out
}

#[test]
fn scenario_1_minimal_explicit_short_vr_attribute() {
    let raw: &[u8] = &[0x08, 0x00, 0x05, 0x00, b'C', b'S', 0x02, 0x00, b'I', b'S'];
    let mut cursor = std::io::Cursor::new(raw);
    let mut reader = Reader::new(&mut cursor);

    assert!(matches!(reader.next_event(), Event::StartModel));
    match reader.next_event() {
        Event::StartAttribute(h) => {
            assert_eq!(h.tag(), Tag(0x0008, 0x0005));
            assert_eq!(h.vr, VR::CS);
            assert_eq!(h.len(), Length(2));
        }
        other => panic!("expected StartAttribute, got {:?}", other),
    }
    assert!(matches!(reader.next_event(), Event::Value));
    assert_eq!(drain_value(&mut reader, 2), b"IS");
    assert!(matches!(reader.next_event(), Event::EndAttribute));
    assert!(matches!(reader.next_event(), Event::EndModel));
    assert!(matches!(reader.next_event(), Event::Eof));
    assert!(!reader.has_next());
}

#[test]
fn scenario_2_undefined_length_sequence_with_one_item() {
    #[rustfmt::skip]
    let raw: &[u8] = &[
        0x08, 0x00, 0x10, 0x00, b'S', b'Q', 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFE, 0xFF, 0x00, 0xE0, 0xFF, 0xFF, 0xFF, 0xFF,
        0x10, 0x00, 0x10, 0x00, b'P', b'N', 0x00, 0x00,
        0xFE, 0xFF, 0x0D, 0xE0, 0x00, 0x00, 0x00, 0x00,
        0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00,
    ];
    let mut cursor = std::io::Cursor::new(raw);
    let mut reader = Reader::new(&mut cursor);

    assert!(matches!(reader.next_event(), Event::StartModel));
    match reader.next_event() {
        Event::StartSequence { tag, len } => {
            assert_eq!(tag, Tag(0x0008, 0x0010));
            assert!(len.is_undefined());
        }
        other => panic!("expected StartSequence, got {:?}", other),
    }
    match reader.next_event() {
        Event::StartItem { len } => assert!(len.is_undefined()),
        other => panic!("expected StartItem, got {:?}", other),
    }
    match reader.next_event() {
        Event::StartAttribute(h) => {
            assert_eq!(h.tag(), Tag(0x0010, 0x0010));
            assert_eq!(h.vr, VR::PN);
            assert_eq!(h.len(), Length(0));
        }
        other => panic!("expected StartAttribute, got {:?}", other),
    }
    assert!(matches!(reader.next_event(), Event::Value));
    assert_eq!(drain_value(&mut reader, 0), Vec::<u8>::new());
    assert!(matches!(reader.next_event(), Event::EndAttribute));
    assert!(matches!(reader.next_event(), Event::EndItem));
    assert!(matches!(reader.next_event(), Event::EndSequence));
    assert!(matches!(reader.next_event(), Event::EndModel));
    assert!(matches!(reader.next_event(), Event::Eof));
}

#[test]
fn scenario_3_encapsulated_pixel_data() {
    #[rustfmt::skip]
    let raw: &[u8] = &[
        0x7F, 0xE0, 0x10, 0x00, b'O', b'B', 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFE, 0xFF, 0x00, 0xE0, 0x00, 0x00, 0x00, 0x00,
        0xFE, 0xFF, 0x00, 0xE0, 0x04, 0x00, 0x00, 0x00, 0xAA, 0xBB, 0xCC, 0xDD,
        0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00,
    ];
    let mut cursor = std::io::Cursor::new(raw);
    let mut reader = Reader::new(&mut cursor);

    assert!(matches!(reader.next_event(), Event::StartModel));
    match reader.next_event() {
        Event::StartFragments { tag } => assert_eq!(tag, Tag(0x7FE0, 0x0010)),
        other => panic!("expected StartFragments, got {:?}", other),
    }
    match reader.next_event() {
        Event::StartFragment { len } => assert_eq!(len, Length(0)),
        other => panic!("expected StartFragment, got {:?}", other),
    }
    assert!(matches!(reader.next_event(), Event::Value));
    assert_eq!(drain_value(&mut reader, 0), Vec::<u8>::new());
    assert!(matches!(reader.next_event(), Event::EndFragment));
    match reader.next_event() {
        Event::StartFragment { len } => assert_eq!(len, Length(4)),
        other => panic!("expected StartFragment, got {:?}", other),
    }
    assert!(matches!(reader.next_event(), Event::Value));
    assert_eq!(
        reader.get_value_length(),
        Some(Length(4)),
        "get_value_length must report the current fragment's length, \
         not the encapsulating pixel-data attribute's undefined one"
    );
    assert_eq!(drain_value(&mut reader, 4), vec![0xAA, 0xBB, 0xCC, 0xDD]);
    assert!(matches!(reader.next_event(), Event::EndFragment));
    assert!(matches!(reader.next_event(), Event::EndFragments));
    assert!(matches!(reader.next_event(), Event::EndModel));
    assert!(matches!(reader.next_event(), Event::Eof));
}

#[test]
fn scenario_4_reserved_nonzero_rejection() {
    // (0008,0441) OB, reserved = 0x0001 (must be zero), length 2
    #[rustfmt::skip]
    let raw: &[u8] = &[
        0x08, 0x00, 0x41, 0x04, b'O', b'B', 0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x12, 0x34,
    ];
    let mut cursor = std::io::Cursor::new(raw);
    let mut reader = Reader::new(&mut cursor);
    assert!(matches!(reader.next_event(), Event::StartModel));
    match reader.next_event() {
        Event::Invalid(e) => assert_eq!(e.kind(), ErrorKind::ReservedNotZero),
        other => panic!("expected Invalid(ReservedNotZero), got {:?}", other),
    }
    assert!(matches!(reader.next_event(), Event::Eof));
    assert!(!reader.has_next());
}

#[test]
fn scenario_5_odd_length_rejection() {
    // (0010,0010) PN, length 5 (odd, must be even)
    let raw: &[u8] = &[0x10, 0x00, 0x10, 0x00, b'P', b'N', 0x05, 0x00, b'D', b'O', b'E', b' ', b'^'];
    let mut cursor = std::io::Cursor::new(raw);
    let mut reader = Reader::new(&mut cursor);
    assert!(matches!(reader.next_event(), Event::StartModel));
    match reader.next_event() {
        Event::Invalid(e) => assert_eq!(e.kind(), ErrorKind::InvalidLength),
        other => panic!("expected Invalid(InvalidLength), got {:?}", other),
    }
    assert!(matches!(reader.next_event(), Event::Eof));
}

#[test]
fn scenario_6_writer_output_round_trips_through_reader() {
    // Build scenario 2's event sequence through the writer, then read
    // the resulting bytes back and check the same event sequence comes
    // out (property: decode(encode(stream)) == stream).
    let mut buf = Vec::new();
    {
        let mut writer = Writer::new(&mut buf);
        writer
            .write_event(Event::StartSequence {
                tag: Tag(0x0008, 0x0010),
                len: Length::UNDEFINED,
            })
            .unwrap();
        writer
            .write_event(Event::StartItem {
                len: Length::UNDEFINED,
            })
            .unwrap();
        writer
            .write_event(Event::StartAttribute(DataElementHeader::new(
                Tag(0x0010, 0x0010),
                VR::PN,
                Length(0),
            )))
            .unwrap();
        writer.write_event(Event::Value).unwrap();
        writer.write_event(Event::EndAttribute).unwrap();
        writer.write_event(Event::EndItem).unwrap();
        writer.write_event(Event::EndSequence).unwrap();
    }

    let mut cursor = std::io::Cursor::new(buf.as_slice());
    let mut reader = Reader::new(&mut cursor);

    assert!(matches!(reader.next_event(), Event::StartModel));
    match reader.next_event() {
        Event::StartSequence { tag, len } => {
            assert_eq!(tag, Tag(0x0008, 0x0010));
            assert!(len.is_undefined());
        }
        other => panic!("expected StartSequence, got {:?}", other),
    }
    match reader.next_event() {
        Event::StartItem { len } => assert!(len.is_undefined()),
        other => panic!("expected StartItem, got {:?}", other),
    }
    match reader.next_event() {
        Event::StartAttribute(h) => {
            assert_eq!(h.tag(), Tag(0x0010, 0x0010));
            assert_eq!(h.vr, VR::PN);
        }
        other => panic!("expected StartAttribute, got {:?}", other),
    }
    assert!(matches!(reader.next_event(), Event::Value));
    assert_eq!(drain_value(&mut reader, 0), Vec::<u8>::new());
    assert!(matches!(reader.next_event(), Event::EndAttribute));
    assert!(matches!(reader.next_event(), Event::EndItem));
    assert!(matches!(reader.next_event(), Event::EndSequence));
    assert!(matches!(reader.next_event(), Event::EndModel));
    assert!(matches!(reader.next_event(), Event::Eof));
}

#[test]
fn monotonic_tag_violation_is_rejected() {
    // Two attributes in the same (root) scope with a non-increasing tag.
    #[rustfmt::skip]
    let raw: &[u8] = &[
        0x10, 0x00, 0x20, 0x00, b'L', b'O', 0x00, 0x00,
        0x10, 0x00, 0x10, 0x00, b'P', b'N', 0x00, 0x00,
    ];
    let mut cursor = std::io::Cursor::new(raw);
    let mut reader = Reader::new(&mut cursor);
    assert!(matches!(reader.next_event(), Event::StartModel));
    assert!(matches!(reader.next_event(), Event::StartAttribute(_)));
    assert!(matches!(reader.next_event(), Event::Value));
    assert_eq!(drain_value(&mut reader, 0), Vec::<u8>::new());
    assert!(matches!(reader.next_event(), Event::EndAttribute));
    match reader.next_event() {
        Event::Invalid(e) => assert_eq!(e.kind(), ErrorKind::OutOfOrder),
        other => panic!("expected Invalid(OutOfOrder), got {:?}", other),
    }
}

#[test]
fn stack_balance_at_eof_for_nested_sequences() {
    // A sequence containing an item that itself contains a nested
    // sequence; at `Eof` every frame must have been popped.
    #[rustfmt::skip]
    let raw: &[u8] = &[
        // (0008,0010) SQ, undefined length
        0x08, 0x00, 0x10, 0x00, b'S', b'Q', 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
        // item, undefined length
        0xFE, 0xFF, 0x00, 0xE0, 0xFF, 0xFF, 0xFF, 0xFF,
        // nested (0008,0012) SQ, undefined length
        0x08, 0x00, 0x12, 0x00, b'S', b'Q', 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
        // nested item, definite length 0
        0xFE, 0xFF, 0x00, 0xE0, 0x00, 0x00, 0x00, 0x00,
        // nested sequence delimiter
        0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00,
        // outer item delimiter
        0xFE, 0xFF, 0x0D, 0xE0, 0x00, 0x00, 0x00, 0x00,
        // outer sequence delimiter
        0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00,
    ];
    let mut cursor = std::io::Cursor::new(raw);
    let mut reader = Reader::new(&mut cursor);
    let mut events = Vec::new();
    loop {
        let ev = reader.next_event();
        let done = matches!(ev, Event::Eof);
        events.push(format!("{:?}", ev));
        if done {
            break;
        }
    }
    // Balance check: equal numbers of Start/End markers for sequences and items.
    let starts = events.iter().filter(|e| e.starts_with("StartSequence")).count();
    let ends = events.iter().filter(|e| e.starts_with("EndSequence")).count();
    assert_eq!(starts, ends);
    assert_eq!(starts, 2);
    let item_starts = events.iter().filter(|e| e.starts_with("StartItem")).count();
    let item_ends = events.iter().filter(|e| e.starts_with("EndItem")).count();
    assert_eq!(item_starts, item_ends);
    assert_eq!(item_starts, 2);
    assert!(!reader.has_next());
}

#[test]
fn bare_attribute_between_sequence_items_is_rejected() {
    // A sequence scope expects only item-start or sequence-delimiter
    // tags between items; a bare attribute header here is a grammar
    // violation, not a valid zero-item sequence body.
    #[rustfmt::skip]
    let raw: &[u8] = &[
        // (0008,0010) SQ, undefined length
        0x08, 0x00, 0x10, 0x00, b'S', b'Q', 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
        // a bare attribute, not wrapped in an item
        0x10, 0x00, 0x10, 0x00, b'P', b'N', 0x00, 0x00,
    ];
    let mut cursor = std::io::Cursor::new(raw);
    let mut reader = Reader::new(&mut cursor);
    assert!(matches!(reader.next_event(), Event::StartModel));
    match reader.next_event() {
        Event::StartSequence { tag, len } => {
            assert_eq!(tag, Tag(0x0008, 0x0010));
            assert!(len.is_undefined());
        }
        other => panic!("expected StartSequence, got {:?}", other),
    }
    match reader.next_event() {
        Event::Invalid(e) => assert_eq!(e.kind(), ErrorKind::InvalidLength),
        other => panic!("expected Invalid(InvalidLength), got {:?}", other),
    }
    assert!(matches!(reader.next_event(), Event::Eof));
}
