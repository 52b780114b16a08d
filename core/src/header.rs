//! The DICOM attribute tag, value representation, length and header types.

use std::cmp::Ordering;
use std::fmt;
use std::str::from_utf8;

/// Idiomatic alias for a tag's group number.
pub type GroupNumber = u16;
/// Idiomatic alias for a tag's element number.
pub type ElementNumber = u16;

/// The item-start delimiter tag, `(FFFE,E000)`.
pub const ITEM_TAG: Tag = Tag(0xFFFE, 0xE000);
/// The item-end delimiter tag, `(FFFE,E00D)`.
pub const ITEM_DELIMITER_TAG: Tag = Tag(0xFFFE, 0xE00D);
/// The sequence-end delimiter tag, `(FFFE,E0DD)`.
pub const SEQUENCE_DELIMITER_TAG: Tag = Tag(0xFFFE, 0xE0DD);
/// The (encapsulatable) pixel data tag, `(7FE0,0010)`.
pub const PIXEL_DATA_TAG: Tag = Tag(0x7FE0, 0x0010);

/// A trait for a data type containing a DICOM attribute header.
#[allow(clippy::len_without_is_empty)]
pub trait Header {
    /// Retrieve the attribute's tag as a `(group, element)` pair.
    fn tag(&self) -> Tag;

    /// Retrieve the attribute's value length, in bytes. May be undefined
    /// for a sequence or for encapsulated pixel data.
    fn len(&self) -> Length;

    /// Check whether this is the header of an item.
    fn is_item(&self) -> bool {
        self.tag() == ITEM_TAG
    }

    /// Check whether this is the header of an item delimiter.
    fn is_item_delimiter(&self) -> bool {
        self.tag() == ITEM_DELIMITER_TAG
    }

    /// Check whether this is the header of a sequence delimiter.
    fn is_sequence_delimiter(&self) -> bool {
        self.tag() == SEQUENCE_DELIMITER_TAG
    }

    /// Check whether this is the pixel data attribute.
    fn is_pixel_data(&self) -> bool {
        self.tag() == PIXEL_DATA_TAG
    }
}

/// The data type for DICOM attribute tags: a `(group, element)` pair of
/// 16-bit numbers.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy)]
pub struct Tag(pub GroupNumber, pub ElementNumber);

impl Tag {
    /// Getter for the tag's group value.
    #[inline]
    pub fn group(self) -> GroupNumber {
        self.0
    }

    /// Getter for the tag's element value.
    #[inline]
    pub fn element(self) -> ElementNumber {
        self.1
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({:#06X?}, {:#06X?})", self.0, self.1)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

impl PartialEq<(u16, u16)> for Tag {
    fn eq(&self, other: &(u16, u16)) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}

impl PartialEq<[u16; 2]> for Tag {
    fn eq(&self, other: &[u16; 2]) -> bool {
        self.0 == other[0] && self.1 == other[1]
    }
}

impl From<(u16, u16)> for Tag {
    #[inline]
    fn from(value: (u16, u16)) -> Tag {
        Tag(value.0, value.1)
    }
}

impl From<[u16; 2]> for Tag {
    #[inline]
    fn from(value: [u16; 2]) -> Tag {
        Tag(value[0], value[1])
    }
}

/// Whether a VR's header carries its length as a 16-bit short form
/// (8-byte header) or a 32-bit long form with a 2-byte reserved field
/// (12-byte header).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VrForm {
    /// 8-byte header: `tag(4) vr(2) vl(2)`.
    Short,
    /// 12-byte header: `tag(4) vr(2) reserved(2)=0 vl(4)`.
    Long,
}

/// An enum type for a DICOM value representation: a two-letter opaque
/// type code. The core never interprets the bytes this VR describes; it
/// only uses the VR to decide how the element's header and length are
/// shaped on the wire.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Ord, PartialOrd)]
pub enum VR {
    /// Application Entity
    AE,
    /// Age String
    AS,
    /// Attribute Tag
    AT,
    /// Code String
    CS,
    /// Date
    DA,
    /// Decimal String
    DS,
    /// Date Time
    DT,
    /// Floating Point Single
    FL,
    /// Floating Point Double
    FD,
    /// Integer String
    IS,
    /// Long String
    LO,
    /// Long Text
    LT,
    /// Other Byte
    OB,
    /// Other Double
    OD,
    /// Other Float
    OF,
    /// Other Long
    OL,
    /// Other Word
    OW,
    /// Person Name
    PN,
    /// Short String
    SH,
    /// Signed Long
    SL,
    /// Sequence of Items
    SQ,
    /// Signed Short
    SS,
    /// Short Text
    ST,
    /// Time
    TM,
    /// Unlimited Characters
    UC,
    /// Unique Identifier (UID)
    UI,
    /// Unsigned Long
    UL,
    /// Unknown
    UN,
    /// Universal Resource Identifier or Universal Resource Locator
    UR,
    /// Unsigned Short
    US,
    /// Unlimited Text
    UT,
    /// An unrecognized but lexically valid VR (two uppercase ASCII
    /// letters outside the closed set above). Always treated as
    /// long-length-form.
    Unknown([u8; 2]),
}

impl VR {
    /// Obtain the value representation corresponding to the given two
    /// bytes. Returns `None` if the bytes are not both uppercase ASCII
    /// letters (`A`-`Z`); a recognized-but-uncommon letter pair is
    /// returned as `VR::Unknown`.
    pub fn from_binary(chars: [u8; 2]) -> Option<Self> {
        if !chars[0].is_ascii_uppercase() || !chars[1].is_ascii_uppercase() {
            return None;
        }
        use VR::*;
        Some(match &chars {
            b"AE" => AE,
            b"AS" => AS,
            b"AT" => AT,
            b"CS" => CS,
            b"DA" => DA,
            b"DS" => DS,
            b"DT" => DT,
            b"FL" => FL,
            b"FD" => FD,
            b"IS" => IS,
            b"LO" => LO,
            b"LT" => LT,
            b"OB" => OB,
            b"OD" => OD,
            b"OF" => OF,
            b"OL" => OL,
            b"OW" => OW,
            b"PN" => PN,
            b"SH" => SH,
            b"SL" => SL,
            b"SQ" => SQ,
            b"SS" => SS,
            b"ST" => ST,
            b"TM" => TM,
            b"UC" => UC,
            b"UI" => UI,
            b"UL" => UL,
            b"UN" => UN,
            b"UR" => UR,
            b"US" => US,
            b"UT" => UT,
            _ => Unknown(chars),
        })
    }

    /// Retrieve a copy of this VR's two-byte ASCII representation.
    pub fn to_bytes(self) -> [u8; 2] {
        use VR::*;
        match self {
            AE => *b"AE",
            AS => *b"AS",
            AT => *b"AT",
            CS => *b"CS",
            DA => *b"DA",
            DS => *b"DS",
            DT => *b"DT",
            FL => *b"FL",
            FD => *b"FD",
            IS => *b"IS",
            LO => *b"LO",
            LT => *b"LT",
            OB => *b"OB",
            OD => *b"OD",
            OF => *b"OF",
            OL => *b"OL",
            OW => *b"OW",
            PN => *b"PN",
            SH => *b"SH",
            SL => *b"SL",
            SQ => *b"SQ",
            SS => *b"SS",
            ST => *b"ST",
            TM => *b"TM",
            UC => *b"UC",
            UI => *b"UI",
            UL => *b"UL",
            UN => *b"UN",
            UR => *b"UR",
            US => *b"US",
            UT => *b"UT",
            Unknown(bytes) => bytes,
        }
    }

    /// Classify this VR into its short- or long-length-form header
    /// shape, per the closed table of value representations. An
    /// unrecognized VR always defaults to long-length-form.
    pub fn form(self) -> VrForm {
        use VR::*;
        match self {
            AE | AS | AT | CS | DA | DS | DT | FL | FD | IS | LO | LT | PN | SH | SL | SS | ST
            | TM | UI | UL | US => VrForm::Short,
            OB | OD | OF | OL | OW | SQ | UC | UN | UR | UT | Unknown(_) => VrForm::Long,
        }
    }
}

impl fmt::Display for VR {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.to_bytes();
        // `from_binary`'s preconditions guarantee these are ASCII.
        f.write_str(from_utf8(&bytes).unwrap_or("??"))
    }
}

/// A type for representing an attribute's value length, in bytes. An
/// internal value of `0xFFFF_FFFF` represents an undefined (unspecified)
/// length, legal only for a sequence of items or encapsulated pixel
/// data; the actual extent is then determined by delimiter tags
/// encountered while streaming.
///
/// Two undefined lengths are never equal to each other, and any
/// ordering comparison involving an undefined length is `None`, mirroring
/// how the standard treats this sentinel as "not a number" rather than
/// as the literal value `0xFFFF_FFFF`.
///
/// ```
/// # use dicom_stream_core::Length;
/// assert_ne!(Length::UNDEFINED, Length::UNDEFINED);
/// assert!(!(Length::UNDEFINED < Length::defined(64)));
/// assert!(!(Length::UNDEFINED > Length::defined(64)));
/// ```
#[derive(Clone, Copy)]
pub struct Length(pub u32);

const UNDEFINED_LEN: u32 = 0xFFFF_FFFF;

impl Length {
    /// The undefined-length sentinel.
    pub const UNDEFINED: Self = Length(UNDEFINED_LEN);

    /// Create a new length value with the given number of bytes.
    ///
    /// # Panics
    ///
    /// Panics if `len` is the undefined-length sentinel.
    pub fn defined(len: u32) -> Self {
        assert_ne!(len, UNDEFINED_LEN);
        Length(len)
    }

    /// Check whether this length is the undefined-length sentinel.
    #[inline]
    pub fn is_undefined(self) -> bool {
        self.0 == UNDEFINED_LEN
    }

    /// Check whether this length is well defined (not undefined).
    #[inline]
    pub fn is_defined(self) -> bool {
        !self.is_undefined()
    }

    /// Fetch the concrete length value, if available.
    #[inline]
    pub fn get(self) -> Option<u32> {
        match self.0 {
            UNDEFINED_LEN => None,
            v => Some(v),
        }
    }
}

impl From<u32> for Length {
    fn from(o: u32) -> Self {
        Length(o)
    }
}

impl PartialEq<Length> for Length {
    fn eq(&self, rhs: &Length) -> bool {
        match (self.0, rhs.0) {
            (UNDEFINED_LEN, _) | (_, UNDEFINED_LEN) => false,
            (l1, l2) => l1 == l2,
        }
    }
}

impl PartialOrd<Length> for Length {
    fn partial_cmp(&self, rhs: &Length) -> Option<Ordering> {
        match (self.0, rhs.0) {
            (UNDEFINED_LEN, _) | (_, UNDEFINED_LEN) => None,
            (l1, l2) => Some(l1.cmp(&l2)),
        }
    }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            UNDEFINED_LEN => f.write_str("Length(Undefined)"),
            l => f.debug_tuple("Length").field(&l).finish(),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            UNDEFINED_LEN => f.write_str("U/L"),
            l => write!(f, "{}", &l),
        }
    }
}

/// A data structure for an attribute header: a tag, a value
/// representation, and a declared length.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct DataElementHeader {
    /// The attribute's tag.
    pub tag: Tag,
    /// The attribute's value representation.
    pub vr: VR,
    /// The attribute's declared value length.
    pub len: Length,
}

impl Header for DataElementHeader {
    fn tag(&self) -> Tag {
        self.tag
    }

    fn len(&self) -> Length {
        self.len
    }
}

impl DataElementHeader {
    /// Create a new attribute header from its constituent parts.
    pub fn new<T: Into<Tag>>(tag: T, vr: VR, len: Length) -> DataElementHeader {
        DataElementHeader {
            tag: tag.into(),
            vr,
            len,
        }
    }
}

/// The header of an item-level delimiter: an item start, an item
/// delimiter, or a sequence delimiter.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum SequenceItemHeader {
    /// An item start.
    Item {
        /// the length of the item in bytes (may be `Length::UNDEFINED`)
        len: Length,
    },
    /// An item delimiter. Always has length zero.
    ItemDelimiter,
    /// A sequence delimiter. Always has length zero.
    SequenceDelimiter,
}

impl SequenceItemHeader {
    /// Build a sequence-item header from a raw tag and length, validating
    /// that the tag is one of the three recognized delimiter tags and
    /// that delimiter tags (item-end, sequence-end) carry a zero length.
    pub fn new<T: Into<Tag>>(tag: T, len: Length) -> Option<SequenceItemHeader> {
        match tag.into() {
            ITEM_TAG => Some(SequenceItemHeader::Item { len }),
            ITEM_DELIMITER_TAG => {
                if len.get() == Some(0) {
                    Some(SequenceItemHeader::ItemDelimiter)
                } else {
                    None
                }
            }
            SEQUENCE_DELIMITER_TAG => {
                if len.get() == Some(0) {
                    Some(SequenceItemHeader::SequenceDelimiter)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl Header for SequenceItemHeader {
    fn tag(&self) -> Tag {
        match *self {
            SequenceItemHeader::Item { .. } => ITEM_TAG,
            SequenceItemHeader::ItemDelimiter => ITEM_DELIMITER_TAG,
            SequenceItemHeader::SequenceDelimiter => SEQUENCE_DELIMITER_TAG,
        }
    }

    fn len(&self) -> Length {
        match *self {
            SequenceItemHeader::Item { len } => len,
            SequenceItemHeader::ItemDelimiter | SequenceItemHeader::SequenceDelimiter => {
                Length(0)
            }
        }
    }
}
