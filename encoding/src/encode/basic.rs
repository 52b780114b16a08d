//! Basic little-endian numeric encoding.

use super::BasicEncode;
use byteordered::{ByteOrdered, Endianness};
use std::io::Write;

type Result<T> = std::io::Result<T>;

/// A basic encoder of DICOM primitive numbers in little endian, the
/// only byte order this codec supports.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LittleEndianBasicEncoder;

impl BasicEncode for LittleEndianBasicEncoder {
    fn endianness(&self) -> Endianness {
        Endianness::Little
    }

    fn encode_us<W>(&self, to: W, value: u16) -> Result<()>
    where
        W: Write,
    {
        ByteOrdered::le(to).write_u16(value)?;
        Ok(())
    }

    fn encode_ul<W>(&self, to: W, value: u32) -> Result<()>
    where
        W: Write,
    {
        ByteOrdered::le(to).write_u32(value)?;
        Ok(())
    }
}
