//! Information and structures for PRS, Yaz0, and Yay0 data.
//!
//! All three formats are LZSS schemes: a stream of flag bits decides whether the next
//! output byte is copied verbatim (a literal) or whether a run of bytes is copied from
//! earlier in the output (a back-reference). They differ in how flags are ordered and how
//! back-references are packed.
//!
//! ## PRS
//! PRS has no header. Control bytes are consumed from the low bit upwards, and a new control
//! byte is only read from the stream once all eight bits of the previous one are used up.
//!
//! | Bits       | Command | Payload |
//! | :--------- | ------- | ------- |
//! | `1`        | Literal | one byte |
//! | `0 0 h l`  | Short copy, length `hl + 2` | one byte: distance `0x100 - byte` |
//! | `0 1`      | Long copy | two bytes `b0 b1`, plus `len - 1` if `b0 & 7 == 0` |
//!
//! For a long copy, `v = b1 << 8 | b0` holds a 13-bit negative offset in its top bits, so the
//! distance is `0x2000 - (v >> 3)`. The length is `(b0 & 7) + 2`, or the extra byte plus one.
//! A long copy with `v == 0` ends the stream.
//!
//! Let's compress the string "AAAAAAAAAA":
//! ```text
//! 15       <- control bits 1, 0 1, 0 1 (read from bit 0 upwards)
//! 41       <- literal 'A'
//! FF FF    <- long copy: offset -1, length (7 + 2) = 9
//! 00 00    <- end of stream
//! ```
//!
//! ## Yaz0
//! There is a sixteen byte header, followed by control bytes interleaved with their payload.
//!
//! | Byte Num | Description |
//! | :------: | ----------- |
//! | 0..4     | magic bytes ("Yaz0") |
//! | 4..8     | size in big endian bytes of decompressed data |
//! | 8..12    | alignment of the output buffer (zero before the Wii U) |
//! | 12..16   | padding |
//!
//! Control bits are read from the high bit downwards. A set bit is a literal. A clear bit is a
//! big endian `u16` back-reference: the low twelve bits plus one are the distance, and the high
//! nibble plus two is the length. A zero high nibble means an extra byte follows, and the
//! length is that byte plus `0x12`.
//!
//! ## Yay0
//! The same commands as Yaz0, but split into three streams inside one buffer.
//!
//! | Byte Num | Description |
//! | :------: | ----------- |
//! | 0..4     | magic bytes ("Yay0") |
//! | 4..8     | size in big endian bytes of decompressed data |
//! | 8..12    | offset of the back-reference stream |
//! | 12..16   | offset of the literal (and extra length) stream |
//!
//! The control bytes start right after the header.

use crate::errors::LzError;
use bitstream_io::{BigEndian, BitReader, BitWriter, BE};
use std::convert::TryInto;
use std::fmt;
use std::io::{Read, Write};

/// Distances a PRS encoder may produce are strictly below this value
pub const PRS_WINDOW: usize = 0x1FF0;
/// Largest distance that a PRS long copy can address
pub const PRS_MAX_DISTANCE: usize = 0x2000;
/// Largest distance that a PRS short copy can address
pub const PRS_SHORT_DISTANCE: usize = 0x100;
/// Longest match the PRS encoder will emit
pub const PRS_MAX_MATCH: usize = 0xFF;
/// Shortest match the PRS encoder will emit
pub const PRS_MIN_MATCH: usize = 3;
/// Largest distance a Yaz0 or Yay0 back-reference can address
pub const YAZ_MAX_DISTANCE: usize = 0x1000;

/// The compression formats understood by this crate
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Format {
    Prs,
    Yaz0,
    Yay0,
}

impl Format {
    /// The four magic bytes at the start of the format, if it has a header
    pub fn magic(&self) -> Option<&'static [u8; 4]> {
        match self {
            Self::Prs => None,
            Self::Yaz0 => Some(b"Yaz0"),
            Self::Yay0 => Some(b"Yay0"),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Prs => write!(f, "PRS"),
            Self::Yaz0 => write!(f, "Yaz0"),
            Self::Yay0 => write!(f, "Yay0"),
        }
    }
}

fn check_magic(format: Format, found: [u8; 4]) -> Result<(), LzError> {
    match format.magic() {
        Some(magic) if *magic == found => Ok(()),
        _ => Err(LzError::Unrecognized {
            format,
            magic: found,
        }),
    }
}

/// The information stored at the start of a Yaz0 file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Yaz0Header {
    /// size of decompressed data
    pub size: u32,
    /// required alignment of the decompressed data
    pub alignment: u32,
}

impl Yaz0Header {
    pub const SIZE: usize = 16;

    /// Parse Yaz0 header from a byte array
    fn from_array(arr: &[u8; 16]) -> Result<Self, LzError> {
        check_magic(Format::Yaz0, arr[0..4].try_into().unwrap())?;

        let size = u32::from_be_bytes(arr[4..8].try_into().unwrap());
        let alignment = u32::from_be_bytes(arr[8..12].try_into().unwrap());

        Ok(Self { size, alignment })
    }
    /// Convenience function to read the Yaz0 header from a bitstream
    pub fn from_bitreader<R: Read>(reader: &mut BitReader<R, BE>) -> Result<Self, LzError> {
        let mut header = [0u8; Self::SIZE];
        reader.read_bytes(&mut header)?;

        Self::from_array(&header)
    }
    /// Write out `self` to the big endian `BitWriter` to match the Yaz0 format
    pub fn write<W: Write>(&self, wtr: &mut BitWriter<W, BE>) -> Result<(), LzError> {
        wtr.write_bytes(b"Yaz0")?; // 0..4
        wtr.write(32, self.size)?; // 4..8
        wtr.write(32, self.alignment)?; // 8..12
        wtr.write(32, 0u32)?; // 12..16

        Ok(())
    }
}

/// The information stored at the start of a Yay0 file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Yay0Header {
    /// size of decompressed data
    pub size: u32,
    /// start of the big endian back-reference codes
    pub count_offset: u32,
    /// start of the literal and extra length bytes
    pub data_offset: u32,
}

impl Yay0Header {
    pub const SIZE: usize = 16;

    fn from_array(arr: &[u8; 16]) -> Result<Self, LzError> {
        check_magic(Format::Yay0, arr[0..4].try_into().unwrap())?;

        let size = u32::from_be_bytes(arr[4..8].try_into().unwrap());
        let count_offset = u32::from_be_bytes(arr[8..12].try_into().unwrap());
        let data_offset = u32::from_be_bytes(arr[12..16].try_into().unwrap());

        Ok(Self {
            size,
            count_offset,
            data_offset,
        })
    }
    /// Convenience function to read the Yay0 header from a bitstream
    pub fn from_bitreader<R: Read>(reader: &mut BitReader<R, BE>) -> Result<Self, LzError> {
        let mut header = [0u8; Self::SIZE];
        reader.read_bytes(&mut header)?;

        Self::from_array(&header)
    }
    /// Write out `self` to the big endian `BitWriter` to match the Yay0 format
    pub fn write<W: Write>(&self, wtr: &mut BitWriter<W, BE>) -> Result<(), LzError> {
        wtr.write_bytes(b"Yay0")?; // 0..4
        wtr.write(32, self.size)?; // 4..8
        wtr.write(32, self.count_offset)?; // 8..12
        wtr.write(32, self.data_offset)?; // 12..16

        Ok(())
    }
}

/// A parsed header from compressed data that carries one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    Yaz0(Yaz0Header),
    Yay0(Yay0Header),
}

impl Header {
    /// size of the decompressed data
    pub fn size(&self) -> u32 {
        match self {
            Self::Yaz0(hdr) => hdr.size,
            Self::Yay0(hdr) => hdr.size,
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Yaz0(hdr) => write!(
                f,
                "Yaz0: size {:#x} | alignment {:#x}",
                hdr.size, hdr.alignment
            ),
            Self::Yay0(hdr) => write!(
                f,
                "Yay0: size {:#x} | counts @ {:#x} | data @ {:#x}",
                hdr.size, hdr.count_offset, hdr.data_offset
            ),
        }
    }
}

/// Extract the [`Header`] from the start of Yaz0 or Yay0 data
///
/// PRS data has no header, so asking for one is an [`LzError::Unsupported`] error.
/// ```
/// # use retrolz::{header_info, Format};
/// let data = b"Yaz0\x00\x00\x00\x05\x00\x00\x00\x00\x00\x00\x00\x00\xffHello";
/// let header = header_info(Format::Yaz0, &data[..]).unwrap();
/// assert_eq!(header.size(), 5);
/// ```
pub fn header_info<R: Read>(format: Format, rdr: R) -> Result<Header, LzError> {
    let mut bits = BitReader::endian(rdr, BigEndian);

    match format {
        Format::Prs => Err(LzError::Unsupported {
            format,
            operation: "header inspection",
        }),
        Format::Yaz0 => Yaz0Header::from_bitreader(&mut bits).map(Header::Yaz0),
        Format::Yay0 => Yay0Header::from_bitreader(&mut bits).map(Header::Yay0),
    }
}
