//! Yaz0 and Yay0 share their commands, but Yaz0 interleaves control bytes, codes, and data in
//! one stream, while Yay0 keeps each in its own region of the file.

use super::Output;
use crate::errors::LzError;
use crate::format::{Header, Yay0Header, Yaz0Header, YAZ_MAX_DISTANCE};
use bitstream_io::{BigEndian, BitReader, BE};
use std::io::{Cursor, Read, Write};

/// Where the three kinds of input bytes come from
trait Streams {
    fn control(&mut self) -> Result<u8, LzError>;
    /// big endian back-reference code
    fn code(&mut self) -> Result<u16, LzError>;
    /// literal or extra length byte
    fn data(&mut self) -> Result<u8, LzError>;
}

struct Interleaved<R: Read> {
    src: BitReader<R, BE>,
}

impl<R: Read> Streams for Interleaved<R> {
    fn control(&mut self) -> Result<u8, LzError> {
        self.src.read::<u8>(8).map_err(Into::into)
    }
    fn code(&mut self) -> Result<u16, LzError> {
        self.src.read::<u16>(16).map_err(Into::into)
    }
    fn data(&mut self) -> Result<u8, LzError> {
        self.src.read::<u8>(8).map_err(Into::into)
    }
}

struct Split<'b> {
    control: BitReader<Cursor<&'b [u8]>, BE>,
    counts: BitReader<Cursor<&'b [u8]>, BE>,
    data: BitReader<Cursor<&'b [u8]>, BE>,
}

impl<'b> Split<'b> {
    fn region(buf: &'b [u8], start: usize) -> BitReader<Cursor<&'b [u8]>, BE> {
        BitReader::endian(Cursor::new(&buf[start..]), BigEndian)
    }
}

impl<'b> Streams for Split<'b> {
    fn control(&mut self) -> Result<u8, LzError> {
        self.control
            .read::<u8>(8)
            .map_err(|_| LzError::Corrupted("Yay0 control stream ended early"))
    }
    fn code(&mut self) -> Result<u16, LzError> {
        self.counts
            .read::<u16>(16)
            .map_err(|_| LzError::Corrupted("Yay0 count stream ended early"))
    }
    fn data(&mut self) -> Result<u8, LzError> {
        self.data
            .read::<u8>(8)
            .map_err(|_| LzError::Corrupted("Yay0 data stream ended early"))
    }
}

pub(super) fn decode_yaz0<R: Read, W: Write>(
    src: R,
    out: &mut Output<W>,
    max_size: Option<usize>,
) -> Result<(), LzError> {
    let mut src = BitReader::endian(src, BigEndian);
    let header = Yaz0Header::from_bitreader(&mut src)?;
    out.header(&Header::Yaz0(header))?;

    let limit = output_limit(header.size, max_size);
    decode_commands(&mut Interleaved { src }, out, limit)
}

pub(super) fn decode_yay0<R: Read, W: Write>(
    mut src: R,
    out: &mut Output<W>,
    max_size: Option<usize>,
) -> Result<(), LzError> {
    let mut buf = Vec::new();
    src.read_to_end(&mut buf)?;

    let header = Yay0Header::from_bitreader(&mut BitReader::endian(&buf[..], BigEndian))?;
    out.header(&Header::Yay0(header))?;

    let count_offset = header.count_offset as usize;
    let data_offset = header.data_offset as usize;
    if count_offset > buf.len() || data_offset > buf.len() {
        return Err(LzError::Corrupted("Yay0 stream offset lies outside the input"));
    }

    let mut streams = Split {
        control: Split::region(&buf, Yay0Header::SIZE),
        counts: Split::region(&buf, count_offset),
        data: Split::region(&buf, data_offset),
    };

    let limit = output_limit(header.size, max_size);
    decode_commands(&mut streams, out, limit)
}

fn output_limit(size: u32, max_size: Option<usize>) -> usize {
    let size = size as usize;
    max_size.map_or(size, |max| max.min(size))
}

/// Run control bytes (high bit first) until `limit` bytes have been written
fn decode_commands<S: Streams, W: Write>(
    src: &mut S,
    out: &mut Output<W>,
    limit: usize,
) -> Result<(), LzError> {
    let mut ctrl = 0u8;
    let mut remaining = 0;

    while out.written() < limit {
        if remaining == 0 {
            ctrl = src.control()?;
            remaining = 8;
        }

        let literal = ctrl & 0x80 != 0;
        ctrl <<= 1;
        remaining -= 1;

        if literal {
            let byte = src.data()?;
            out.literal(byte)?;
            continue;
        }

        let code = src.code()? as usize;
        let distance = (code % YAZ_MAX_DISTANCE) + 1;
        let length = match code >> 12 {
            0 => src.data()? as usize + 0x12,
            n => n + 2,
        };

        if out.written() + length > limit {
            return Err(LzError::Overflow { limit });
        }
        out.copy(distance, length)?;
    }

    Ok(())
}
