use super::Output;
use crate::errors::LzError;
use crate::format::{PRS_MAX_DISTANCE, PRS_SHORT_DISTANCE};
use bitstream_io::{BitReader, LittleEndian};
use std::io::{Read, Write};

/// PRS control bits, consumed from the low bit upwards.
/// A fresh control byte is only pulled from the stream when the next bit is needed.
struct ControlBits {
    byte: u8,
    remaining: u8,
}

impl ControlBits {
    fn new() -> Self {
        Self {
            byte: 0,
            remaining: 0,
        }
    }

    fn next<R: Read>(&mut self, src: &mut BitReader<R, LittleEndian>) -> Result<bool, LzError> {
        if self.remaining == 0 {
            self.byte = src.read::<u8>(8)?;
            self.remaining = 8;
        }

        let bit = self.byte & 1 != 0;
        self.byte >>= 1;
        self.remaining -= 1;

        Ok(bit)
    }
}

/// Decode a PRS stream from `src` until the end sentinel, or until `max_size` bytes
/// have been produced. Bytes after the sentinel are never read.
pub(super) fn decode<R: Read, W: Write>(
    src: R,
    out: &mut Output<W>,
    max_size: Option<usize>,
) -> Result<(), LzError> {
    let mut src = BitReader::endian(src, LittleEndian);
    let mut ctrl = ControlBits::new();
    let limit = max_size.unwrap_or(usize::MAX);

    while out.written() < limit {
        if ctrl.next(&mut src)? {
            let byte = src.read::<u8>(8)?;
            out.literal(byte)?;
            continue;
        }

        let (distance, length) = if ctrl.next(&mut src)? {
            // long copy: 13 bit offset and 3 bit length, little endian
            let packed = src.read::<u16>(16)?;
            if packed == 0 {
                return out.end();
            }

            let distance = PRS_MAX_DISTANCE - (packed >> 3) as usize;
            let length = match packed & 0b111 {
                0 => src.read::<u8>(8)? as usize + 1,
                n => n as usize + 2,
            };
            (distance, length)
        } else {
            // short copy: two bit length, then an eight bit offset
            let high = ctrl.next(&mut src)? as usize;
            let low = ctrl.next(&mut src)? as usize;
            let offset = src.read::<u8>(8)? as usize;

            (PRS_SHORT_DISTANCE - offset, (high << 1 | low) + 2)
        };

        out.copy(distance, length.min(limit - out.written()))?;
    }

    Ok(())
}
