use crate::errors::LzError;
use crate::format::{PRS_MAX_DISTANCE, PRS_SHORT_DISTANCE};
use smallvec::SmallVec;
use std::io::Write;

/// Longest copy a PRS long copy can describe
const MAX_COPY: usize = 0x100;

/// Packs PRS control bits and the payload bytes that go with them.
///
/// Bits are shifted in from the top of the control byte, so the first bit written
/// ends up in bit 0 once the byte is full, which is where a reader looks first.
/// A control byte is written out together with every payload byte queued before its flush.
pub(crate) struct ControlStream<W> {
    wtr: W,
    control: u8,
    bits: u8,
    pending: SmallVec<[u8; 24]>,
    written: usize,
}

impl<W: Write> ControlStream<W> {
    pub(crate) fn new(wtr: W) -> Self {
        Self {
            wtr,
            control: 0,
            bits: 0,
            pending: SmallVec::new(),
            written: 0,
        }
    }

    pub(crate) fn put_control_bit(&mut self, bit: bool) -> Result<(), LzError> {
        self.put_control_bit_nosave(bit);
        self.put_control_save()
    }

    /// Add a control bit without flushing a full control byte.
    /// Use this when payload for the same command follows immediately.
    pub(crate) fn put_control_bit_nosave(&mut self, bit: bool) {
        self.control >>= 1;
        self.control |= (bit as u8) << 7;
        self.bits += 1;
    }

    /// Flush the control byte and its payload if all eight bits are used
    pub(crate) fn put_control_save(&mut self) -> Result<(), LzError> {
        if self.bits >= 8 {
            self.flush()?;
        }
        Ok(())
    }

    pub(crate) fn put_static_data(&mut self, byte: u8) {
        self.pending.push(byte);
    }

    pub(crate) fn put_raw_byte(&mut self, byte: u8) -> Result<(), LzError> {
        self.put_control_bit_nosave(true);
        self.put_static_data(byte);
        self.put_control_save()
    }

    /// Encode a copy of `length` bytes from `distance` bytes back.
    ///
    /// Short copies cover distances below 0x100 and lengths of 2 to 5 bytes.
    /// Everything else is a long copy, with the length packed into the offset
    /// for 3 to 9 bytes, or stored in an extra byte otherwise.
    pub(crate) fn put_copy(&mut self, distance: usize, length: usize) -> Result<(), LzError> {
        if distance == 0 || distance >= PRS_MAX_DISTANCE {
            return Err(LzError::Internal("copy distance out of range"));
        }
        if length < 2 || length > MAX_COPY {
            return Err(LzError::Internal("copy length out of range"));
        }

        let offset = -(distance as i32);
        if distance < PRS_SHORT_DISTANCE && length <= 5 {
            let size = (length - 2) as u8;
            self.put_control_bit(false)?;
            self.put_control_bit(false)?;
            self.put_control_bit(size & 0b10 != 0)?;
            self.put_control_bit_nosave(size & 0b01 != 0);
            self.put_static_data((offset & 0xFF) as u8);
        } else {
            self.put_control_bit(false)?;
            self.put_control_bit_nosave(true);
            if (3..=9).contains(&length) {
                let size = (length - 2) as i32;
                self.put_static_data((((offset << 3) & 0xF8) | (size & 0x07)) as u8);
                self.put_static_data(((offset >> 5) & 0xFF) as u8);
            } else {
                self.put_static_data(((offset << 3) & 0xF8) as u8);
                self.put_static_data(((offset >> 5) & 0xFF) as u8);
                self.put_static_data((length - 1) as u8);
            }
        }

        self.put_control_save()
    }

    fn flush(&mut self) -> Result<(), LzError> {
        self.wtr.write_all(&[self.control])?;
        self.wtr.write_all(&self.pending)?;
        self.written += 1 + self.pending.len();

        self.control = 0;
        self.bits = 0;
        self.pending.clear();

        Ok(())
    }

    /// Write the end of stream sentinel and flush everything out.
    /// Returns the total number of bytes written.
    pub(crate) fn finish(mut self) -> Result<usize, LzError> {
        self.put_control_bit(false)?;
        self.put_control_bit_nosave(true);
        // move the first bit of a partial byte down to bit 0
        self.control >>= 8 - self.bits;
        self.put_static_data(0);
        self.put_static_data(0);
        self.flush()?;
        self.wtr.flush()?;

        Ok(self.written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(f: impl FnOnce(&mut ControlStream<&mut Vec<u8>>)) -> Vec<u8> {
        let mut out = Vec::new();
        let mut ctrl = ControlStream::new(&mut out);
        f(&mut ctrl);
        let written = ctrl.finish().unwrap();
        assert_eq!(written, out.len());
        out
    }

    #[test]
    fn empty_stream() {
        assert_eq!(stream(|_| {}), [0x02, 0x00, 0x00]);
    }

    #[test]
    fn literal_then_long_copy() {
        let out = stream(|s| {
            s.put_raw_byte(b'A').unwrap();
            s.put_copy(1, 9).unwrap();
        });
        assert_eq!(out, [0x15, 0x41, 0xFF, 0xFF, 0x00, 0x00]);
    }

    #[test]
    fn short_copy() {
        let out = stream(|s| {
            s.put_raw_byte(b'A').unwrap();
            s.put_raw_byte(b'B').unwrap();
            s.put_copy(2, 4).unwrap();
        });
        assert_eq!(out, [0x93, b'A', b'B', 0xFE, 0x00, 0x00]);
    }

    #[test]
    fn long_copy_with_length_byte() {
        let out = stream(|s| {
            s.put_raw_byte(0).unwrap();
            s.put_copy(0x123, 0x100).unwrap();
        });
        // offset -0x123 => 0x1EDD in 13 bits
        assert_eq!(out, [0x15, 0x00, 0xE8, 0xF6, 0xFF, 0x00, 0x00]);
    }

    #[test]
    fn full_control_byte_keeps_its_payload() {
        let out = stream(|s| {
            for &b in b"abcdefgh" {
                s.put_raw_byte(b).unwrap();
            }
        });
        assert_eq!(out, b"\xffabcdefgh\x02\x00\x00");
    }

    #[test]
    fn rejects_unencodable_copies() {
        let mut out = Vec::new();
        let mut s = ControlStream::new(&mut out);

        assert!(matches!(s.put_copy(0, 3), Err(LzError::Internal(_))));
        assert!(matches!(s.put_copy(PRS_MAX_DISTANCE, 3), Err(LzError::Internal(_))));
        assert!(matches!(s.put_copy(1, 1), Err(LzError::Internal(_))));
        assert!(matches!(s.put_copy(1, 0x101), Err(LzError::Internal(_))));
    }
}
