//! Bounded byte windows shared by the encoder and the decoders.
//!
//! [`History`] holds the bytes already produced (or consumed) so back-references can be
//! resolved. [`Staging`] holds the not-yet-encoded input that the encoder searches for matches.
//! Both compact themselves to keep memory bounded, and both always keep more bytes than the
//! largest back-reference distance of any supported format.

use crate::errors::LzError;
use crate::format::PRS_MAX_DISTANCE;
use slice_deque::SliceDeque;
use std::io::{self, Read};

/// Look-behind window of recently emitted bytes
#[derive(Debug)]
pub(crate) struct History {
    buf: SliceDeque<u8>,
    /// total bytes ever appended
    total: usize,
}

impl History {
    /// occupancy that triggers compaction
    pub(crate) const CAPACITY: usize = 0x8000;
    /// bytes dropped from the front on compaction
    pub(crate) const DISCARD: usize = 0x4000;

    pub(crate) fn new() -> Self {
        Self {
            buf: SliceDeque::with_capacity(Self::CAPACITY),
            total: 0,
        }
    }

    pub(crate) fn push(&mut self, byte: u8) {
        self.buf.push_back(byte);
        self.total += 1;

        if self.buf.len() >= Self::CAPACITY {
            self.buf.drain(..Self::DISCARD);
        }
    }

    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }

    /// Get the byte `distance` positions before the end of the window
    pub(crate) fn back(&self, distance: usize) -> Option<u8> {
        if distance == 0 || distance > self.buf.len() {
            return None;
        }

        Some(self.buf[self.buf.len() - distance])
    }

    /// the whole window, oldest byte first
    pub(crate) fn as_slice(&self) -> &[u8] {
        self.buf.as_slice()
    }

    /// number of bytes currently addressable
    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }
}

// compaction must never drop a byte a legal back-reference can reach
const _: () = assert!(History::CAPACITY - History::DISCARD > PRS_MAX_DISTANCE);

/// Look-ahead window filled from a reader
#[derive(Debug)]
pub(crate) struct Staging<R> {
    buf: SliceDeque<u8>,
    /// current position in `buf` for the start of the lookahead
    offset: usize,
    rdr: R,
    /// is there any more data to be read from `rdr`
    more_to_read: bool,
    /// total bytes read
    total_read: usize,
}

impl<R: Read> Staging<R> {
    pub(crate) const CAPACITY: usize = 0x8000;
    pub(crate) const COMPACT_AFTER: usize = 0x6000;
    pub(crate) const DISCARD: usize = 0x2000;
    /// refill once fewer bytes than this are left ahead of `offset`
    pub(crate) const MIN_AHEAD: usize = 0x100;

    pub(crate) fn new(rdr: R) -> io::Result<Self> {
        let mut staging = Self {
            buf: SliceDeque::with_capacity(Self::CAPACITY),
            offset: 0,
            rdr,
            more_to_read: true,
            total_read: 0,
        };
        staging.fill()?;

        Ok(staging)
    }

    /// the bytes that have not been encoded yet
    pub(crate) fn ahead(&self) -> &[u8] {
        &self.buf[self.offset..]
    }

    pub(crate) fn total_read(&self) -> usize {
        self.total_read
    }

    /// Compact the buffer if the cursor is far enough in, then read from `rdr` until at least
    /// `MIN_AHEAD` bytes are buffered or the reader is exhausted.
    /// Returns the number of newly read bytes.
    pub(crate) fn fill(&mut self) -> io::Result<usize> {
        if self.offset > Self::COMPACT_AFTER {
            self.buf.drain(..Self::DISCARD);
            self.offset -= Self::DISCARD;
        }

        let mut bytes_read = 0;
        while self.more_to_read && self.ahead().len() < Self::MIN_AHEAD {
            let len = self.buf.len();
            self.buf.resize(Self::CAPACITY, 0);

            let n = read_some(&mut self.rdr, &mut self.buf[len..]);
            let n = match n {
                Ok(n) => n,
                Err(e) => {
                    self.buf.truncate_back(len);
                    return Err(e);
                }
            };

            self.buf.truncate_back(len + n);
            if n == 0 {
                self.more_to_read = false;
            }
            bytes_read += n;
        }
        self.total_read += bytes_read;

        Ok(bytes_read)
    }

    /// Move the cursor forward by `n` encoded bytes and refill
    pub(crate) fn advance(&mut self, n: usize) -> Result<(), LzError> {
        if n > self.ahead().len() {
            return Err(LzError::Internal("lookahead cursor moved past the buffered input"));
        }
        self.offset += n;
        self.fill()?;

        Ok(())
    }
}

/// A single `read`, retried on interruption
fn read_some<R: Read>(rdr: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match rdr.read(buf) {
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            res => return res,
        }
    }
}
