use crate::format::Format;
use std::io;
use thiserror::Error;

/// Possible errors that arise from attempting to convert compressed data into
/// its decompressed form, or vise-versa.
#[derive(Error, Debug)]
pub enum LzError {
    #[error("{operation} is not supported for {format}")]
    Unsupported {
        format: Format,
        operation: &'static str,
    },

    #[error("Compressed data is corrupted: {0}")]
    Corrupted(&'static str),

    #[error("Expected {format} data but found magic {magic:02x?}")]
    Unrecognized { format: Format, magic: [u8; 4] },

    #[error("Back-reference of {distance} bytes reaches past the {available} bytes of history")]
    BackreferenceTooDistant { distance: usize, available: usize },

    #[error("Decompressed data overflows the {limit} byte limit")]
    Overflow { limit: usize },

    #[error("Internal encoder error: {0}")]
    Internal(&'static str),

    #[error("{0}")]
    Io(io::Error),
}

impl From<io::Error> for LzError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::UnexpectedEof => LzError::Corrupted("unexpected end of input"),
            _ => LzError::Io(error),
        }
    }
}
