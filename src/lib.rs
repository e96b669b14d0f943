//! Compression and decompression for the LZSS formats found in retro game assets:
//! Sega's PRS, and Nintendo's Yaz0 and Yay0.
//!
//! PRS data can be compressed and decompressed, while Yaz0 and Yay0 data can be decompressed.
//! See the [`format`] module for how each format lays out its bits.
//! ```
//! # use retrolz::{EncoderBuilder, Decoder};
//! let compressed = EncoderBuilder::for_bytes(b"AAAAAAAAAA").encode_to_vec().unwrap();
//! assert_eq!(compressed, [0x15, 0x41, 0xFF, 0xFF, 0x00, 0x00]);
//!
//! let decompressed = Decoder::for_bytes(&compressed).decode().unwrap();
//! assert_eq!(decompressed, b"AAAAAAAAAA");
//! ```

mod command;
mod decode;
mod encode;
mod errors;
pub mod format;
mod history;

pub use decode::{decompress, Decoder};
pub use encode::{compress, EncoderBuilder};
pub use errors::LzError;
pub use format::{header_info, Format, Header};
