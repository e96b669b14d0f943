use crate::command::{Command, CommandLog, LogWtr};
use crate::errors::LzError;
use crate::format::{Format, Header};
use crate::history::History;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Cursor, Read, Write},
    path::Path,
};

mod prs;
mod yaz;

/// Specify the decoding settings, such as format, logging, input, and output.
///
/// To create a new `Decoder`, use [`for_reader()`], [`for_bytes()`], or
/// [`for_file()`]. Then, change any of the decoder settings.
/// Finally, decode the input data with [`decode()`], [`decode_to_writer()`], or [`decode_to_file()`].
/// ```
/// # use retrolz::{EncoderBuilder, Decoder};
/// let original = b"ABBACABBACD";
/// let compressed = EncoderBuilder::for_bytes(original)
///     .encode_to_vec()
///     .unwrap();
/// let decompressed = Decoder::for_bytes(&compressed)
///     .decode()
///     .unwrap();
/// assert_eq!(&original[..], decompressed);
/// ```
/// Yaz0 and Yay0 data carry their decompressed size in a header:
/// ```
/// # use retrolz::Decoder;
/// let data = b"Yaz0\x00\x00\x00\x05\x00\x00\x00\x00\x00\x00\x00\x00\xffHello";
/// let decompressed = Decoder::for_bytes(data)
///     .yaz0()
///     .decode()
///     .unwrap();
/// assert_eq!(decompressed, b"Hello");
/// ```
/// [`for_reader()`]: Decoder::for_reader
/// [`for_bytes()`]: Decoder::for_bytes
/// [`for_file()`]: Decoder::for_file
/// [`decode()`]: Decoder::decode
/// [`decode_to_writer()`]: Decoder::decode_to_writer
/// [`decode_to_file()`]: Decoder::decode_to_file
pub struct Decoder<'a, R: Read> {
    src: R,
    format: Format,
    max_size: Option<usize>,
    log: Option<LogWtr<'a>>,
}

impl<'a, R: Read> Decoder<'a, R> {
    /// Create a new PRS `Decoder` for the data in `rdr`.
    #[inline]
    pub fn for_reader(rdr: R) -> Self {
        Self {
            src: rdr,
            format: Format::Prs,
            max_size: None,
            log: None,
        }
    }

    #[inline]
    pub fn format(&mut self, format: Format) -> &mut Self {
        self.format = format;
        self
    }

    /// Convenience method to decode PRS without importing [`Format`].
    #[inline]
    pub fn prs(&mut self) -> &mut Self {
        self.format(Format::Prs)
    }

    /// Convenience method to decode Yaz0 without importing [`Format`].
    #[inline]
    pub fn yaz0(&mut self) -> &mut Self {
        self.format(Format::Yaz0)
    }

    /// Convenience method to decode Yay0 without importing [`Format`].
    #[inline]
    pub fn yay0(&mut self) -> &mut Self {
        self.format(Format::Yay0)
    }

    /// Limit the number of decompressed bytes.
    ///
    /// PRS decoding stops early once `max` bytes have been produced.
    /// For Yaz0 and Yay0, the limit is exact: a command that would write past it
    /// fails with [`LzError::Overflow`].
    #[inline]
    pub fn max_size(&mut self, max: Option<usize>) -> &mut Self {
        self.max_size = max;
        self
    }

    /// Write a trace of every decoded command to `wtr`
    #[inline]
    pub fn with_logging<W: Write>(&mut self, wtr: &'a mut W) -> &mut Self {
        self.log = Some(wtr as LogWtr);
        self
    }

    /// Decompress the input into a `Vec<u8>`
    #[inline]
    pub fn decode(&mut self) -> Result<Vec<u8>, LzError> {
        let mut output = Vec::new();
        self.decode_to_writer(&mut output).map(|_| output)
    }

    /// Decompress the input into `wtr`, returning the number of bytes written
    #[inline]
    pub fn decode_to_writer<W: Write>(&mut self, wtr: W) -> Result<usize, LzError> {
        do_decode(self, wtr)
    }

    /// Decompress the input into the newly created `File` at `p`
    #[inline]
    pub fn decode_to_file<P: AsRef<Path>>(&mut self, p: P) -> Result<usize, LzError> {
        let wtr = File::create(p)?;
        self.decode_to_writer(wtr)
    }
}

impl<'a> Decoder<'a, Cursor<&'a [u8]>> {
    #[inline]
    pub fn for_bytes(bytes: &'a [u8]) -> Self {
        let rdr = Cursor::new(bytes);
        Self::for_reader(rdr)
    }
}

impl<'a> Decoder<'a, BufReader<File>> {
    #[inline]
    pub fn for_file<P: AsRef<Path>>(p: P) -> Result<Self, LzError> {
        File::open(p)
            .map(BufReader::new)
            .map(Self::for_reader)
            .map_err(Into::into)
    }
}

/// Decompress `format` data from `rdr` into `wtr`, returning the number of bytes written
///
/// A `max_size` of zero means there is no limit beyond what the data itself declares.
/// This is a convenience function to decode without having to set up a [`Decoder`].
pub fn decompress<R: Read, W: Write>(
    format: Format,
    rdr: R,
    wtr: W,
    max_size: usize,
) -> Result<usize, LzError> {
    let max_size = if max_size == 0 { None } else { Some(max_size) };

    Decoder::for_reader(rdr)
        .format(format)
        .max_size(max_size)
        .decode_to_writer(wtr)
}

fn do_decode<R: Read, W: Write>(opts: &mut Decoder<R>, wtr: W) -> Result<usize, LzError> {
    let Decoder {
        src,
        format,
        max_size,
        log,
    } = opts;

    let mut out = Output::new(BufWriter::new(wtr), log);
    match format {
        Format::Prs => prs::decode(src, &mut out, *max_size)?,
        Format::Yaz0 => yaz::decode_yaz0(src, &mut out, *max_size)?,
        Format::Yay0 => yaz::decode_yay0(src, &mut out, *max_size)?,
    }

    out.finish()
}

/// The decompressed output and the history used to resolve back-references
pub(crate) struct Output<'l, 'a, W: Write> {
    wtr: BufWriter<W>,
    history: History,
    log: CommandLog<'l, 'a>,
}

impl<'l, 'a, W: Write> Output<'l, 'a, W> {
    fn new(wtr: BufWriter<W>, log: &'l mut Option<LogWtr<'a>>) -> Self {
        Self {
            wtr,
            history: History::new(),
            log: CommandLog::new(log),
        }
    }

    /// total bytes written out
    pub(crate) fn written(&self) -> usize {
        self.history.total()
    }

    pub(crate) fn header(&mut self, header: &Header) -> Result<(), LzError> {
        self.log.header(header).map_err(Into::into)
    }

    pub(crate) fn end(&mut self) -> Result<(), LzError> {
        self.log.record(self.written(), Command::End).map_err(Into::into)
    }

    pub(crate) fn literal(&mut self, byte: u8) -> Result<(), LzError> {
        self.log.record(self.written(), Command::Literal(byte))?;
        self.history.push(byte);
        self.wtr.write_all(&[byte])?;

        Ok(())
    }

    /// Copy `length` bytes starting `distance` bytes back, one at a time so that
    /// overlapping copies repeat their pattern
    pub(crate) fn copy(&mut self, distance: usize, length: usize) -> Result<(), LzError> {
        let too_distant = |history: &History| LzError::BackreferenceTooDistant {
            distance,
            available: history.len(),
        };
        if distance == 0 || distance > self.history.len() {
            return Err(too_distant(&self.history));
        }

        self.log
            .record(self.written(), Command::Copy { distance, length })?;

        for _ in 0..length {
            let byte = self
                .history
                .back(distance)
                .ok_or_else(|| too_distant(&self.history))?;
            self.history.push(byte);
            self.wtr.write_all(&[byte])?;
        }

        Ok(())
    }

    fn finish(mut self) -> Result<usize, LzError> {
        let written = self.written();
        self.log.summary(written, None)?;
        self.wtr.flush()?;

        Ok(written)
    }
}
