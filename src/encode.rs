use crate::{command::LogWtr, errors::LzError, format::Format};
use std::{
    fs::File,
    io::Write,
    io::{BufReader, BufWriter, Cursor, Read},
    path::Path,
};

mod control;
mod lzss;

/// Specify the encoding settings, such as format, input limit, logging, input, and output
///
/// To create a new `EncoderBuilder`, use [`for_reader()`], [`for_file()`], or [`for_bytes()`].
/// Then, change any of the encoding settings with `EncoderBuilder`'s helper methods.
/// Finally, encode the input data with [`encode_to_writer()`], [`encode_to_file()`], or [`encode_to_vec()`].
/// ```
/// # use retrolz::EncoderBuilder;
/// let input = b"ABBACABBCADFEGABA";
/// let compressed = EncoderBuilder::for_bytes(input)
///     .limit(Some(8))
///     .with_logging(&mut ::std::io::stdout())
///     .encode_to_vec();
/// ```
///
/// The default encoding settings are as follows:
/// * PRS output (the only format that can be compressed)
/// * Read the input until it is exhausted
/// * No logging
///
/// [`for_reader()`]: EncoderBuilder::for_reader
/// [`for_file()`]: EncoderBuilder::for_file
/// [`for_bytes()`]: EncoderBuilder::for_bytes
/// [`encode_to_writer()`]: EncoderBuilder::encode_to_writer
/// [`encode_to_file()`]: EncoderBuilder::encode_to_file
/// [`encode_to_vec()`]: EncoderBuilder::encode_to_vec
pub struct EncoderBuilder<'a, R> {
    rdr: R,
    format: Format,
    limit: Option<u64>,
    log: Option<LogWtr<'a>>,
}

impl<'a, R: Read> EncoderBuilder<'a, R> {
    /// Create a new `EncoderBuilder` for the data in `rdr`.
    #[inline]
    pub fn for_reader(rdr: R) -> Self {
        Self {
            rdr,
            format: Format::Prs,
            limit: None,
            log: None,
        }
    }

    /// Set the output format. Only [`Format::Prs`] can be encoded; the others
    /// fail with [`LzError::Unsupported`] when encoding starts.
    #[inline]
    pub fn format(&mut self, format: Format) -> &mut Self {
        self.format = format;
        self
    }

    /// Only compress the first `limit` bytes of the input, or all of it for `None`.
    #[inline]
    pub fn limit(&mut self, limit: Option<u64>) -> &mut Self {
        self.limit = limit;
        self
    }

    /// Write debugging and diagnotic information to `log` while the input is
    /// being encoded.
    #[inline]
    pub fn with_logging<L: Write>(&mut self, log: &'a mut L) -> &mut Self {
        let log = Some(log as &'a mut dyn Write);
        self.log = log;
        self
    }

    /// Start the encoding and write the compressed data out to `wtr`.
    /// Returns the number of compressed bytes written.
    #[inline]
    pub fn encode_to_writer<W: Write>(&mut self, wtr: W) -> Result<usize, LzError> {
        do_encode(self, wtr)
    }

    /// Start the encoding and write the compressed data out to the newly created
    /// `File` `f`
    #[inline]
    pub fn encode_to_file<P: AsRef<Path>>(&mut self, f: P) -> Result<usize, LzError> {
        let wtr = File::create(f)?;
        self.encode_to_writer(wtr)
    }

    /// Start the encoding and return the compressed data in a `Vec<u8>`.
    #[inline]
    pub fn encode_to_vec(&mut self) -> Result<Vec<u8>, LzError> {
        let data = Vec::new();
        let mut csr = Cursor::new(data);
        self.encode_to_writer(&mut csr).map(|_| csr.into_inner())
    }
}

impl<'a> EncoderBuilder<'a, BufReader<File>> {
    /// Create a new `EncoderBuilder` for the file at `p`.
    #[inline]
    pub fn for_file<P: AsRef<Path>>(p: P) -> Result<Self, LzError> {
        let rdr = BufReader::new(File::open(p)?);
        Ok(Self::for_reader(rdr))
    }
}

impl<'a> EncoderBuilder<'a, Cursor<&'a [u8]>> {
    /// Create a new `EncoderBuilder` for the data the `bytes` slice.
    #[inline]
    pub fn for_bytes(bytes: &'a [u8]) -> Self {
        let rdr = Cursor::new(bytes);
        Self::for_reader(rdr)
    }
}

/// Compress all of `rdr` as `format` into `wtr`, returning the number of bytes written
///
/// This is a convenience function to encode a `Read`er without having to
/// import and set up an [`EncoderBuilder`].
pub fn compress<R: Read, W: Write>(format: Format, rdr: R, wtr: W) -> Result<usize, LzError> {
    EncoderBuilder::for_reader(rdr)
        .format(format)
        .encode_to_writer(wtr)
}

fn do_encode<R: Read, W: Write>(
    opts: &mut EncoderBuilder<'_, R>,
    wtr: W,
) -> Result<usize, LzError> {
    let EncoderBuilder {
        rdr,
        format,
        limit,
        log,
    } = opts;

    if *format != Format::Prs {
        return Err(LzError::Unsupported {
            format: *format,
            operation: "compression",
        });
    }

    let wtr = BufWriter::new(wtr);
    match limit {
        Some(n) => lzss::compress_rdr(rdr.take(*n), wtr, log),
        None => lzss::compress_rdr(rdr, wtr, log),
    }
}
