use crate::format::Header;
use std::{collections::BTreeMap, fmt, io, io::Write};

pub(crate) type LogWtr<'a> = &'a mut dyn Write;

/// A single decoded (or encoded) LZSS operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Literal(u8),
    Copy { distance: usize, length: usize },
    End,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Literal(byte) => write!(f, "Literal: {:02x}", byte),
            Self::Copy { distance, length } => {
                write!(f, "Copy: length {} | distance {}", length, distance)
            }
            Self::End => write!(f, "End of stream"),
        }
    }
}

/// Writes a trace of commands to an optional log, and tallies them for a final summary
pub(crate) struct CommandLog<'l, 'a> {
    log: &'l mut Option<LogWtr<'a>>,
    literals: u64,
    // copy length => times seen
    lengths: BTreeMap<usize, u64>,
}

impl<'l, 'a> CommandLog<'l, 'a> {
    pub(crate) fn new(log: &'l mut Option<LogWtr<'a>>) -> Self {
        Self {
            log,
            literals: 0,
            lengths: BTreeMap::new(),
        }
    }

    pub(crate) fn header(&mut self, header: &Header) -> io::Result<()> {
        if let Some(wtr) = self.log.as_mut() {
            writeln!(wtr, "# Header\n{}\n", header)?;
        }
        Ok(())
    }

    /// Record `cmd` as occuring at output position `pos`
    pub(crate) fn record(&mut self, pos: usize, cmd: Command) -> io::Result<()> {
        let wtr = match self.log.as_mut() {
            Some(wtr) => wtr,
            None => return Ok(()),
        };
        writeln!(wtr, "{:06x} - {}", pos, cmd)?;

        match cmd {
            Command::Literal(..) => self.literals += 1,
            Command::Copy { length, .. } => *self.lengths.entry(length).or_insert(0) += 1,
            Command::End => {}
        }
        Ok(())
    }

    pub(crate) fn summary(&mut self, uncompressed: usize, compressed: Option<usize>) -> io::Result<()> {
        let wtr = match self.log.as_mut() {
            Some(wtr) => wtr,
            None => return Ok(()),
        };

        let copies: u64 = self.lengths.values().sum();
        writeln!(wtr)?;
        writeln!(wtr, "# Summary")?;
        writeln!(wtr, "uncompressed size: {}", uncompressed)?;
        if let Some(size) = compressed {
            writeln!(wtr, "compressed size: {}", size)?;
        }
        writeln!(wtr, "literals: {} | copies: {}", self.literals, copies)?;
        writeln!(wtr, "## Copy Length Frequencies")?;
        for (length, count) in &self.lengths {
            writeln!(wtr, "{:3} : {}", length, count)?;
        }

        Ok(())
    }
}
