use std::io::{Read, Write};

use crate::{
    command::{Command, CommandLog, LogWtr},
    errors::LzError,
    format::{PRS_MAX_MATCH, PRS_MIN_MATCH, PRS_WINDOW},
    history::{History, Staging},
};

use super::control::ControlStream;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(super) struct MoveBack {
    size: usize,     // length
    moveback: usize, // distance
}

impl MoveBack {
    fn new(size: usize, moveback: usize) -> Self {
        Self { size, moveback }
    }
}

/// Compress all of `input` as PRS into `wtr`, returning the number of bytes written.
/// Debugging information will be printed to `log` if present.
pub(super) fn compress_rdr<R: Read, W: Write>(
    input: R,
    wtr: W,
    log: &mut Option<LogWtr<'_>>,
) -> Result<usize, LzError> {
    let mut ahead = Staging::new(input)?;
    let mut behind = History::new();
    let mut out = ControlStream::new(wtr);
    let mut log = CommandLog::new(log);

    while !ahead.ahead().is_empty() {
        let pos = behind.total();

        let bytes_matched = match find_match(&behind, ahead.ahead()) {
            Some(m) => {
                log.record(
                    pos,
                    Command::Copy {
                        distance: m.moveback,
                        length: m.size,
                    },
                )?;
                out.put_copy(m.moveback, m.size)?;
                behind.extend(&ahead.ahead()[..m.size]);
                m.size
            }
            None => {
                let byte = ahead.ahead()[0];
                log.record(pos, Command::Literal(byte))?;
                out.put_raw_byte(byte)?;
                behind.push(byte);
                1
            }
        };

        ahead.advance(bytes_matched)?;
    }

    log.record(behind.total(), Command::End)?;
    let written = out.finish()?;
    log.summary(ahead.total_read(), Some(written))?;

    Ok(written)
}

/// Greedy search for the longest match of `ahead` in the window behind it.
///
/// Distances are tried from nearest to farthest, and only a strictly longer match replaces
/// the current best, so the nearest of equally long matches wins. A match may run past the
/// current position into `ahead`, which is how runs become a single overlapping copy.
fn find_match(behind: &History, ahead: &[u8]) -> Option<MoveBack> {
    let longest_match = ahead.len().min(PRS_MAX_MATCH);
    if longest_match < PRS_MIN_MATCH {
        return None;
    }
    let history = behind.as_slice();
    let window_size = history.len().min(PRS_WINDOW - 1);

    // byte `i` of a match starting `distance` back
    let source = |distance: usize, i: usize| {
        if i < distance {
            history[history.len() - distance + i]
        } else {
            ahead[i - distance]
        }
    };

    let mut best: Option<MoveBack> = None;
    for distance in 1..=window_size {
        if source(distance, 0) != ahead[0] {
            continue;
        }
        // a candidate can only win if it also matches where the current best stopped
        if let Some(b) = best {
            if source(distance, b.size) != ahead[b.size] {
                continue;
            }
        }

        let in_history = distance.min(longest_match);
        let start = history.len() - distance;
        let mut length = history[start..start + in_history]
            .iter()
            .zip(ahead)
            .take_while(|(a, b)| a == b)
            .count();
        if length == in_history {
            length += (length..longest_match)
                .take_while(|&i| ahead[i] == ahead[i - distance])
                .count();
        }

        if length >= PRS_MIN_MATCH && best.map_or(true, |b| length > b.size) {
            best = Some(MoveBack::new(length, distance));
            if length == longest_match {
                break;
            }
        }
    }

    best
}
