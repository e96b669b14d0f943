use std::fs::File;
use std::io::{self, Read, Write};

use clap::{arg, value_parser, ArgGroup, ArgMatches, Command};
use retrolz::{Decoder, EncoderBuilder, Format, LzError};

fn cli() -> Command {
    Command::new("retrolz")
        .about("Compress and decompress PRS, or decompress Yaz0 and Yay0 data")
        .arg(arg!(--prs "Use the PRS format (default)"))
        .arg(arg!(--yaz0 "Use the Yaz0 format (decompression only)"))
        .arg(arg!(--yay0 "Use the Yay0 format (decompression only)"))
        .group(ArgGroup::new("format").args(["prs", "yaz0", "yay0"]))
        .arg(arg!(-d --decompress "Decompress the input instead of compressing it"))
        .arg(
            arg!(--skip <N> "Discard N bytes from the start of the input")
                .default_value("0")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            arg!(--passthrough <N> "Copy N bytes (after any skipped ones) to the output unchanged")
                .default_value("0")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            arg!(--"max-size" <N> "Stop after producing N decompressed bytes")
                .requires("decompress")
                .value_parser(value_parser!(usize)),
        )
        .arg(arg!(--log <FILE> "Write a trace of every command to FILE"))
        .arg(arg!([input] "input filename, or - for stdin"))
        .arg(arg!([output] "output filename, or - for stdout"))
}

fn main() {
    if let Err(err) = run(cli().get_matches()) {
        eprintln!("retrolz: {}", err);
        std::process::exit(1);
    }
}

fn run(matches: ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = Vec::new();
    match matches.get_one::<String>("input").map(String::as_str) {
        None | Some("-") => {
            io::stdin().read_to_end(&mut input)?;
        }
        Some(path) => input = std::fs::read(path)?,
    }

    let mut log = match matches.get_one::<String>("log") {
        Some(path) => Some(File::create(path)?),
        None => None,
    };

    // nothing is written out unless the whole input was processed
    let processed = process(&matches, &input, log.as_mut())?;

    let mut output: Box<dyn Write> = match matches.get_one::<String>("output").map(String::as_str) {
        None | Some("-") => Box::new(io::stdout().lock()),
        Some(path) => Box::new(File::create(path)?),
    };
    output.write_all(&processed)?;
    output.flush()?;

    Ok(())
}

/// Apply `--skip` and `--passthrough` to `input`, then run the codec over the rest
fn process(matches: &ArgMatches, input: &[u8], log: Option<&mut File>) -> Result<Vec<u8>, LzError> {
    let format = if matches.get_flag("yaz0") {
        Format::Yaz0
    } else if matches.get_flag("yay0") {
        Format::Yay0
    } else {
        Format::Prs
    };
    let decompress = matches.get_flag("decompress");

    if !decompress && format != Format::Prs {
        return Err(LzError::Unsupported {
            format,
            operation: "compression",
        });
    }

    // container formats often keep a raw header in front of the compressed blob
    let skip = matches.get_one::<usize>("skip").copied().unwrap_or(0);
    let rest = &input[skip.min(input.len())..];
    let passthrough = matches.get_one::<usize>("passthrough").copied().unwrap_or(0);
    let (raw, data) = rest.split_at(passthrough.min(rest.len()));

    let mut output = raw.to_vec();
    if decompress {
        let mut decoder = Decoder::for_bytes(data);
        decoder
            .format(format)
            .max_size(matches.get_one::<usize>("max-size").copied());
        if let Some(log) = log {
            decoder.with_logging(log);
        }
        output.extend(decoder.decode()?);
    } else {
        let mut encoder = EncoderBuilder::for_bytes(data);
        encoder.format(format);
        if let Some(log) = log {
            encoder.with_logging(log);
        }
        output.extend(encoder.encode_to_vec()?);
    }

    Ok(output)
}
