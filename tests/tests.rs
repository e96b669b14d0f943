use bitstream_io::{BigEndian, BitWriter};
use retrolz::{format, Decoder, EncoderBuilder, Format, Header, LzError};
use std::io::Cursor;
use std::str::from_utf8;

/// Hand assembles PRS streams, while keeping the plain output they describe
struct PrsStream {
    out: Vec<u8>,
    ctrl_pos: usize,
    bit: u8,
    expected: Vec<u8>,
}

impl PrsStream {
    fn new() -> Self {
        Self {
            out: vec![0],
            ctrl_pos: 0,
            bit: 0,
            expected: Vec::new(),
        }
    }

    fn bit(&mut self, set: bool) {
        if self.bit == 8 {
            self.ctrl_pos = self.out.len();
            self.out.push(0);
            self.bit = 0;
        }
        if set {
            self.out[self.ctrl_pos] |= 1 << self.bit;
        }
        self.bit += 1;
    }

    fn literal(&mut self, byte: u8) -> &mut Self {
        self.bit(true);
        self.out.push(byte);
        self.expected.push(byte);
        self
    }

    fn literals(&mut self, bytes: &[u8]) -> &mut Self {
        for &b in bytes {
            self.literal(b);
        }
        self
    }

    fn short(&mut self, distance: usize, length: usize) -> &mut Self {
        let size = length - 2;
        self.bit(false);
        self.bit(false);
        self.bit(size & 2 != 0);
        self.bit(size & 1 != 0);
        self.out.push((0x100 - distance) as u8);
        self.expect_copy(distance, length)
    }

    fn long(&mut self, distance: usize, length: usize) -> &mut Self {
        let mut packed = ((0x2000 - distance) << 3) as u16;
        self.bit(false);
        self.bit(true);
        if (3..=9).contains(&length) {
            packed |= (length - 2) as u16;
            self.out.extend_from_slice(&packed.to_le_bytes());
        } else {
            self.out.extend_from_slice(&packed.to_le_bytes());
            self.out.push((length - 1) as u8);
        }
        self.expect_copy(distance, length)
    }

    fn expect_copy(&mut self, distance: usize, length: usize) -> &mut Self {
        let start = self.expected.len() - distance;
        for i in start..start + length {
            let byte = self.expected[i];
            self.expected.push(byte);
        }
        self
    }

    fn end(&mut self) -> (Vec<u8>, Vec<u8>) {
        self.bit(false);
        self.bit(true);
        self.out.extend_from_slice(&[0, 0]);
        (self.out.clone(), self.expected.clone())
    }
}

fn pattern(n: usize) -> Vec<u8> {
    let mut state = 0x1234_5678u32;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (state >> 16) as u8
        })
        .collect()
}

/// Pseudo random blocks, some of which repeat an earlier block
fn blocky(n: usize) -> Vec<u8> {
    let noise = pattern(n);
    let mut data = Vec::with_capacity(n);
    let mut i = 0;
    while data.len() < n {
        let pick = noise[i % noise.len()] as usize;
        let block = 16 + pick % 48;
        if data.len() > 0x100 && pick % 3 == 0 {
            let distance = 1 + (pick * 97 + i * 13) % data.len().min(0x3000);
            let start = data.len() - distance;
            for j in 0..block {
                let byte = data[start + j];
                data.push(byte);
            }
        } else {
            data.extend_from_slice(&noise[i..(i + block).min(n)]);
        }
        i += block;
    }
    data.truncate(n);
    data
}

fn prs_round_trip(data: &[u8]) {
    let compressed = EncoderBuilder::for_bytes(data).encode_to_vec().unwrap();
    let decompressed = Decoder::for_bytes(&compressed).decode().unwrap();

    assert_eq!(decompressed.len(), data.len());
    assert!(decompressed == data, "round trip mismatch");
}

#[test]
fn decode_yaz0_hello() {
    let hello = include_bytes!("hello.yaz0");
    let mut reader = Cursor::new(hello.as_ref());

    let decoded = Decoder::for_reader(&mut reader).yaz0().decode().unwrap();
    assert_eq!(from_utf8(&decoded).unwrap(), "Hello");
}

#[test]
fn yaz0_header_info() {
    let hello = include_bytes!("hello.yaz0");
    let header = retrolz::header_info(Format::Yaz0, &hello[..]).unwrap();

    assert_eq!(
        header,
        Header::Yaz0(format::Yaz0Header {
            size: 5,
            alignment: 0
        })
    );
    assert!(matches!(
        retrolz::header_info(Format::Prs, &hello[..]),
        Err(LzError::Unsupported { .. })
    ));
}

#[test]
fn decode_yay0_regions() {
    let compressed = include_bytes!("regions.yay0");
    let expected = include_bytes!("regions.bin");

    let decoded = Decoder::for_bytes(compressed).yay0().decode().unwrap();
    assert_eq!(expected.as_ref(), decoded.as_slice(), "error decoding Yay0 regions");
}

#[test]
fn yay0_offsets_outside_input() {
    let mut compressed = include_bytes!("regions.yay0").to_vec();
    compressed[8..12].copy_from_slice(&0x100u32.to_be_bytes());

    match Decoder::for_bytes(&compressed).yay0().decode() {
        Err(LzError::Corrupted(_)) => {}
        other => panic!("expected corrupted error, got {:?}", other),
    }
}

#[test]
fn prs_concrete_run() {
    let expected = include_bytes!("aaaa.prs");

    let compressed = EncoderBuilder::for_bytes(b"AAAAAAAAAA").encode_to_vec().unwrap();
    assert_eq!(compressed, expected.as_ref());

    let decoded = Decoder::for_bytes(expected).decode().unwrap();
    assert_eq!(decoded, b"AAAAAAAAAA");
}

#[test]
fn prs_ignores_trailing_bytes() {
    let mut stream = include_bytes!("aaaa.prs").to_vec();
    stream.extend_from_slice(b"\x01\x02garbage\xff");

    let decoded = Decoder::for_bytes(&stream).decode().unwrap();
    assert_eq!(decoded, b"AAAAAAAAAA");
}

#[test]
fn prs_round_trips() {
    prs_round_trip(b"");
    prs_round_trip(b"x");
    prs_round_trip(b"ABBACABBACD");
    prs_round_trip(&[0u8; 5000]);
    prs_round_trip(&pattern(3000));
    prs_round_trip(include_bytes!("tests.rs"));
}

#[test]
fn prs_round_trip_past_history_capacity() {
    prs_round_trip(&blocky(0x1_2345));
}

#[test]
fn prs_self_overlapping_copy() {
    let (stream, expected) = PrsStream::new().literal(b'z').long(1, 10).end();

    let decoded = Decoder::for_bytes(&stream).decode().unwrap();
    assert_eq!(decoded, expected);
    assert_eq!(decoded, [b'z'; 11]);
}

#[test]
fn prs_window_boundaries() {
    let (stream, expected) = PrsStream::new()
        .literals(&pattern(0x2000))
        .long(0x2000, 5)
        .long(0x1FFF, 0x100)
        .short(0x100, 2)
        .short(0xFF, 5)
        .long(0x100, 9)
        .end();

    let decoded = Decoder::for_bytes(&stream).decode().unwrap();
    assert!(decoded == expected);
}

#[test]
fn prs_compaction_is_transparent() {
    let mut builder = PrsStream::new();
    builder.literals(&pattern(0x9000));
    for i in 0..0x40 {
        builder.long(0x1FFF - i * 31, 0x100).short(0xFF - i, 3);
    }
    let (stream, expected) = builder.end();
    assert!(expected.len() > 0xC000);

    let decoded = Decoder::for_bytes(&stream).decode().unwrap();
    assert!(decoded == expected);
}

#[test]
fn prs_rejects_distance_past_start() {
    let (stream, _) = PrsStream::new().literal(1).end();
    let mut bad = stream.clone();
    // replace the sentinel with a copy two bytes back
    let len = bad.len();
    bad[len - 2..].copy_from_slice(&(((0x2000u16 - 2) << 3) | 1).to_le_bytes());
    bad.extend_from_slice(&[0x02, 0x00, 0x00]);

    match Decoder::for_bytes(&bad).decode() {
        Err(LzError::BackreferenceTooDistant {
            distance: 2,
            available: 1,
        }) => {}
        other => panic!("expected distance error, got {:?}", other),
    }
}

#[test]
fn prs_truncated_stream() {
    let compressed = EncoderBuilder::for_bytes(b"hello world, hello world")
        .encode_to_vec()
        .unwrap();

    for cut in [0, 1, compressed.len() - 1, compressed.len() - 2] {
        match Decoder::for_bytes(&compressed[..cut]).decode() {
            Err(LzError::Corrupted(_)) => {}
            other => panic!("expected corrupted error at {}, got {:?}", cut, other),
        }
    }
}

#[test]
fn prs_max_size_stops_early() {
    let decoded = Decoder::for_bytes(include_bytes!("aaaa.prs"))
        .max_size(Some(4))
        .decode()
        .unwrap();
    assert_eq!(decoded, b"AAAA");

    let mut out = Vec::new();
    let written = retrolz::decompress(Format::Prs, &include_bytes!("aaaa.prs")[..], &mut out, 0).unwrap();
    assert_eq!(written, 10);
}

#[test]
fn prs_encoder_respects_window() {
    let needle = pattern(64);
    let mut data = needle.clone();
    data.resize(format::PRS_WINDOW, b'-');
    data.extend_from_slice(&needle);

    let mut log = Vec::new();
    let compressed = EncoderBuilder::for_bytes(&data)
        .with_logging(&mut log)
        .encode_to_vec()
        .unwrap();

    let log = String::from_utf8(log).unwrap();
    for line in log.lines().filter(|l| l.contains("Copy:")) {
        let distance: usize = line.rsplit(' ').next().unwrap().parse().unwrap();
        assert!(distance < format::PRS_WINDOW, "{}", line);
    }

    let decoded = Decoder::for_bytes(&compressed).decode().unwrap();
    assert!(decoded == data);
}

#[test]
fn prs_encoder_limit() {
    let compressed = EncoderBuilder::for_bytes(b"ABCDEFGH")
        .limit(Some(3))
        .encode_to_vec()
        .unwrap();

    let decoded = Decoder::for_bytes(&compressed).decode().unwrap();
    assert_eq!(decoded, b"ABC");
}

#[test]
fn decoder_logging() {
    let mut log = Vec::new();
    Decoder::for_bytes(include_bytes!("aaaa.prs"))
        .with_logging(&mut log)
        .decode()
        .unwrap();

    let log = String::from_utf8(log).unwrap();
    assert!(log.contains("000000 - Literal: 41"));
    assert!(log.contains("000001 - Copy: length 9 | distance 1"));
    assert!(log.contains("00000a - End of stream"));
    assert!(log.contains("literals: 1 | copies: 1"));
}

/// Build a Yaz0 file from a list of commands: `Ok(byte)` literals or `Err((distance, length))` copies
fn yaz0_file(size: u32, commands: &[Result<u8, (usize, usize)>]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut wtr = BitWriter::endian(&mut out, BigEndian);
        let header = format::Yaz0Header { size, alignment: 0 };
        header.write(&mut wtr).unwrap();
    }
    assert_eq!(&out[..4], b"Yaz0");

    for group in commands.chunks(8) {
        let ctrl_pos = out.len();
        out.push(0);
        for (i, cmd) in group.iter().enumerate() {
            match *cmd {
                Ok(byte) => {
                    out[ctrl_pos] |= 0x80 >> i;
                    out.push(byte);
                }
                Err((distance, length)) if length >= 0x12 => {
                    out.extend_from_slice(&((distance - 1) as u16).to_be_bytes());
                    out.push((length - 0x12) as u8);
                }
                Err((distance, length)) => {
                    let code = ((length - 2) << 12 | (distance - 1)) as u16;
                    out.extend_from_slice(&code.to_be_bytes());
                }
            }
        }
    }
    out
}

#[test]
fn yaz0_window_boundary() {
    let literals = pattern(format::YAZ_MAX_DISTANCE);
    let mut commands: Vec<_> = literals.iter().map(|&b| Ok(b)).collect();
    commands.push(Err((0x1000, 3)));
    commands.push(Err((0x1000, 0x111)));

    let file = yaz0_file(0x1000 + 3 + 0x111, &commands);
    let decoded = Decoder::for_bytes(&file).yaz0().decode().unwrap();

    let mut expected = literals.clone();
    for _ in 0..3 + 0x111 {
        expected.push(expected[expected.len() - 0x1000]);
    }
    assert!(decoded == expected);
}

#[test]
fn yaz0_self_overlapping_copy() {
    let file = yaz0_file(11, &[Ok(b'q'), Err((1, 10))]);
    let decoded = Decoder::for_bytes(&file).yaz0().decode().unwrap();

    assert_eq!(decoded, [b'q'; 11]);
}

#[test]
fn yaz0_rejects_distance_past_start() {
    let file = yaz0_file(4, &[Ok(1), Err((2, 3))]);

    match Decoder::for_bytes(&file).yaz0().decode() {
        Err(LzError::BackreferenceTooDistant {
            distance: 2,
            available: 1,
        }) => {}
        other => panic!("expected distance error, got {:?}", other),
    }
}

#[test]
fn yaz0_overflow() {
    let file = yaz0_file(4, &[Ok(1), Ok(2), Err((2, 3))]);

    match Decoder::for_bytes(&file).yaz0().decode() {
        Err(LzError::Overflow { limit: 4 }) => {}
        other => panic!("expected overflow, got {:?}", other),
    }

    let file = yaz0_file(5, &[Ok(1), Ok(2), Err((2, 3))]);
    match Decoder::for_bytes(&file).yaz0().max_size(Some(4)).decode() {
        Err(LzError::Overflow { limit: 4 }) => {}
        other => panic!("expected overflow, got {:?}", other),
    }
}

#[test]
fn yaz0_bad_magic() {
    let mut file = include_bytes!("hello.yaz0").to_vec();
    file[3] = b'1';

    match Decoder::for_bytes(&file).yaz0().decode() {
        Err(LzError::Unrecognized {
            format: Format::Yaz0,
            magic,
        }) => assert_eq!(&magic, b"Yaz1"),
        other => panic!("expected unrecognized magic, got {:?}", other),
    }

    // a Yaz0 file is not Yay0
    assert!(matches!(
        Decoder::for_bytes(include_bytes!("hello.yaz0")).yay0().decode(),
        Err(LzError::Unrecognized { .. })
    ));
}

#[test]
fn yaz0_truncated() {
    let file = include_bytes!("hello.yaz0");

    match Decoder::for_bytes(&file[..file.len() - 1]).yaz0().decode() {
        Err(LzError::Corrupted(_)) => {}
        other => panic!("expected corrupted error, got {:?}", other),
    }
}

#[test]
fn compress_yaz_is_unsupported() {
    for &format in &[Format::Yaz0, Format::Yay0] {
        let mut out = Vec::new();
        match retrolz::compress(format, &b"data"[..], &mut out) {
            Err(LzError::Unsupported {
                format: f,
                operation: "compression",
            }) => assert_eq!(f, format),
            other => panic!("expected unsupported error, got {:?}", other),
        }
        assert!(out.is_empty());
    }
}
