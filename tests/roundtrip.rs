use proptest::arbitrary::any;
use proptest::collection::vec;
use proptest::{prop_assert, prop_assert_eq};
use retrolz::{Decoder, EncoderBuilder};
use test_strategy::proptest;

#[proptest]
fn prs_round_trips_random_bytes(#[strategy(vec(any::<u8>(), 0..2048))] data: Vec<u8>) {
    let compressed = EncoderBuilder::for_bytes(&data).encode_to_vec().unwrap();
    let decompressed = Decoder::for_bytes(&compressed).decode().unwrap();

    prop_assert_eq!(decompressed, data);
}

#[proptest]
fn prs_round_trips_repetitive_bytes(#[strategy(vec(0u8..4, 0..4096))] data: Vec<u8>) {
    let compressed = EncoderBuilder::for_bytes(&data).encode_to_vec().unwrap();
    let decompressed = Decoder::for_bytes(&compressed).decode().unwrap();

    prop_assert_eq!(decompressed, data);
}

#[proptest]
fn prs_never_outgrows_literal_encoding(#[strategy(vec(any::<u8>(), 0..1024))] data: Vec<u8>) {
    let compressed = EncoderBuilder::for_bytes(&data).encode_to_vec().unwrap();

    // one control bit per literal, plus the sentinel
    let bound = data.len() + (data.len() + 2 + 7) / 8 + 2;
    prop_assert!(compressed.len() <= bound);
}

#[proptest]
fn prs_max_size_yields_a_prefix(
    #[strategy(vec(0u8..8, 1..1024))] data: Vec<u8>,
    #[strategy(0usize..1024)] max_size: usize,
) {
    let compressed = EncoderBuilder::for_bytes(&data).encode_to_vec().unwrap();
    let decompressed = Decoder::for_bytes(&compressed)
        .max_size(Some(max_size))
        .decode()
        .unwrap();

    let expected = &data[..max_size.min(data.len())];
    prop_assert_eq!(decompressed.as_slice(), expected);
}
