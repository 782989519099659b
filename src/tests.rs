use voxell_rng::rng::XorShift128;

use crate::compressor::Compressor;

const SHORT_DATA: &[u8] = b"Hello, World!";
const LONG_DATA: &[u8] =
    b"This is a longer string to test the huffman coding algorithm. It should be able to handle various lengths and characters.";
const REPEATING_DATA: &[u8] = b"a baba da babble da dabble babble doo bee babble dabble dooble dee boo dooble daddle boo";
const MULTILINE_DATA: &[u8] = b"first line\nsecond line\r\n\n\\n is not a line feed\n";
const SINGLE_SYMBOL_DATA: &[u8] = &[b'z'; 300];
const SINGLE_BYTE_DATA: &[u8] = b"\n";
const TWO_SYMBOL_DATA: &[u8] = b"abababababbbbbbba";
const EMPTY_DATA: &[u8] = &[];

const TEST_CASES: &[(&[u8], &str)] = &[
    (REPEATING_DATA, "repeating data"),
    (SHORT_DATA, "short data"),
    (LONG_DATA, "long data"),
    (MULTILINE_DATA, "multiline data"),
    (SINGLE_SYMBOL_DATA, "single symbol data"),
    (SINGLE_BYTE_DATA, "single byte data"),
    (TWO_SYMBOL_DATA, "two symbol data"),
    (EMPTY_DATA, "empty data"),
];

fn rng_data(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = XorShift128::new(seed);
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        let data = rng.peek_next_u64();
        out.push((data & 0xFF) as u8);
        rng = XorShift128::new(data);
    }
    out
}

/// Every byte value, skewed so that low values are far more frequent than high ones.
fn skewed_data() -> Vec<u8> {
    (0..=255u8).flat_map(|b| core::iter::repeat_n(b, 256 - b as usize)).collect()
}

fn check_roundtrip<C: Compressor>(compressor: &mut C, test_case: &[u8], test_name: &str) {
    match compressor.test_roundtrip(test_case) {
        Ok(eq) => {
            eprintln!(
                "Compression ratio for {} with {}: {:.2}%",
                test_name,
                compressor.compressor_name(),
                eq.ratio() * 100.0
            );

            assert!(
                eq.is_successful(),
                "Roundtrip test for {} failed at {}:\n\tExpected: {:?}\n\tGot: {:?}\n\tCompressed: {:?}",
                compressor.compressor_name(),
                test_name,
                eq.get_original(),
                eq.get_decompressed(),
                eq.get_compressed(),
            );
        }
        Err(e) => {
            panic!(
                "Fatal error while trying to compress/decompress {} with {}: {}",
                test_name,
                compressor.compressor_name(),
                e
            );
        }
    }
}

pub fn roundtrip_test<C: Compressor>(mut compressor: C) {
    for &(test_case, test_name) in TEST_CASES {
        check_roundtrip(&mut compressor, test_case, test_name);
    }
    check_roundtrip(&mut compressor, &rng_data(0xdeadcafe, 1000), "rng data");
    check_roundtrip(&mut compressor, &rng_data(0x5eed, 37), "short rng data");
    check_roundtrip(&mut compressor, &skewed_data(), "skewed data");
}
