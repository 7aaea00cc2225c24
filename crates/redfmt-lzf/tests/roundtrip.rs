//! Property-based tests for the LZF codec.
//!
//! Key invariants:
//! - Any block that compresses decompresses back to the original bytes
//! - Running out of output budget is reported, never written past
//! - A compressor produces identical output regardless of what it compressed before

use proptest::prelude::*;
use redfmt_lzf::{decompress, Compressor, MAX_OFFSET};

/// Byte buffers with enough repetition to exercise back-references.
fn repetitive_bytes() -> impl Strategy<Value = Vec<u8>> {
    (prop::collection::vec(any::<u8>(), 1..64), 0usize..200, 0u8..4).prop_map(
        |(pattern, repeats, alphabet)| {
            let mut data = Vec::with_capacity(pattern.len() * repeats);
            for i in 0..repeats {
                for &b in &pattern {
                    data.push(if alphabet == 0 { b } else { b % (alphabet * 3) ^ (i as u8 & 1) });
                }
            }
            data
        },
    )
}

proptest! {
    /// Arbitrary bytes survive a compress/decompress cycle.
    #[test]
    fn random_bytes_roundtrip(data in prop::collection::vec(any::<u8>(), 0..4096)) {
        let mut compressor = Compressor::new();
        let mut output = vec![0u8; data.len() + data.len() / 16 + 64];

        let len = compressor.compress(&data, &mut output).unwrap();
        let restored = decompress(&output[..len], data.len()).unwrap();
        prop_assert_eq!(restored, data);
    }

    /// Highly repetitive input roundtrips through long and overlapping matches.
    #[test]
    fn repetitive_bytes_roundtrip(data in repetitive_bytes()) {
        let mut compressor = Compressor::new();
        let mut output = vec![0u8; data.len() + data.len() / 16 + 64];

        let len = compressor.compress(&data, &mut output).unwrap();
        let restored = decompress(&output[..len], data.len()).unwrap();
        prop_assert_eq!(&restored, &data);
    }

    /// Small budgets either succeed within the budget or report insufficient capacity.
    #[test]
    fn small_budget_never_overruns(
        data in prop::collection::vec(any::<u8>(), 1..2048),
        budget in 0usize..256,
    ) {
        let mut compressor = Compressor::new();
        let mut output = vec![0u8; budget + 16];
        let guard = output[budget..].to_vec();

        match compressor.compress(&data, &mut output[..budget]) {
            Ok(len) => {
                prop_assert!(len < budget);
                let restored = decompress(&output[..len], data.len()).unwrap();
                prop_assert_eq!(restored, data);
            }
            Err(e) => prop_assert!(e.is_insufficient_capacity()),
        }
        prop_assert_eq!(&output[budget..], &guard[..]);
    }

    /// Reusing a compressor does not leak state between calls.
    #[test]
    fn reuse_is_deterministic(
        a in prop::collection::vec(any::<u8>(), 0..1024),
        b in prop::collection::vec(any::<u8>(), 0..1024),
    ) {
        let capacity = a.len() * 2 + 64;
        let mut fresh = Compressor::new();
        let expected = fresh.compress_to_vec(&a, capacity).unwrap();

        let mut reused = Compressor::new();
        let _ = reused.compress_to_vec(&b, b.len() * 2 + 64).unwrap();
        let actual = reused.compress_to_vec(&a, capacity).unwrap();
        prop_assert_eq!(actual, expected);
    }
}

#[test]
fn sixteen_repeated_bytes() {
    let input = b"aaaaaaaaaaaaaaaa";
    let mut compressor = Compressor::new();
    let output = compressor.compress_to_vec(input, 64).unwrap();

    // Leading literal run, then a back-reference repeating the previous byte.
    assert!(output[0] < 32);
    let run = output[0] as usize + 1;
    assert!(output[1..=run].iter().all(|&b| b == b'a'));
    let ctrl = output[1 + run];
    assert!(ctrl >= 32);
    assert_eq!(ctrl & 0x1F, 0);
    let low = if ctrl >> 5 == 7 { output[3 + run] } else { output[2 + run] };
    assert_eq!(low, 0);

    assert_eq!(decompress(&output, input.len()).unwrap(), input);
}

#[test]
fn window_sized_input_roundtrips() {
    let data: Vec<u8> = (0..MAX_OFFSET * 3).map(|i| (i * 7 % 253) as u8).collect();
    let mut compressor = Compressor::new();
    let output = compressor.compress_to_vec(&data, data.len()).unwrap();

    assert!(output.len() < data.len());
    assert_eq!(decompress(&output, data.len()).unwrap(), data);
}
