//! End-to-end codec round trips.

use bale_huffman::{decode_bytes, encode_bytes};

fn roundtrip(data: &[u8]) {
    let encoded = encode_bytes(data).expect("encode failed");
    let decoded = decode_bytes(&encoded, data.len() as u64).expect("decode failed");
    assert_eq!(decoded, data, "round trip mismatch for {} bytes", data.len());
}

#[test]
fn test_roundtrip_empty() {
    let encoded = encode_bytes(b"").unwrap();
    assert!(encoded.is_empty());
    assert!(decode_bytes(&encoded, 0).unwrap().is_empty());
}

#[test]
fn test_roundtrip_single_byte() {
    roundtrip(b"x");
}

#[test]
fn test_roundtrip_single_repeated_byte() {
    for n in [1usize, 2, 7, 8, 9, 1000] {
        let data = vec![0x61u8; n];
        let encoded = encode_bytes(&data).unwrap();
        let decoded = decode_bytes(&encoded, n as u64).unwrap();
        assert_eq!(decoded, data, "length {n}");
    }
}

#[test]
fn test_roundtrip_all_256_values() {
    let data: Vec<u8> = (0u16..256).map(|b| b as u8).collect();
    roundtrip(&data);
}

#[test]
fn test_roundtrip_all_256_values_skewed() {
    // Every byte value present, with wildly uneven frequencies.
    let mut data = Vec::new();
    for b in 0u16..256 {
        for _ in 0..(b / 16 + 1) {
            data.push(b as u8);
        }
    }
    data.extend(std::iter::repeat_n(0xFFu8, 4096));
    roundtrip(&data);
}

#[test]
fn test_roundtrip_text() {
    roundtrip(b"the quick brown fox jumps over the lazy dog, twice: \
               the quick brown fox jumps over the lazy dog");
}

#[test]
fn test_roundtrip_binary_noise() {
    // Deterministic pseudo-random bytes, long enough to cross the 16 KiB
    // buffer boundary inside the bit streams.
    let mut state = 0x2545F491u32;
    let data: Vec<u8> = (0..100_000)
        .map(|_| {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            (state >> 24) as u8
        })
        .collect();
    roundtrip(&data);
}

#[test]
fn test_repetitive_input_actually_shrinks() {
    let data = vec![b'a'; 10_000];
    let encoded = encode_bytes(&data).unwrap();
    // One bit per symbol plus the 9-bit tree.
    assert!(encoded.len() < data.len() / 7);
}

#[test]
fn test_compressed_blocks_are_independent() {
    // Concatenated blocks decode correctly when split at the recorded
    // boundary, the way the archive stores them.
    let a = b"first file contents".to_vec();
    let b = vec![0u8; 500];
    let block_a = encode_bytes(&a).unwrap();
    let block_b = encode_bytes(&b).unwrap();

    let mut joined = block_a.clone();
    joined.extend_from_slice(&block_b);

    assert_eq!(
        decode_bytes(&joined[..block_a.len()], a.len() as u64).unwrap(),
        a
    );
    assert_eq!(
        decode_bytes(&joined[block_a.len()..], b.len() as u64).unwrap(),
        b
    );
}
