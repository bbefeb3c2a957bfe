//! Huffman compression (encoding).

use crate::tree::{ALPHABET_SIZE, Code, CodeTree};
use bale_core::bitstream::BitWriter;
use bale_core::error::Result;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

/// Chunk size for streaming the input.
const CHUNK_SIZE: usize = 16 * 1024;

/// Sizes produced by one encode run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Bytes consumed from the input.
    pub original_size: u64,
    /// Bytes emitted to the output, including the serialized tree and the
    /// trailing partial-byte padding.
    pub compressed_size: u64,
}

/// Stream `input` once, tallying a 256-entry byte-frequency table and the
/// total size.
pub fn analyze<R: Read>(input: &mut R) -> Result<([u64; ALPHABET_SIZE], u64)> {
    let mut freq = [0u64; ALPHABET_SIZE];
    let mut size = 0u64;
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = input.read(&mut buf)?;
        if n == 0 {
            break;
        }
        size += n as u64;
        for &byte in &buf[..n] {
            freq[byte as usize] += 1;
        }
    }
    Ok((freq, size))
}

fn write_code<W: Write>(writer: &mut BitWriter<W>, code: Code) -> Result<()> {
    for i in 0..code.len {
        writer.write_bit(code.bits >> i & 1 != 0)?;
    }
    Ok(())
}

/// Compress the whole of `input` into `output`.
///
/// The input is read twice: once for frequency analysis, then again from
/// the start for payload emission. Output is the serialized tree followed
/// by the code bits of every input byte in order, bit-packed with no
/// padding markers; an empty input produces no output at all. The encoded
/// form is not self-delimiting — decoding needs the original size from
/// the container.
pub fn encode_stream<R: Read + Seek, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<EncodeStats> {
    let (freq, original_size) = analyze(input)?;
    if original_size == 0 {
        return Ok(EncodeStats::default());
    }
    input.seek(SeekFrom::Start(0))?;

    let tree = CodeTree::build(&freq);
    let table = tree.code_table()?;

    let mut writer = BitWriter::new(output);
    tree.write(&mut writer)?;

    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = input.read(&mut buf)?;
        if n == 0 {
            break;
        }
        for &byte in &buf[..n] {
            let code = table.get(byte);
            debug_assert!(code.len > 0, "analyzed byte must have a code");
            write_code(&mut writer, code)?;
        }
    }
    writer.flush()?;

    Ok(EncodeStats {
        original_size,
        compressed_size: writer.bytes_flushed(),
    })
}

/// Compress a byte slice in one call.
pub fn encode_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut input = Cursor::new(data);
    let mut output = Vec::new();
    encode_stream(&mut input, &mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_counts() {
        let mut input = Cursor::new(b"aabbbc".to_vec());
        let (freq, size) = analyze(&mut input).unwrap();
        assert_eq!(size, 6);
        assert_eq!(freq[b'a' as usize], 2);
        assert_eq!(freq[b'b' as usize], 3);
        assert_eq!(freq[b'c' as usize], 1);
        assert_eq!(freq.iter().sum::<u64>(), 6);
    }

    #[test]
    fn test_empty_input_emits_nothing() {
        let encoded = encode_bytes(b"").unwrap();
        assert!(encoded.is_empty());
    }

    #[test]
    fn test_single_symbol_fixture() {
        // Tree: "1" + 0x61 LSB-first (9 bits); payload: "000" (3 bits).
        let encoded = encode_bytes(b"aaa").unwrap();
        assert_eq!(encoded, vec![0xC3, 0x00]);
    }

    #[test]
    fn test_stats_match_output_len() {
        let data = b"some moderately repetitive data data data";
        let mut input = Cursor::new(data.to_vec());
        let mut output = Vec::new();
        let stats = encode_stream(&mut input, &mut output).unwrap();
        assert_eq!(stats.original_size, data.len() as u64);
        assert_eq!(stats.compressed_size, output.len() as u64);
    }
}
