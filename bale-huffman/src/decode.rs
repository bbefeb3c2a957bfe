//! Huffman decompression (decoding).

use crate::tree::{CodeTree, NodeKind};
use bale_core::bitstream::{BitReader, BitWriter};
use bale_core::error::{BaleError, Result};
use std::io::{Cursor, Read, Write};

/// Decompress exactly `original_size` symbols from `input` into `output`.
///
/// The stream is the mirrored form of [`crate::encode::encode_stream`]:
/// the serialized tree, then payload bits. Each symbol is recovered by
/// descending left on a 0 bit and right on a 1 bit until a leaf is
/// reached; the walk restarts at the root for every symbol and stops
/// after `original_size` emissions, never more. For a tree that is a
/// single leaf the walk terminates immediately, emitting the symbol
/// without consuming payload bits — the block boundary is the caller's
/// responsibility either way, via the container's compressed size.
///
/// `original_size == 0` is a no-op and reads nothing.
pub fn decode_stream<R: Read, W: Write>(
    input: &mut R,
    output: &mut W,
    original_size: u64,
) -> Result<()> {
    if original_size == 0 {
        return Ok(());
    }
    let mut reader = BitReader::new(input);
    let tree = CodeTree::read(&mut reader)?;
    let Some(root) = tree.root() else {
        return Err(BaleError::MalformedTree);
    };

    let mut writer = BitWriter::new(output);
    for _ in 0..original_size {
        let mut node = root;
        let symbol = loop {
            match tree.kind(node) {
                NodeKind::Leaf(symbol) => break symbol,
                NodeKind::Internal { left, right } => {
                    node = if reader.read_bit()? { right } else { left };
                }
            }
        };
        writer.write_byte(symbol)?;
    }
    writer.flush()?;
    Ok(())
}

/// Decompress a byte slice in one call.
pub fn decode_bytes(data: &[u8], original_size: u64) -> Result<Vec<u8>> {
    let mut input = Cursor::new(data);
    let mut output = Vec::new();
    decode_stream(&mut input, &mut output, original_size)?;
    Ok(output)
}
