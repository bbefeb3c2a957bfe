//! # Bale Huffman
//!
//! The from-scratch Huffman codec used by the Bale archiver. Each file is
//! compressed independently: frequency analysis, a fresh code tree built
//! through a min-heap of node frequencies, a per-symbol code table, and a
//! bit-packed serialization of the tree followed by the payload.
//!
//! The encoded form is not self-delimiting. The container stores the
//! original and compressed sizes next to each block; decoding emits
//! exactly `original_size` symbols and block boundaries come from
//! `compressed_size`.
//!
//! ## Example
//!
//! ```rust
//! use bale_huffman::{decode_bytes, encode_bytes};
//!
//! let data = b"an example worth compressing";
//! let packed = encode_bytes(data).unwrap();
//! let unpacked = decode_bytes(&packed, data.len() as u64).unwrap();
//! assert_eq!(unpacked, data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decode;
pub mod encode;
pub mod heap;
pub mod tree;

// Re-exports
pub use decode::{decode_bytes, decode_stream};
pub use encode::{EncodeStats, analyze, encode_bytes, encode_stream};
pub use heap::MinHeap;
pub use tree::{ALPHABET_SIZE, Code, CodeTable, CodeTree, MAX_CODE_LEN, NodeId, NodeKind};
