//! # Bale Core
//!
//! Core components for the Bale archiver.
//!
//! This crate provides the building blocks the codec and container layers
//! are made of:
//!
//! - [`bitstream`]: bit-level buffered I/O for variable-length codes
//! - [`crc`]: CRC-32 checksums
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! Bale is a layered stack:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ CLI (bale-cli)                               │
//! ├──────────────────────────────────────────────┤
//! │ Container (bale-archive)                     │
//! │     header/entries, append/extract/remove    │
//! ├──────────────────────────────────────────────┤
//! │ Codec (bale-huffman)                         │
//! │     frequency analysis, code tree, payload   │
//! ├──────────────────────────────────────────────┤
//! │ BitStream + CRC (this crate)                 │
//! └──────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitstream;
pub mod crc;
pub mod error;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use crc::Crc32;
pub use error::{BaleError, Result};
