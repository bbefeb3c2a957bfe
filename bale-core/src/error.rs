//! Error types for Bale operations.
//!
//! One error enum covers the whole stack: archive validation, the Huffman
//! codec, and per-file batch failures. Archive-level structural errors
//! (`NotAnArchive`, `Corrupted`, `ScratchUnavailable`) abort an operation
//! without mutating the archive; per-file errors are collected into batch
//! reports by the archive layer and never abort sibling files.

use std::io;
use thiserror::Error;

/// The main error type for Bale operations.
#[derive(Debug, Error)]
pub enum BaleError {
    /// I/O error from an underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file exists but does not start with the archive magic.
    #[error("not a bale archive: expected magic {expected:02x?}, found {found:02x?}")]
    NotAnArchive {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Bytes actually found at offset 0.
        found: Vec<u8>,
    },

    /// Stored checksum does not match a recomputation over the archive body.
    #[error("archive is corrupted: stored checksum {stored:#010x}, computed {computed:#010x}")]
    Corrupted {
        /// Checksum read from the header.
        stored: u32,
        /// Checksum recomputed from the file contents.
        computed: u32,
    },

    /// Structurally invalid header or entry record.
    #[error("invalid header: {message}")]
    InvalidHeader {
        /// Description of the problem.
        message: String,
    },

    /// A bit was required past the end of the input.
    #[error("unexpected end of stream: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// A serialized code tree is not plausible (too many nodes or truncated).
    #[error("malformed code tree in compressed block")]
    MalformedTree,

    /// A derived Huffman code exceeds the supported length.
    #[error("huffman code for byte {symbol:#04x} exceeds {max_len} bits")]
    CodeTooLong {
        /// The symbol whose code overflowed.
        symbol: u8,
        /// Maximum supported code length.
        max_len: usize,
    },

    /// A requested name is not present in the archive.
    #[error("entry not found: {name}")]
    EntryNotFound {
        /// Name of the missing entry.
        name: String,
    },

    /// An input file name does not fit the entry record.
    #[error("name too long for archive entry ({len} bytes, limit {limit}): {name}")]
    NameTooLong {
        /// The offending name.
        name: String,
        /// Its length in bytes.
        len: usize,
        /// Maximum storable length.
        limit: usize,
    },

    /// An input file exceeds the 32-bit size fields of the entry record.
    #[error("file too large for archive entry ({size} bytes): {name}")]
    TooLarge {
        /// The offending file.
        name: String,
        /// Its size in bytes.
        size: u64,
    },

    /// An entry name would escape the extraction directory.
    #[error("refusing unsafe entry name: {name}")]
    UnsafeName {
        /// The suspicious name.
        name: String,
    },

    /// Staging storage for a mutating operation could not be created.
    #[error("scratch storage unavailable: {0}")]
    ScratchUnavailable(#[source] io::Error),
}

/// Result type alias for Bale operations.
pub type Result<T> = std::result::Result<T, BaleError>;

impl BaleError {
    /// Create a not-an-archive error.
    pub fn not_an_archive(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::NotAnArchive {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a corrupted-archive error.
    pub fn corrupted(stored: u32, computed: u32) -> Self {
        Self::Corrupted { stored, computed }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create an entry-not-found error.
    pub fn entry_not_found(name: impl Into<String>) -> Self {
        Self::EntryNotFound { name: name.into() }
    }

    /// Create an unsafe-name error.
    pub fn unsafe_name(name: impl Into<String>) -> Self {
        Self::UnsafeName { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BaleError::not_an_archive(b"MAGIC_NUMBER".to_vec(), vec![0x1F, 0x8B]);
        assert!(err.to_string().contains("not a bale archive"));

        let err = BaleError::corrupted(0x12345678, 0xDEADBEEF);
        assert!(err.to_string().contains("0x12345678"));
        assert!(err.to_string().contains("0xdeadbeef"));

        let err = BaleError::entry_not_found("missing.txt");
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: BaleError = io_err.into();
        assert!(matches!(err, BaleError::Io(_)));
    }
}
