//! # Bale Archive
//!
//! The bale container format and its operations.
//!
//! A bale archive is a single file: a 12-byte magic, a CRC-32 checksum,
//! a file count, the entry records, and then one Huffman-compressed
//! block per entry in the same order. See [`format`] for the exact
//! layout and [`store::Archive`] for the operations.
//!
//! ## Example
//!
//! ```no_run
//! use bale_archive::{AddSource, Archive, Selection};
//! use std::path::Path;
//!
//! let mut archive = Archive::open("backup.bale")?;
//! archive.append(&[AddSource::from_path("notes.txt")])?;
//! let report = archive.extract(Selection::All, Path::new("."))?;
//! println!("extracted {} files", report.completed_count());
//! # Ok::<(), bale_core::BaleError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod format;
pub mod store;

// Re-exports
pub use format::{FileEntry, Header, MAGIC};
pub use store::{AddSource, Archive, BatchReport, Selection, Skipped};
