//! Archive operations: create, append, extract, remove, verify, describe.
//!
//! An [`Archive`] owns an exclusively locked handle to the archive file.
//! Opening validates the magic and the checksum, so every operation runs
//! against a container that was structurally sound moments before.
//!
//! Both mutating operations (append, remove) stage the complete
//! replacement archive in a temporary file next to the original and
//! atomically rename it into place. The original is never partially
//! overwritten: an interrupted process leaves either the old archive or
//! the new one.
//!
//! Per-file problems inside a batch (an input that cannot be opened, a
//! name that is not in the archive) are collected into the returned
//! [`BatchReport`] and never abort the sibling files.

use crate::format::{
    CHECKSUM_POS, FILE_COUNT_POS, FileEntry, Header, MAGIC, MAX_NAME_LEN,
};
use bale_core::crc::Crc32;
use bale_core::error::{BaleError, Result};
use bale_huffman::{decode_stream, encode_stream};
use filetime::FileTime;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;
use tracing::debug;

/// A file to add: where to read it from and the name to store it under.
#[derive(Debug, Clone)]
pub struct AddSource {
    /// Path opened for reading.
    pub path: PathBuf,
    /// Entry name recorded in the archive (and used on extraction).
    pub name: String,
}

impl AddSource {
    /// Use the path itself, verbatim, as the entry name. This is what the
    /// CLI does with its arguments.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.to_string_lossy().into_owned();
        Self { path, name }
    }
}

/// Which entries an operation applies to.
#[derive(Debug, Clone, Copy)]
pub enum Selection<'a> {
    /// Every entry in the archive.
    All,
    /// Entries matching the given names; a name matches at most one entry
    /// (the first with that name).
    Names(&'a [String]),
}

/// A per-file failure inside a batch operation.
#[derive(Debug)]
pub struct Skipped {
    /// The file or entry name.
    pub name: String,
    /// Why it was skipped.
    pub reason: BaleError,
}

/// Outcome of a batch operation.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Names processed successfully, in order.
    pub completed: Vec<String>,
    /// Names skipped, with reasons; these never aborted the batch.
    pub skipped: Vec<Skipped>,
}

impl BatchReport {
    fn done(&mut self, name: impl Into<String>) {
        self.completed.push(name.into());
    }

    fn skip(&mut self, name: impl Into<String>, reason: BaleError) {
        self.skipped.push(Skipped {
            name: name.into(),
            reason,
        });
    }

    /// Number of files the operation actually processed.
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }
}

/// A single-file archive, held with an exclusive advisory lock.
#[derive(Debug)]
pub struct Archive {
    path: PathBuf,
    file: File,
}

impl Archive {
    /// Create a new empty archive at `path`, truncating anything there.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.lock()?;
        let mut archive = Self {
            path: path.to_path_buf(),
            file,
        };
        write_prelude(&mut archive.file, &[])?;
        let checksum = write_fresh_checksum(&mut archive.file)?;
        debug!(path = %archive.path.display(), checksum, "created empty archive");
        Ok(archive)
    }

    /// Open and validate an existing archive; a missing file is created
    /// as a new empty archive.
    ///
    /// Fails with [`BaleError::NotAnArchive`] on a magic mismatch and
    /// [`BaleError::Corrupted`] on a checksum mismatch, touching nothing
    /// in either case.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Self::create(path);
        }
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        file.lock()?;
        let mut archive = Self {
            path: path.to_path_buf(),
            file,
        };
        archive.validate()?;
        Ok(archive)
    }

    /// The archive's path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn validate(&mut self) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut found = [0u8; 12];
        let mut filled = 0;
        while filled < found.len() {
            let n = self.file.read(&mut found[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if found[..filled] != MAGIC[..] {
            return Err(BaleError::not_an_archive(
                MAGIC.to_vec(),
                found[..filled].to_vec(),
            ));
        }
        let stored = self.stored_checksum()?;
        let computed = self.compute_checksum()?;
        if stored != computed {
            return Err(BaleError::corrupted(stored, computed));
        }
        Ok(())
    }

    /// The checksum recorded in the header.
    pub fn stored_checksum(&mut self) -> Result<u32> {
        self.file.seek(SeekFrom::Start(CHECKSUM_POS))?;
        let mut buf = [0u8; 4];
        self.file.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn compute_checksum(&mut self) -> Result<u32> {
        self.file.seek(SeekFrom::Start(FILE_COUNT_POS))?;
        Crc32::compute_stream(&mut self.file)
    }

    /// Read-only integrity check: recompute the checksum and compare it
    /// with the stored one.
    pub fn verify(&mut self) -> Result<bool> {
        Ok(self.stored_checksum()? == self.compute_checksum()?)
    }

    /// Read the full header: stored checksum and all entry records.
    pub fn describe(&mut self) -> Result<Header> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut reader = BufReader::new(&mut self.file);
        Header::read(&mut reader)
    }

    /// Compress `sources` into the archive, appending one entry per file
    /// that can be read. The existing data region is preserved
    /// byte-for-byte; only the header grows.
    ///
    /// Sources that cannot be opened, have over-long names, or overflow
    /// the 32-bit size fields are skipped and reported. Returns the batch
    /// report; `completed` holds the names actually added.
    pub fn append(&mut self, sources: &[AddSource]) -> Result<BatchReport> {
        let header = self.describe()?;
        let mut report = BatchReport::default();

        // Compress into anonymous scratch first: entry records can only
        // be written once the compressed sizes are known.
        let mut scratch = tempfile::tempfile().map_err(BaleError::ScratchUnavailable)?;
        let mut new_entries = Vec::new();
        for source in sources {
            let block_start = scratch.stream_position()?;
            match compress_input(&source.path, &source.name, &mut scratch) {
                Ok(entry) => {
                    report.done(&source.name);
                    new_entries.push(entry);
                }
                Err(reason) => {
                    // Drop whatever the failed encode left in scratch.
                    scratch.set_len(block_start)?;
                    scratch.seek(SeekFrom::Start(block_start))?;
                    report.skip(&source.name, reason);
                }
            }
        }
        if new_entries.is_empty() {
            return Ok(report);
        }

        let old_data_start = header.byte_len();
        let mut entries = header.entries;
        entries.extend(new_entries);

        let mut staged = NamedTempFile::new_in(scratch_dir(&self.path))
            .map_err(BaleError::ScratchUnavailable)?;
        write_prelude(staged.as_file_mut(), &entries)?;

        // Old data region, byte for byte.
        self.file.seek(SeekFrom::Start(old_data_start))?;
        io::copy(&mut self.file, staged.as_file_mut())?;
        // Newly compressed blocks.
        scratch.seek(SeekFrom::Start(0))?;
        io::copy(&mut scratch, staged.as_file_mut())?;

        let checksum = write_fresh_checksum(staged.as_file_mut())?;
        debug!(
            added = report.completed.len(),
            total = entries.len(),
            checksum,
            "staged appended archive"
        );
        self.swap_in(staged)?;
        Ok(report)
    }

    /// Decompress selected entries into `out_dir`, overwriting existing
    /// files of the same name. Entry paths are joined under `out_dir`;
    /// absolute names and names containing `..` are refused per-file.
    ///
    /// Unmatched requested names and per-file failures are reported, not
    /// fatal. Returns the batch report.
    pub fn extract(&mut self, selection: Selection<'_>, out_dir: &Path) -> Result<BatchReport> {
        let header = self.describe()?;
        let mut report = BatchReport::default();
        let selected = mark_selected(&header.entries, selection, &mut report);

        let mut offset = header.byte_len();
        for (entry, wanted) in header.entries.iter().zip(&selected) {
            if *wanted {
                match self.extract_entry(entry, offset, out_dir) {
                    Ok(()) => report.done(&entry.name),
                    Err(reason) => report.skip(&entry.name, reason),
                }
            }
            offset += entry.compressed_size as u64;
        }
        Ok(report)
    }

    fn extract_entry(&mut self, entry: &FileEntry, offset: u64, out_dir: &Path) -> Result<()> {
        let target = out_dir.join(safe_entry_path(&entry.name)?);
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        self.file.seek(SeekFrom::Start(offset))?;
        let mut block = (&mut self.file).take(entry.compressed_size as u64);
        let mut output = File::create(&target)?;
        decode_stream(&mut block, &mut output, entry.original_size as u64)?;
        filetime::set_file_mtime(&target, FileTime::from_unix_time(entry.add_time as i64, 0))?;
        debug!(name = %entry.name, size = entry.original_size, "extracted entry");
        Ok(())
    }

    /// Drop selected entries from the archive. Surviving entries and
    /// their data blocks are copied unchanged into the staged
    /// replacement; removing every entry leaves a valid empty archive.
    ///
    /// Unmatched requested names are reported, not fatal. Returns the
    /// batch report; `completed` holds the names actually removed.
    pub fn remove(&mut self, selection: Selection<'_>) -> Result<BatchReport> {
        let header = self.describe()?;
        let mut report = BatchReport::default();
        let doomed = mark_selected(&header.entries, selection, &mut report);
        if !doomed.contains(&true) {
            return Ok(report);
        }

        let kept: Vec<FileEntry> = header
            .entries
            .iter()
            .zip(&doomed)
            .filter(|(_, gone)| !**gone)
            .map(|(entry, _)| entry.clone())
            .collect();

        let mut staged = NamedTempFile::new_in(scratch_dir(&self.path))
            .map_err(BaleError::ScratchUnavailable)?;
        write_prelude(staged.as_file_mut(), &kept)?;

        let mut offset = header.byte_len();
        for (entry, gone) in header.entries.iter().zip(&doomed) {
            if *gone {
                report.done(&entry.name);
            } else {
                self.file.seek(SeekFrom::Start(offset))?;
                let mut block = (&mut self.file).take(entry.compressed_size as u64);
                io::copy(&mut block, staged.as_file_mut())?;
            }
            offset += entry.compressed_size as u64;
        }

        let checksum = write_fresh_checksum(staged.as_file_mut())?;
        debug!(
            removed = report.completed.len(),
            kept = kept.len(),
            checksum,
            "staged pruned archive"
        );
        self.swap_in(staged)?;
        Ok(report)
    }

    /// Atomically replace the archive with the staged file and adopt the
    /// staged handle (relocked) as our own.
    fn swap_in(&mut self, staged: NamedTempFile) -> Result<()> {
        let file = staged
            .persist(&self.path)
            .map_err(|e| BaleError::Io(e.error))?;
        file.lock()?;
        self.file = file;
        Ok(())
    }
}

/// Write magic, a zero checksum placeholder, the entry count, and all
/// entry records.
fn write_prelude<W: Write>(writer: &mut W, entries: &[FileEntry]) -> Result<()> {
    writer.write_all(MAGIC)?;
    writer.write_all(&0u32.to_le_bytes())?;
    writer.write_all(&(entries.len() as u32).to_le_bytes())?;
    for entry in entries {
        entry.write(writer)?;
    }
    Ok(())
}

/// Recompute the checksum over [file_count .. EOF] and store it in the
/// header. Runs after every mutation, before the staged file replaces
/// the original.
fn write_fresh_checksum(file: &mut File) -> Result<u32> {
    file.seek(SeekFrom::Start(FILE_COUNT_POS))?;
    let checksum = Crc32::compute_stream(file)?;
    file.seek(SeekFrom::Start(CHECKSUM_POS))?;
    file.write_all(&checksum.to_le_bytes())?;
    Ok(checksum)
}

/// Compress one input file to the end of `scratch`, returning its entry.
fn compress_input(input: &Path, name: &str, scratch: &mut File) -> Result<FileEntry> {
    if name.len() > MAX_NAME_LEN {
        return Err(BaleError::NameTooLong {
            name: name.to_owned(),
            len: name.len(),
            limit: MAX_NAME_LEN,
        });
    }
    let mut file = File::open(input)?;
    let size = file.metadata()?.len();
    if size > u32::MAX as u64 {
        return Err(BaleError::TooLarge {
            name: name.to_owned(),
            size,
        });
    }
    let stats = encode_stream(&mut file, scratch)?;
    if stats.compressed_size > u32::MAX as u64 {
        return Err(BaleError::TooLarge {
            name: name.to_owned(),
            size: stats.compressed_size,
        });
    }
    Ok(FileEntry {
        name: name.to_owned(),
        original_size: stats.original_size as u32,
        compressed_size: stats.compressed_size as u32,
        add_time: now_unix(),
    })
}

/// Resolve a selection against the entry list, reporting names that
/// match nothing.
fn mark_selected(
    entries: &[FileEntry],
    selection: Selection<'_>,
    report: &mut BatchReport,
) -> Vec<bool> {
    match selection {
        Selection::All => vec![true; entries.len()],
        Selection::Names(names) => {
            let mut marks = vec![false; entries.len()];
            for name in names {
                match entries.iter().position(|e| &e.name == name) {
                    Some(index) => marks[index] = true,
                    None => report.skip(name, BaleError::entry_not_found(name)),
                }
            }
            marks
        }
    }
}

/// Reject entry names that would escape the extraction directory.
fn safe_entry_path(name: &str) -> Result<&Path> {
    let path = Path::new(name);
    if path.is_absolute() {
        return Err(BaleError::unsafe_name(name));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err(BaleError::unsafe_name(name)),
        }
    }
    Ok(path)
}

/// Directory to stage replacement archives in: next to the original, so
/// the final rename stays on one filesystem.
fn scratch_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
