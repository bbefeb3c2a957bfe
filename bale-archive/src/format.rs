//! On-disk layout of a bale archive.
//!
//! ```text
//! offset 0   magic "MAGIC_NUMBER"        12 bytes
//! offset 12  checksum                    u32 LE
//! offset 16  file_count                  u32 LE
//! offset 20  file entries                variable
//! after      compressed blocks, one per entry, in entry order
//! ```
//!
//! All integers are little-endian regardless of host. The checksum is a
//! CRC-32 over everything from the file_count field to the end of the
//! file, so it covers the entry records and every data block.
//!
//! An entry record is: name length (u8, counting the NUL terminator),
//! the name bytes, a NUL, original size (u32 LE), compressed size
//! (u32 LE), and the add time (u64 LE, Unix seconds).
//!
//! Block boundaries are not marked in the data region; an entry's block
//! starts at the end of the header plus the compressed sizes of all
//! earlier entries, and is exactly `compressed_size` bytes long.

use bale_core::error::{BaleError, Result};
use std::io::{Read, Write};

/// Archive signature at offset 0.
pub const MAGIC: &[u8; 12] = b"MAGIC_NUMBER";

/// Offset of the checksum field.
pub const CHECKSUM_POS: u64 = 12;

/// Offset of the file_count field; the checksum covers from here to EOF.
pub const FILE_COUNT_POS: u64 = 16;

/// Offset of the first entry record.
pub const ENTRIES_POS: u64 = 20;

/// Longest storable entry name in bytes (name + NUL must fit a u8 length).
pub const MAX_NAME_LEN: usize = 254;

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// One file's metadata record within the archive header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Name the file was added under, used as the extraction path.
    pub name: String,
    /// Uncompressed size in bytes.
    pub original_size: u32,
    /// Size of the compressed block in bytes.
    pub compressed_size: u32,
    /// When the file was added, in Unix seconds.
    pub add_time: u64,
}

impl FileEntry {
    /// Read one entry record.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut len_buf = [0u8; 1];
        reader.read_exact(&mut len_buf)?;
        let name_len = len_buf[0] as usize;
        if name_len == 0 {
            return Err(BaleError::invalid_header("entry name length is zero"));
        }
        let mut name_buf = vec![0u8; name_len];
        reader.read_exact(&mut name_buf)?;
        if name_buf.pop() != Some(0) {
            return Err(BaleError::invalid_header("entry name is not NUL-terminated"));
        }
        let name = String::from_utf8(name_buf)
            .map_err(|_| BaleError::invalid_header("entry name is not valid UTF-8"))?;
        Ok(Self {
            name,
            original_size: read_u32(reader)?,
            compressed_size: read_u32(reader)?,
            add_time: read_u64(reader)?,
        })
    }

    /// Write one entry record.
    ///
    /// The name is assumed to fit [`MAX_NAME_LEN`]; the archive layer
    /// rejects longer names before an entry is ever constructed.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        debug_assert!(self.name.len() <= MAX_NAME_LEN);
        writer.write_all(&[(self.name.len() + 1) as u8])?;
        writer.write_all(self.name.as_bytes())?;
        writer.write_all(&[0u8])?;
        writer.write_all(&self.original_size.to_le_bytes())?;
        writer.write_all(&self.compressed_size.to_le_bytes())?;
        writer.write_all(&self.add_time.to_le_bytes())?;
        Ok(())
    }

    /// Size of this record on disk.
    pub fn encoded_len(&self) -> u64 {
        1 + self.name.len() as u64 + 1 + 4 + 4 + 8
    }

    /// Space savings as a whole percentage: floor(100 × (1 − c/o)).
    ///
    /// Zero-length originals and blocks that grew under compression both
    /// report 0.
    pub fn space_savings(&self) -> u32 {
        if self.original_size == 0 || self.compressed_size >= self.original_size {
            return 0;
        }
        let ratio = 1.0 - self.compressed_size as f64 / self.original_size as f64;
        (ratio * 100.0) as u32
    }
}

/// The parsed archive header: stored checksum plus all entry records.
#[derive(Debug, Default)]
pub struct Header {
    /// Checksum as stored in the header.
    pub checksum: u32,
    /// Entry records in on-disk (and data-block) order.
    pub entries: Vec<FileEntry>,
}

impl Header {
    /// Read and parse the header from the start of an archive stream.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 12];
        reader.read_exact(&mut magic)?;
        if magic != *MAGIC {
            return Err(BaleError::not_an_archive(MAGIC.to_vec(), magic.to_vec()));
        }
        let checksum = read_u32(reader)?;
        let count = read_u32(reader)?;
        // Capacity is clamped: the count field is validated by the
        // checksum, but this parser also runs on unvalidated bytes.
        let mut entries = Vec::with_capacity(count.min(1024) as usize);
        for _ in 0..count {
            entries.push(FileEntry::read(reader)?);
        }
        Ok(Self { checksum, entries })
    }

    /// Total header size on disk, which is also the offset of the first
    /// data block.
    pub fn byte_len(&self) -> u64 {
        ENTRIES_POS + self.entries.iter().map(FileEntry::encoded_len).sum::<u64>()
    }

    /// Offset of entry `index`'s data block: the running sum of all
    /// earlier blocks, after the header.
    pub fn data_offset(&self, index: usize) -> u64 {
        self.byte_len()
            + self.entries[..index]
                .iter()
                .map(|e| e.compressed_size as u64)
                .sum::<u64>()
    }

    /// Combined size of all data blocks.
    pub fn data_len(&self) -> u64 {
        self.entries.iter().map(|e| e.compressed_size as u64).sum()
    }
}
