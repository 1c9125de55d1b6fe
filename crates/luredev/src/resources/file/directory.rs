//! The fixed-size resource directory found at the start of each archive file.

use std::{
    collections::HashMap,
    io::{Read, Seek},
};

use crate::{
    Error,
    errors::FormatError,
    ids::ResourceId,
    resources::file::read_block,
    utils::mem_reader::{self, MemReader, Parse, SliceMemReader},
};

/// The number of entry slots in every directory, used or not.
pub const DIRECTORY_SLOTS: usize = 0xBF;

const ENTRY_SIZE: usize = 8;
const MAGIC_SIZE: usize = 8;

/// The size of a directory in bytes, tag and unused slots included.
pub(crate) const DIRECTORY_LEN: usize = MAGIC_SIZE + DIRECTORY_SLOTS * ENTRY_SIZE;
const DIRECTORY_MAGIC_PREFIX: &[u8; 6] = b"heywow";

/// Resource offsets are stored in units of this many bytes.
const OFFSET_UNIT: u64 = 32;

/// Added to the stored size when the size extension flag is set.
const SIZE_EXTENSION: usize = 0x1000;

/// Returns the 8-byte directory tag for a file: `heywow` followed by the
/// file's discriminator as a big-endian u16.
#[must_use]
pub(crate) fn directory_magic(discriminator: u16) -> [u8; MAGIC_SIZE] {
    let mut magic = [0u8; MAGIC_SIZE];
    magic[..DIRECTORY_MAGIC_PREFIX.len()].copy_from_slice(DIRECTORY_MAGIC_PREFIX);
    magic[DIRECTORY_MAGIC_PREFIX.len()..].copy_from_slice(&discriminator.to_be_bytes());
    magic
}

/// A single slot of a resource directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveEntry {
    id: ResourceId,
    size_extension: bool,
    size: u16,
    offset: u16,
}

impl ArchiveEntry {
    #[must_use]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// The length of the resource in bytes. The extension flag adds a single
    /// 4 KiB increment on top of the 16-bit size field.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        usize::from(self.size) + if self.size_extension { SIZE_EXTENSION } else { 0 }
    }

    /// The absolute file offset of the resource, given the base offset of the
    /// directory that holds this entry.
    #[must_use]
    pub fn file_offset(&self, base_offset: u32) -> u64 {
        u64::from(self.offset) * OFFSET_UNIT + u64::from(base_offset)
    }
}

impl Parse for ArchiveEntry {
    fn parse<M: MemReader>(reader: &mut M) -> mem_reader::Result<Self> {
        let id = ResourceId::new(reader.read_u16_le()?);
        let _unused = reader.read_u8()?;
        let size_extension = reader.read_u8()? != 0;
        let size = reader.read_u16_le()?;
        let offset = reader.read_u16_le()?;
        Ok(ArchiveEntry {
            id,
            size_extension,
            size,
            offset,
        })
    }
}

/// The live entries of one archive file's directory.
#[derive(Debug, Clone)]
pub struct ArchiveDirectory {
    base_offset: u32,
    order: Vec<ResourceId>,
    entries: HashMap<ResourceId, ArchiveEntry>,
}

impl ArchiveDirectory {
    /// Reads the directory tagged with `magic` at `base_offset`.
    pub fn read_from<R>(reader: &mut R, base_offset: u32, magic: &[u8]) -> Result<Self, Error>
    where
        R: Read + Seek,
    {
        let data = read_block(reader, u64::from(base_offset), DIRECTORY_LEN)?;
        Ok(Self::parse(&data, base_offset, magic)?)
    }

    /// Parses a directory from `data`, which starts at `base_offset` in its
    /// file.
    pub fn parse(data: &[u8], base_offset: u32, magic: &[u8]) -> Result<Self, FormatError> {
        let mut reader = SliceMemReader::with_base_offset(data, u64::from(base_offset));
        reader.expect_magic(magic)?;

        let mut directory = ArchiveDirectory {
            base_offset,
            order: Vec::new(),
            entries: HashMap::new(),
        };
        for _ in 0..DIRECTORY_SLOTS {
            let entry = ArchiveEntry::parse(&mut reader)?;
            if entry.id.is_unused() {
                continue;
            }
            // Later duplicates replace the entry, but keep the first position.
            if directory.entries.insert(entry.id, entry).is_some() {
                log::warn!(
                    "Duplicate directory entry for resource {} at offset {base_offset:#x}",
                    entry.id
                );
            } else {
                directory.order.push(entry.id);
            }
        }
        log::debug!(
            "Read directory at offset {base_offset:#x} with {} entries",
            directory.len()
        );
        Ok(directory)
    }

    #[must_use]
    pub fn base_offset(&self) -> u32 {
        self.base_offset
    }

    #[must_use]
    pub fn get(&self, id: ResourceId) -> Option<&ArchiveEntry> {
        self.entries.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The live entries, in directory order.
    pub fn entries(&self) -> impl Iterator<Item = &ArchiveEntry> + '_ {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Removes every entry for which `keep` returns false, and returns the
    /// ids that were removed.
    pub(crate) fn retain<F>(&mut self, mut keep: F) -> Vec<ResourceId>
    where
        F: FnMut(ResourceId) -> bool,
    {
        let (kept, removed): (Vec<_>, Vec<_>) =
            self.order.iter().copied().partition(|id| keep(*id));
        for id in &removed {
            self.entries.remove(id);
        }
        self.order = kept;
        removed
    }
}
