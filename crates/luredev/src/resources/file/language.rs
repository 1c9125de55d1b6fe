//! The language table at the start of `lure.dat`, which locates the
//! directory for each localized release.

use std::io::{Read, Seek};

use crate::{
    Error,
    errors::ResourceNotFound,
    resources::file::read_block,
    utils::mem_reader::{self, MemReader, Parse, SliceMemReader},
};

const LANGUAGE_TABLE_MAGIC: &[u8; 6] = b"lure\0\0";
const LANGUAGE_TABLE_END: u8 = 0xFF;
const LANGUAGE_ENTRY_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageOffsetEntry {
    code: u8,
    offset: u32,
}

impl LanguageOffsetEntry {
    #[must_use]
    pub fn code(&self) -> u8 {
        self.code
    }

    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        self.code == LANGUAGE_TABLE_END
    }
}

impl Parse for LanguageOffsetEntry {
    fn parse<M: MemReader>(reader: &mut M) -> mem_reader::Result<Self> {
        let code = reader.read_u8()?;
        let offset = reader.read_u32_le()?;
        Ok(LanguageOffsetEntry { code, offset })
    }
}

/// Finds the base offset of the directory for `language` in the primary
/// archive file.
pub(crate) fn find_language_offset<R>(reader: &mut R, language: u8) -> Result<u32, Error>
where
    R: Read + Seek,
{
    let magic = read_block(reader, 0, LANGUAGE_TABLE_MAGIC.len())?;
    SliceMemReader::new(&magic).expect_magic(LANGUAGE_TABLE_MAGIC)?;

    let mut position = LANGUAGE_TABLE_MAGIC.len() as u64;
    loop {
        let data = read_block(reader, position, LANGUAGE_ENTRY_SIZE)?;
        let entry = LanguageOffsetEntry::parse(&mut SliceMemReader::with_base_offset(
            &data, position,
        ))?;
        if entry.is_end() {
            return Err(ResourceNotFound::LanguageSection(language).into());
        }
        if entry.code() == language {
            log::debug!(
                "Language {language} directory is at offset {:#x}",
                entry.offset()
            );
            return Ok(entry.offset());
        }
        position += LANGUAGE_ENTRY_SIZE as u64;
    }
}
