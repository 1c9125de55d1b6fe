//! The set of archive files that make up the game data, and the store that
//! resolves resource ids to their contents.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, Read, Seek, SeekFrom},
    path::Path,
};

use bytes::Bytes;

use crate::{
    Error,
    errors::{CloseError, FormatError, FormatErrorKind, ResourceNotFound},
    ids::{ARCHIVE_FILE_NAMES, ResourceId},
};

pub use self::{
    directory::{ArchiveDirectory, ArchiveEntry, DIRECTORY_SLOTS},
    language::LanguageOffsetEntry,
};

pub(crate) use self::directory::directory_magic;

#[cfg(test)]
pub(crate) use self::directory::DIRECTORY_LEN;

mod directory;
mod language;

/// A random-access byte source backing one archive file.
pub trait ArchiveSource: Read + Seek {
    /// Releases the source. The default implementation drops it, which cannot
    /// report a failure.
    fn close(self) -> io::Result<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

impl ArchiveSource for File {}

impl<T> ArchiveSource for io::Cursor<T> where T: AsRef<[u8]> {}

/// Reads exactly `len` bytes at `offset`. Running into the end of the source
/// is a format error, as it means a header or directory pointed past the end
/// of the file.
pub(crate) fn read_block<R>(reader: &mut R, offset: u64, len: usize) -> Result<Vec<u8>, Error>
where
    R: Read + Seek,
{
    reader.seek(SeekFrom::Start(offset))?;
    let mut data = Vec::with_capacity(len);
    reader.by_ref().take(len as u64).read_to_end(&mut data)?;
    if data.len() < len {
        return Err(FormatError::new(
            offset + data.len() as u64,
            FormatErrorKind::NotEnoughData {
                required: len,
                available: data.len(),
            },
        )
        .into());
    }
    Ok(data)
}

/// Where a resource lives within the archive set.
#[derive(Debug, Clone, Copy)]
pub struct ResourceLocation {
    id: ResourceId,
    file_name: &'static str,
    file_offset: u64,
    size: usize,
}

impl ResourceLocation {
    #[must_use]
    pub fn id(self) -> ResourceId {
        self.id
    }

    #[must_use]
    pub fn file_name(self) -> &'static str {
        self.file_name
    }

    #[must_use]
    pub fn file_offset(self) -> u64 {
        self.file_offset
    }

    #[must_use]
    pub fn size(self) -> usize {
        self.size
    }
}

struct ArchiveFile<S> {
    name: &'static str,
    source: S,
    directory: ArchiveDirectory,
}

impl<S> ArchiveFile<S>
where
    S: ArchiveSource,
{
    /// Reads the directory for the file with the given discriminator, which
    /// is also its index in [`ARCHIVE_FILE_NAMES`].
    fn open(discriminator: u16, mut source: S, language: u8) -> Result<Self, (S, Error)> {
        let name = ARCHIVE_FILE_NAMES[usize::from(discriminator)];
        match Self::read_directory(discriminator, &mut source, language) {
            Ok(directory) => Ok(ArchiveFile {
                name,
                source,
                directory,
            }),
            Err(err) => Err((source, err)),
        }
    }

    fn read_directory(
        discriminator: u16,
        source: &mut S,
        language: u8,
    ) -> Result<ArchiveDirectory, Error> {
        let index = usize::from(discriminator);
        let base_offset = if index == 0 {
            language::find_language_offset(source, language)?
        } else {
            0
        };
        let mut directory =
            ArchiveDirectory::read_from(source, base_offset, &directory_magic(discriminator))?;

        // Entries that route to another file can never be fetched.
        for id in directory.retain(|id| id.file_index() == index) {
            log::warn!(
                "Ignoring resource {id} in {}: ids of this form are stored in {}",
                ARCHIVE_FILE_NAMES[index],
                id.file_name()
            );
        }
        Ok(directory)
    }

    fn location(&self, entry: &ArchiveEntry) -> ResourceLocation {
        ResourceLocation {
            id: entry.id(),
            file_name: self.name,
            file_offset: entry.file_offset(self.directory.base_offset()),
            size: entry.byte_len(),
        }
    }
}

fn close_quietly<S: ArchiveSource>(name: &str, source: S) {
    if let Err(err) = source.close() {
        log::warn!("Failed to close {name}: {err}");
    }
}

/// Resolves resource ids to their contents across the five archive files.
///
/// Contents are read from disk the first time an id is requested, and
/// served from memory afterwards.
pub struct ResourceStore<S = File>
where
    S: ArchiveSource,
{
    files: Option<Vec<ArchiveFile<S>>>,
    cache: HashMap<ResourceId, Bytes>,
}

impl ResourceStore<File> {
    /// Opens the archive files in `root_dir`, using the directory for
    /// `language` in the primary file.
    pub fn open(root_dir: &Path, language: u8) -> Result<Self, Error> {
        // Files already opened are dropped, and so closed, on the first
        // failure.
        let [lure, disk1, disk2, disk3, disk4] = ARCHIVE_FILE_NAMES.map(|name| {
            let path = root_dir.join(name);
            File::open(&path).map_err(|source| Error::Open { path, source })
        });
        Self::from_sources([lure?, disk1?, disk2?, disk3?, disk4?], language)
    }
}

impl<S> ResourceStore<S>
where
    S: ArchiveSource,
{
    /// Builds a store over already-opened sources, given in the order of
    /// [`ARCHIVE_FILE_NAMES`].
    ///
    /// If any directory fails to parse, every source is closed before the
    /// error is returned.
    pub fn from_sources(sources: [S; 5], language: u8) -> Result<Self, Error> {
        let mut files: Vec<ArchiveFile<S>> = Vec::with_capacity(sources.len());
        let mut sources = (0u16..).zip(sources);
        while let Some((discriminator, source)) = sources.next() {
            match ArchiveFile::open(discriminator, source, language) {
                Ok(file) => files.push(file),
                Err((source, err)) => {
                    let failed = files
                        .into_iter()
                        .map(|file| (file.name, file.source))
                        .chain(std::iter::once((
                            ARCHIVE_FILE_NAMES[usize::from(discriminator)],
                            source,
                        )))
                        .chain(sources.map(|(discriminator, source)| {
                            (ARCHIVE_FILE_NAMES[usize::from(discriminator)], source)
                        }));
                    for (name, source) in failed {
                        close_quietly(name, source);
                    }
                    return Err(err);
                }
            }
        }
        log::debug!(
            "Opened archive set with {} resources",
            files.iter().map(|file| file.directory.len()).sum::<usize>()
        );
        Ok(ResourceStore {
            files: Some(files),
            cache: HashMap::new(),
        })
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.files.is_none()
    }

    fn files(&self) -> &[ArchiveFile<S>] {
        self.files.as_deref().unwrap_or_default()
    }

    /// Returns the contents of the resource `id`.
    pub fn get(&mut self, id: ResourceId) -> Result<Bytes, Error> {
        let Some(files) = self.files.as_mut() else {
            return Err(Error::StoreClosed);
        };
        if let Some(data) = self.cache.get(&id) {
            log::trace!("Serving resource {id} from cache");
            return Ok(data.clone());
        }

        let file = &mut files[id.file_index()];
        let entry = *file
            .directory
            .get(id)
            .ok_or(ResourceNotFound::Resource(id))?;
        let location = file.location(&entry);
        log::debug!(
            "Reading resource {id} from {} at {:#x} ({} bytes)",
            location.file_name,
            location.file_offset,
            location.size
        );
        let data = Bytes::from(read_block(
            &mut file.source,
            location.file_offset,
            location.size,
        )?);
        self.cache.insert(id, data.clone());
        Ok(data)
    }

    #[must_use]
    pub fn contains(&self, id: ResourceId) -> bool {
        self.entry(id).is_some()
    }

    /// The directory entry for `id`, if it exists.
    #[must_use]
    pub fn entry(&self, id: ResourceId) -> Option<ArchiveEntry> {
        self.files()
            .get(id.file_index())
            .and_then(|file| file.directory.get(id))
            .copied()
    }

    /// The location of `id`, if it exists.
    #[must_use]
    pub fn location(&self, id: ResourceId) -> Option<ResourceLocation> {
        let file = self.files().get(id.file_index())?;
        file.directory.get(id).map(|entry| file.location(entry))
    }

    /// The number of resources across all files. Zero once closed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files().iter().map(|file| file.directory.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Locations of every resource, in file order and then directory order.
    pub fn locations(&self) -> impl Iterator<Item = ResourceLocation> + '_ {
        self.files().iter().flat_map(|file| {
            file.directory
                .entries()
                .map(move |entry| file.location(entry))
        })
    }

    /// Every resource id, in file order and then directory order. Each id
    /// appears once, as it can only be stored in the file it routes to.
    pub fn keys(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.locations().map(ResourceLocation::id)
    }

    /// Closes every archive file. All failures are collected into a single
    /// error. Closing an already closed store does nothing.
    pub fn close(&mut self) -> Result<(), Error> {
        let Some(files) = self.files.take() else {
            return Ok(());
        };
        self.cache.clear();
        let failures: Vec<_> = files
            .into_iter()
            .filter_map(|file| file.source.close().err().map(|err| (file.name, err)))
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(CloseError::new(failures).into())
        }
    }
}

impl<S> Drop for ResourceStore<S>
where
    S: ArchiveSource,
{
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("{err}");
        }
    }
}
