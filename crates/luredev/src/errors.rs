//! Error types shared by the archive store and the resource decoders.

use std::{fmt, io, path::PathBuf};

use itertools::Itertools as _;

use crate::ids::ResourceId;

/// The specific way in which a piece of data failed to match the expected
/// format.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FormatErrorKind {
    #[error("expected magic {expected:02x?}, found {found:02x?}")]
    MagicMismatch { expected: Vec<u8>, found: Vec<u8> },
    #[error("not enough data: needed {required} bytes, but only {available} available")]
    NotEnoughData { required: usize, available: usize },
    #[error("palette length {len} is not a multiple of 3")]
    PaletteLength { len: usize },
    #[error("room offset table is not terminated by 0xFFFF")]
    MissingRoomTableEnd,
    #[error("literal stream offset {offset:#x} lies outside of the {len} byte buffer")]
    LiteralOffsetOutOfRange { offset: u32, len: usize },
    #[error("literal stream exhausted")]
    LiteralStreamExhausted,
    #[error("code stream exhausted before the end marker")]
    CodeStreamExhausted,
    #[error("decoded output exceeded the limit of {limit} bytes")]
    OutputLimitExceeded { limit: usize },
    #[error("decoded {len} bytes, which is not a whole number of {width} pixel rows")]
    PartialRow { len: usize, width: usize },
}

/// Data did not match the archive or resource format.
///
/// The offset is relative to the start of the file for archive structures,
/// and relative to the start of the resource for decoded resources.
#[derive(Debug, thiserror::Error)]
#[error("Malformed data at offset {offset:#x}: {kind}")]
pub struct FormatError {
    offset: u64,
    kind: FormatErrorKind,
}

impl FormatError {
    #[must_use]
    pub fn new(offset: u64, kind: FormatErrorKind) -> Self {
        Self { offset, kind }
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub fn kind(&self) -> &FormatErrorKind {
        &self.kind
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceNotFound {
    #[error("Resource {0} not found")]
    Resource(ResourceId),
    #[error("No language section for language code {0}")]
    LanguageSection(u8),
    #[error("Room {0} has no layers to locate its palette from")]
    RoomPalette(u16),
}

/// A single-use decoder was asked to decode a second time.
#[derive(Debug, thiserror::Error)]
#[error("Layer decoder has already been used; create a new decoder for each layer")]
pub struct ReuseError;

/// One or more archive files failed to close cleanly.
#[derive(Debug)]
pub struct CloseError {
    failures: Vec<(&'static str, io::Error)>,
}

impl CloseError {
    pub(crate) fn new(failures: Vec<(&'static str, io::Error)>) -> Self {
        Self { failures }
    }

    /// The file names and errors of every file that failed to close.
    #[must_use]
    pub fn failures(&self) -> &[(&'static str, io::Error)] {
        &self.failures
    }
}

impl fmt::Display for CloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to close {} archive file(s): {}",
            self.failures.len(),
            self.failures
                .iter()
                .format_with("; ", |(name, err), f| f(&format_args!("{name}: {err}")))
        )
    }
}

impl std::error::Error for CloseError {}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    NotFound(#[from] ResourceNotFound),
    #[error(transparent)]
    Reuse(#[from] ReuseError),
    #[error("Failed to open archive file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error during operation: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Close(#[from] CloseError),
    #[error("Resource store has already been closed")]
    StoreClosed,
}

impl Error {
    /// Returns true if this error reports a missing resource or language,
    /// which callers may choose to skip over.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
