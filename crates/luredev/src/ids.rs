//! Resource identifiers, and the routing from an identifier to the archive
//! file that holds it.

use std::{fmt::Display, str::FromStr};

/// The physical archive files, in the order the store opens them. The index
/// of a name in this array is the file index returned by
/// [`ResourceId::file_index`].
pub const ARCHIVE_FILE_NAMES: [&str; 5] = [
    "lure.dat",
    "disk1.vga",
    "disk2.vga",
    "disk3.vga",
    "disk4.vga",
];

/// Resources whose top byte equals this marker live in `lure.dat`.
const PRIMARY_FILE_MARKER: u8 = 0x3F;

/// The resource holding the room offset table and room records.
pub const ROOM_DATA_RESOURCE_ID: ResourceId = ResourceId::new(0x3F05);

/// Language code of the English directory in `lure.dat`.
pub const ENGLISH_LANGUAGE_CODE: u8 = 3;

#[derive(thiserror::Error, Debug)]
#[error("Error converting to ID: {message}")]
pub struct IdConversionError {
    message: String,
}

/// A 16-bit resource identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(u16);

impl ResourceId {
    /// The id that marks an unused directory slot.
    pub const UNUSED: ResourceId = ResourceId(0xFFFF);

    #[must_use]
    pub const fn new(raw: u16) -> Self {
        ResourceId(raw)
    }

    #[must_use]
    pub fn raw(self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn is_unused(self) -> bool {
        self == Self::UNUSED
    }

    /// The index into [`ARCHIVE_FILE_NAMES`] of the file holding this
    /// resource.
    #[must_use]
    pub fn file_index(self) -> usize {
        let [high, _] = self.0.to_be_bytes();
        if high == PRIMARY_FILE_MARKER {
            0
        } else {
            usize::from((self.0 >> 14) & 3) + 1
        }
    }

    #[must_use]
    pub fn file_name(self) -> &'static str {
        ARCHIVE_FILE_NAMES[self.file_index()]
    }
}

impl From<u16> for ResourceId {
    fn from(raw: u16) -> Self {
        ResourceId(raw)
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

impl std::fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ResourceId({:#06x})", self.0)
    }
}

/// Parses either a hexadecimal id with a `0x` prefix, or a decimal id.
impl FromStr for ResourceId {
    type Err = IdConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u16::from_str_radix(hex, 16),
            None => s.parse::<u16>(),
        };
        parsed.map(ResourceId).map_err(|err| IdConversionError {
            message: format!("Invalid resource id {s:?}: {err}"),
        })
    }
}
