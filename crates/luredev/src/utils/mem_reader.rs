//! Structured little-endian reads over in-memory byte slices.

use crate::errors::{FormatError, FormatErrorKind};

pub type Result<T> = std::result::Result<T, FormatError>;

macro_rules! impl_read_int {
    ($name:ident, $ty:ty) => {
        fn $name(&mut self) -> Result<$ty> {
            let mut buf = [0u8; std::mem::size_of::<$ty>()];
            self.read_exact(&mut buf)?;
            Ok(<$ty>::from_le_bytes(buf))
        }
    };
}

pub trait MemReader {
    fn seek_to(&mut self, offset: usize) -> Result<()>;

    #[must_use]
    fn tell(&self) -> usize;

    #[must_use]
    fn data_size(&self) -> usize;

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Create a `FormatError` located at `position` within this reader.
    fn create_format_error_at(&self, position: usize, kind: FormatErrorKind) -> FormatError;

    /// Create a `FormatError` located at the current read position.
    fn create_format_error(&self, kind: FormatErrorKind) -> FormatError {
        self.create_format_error_at(self.tell(), kind)
    }

    #[must_use]
    fn remaining(&self) -> usize {
        self.data_size() - self.tell()
    }

    #[must_use]
    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads `magic.len()` bytes, and fails if they differ from `magic`. The
    /// error is located at the start of the magic tag.
    fn expect_magic(&mut self, magic: &[u8]) -> Result<()> {
        let start = self.tell();
        let mut found = vec![0u8; magic.len().min(self.remaining())];
        self.read_exact(&mut found)?;
        if found != magic {
            return Err(self.create_format_error_at(
                start,
                FormatErrorKind::MagicMismatch {
                    expected: magic.to_vec(),
                    found,
                },
            ));
        }
        Ok(())
    }

    impl_read_int!(read_u8, u8);
    impl_read_int!(read_u16_le, u16);
    impl_read_int!(read_i16_le, i16);
    impl_read_int!(read_u32_le, u32);
}

impl<M> MemReader for &mut M
where
    M: MemReader,
{
    fn seek_to(&mut self, offset: usize) -> Result<()> {
        (**self).seek_to(offset)
    }

    fn tell(&self) -> usize {
        (**self).tell()
    }

    fn data_size(&self) -> usize {
        (**self).data_size()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_exact(buf)
    }

    fn create_format_error_at(&self, position: usize, kind: FormatErrorKind) -> FormatError {
        (**self).create_format_error_at(position, kind)
    }
}

/// A [`MemReader`] over a borrowed slice.
///
/// Errors report offsets relative to `base_offset`, so a slice read out of
/// the middle of a file still reports file offsets.
#[derive(Debug, Clone)]
pub struct SliceMemReader<'a> {
    data: &'a [u8],
    base_offset: u64,
    position: usize,
}

impl<'a> SliceMemReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_base_offset(data, 0)
    }

    #[must_use]
    pub fn with_base_offset(data: &'a [u8], base_offset: u64) -> Self {
        Self {
            data,
            base_offset,
            position: 0,
        }
    }

    fn not_enough_data(&self, required: usize) -> FormatError {
        self.create_format_error(FormatErrorKind::NotEnoughData {
            required,
            available: self.remaining(),
        })
    }
}

impl MemReader for SliceMemReader<'_> {
    fn seek_to(&mut self, offset: usize) -> Result<()> {
        if self.data.len() < offset {
            return Err(self.create_format_error_at(
                0,
                FormatErrorKind::NotEnoughData {
                    required: offset,
                    available: self.data.len(),
                },
            ));
        }
        self.position = offset;
        Ok(())
    }

    fn tell(&self) -> usize {
        self.position
    }

    fn data_size(&self) -> usize {
        self.data.len()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.remaining() < buf.len() {
            return Err(self.not_enough_data(buf.len()));
        }
        let end = self.position + buf.len();
        buf.copy_from_slice(&self.data[self.position..end]);
        self.position = end;
        Ok(())
    }

    fn create_format_error_at(&self, position: usize, kind: FormatErrorKind) -> FormatError {
        FormatError::new(self.base_offset + position as u64, kind)
    }
}

/// A trait for types that can be parsed from a `MemReader`.
pub trait Parse: Sized {
    /// Parses a value from the given `MemReader`.
    ///
    /// This function should leave the reader at the position immediately after
    /// the parsed value.
    fn parse<M: MemReader>(reader: &mut M) -> Result<Self>;
}
