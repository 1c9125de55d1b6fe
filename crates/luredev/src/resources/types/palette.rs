use crate::errors::{FormatError, FormatErrorKind};

/// How stored color channel values map to 8-bit output channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelScaling {
    /// Channels are 6-bit VGA DAC values, widened to 8 bits by replicating
    /// the top bits into the bottom.
    #[default]
    Vga6Bit,
    /// Channels are used as stored.
    Raw,
}

impl ChannelScaling {
    #[must_use]
    pub fn scale(self, value: u8) -> u8 {
        match self {
            ChannelScaling::Vga6Bit => (value << 2) | (value >> 4),
            ChannelScaling::Raw => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    r: u8,
    g: u8,
    b: u8,
}

impl PaletteEntry {
    #[must_use]
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub fn red(&self) -> u8 {
        self.r
    }

    #[must_use]
    pub fn green(&self) -> u8 {
        self.g
    }

    #[must_use]
    pub fn blue(&self) -> u8 {
        self.b
    }

    #[must_use]
    pub fn to_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// An ordered table of colors, indexed by pixel value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    /// Decodes a palette from consecutive RGB triples.
    pub fn from_data(data: &[u8], scaling: ChannelScaling) -> Result<Self, FormatError> {
        if data.len() % 3 != 0 {
            return Err(FormatError::new(
                0,
                FormatErrorKind::PaletteLength { len: data.len() },
            ));
        }
        let entries = data
            .chunks_exact(3)
            .map(|triple| {
                PaletteEntry::new(
                    scaling.scale(triple[0]),
                    scaling.scale(triple[1]),
                    scaling.scale(triple[2]),
                )
            })
            .collect();
        Ok(Self { entries })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn get(&self, index: u8) -> Option<&PaletteEntry> {
        self.entries.get(usize::from(index))
    }

    #[must_use]
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }
}
