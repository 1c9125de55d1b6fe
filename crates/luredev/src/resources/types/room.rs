//! Room records, read from the room data resource.
//!
//! The resource starts with a table of u16 offsets, one per room, ending in
//! 0xFFFF. Each offset points at a 40-byte record elsewhere in the resource.

use std::iter::FusedIterator;

use crate::{
    errors::{FormatError, FormatErrorKind},
    ids::ResourceId,
    utils::mem_reader::{self, MemReader, Parse, SliceMemReader},
};

pub const ROOM_RECORD_SIZE: usize = 40;
const MAX_LAYERS: usize = 4;
const ROOM_TABLE_END: u16 = 0xFFFF;

/// Returns the id of the palette for a room whose first layer is `layer0`.
///
/// Resources are allocated in blocks of 32 ids, and a room's palette is the
/// resource just before the block holding its first layer. Returns `None`
/// if that would fall below id 0.
#[must_use]
pub fn room_palette_id(layer0: ResourceId) -> Option<ResourceId> {
    (layer0.raw() & 0xFFE0).checked_sub(1).map(ResourceId::new)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomRect {
    x_start: i16,
    x_end: i16,
    y_start: i16,
    y_end: i16,
}

impl RoomRect {
    #[must_use]
    pub fn x_start(&self) -> i16 {
        self.x_start
    }

    #[must_use]
    pub fn x_end(&self) -> i16 {
        self.x_end
    }

    #[must_use]
    pub fn y_start(&self) -> i16 {
        self.y_start
    }

    #[must_use]
    pub fn y_end(&self) -> i16 {
        self.y_end
    }
}

impl Parse for RoomRect {
    fn parse<M: MemReader>(reader: &mut M) -> mem_reader::Result<Self> {
        Ok(RoomRect {
            x_start: reader.read_i16_le()?,
            x_end: reader.read_i16_le()?,
            y_start: reader.read_i16_le()?,
            y_end: reader.read_i16_le()?,
        })
    }
}

/// The structural fields of one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRecord {
    room_number: u16,
    flags: u8,
    actions: u32,
    desc_id: u16,
    num_layers: u16,
    layers: [u16; MAX_LAYERS],
    sequence_offset: u16,
    clip_x_start: i16,
    clip_x_end: i16,
    area_flag: u8,
    num_exits: u8,
    exit_time: u32,
    walk_bounds: RoomRect,
}

impl RoomRecord {
    #[must_use]
    pub fn room_number(&self) -> u16 {
        self.room_number
    }

    #[must_use]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    #[must_use]
    pub fn actions(&self) -> u32 {
        self.actions
    }

    #[must_use]
    pub fn desc_id(&self) -> u16 {
        self.desc_id
    }

    /// The layer count as stored. May exceed the four layer slots.
    #[must_use]
    pub fn num_layers(&self) -> u16 {
        self.num_layers
    }

    /// The raw layer slots, with 0 marking an unused slot.
    #[must_use]
    pub fn layers(&self) -> [u16; MAX_LAYERS] {
        self.layers
    }

    /// The ids of the layers this room uses, bottom layer first.
    pub fn layer_ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.layers
            .iter()
            .take(usize::from(self.num_layers))
            .filter(|&&id| id != 0)
            .map(|&id| ResourceId::new(id))
    }

    /// The id of the palette for this room, derived from its first layer.
    #[must_use]
    pub fn palette_id(&self) -> Option<ResourceId> {
        room_palette_id(ResourceId::new(self.layers[0]))
    }

    #[must_use]
    pub fn sequence_offset(&self) -> u16 {
        self.sequence_offset
    }

    #[must_use]
    pub fn clip_x_start(&self) -> i16 {
        self.clip_x_start
    }

    #[must_use]
    pub fn clip_x_end(&self) -> i16 {
        self.clip_x_end
    }

    #[must_use]
    pub fn area_flag(&self) -> u8 {
        self.area_flag
    }

    #[must_use]
    pub fn num_exits(&self) -> u8 {
        self.num_exits
    }

    #[must_use]
    pub fn exit_time(&self) -> u32 {
        self.exit_time
    }

    #[must_use]
    pub fn walk_bounds(&self) -> RoomRect {
        self.walk_bounds
    }
}

impl Parse for RoomRecord {
    fn parse<M: MemReader>(reader: &mut M) -> mem_reader::Result<Self> {
        let room_number = reader.read_u16_le()?;
        let flags = reader.read_u8()?;
        let _unused = reader.read_u8()?;
        let actions = reader.read_u32_le()?;
        let desc_id = reader.read_u16_le()?;
        let num_layers = reader.read_u16_le()?;
        let mut layers = [0u16; MAX_LAYERS];
        for layer in &mut layers {
            *layer = reader.read_u16_le()?;
        }
        Ok(RoomRecord {
            room_number,
            flags,
            actions,
            desc_id,
            num_layers,
            layers,
            sequence_offset: reader.read_u16_le()?,
            clip_x_start: reader.read_i16_le()?,
            clip_x_end: reader.read_i16_le()?,
            area_flag: reader.read_u8()?,
            num_exits: reader.read_u8()?,
            exit_time: reader.read_u32_le()?,
            walk_bounds: RoomRect::parse(reader)?,
        })
    }
}

/// Iterates over the rooms in a room data resource.
///
/// The iterator ends at the table terminator, or after yielding the first
/// error.
#[derive(Debug, Clone)]
pub struct RoomIter<'a> {
    data: &'a [u8],
    table_position: usize,
    finished: bool,
}

impl RoomIter<'_> {
    fn read_room(&mut self) -> mem_reader::Result<Option<RoomRecord>> {
        let mut reader = SliceMemReader::new(self.data);
        reader.seek_to(self.table_position)?;
        if reader.remaining() < 2 {
            return Err(reader.create_format_error(FormatErrorKind::MissingRoomTableEnd));
        }
        let offset = reader.read_u16_le()?;
        if offset == ROOM_TABLE_END {
            return Ok(None);
        }
        self.table_position = reader.tell();

        let offset = usize::from(offset);
        if self.data.len() < offset + ROOM_RECORD_SIZE {
            return Err(FormatError::new(
                offset as u64,
                FormatErrorKind::NotEnoughData {
                    required: ROOM_RECORD_SIZE,
                    available: self.data.len().saturating_sub(offset),
                },
            ));
        }
        let mut record_reader = SliceMemReader::new(self.data);
        record_reader.seek_to(offset)?;
        RoomRecord::parse(&mut record_reader).map(Some)
    }
}

impl Iterator for RoomIter<'_> {
    type Item = Result<RoomRecord, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_room() {
            Ok(Some(room)) => Some(Ok(room)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for RoomIter<'_> {}

/// Reads the rooms out of the room data resource. Reading does not consume
/// `data`, so the same buffer can be read again.
#[must_use]
pub fn read_rooms(data: &[u8]) -> RoomIter<'_> {
    RoomIter {
        data,
        table_position: 0,
        finished: false,
    }
}
