//! Reading resources out of the game archives, and decoding the resource
//! types needed to display a room.

pub mod file;
pub mod scene;
pub mod types;

pub use self::{
    file::{ArchiveEntry, ArchiveSource, ResourceLocation, ResourceStore},
    scene::RoomScene,
    types::{
        layer::{
            LayerBitmap, LayerDecodeError, LayerDecodeOptions, LayerDecoder, LiteralExhaustion,
            SCREEN_WIDTH, SuccessorSlot, decode_layer,
        },
        palette::{ChannelScaling, Palette, PaletteEntry},
        room::{RoomRecord, RoomRect, read_rooms, room_palette_id},
    },
};
