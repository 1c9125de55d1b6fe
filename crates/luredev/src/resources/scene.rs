//! Loading everything needed to draw a room.

use crate::{
    Error,
    errors::ResourceNotFound,
    ids::ResourceId,
    resources::{
        file::{ArchiveSource, ResourceStore},
        types::{
            layer::{LayerBitmap, LayerDecodeOptions, LayerDecoder},
            palette::{ChannelScaling, Palette},
            room::RoomRecord,
        },
    },
};

/// The decoded layers and palette of one room.
#[derive(Debug, Clone)]
pub struct RoomScene {
    room_number: u16,
    layers: Vec<(ResourceId, LayerBitmap)>,
    palette: Palette,
}

impl RoomScene {
    /// Fetches and decodes the palette and every layer of `room`. Each layer
    /// gets its own decoder built from `options`.
    pub fn load<S>(
        store: &mut ResourceStore<S>,
        room: &RoomRecord,
        options: &LayerDecodeOptions,
        scaling: ChannelScaling,
    ) -> Result<Self, Error>
    where
        S: ArchiveSource,
    {
        let palette_id = room
            .palette_id()
            .ok_or(ResourceNotFound::RoomPalette(room.room_number()))?;
        let palette = Palette::from_data(&store.get(palette_id)?, scaling)?;

        let mut layers = Vec::new();
        for id in room.layer_ids() {
            let data = store.get(id)?;
            let bitmap = LayerDecoder::with_options(*options).decode(&data)?;
            log::debug!(
                "Room {}: layer {id} is {}x{}",
                room.room_number(),
                bitmap.width(),
                bitmap.height()
            );
            layers.push((id, bitmap));
        }
        Ok(RoomScene {
            room_number: room.room_number(),
            layers,
            palette,
        })
    }

    #[must_use]
    pub fn room_number(&self) -> u16 {
        self.room_number
    }

    #[must_use]
    pub fn layers(&self) -> &[(ResourceId, LayerBitmap)] {
        &self.layers
    }

    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.layers.first().map_or(0, |(_, layer)| layer.width())
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.layers.first().map_or(0, |(_, layer)| layer.height())
    }

    /// Stacks the layers bottom to top. Pixel value 0 is transparent on every
    /// layer but the first, and upper layers are clipped to the first.
    #[must_use]
    pub fn composite(&self) -> Vec<u8> {
        let mut layers = self.layers.iter().map(|(_, layer)| layer.pixels());
        let Some(base) = layers.next() else {
            return Vec::new();
        };
        let mut pixels = base.to_vec();
        for layer in layers {
            for (dest, &src) in pixels.iter_mut().zip(layer) {
                if src != 0 {
                    *dest = src;
                }
            }
        }
        pixels
    }

    /// The composited room as packed RGB bytes. Indices past the end of the
    /// palette are drawn black.
    #[must_use]
    pub fn to_rgb(&self) -> Vec<u8> {
        self.composite()
            .into_iter()
            .flat_map(|index| {
                self.palette
                    .get(index)
                    .map_or([0, 0, 0], |entry| entry.to_array())
            })
            .collect()
    }
}
