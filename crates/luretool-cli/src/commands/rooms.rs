use std::{fmt, path::Path};

use anyhow::Context as _;
use bytes::Bytes;
use itertools::Itertools as _;
use luredev::{
    ResourceId,
    ids::ROOM_DATA_RESOURCE_ID,
    resources::{
        ArchiveSource, ChannelScaling, LayerDecodeOptions, LayerDecoder, ResourceStore,
        RoomRecord, RoomScene, read_rooms,
    },
};
use rayon::prelude::*;

pub(crate) fn load_rooms<S>(store: &mut ResourceStore<S>) -> anyhow::Result<Vec<RoomRecord>>
where
    S: ArchiveSource,
{
    let data = store.get(ROOM_DATA_RESOURCE_ID)?;
    let rooms = read_rooms(&data)
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to read the room table")?;
    log::info!("Read {} rooms", rooms.len());
    Ok(rooms)
}

pub(crate) fn find_room(rooms: &[RoomRecord], number: u16) -> anyhow::Result<&RoomRecord> {
    rooms
        .iter()
        .find(|room| room.room_number() == number)
        .with_context(|| format!("There is no room number {number}"))
}

/// A tab separated line: room number, layer count, layer ids and the files
/// holding the layers.
pub(crate) fn room_summary(room: &RoomRecord) -> String {
    let layers: Vec<ResourceId> = room.layer_ids().collect();
    format!(
        "{}\t{}\t{}\t{}",
        room.room_number(),
        room.num_layers(),
        layers.iter().join(","),
        layers.iter().map(|id| id.file_name()).unique().join(",")
    )
}

/// Renders `room` to a PNG at `path`, and returns its size.
pub(crate) fn render_room<S>(
    store: &mut ResourceStore<S>,
    room: &RoomRecord,
    options: &LayerDecodeOptions,
    scaling: ChannelScaling,
    path: &Path,
) -> anyhow::Result<(u32, u32)>
where
    S: ArchiveSource,
{
    let scene = RoomScene::load(store, room, options, scaling)
        .with_context(|| format!("Failed to load room {}", room.room_number()))?;
    let image = scene_image(&scene)?;
    let size = image.dimensions();
    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(size)
}

pub(crate) fn scene_image(scene: &RoomScene) -> anyhow::Result<image::RgbImage> {
    rgb_image(scene.width(), scene.height(), scene.to_rgb())
}

fn rgb_image(width: usize, height: usize, rgb: Vec<u8>) -> anyhow::Result<image::RgbImage> {
    let width = u32::try_from(width)?;
    let height = u32::try_from(height)?;
    image::RgbImage::from_raw(width, height, rgb)
        .context("Pixel data does not match the image size")
}

/// The data of one layer, or the error from fetching it.
pub(crate) struct LayerInput {
    room: u16,
    id: ResourceId,
    data: Result<Bytes, luredev::Error>,
}

pub(crate) struct LayerFailure {
    room: u16,
    id: ResourceId,
    error: luredev::Error,
}

impl fmt::Display for LayerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Room {} layer {}: {}", self.room, self.id, self.error)
    }
}

/// Fetches every layer of every room. Fetch failures are kept so they can be
/// reported with the decode failures.
pub(crate) fn collect_layers<S>(
    store: &mut ResourceStore<S>,
    rooms: &[RoomRecord],
) -> Vec<LayerInput>
where
    S: ArchiveSource,
{
    rooms
        .iter()
        .flat_map(|room| room.layer_ids().map(move |id| (room.room_number(), id)))
        .map(|(room, id)| LayerInput {
            room,
            id,
            data: store.get(id),
        })
        .collect()
}

/// Decodes each layer with its own decoder, in parallel, and returns the
/// failures in input order.
pub(crate) fn check_layers(
    layers: Vec<LayerInput>,
    options: &LayerDecodeOptions,
) -> Vec<LayerFailure> {
    layers
        .into_par_iter()
        .filter_map(|LayerInput { room, id, data }| {
            let result = data.and_then(|data| {
                LayerDecoder::with_options(*options)
                    .decode(&data)
                    .map_err(luredev::Error::from)
            });
            match result {
                Ok(bitmap) => {
                    log::debug!("Room {room} layer {id}: {} rows", bitmap.height());
                    None
                }
                Err(error) => Some(LayerFailure { room, id, error }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use luredev::errors::ResourceNotFound;

    use super::*;

    fn room_bytes(room_number: u16, layers: &[u16]) -> Vec<u8> {
        let mut record = vec![0u8; 40];
        record[0..2].copy_from_slice(&room_number.to_le_bytes());
        record[10..12].copy_from_slice(&u16::try_from(layers.len()).unwrap().to_le_bytes());
        for (slot, id) in layers.iter().enumerate() {
            record[12 + slot * 2..14 + slot * 2].copy_from_slice(&id.to_le_bytes());
        }
        let mut data = vec![4, 0, 0xFF, 0xFF];
        data.extend_from_slice(&record);
        data
    }

    fn room(room_number: u16, layers: &[u16]) -> RoomRecord {
        read_rooms(&room_bytes(room_number, layers))
            .next()
            .unwrap()
            .unwrap()
    }

    /// A layer of one row of a single color.
    fn solid_row(value: u8) -> Vec<u8> {
        let mut data = vec![0u8; 1024];
        data.extend_from_slice(&1029u32.to_le_bytes());
        // Codes: 01 (run) 01 (run) 01 (end), padded with zeros.
        data.push(0b0101_0100);
        data.extend_from_slice(&[value, 255, 64, 0, 0]);
        data
    }

    #[test]
    fn summary_lists_layers_and_files() {
        let summary = room_summary(&room(12, &[0x3F21, 0x4022, 0x3F23]));
        assert_eq!(summary, "12\t3\t0x3f21,0x4022,0x3f23\tlure.dat,disk2.vga");
    }

    #[test]
    fn find_room_by_number() {
        let rooms = [room(1, &[1]), room(5, &[2])];
        assert_eq!(find_room(&rooms, 5).unwrap().room_number(), 5);
        assert!(find_room(&rooms, 2).is_err());
    }

    #[test]
    fn check_reports_fetch_and_decode_failures() {
        let layers = vec![
            LayerInput {
                room: 1,
                id: ResourceId::new(0x3F21),
                data: Ok(Bytes::from(solid_row(7))),
            },
            LayerInput {
                room: 1,
                id: ResourceId::new(0x3F22),
                data: Ok(Bytes::from_static(&[1, 2, 3])),
            },
            LayerInput {
                room: 2,
                id: ResourceId::new(0x3F41),
                data: Err(ResourceNotFound::Resource(ResourceId::new(0x3F41)).into()),
            },
        ];
        let failures = check_layers(layers, &LayerDecodeOptions::default());
        let ids: Vec<_> = failures.iter().map(|failure| failure.id).collect();
        assert_eq!(ids, [ResourceId::new(0x3F22), ResourceId::new(0x3F41)]);
        assert!(failures[0].to_string().starts_with("Room 1 layer 0x3f22: "));
        assert!(failures[1].error.is_not_found());
    }

    #[test]
    fn image_size_must_match_pixels() {
        let image = rgb_image(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(image.dimensions(), (2, 1));
        assert_eq!(image.get_pixel(1, 0).0, [4, 5, 6]);
        assert!(rgb_image(2, 2, vec![0; 6]).is_err());
    }
}
