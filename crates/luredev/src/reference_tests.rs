//! Checks against a real copy of the game data, found through the
//! `LURE_DATA_DIR` environment variable. Each test passes trivially when the
//! variable is unset or names a missing directory.

use std::{collections::HashSet, path::PathBuf};

use crate::{
    Error, ResourceId,
    ids::{ENGLISH_LANGUAGE_CODE, ROOM_DATA_RESOURCE_ID},
    resources::{
        LayerDecodeOptions, LayerDecoder, ResourceStore, SuccessorSlot, decode_layer, read_rooms,
    },
};

fn open_reference_store() -> Option<ResourceStore> {
    let root = PathBuf::from(std::env::var_os("LURE_DATA_DIR")?);
    if !root.is_dir() {
        return None;
    }
    Some(ResourceStore::open(&root, ENGLISH_LANGUAGE_CODE).unwrap())
}

#[test]
fn keys_are_unique_and_readable() {
    let Some(mut store) = open_reference_store() else {
        return;
    };
    let keys: Vec<ResourceId> = store.keys().collect();
    assert!(!keys.is_empty());
    let unique: HashSet<_> = keys.iter().copied().collect();
    assert_eq!(unique.len(), keys.len());

    for key in keys {
        let first = store.get(key).unwrap();
        assert!(!first.is_empty(), "resource {key} is empty");
        assert_eq!(first, store.get(key).unwrap());
    }
    assert!(store.get(ResourceId::UNUSED).unwrap_err().is_not_found());
}

#[test]
fn room_catalog_has_45_rooms() {
    let Some(mut store) = open_reference_store() else {
        return;
    };
    let data = store.get(ROOM_DATA_RESOURCE_ID).unwrap();
    let rooms: Vec<_> = read_rooms(&data).collect::<Result<_, _>>().unwrap();
    assert_eq!(rooms.len(), 45);
    assert_eq!(rooms[0].room_number(), 1);
    assert!(
        rooms
            .windows(2)
            .all(|pair| pair[0].room_number() <= pair[1].room_number())
    );
}

#[test]
fn every_room_layer_decodes_to_whole_rows() {
    let Some(mut store) = open_reference_store() else {
        return;
    };
    let data = store.get(ROOM_DATA_RESOURCE_ID).unwrap();
    for room in read_rooms(&data) {
        let room = room.unwrap();
        for id in room.layer_ids() {
            let layer = store.get(id).unwrap();
            let bitmap = LayerDecoder::new().decode(&layer).unwrap();
            assert!(!bitmap.pixels().is_empty());
            assert_eq!(bitmap.pixels().len() % 320, 0, "layer {id}");
        }
    }
}

#[test]
fn default_successor_slot_matches_game_layers() {
    let Some(mut store) = open_reference_store() else {
        return;
    };
    let data = store.get(ROOM_DATA_RESOURCE_ID).unwrap();
    let mut layers = Vec::new();
    for room in read_rooms(&data) {
        for id in room.unwrap().layer_ids() {
            layers.push((id, store.get(id).unwrap()));
        }
    }
    assert!(!layers.is_empty());

    let whole_rows = |slot: SuccessorSlot| {
        let options = LayerDecodeOptions::new().with_successor_slot(slot);
        layers
            .iter()
            .filter(|(_, layer)| decode_layer(layer, &options).is_ok())
            .count()
    };
    let third = whole_rows(SuccessorSlot::Third);
    let fourth = whole_rows(SuccessorSlot::Fourth);
    eprintln!(
        "{} layers: {third} decode to whole rows with the third slot, {fourth} with the fourth",
        layers.len()
    );
    assert_eq!(
        LayerDecodeOptions::default().successor_slot(),
        SuccessorSlot::Third
    );
    assert_eq!(third, layers.len());
    assert!(third >= fourth);
}

#[test]
fn close_twice_then_get_fails() {
    let Some(mut store) = open_reference_store() else {
        return;
    };
    store.close().unwrap();
    store.close().unwrap();
    assert!(matches!(
        store.get(ROOM_DATA_RESOURCE_ID),
        Err(Error::StoreClosed)
    ));
}
