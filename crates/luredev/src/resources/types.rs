//! Decoders for the resource types that make up a room.

pub mod layer;
pub mod palette;
pub mod room;
