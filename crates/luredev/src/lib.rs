//! Provides low-level tools for extracting assets from Lure of the Temptress
//! game archives.
//!
//! This covers the multi-file resource archive (`lure.dat` plus the four
//! `diskN.vga` files), and the decoders for the structured resources stored
//! in them: the room catalog, VGA palettes, and compressed background layers.

pub mod errors;
pub mod ids;
pub mod resources;
pub mod utils;

pub use errors::Error;
pub use ids::ResourceId;

#[cfg(test)]
mod reference_tests;
#[cfg(test)]
pub(crate) mod testing;
