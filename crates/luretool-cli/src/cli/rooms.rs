use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use luredev::resources::{ChannelScaling, LayerDecodeOptions, LiteralExhaustion, SuccessorSlot};

use crate::{
    cli::GlobalArgs,
    commands::rooms::{check_layers, collect_layers, find_room, load_rooms, render_room, room_summary},
};

/// Layer decoding options shared by the commands that decode layers.
#[derive(Parser)]
struct DecodeArgs {
    /// Use the fourth chain table column for the `101` code.
    #[clap(long)]
    fourth_slot: bool,

    /// Read missing literals as 0 instead of failing.
    #[clap(long)]
    zero_pad: bool,
}

impl DecodeArgs {
    fn options(&self) -> LayerDecodeOptions {
        LayerDecodeOptions::new()
            .with_successor_slot(if self.fourth_slot {
                SuccessorSlot::Fourth
            } else {
                SuccessorSlot::Third
            })
            .with_literal_exhaustion(if self.zero_pad {
                LiteralExhaustion::ZeroPad
            } else {
                LiteralExhaustion::Fail
            })
    }
}

#[derive(Parser)]
pub(crate) struct ListRooms {}

impl ListRooms {
    pub(crate) fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let mut store = global.open_store()?;
        for room in load_rooms(&mut store)? {
            println!("{}", room_summary(&room));
        }
        store.close()?;
        Ok(())
    }
}

#[derive(Parser)]
pub(crate) struct RenderRoom {
    /// The number of the room to render.
    room: u16,

    /// The PNG file to write.
    #[clap(short = 'o', long)]
    output: PathBuf,

    /// Write palette channels as stored instead of widening them from 6 bits.
    #[clap(long)]
    raw_palette: bool,

    #[clap(flatten)]
    decode: DecodeArgs,
}

impl RenderRoom {
    pub(crate) fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let mut store = global.open_store()?;
        let rooms = load_rooms(&mut store)?;
        let room = find_room(&rooms, self.room)?;
        let scaling = if self.raw_palette {
            ChannelScaling::Raw
        } else {
            ChannelScaling::Vga6Bit
        };
        let (width, height) = render_room(
            &mut store,
            room,
            &self.decode.options(),
            scaling,
            &self.output,
        )?;
        eprintln!(
            "Wrote room {} ({width}x{height}) to {}",
            self.room,
            self.output.display()
        );
        store.close()?;
        Ok(())
    }
}

#[derive(Parser)]
pub(crate) struct CheckRooms {
    #[clap(flatten)]
    decode: DecodeArgs,
}

impl CheckRooms {
    pub(crate) fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let mut store = global.open_store()?;
        let rooms = load_rooms(&mut store)?;
        let layers = collect_layers(&mut store, &rooms);
        store.close()?;

        let total = layers.len();
        let failures = check_layers(layers, &self.decode.options());
        for failure in &failures {
            eprintln!("{failure}");
        }
        if !failures.is_empty() {
            bail!("{} of {total} layers failed to decode", failures.len());
        }
        eprintln!("All {total} layers of {} rooms decoded", rooms.len());
        Ok(())
    }
}
