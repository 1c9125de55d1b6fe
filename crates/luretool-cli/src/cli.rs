use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgAction, Args, Parser, Subcommand};
use luredev::{ids::ENGLISH_LANGUAGE_CODE, resources::ResourceStore};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

pub(crate) mod resources;
pub(crate) mod rooms;

/// A command line tool for extracting assets from Lure of the Temptress.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub(crate) struct Cli {
    #[clap(flatten)]
    global: GlobalArgs,

    /// The category of command to run.
    #[clap(subcommand)]
    category: Category,
}

impl Cli {
    pub(crate) fn init_logging(&self) -> anyhow::Result<()> {
        TermLogger::init(
            self.global.log_level(),
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )
        .context("Failed to initialize logging")
    }

    pub(crate) fn run(&self) -> anyhow::Result<()> {
        self.category.run(&self.global)
    }
}

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Directory holding lure.dat and disk1.vga to disk4.vga.
    #[clap(long, global = true, env = "LURE_DATA_DIR", default_value = "./data")]
    root: PathBuf,

    /// Language code of the directory to read from lure.dat.
    #[clap(long, global = true, default_value_t = ENGLISH_LANGUAGE_CODE)]
    lang: u8,

    /// Log more detail. Repeat for more.
    #[clap(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[clap(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

impl GlobalArgs {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub(crate) fn open_store(&self) -> anyhow::Result<ResourceStore> {
        ResourceStore::open(&self.root, self.lang).with_context(|| {
            format!(
                "Failed to open the game archives in {}",
                self.root.display()
            )
        })
    }
}

/// The category of command to run.
#[derive(Subcommand)]
enum Category {
    #[clap(name = "res", about = "Commands for working with raw archive resources.")]
    Resource(resources::Resource),
    /// Lists every room with its layers.
    Rooms(rooms::ListRooms),
    /// Renders a room background to a PNG file.
    Render(rooms::RenderRoom),
    /// Decodes every layer of every room, and reports the ones that fail.
    Check(rooms::CheckRooms),
}

impl Category {
    fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        match self {
            Category::Resource(res) => res.run(global),
            Category::Rooms(rooms) => rooms.run(global),
            Category::Render(render) => render.run(global),
            Category::Check(check) => check.run(global),
        }
    }
}
