use std::path::PathBuf;

use clap::{Parser, Subcommand};
use luredev::ResourceId;

use crate::{
    cli::GlobalArgs,
    commands::resources::{dump_resource, extract_resource, list_resources},
};

/// Commands for working with raw archive resources.
#[derive(Parser)]
pub(crate) struct Resource {
    /// The specific resource command to execute.
    #[clap(subcommand)]
    res_cmd: ResourceCommand,
}

impl Resource {
    pub(crate) fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        self.res_cmd.run(global)
    }
}

/// The specific resource command to execute.
#[derive(Subcommand)]
enum ResourceCommand {
    /// Lists resources with their file, offset and size.
    List(ListResources),

    /// Writes the raw bytes of a resource to a file.
    Extract(ExtractResource),

    /// Dumps the hexadecimal content of a resource.
    Dump(DumpResource),
}

impl ResourceCommand {
    fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        match self {
            ResourceCommand::List(list) => list.run(global)?,
            ResourceCommand::Extract(extract) => extract.run(global)?,
            ResourceCommand::Dump(dump) => dump.run(global)?,
        }
        Ok(())
    }
}

#[derive(Parser)]
struct ListResources {
    /// Only list resources in this file: 0 for lure.dat, 1 to 4 for the disks.
    #[clap(long, value_parser = clap::value_parser!(u8).range(0..=4))]
    file: Option<u8>,
}

impl ListResources {
    fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let mut store = global.open_store()?;
        list_resources(
            &store,
            self.file.map(usize::from),
            std::io::stdout().lock(),
        )?;
        store.close()?;
        Ok(())
    }
}

#[derive(Parser)]
struct ExtractResource {
    /// The ID of the resource, in decimal or 0x-prefixed hex.
    resource_id: ResourceId,

    /// The file to write to.
    #[clap(short = 'o', long)]
    output: PathBuf,
}

impl ExtractResource {
    fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let mut store = global.open_store()?;
        let size = extract_resource(&mut store, self.resource_id, &self.output)?;
        eprintln!(
            "Wrote resource {} ({size} bytes) to {}",
            self.resource_id,
            self.output.display()
        );
        store.close()?;
        Ok(())
    }
}

#[derive(Parser)]
struct DumpResource {
    /// The ID of the resource, in decimal or 0x-prefixed hex.
    resource_id: ResourceId,
}

impl DumpResource {
    fn run(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let mut store = global.open_store()?;
        dump_resource(&mut store, self.resource_id, std::io::stdout().lock())?;
        store.close()?;
        Ok(())
    }
}
