use std::{io::Write, path::Path};

use anyhow::Context as _;
use luredev::{
    ResourceId,
    resources::{ArchiveSource, ResourceStore},
    utils::debug::hex_dump_to,
};

/// Writes one line per resource: id, file, byte offset and size, separated
/// by tabs.
pub(crate) fn list_resources<S, W>(
    store: &ResourceStore<S>,
    file_index: Option<usize>,
    mut output: W,
) -> anyhow::Result<()>
where
    S: ArchiveSource,
    W: Write,
{
    let locations = store
        .locations()
        .filter(|loc| file_index.is_none_or(|index| loc.id().file_index() == index));
    for loc in locations {
        writeln!(
            output,
            "{}\t{}\t{:#x}\t{}",
            loc.id(),
            loc.file_name(),
            loc.file_offset(),
            loc.size()
        )?;
    }
    Ok(())
}

/// Writes the raw bytes of `id` to `path`, and returns the number written.
pub(crate) fn extract_resource<S>(
    store: &mut ResourceStore<S>,
    id: ResourceId,
    path: &Path,
) -> anyhow::Result<usize>
where
    S: ArchiveSource,
{
    let data = store.get(id)?;
    std::fs::write(path, &data)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(data.len())
}

pub(crate) fn dump_resource<S, W>(
    store: &mut ResourceStore<S>,
    id: ResourceId,
    output: W,
) -> anyhow::Result<()>
where
    S: ArchiveSource,
    W: Write,
{
    let data = store.get(id)?;
    hex_dump_to(output, &data, 0)?;
    Ok(())
}
