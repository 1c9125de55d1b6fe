#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use luredev::{ids::ENGLISH_LANGUAGE_CODE, resources::ResourceStore};

fn body(files: [Vec<u8>; 5]) -> anyhow::Result<()> {
    let mut store = ResourceStore::from_sources(files.map(Cursor::new), ENGLISH_LANGUAGE_CODE)?;
    let keys: Vec<_> = store.keys().collect();
    for key in keys {
        // Entries may point past the end of their file.
        let _data = store.get(key);
    }
    store.close()?;
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    // The input is split into the five files by four leading u16 lengths.
    if data.len() < 8 {
        return;
    }
    let (lengths, mut rest) = data.split_at(8);
    let mut files: [Vec<u8>; 5] = Default::default();
    for (file, length) in files.iter_mut().zip(lengths.chunks_exact(2)) {
        let length = usize::from(u16::from_le_bytes([length[0], length[1]])).min(rest.len());
        let (contents, remaining) = rest.split_at(length);
        *file = contents.to_vec();
        rest = remaining;
    }
    files[4] = rest.to_vec();

    let _result = body(files);
});
