//! Builders for synthetic archives and resources used by the unit tests.

use std::{collections::BTreeMap, io, path::Path};

use crate::{
    ids::{ARCHIVE_FILE_NAMES, ENGLISH_LANGUAGE_CODE, ResourceId},
    resources::file::{DIRECTORY_LEN, DIRECTORY_SLOTS, directory_magic},
};

const OFFSET_UNIT: usize = 32;

fn pad_to_unit(data: &mut Vec<u8>) {
    data.resize(data.len().next_multiple_of(OFFSET_UNIT), 0);
}

/// Builds the raw bytes of a single directory, with unused slots filled in.
pub(crate) struct DirectoryBuilder {
    magic: [u8; 8],
    entries: Vec<(u16, usize, u16)>,
}

impl DirectoryBuilder {
    pub(crate) fn new(magic: [u8; 8]) -> Self {
        DirectoryBuilder {
            magic,
            entries: Vec::new(),
        }
    }

    /// Adds an entry of `size` bytes at `offset` units of 32 bytes.
    pub(crate) fn entry(mut self, id: u16, size: usize, offset: u16) -> Self {
        assert!(self.entries.len() < DIRECTORY_SLOTS);
        self.entries.push((id, size, offset));
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut data = self.magic.to_vec();
        for &(id, size, offset) in &self.entries {
            let (extension, size) = if size >= 0x1000 {
                (1u8, size - 0x1000)
            } else {
                (0u8, size)
            };
            let size = u16::try_from(size).unwrap();
            data.extend_from_slice(&id.to_le_bytes());
            data.push(0);
            data.push(extension);
            data.extend_from_slice(&size.to_le_bytes());
            data.extend_from_slice(&offset.to_le_bytes());
        }
        for _ in self.entries.len()..DIRECTORY_SLOTS {
            data.extend_from_slice(&[0xFF, 0xFF, 0, 0, 0, 0, 0, 0]);
        }
        assert_eq!(data.len(), DIRECTORY_LEN);
        data
    }
}

/// Lays out a directory followed by its resources, each starting on a
/// 32-byte boundary relative to the directory.
fn build_section(magic: [u8; 8], resources: &[(u16, Vec<u8>)]) -> Vec<u8> {
    let mut body = vec![0u8; DIRECTORY_LEN];
    pad_to_unit(&mut body);
    let mut directory = DirectoryBuilder::new(magic);
    for (id, data) in resources {
        let offset = u16::try_from(body.len() / OFFSET_UNIT).unwrap();
        directory = directory.entry(*id, data.len(), offset);
        body.extend_from_slice(data);
        pad_to_unit(&mut body);
    }
    body[..DIRECTORY_LEN].copy_from_slice(&directory.build());
    body
}

/// Builds a complete set of the five archive files.
pub(crate) struct ArchiveSetBuilder {
    languages: BTreeMap<u8, Vec<(u16, Vec<u8>)>>,
    disks: [Vec<(u16, Vec<u8>)>; 4],
}

impl ArchiveSetBuilder {
    pub(crate) fn new() -> Self {
        ArchiveSetBuilder {
            languages: BTreeMap::from([(ENGLISH_LANGUAGE_CODE, Vec::new())]),
            disks: Default::default(),
        }
    }

    /// Adds a resource to the file its id routes to. Primary file resources
    /// go in the English directory.
    pub(crate) fn resource(self, id: u16, data: Vec<u8>) -> Self {
        let index = ResourceId::new(id).file_index();
        self.misplaced_resource(index, id, data)
    }

    /// Adds a resource to the primary directory of `language`.
    pub(crate) fn language_resource(mut self, language: u8, id: u16, data: Vec<u8>) -> Self {
        self.languages.entry(language).or_default().push((id, data));
        self
    }

    /// Adds a resource to the file at `file_index`, wherever its id routes.
    pub(crate) fn misplaced_resource(mut self, file_index: usize, id: u16, data: Vec<u8>) -> Self {
        if file_index == 0 {
            self.language_resource(ENGLISH_LANGUAGE_CODE, id, data)
        } else {
            self.disks[file_index - 1].push((id, data));
            self
        }
    }

    fn build_primary(&self) -> Vec<u8> {
        let mut data = b"lure\0\0".to_vec();
        let table_len = data.len() + (self.languages.len() + 1) * 5;
        let mut sections = Vec::new();
        let mut next_base = table_len.next_multiple_of(OFFSET_UNIT);
        for (&code, resources) in &self.languages {
            let section = build_section(directory_magic(0), resources);
            data.push(code);
            data.extend_from_slice(&u32::try_from(next_base).unwrap().to_le_bytes());
            next_base += section.len();
            sections.push(section);
        }
        data.extend_from_slice(&[0xFF, 0, 0, 0, 0]);
        pad_to_unit(&mut data);
        for section in sections {
            data.extend_from_slice(&section);
        }
        data
    }

    /// The file contents, in the order of [`ARCHIVE_FILE_NAMES`].
    pub(crate) fn build(&self) -> [Vec<u8>; 5] {
        let [disk1, disk2, disk3, disk4] = &self.disks;
        [
            self.build_primary(),
            build_section(directory_magic(1), disk1),
            build_section(directory_magic(2), disk2),
            build_section(directory_magic(3), disk3),
            build_section(directory_magic(4), disk4),
        ]
    }

    pub(crate) fn write_to_dir(&self, dir: &Path) -> io::Result<()> {
        for (name, data) in ARCHIVE_FILE_NAMES.iter().zip(self.build()) {
            std::fs::write(dir.join(name), data)?;
        }
        Ok(())
    }
}

/// Writes bits to a byte vector, most significant bit first.
struct MsbFirstWriter {
    output: Vec<u8>,
    curr_byte: u8,
    bits_filled: u8,
}

impl MsbFirstWriter {
    fn new() -> Self {
        MsbFirstWriter {
            output: Vec::new(),
            curr_byte: 0,
            bits_filled: 0,
        }
    }

    fn write_bit(&mut self, bit: bool) {
        if bit {
            self.curr_byte |= 0x80 >> self.bits_filled;
        }
        self.bits_filled += 1;
        if self.bits_filled == 8 {
            self.output.push(self.curr_byte);
            self.curr_byte = 0;
            self.bits_filled = 0;
        }
    }

    /// Writes the low `count` bits of `bits`, highest first.
    fn write_bits(&mut self, count: u8, bits: u64) {
        for i in (0..count).rev() {
            self.write_bit((bits >> i) & 1 != 0);
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.bits_filled > 0 {
            self.output.push(self.curr_byte);
        }
        self.output
    }
}

/// Builds a compressed layer buffer from a sequence of decoder steps.
pub(crate) struct LayerStreamBuilder {
    table: [u8; 1024],
    codes: MsbFirstWriter,
    literals: Vec<u8>,
}

impl LayerStreamBuilder {
    /// Starts a stream whose first emitted pixel is `first`.
    pub(crate) fn new(first: u8) -> Self {
        LayerStreamBuilder {
            table: [0; 1024],
            codes: MsbFirstWriter::new(),
            literals: vec![first],
        }
    }

    /// Sets the successor of `value` in table column `column`.
    pub(crate) fn successor(mut self, value: u8, column: usize, next: u8) -> Self {
        self.table[usize::from(value) * 4 + column] = next;
        self
    }

    /// Writes the prefix code that selects table column `column`. Column 2 is
    /// the column the default options use for code `101`.
    pub(crate) fn follow(mut self, column: usize) -> Self {
        let (count, bits) = match column {
            0 => (2, 0b00),
            1 => (3, 0b100),
            2 => (3, 0b101),
            3 => (3, 0b110),
            _ => panic!("There are only four table columns"),
        };
        self.codes.write_bits(count, bits);
        self
    }

    /// Writes the raw code bits `bits`, `count` wide.
    pub(crate) fn raw_code(mut self, count: u8, bits: u64) -> Self {
        self.codes.write_bits(count, bits);
        self
    }

    /// Ends the current chain and starts a new one at `value`.
    pub(crate) fn restart(mut self, value: u8) -> Self {
        self.codes.write_bits(3, 0b111);
        self.literals.push(value);
        self
    }

    /// Repeats the last emitted pixel `count` more times.
    pub(crate) fn run(mut self, count: u8) -> Self {
        assert_ne!(count, 0);
        self.codes.write_bits(2, 0b01);
        self.literals.push(count);
        self
    }

    /// A run marker that neither emits nor ends the stream.
    pub(crate) fn skip(mut self, marker: u8) -> Self {
        assert_ne!(marker, 0);
        self.codes.write_bits(2, 0b01);
        self.literals.extend_from_slice(&[0, marker]);
        self
    }

    pub(crate) fn end(mut self) -> Self {
        self.codes.write_bits(2, 0b01);
        self.literals.extend_from_slice(&[0, 0]);
        self
    }

    /// Drops the last `count` literals, to produce a truncated literal stream.
    pub(crate) fn truncate_literals(mut self, count: usize) -> Self {
        self.literals.truncate(self.literals.len() - count);
        self
    }

    pub(crate) fn build(self) -> Vec<u8> {
        let codes = self.codes.finish();
        let literal_offset = u32::try_from(1028 + codes.len()).unwrap();
        let mut data = self.table.to_vec();
        data.extend_from_slice(&literal_offset.to_le_bytes());
        data.extend_from_slice(&codes);
        data.extend_from_slice(&self.literals);
        data
    }
}

/// The bytes of a 40-byte room record with the given room number and layer
/// ids, and fixed values in the other fields.
pub(crate) fn room_record(room_number: u16, layers: &[u16]) -> Vec<u8> {
    assert!(layers.len() <= 4);
    let mut data = Vec::with_capacity(40);
    data.extend_from_slice(&room_number.to_le_bytes());
    data.push(0x02);
    data.push(0);
    data.extend_from_slice(&0x0001_2345u32.to_le_bytes());
    data.extend_from_slice(&(0x1000 + room_number).to_le_bytes());
    data.extend_from_slice(&u16::try_from(layers.len()).unwrap().to_le_bytes());
    for slot in 0..4 {
        let id = layers.get(slot).copied().unwrap_or(0);
        data.extend_from_slice(&id.to_le_bytes());
    }
    data.extend_from_slice(&0x00A0u16.to_le_bytes());
    data.extend_from_slice(&(-8i16).to_le_bytes());
    data.extend_from_slice(&327i16.to_le_bytes());
    data.push(1);
    data.push(3);
    data.extend_from_slice(&500u32.to_le_bytes());
    for bound in [0i16, 319, 136, 199] {
        data.extend_from_slice(&bound.to_le_bytes());
    }
    assert_eq!(data.len(), 40);
    data
}

/// A room data resource: an offset table terminated by 0xFFFF, followed by
/// the records in order.
pub(crate) fn room_table(records: &[Vec<u8>]) -> Vec<u8> {
    let mut offsets = Vec::new();
    let mut body = Vec::new();
    let table_len = (records.len() + 1) * 2;
    for record in records {
        let offset = u16::try_from(table_len + body.len()).unwrap();
        offsets.extend_from_slice(&offset.to_le_bytes());
        body.extend_from_slice(record);
    }
    offsets.extend_from_slice(&0xFFFFu16.to_le_bytes());
    offsets.extend_from_slice(&body);
    offsets
}
