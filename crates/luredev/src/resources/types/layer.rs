//! Decompression of background layer bitmaps.
//!
//! A compressed layer holds three streams:
//!
//! - A chain table of 256 rows with 4 successor bytes each, in bytes
//!   `[0, 1024)`. Row `n` lists the values likely to follow value `n`.
//! - A u32 LE offset at 1024, pointing at a stream of literal bytes.
//! - A stream of prefix codes, read MSB first from byte 1028 on.
//!
//! Each code either follows the chain from the last emitted value, repeats
//! the last emitted value, or restarts from a new literal.

use std::slice::ChunksExact;

use crate::{
    Error,
    errors::{FormatError, FormatErrorKind, ReuseError},
    utils::{
        bits::{BitReader, MsbFirstReader},
        mem_reader::{MemReader, SliceMemReader},
    },
};

/// Width of the screen, and so of every layer bitmap.
pub const SCREEN_WIDTH: usize = 320;

/// Default cap on decoded output: four full screens.
pub const DEFAULT_OUTPUT_LIMIT: usize = SCREEN_WIDTH * 200 * 4;

const CHAIN_TABLE_SIZE: usize = 1024;
const CODE_STREAM_START: usize = CHAIN_TABLE_SIZE + 4;

/// The chain table column selected by the `101` code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SuccessorSlot {
    /// Column 2, so each chain code selects a different column.
    #[default]
    Third,
    /// Column 3, the same column as the `110` code.
    Fourth,
}

impl SuccessorSlot {
    fn column(self) -> usize {
        match self {
            SuccessorSlot::Third => 2,
            SuccessorSlot::Fourth => 3,
        }
    }
}

/// What to do when the literal stream runs out before decoding ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LiteralExhaustion {
    #[default]
    Fail,
    /// Treat every missing literal as 0.
    ZeroPad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerDecodeOptions {
    successor_slot: SuccessorSlot,
    literal_exhaustion: LiteralExhaustion,
    output_limit: usize,
}

impl LayerDecodeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_successor_slot(mut self, successor_slot: SuccessorSlot) -> Self {
        self.successor_slot = successor_slot;
        self
    }

    #[must_use]
    pub fn with_literal_exhaustion(mut self, literal_exhaustion: LiteralExhaustion) -> Self {
        self.literal_exhaustion = literal_exhaustion;
        self
    }

    /// Sets the largest number of bytes a decode may produce.
    #[must_use]
    pub fn with_output_limit(mut self, output_limit: usize) -> Self {
        self.output_limit = output_limit;
        self
    }

    #[must_use]
    pub fn successor_slot(&self) -> SuccessorSlot {
        self.successor_slot
    }

    #[must_use]
    pub fn literal_exhaustion(&self) -> LiteralExhaustion {
        self.literal_exhaustion
    }

    #[must_use]
    pub fn output_limit(&self) -> usize {
        self.output_limit
    }
}

impl Default for LayerDecodeOptions {
    fn default() -> Self {
        Self {
            successor_slot: SuccessorSlot::default(),
            literal_exhaustion: LiteralExhaustion::default(),
            output_limit: DEFAULT_OUTPUT_LIMIT,
        }
    }
}

/// A decoded layer: one palette index per pixel, in rows of
/// [`SCREEN_WIDTH`] pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerBitmap {
    width: usize,
    pixels: Vec<u8>,
}

impl LayerBitmap {
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.pixels.len() / self.width
    }

    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[must_use]
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    pub fn rows(&self) -> ChunksExact<'_, u8> {
        self.pixels.chunks_exact(self.width)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LayerDecodeError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Reuse(#[from] ReuseError),
}

impl From<LayerDecodeError> for Error {
    fn from(err: LayerDecodeError) -> Self {
        match err {
            LayerDecodeError::Format(err) => Error::Format(err),
            LayerDecodeError::Reuse(err) => Error::Reuse(err),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    Fresh,
    Consumed,
}

/// A single-use layer decoder. Create one per layer.
#[derive(Debug)]
pub struct LayerDecoder {
    options: LayerDecodeOptions,
    state: DecoderState,
}

impl LayerDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(LayerDecodeOptions::default())
    }

    #[must_use]
    pub fn with_options(options: LayerDecodeOptions) -> Self {
        Self {
            options,
            state: DecoderState::Fresh,
        }
    }

    #[must_use]
    pub fn options(&self) -> &LayerDecodeOptions {
        &self.options
    }

    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.state == DecoderState::Consumed
    }

    /// Decodes `data`. The decoder is used up by the first call, whether or
    /// not it succeeds, and every later call fails with [`ReuseError`].
    pub fn decode(&mut self, data: &[u8]) -> Result<LayerBitmap, LayerDecodeError> {
        if self.state == DecoderState::Consumed {
            return Err(ReuseError.into());
        }
        self.state = DecoderState::Consumed;
        Ok(decode_layer(data, &self.options)?)
    }
}

impl Default for LayerDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes one compressed layer with the given options.
pub fn decode_layer(data: &[u8], options: &LayerDecodeOptions) -> Result<LayerBitmap, FormatError> {
    let mut reader = SliceMemReader::new(data);
    let table: [u8; CHAIN_TABLE_SIZE] = reader.read_array()?;
    let literal_offset = reader.read_u32_le()?;
    let literal_start = usize::try_from(literal_offset)
        .ok()
        .filter(|&offset| offset <= data.len())
        .ok_or_else(|| {
            FormatError::new(
                CHAIN_TABLE_SIZE as u64,
                FormatErrorKind::LiteralOffsetOutOfRange {
                    offset: literal_offset,
                    len: data.len(),
                },
            )
        })?;

    let mut stream = LayerStream {
        table: &table,
        data,
        codes: MsbFirstReader::new(&data[CODE_STREAM_START..]),
        literal_position: literal_start,
        output: Vec::new(),
        options,
    };
    stream.run()?;
    let pixels = stream.output;
    log::trace!(
        "Decoded layer of {} bytes into {} pixels",
        data.len(),
        pixels.len()
    );

    if pixels.is_empty() || pixels.len() % SCREEN_WIDTH != 0 {
        return Err(FormatError::new(
            0,
            FormatErrorKind::PartialRow {
                len: pixels.len(),
                width: SCREEN_WIDTH,
            },
        ));
    }
    Ok(LayerBitmap {
        width: SCREEN_WIDTH,
        pixels,
    })
}

/// What the next prefix code asks for.
enum Code {
    /// Follow the chain through the given table column.
    Follow(usize),
    /// Repeat the last value, or end the stream.
    Run,
    /// Start a new chain from the next literal.
    Restart,
}

struct LayerStream<'a> {
    table: &'a [u8; CHAIN_TABLE_SIZE],
    data: &'a [u8],
    codes: MsbFirstReader<'a>,
    literal_position: usize,
    output: Vec<u8>,
    options: &'a LayerDecodeOptions,
}

impl LayerStream<'_> {
    fn code_position(&self) -> u64 {
        (CODE_STREAM_START + self.codes.byte_position()) as u64
    }

    fn next_bit(&mut self) -> Result<bool, FormatError> {
        self.codes.read_bit().ok_or_else(|| {
            FormatError::new(self.code_position(), FormatErrorKind::CodeStreamExhausted)
        })
    }

    fn next_bits(&mut self, count: u32) -> Result<u64, FormatError> {
        self.codes.read_bits(count).ok_or_else(|| {
            FormatError::new(self.code_position(), FormatErrorKind::CodeStreamExhausted)
        })
    }

    fn next_code(&mut self) -> Result<Code, FormatError> {
        let code = if self.next_bit()? {
            match self.next_bits(2)? {
                0b00 => Code::Follow(1),
                0b01 => Code::Follow(self.options.successor_slot.column()),
                0b10 => Code::Follow(3),
                _ => Code::Restart,
            }
        } else if self.next_bit()? {
            Code::Run
        } else {
            Code::Follow(0)
        };
        Ok(code)
    }

    fn next_literal(&mut self) -> Result<u8, FormatError> {
        if let Some(&value) = self.data.get(self.literal_position) {
            self.literal_position += 1;
            return Ok(value);
        }
        match self.options.literal_exhaustion {
            LiteralExhaustion::Fail => Err(FormatError::new(
                self.literal_position as u64,
                FormatErrorKind::LiteralStreamExhausted,
            )),
            LiteralExhaustion::ZeroPad => Ok(0),
        }
    }

    fn emit(&mut self, value: u8, count: usize) -> Result<(), FormatError> {
        let limit = self.options.output_limit;
        if self.output.len() + count > limit {
            return Err(FormatError::new(
                self.code_position(),
                FormatErrorKind::OutputLimitExceeded { limit },
            ));
        }
        self.output.resize(self.output.len() + count, value);
        Ok(())
    }

    fn run(&mut self) -> Result<(), FormatError> {
        loop {
            let mut value = self.next_literal()?;
            self.emit(value, 1)?;
            loop {
                match self.next_code()? {
                    Code::Follow(column) => {
                        value = self.table[usize::from(value) * 4 + column];
                        self.emit(value, 1)?;
                    }
                    Code::Run => match self.next_literal()? {
                        0 => {
                            if self.next_literal()? == 0 {
                                return Ok(());
                            }
                        }
                        count => self.emit(value, usize::from(count))?,
                    },
                    Code::Restart => break,
                }
            }
        }
    }
}
