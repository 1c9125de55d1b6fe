//! Bit-level reading over byte slices.

pub trait BitReader {
    /// Reads the next bit, or `None` once the input is exhausted.
    fn read_bit(&mut self) -> Option<bool>;

    /// Reads `count` bits, with the first bit read ending up as the most
    /// significant of the result. Only the last 64 bits read are kept.
    fn read_bits(&mut self, count: u32) -> Option<u64> {
        let mut value = 0u64;
        for _ in 0..count {
            value = (value << 1) | u64::from(self.read_bit()?);
        }
        Some(value)
    }
}

/// Reads bits from each byte starting at the most significant bit.
#[derive(Debug, Clone)]
pub struct MsbFirstReader<'a> {
    data: &'a [u8],
    next_byte: usize,
    curr_byte: u8,
    bits_left: u8,
}

impl<'a> MsbFirstReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            next_byte: 0,
            curr_byte: 0,
            bits_left: 0,
        }
    }

    /// The offset of the next byte that will be loaded from the input.
    #[must_use]
    pub fn byte_position(&self) -> usize {
        self.next_byte
    }
}

impl BitReader for MsbFirstReader<'_> {
    fn read_bit(&mut self) -> Option<bool> {
        if self.bits_left == 0 {
            self.curr_byte = *self.data.get(self.next_byte)?;
            self.next_byte += 1;
            self.bits_left = 8;
        }
        let next_bit = self.curr_byte & 0x80 != 0;
        self.bits_left -= 1;
        self.curr_byte <<= 1;
        Some(next_bit)
    }
}
