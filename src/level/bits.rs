//! MSB-first bitstreams
//!
//! Coordinates are packed as 5-bit fields that run across byte boundaries.
//! Bit `n` of the stream is bit `7 - n % 8` of byte `n / 8`.

/// Width of one packed coordinate
pub const COORD_BITS: u32 = 5;

/// Reads fixed-width fields from a byte slice
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Start reading `bit_offset` bits into the slice
    pub fn with_offset(data: &'a [u8], bit_offset: usize) -> Self {
        Self {
            data,
            pos: bit_offset,
        }
    }

    /// Current bit position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bits left before the end of the slice
    pub fn remaining(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.pos)
    }

    /// Read `width` (≤ 16) bits, or `None` if the stream is exhausted
    pub fn read(&mut self, width: u32) -> Option<u16> {
        debug_assert!(width <= 16);
        if self.remaining() < width as usize {
            return None;
        }
        let mut value = 0u16;
        for _ in 0..width {
            let byte = self.data[self.pos / 8];
            let bit = (byte >> (7 - self.pos % 8)) & 1;
            value = (value << 1) | bit as u16;
            self.pos += 1;
        }
        Some(value)
    }

    /// Read one 5-bit coordinate
    pub fn coord(&mut self) -> Option<u8> {
        self.read(COORD_BITS).map(|v| v as u8)
    }
}

/// Appends fixed-width fields to a growing byte buffer
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    pos: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bits written so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Write the low `width` bits of `value`, most significant first
    pub fn write(&mut self, value: u16, width: u32) {
        debug_assert!(width <= 16);
        for i in (0..width).rev() {
            if self.pos % 8 == 0 {
                self.bytes.push(0);
            }
            let bit = ((value >> i) & 1) as u8;
            let last = self.bytes.len() - 1;
            self.bytes[last] |= bit << (7 - self.pos % 8);
            self.pos += 1;
        }
    }

    /// Write one 5-bit coordinate (higher bits are dropped)
    pub fn coord(&mut self, value: u8) {
        self.write(u16::from(value & 0x1f), COORD_BITS);
    }

    /// Finish the stream; the final byte is zero-padded
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
