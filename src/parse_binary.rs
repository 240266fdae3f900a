use bitvec::prelude::*;

/// Reads `count` bits (at most 32) starting at bit `start`, most significant
/// bit first
pub(crate) fn read_bits_at(bits: &BitSlice<u8, Msb0>, start: usize, count: u32) -> Option<u32> {
    debug_assert!(count <= 32);

    let end = start.checked_add(count as usize)?;
    let field = bits.get(start..end)?;

    Some(
        field
            .iter()
            .by_vals()
            .fold(0, |acc, bit| (acc << 1) | u32::from(bit)),
    )
}

/// Sequential reader over a packed bit stream
pub(crate) struct BitReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    cursor: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            bits: BitSlice::from_slice(buffer),
            cursor: 0,
        }
    }

    pub fn bits_left(&self) -> usize {
        self.bits.len().saturating_sub(self.cursor)
    }

    pub fn is_eof(&self) -> bool {
        self.bits_left() == 0
    }

    /// Returns `None`, without moving the cursor, if fewer than `count` bits remain
    pub fn read(&mut self, count: u32) -> Option<u32> {
        let value = read_bits_at(self.bits, self.cursor, count)?;
        self.cursor += count as usize;
        Some(value)
    }

    /// Skip to the start of the next byte
    pub fn byte_align(&mut self) {
        self.cursor = self.cursor.next_multiple_of(8).min(self.bits.len());
    }
}
