//! Codeword layouts: parity-check matrices and syndrome lookup tables
//!
//! The 7 Hamming groups cover every data bit of the codeword except the 8
//! reserved high bits of the column word. Data bits are numbered in codeword
//! order (skipping the reserved bits) and assigned the non-power-of-two
//! Hamming positions 3, 5, 6, 7, 9, ...; group `p` covers every data bit whose
//! position has bit `p - 1` set, plus its own stored parity bit at column bit
//! `32 - p`. Column bit 24 (overall parity) belongs to no group.

use super::{INDEX_BITS, OVERALL_PARITY_BIT, SYNDROME_BITS};

/// Marker for a Hamming position that names no bit of the codeword
const NO_BIT: u8 = u8::MAX;

/// Bit-level layout of one protected codeword format
#[derive(Debug)]
pub struct CodewordLayout {
    /// Human-readable layout name
    pub name: &'static str,
    /// Number of meaningful bits in the codeword
    pub width: u32,
    /// Word holding the column index and the reserved metadata bits
    pub column_word: usize,
    /// Parity-check masks: `masks[p - 1][w]` selects the bits of word `w` in group `p`
    pub masks: [[u32; 4]; SYNDROME_BITS as usize],
    positions: [u8; 128],
}

impl CodewordLayout {
    const fn new(
        name: &'static str,
        width: u32,
        column_word: usize,
        masks: [[u32; 4]; SYNDROME_BITS as usize],
    ) -> Self {
        Self {
            name,
            width,
            column_word,
            masks,
            positions: hamming_positions(width, column_word),
        }
    }

    /// First reserved bit of the column word, in codeword bit numbering
    #[inline]
    pub const fn reserved_start(&self) -> u32 {
        self.column_word as u32 * 32 + INDEX_BITS
    }

    /// Returns true if `bit` is one of the 8 reserved column bits
    #[inline]
    pub const fn is_reserved(&self, bit: u32) -> bool {
        bit >= self.reserved_start() && bit < self.reserved_start() + 8
    }

    /// Codeword bit holding the SEC8/SECDED overall parity
    #[inline]
    pub const fn overall_parity_bit(&self) -> u32 {
        self.column_word as u32 * 32 + OVERALL_PARITY_BIT
    }

    /// Codeword bit holding the stored parity of Hamming group `group` (1..=7)
    #[inline]
    pub const fn group_parity_bit(&self, group: u32) -> u32 {
        self.column_word as u32 * 32 + 32 - group
    }

    /// Codeword bit named by a Hamming position, if any
    #[inline]
    pub fn bit_at_position(&self, position: u32) -> Option<u32> {
        match self.positions.get(position as usize) {
            Some(&bit) if bit != NO_BIT => Some(bit as u32),
            _ => None,
        }
    }
}

/// Build the Hamming position -> codeword bit table for a layout
const fn hamming_positions(width: u32, column_word: usize) -> [u8; 128] {
    let mut table = [NO_BIT; 128];
    let reserved_start = column_word as u32 * 32 + INDEX_BITS;

    let mut position: u32 = 3;
    let mut bit: u32 = 0;
    while bit < width {
        if bit >= reserved_start && bit < reserved_start + 8 {
            bit += 1;
            continue;
        }
        if position.is_power_of_two() {
            position += 1;
        }
        table[position as usize] = bit as u8;
        position += 1;
        bit += 1;
    }

    let mut group = 1;
    while group <= SYNDROME_BITS {
        table[1 << (group - 1)] = (column_word as u32 * 32 + 32 - group) as u8;
        group += 1;
    }
    table
}

/// 128-bit COO element: `[col, row, value_lo, value_hi]`
pub static COO_LAYOUT: CodewordLayout = CodewordLayout::new(
    "COO",
    128,
    0,
    [
        [0x80AAAD5B, 0x55555556, 0xAAAAAAAB, 0xAAAAAAAA],
        [0x4033366D, 0x9999999B, 0xCCCCCCCD, 0xCCCCCCCC],
        [0x20C3C78E, 0xE1E1E1E3, 0xF0F0F0F1, 0xF0F0F0F0],
        [0x10FC07F0, 0xFE01FE03, 0xFF00FF01, 0xFF00FF00],
        [0x08FFF800, 0xFFFE0003, 0xFFFF0001, 0xFFFF0000],
        [0x04000000, 0xFFFFFFFC, 0x00000001, 0xFFFFFFFF],
        [0x02000000, 0x00000000, 0xFFFFFFFE, 0xFFFFFFFF],
    ],
);

/// 96-bit CSR nonzero: `[value_lo, value_hi, col]`
pub static CSR_LAYOUT: CodewordLayout = CodewordLayout::new(
    "CSR",
    96,
    2,
    [
        [0x56AAAD5B, 0xAB555555, 0x80AAAAAA, 0],
        [0x9B33366D, 0xCD999999, 0x40CCCCCC, 0],
        [0xE3C3C78E, 0xF1E1E1E1, 0x20F0F0F0, 0],
        [0x03FC07F0, 0x01FE01FE, 0x10FF00FF, 0],
        [0x03FFF800, 0x01FFFE00, 0x08FFFF00, 0],
        [0xFC000000, 0x01FFFFFF, 0x04000000, 0],
        [0x00000000, 0xFE000000, 0x02FFFFFF, 0],
    ],
);
