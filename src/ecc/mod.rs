//! Hamming-style error-correcting code embedded in the column index field
//!
//! Every protected nonzero is viewed as a fixed-width [`Codeword`]. The low 24
//! bits of its column word hold the true column index; the 8 high bits are
//! reserved for protection metadata:
//!
//! ```text
//!  31 30 29 28 27 26 25 24 23 ........................ 0
//! [p1 p2 p3 p4 p5 p6 p7 op][        column index        ]
//! ```
//!
//! - `p1..p7`: Hamming group parities (SEC7, SEC8, SECDED). SED stores its
//!   single parity bit at bit 31 instead.
//! - `op`: overall parity of the whole codeword (SEC8, SECDED).
//!
//! All functions here are pure observers except [`Codeword::flip_bit`].

mod codeword;
mod layout;

pub use codeword::Codeword;
pub(crate) use codeword::{value_from_words, value_words};
pub use layout::{COO_LAYOUT, CSR_LAYOUT, CodewordLayout};

/// Number of low column bits that hold the column index under ECC
pub const INDEX_BITS: u32 = 24;

/// Mask selecting the column index out of an encoded column word
pub const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;

/// Number of Hamming groups (syndrome width)
pub const SYNDROME_BITS: u32 = 7;

/// Column bit holding the SEC8/SECDED overall parity
pub const OVERALL_PARITY_BIT: u32 = 24;

/// Column bit holding the SED parity
pub const SED_PARITY_BIT: u32 = 31;

/// Largest matrix dimension addressable while ECC bits occupy the column field
pub const MAX_DIMENSION: usize = (1 << INDEX_BITS) - 1;

/// 7-bit Hamming syndrome
///
/// Bit `p - 1` holds the recomputed parity of group `p`. Zero means no
/// detected single-bit error; otherwise the value is the Hamming position of
/// the flipped bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Syndrome(u8);

impl Syndrome {
    /// Create a syndrome from its 7 low bits
    #[inline]
    pub const fn new(bits: u8) -> Self {
        Self(bits & 0x7F)
    }

    /// Raw syndrome bits
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if no group parity failed
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Hamming position encoded by this syndrome
    #[inline]
    pub const fn position(self) -> u32 {
        self.0 as u32
    }

    /// The syndrome as stored in the column word (group `p` at bit `32 - p`)
    #[inline]
    pub const fn column_bits(self) -> u32 {
        (self.0 as u32).reverse_bits()
    }

    /// Read the stored group parities back out of a column word
    #[inline]
    pub const fn from_column(column: u32) -> Self {
        Self::new((column & !((1 << (INDEX_BITS + 1)) - 1)).reverse_bits() as u8)
    }
}

impl std::fmt::Display for Syndrome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// Parity of the whole codeword (1 if an odd number of bits are set)
///
/// The stored parity bit takes part in its own computation, so an encoded
/// codeword yields 0 and any single flip, including of the parity bit
/// itself, yields 1.
#[inline]
pub fn overall_parity(codeword: &Codeword) -> u32 {
    let [a, b, c, d] = *codeword.words();
    (a ^ b ^ c ^ d).count_ones() & 1
}

/// Recompute the 7 Hamming group parities of a codeword
///
/// On a freshly cleared column (no metadata bits) this produces the bits to
/// store; on an encoded codeword it produces the error syndrome.
#[inline]
pub fn compute_syndrome(codeword: &Codeword, layout: &CodewordLayout) -> Syndrome {
    let words = codeword.words();
    let mut syndrome = 0u8;
    for (group, masks) in layout.masks.iter().enumerate() {
        let folded = words
            .iter()
            .zip(masks)
            .fold(0u32, |acc, (word, mask)| acc ^ (word & mask));
        syndrome |= ((folded.count_ones() & 1) as u8) << group;
    }
    Syndrome(syndrome)
}

/// Map a nonzero syndrome to the codeword bit it names
///
/// Returns `None` for a zero syndrome and for Hamming positions that fall
/// outside the layout (which only a multi-bit error can produce).
#[inline]
pub fn locate_flipped_bit(syndrome: Syndrome, layout: &CodewordLayout) -> Option<u32> {
    if syndrome.is_zero() {
        return None;
    }
    layout.bit_at_position(syndrome.position())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Closed-form Hamming position -> data bit mapping
    fn closed_form(position: u32, layout: &CodewordLayout) -> u32 {
        if position.is_power_of_two() {
            return layout.group_parity_bit(position.trailing_zeros() + 1);
        }
        let data_bit = position - position.ilog2() - 2;
        if data_bit >= layout.reserved_start() {
            data_bit + 8
        } else {
            data_bit
        }
    }

    #[test]
    fn test_locate_matches_closed_form() {
        for position in 1..128u32 {
            let syndrome = Syndrome::new(position as u8);

            let expected = closed_form(position, &COO_LAYOUT);
            assert_eq!(locate_flipped_bit(syndrome, &COO_LAYOUT), Some(expected));

            let expected = closed_form(position, &CSR_LAYOUT);
            let located = locate_flipped_bit(syndrome, &CSR_LAYOUT);
            if expected < CSR_LAYOUT.width {
                assert_eq!(located, Some(expected), "CSR position {}", position);
            } else {
                assert_eq!(located, None, "CSR position {}", position);
            }
        }
        assert_eq!(locate_flipped_bit(Syndrome::default(), &COO_LAYOUT), None);
    }

    #[test]
    fn test_locate_reference_points() {
        // (layout, position, codeword bit)
        let table: &[(&CodewordLayout, u32, u32)] = &[
            (&COO_LAYOUT, 1, 31),
            (&COO_LAYOUT, 2, 30),
            (&COO_LAYOUT, 64, 25),
            (&COO_LAYOUT, 3, 0),
            (&COO_LAYOUT, 5, 1),
            (&COO_LAYOUT, 29, 23),
            (&COO_LAYOUT, 30, 32),
            (&COO_LAYOUT, 31, 33),
            (&COO_LAYOUT, 127, 127),
            (&CSR_LAYOUT, 1, 95),
            (&CSR_LAYOUT, 64, 89),
            (&CSR_LAYOUT, 3, 0),
            (&CSR_LAYOUT, 95, 87),
        ];
        for &(layout, position, bit) in table {
            assert_eq!(
                locate_flipped_bit(Syndrome::new(position as u8), layout),
                Some(bit),
                "{} position {}",
                layout.name,
                position
            );
        }
        assert_eq!(locate_flipped_bit(Syndrome::new(96), &CSR_LAYOUT), None);
        assert_eq!(locate_flipped_bit(Syndrome::new(127), &CSR_LAYOUT), None);
    }

    #[test]
    fn test_syndrome_column_round_trip() {
        let syndrome = Syndrome::new(0b1000001);
        let column = syndrome.column_bits() | 0x1234 | (1 << OVERALL_PARITY_BIT);
        assert_eq!(column & !INDEX_MASK, 0x8300_0000);
        assert_eq!(Syndrome::from_column(column), syndrome);
    }

    #[test]
    fn test_single_flip_yields_its_position() {
        let cases = [
            (
                &COO_LAYOUT,
                Codeword::from_words([0x0012_3456, 0x0000_0042, 0xDEAD_BEEF, 0x3FF0_0000]),
            ),
            (
                &CSR_LAYOUT,
                Codeword::from_words([0xDEAD_BEEF, 0x3FF0_0000, 0x0012_3456, 0]),
            ),
        ];
        for (layout, mut clean) in cases {
            let stored = compute_syndrome(&clean, layout).column_bits();
            *clean.column_mut(layout) |= stored;
            assert!(compute_syndrome(&clean, layout).is_zero());

            for bit in 0..layout.width {
                if bit == layout.overall_parity_bit() {
                    continue;
                }
                let mut corrupted = clean;
                corrupted.flip_bit(bit);
                let syndrome = compute_syndrome(&corrupted, layout);
                assert_eq!(
                    locate_flipped_bit(syndrome, layout),
                    Some(bit),
                    "{} bit {}",
                    layout.name,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_overall_parity() {
        let mut cw = Codeword::from_words([0b101, 0, 0, 0]);
        assert_eq!(overall_parity(&cw), 0);
        cw.flip_bit(100);
        assert_eq!(overall_parity(&cw), 1);
    }
}
