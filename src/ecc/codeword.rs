//! Fixed-width codeword view of a matrix element

use super::layout::CodewordLayout;

/// Up to 128 bits of a matrix element, viewed as four 32-bit words.
///
/// Bit `b` of the codeword is bit `b % 32` of word `b / 32`. Narrower layouts
/// (the 96-bit CSR codeword) leave the trailing word zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Codeword {
    words: [u32; 4],
}

impl Codeword {
    /// Create a codeword from its raw words
    #[inline]
    pub const fn from_words(words: [u32; 4]) -> Self {
        Self { words }
    }

    /// Returns the raw words
    #[inline]
    pub const fn words(&self) -> &[u32; 4] {
        &self.words
    }

    /// Returns the column word of `layout` (index plus reserved metadata bits)
    #[inline]
    pub fn column(&self, layout: &CodewordLayout) -> u32 {
        self.words[layout.column_word]
    }

    /// Mutable access to the column word of `layout`
    #[inline]
    pub fn column_mut(&mut self, layout: &CodewordLayout) -> &mut u32 {
        &mut self.words[layout.column_word]
    }

    /// Toggle exactly one bit in place
    #[inline]
    pub fn flip_bit(&mut self, bit: u32) {
        debug_assert!(bit < 128);
        self.words[(bit / 32) as usize] ^= 1 << (bit % 32);
    }
}

/// Split an `f64` into its low and high 32-bit words
#[inline]
pub(crate) fn value_words(value: f64) -> (u32, u32) {
    let bits = value.to_bits();
    (bits as u32, (bits >> 32) as u32)
}

/// Reassemble an `f64` from its low and high 32-bit words
#[inline]
pub(crate) fn value_from_words(lo: u32, hi: u32) -> f64 {
    f64::from_bits(((hi as u64) << 32) | lo as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_bit_touches_one_word() {
        let mut cw = Codeword::default();
        cw.flip_bit(0);
        cw.flip_bit(33);
        cw.flip_bit(127);
        assert_eq!(cw.words(), &[1, 2, 0, 0x8000_0000]);

        cw.flip_bit(33);
        assert_eq!(cw.words(), &[1, 0, 0, 0x8000_0000]);
    }

    #[test]
    fn test_value_words_preserve_bits() {
        for value in [0.0, -0.0, 1.5, f64::MIN_POSITIVE, -1234.5e300] {
            let (lo, hi) = value_words(value);
            assert_eq!(value_from_words(lo, hi).to_bits(), value.to_bits());
        }
        let (lo, hi) = value_words(1.0);
        assert_eq!((lo, hi), (0, 0x3FF0_0000));
    }
}
