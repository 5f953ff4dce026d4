//! Per-mode encode and decode functions
//!
//! Each [`ProtectionMode`] maps to one [`ModeKernel`] entry: a pair of pure
//! functions over a [`Codeword`] plus the column mask applied after the
//! check. The SpMV kernels look the entry up once per call and run it on
//! every nonzero.

use crate::ecc::{
    self, Codeword, CodewordLayout, INDEX_MASK, OVERALL_PARITY_BIT, SED_PARITY_BIT,
};

use super::mode::ProtectionMode;
use super::report::UncorrectableFault;

/// Outcome of checking one nonzero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    /// No error detected
    Clean,
    /// A single flipped bit was repaired in the codeword
    Corrected {
        /// Codeword bit that was flipped back
        bit: u32,
    },
}

/// Writes the mode's metadata bits into a codeword whose reserved bits are clear
pub type EncodeFn = fn(&mut Codeword, &CodewordLayout);

/// Checks a codeword, repairing it in place when the mode allows
pub type DecodeFn = fn(&mut Codeword, &CodewordLayout) -> Result<ElementState, UncorrectableFault>;

/// Encode/decode table entry for one protection mode
#[derive(Debug)]
pub struct ModeKernel {
    /// Encode pass run once at construction
    pub encode: EncodeFn,
    /// Check run on every nonzero during SpMV
    pub decode: DecodeFn,
    /// Mask applied to the column word before it is used as an index
    pub column_mask: u32,
    /// Whether indices are checked against bounds and ordering
    pub check_constraints: bool,
}

static KERNELS: [ModeKernel; 6] = [
    // None
    ModeKernel {
        encode: encode_nothing,
        decode: decode_nothing,
        column_mask: u32::MAX,
        check_constraints: false,
    },
    // Constraints
    ModeKernel {
        encode: encode_nothing,
        decode: decode_nothing,
        column_mask: u32::MAX,
        check_constraints: true,
    },
    // Sed
    ModeKernel {
        encode: encode_sed,
        decode: decode_sed,
        column_mask: INDEX_MASK,
        check_constraints: false,
    },
    // Sec7
    ModeKernel {
        encode: encode_sec7,
        decode: decode_sec7,
        column_mask: INDEX_MASK,
        check_constraints: false,
    },
    // Sec8
    ModeKernel {
        encode: encode_secded,
        decode: decode_secded,
        column_mask: INDEX_MASK,
        check_constraints: false,
    },
    // Secded
    ModeKernel {
        encode: encode_secded,
        decode: decode_secded,
        column_mask: INDEX_MASK,
        check_constraints: false,
    },
];

impl ProtectionMode {
    /// Encode/decode table entry for this mode
    #[inline]
    pub fn kernel(self) -> &'static ModeKernel {
        &KERNELS[self as usize]
    }
}

fn encode_nothing(_: &mut Codeword, _: &CodewordLayout) {}

fn decode_nothing(_: &mut Codeword, _: &CodewordLayout) -> Result<ElementState, UncorrectableFault> {
    Ok(ElementState::Clean)
}

fn encode_sed(codeword: &mut Codeword, layout: &CodewordLayout) {
    let parity = ecc::overall_parity(codeword);
    *codeword.column_mut(layout) |= parity << SED_PARITY_BIT;
}

fn decode_sed(
    codeword: &mut Codeword,
    _layout: &CodewordLayout,
) -> Result<ElementState, UncorrectableFault> {
    if ecc::overall_parity(codeword) != 0 {
        return Err(UncorrectableFault::ParityMismatch);
    }
    Ok(ElementState::Clean)
}

fn encode_sec7(codeword: &mut Codeword, layout: &CodewordLayout) {
    let syndrome = ecc::compute_syndrome(codeword, layout);
    *codeword.column_mut(layout) |= syndrome.column_bits();
}

fn decode_sec7(
    codeword: &mut Codeword,
    layout: &CodewordLayout,
) -> Result<ElementState, UncorrectableFault> {
    let syndrome = ecc::compute_syndrome(codeword, layout);
    if syndrome.is_zero() {
        return Ok(ElementState::Clean);
    }
    correct(codeword, layout, syndrome)
}

fn encode_secded(codeword: &mut Codeword, layout: &CodewordLayout) {
    encode_sec7(codeword, layout);
    let parity = ecc::overall_parity(codeword);
    *codeword.column_mut(layout) |= parity << OVERALL_PARITY_BIT;
}

fn decode_secded(
    codeword: &mut Codeword,
    layout: &CodewordLayout,
) -> Result<ElementState, UncorrectableFault> {
    let parity = ecc::overall_parity(codeword);
    let syndrome = ecc::compute_syndrome(codeword, layout);
    match (parity, syndrome.is_zero()) {
        (0, true) => Ok(ElementState::Clean),
        (0, false) => Err(UncorrectableFault::DoubleBit { syndrome }),
        // Only the overall parity bit itself is wrong
        (_, true) => {
            let bit = layout.overall_parity_bit();
            codeword.flip_bit(bit);
            Ok(ElementState::Corrected { bit })
        }
        (_, false) => correct(codeword, layout, syndrome),
    }
}

fn correct(
    codeword: &mut Codeword,
    layout: &CodewordLayout,
    syndrome: ecc::Syndrome,
) -> Result<ElementState, UncorrectableFault> {
    let bit = ecc::locate_flipped_bit(syndrome, layout)
        .ok_or(UncorrectableFault::UnlocatableSyndrome { syndrome })?;
    codeword.flip_bit(bit);
    Ok(ElementState::Corrected { bit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecc::{COO_LAYOUT, CSR_LAYOUT};

    fn encoded(mode: ProtectionMode, layout: &CodewordLayout) -> Codeword {
        let mut words = [0u32; 4];
        words[layout.column_word] = 0x0000_0ABC;
        words[(layout.column_word + 1) % 3] = 0x4005_BF0A;
        words[(layout.column_word + 2) % 3] = 0x8B14_5769;
        let mut cw = Codeword::from_words(words);
        (mode.kernel().encode)(&mut cw, layout);
        cw
    }

    #[test]
    fn test_table_order_matches_modes() {
        assert_eq!(ProtectionMode::None.kernel().column_mask, u32::MAX);
        assert_eq!(ProtectionMode::Constraints.kernel().column_mask, u32::MAX);
        assert!(ProtectionMode::Constraints.kernel().check_constraints);
        for mode in [
            ProtectionMode::Sed,
            ProtectionMode::Sec7,
            ProtectionMode::Sec8,
            ProtectionMode::Secded,
        ] {
            assert_eq!(mode.kernel().column_mask, INDEX_MASK);
        }
    }

    #[test]
    fn test_encode_then_decode_is_clean() {
        for layout in [&COO_LAYOUT, &CSR_LAYOUT] {
            for mode in ProtectionMode::ALL {
                let mut cw = encoded(mode, layout);
                let before = cw;
                assert_eq!((mode.kernel().decode)(&mut cw, layout), Ok(ElementState::Clean));
                assert_eq!(cw, before);
                assert_eq!(cw.column(layout) & INDEX_MASK, 0x0000_0ABC);
            }
        }
    }

    #[test]
    fn test_sed_detects_single_flip() {
        let clean = encoded(ProtectionMode::Sed, &COO_LAYOUT);
        for bit in [0, 23, 31, 40, 127] {
            let mut cw = clean;
            cw.flip_bit(bit);
            assert_eq!(
                decode_sed(&mut cw, &COO_LAYOUT),
                Err(UncorrectableFault::ParityMismatch)
            );
        }
    }

    #[test]
    fn test_secded_repairs_overall_parity_bit() {
        let clean = encoded(ProtectionMode::Secded, &CSR_LAYOUT);
        let mut cw = clean;
        cw.flip_bit(CSR_LAYOUT.overall_parity_bit());
        assert_eq!(
            decode_secded(&mut cw, &CSR_LAYOUT),
            Ok(ElementState::Corrected { bit: 88 })
        );
        assert_eq!(cw, clean);
    }

    #[test]
    fn test_secded_flags_double_flip() {
        let clean = encoded(ProtectionMode::Secded, &COO_LAYOUT);
        let mut cw = clean;
        cw.flip_bit(3);
        cw.flip_bit(70);
        assert!(matches!(
            decode_secded(&mut cw, &COO_LAYOUT),
            Err(UncorrectableFault::DoubleBit { .. })
        ));
    }

    #[test]
    fn test_sec8_aborts_on_double_flip() {
        let mut cw = encoded(ProtectionMode::Sec8, &CSR_LAYOUT);
        cw.flip_bit(3);
        cw.flip_bit(70);
        assert!(matches!(
            (ProtectionMode::Sec8.kernel().decode)(&mut cw, &CSR_LAYOUT),
            Err(UncorrectableFault::DoubleBit { .. })
        ));
    }

    #[test]
    fn test_sec7_rejects_syndrome_outside_layout() {
        // Position 96 names no bit of the 96-bit CSR codeword
        let mut cw = Codeword::default();
        let syndrome = ecc::Syndrome::new(96);
        assert_eq!(
            correct(&mut cw, &CSR_LAYOUT, syndrome),
            Err(UncorrectableFault::UnlocatableSyndrome { syndrome })
        );
        assert_eq!(cw, Codeword::default());
    }
}
