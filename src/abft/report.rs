//! Observable outcomes of a protected multiply

use thiserror::Error;

use crate::ecc::Syndrome;

/// Why a nonzero could not be repaired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UncorrectableFault {
    /// SED parity check failed; SED detects but never corrects
    #[error("parity error detected")]
    ParityMismatch,

    /// Overall parity is even but the syndrome is not: two bits flipped
    #[error("double-bit error detected (syndrome {syndrome})")]
    DoubleBit {
        /// Recomputed syndrome
        syndrome: Syndrome,
    },

    /// The syndrome names a Hamming position outside the codeword
    #[error("syndrome {syndrome} does not name a codeword bit")]
    UnlocatableSyndrome {
        /// Recomputed syndrome
        syndrome: Syndrome,
    },
}

/// One single-bit repair performed during SpMV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Correction {
    /// Position of the element in nonzero order
    pub index: usize,
    /// Codeword bit that was flipped back
    pub bit: u32,
}

/// Corrections made by one SpMV call
///
/// Corrections are transparent to the numeric result; the report exists so
/// callers and tests can observe them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpmvReport {
    /// Repairs in the order they were made (row order for parallel CSR)
    pub corrections: Vec<Correction>,
}

impl SpmvReport {
    /// Returns true if no element needed repair
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.corrections.is_empty()
    }

    /// Number of repaired bits
    #[inline]
    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    /// Returns true if the report holds no corrections
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }
}
