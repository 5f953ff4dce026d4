//! Fault injection for exercising the protected kernels
//!
//! A fault flips bits of one stored nonzero without re-running the encode
//! pass, so the next SpMV sees it exactly like a real memory upset.

use std::ops::Range;
use std::str::FromStr;

use rand::Rng;

use crate::error::{Error, Result};
use crate::sparse::SparseFormat;

/// Region of a codeword targeted by injected bit flips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitFlipRegion {
    /// Anywhere in the codeword
    #[default]
    Any,
    /// Index fields only (column, and row for COO)
    Index,
    /// Floating-point value only
    Value,
}

impl BitFlipRegion {
    /// Codeword bits covered by this region for the given storage format
    pub fn bit_range(&self, format: SparseFormat) -> Range<u32> {
        match (format, self) {
            (SparseFormat::Coo, BitFlipRegion::Any) => 0..128,
            (SparseFormat::Coo, BitFlipRegion::Index) => 0..64,
            (SparseFormat::Coo, BitFlipRegion::Value) => 64..128,
            (SparseFormat::Csr, BitFlipRegion::Any) => 0..96,
            (SparseFormat::Csr, BitFlipRegion::Index) => 64..96,
            (SparseFormat::Csr, BitFlipRegion::Value) => 0..64,
        }
    }
}

impl std::fmt::Display for BitFlipRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BitFlipRegion::Any => write!(f, "ANY"),
            BitFlipRegion::Index => write!(f, "INDEX"),
            BitFlipRegion::Value => write!(f, "VALUE"),
        }
    }
}

impl FromStr for BitFlipRegion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ANY" => Ok(BitFlipRegion::Any),
            "INDEX" => Ok(BitFlipRegion::Index),
            "VALUE" => Ok(BitFlipRegion::Value),
            _ => Err(Error::invalid_argument(
                "region",
                format!("expected ANY, INDEX or VALUE, got '{s}'"),
            )),
        }
    }
}

/// A single injected bit flip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InjectedFlip {
    /// Position of the corrupted element in nonzero order
    pub index: usize,
    /// Codeword bit that was flipped
    pub bit: u32,
}

/// Choose one element and `count` bit positions inside `region`
///
/// The same bit may be drawn more than once, in which case the flips cancel.
pub(crate) fn plan_bitflips<R: Rng + ?Sized>(
    rng: &mut R,
    format: SparseFormat,
    nnz: usize,
    region: BitFlipRegion,
    count: usize,
) -> Result<Vec<InjectedFlip>> {
    if count == 0 {
        return Err(Error::invalid_argument("count", "must be at least 1"));
    }
    if nnz == 0 {
        return Err(Error::invalid_argument(
            "matrix",
            "cannot inject into a matrix with no non-zeros",
        ));
    }

    let index = rng.random_range(0..nnz);
    let bits = region.bit_range(format);
    Ok((0..count)
        .map(|_| InjectedFlip {
            index,
            bit: rng.random_range(bits.clone()),
        })
        .collect())
}
