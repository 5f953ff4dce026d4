//! Core COO implementation: element, struct, creation, getters

use rand::Rng;

use crate::abft::{self, BitFlipRegion, InjectedFlip, ProtectionMode};
use crate::ecc::{Codeword, value_from_words, value_words};
use crate::error::{Error, Result};

use super::super::format::{SparseFormat, SparseStorage};
use super::super::validate::validate_triplets;

/// One COO nonzero as stored, including any ECC bits in `col`
///
/// Codeword layout: `[col, row, value_lo, value_hi]` (128 bits).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CooElement {
    /// Column index; high 8 bits hold ECC metadata under ECC modes
    pub col: u32,
    /// Row index
    pub row: u32,
    /// Nonzero value
    pub value: f64,
}

impl CooElement {
    /// View this element as a codeword
    #[inline]
    pub fn codeword(&self) -> Codeword {
        let (lo, hi) = value_words(self.value);
        Codeword::from_words([self.col, self.row, lo, hi])
    }

    /// Rebuild an element from its codeword
    #[inline]
    pub fn from_codeword(codeword: &Codeword) -> Self {
        let [col, row, lo, hi] = *codeword.words();
        Self {
            col,
            row,
            value: value_from_words(lo, hi),
        }
    }
}

/// COO (Coordinate) sparse matrix with per-element protection
#[derive(Debug, Clone)]
pub struct CooMatrix {
    pub(crate) n: usize,
    pub(crate) mode: ProtectionMode,
    pub(crate) elements: Vec<CooElement>,
}

impl CooMatrix {
    /// Create a protected COO matrix from triplet arrays
    ///
    /// Elements are stored in the order given and then encoded for `mode`.
    ///
    /// # Arguments
    ///
    /// * `columns` - Column index of each nonzero
    /// * `rows` - Row index of each nonzero
    /// * `values` - Value of each nonzero
    /// * `n` - Matrix dimension
    /// * `mode` - Protection mode
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - the three arrays have different lengths
    /// - an index is `>= n`
    /// - `n` does not fit the column field under an ECC mode
    /// - `mode` is `Constraints` and the elements are not sorted by `(row, col)`
    pub fn new(
        columns: &[u32],
        rows: &[u32],
        values: &[f64],
        n: usize,
        mode: ProtectionMode,
    ) -> Result<Self> {
        validate_triplets(columns, rows, values, n, mode)?;

        let encode = mode.kernel().encode;
        let layout = SparseFormat::Coo.layout();
        let elements: Vec<CooElement> = columns
            .iter()
            .zip(rows)
            .zip(values)
            .map(|((&col, &row), &value)| {
                let mut codeword = CooElement { col, row, value }.codeword();
                encode(&mut codeword, layout);
                CooElement::from_codeword(&codeword)
            })
            .collect();

        if mode.checks_constraints() {
            abft::check_coo(&elements, n)?;
        }

        Ok(Self { n, mode, elements })
    }

    /// Create an empty COO matrix
    pub fn empty(n: usize, mode: ProtectionMode) -> Self {
        Self {
            n,
            mode,
            elements: Vec::new(),
        }
    }

    /// Returns the stored elements, ECC bits included
    pub fn elements(&self) -> &[CooElement] {
        &self.elements
    }

    /// Returns element `index` with any ECC bits masked out of the column
    pub fn decoded(&self, index: usize) -> Option<CooElement> {
        let mask = self.mode.kernel().column_mask;
        self.elements.get(index).map(|element| CooElement {
            col: element.col & mask,
            ..*element
        })
    }

    /// Flip one bit of a stored element's codeword
    ///
    /// The encode pass is not re-run, so the next SpMV sees the flip exactly
    /// like a memory upset.
    pub fn flip_bit(&mut self, index: usize, bit: u32) -> Result<()> {
        let width = SparseFormat::Coo.codeword_bits();
        if bit >= width {
            return Err(Error::IndexOutOfBounds {
                index: bit as usize,
                size: width as usize,
            });
        }
        let size = self.elements.len();
        let element = self
            .elements
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, size })?;
        let mut codeword = element.codeword();
        codeword.flip_bit(bit);
        *element = CooElement::from_codeword(&codeword);
        Ok(())
    }

    /// Flip `count` random bits of one random element inside `region`
    ///
    /// Deterministic for a seeded `rng`. Returns the flips performed.
    pub fn inject_bitflip<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        region: BitFlipRegion,
        count: usize,
    ) -> Result<Vec<InjectedFlip>> {
        let flips =
            abft::plan_bitflips(rng, SparseFormat::Coo, self.elements.len(), region, count)?;
        for flip in &flips {
            tracing::info!(index = flip.index, bit = flip.bit, "flipping bit of COO element");
            self.flip_bit(flip.index, flip.bit)?;
        }
        Ok(flips)
    }
}

impl SparseStorage for CooMatrix {
    fn format(&self) -> SparseFormat {
        SparseFormat::Coo
    }

    fn dim(&self) -> usize {
        self.n
    }

    fn nnz(&self) -> usize {
        self.elements.len()
    }

    fn mode(&self) -> ProtectionMode {
        self.mode
    }

    fn memory_usage(&self) -> usize {
        self.elements.len() * std::mem::size_of::<CooElement>()
    }
}
