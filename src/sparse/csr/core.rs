//! Core CSR implementation: struct, creation, getters

use rand::Rng;

use crate::abft::{self, BitFlipRegion, InjectedFlip, ProtectionMode};
use crate::ecc::{Codeword, value_from_words, value_words};
use crate::error::{Error, Result};

use super::super::format::{SparseFormat, SparseStorage};
use super::super::validate::validate_triplets;

/// Pack one CSR nonzero into its codeword: `[value_lo, value_hi, col, 0]`
#[inline]
pub(crate) fn pack_codeword(value: f64, col: u32) -> Codeword {
    let (lo, hi) = value_words(value);
    Codeword::from_words([lo, hi, col, 0])
}

/// Unpack a CSR codeword into `(value, col)`
#[inline]
pub(crate) fn unpack_codeword(codeword: &Codeword) -> (f64, u32) {
    let [lo, hi, col, _] = *codeword.words();
    (value_from_words(lo, hi), col)
}

/// CSR (Compressed Sparse Row) sparse matrix with per-element protection
///
/// Each nonzero is a (value, column) pair; row pointers are not protected.
#[derive(Debug, Clone)]
pub struct CsrMatrix {
    pub(crate) n: usize,
    pub(crate) mode: ProtectionMode,
    pub(crate) row_ptrs: Vec<u32>,
    pub(crate) cols: Vec<u32>,
    pub(crate) values: Vec<f64>,
}

impl CsrMatrix {
    /// Create a protected CSR matrix from triplet arrays
    ///
    /// # Arguments
    ///
    /// * `columns` - Column index of each nonzero
    /// * `rows` - Row index of each nonzero, non-decreasing
    /// * `values` - Value of each nonzero
    /// * `n` - Matrix dimension
    /// * `mode` - Protection mode
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - the three arrays have different lengths
    /// - an index is `>= n`
    /// - `rows` is not sorted
    /// - `n` does not fit the column field under an ECC mode
    /// - `mode` is `Constraints` and a row's columns are not strictly increasing
    pub fn new(
        columns: &[u32],
        rows: &[u32],
        values: &[f64],
        n: usize,
        mode: ProtectionMode,
    ) -> Result<Self> {
        validate_triplets(columns, rows, values, n, mode)?;
        if rows.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(Error::invalid_argument(
                "rows",
                "CSR construction requires non-decreasing row indices",
            ));
        }

        // Row pointers from per-row counts
        let mut row_ptrs = vec![0u32; n + 1];
        for &row in rows {
            row_ptrs[row as usize + 1] += 1;
        }
        for row in 0..n {
            row_ptrs[row + 1] += row_ptrs[row];
        }

        let encode = mode.kernel().encode;
        let layout = SparseFormat::Csr.layout();
        let (values, cols): (Vec<f64>, Vec<u32>) = values
            .iter()
            .zip(columns)
            .map(|(&value, &col)| {
                let mut codeword = pack_codeword(value, col);
                encode(&mut codeword, layout);
                unpack_codeword(&codeword)
            })
            .unzip();

        if mode.checks_constraints() {
            abft::check_csr(&row_ptrs, &cols, n)?;
        }

        Ok(Self {
            n,
            mode,
            row_ptrs,
            cols,
            values,
        })
    }

    /// Create an empty CSR matrix
    pub fn empty(n: usize, mode: ProtectionMode) -> Self {
        Self {
            n,
            mode,
            row_ptrs: vec![0; n + 1],
            cols: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Returns the row pointers (length `n + 1`)
    pub fn row_ptrs(&self) -> &[u32] {
        &self.row_ptrs
    }

    /// Returns the stored column words, ECC bits included
    pub fn cols(&self) -> &[u32] {
        &self.cols
    }

    /// Returns the stored values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Column index of nonzero `index` with any ECC bits masked out
    pub fn decoded_col(&self, index: usize) -> Option<u32> {
        let mask = self.mode.kernel().column_mask;
        self.cols.get(index).map(|&col| col & mask)
    }

    /// Overwrite one row pointer without any checking
    ///
    /// Row pointers carry no ECC; this lets tests model their corruption.
    pub fn set_row_ptr(&mut self, row: usize, ptr: u32) -> Result<()> {
        let size = self.row_ptrs.len();
        let slot = self
            .row_ptrs
            .get_mut(row)
            .ok_or(Error::IndexOutOfBounds { index: row, size })?;
        *slot = ptr;
        Ok(())
    }

    /// Flip one bit of a stored nonzero's codeword
    pub fn flip_bit(&mut self, index: usize, bit: u32) -> Result<()> {
        let width = SparseFormat::Csr.codeword_bits();
        if bit >= width {
            return Err(Error::IndexOutOfBounds {
                index: bit as usize,
                size: width as usize,
            });
        }
        let size = self.values.len();
        if index >= size {
            return Err(Error::IndexOutOfBounds { index, size });
        }
        let mut codeword = pack_codeword(self.values[index], self.cols[index]);
        codeword.flip_bit(bit);
        (self.values[index], self.cols[index]) = unpack_codeword(&codeword);
        Ok(())
    }

    /// Flip `count` random bits of one random nonzero inside `region`
    ///
    /// Deterministic for a seeded `rng`. Returns the flips performed.
    pub fn inject_bitflip<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        region: BitFlipRegion,
        count: usize,
    ) -> Result<Vec<InjectedFlip>> {
        let flips = abft::plan_bitflips(rng, SparseFormat::Csr, self.values.len(), region, count)?;
        for flip in &flips {
            tracing::info!(index = flip.index, bit = flip.bit, "flipping bit of CSR element");
            self.flip_bit(flip.index, flip.bit)?;
        }
        Ok(flips)
    }
}

impl SparseStorage for CsrMatrix {
    fn format(&self) -> SparseFormat {
        SparseFormat::Csr
    }

    fn dim(&self) -> usize {
        self.n
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }

    fn mode(&self) -> ProtectionMode {
        self.mode
    }

    fn memory_usage(&self) -> usize {
        self.row_ptrs.len() * std::mem::size_of::<u32>()
            + self.cols.len() * std::mem::size_of::<u32>()
            + self.values.len() * std::mem::size_of::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csr_creation() {
        // [1 0 2]
        // [0 0 3]
        // [4 5 6]
        let csr = CsrMatrix::new(
            &[0, 2, 2, 0, 1, 2],
            &[0, 0, 1, 2, 2, 2],
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            3,
            ProtectionMode::None,
        )
        .unwrap();

        assert_eq!(csr.nnz(), 6);
        assert_eq!(csr.dim(), 3);
        assert_eq!(csr.row_ptrs(), &[0, 2, 3, 6]);
        assert_eq!(csr.cols(), &[0, 2, 2, 0, 1, 2]);
    }

    #[test]
    fn test_csr_empty_rows() {
        // Rows 0 and 2 are empty
        let csr =
            CsrMatrix::new(&[1, 3], &[1, 3], &[1.0, 1.0], 4, ProtectionMode::Secded).unwrap();
        assert_eq!(csr.row_ptrs(), &[0, 0, 1, 1, 2]);
        assert_eq!(csr.decoded_col(1), Some(3));
        assert_eq!(csr.decoded_col(2), None);
    }

    #[test]
    fn test_csr_rejects_unsorted_rows() {
        let result = CsrMatrix::new(&[0, 0], &[1, 0], &[1.0, 1.0], 2, ProtectionMode::None);
        assert!(matches!(
            result,
            Err(Error::InvalidArgument { arg: "rows", .. })
        ));
    }

    #[test]
    fn test_csr_constraints_duplicate_column() {
        let result = CsrMatrix::new(&[1, 1], &[0, 0], &[1.0, 1.0], 2, ProtectionMode::Constraints);
        assert!(matches!(result, Err(Error::ConstraintViolated(_))));
    }

    #[test]
    fn test_csr_codeword_layout() {
        let codeword = pack_codeword(1.5, 7);
        let (lo, hi) = value_words(1.5);
        assert_eq!(codeword.words(), &[lo, hi, 7, 0]);
        assert_eq!(unpack_codeword(&codeword), (1.5, 7));
    }

    #[test]
    fn test_csr_flip_bit() {
        let mut csr = CsrMatrix::new(&[0], &[0], &[1.0], 1, ProtectionMode::None).unwrap();
        csr.flip_bit(0, 65).unwrap();
        assert_eq!(csr.cols(), &[2]);
        csr.flip_bit(0, 0).unwrap();
        assert_eq!(csr.values()[0].to_bits(), 1.0f64.to_bits() ^ 1);
        assert!(csr.flip_bit(0, 96).is_err());
    }
}
