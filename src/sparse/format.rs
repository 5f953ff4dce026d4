//! Sparse format definitions and traits

use crate::abft::ProtectionMode;
use crate::ecc::{COO_LAYOUT, CSR_LAYOUT, CodewordLayout};

/// Sparse matrix storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SparseFormat {
    /// Coordinate format (COO)
    ///
    /// Stores explicit (col, row, value) triplets. Each nonzero is a 128-bit
    /// codeword; row and column are both protected.
    /// Storage: O(16 * nnz)
    Coo,

    /// Compressed Sparse Row (CSR)
    ///
    /// Row pointers + column indices + values. Each nonzero is a 96-bit
    /// codeword of value and column; row pointers are unprotected.
    /// Storage: O(12 * nnz + 4 * nrows)
    Csr,
}

impl SparseFormat {
    /// Returns the format name as a string
    pub fn name(&self) -> &'static str {
        match self {
            SparseFormat::Coo => "COO",
            SparseFormat::Csr => "CSR",
        }
    }

    /// Bit layout of one protected nonzero in this format
    #[inline]
    pub fn layout(&self) -> &'static CodewordLayout {
        match self {
            SparseFormat::Coo => &COO_LAYOUT,
            SparseFormat::Csr => &CSR_LAYOUT,
        }
    }

    /// Number of bits in one nonzero's codeword
    #[inline]
    pub fn codeword_bits(&self) -> u32 {
        self.layout().width
    }
}

impl std::fmt::Display for SparseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Trait for protected sparse storage
///
/// This trait defines the common interface for both storage formats.
pub trait SparseStorage: Sized {
    /// Returns the sparse format type
    fn format(&self) -> SparseFormat;

    /// Returns the matrix dimension N (matrices are square)
    fn dim(&self) -> usize;

    /// Returns the number of non-zero elements
    fn nnz(&self) -> usize;

    /// Returns the protection mode fixed at construction
    fn mode(&self) -> ProtectionMode;

    /// Returns true if the matrix is empty (no non-zeros)
    #[inline]
    fn is_empty(&self) -> bool {
        self.nnz() == 0
    }

    /// Returns the memory usage in bytes (approximate)
    fn memory_usage(&self) -> usize;
}
