//! Protected sparse matrix with runtime-selected storage format

use rand::Rng;

use crate::abft::{BitFlipRegion, InjectedFlip, ProtectionMode, SpmvReport};
use crate::error::Result;

use super::coo::CooMatrix;
use super::csr::CsrMatrix;
use super::format::{SparseFormat, SparseStorage};

/// Sparse matrix with runtime-selected storage format
///
/// `SparseMatrix` is what a [`CgContext`](crate::runtime::CgContext) hands out:
/// the format is picked by the context, the protection mode is fixed when the
/// matrix is built.
///
/// # Example
///
/// ```
/// use abft::abft::ProtectionMode;
/// use abft::sparse::{SparseFormat, SparseMatrix};
///
/// // [2 1]
/// // [1 2]
/// let mut a = SparseMatrix::new(
///     SparseFormat::Csr,
///     &[0, 1, 0, 1],
///     &[0, 0, 1, 1],
///     &[2.0, 1.0, 1.0, 2.0],
///     2,
///     ProtectionMode::Secded,
/// )?;
///
/// let mut y = [0.0; 2];
/// let report = a.spmv(&[1.0, 1.0], &mut y)?;
/// assert_eq!(y, [3.0, 3.0]);
/// assert!(report.is_clean());
/// # Ok::<(), abft::error::Error>(())
/// ```
#[derive(Debug, Clone)]
pub enum SparseMatrix {
    /// COO storage: 128-bit codewords, sequential SpMV
    Coo(CooMatrix),

    /// CSR storage: 96-bit codewords, row-parallel SpMV
    Csr(CsrMatrix),
}

impl SparseMatrix {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Build a protected matrix in `format` from triplet arrays
    ///
    /// CSR additionally requires `rows` to be non-decreasing.
    pub fn new(
        format: SparseFormat,
        columns: &[u32],
        rows: &[u32],
        values: &[f64],
        n: usize,
        mode: ProtectionMode,
    ) -> Result<Self> {
        Ok(match format {
            SparseFormat::Coo => SparseMatrix::Coo(CooMatrix::new(columns, rows, values, n, mode)?),
            SparseFormat::Csr => SparseMatrix::Csr(CsrMatrix::new(columns, rows, values, n, mode)?),
        })
    }

    /// Create an empty matrix
    pub fn empty(format: SparseFormat, n: usize, mode: ProtectionMode) -> Self {
        match format {
            SparseFormat::Coo => SparseMatrix::Coo(CooMatrix::empty(n, mode)),
            SparseFormat::Csr => SparseMatrix::Csr(CsrMatrix::empty(n, mode)),
        }
    }

    // =========================================================================
    // Format access
    // =========================================================================

    /// Returns the COO storage, if this is a COO matrix
    pub fn as_coo(&self) -> Option<&CooMatrix> {
        match self {
            SparseMatrix::Coo(coo) => Some(coo),
            SparseMatrix::Csr(_) => None,
        }
    }

    /// Returns the CSR storage, if this is a CSR matrix
    pub fn as_csr(&self) -> Option<&CsrMatrix> {
        match self {
            SparseMatrix::Csr(csr) => Some(csr),
            SparseMatrix::Coo(_) => None,
        }
    }

    // =========================================================================
    // Protected operations
    // =========================================================================

    /// Protected SpMV `y = A x`, see [`CooMatrix::spmv`] and [`CsrMatrix::spmv`]
    pub fn spmv(&mut self, x: &[f64], y: &mut [f64]) -> Result<SpmvReport> {
        match self {
            SparseMatrix::Coo(coo) => coo.spmv(x, y),
            SparseMatrix::Csr(csr) => csr.spmv(x, y),
        }
    }

    /// Flip one codeword bit of nonzero `index`
    pub fn flip_bit(&mut self, index: usize, bit: u32) -> Result<()> {
        match self {
            SparseMatrix::Coo(coo) => coo.flip_bit(index, bit),
            SparseMatrix::Csr(csr) => csr.flip_bit(index, bit),
        }
    }

    /// Flip `count` random bits of one random nonzero inside `region`
    pub fn inject_bitflip<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        region: BitFlipRegion,
        count: usize,
    ) -> Result<Vec<InjectedFlip>> {
        match self {
            SparseMatrix::Coo(coo) => coo.inject_bitflip(rng, region, count),
            SparseMatrix::Csr(csr) => csr.inject_bitflip(rng, region, count),
        }
    }
}

impl SparseStorage for SparseMatrix {
    fn format(&self) -> SparseFormat {
        match self {
            SparseMatrix::Coo(coo) => coo.format(),
            SparseMatrix::Csr(csr) => csr.format(),
        }
    }

    fn dim(&self) -> usize {
        match self {
            SparseMatrix::Coo(coo) => coo.dim(),
            SparseMatrix::Csr(csr) => csr.dim(),
        }
    }

    fn nnz(&self) -> usize {
        match self {
            SparseMatrix::Coo(coo) => coo.nnz(),
            SparseMatrix::Csr(csr) => csr.nnz(),
        }
    }

    fn mode(&self) -> ProtectionMode {
        match self {
            SparseMatrix::Coo(coo) => coo.mode(),
            SparseMatrix::Csr(csr) => csr.mode(),
        }
    }

    fn memory_usage(&self) -> usize {
        match self {
            SparseMatrix::Coo(coo) => coo.memory_usage(),
            SparseMatrix::Csr(csr) => csr.memory_usage(),
        }
    }
}

impl From<CooMatrix> for SparseMatrix {
    fn from(coo: CooMatrix) -> Self {
        SparseMatrix::Coo(coo)
    }
}

impl From<CsrMatrix> for SparseMatrix {
    fn from(csr: CsrMatrix) -> Self {
        SparseMatrix::Csr(csr)
    }
}
