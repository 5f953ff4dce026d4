//! Backend contexts for the CG driver
//!
//! A context bundles everything the solver needs from a backend: matrix and
//! vector allocation, the dense vector kernels and the protected SpMV. One
//! context exists per (target, protection mode) pair and is looked up by
//! name through a [`ContextRegistry`].
//!
//! # Architecture
//!
//! ```text
//! ContextRegistry (explicit, built by with_defaults())
//! └── (target, mode) -> factory
//!     └── CgContext
//!         ├── SparseMatrix (format chosen by target, mode fixed at creation)
//!         └── DenseVector
//! ```

pub mod cpu;
mod registry;
mod vector;

pub use cpu::CpuContext;
pub use registry::{ContextFactory, ContextRegistry};
pub use vector::DenseVector;

use rand::RngCore;

use crate::abft::{BitFlipRegion, InjectedFlip, ProtectionMode, SpmvReport};
use crate::error::{Error, Result};
use crate::sparse::{SparseFormat, SparseMatrix};

/// Operations a backend provides to the CG driver
///
/// All vector arguments of one call must have the same length, and `spmv`
/// operands must match the matrix dimension; mismatches return
/// `Error::ShapeMismatch`.
///
/// # Example
///
/// ```
/// use abft::abft::ProtectionMode;
/// use abft::runtime::{CgContext, CpuContext};
/// use abft::sparse::SparseFormat;
///
/// let ctx = CpuContext::new(SparseFormat::Csr, ProtectionMode::Sec7);
/// let mut a = ctx.create_matrix(&[0, 1], &[0, 1], &[2.0, 4.0], 2)?;
///
/// let mut x = ctx.create_vector(2);
/// ctx.map_vector_mut(&mut x).copy_from_slice(&[1.0, 1.0]);
/// let mut y = ctx.create_vector(2);
///
/// ctx.spmv(&mut a, &x, &mut y)?;
/// assert_eq!(ctx.map_vector(&y), &[2.0, 4.0]);
/// assert_eq!(ctx.dot(&x, &y)?, 6.0);
/// # Ok::<(), abft::error::Error>(())
/// ```
pub trait CgContext: Send + Sync + std::fmt::Debug {
    /// Backend target name (e.g. `"cpu"`)
    fn target(&self) -> &'static str;

    /// Protection mode applied to every matrix this context creates
    fn mode(&self) -> ProtectionMode;

    /// Storage format of the matrices this context creates
    fn format(&self) -> SparseFormat;

    /// Build a protected `n x n` matrix from triplet arrays
    fn create_matrix(
        &self,
        columns: &[u32],
        rows: &[u32],
        values: &[f64],
        n: usize,
    ) -> Result<SparseMatrix>;

    /// Release a matrix
    fn destroy_matrix(&self, matrix: SparseMatrix) {
        drop(matrix);
    }

    /// Allocate a zero-filled vector of length `n`
    fn create_vector(&self, n: usize) -> DenseVector;

    /// Release a vector
    fn destroy_vector(&self, vector: DenseVector) {
        drop(vector);
    }

    /// Read access to a vector's elements
    ///
    /// There is no `unmap_vector`. A mapping lasts as long as the returned
    /// borrow, so the borrow checker ends it instead of a paired call.
    fn map_vector<'a>(&self, vector: &'a DenseVector) -> &'a [f64];

    /// Write access to a vector's elements
    fn map_vector_mut<'a>(&self, vector: &'a mut DenseVector) -> &'a mut [f64];

    /// `dst = src`
    fn copy_vector(&self, dst: &mut DenseVector, src: &DenseVector) -> Result<()>;

    /// `a · b`
    fn dot(&self, a: &DenseVector, b: &DenseVector) -> Result<f64>;

    /// `x += alpha * p`, `r -= alpha * w`, returning the new `r · r`
    fn calc_xr(
        &self,
        x: &mut DenseVector,
        r: &mut DenseVector,
        p: &DenseVector,
        w: &DenseVector,
        alpha: f64,
    ) -> Result<f64>;

    /// `p = r + beta * p`
    fn calc_p(&self, p: &mut DenseVector, r: &DenseVector, beta: f64) -> Result<()>;

    /// Protected `output = matrix * input`
    fn spmv(
        &self,
        matrix: &mut SparseMatrix,
        input: &DenseVector,
        output: &mut DenseVector,
    ) -> Result<SpmvReport>;

    /// Flip `count` random bits of one random nonzero of `matrix`
    fn inject_bitflip(
        &self,
        matrix: &mut SparseMatrix,
        region: BitFlipRegion,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<InjectedFlip>>;

    /// Registry key of this context, `"{target}-{mode}"`
    fn name(&self) -> String {
        format!("{}-{}", self.target(), self.mode())
    }
}

/// Returns `ShapeMismatch` unless `got == expected`
#[inline]
pub(crate) fn check_len(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(Error::shape_mismatch(expected, got));
    }
    Ok(())
}
