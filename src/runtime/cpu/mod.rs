//! CPU context implementation
//!
//! The CPU context keeps matrices and vectors in host memory. Dense vector
//! kernels and CSR SpMV use Rayon above a size threshold when the `rayon`
//! feature is enabled; COO SpMV is always sequential.

pub(crate) mod kernels;

use rand::RngCore;

use super::{CgContext, DenseVector, check_len};
use crate::abft::{BitFlipRegion, InjectedFlip, ProtectionMode, SpmvReport};
use crate::error::Result;
use crate::sparse::{SparseFormat, SparseMatrix, SparseStorage};

/// Host-memory context for one storage format and protection mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuContext {
    format: SparseFormat,
    mode: ProtectionMode,
}

impl CpuContext {
    /// Create a context producing `format` matrices protected by `mode`
    pub fn new(format: SparseFormat, mode: ProtectionMode) -> Self {
        Self { format, mode }
    }
}

impl CgContext for CpuContext {
    fn target(&self) -> &'static str {
        match self.format {
            SparseFormat::Csr => "cpu",
            SparseFormat::Coo => "cpu-coo",
        }
    }

    fn mode(&self) -> ProtectionMode {
        self.mode
    }

    fn format(&self) -> SparseFormat {
        self.format
    }

    fn create_matrix(
        &self,
        columns: &[u32],
        rows: &[u32],
        values: &[f64],
        n: usize,
    ) -> Result<SparseMatrix> {
        let matrix = SparseMatrix::new(self.format, columns, rows, values, n, self.mode)?;
        tracing::debug!(
            context = %self.name(),
            n,
            nnz = matrix.nnz(),
            bytes = matrix.memory_usage(),
            "created matrix"
        );
        Ok(matrix)
    }

    fn create_vector(&self, n: usize) -> DenseVector {
        DenseVector::zeros(n)
    }

    fn map_vector<'a>(&self, vector: &'a DenseVector) -> &'a [f64] {
        vector.as_slice()
    }

    fn map_vector_mut<'a>(&self, vector: &'a mut DenseVector) -> &'a mut [f64] {
        vector.as_mut_slice()
    }

    fn copy_vector(&self, dst: &mut DenseVector, src: &DenseVector) -> Result<()> {
        check_len(dst.len(), src.len())?;
        dst.as_mut_slice().copy_from_slice(src.as_slice());
        Ok(())
    }

    fn dot(&self, a: &DenseVector, b: &DenseVector) -> Result<f64> {
        check_len(a.len(), b.len())?;
        Ok(kernels::dot(a.as_slice(), b.as_slice()))
    }

    fn calc_xr(
        &self,
        x: &mut DenseVector,
        r: &mut DenseVector,
        p: &DenseVector,
        w: &DenseVector,
        alpha: f64,
    ) -> Result<f64> {
        let n = r.len();
        check_len(n, x.len())?;
        check_len(n, p.len())?;
        check_len(n, w.len())?;
        Ok(kernels::calc_xr(
            x.as_mut_slice(),
            r.as_mut_slice(),
            p.as_slice(),
            w.as_slice(),
            alpha,
        ))
    }

    fn calc_p(&self, p: &mut DenseVector, r: &DenseVector, beta: f64) -> Result<()> {
        check_len(p.len(), r.len())?;
        kernels::calc_p(p.as_mut_slice(), r.as_slice(), beta);
        Ok(())
    }

    fn spmv(
        &self,
        matrix: &mut SparseMatrix,
        input: &DenseVector,
        output: &mut DenseVector,
    ) -> Result<SpmvReport> {
        matrix.spmv(input.as_slice(), output.as_mut_slice())
    }

    fn inject_bitflip(
        &self,
        matrix: &mut SparseMatrix,
        region: BitFlipRegion,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<InjectedFlip>> {
        matrix.inject_bitflip(rng, region, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_target_names() {
        let csr = CpuContext::new(SparseFormat::Csr, ProtectionMode::Secded);
        let coo = CpuContext::new(SparseFormat::Coo, ProtectionMode::Sed);
        assert_eq!(csr.name(), "cpu-secded");
        assert_eq!(coo.name(), "cpu-coo-sed");
    }

    #[test]
    fn test_vector_ops() {
        let ctx = CpuContext::new(SparseFormat::Csr, ProtectionMode::None);
        let mut a = ctx.create_vector(3);
        ctx.map_vector_mut(&mut a).copy_from_slice(&[1.0, 2.0, 3.0]);
        let mut b = ctx.create_vector(3);
        ctx.copy_vector(&mut b, &a).unwrap();
        assert_eq!(ctx.map_vector(&b), &[1.0, 2.0, 3.0]);
        assert_eq!(ctx.dot(&a, &b).unwrap(), 14.0);

        ctx.calc_p(&mut b, &a, 2.0).unwrap();
        assert_eq!(ctx.map_vector(&b), &[3.0, 6.0, 9.0]);

        let short = ctx.create_vector(2);
        assert!(matches!(ctx.dot(&a, &short), Err(Error::ShapeMismatch { .. })));
        ctx.destroy_vector(short);
    }

    #[test]
    fn test_inject_through_context() {
        let ctx = CpuContext::new(SparseFormat::Coo, ProtectionMode::Secded);
        let mut a = ctx.create_matrix(&[0, 1], &[0, 1], &[1.0, 1.0], 2).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let flips = ctx
            .inject_bitflip(&mut a, BitFlipRegion::Value, 1, &mut rng)
            .unwrap();
        assert_eq!(flips.len(), 1);
        assert!((64..128).contains(&flips[0].bit));

        let x = DenseVector::from_vec(vec![1.0, 1.0]);
        let mut y = ctx.create_vector(2);
        let report = ctx.spmv(&mut a, &x, &mut y).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(ctx.map_vector(&y), &[1.0, 1.0]);
        ctx.destroy_matrix(a);
    }
}
