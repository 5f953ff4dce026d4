//! Conjugate Gradient on a protected matrix
//!
//! Unpreconditioned CG (Hestenes-Stiefel) for symmetric positive definite
//! systems, written against [`CgContext`] so that every multiply goes
//! through the protected SpMV kernel.

use crate::error::Result;
use crate::runtime::{CgContext, DenseVector, check_len};
use crate::sparse::{SparseMatrix, SparseStorage};

use super::types::{CgOptions, CgResult, ResidualError};

/// Solve `A x = b` starting from `x = 0`
///
/// Algorithm:
/// ```text
/// r = b, p = r, rr = <r, r>
/// while iter < max_iter and rr > conv_threshold:
///     w = A*p
///     alpha = rr / <p, w>
///     x = x + alpha*p
///     r = r - alpha*w
///     rr_new = <r, r>
///     beta = rr_new / rr
///     p = r + beta*p
///     rr = rr_new
/// ```
///
/// # Errors
///
/// Any SpMV error (uncorrectable corruption, constraint violation) aborts
/// the solve and is returned unchanged. `ShapeMismatch` if `b` does not
/// match the matrix dimension.
pub fn cg_solve(
    ctx: &dyn CgContext,
    a: &mut SparseMatrix,
    b: &DenseVector,
    options: &CgOptions,
) -> Result<CgResult> {
    let n = a.dim();
    check_len(n, b.len())?;

    let mut x = ctx.create_vector(n);
    let mut r = ctx.create_vector(n);
    let mut p = ctx.create_vector(n);
    let mut w = ctx.create_vector(n);

    // r = b - A*x with x = 0
    ctx.copy_vector(&mut r, b)?;
    ctx.copy_vector(&mut p, &r)?;
    let mut rr = ctx.dot(&r, &r)?;

    let mut corrections = Vec::new();
    let mut residual_history = Vec::new();
    let mut iterations = 0;

    while iterations < options.max_iter && rr > options.conv_threshold {
        let report = ctx.spmv(a, &p, &mut w)?;
        corrections.extend(report.corrections);

        let pw = ctx.dot(&p, &w)?;
        if pw == 0.0 || !pw.is_finite() {
            tracing::warn!(iteration = iterations, pw, "CG breakdown");
            break;
        }
        let alpha = rr / pw;

        let rr_new = ctx.calc_xr(&mut x, &mut r, &p, &w, alpha)?;
        let beta = rr_new / rr;
        ctx.calc_p(&mut p, &r, beta)?;
        rr = rr_new;

        tracing::debug!(iteration = iterations, rr, "CG iteration");
        if options.track_residual_history {
            residual_history.push(rr);
        }
        iterations += 1;
    }

    ctx.destroy_vector(r);
    ctx.destroy_vector(p);
    ctx.destroy_vector(w);

    Ok(CgResult {
        solution: x,
        iterations,
        rr,
        converged: rr <= options.conv_threshold,
        corrections,
        residual_history,
    })
}

/// Measure `|b - A x|` through the protected SpMV
pub fn residual_error(
    ctx: &dyn CgContext,
    a: &mut SparseMatrix,
    x: &DenseVector,
    b: &DenseVector,
) -> Result<ResidualError> {
    let n = a.dim();
    check_len(n, b.len())?;

    let mut ax = ctx.create_vector(n);
    ctx.spmv(a, x, &mut ax)?;

    let mut err_sq = 0.0;
    let mut max = 0.0f64;
    for (&bi, &axi) in ctx.map_vector(b).iter().zip(ctx.map_vector(&ax)) {
        let err = (bi - axi).abs();
        err_sq += err * err;
        max = max.max(err);
    }
    ctx.destroy_vector(ax);

    Ok(ResidualError {
        total: err_sq.sqrt(),
        max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abft::ProtectionMode;
    use crate::error::Error;
    use crate::runtime::CpuContext;
    use crate::sparse::SparseFormat;

    // [4 1]
    // [1 3]
    fn spd(ctx: &dyn CgContext) -> SparseMatrix {
        ctx.create_matrix(&[0, 1, 0, 1], &[0, 0, 1, 1], &[4.0, 1.0, 1.0, 3.0], 2)
            .unwrap()
    }

    #[test]
    fn test_cg_2x2() {
        let ctx = CpuContext::new(SparseFormat::Csr, ProtectionMode::None);
        let mut a = spd(&ctx);
        let b = DenseVector::from_vec(vec![1.0, 2.0]);
        let options = CgOptions {
            conv_threshold: 1e-20,
            track_residual_history: true,
            ..Default::default()
        };

        let result = cg_solve(&ctx, &mut a, &b, &options).unwrap();
        // Exact solution [1/11, 7/11]; CG needs at most n steps
        assert!(result.converged);
        assert!(result.iterations <= 2);
        assert_eq!(result.residual_history.len(), result.iterations);
        assert!((result.solution.as_slice()[0] - 1.0 / 11.0).abs() < 1e-12);
        assert!((result.solution.as_slice()[1] - 7.0 / 11.0).abs() < 1e-12);

        let err = residual_error(&ctx, &mut a, &result.solution, &b).unwrap();
        assert!(err.total < 1e-10);
        assert!(err.max <= err.total);
    }

    #[test]
    fn test_cg_zero_rhs_does_not_iterate() {
        let ctx = CpuContext::new(SparseFormat::Coo, ProtectionMode::Secded);
        let mut a = spd(&ctx);
        let b = ctx.create_vector(2);
        let result = cg_solve(&ctx, &mut a, &b, &CgOptions::default()).unwrap();
        assert_eq!(result.iterations, 0);
        assert!(result.converged);
        assert!(result.residual_history.is_empty());
    }

    #[test]
    fn test_cg_propagates_abort() {
        let ctx = CpuContext::new(SparseFormat::Csr, ProtectionMode::Sed);
        let mut a = spd(&ctx);
        a.flip_bit(0, 12).unwrap();
        let b = DenseVector::from_vec(vec![1.0, 2.0]);
        let err = cg_solve(&ctx, &mut a, &b, &CgOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Uncorrectable { index: 0, .. }));
        assert!(err.is_data_corruption());
    }

    #[test]
    fn test_cg_rejects_wrong_rhs_length() {
        let ctx = CpuContext::new(SparseFormat::Csr, ProtectionMode::None);
        let mut a = spd(&ctx);
        let b = ctx.create_vector(3);
        assert!(matches!(
            cg_solve(&ctx, &mut a, &b, &CgOptions::default()),
            Err(Error::ShapeMismatch {
                expected: 2,
                got: 3
            })
        ));
    }
}
