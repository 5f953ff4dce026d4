//! Dense vector kernels for the CG iteration
//!
//! Performance characteristics:
//! - Parallelization threshold: 4096 elements
//! - Memory bandwidth bound (one or two passes per kernel)

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Parallelization threshold: skip Rayon for short vectors (overhead > benefit)
#[cfg(feature = "rayon")]
const PARALLEL_THRESHOLD: usize = 4096;

#[cfg(feature = "rayon")]
const CHUNK_SIZE: usize = 4096;

/// Dot product `a · b`
///
/// Slices must have equal length; callers check.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    #[cfg(feature = "rayon")]
    if a.len() >= PARALLEL_THRESHOLD {
        return a
            .par_chunks(CHUNK_SIZE)
            .zip(b.par_chunks(CHUNK_SIZE))
            .map(|(ac, bc)| ac.iter().zip(bc).map(|(x, y)| x * y).sum::<f64>())
            .sum();
    }

    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Fused CG update: `x += alpha * p`, `r -= alpha * w`, returns `r · r`
#[inline]
pub fn calc_xr(x: &mut [f64], r: &mut [f64], p: &[f64], w: &[f64], alpha: f64) -> f64 {
    debug_assert!(x.len() == r.len() && p.len() == r.len() && w.len() == r.len());

    #[cfg(feature = "rayon")]
    if r.len() >= PARALLEL_THRESHOLD {
        return x
            .par_chunks_mut(CHUNK_SIZE)
            .zip(r.par_chunks_mut(CHUNK_SIZE))
            .zip(p.par_chunks(CHUNK_SIZE))
            .zip(w.par_chunks(CHUNK_SIZE))
            .map(|(((xc, rc), pc), wc)| update_xr(xc, rc, pc, wc, alpha))
            .sum();
    }

    update_xr(x, r, p, w, alpha)
}

#[inline]
fn update_xr(x: &mut [f64], r: &mut [f64], p: &[f64], w: &[f64], alpha: f64) -> f64 {
    let mut rr = 0.0;
    for i in 0..r.len() {
        x[i] += alpha * p[i];
        r[i] -= alpha * w[i];
        rr += r[i] * r[i];
    }
    rr
}

/// Search direction update: `p = r + beta * p`
#[inline]
pub fn calc_p(p: &mut [f64], r: &[f64], beta: f64) {
    debug_assert_eq!(p.len(), r.len());

    #[cfg(feature = "rayon")]
    if p.len() >= PARALLEL_THRESHOLD {
        p.par_chunks_mut(CHUNK_SIZE)
            .zip(r.par_chunks(CHUNK_SIZE))
            .for_each(|(pc, rc)| {
                for (pi, &ri) in pc.iter_mut().zip(rc) {
                    *pi = ri + beta * *pi;
                }
            });
        return;
    }

    for (pi, &ri) in p.iter_mut().zip(r) {
        *pi = ri + beta * *pi;
    }
}
