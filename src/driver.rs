//! End-to-end protected CG run

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::abft::InjectedFlip;
use crate::algorithm::{CgResult, ResidualError, cg_solve, residual_error};
use crate::config::RunConfig;
use crate::error::Result;
use crate::io::{Triplets, load_matrix_market};
use crate::runtime::{CgContext, ContextRegistry};
use crate::sparse::SparseStorage;

/// Outcome of one run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Registry name of the context used
    pub context: String,
    /// Matrix dimension
    pub n: usize,
    /// Dimension of one diagonal block
    pub block_size: usize,
    /// Number of stored nonzeros
    pub nnz: usize,
    /// Bits flipped before the solve
    pub flips: Vec<InjectedFlip>,
    /// Solver result
    pub cg: CgResult,
    /// `|b - A x|` for the returned solution
    pub error: ResidualError,
    /// Wall time of the solve alone
    pub elapsed: Duration,
}

/// Load the configured matrix and run CG on it
pub fn run(config: &RunConfig, registry: &ContextRegistry) -> Result<RunReport> {
    let ctx = registry.create(&config.target, &config.mode)?;
    let triplets = load_matrix_market(&config.matrix_file, config.num_blocks)?;
    solve_triplets(ctx.as_ref(), &triplets, config)
}

/// Build the protected matrix from `triplets` and run CG on it
///
/// The right-hand side is uniform in `[0, 1)`, drawn from the configured
/// seed; the same generator then drives any fault injection.
pub fn solve_triplets(
    ctx: &dyn CgContext,
    triplets: &Triplets,
    config: &RunConfig,
) -> Result<RunReport> {
    let mut a = ctx.create_matrix(
        &triplets.columns,
        &triplets.rows,
        &triplets.values,
        triplets.n,
    )?;
    let n = a.dim();

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let mut b = ctx.create_vector(n);
    for bi in ctx.map_vector_mut(&mut b) {
        *bi = rng.random::<f64>();
    }

    let flips = match config.bitflip {
        Some(bitflip) => ctx.inject_bitflip(&mut a, bitflip.region, bitflip.count, &mut rng)?,
        None => Vec::new(),
    };

    let start = Instant::now();
    let cg = cg_solve(ctx, &mut a, &b, &config.cg)?;
    let elapsed = start.elapsed();

    let error = residual_error(ctx, &mut a, &cg.solution, &b)?;
    tracing::info!(
        context = %ctx.name(),
        iterations = cg.iterations,
        corrections = cg.corrections.len(),
        total_error = error.total,
        "run finished"
    );

    let report = RunReport {
        context: ctx.name(),
        n,
        block_size: n / config.num_blocks.max(1),
        nnz: a.nnz(),
        flips,
        cg,
        error,
        elapsed,
    };
    ctx.destroy_matrix(a);
    ctx.destroy_vector(b);
    Ok(report)
}
