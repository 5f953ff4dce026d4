//! # abft
//!
//! **Algorithm-based fault tolerance for sparse matrix-vector multiplication.**
//!
//! abft protects the sparse matrix inside an iterative solver against silent
//! bit flips. Each nonzero is stored as a codeword whose column field carries
//! a few bits of redundancy; every SpMV checks each nonzero before it
//! contributes, repairing single-bit errors in place and aborting the
//! multiply on anything it cannot repair.
//!
//! ## Features
//!
//! - **Protection modes**: none, structural constraints, SED, SEC7, SEC8, SECDED
//! - **Storage formats**: COO (128-bit codewords) and CSR (96-bit codewords)
//! - **Fault injection**: reproducible bit flips for exercising the kernels
//! - **CG driver**: Conjugate Gradient over a pluggable backend context
//! - **Matrix Market input** with mirroring and diagonal tiling
//!
//! ## Quick Start
//!
//! ```
//! use abft::prelude::*;
//!
//! let registry = ContextRegistry::with_defaults();
//! let ctx = registry.create("cpu", "secded")?;
//!
//! // [4 1]
//! // [1 3]
//! let mut a = ctx.create_matrix(&[0, 1, 0, 1], &[0, 0, 1, 1], &[4.0, 1.0, 1.0, 3.0], 2)?;
//! a.flip_bit(2, 70)?;
//!
//! let b = DenseVector::from_vec(vec![1.0, 2.0]);
//! let result = cg_solve(ctx.as_ref(), &mut a, &b, &CgOptions::default())?;
//! assert!(result.converged);
//! assert_eq!(result.corrections.len(), 1);
//! # Ok::<(), abft::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): Multi-threaded CSR SpMV and vector kernels

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abft;
pub mod algorithm;
pub mod config;
pub mod driver;
pub mod ecc;
pub mod error;
pub mod io;
pub mod runtime;
pub mod sparse;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::abft::{BitFlipRegion, ProtectionMode, SpmvReport};
    pub use crate::algorithm::{CgOptions, CgResult, cg_solve, residual_error};
    pub use crate::error::{Error, Result};
    pub use crate::runtime::{CgContext, ContextRegistry, CpuContext, DenseVector};
    pub use crate::sparse::{SparseFormat, SparseMatrix, SparseStorage};
}
