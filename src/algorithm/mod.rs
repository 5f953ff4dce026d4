//! Iterative solvers driven through a [`CgContext`](crate::runtime::CgContext)
//!
//! # Available solvers
//!
//! - [`cg_solve`] - unpreconditioned Conjugate Gradient for SPD systems
//!
//! The solver itself is unprotected dense arithmetic; the matrix it
//! multiplies by is protected according to the context's mode. Corrections
//! made along the way are collected in [`CgResult::corrections`], and the
//! first uncorrectable fault ends the solve with an error.

mod cg;
mod types;

pub use cg::{cg_solve, residual_error};
pub use types::{CgOptions, CgResult, ResidualError};
