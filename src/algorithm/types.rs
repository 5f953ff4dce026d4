//! Options and result types for the CG solver

use crate::abft::Correction;
use crate::runtime::DenseVector;

/// Configuration options for the Conjugate Gradient solver
#[derive(Debug, Clone)]
pub struct CgOptions {
    /// Maximum number of iterations (default: 1000)
    pub max_iter: usize,
    /// Stop once `r · r` is at or below this value (default: 0.001)
    pub conv_threshold: f64,
    /// Whether to record `r · r` after every iteration (default: false)
    pub track_residual_history: bool,
}

impl Default for CgOptions {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            conv_threshold: 0.001,
            track_residual_history: false,
        }
    }
}

/// Result of the Conjugate Gradient solver
#[derive(Debug, Clone)]
pub struct CgResult {
    /// Solution vector x such that Ax ≈ b
    pub solution: DenseVector,
    /// Number of iterations performed
    pub iterations: usize,
    /// Final `r · r`
    pub rr: f64,
    /// Whether `rr` reached the convergence threshold
    pub converged: bool,
    /// Every single-bit repair made by the SpMV calls of this solve
    pub corrections: Vec<Correction>,
    /// `r · r` after each iteration (empty unless tracking was requested)
    pub residual_history: Vec<f64>,
}

/// Error of a solution measured against the right-hand side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualError {
    /// Euclidean norm of `b - A x`
    pub total: f64,
    /// Largest component of `|b - A x|`
    pub max: f64,
}
