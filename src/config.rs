//! Run configuration for the CG driver

use std::path::PathBuf;

use crate::abft::BitFlipRegion;
use crate::algorithm::CgOptions;

/// Default matrix file, relative to the working directory
pub const DEFAULT_MATRIX_FILE: &str = "matrices/shallow_water1/shallow_water1.mtx";

/// Fault injection request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitFlipConfig {
    /// Number of bits to flip in the chosen nonzero (default: 1)
    pub count: usize,
    /// Codeword region to target (default: Any)
    pub region: BitFlipRegion,
}

impl Default for BitFlipConfig {
    fn default() -> Self {
        Self {
            count: 1,
            region: BitFlipRegion::Any,
        }
    }
}

/// Everything needed for one protected CG run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Matrix Market file to load (default: [`DEFAULT_MATRIX_FILE`])
    pub matrix_file: PathBuf,
    /// Number of copies of the matrix placed on the diagonal (default: 25)
    pub num_blocks: usize,
    /// Registry target (default: "cpu")
    pub target: String,
    /// Protection mode name (default: "none")
    pub mode: String,
    /// Solver settings
    pub cg: CgOptions,
    /// Fault to inject before solving (default: none)
    pub bitflip: Option<BitFlipConfig>,
    /// Seed for the right-hand side and fault injection (default: from entropy)
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            matrix_file: PathBuf::from(DEFAULT_MATRIX_FILE),
            num_blocks: 25,
            target: "cpu".to_string(),
            mode: "none".to_string(),
            cg: CgOptions::default(),
            bitflip: None,
            seed: None,
        }
    }
}
