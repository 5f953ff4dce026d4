//! Algorithm-based fault tolerance for the sparse matrix data
//!
//! # Protection modes
//!
//! | Mode | Metadata | Single flip | Double flip |
//! |------|----------|-------------|-------------|
//! | `None` | - | undetected | undetected |
//! | `Constraints` | - | detected if it breaks bounds/order | same |
//! | `Sed` | parity, bit 31 | detected | undetected |
//! | `Sec7` | Hamming, bits 25..=31 | corrected | may be mis-corrected |
//! | `Sec8`, `Secded` | Hamming + parity, bits 24..=31 | corrected | detected |
//!
//! Detected-but-uncorrectable corruption and constraint violations abort the
//! multiply with an [`Error`](crate::error::Error); corrections are written
//! back to the matrix and reported through [`SpmvReport`].

mod constraints;
mod inject;
mod kernel;
mod mode;
mod report;

pub use constraints::{
    ConstraintViolation, check_coo, check_coo_element, check_csr, check_csr_column, check_csr_row,
};
pub use inject::{BitFlipRegion, InjectedFlip};
pub(crate) use inject::plan_bitflips;
pub use kernel::{DecodeFn, ElementState, EncodeFn, ModeKernel};
pub use mode::ProtectionMode;
pub use report::{Correction, SpmvReport, UncorrectableFault};
