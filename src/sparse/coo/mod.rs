//! COO (Coordinate) sparse format

mod core;
mod spmv;

pub use core::{CooElement, CooMatrix};
