//! CSR (Compressed Sparse Row) sparse format

mod core;
mod spmv;

pub use core::CsrMatrix;
