//! Protected sparse matrix storage
//!
//! Two formats are supported, each storing every nonzero as one ECC
//! codeword (see [`crate::ecc`]):
//!
//! - **COO** (Coordinate): `(col, row, value)` triplets, 128 bits per
//!   nonzero. Row and column indices and the value are all covered.
//!   SpMV is sequential.
//!
//! - **CSR** (Compressed Sparse Row): row pointers plus `(value, col)` pairs,
//!   96 bits per nonzero. Row pointers are unprotected. SpMV is row-parallel.
//!
//! Both check every nonzero during SpMV according to the
//! [`ProtectionMode`](crate::abft::ProtectionMode) fixed at construction.
//!
//! # Usage
//!
//! ```
//! use abft::abft::ProtectionMode;
//! use abft::sparse::{CooMatrix, SparseStorage};
//!
//! // [1 0]
//! // [0 2]
//! let mut a = CooMatrix::new(&[0, 1], &[0, 1], &[1.0, 2.0], 2, ProtectionMode::Sec8)?;
//! a.flip_bit(1, 100)?;
//!
//! let mut y = [0.0; 2];
//! let report = a.spmv(&[3.0, 4.0], &mut y)?;
//! assert_eq!(y, [3.0, 8.0]);
//! assert_eq!(report.len(), 1);
//! assert_eq!(a.nnz(), 2);
//! # Ok::<(), abft::error::Error>(())
//! ```

mod coo;
mod csr;
mod format;
mod matrix;
mod validate;

pub use coo::{CooElement, CooMatrix};
pub use csr::CsrMatrix;
pub use format::{SparseFormat, SparseStorage};
pub use matrix::SparseMatrix;
