//! Protected CSR sparse matrix-vector multiply
//!
//! Rows are independent: each row gets a disjoint mutable view of its
//! nonzeros and writes one output slot, so with the `rayon` feature large
//! matrices are processed row-parallel.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::abft::{self, Correction, ElementState, ModeKernel, SpmvReport};
use crate::ecc::CodewordLayout;
use crate::error::{Error, Result};

use super::super::format::SparseFormat;
use super::core::{CsrMatrix, pack_codeword, unpack_codeword};

/// Parallelization threshold in non-zeros
#[cfg(feature = "rayon")]
const PARALLEL_THRESHOLD: usize = 4096;

/// Mutable view of one row's nonzeros
struct RowSlice<'a> {
    row: usize,
    /// Nonzero index of the first element, for reporting
    first: usize,
    cols: &'a mut [u32],
    values: &'a mut [f64],
}

/// Read-only state shared by every row of one multiply
struct RowKernel<'a> {
    kernel: &'static ModeKernel,
    layout: &'static CodewordLayout,
    n: usize,
    x: &'a [f64],
}

impl RowKernel<'_> {
    /// Check, repair and accumulate one row
    fn run(&self, row: RowSlice<'_>) -> Result<(f64, Vec<Correction>)> {
        let RowSlice {
            row,
            first,
            cols,
            values,
        } = row;
        let mut corrections = Vec::new();
        let mut sum = 0.0;

        for k in 0..cols.len() {
            if self.kernel.check_constraints {
                abft::check_csr_column(cols, k, first, self.n)?;
            }

            let index = first + k;
            let mut codeword = pack_codeword(values[k], cols[k]);
            match (self.kernel.decode)(&mut codeword, self.layout) {
                Ok(ElementState::Clean) => {}
                Ok(ElementState::Corrected { bit }) => {
                    tracing::warn!(index, row, bit, "corrected single-bit error in CSR element");
                    (values[k], cols[k]) = unpack_codeword(&codeword);
                    corrections.push(Correction { index, bit });
                }
                Err(fault) => {
                    tracing::error!(index, row, %fault, "uncorrectable error in CSR element");
                    return Err(Error::Uncorrectable { index, fault });
                }
            }

            let col = (cols[k] & self.kernel.column_mask) as usize;
            let xv = *self.x.get(col).ok_or(Error::IndexOutOfBounds {
                index: col,
                size: self.n,
            })?;
            sum += values[k] * xv;
        }

        Ok((sum, corrections))
    }
}

impl CsrMatrix {
    /// Protected SpMV: `y[row] = sum(value * x[col])` over each row
    ///
    /// Each nonzero is checked according to the matrix's protection mode
    /// before it contributes. Single-bit errors are repaired in place and
    /// listed in the returned report, in row order.
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if `x` or `y` does not have length `n`
    /// - `ConstraintViolated` if a structural check fails (constraints mode)
    /// - `Uncorrectable` if an ECC check detects an unrepairable error
    /// - `CorruptRowPointers` if a row extent is invalid outside constraints mode
    /// - `IndexOutOfBounds` if an unprotected column was corrupted out of range
    ///
    /// On error the contents of `y` are unspecified.
    pub fn spmv(&mut self, x: &[f64], y: &mut [f64]) -> Result<SpmvReport> {
        let n = self.n;
        if x.len() != n {
            return Err(Error::shape_mismatch(n, x.len()));
        }
        if y.len() != n {
            return Err(Error::shape_mismatch(n, y.len()));
        }

        #[cfg(feature = "rayon")]
        let parallel = self.values.len() >= PARALLEL_THRESHOLD;
        let state = RowKernel {
            kernel: self.mode.kernel(),
            layout: SparseFormat::Csr.layout(),
            n,
            x,
        };
        let rows = self.split_rows()?;

        #[cfg(feature = "rayon")]
        if parallel {
            let per_row = y
                .par_iter_mut()
                .zip(rows.into_par_iter())
                .map(|(slot, row)| {
                    let (sum, corrections) = state.run(row)?;
                    *slot = sum;
                    Ok(corrections)
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(SpmvReport {
                corrections: per_row.into_iter().flatten().collect(),
            });
        }

        let mut report = SpmvReport::default();
        for (slot, row) in y.iter_mut().zip(rows) {
            let (sum, corrections) = state.run(row)?;
            *slot = sum;
            report.corrections.extend(corrections);
        }
        Ok(report)
    }

    /// Validate the row pointers and split the nonzeros into per-row views
    fn split_rows(&mut self) -> Result<Vec<RowSlice<'_>>> {
        let nnz = self.values.len();
        let check_constraints = self.mode.checks_constraints();

        for (row, extent) in self.row_ptrs.windows(2).enumerate() {
            let (start, end) = (extent[0] as usize, extent[1] as usize);
            if check_constraints {
                abft::check_csr_row(row, start, end, nnz)?;
            } else if end < start || end > nnz {
                return Err(Error::CorruptRowPointers {
                    row,
                    start,
                    end,
                    nnz,
                });
            }
        }

        // Every extent is now in order and in range, so the rows tile a
        // contiguous suffix of the nonzeros.
        let first = self.row_ptrs.first().map_or(0, |&p| (p as usize).min(nnz));
        let mut cols = &mut self.cols[first..];
        let mut values = &mut self.values[first..];
        let mut rows = Vec::with_capacity(self.n);

        for (row, extent) in self.row_ptrs.windows(2).enumerate() {
            let (start, end) = (extent[0] as usize, extent[1] as usize);
            let (row_cols, rest_cols) = std::mem::take(&mut cols).split_at_mut(end - start);
            let (row_values, rest_values) = std::mem::take(&mut values).split_at_mut(end - start);
            cols = rest_cols;
            values = rest_values;
            rows.push(RowSlice {
                row,
                first: start,
                cols: row_cols,
                values: row_values,
            });
        }

        Ok(rows)
    }
}
