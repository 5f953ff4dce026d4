//! Protected COO sparse matrix-vector multiply

use crate::abft::{self, Correction, ElementState, SpmvReport};
use crate::error::{Error, Result};

use super::super::format::SparseFormat;
use super::core::{CooElement, CooMatrix};

impl CooMatrix {
    /// Protected SpMV: `y[col] += value * x[row]` over every stored nonzero
    ///
    /// Each nonzero is checked according to the matrix's protection mode
    /// before it contributes. Single-bit errors are repaired in place and
    /// listed in the returned report. The kernel is sequential because
    /// several nonzeros may accumulate into the same output slot.
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if `x` or `y` does not have length `n`
    /// - `ConstraintViolated` if a structural check fails (constraints mode)
    /// - `Uncorrectable` if an ECC check detects an unrepairable error
    /// - `IndexOutOfBounds` if an unprotected index was corrupted out of range
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

        let kernel = self.mode.kernel();
        let layout = SparseFormat::Coo.layout();
        let mut report = SpmvReport::default();

        y.fill(0.0);

        for index in 0..self.elements.len() {
            if kernel.check_constraints {
                abft::check_coo_element(&self.elements, index, n)?;
            }

            let mut codeword = self.elements[index].codeword();
            match (kernel.decode)(&mut codeword, layout) {
                Ok(ElementState::Clean) => {}
                Ok(ElementState::Corrected { bit }) => {
                    tracing::warn!(index, bit, "corrected single-bit error in COO element");
                    self.elements[index] = CooElement::from_codeword(&codeword);
                    report.corrections.push(Correction { index, bit });
                }
                Err(fault) => {
                    tracing::error!(index, %fault, "uncorrectable error in COO element");
                    return Err(Error::Uncorrectable { index, fault });
                }
            }

            let element = self.elements[index];
            let col = (element.col & kernel.column_mask) as usize;
            let row = element.row as usize;
            let xv = *x.get(row).ok_or(Error::IndexOutOfBounds { index: row, size: n })?;
            let slot = y
                .get_mut(col)
                .ok_or(Error::IndexOutOfBounds { index: col, size: n })?;
            *slot += element.value * xv;
        }

        Ok(report)
    }
}
