//! Structural index constraints (ECC-free protection)
//!
//! Instead of redundant bits, constraints mode relies on invariants a
//! corrupted index is likely to break: every index lies inside the matrix
//! and nonzeros are sorted by `(row, col)` with no duplicates. Corruption
//! that preserves both goes unnoticed.

use thiserror::Error;

use crate::sparse::CooElement;

/// A structural invariant that does not hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConstraintViolation {
    /// Row index outside the matrix
    #[error("row size constraint violated at index {index} (row {row})")]
    RowBound {
        /// Position of the element in nonzero order
        index: usize,
        /// Offending row index
        row: u32,
    },

    /// Column index outside the matrix
    #[error("column size constraint violated at index {index} (column {col})")]
    ColumnBound {
        /// Position of the element in nonzero order
        index: usize,
        /// Offending column index
        col: u32,
    },

    /// Row index greater than the next element's row
    #[error("row index order violated at index {index}")]
    RowOrder {
        /// Position of the element in nonzero order
        index: usize,
    },

    /// Column index not strictly less than the next column in the same row
    #[error("column index order violated at index {index}")]
    ColumnOrder {
        /// Position of the element in nonzero order
        index: usize,
    },

    /// CSR row ends before it starts
    #[error("row order constraint violated for row {row}")]
    RowPointerOrder {
        /// Offending row
        row: usize,
    },

    /// CSR row extends past the stored non-zeros
    #[error("row size constraint violated for row {row}")]
    RowPointerBound {
        /// Offending row
        row: usize,
    },
}

/// Check element `index` of a COO matrix against bounds and its successor
#[inline]
pub fn check_coo_element(
    elements: &[CooElement],
    index: usize,
    n: usize,
) -> Result<(), ConstraintViolation> {
    let element = &elements[index];
    if element.row as usize >= n {
        return Err(ConstraintViolation::RowBound {
            index,
            row: element.row,
        });
    }
    if element.col as usize >= n {
        return Err(ConstraintViolation::ColumnBound {
            index,
            col: element.col,
        });
    }
    if let Some(next) = elements.get(index + 1) {
        if element.row > next.row {
            return Err(ConstraintViolation::RowOrder { index });
        }
        if element.row == next.row && element.col >= next.col {
            return Err(ConstraintViolation::ColumnOrder { index });
        }
    }
    Ok(())
}

/// Check every element of a COO matrix
pub fn check_coo(elements: &[CooElement], n: usize) -> Result<(), ConstraintViolation> {
    (0..elements.len()).try_for_each(|index| check_coo_element(elements, index, n))
}

/// Check the extent `[start, end)` of CSR row `row`
#[inline]
pub fn check_csr_row(
    row: usize,
    start: usize,
    end: usize,
    nnz: usize,
) -> Result<(), ConstraintViolation> {
    if end > nnz {
        return Err(ConstraintViolation::RowPointerBound { row });
    }
    if end < start {
        return Err(ConstraintViolation::RowPointerOrder { row });
    }
    Ok(())
}

/// Check column `k` of a CSR row against bounds and the next column
///
/// `first` is the nonzero index of `cols[0]`, used only for reporting.
#[inline]
pub fn check_csr_column(
    cols: &[u32],
    k: usize,
    first: usize,
    n: usize,
) -> Result<(), ConstraintViolation> {
    let col = cols[k];
    let index = first + k;
    if col as usize >= n {
        return Err(ConstraintViolation::ColumnBound { index, col });
    }
    if let Some(&next) = cols.get(k + 1) {
        if next <= col {
            return Err(ConstraintViolation::ColumnOrder { index });
        }
    }
    Ok(())
}

/// Check every row of a CSR matrix
pub fn check_csr(row_ptrs: &[u32], cols: &[u32], n: usize) -> Result<(), ConstraintViolation> {
    let nnz = cols.len();
    for (row, extent) in row_ptrs.windows(2).enumerate() {
        let (start, end) = (extent[0] as usize, extent[1] as usize);
        check_csr_row(row, start, end, nnz)?;
        let slice = &cols[start..end];
        (0..slice.len()).try_for_each(|k| check_csr_column(slice, k, start, n))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(row: u32, col: u32) -> CooElement {
        CooElement {
            col,
            row,
            value: 1.0,
        }
    }

    #[test]
    fn test_sorted_coo_passes() {
        let elements = [element(0, 0), element(0, 2), element(1, 1), element(3, 0)];
        assert_eq!(check_coo(&elements, 4), Ok(()));
    }

    #[test]
    fn test_coo_violations() {
        let elements = [element(0, 1), element(0, 1)];
        assert_eq!(
            check_coo(&elements, 4),
            Err(ConstraintViolation::ColumnOrder { index: 0 })
        );

        let elements = [element(2, 0), element(1, 3)];
        assert_eq!(
            check_coo(&elements, 4),
            Err(ConstraintViolation::RowOrder { index: 0 })
        );

        let elements = [element(0, 0), element(1, 9)];
        assert_eq!(
            check_coo(&elements, 4),
            Err(ConstraintViolation::ColumnBound { index: 1, col: 9 })
        );

        let elements = [element(5, 0)];
        assert_eq!(
            check_coo(&elements, 4),
            Err(ConstraintViolation::RowBound { index: 0, row: 5 })
        );
    }

    #[test]
    fn test_csr_violations() {
        // [1 0 1]
        // [0 1 0]
        // [1 1 0]
        let row_ptrs = [0u32, 2, 3, 5];
        let cols = [0u32, 2, 1, 0, 1];
        assert_eq!(check_csr(&row_ptrs, &cols, 3), Ok(()));

        let cols = [2u32, 0, 1, 0, 1];
        assert_eq!(
            check_csr(&row_ptrs, &cols, 3),
            Err(ConstraintViolation::ColumnOrder { index: 0 })
        );

        assert_eq!(
            check_csr_row(1, 3, 2, 5),
            Err(ConstraintViolation::RowPointerOrder { row: 1 })
        );
        assert_eq!(
            check_csr_row(2, 3, 6, 5),
            Err(ConstraintViolation::RowPointerBound { row: 2 })
        );
    }
}
