//! Input validation shared by COO and CSR construction

use crate::abft::ProtectionMode;
use crate::ecc::MAX_DIMENSION;
use crate::error::{Error, Result};

/// Validate triplet arrays before they are packed into protected storage
///
/// Checks equal lengths, that every index is below `n`, and that `n` fits
/// the column field when the mode stores ECC bits there.
pub(crate) fn validate_triplets(
    columns: &[u32],
    rows: &[u32],
    values: &[f64],
    n: usize,
    mode: ProtectionMode,
) -> Result<()> {
    let nnz = values.len();
    if columns.len() != nnz {
        return Err(Error::shape_mismatch(nnz, columns.len()));
    }
    if rows.len() != nnz {
        return Err(Error::shape_mismatch(nnz, rows.len()));
    }

    if mode.is_ecc() && n > MAX_DIMENSION {
        return Err(Error::DimensionTooLarge {
            n,
            max: MAX_DIMENSION,
            mode: mode.name(),
        });
    }
    if n > u32::MAX as usize {
        return Err(Error::DimensionTooLarge {
            n,
            max: u32::MAX as usize,
            mode: mode.name(),
        });
    }

    for (&row, &col) in rows.iter().zip(columns) {
        if row as usize >= n {
            return Err(Error::IndexOutOfBounds {
                index: row as usize,
                size: n,
            });
        }
        if col as usize >= n {
            return Err(Error::IndexOutOfBounds {
                index: col as usize,
                size: n,
            });
        }
    }
    Ok(())
}
