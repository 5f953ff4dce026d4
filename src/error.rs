//! Error types for abft

use crate::abft::{ConstraintViolation, UncorrectableFault};
use thiserror::Error;

/// Result type alias using abft's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, corrupting or multiplying a protected matrix
#[derive(Error, Debug)]
pub enum Error {
    /// A matrix element failed its ECC check and cannot be repaired
    #[error("Uncorrectable error at index {index}: {fault}")]
    Uncorrectable {
        /// Position of the element in nonzero order
        index: usize,
        /// What the decoder observed
        fault: UncorrectableFault,
    },

    /// A structural invariant checked in constraints mode does not hold
    #[error("Constraint violated: {0}")]
    ConstraintViolated(ConstraintViolation),

    /// Index out of bounds
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index
        index: usize,
        /// Size of the dimension
        size: usize,
    },

    /// CSR row pointers that do not describe a valid slice of the nonzeros
    #[error("Corrupt row pointers for row {row}: [{start}, {end}) with {nnz} non-zeros")]
    CorruptRowPointers {
        /// Row whose extent is invalid
        row: usize,
        /// Row start pointer
        start: usize,
        /// Row end pointer
        end: usize,
        /// Number of stored non-zeros
        nnz: usize,
    },

    /// Shape mismatch between operands
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        got: usize,
    },

    /// Matrix dimension exceeds what the column field can address under ECC
    #[error("Matrix dimension {n} exceeds {max} supported by mode {mode}")]
    DimensionTooLarge {
        /// Requested dimension
        n: usize,
        /// Largest supported dimension
        max: usize,
        /// Protection mode that imposes the limit
        mode: &'static str,
    },

    /// Matrix is not square
    #[error("Matrix is not square: {rows} x {cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// No context registered for the requested target/mode pair
    #[error("No implementation found for {target}-{mode}")]
    UnknownContext {
        /// Requested target
        target: String,
        /// Requested mode
        mode: String,
    },

    /// Unrecognised protection mode name
    #[error("Unknown protection mode '{0}'")]
    UnknownMode(String),

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Malformed matrix file
    #[error("Parse error on line {line}: {reason}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        reason: String,
    },

    /// I/O failure while reading a matrix file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: usize, got: usize) -> Self {
        Self::ShapeMismatch { expected, got }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }

    /// Returns true if the error was raised by corrupted matrix data during a
    /// multiply, as opposed to a configuration or input problem.
    pub fn is_data_corruption(&self) -> bool {
        matches!(
            self,
            Error::Uncorrectable { .. }
                | Error::ConstraintViolated(_)
                | Error::IndexOutOfBounds { .. }
                | Error::CorruptRowPointers { .. }
        )
    }
}

impl From<ConstraintViolation> for Error {
    fn from(violation: ConstraintViolation) -> Self {
        Error::ConstraintViolated(violation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corruption_classification() {
        let err = Error::Uncorrectable {
            index: 3,
            fault: UncorrectableFault::ParityMismatch,
        };
        assert!(err.is_data_corruption());
        assert!(err.to_string().contains("index 3"));

        let err = Error::from(ConstraintViolation::ColumnOrder { index: 7 });
        assert!(err.is_data_corruption());

        assert!(!Error::UnknownMode("sec9".into()).is_data_corruption());
        assert!(!Error::shape_mismatch(4, 3).is_data_corruption());
    }
}
