//! Matrix Market coordinate reader
//!
//! Reads the coordinate body of a symmetric `.mtx` file (lower or upper
//! triangle stored), mirrors it to the full matrix and tiles it along the
//! diagonal to build larger test problems.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};

/// Sorted triplet arrays ready for matrix construction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triplets {
    /// Matrix dimension
    pub n: usize,
    /// Row index of each nonzero, non-decreasing
    pub rows: Vec<u32>,
    /// Column index of each nonzero, increasing within a row
    pub columns: Vec<u32>,
    /// Value of each nonzero
    pub values: Vec<f64>,
}

impl Triplets {
    /// Number of stored nonzeros
    pub fn nnz(&self) -> usize {
        self.values.len()
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    row: u32,
    col: u32,
    value: f64,
}

/// Load a Matrix Market file and tile it `num_blocks` times along the diagonal
///
/// See [`parse_matrix_market`].
pub fn load_matrix_market(path: impl AsRef<Path>, num_blocks: usize) -> Result<Triplets> {
    let path = path.as_ref();
    let file = File::open(path)?;
    tracing::debug!(path = %path.display(), num_blocks, "loading matrix");
    parse_matrix_market(BufReader::new(file), num_blocks)
}

/// Parse Matrix Market coordinate data
///
/// Lines starting with `%` are skipped. The first remaining line is the size
/// header `rows cols nnz`; each following non-blank line is a 1-based entry
/// `i j value`. Every off-diagonal entry is mirrored, the block is sorted by
/// `(row, col)`, and copies are placed on the diagonal: copy `k` is offset by
/// `k * block_dim` in both row and column.
///
/// # Errors
///
/// - `InvalidArgument` if `num_blocks` is zero or the tiled dimension
///   overflows `u32`
/// - `NotSquare` if the header describes a rectangular matrix
/// - `Parse` for a missing header, malformed line, out-of-range index or
///   wrong entry count
/// - `Io` if the reader fails
pub fn parse_matrix_market<R: BufRead>(reader: R, num_blocks: usize) -> Result<Triplets> {
    if num_blocks == 0 {
        return Err(Error::invalid_argument("num_blocks", "must be at least 1"));
    }

    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| {
            line.as_ref()
                .map_or(true, |l| !l.starts_with('%') && !l.trim().is_empty())
        });

    let (line_no, header) = lines
        .next()
        .ok_or_else(|| Error::parse(1, "missing size header"))?;
    let header = header?;
    let header_line = line_no;
    let [height, width, input_nnz] = parse_header(&header, header_line)?;
    if height != width {
        return Err(Error::NotSquare {
            rows: height,
            cols: width,
        });
    }

    let block_dim = width;
    let n = block_dim
        .checked_mul(num_blocks)
        .filter(|&n| n <= u32::MAX as usize)
        .ok_or_else(|| {
            Error::invalid_argument(
                "num_blocks",
                format!("{num_blocks} blocks of {block_dim} overflow 32-bit indices"),
            )
        })?;

    let mut block = Vec::with_capacity(2 * input_nnz);
    let mut read = 0;
    for (line_no, line) in lines.by_ref().take(input_nnz) {
        let entry = parse_entry(&line?, line_no, block_dim)?;
        block.push(entry);
        if entry.row != entry.col {
            block.push(Entry {
                row: entry.col,
                col: entry.row,
                value: entry.value,
            });
        }
        read += 1;
    }
    if read != input_nnz {
        return Err(Error::parse(
            header_line,
            format!("header declares {input_nnz} entries, found {read}"),
        ));
    }

    block.sort_by(|a, b| (a.row, a.col).cmp(&(b.row, b.col)));

    let block_nnz = block.len();
    let mut triplets = Triplets {
        n,
        rows: Vec::with_capacity(block_nnz * num_blocks),
        columns: Vec::with_capacity(block_nnz * num_blocks),
        values: Vec::with_capacity(block_nnz * num_blocks),
    };
    for k in 0..num_blocks {
        let offset = (k * block_dim) as u32;
        for entry in &block {
            triplets.rows.push(entry.row + offset);
            triplets.columns.push(entry.col + offset);
            triplets.values.push(entry.value);
        }
    }

    tracing::debug!(n, nnz = triplets.nnz(), block_nnz, "parsed matrix");
    Ok(triplets)
}

fn parse_header(line: &str, line_no: usize) -> Result<[usize; 3]> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(Error::parse(
            line_no,
            format!("expected 'rows cols nnz', got '{line}'"),
        ));
    }
    let mut header = [0usize; 3];
    for (slot, field) in header.iter_mut().zip(&fields) {
        *slot = field
            .parse()
            .map_err(|_| Error::parse(line_no, format!("invalid size field '{field}'")))?;
    }
    Ok(header)
}

fn parse_entry(line: &str, line_no: usize, dim: usize) -> Result<Entry> {
    let mut fields = line.split_whitespace();
    let (Some(i), Some(j), Some(value)) = (fields.next(), fields.next(), fields.next()) else {
        return Err(Error::parse(
            line_no,
            format!("expected 'row col value', got '{line}'"),
        ));
    };

    let index = |field: &str| -> Result<u32> {
        let one_based: usize = field
            .parse()
            .map_err(|_| Error::parse(line_no, format!("invalid index '{field}'")))?;
        if one_based == 0 || one_based > dim {
            return Err(Error::parse(
                line_no,
                format!("index {one_based} outside 1..={dim}"),
            ));
        }
        Ok((one_based - 1) as u32)
    };
    let value = value
        .parse()
        .map_err(|_| Error::parse(line_no, format!("invalid value '{value}'")))?;

    Ok(Entry {
        row: index(i)?,
        col: index(j)?,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "\
%%MatrixMarket matrix coordinate real symmetric
% lower triangle of
% [4 1 0]
% [1 3 0]
% [0 0 2]
3 3 4
1 1 4.0
2 1 1.0
2 2 3.0
3 3 2.0
";

    #[test]
    fn test_parse_mirrors_and_sorts() {
        let t = parse_matrix_market(SMALL.as_bytes(), 1).unwrap();
        assert_eq!(t.n, 3);
        assert_eq!(t.rows, vec![0, 0, 1, 1, 2]);
        assert_eq!(t.columns, vec![0, 1, 0, 1, 2]);
        assert_eq!(t.values, vec![4.0, 1.0, 1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_parse_tiles_blocks() {
        let t = parse_matrix_market(SMALL.as_bytes(), 2).unwrap();
        assert_eq!(t.n, 6);
        assert_eq!(t.nnz(), 10);
        assert_eq!(&t.rows[5..], &[3, 3, 4, 4, 5]);
        assert_eq!(&t.columns[5..], &[3, 4, 3, 4, 5]);
    }

    #[test]
    fn test_parse_rejects_rectangular() {
        let err = parse_matrix_market("2 3 0\n".as_bytes(), 1).unwrap_err();
        assert!(matches!(err, Error::NotSquare { rows: 2, cols: 3 }));
    }

    #[test]
    fn test_parse_errors_name_line() {
        let err = parse_matrix_market("% c\n2 2 1\n1 x 1.0\n".as_bytes(), 1).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }));

        let err = parse_matrix_market("2 2 1\n3 1 1.0\n".as_bytes(), 1).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));

        let err = parse_matrix_market("2 2 2\n1 1 1.0\n".as_bytes(), 1).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));

        assert!(parse_matrix_market("".as_bytes(), 1).is_err());
        assert!(parse_matrix_market(SMALL.as_bytes(), 0).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_matrix_market("/nonexistent/matrix.mtx", 1).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
