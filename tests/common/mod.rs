//! Common test utilities
#![allow(dead_code)]

use abft::abft::ProtectionMode;
use abft::sparse::{SparseFormat, SparseMatrix};

/// Both storage formats
pub const FORMATS: [SparseFormat; 2] = [SparseFormat::Coo, SparseFormat::Csr];

/// Initialize test logging once; later calls are no-ops
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Sorted triplets `(columns, rows, values)` of the 1D Laplacian: diag=2, off-diag=-1
pub fn laplacian_1d(n: usize) -> (Vec<u32>, Vec<u32>, Vec<f64>) {
    let mut columns = Vec::new();
    let mut rows = Vec::new();
    let mut values = Vec::new();
    for i in 0..n as u32 {
        if i > 0 {
            rows.push(i);
            columns.push(i - 1);
            values.push(-1.0);
        }
        rows.push(i);
        columns.push(i);
        values.push(2.0);
        if (i as usize) < n - 1 {
            rows.push(i);
            columns.push(i + 1);
            values.push(-1.0);
        }
    }
    (columns, rows, values)
}

/// Build the 1D Laplacian in the given format and mode
pub fn laplacian_matrix(n: usize, format: SparseFormat, mode: ProtectionMode) -> SparseMatrix {
    let (columns, rows, values) = laplacian_1d(n);
    SparseMatrix::new(format, &columns, &rows, &values, n, mode)
        .expect("laplacian construction should succeed")
}

/// Dense reference `A x` for sorted triplets of a symmetric matrix
pub fn dense_spmv(columns: &[u32], rows: &[u32], values: &[f64], x: &[f64]) -> Vec<f64> {
    let mut y = vec![0.0; x.len()];
    for ((&col, &row), &value) in columns.iter().zip(rows).zip(values) {
        y[row as usize] += value * x[col as usize];
    }
    y
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}
