//! Matrix file input

mod matrix_market;

pub use matrix_market::{Triplets, load_matrix_market, parse_matrix_market};
