//! Matrix kernels
//!
//! Two interchangeable representations of the same algebra:
//!
//! - [`DenseMatrix`]: row-major `Vec<f32>`, positional indices, Gauss-Jordan inverse
//! - [`SparseMatrix`]: map of rows keyed by (node) index, only stored cells cost memory
//!
//! Random walks over small query graphs use the dense form; walks over large
//! graphs use the sparse form, whose inverse densifies over the matrix's own
//! index set.

pub mod dense;
pub mod sparse;

pub use dense::{DenseMatrix, NodeMatrix};
pub use sparse::{Row, SparseMatrix};
