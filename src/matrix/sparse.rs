//! Sparse matrix kernel
//!
//! Row-major map of maps: only stored cells consume memory, absent cells read as
//! the matrix default (normally `0.0`). Row and column indices are `u32`; for
//! matrices extracted from a graph they are the node ids themselves.
//!
//! ```text
//! rows: 11 -> {12: 0.4, 13: 0.1}
//!       12 -> {11: 0.4, 13: 0.2}
//!       13 -> {11: 0.1, 12: 0.2}
//! ```
//!
//! Row and column cursors are ordinary iterators ([`SparseMatrix::rows`],
//! [`Row::iter`]); calling them again restarts the pass. The algebra
//! (`product`, `power`, `subtract_assign`, `invert`) treats absent cells as zero
//! regardless of the configured default.

use crate::error::{GraphError, Result};
use crate::matrix::DenseMatrix;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One sparse row: column index -> value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cols: BTreeMap<u32, f32>,
    default: f32,
}

impl Row {
    /// Create an empty row whose absent cells read as `default`
    #[must_use]
    pub fn new(default: f32) -> Self {
        Self {
            cols: BTreeMap::new(),
            default,
        }
    }

    /// Value at `col`, or the row default if the cell is absent
    #[must_use]
    pub fn get(&self, col: u32) -> f32 {
        self.exists(col).unwrap_or(self.default)
    }

    /// Stored value at `col`, if any
    #[must_use]
    pub fn exists(&self, col: u32) -> Option<f32> {
        self.cols.get(&col).copied()
    }

    /// Store a value
    pub fn set(&mut self, col: u32, value: f32) {
        self.cols.insert(col, value);
    }

    /// Remove a stored value
    pub fn remove(&mut self, col: u32) -> Option<f32> {
        self.cols.remove(&col)
    }

    /// Number of stored cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.cols.len()
    }

    /// Check whether the row stores no cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }

    /// Largest stored column index
    #[must_use]
    pub fn max_col_index(&self) -> Option<u32> {
        self.cols.keys().next_back().copied()
    }

    /// Iterate over stored (column, value) cells in column order
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.cols.iter().map(|(&c, &v)| (c, v))
    }

    /// Iterate over stored cells with mutable access to the values
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut f32)> + '_ {
        self.cols.iter_mut().map(|(&c, v)| (c, v))
    }
}

/// Sparse matrix: row index -> [`Row`]
///
/// # Example
///
/// ```
/// use concept_graph::SparseMatrix;
///
/// let mut m = SparseMatrix::new();
/// m.set(1, 2, 0.5);
/// m.set(2, 1, 0.5);
///
/// let sq = m.product(&m);
/// assert_eq!(sq.exists(1, 1), Some(0.25));
/// assert_eq!(sq.exists(1, 2), None);
/// assert_eq!(sq.get(1, 2), 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseMatrix {
    rows: BTreeMap<u32, Row>,
    default: f32,
}

impl SparseMatrix {
    /// Create an empty matrix with default `0.0`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty matrix whose absent cells read as `default`
    #[must_use]
    pub fn with_default(default: f32) -> Self {
        Self {
            rows: BTreeMap::new(),
            default,
        }
    }

    /// Value returned for absent cells
    #[must_use]
    pub const fn default_value(&self) -> f32 {
        self.default
    }

    /// Create the `n x n` identity over indices `0..n`
    #[must_use]
    pub fn identity(n: u32) -> Self {
        Self::identity_over(0..n)
    }

    /// Create an identity whose diagonal sits on the given indices
    pub fn identity_over(indices: impl IntoIterator<Item = u32>) -> Self {
        let mut mat = Self::new();
        for i in indices {
            mat.set(i, i, 1.0);
        }
        mat
    }

    /// Convert a dense matrix, keeping nonzero cells at their natural indices
    #[must_use]
    pub fn from_dense(dense: &DenseMatrix) -> Self {
        let mut mat = Self::new();
        for r in 0..dense.rows() {
            if let Some(row) = dense.row(r) {
                for (c, &value) in row.iter().enumerate() {
                    if value != 0.0 {
                        #[allow(clippy::cast_possible_truncation)] // Indices come from u32 ids
                        let (r, c) = (r as u32, c as u32);
                        mat.set(r, c, value);
                    }
                }
            }
        }
        mat
    }

    /// Densify over an explicit index list: row/column `i` is `indices[i]`
    ///
    /// Stored cells outside `indices` are dropped.
    #[must_use]
    pub fn to_dense_over(&self, indices: &[u32]) -> DenseMatrix {
        let position: HashMap<u32, usize> =
            indices.iter().enumerate().map(|(i, &idx)| (idx, i)).collect();
        let mut dense = DenseMatrix::zeros(indices.len(), indices.len());

        for (r, c, value) in self.iter() {
            if let (Some(&i), Some(&j)) = (position.get(&r), position.get(&c)) {
                dense[(i, j)] = value;
            }
        }

        dense
    }

    /// Store a value
    pub fn set(&mut self, row: u32, col: u32, value: f32) {
        let default = self.default;
        self.rows
            .entry(row)
            .or_insert_with(|| Row::new(default))
            .set(col, value);
    }

    /// Value at (row, col), or the default if the cell is absent
    #[must_use]
    pub fn get(&self, row: u32, col: u32) -> f32 {
        self.exists(row, col).unwrap_or(self.default)
    }

    /// Stored value at (row, col), if any
    #[must_use]
    pub fn exists(&self, row: u32, col: u32) -> Option<f32> {
        self.rows.get(&row)?.exists(col)
    }

    /// Stored row, if any
    #[must_use]
    pub fn row(&self, row: u32) -> Option<&Row> {
        self.rows.get(&row)
    }

    /// Stored row with mutable access, if any
    pub fn row_mut(&mut self, row: u32) -> Option<&mut Row> {
        self.rows.get_mut(&row)
    }

    /// Get or create a row
    pub fn add_row(&mut self, row: u32) -> &mut Row {
        let default = self.default;
        self.rows.entry(row).or_insert_with(|| Row::new(default))
    }

    /// Remove a whole row
    pub fn delete_row(&mut self, row: u32) -> Option<Row> {
        self.rows.remove(&row)
    }

    /// Remove a column from every row
    pub fn delete_col(&mut self, col: u32) {
        for row in self.rows.values_mut() {
            row.remove(col);
        }
    }

    /// Remove every row
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Number of stored rows
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of stored cells
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.rows.values().map(Row::len).sum()
    }

    /// Check whether no cells are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.values().all(Row::is_empty)
    }

    /// Largest stored row index
    #[must_use]
    pub fn max_row_index(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// Largest stored column index over all rows
    #[must_use]
    pub fn max_col_index(&self) -> Option<u32> {
        self.rows.values().filter_map(Row::max_col_index).max()
    }

    /// Iterate over stored rows in index order
    pub fn rows(&self) -> impl Iterator<Item = (u32, &Row)> + '_ {
        self.rows.iter().map(|(&r, row)| (r, row))
    }

    /// Iterate over stored rows with mutable access
    pub fn rows_mut(&mut self) -> impl Iterator<Item = (u32, &mut Row)> + '_ {
        self.rows.iter_mut().map(|(&r, row)| (r, row))
    }

    /// Iterate over every stored (row, col, value) cell, row-major
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, f32)> + '_ {
        self.rows()
            .flat_map(|(r, row)| row.iter().map(move |(c, v)| (r, c, v)))
    }

    /// Sorted union of all row indices and stored column indices
    #[must_use]
    pub fn indices(&self) -> Vec<u32> {
        let mut indices: BTreeSet<u32> = self.rows.keys().copied().collect();
        indices.extend(self.iter().map(|(_, c, _)| c));
        indices.into_iter().collect()
    }

    /// Matrix product `self * other`
    ///
    /// Visits only the stored cells of each left row and the stored cells of the
    /// matching right rows. Cells that sum to exactly zero are not stored.
    #[must_use]
    pub fn product(&self, other: &Self) -> Self {
        let mut out = Self::with_default(self.default);

        for (r, row) in self.rows() {
            let mut acc: BTreeMap<u32, f32> = BTreeMap::new();
            for (k, a) in row.iter() {
                if let Some(rhs) = other.rows.get(&k) {
                    for (c, b) in rhs.iter() {
                        *acc.entry(c).or_insert(0.0) += a * b;
                    }
                }
            }
            for (c, value) in acc {
                if value != 0.0 {
                    out.set(r, c, value);
                }
            }
        }

        out
    }

    /// Matrix power `self^p` for `p >= 1`, as successive products against `self`
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for `p == 0`
    pub fn power(&self, p: u32) -> Result<Self> {
        if p == 0 {
            return Err(GraphError::invalid_parameter("matrix power must be >= 1"));
        }

        let mut result = self.clone();
        for _ in 1..p {
            result = result.product(self);
        }
        Ok(result)
    }

    /// Multiply every stored cell by `scalar` in place
    pub fn scale(&mut self, scalar: f32) {
        for row in self.rows.values_mut() {
            for (_, value) in row.iter_mut() {
                *value *= scalar;
            }
        }
    }

    /// Element-wise `self -= other` in place
    pub fn subtract_assign(&mut self, other: &Self) {
        for (r, c, b) in other.iter() {
            let a = self.exists(r, c).unwrap_or(0.0);
            self.set(r, c, a - b);
        }
    }

    /// Matrix inverse over the matrix's own index set
    ///
    /// The sorted union of row and column indices is densified, inverted with the
    /// dense Gauss-Jordan kernel and converted back; indices keep their meaning.
    ///
    /// # Errors
    ///
    /// Returns `SingularMatrix` (with the offending *index*, not position) if the
    /// densified matrix is singular
    pub fn invert(&self) -> Result<Self> {
        let indices = self.indices();
        let inverse = self.to_dense_over(&indices).invert().map_err(|err| match err {
            GraphError::SingularMatrix { column } => GraphError::SingularMatrix {
                column: indices.get(column).map_or(column, |&idx| idx as usize),
            },
            other => other,
        })?;

        let mut out = Self::with_default(self.default);
        for (i, &r) in indices.iter().enumerate() {
            if let Some(row) = inverse.row(i) {
                for (j, &value) in row.iter().enumerate() {
                    if value != 0.0 {
                        out.set(r, indices[j], value);
                    }
                }
            }
        }
        Ok(out)
    }
}
