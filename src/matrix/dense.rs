//! Dense matrix kernel
//!
//! Owned row-major `f32` buffer with an explicit shape. Every algebraic operation
//! checks shapes first and reports [`GraphError::DimensionMismatch`] instead of
//! reading out of bounds.
//!
//! # Layout
//!
//! ```text
//! 2x3 matrix          data (row-major, stride = cols)
//! | a b c |           [a, b, c, d, e, f]
//! | d e f |            ^row 0   ^row 1
//! ```

use crate::error::{GraphError, Result};
use crate::storage::NodeId;
use std::collections::HashMap;
use std::ops::{Index, IndexMut};

/// Dense `rows x cols` matrix of `f32`
///
/// `Clone` is a deep copy.
///
/// # Example
///
/// ```
/// use concept_graph::DenseMatrix;
///
/// let a = DenseMatrix::from_rows(vec![vec![2.0, 0.0], vec![0.0, 4.0]]).unwrap();
/// let inv = a.invert().unwrap();
/// assert_eq!(inv[(0, 0)], 0.5);
/// assert_eq!(inv[(1, 1)], 0.25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl DenseMatrix {
    /// Create a `rows x cols` matrix of zeros
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create the `n x n` identity matrix
    #[must_use]
    pub fn identity(n: usize) -> Self {
        let mut mat = Self::zeros(n, n);
        for i in 0..n {
            mat.data[i * n + i] = 1.0;
        }
        mat
    }

    /// Build a matrix from row vectors
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the rows have different lengths
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(nrows * ncols);

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != ncols {
                return Err(GraphError::dimension_mismatch(
                    "from_rows",
                    (i, row.len()),
                    (nrows, ncols),
                ));
            }
            data.extend(row);
        }

        Ok(Self {
            rows: nrows,
            cols: ncols,
            data,
        })
    }

    /// Number of rows
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as (rows, cols)
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Check whether the matrix is square
    #[must_use]
    pub const fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Value at (row, col), `None` if out of bounds
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        (row < self.rows && col < self.cols).then(|| self.data[row * self.cols + col])
    }

    /// Store a value at (row, col)
    ///
    /// Returns `false` (and changes nothing) if out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: f32) -> bool {
        if row < self.rows && col < self.cols {
            self.data[row * self.cols + col] = value;
            true
        } else {
            false
        }
    }

    /// One row as a slice, `None` if out of bounds
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[f32]> {
        (row < self.rows).then(|| &self.data[row * self.cols..(row + 1) * self.cols])
    }

    /// Row-major backing buffer
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Matrix product `self * other`
    ///
    /// Classic triple loop with row-major accumulation, O(m·k·n).
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` unless `self.cols() == other.rows()`
    pub fn product(&self, other: &Self) -> Result<Self> {
        if self.cols != other.rows {
            return Err(GraphError::dimension_mismatch(
                "product",
                self.shape(),
                other.shape(),
            ));
        }

        let n = other.cols;
        let mut out = Self::zeros(self.rows, n);
        if n == 0 {
            return Ok(out);
        }

        for (lhs, dst) in self
            .data
            .chunks_exact(self.cols.max(1))
            .zip(out.data.chunks_exact_mut(n))
        {
            for (k, &a) in lhs.iter().enumerate() {
                let rhs = &other.data[k * n..(k + 1) * n];
                for (d, &b) in dst.iter_mut().zip(rhs) {
                    *d += a * b;
                }
            }
        }

        Ok(out)
    }

    /// Matrix power `self^p` for `p >= 1`
    ///
    /// Computed as `p - 1` successive products against the original matrix.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for `p == 0` and `DimensionMismatch` for a
    /// non-square matrix
    pub fn power(&self, p: u32) -> Result<Self> {
        if p == 0 {
            return Err(GraphError::invalid_parameter("matrix power must be >= 1"));
        }
        if !self.is_square() {
            return Err(GraphError::dimension_mismatch(
                "power",
                self.shape(),
                self.shape(),
            ));
        }

        let mut result = self.clone();
        for _ in 1..p {
            result = result.product(self)?;
        }
        Ok(result)
    }

    /// Multiply every element by `scalar` in place
    pub fn scale(&mut self, scalar: f32) {
        for value in &mut self.data {
            *value *= scalar;
        }
    }

    /// Element-wise `self -= other` in place
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the shapes differ (`self` is left untouched)
    pub fn subtract_assign(&mut self, other: &Self) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(GraphError::dimension_mismatch(
                "subtract",
                self.shape(),
                other.shape(),
            ));
        }

        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a -= b;
        }
        Ok(())
    }

    /// Matrix inverse via Gauss-Jordan elimination with partial pivoting
    ///
    /// Works on an augmented `[A | I]` buffer: forward elimination top to bottom
    /// (pivot = largest absolute value remaining in the column), then
    /// back-substitution bottom to top. `self` is never modified.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` for a non-square matrix and `SingularMatrix`
    /// when a column has no nonzero pivot candidate
    pub fn invert(&self) -> Result<Self> {
        if !self.is_square() {
            return Err(GraphError::dimension_mismatch(
                "invert",
                self.shape(),
                self.shape(),
            ));
        }

        let n = self.rows;
        let width = 2 * n;
        let mut aug = vec![0.0_f32; n * width];
        for i in 0..n {
            aug[i * width..i * width + n].copy_from_slice(&self.data[i * n..(i + 1) * n]);
            aug[i * width + n + i] = 1.0;
        }

        // Forward elimination
        for col in 0..n {
            let mut pivot_row = col;
            let mut max_abs = aug[col * width + col].abs();
            for row in col + 1..n {
                let candidate = aug[row * width + col].abs();
                if candidate > max_abs {
                    max_abs = candidate;
                    pivot_row = row;
                }
            }

            if max_abs.is_nan() || max_abs <= 0.0 {
                return Err(GraphError::SingularMatrix { column: col });
            }

            if pivot_row != col {
                for j in 0..width {
                    aug.swap(col * width + j, pivot_row * width + j);
                }
            }

            let pivot = aug[col * width + col];
            for value in &mut aug[col * width + col..(col + 1) * width] {
                *value /= pivot;
            }

            for row in col + 1..n {
                let (upper, lower) = aug.split_at_mut(row * width);
                let pivot_slice = &upper[col * width..(col + 1) * width];
                eliminate(&mut lower[..width], pivot_slice, col);
            }
        }

        // Back-substitution
        for col in (1..n).rev() {
            for row in (0..col).rev() {
                let (upper, lower) = aug.split_at_mut(col * width);
                let pivot_slice = &lower[..width];
                eliminate(&mut upper[row * width..(row + 1) * width], pivot_slice, col);
            }
        }

        let mut inverse = Self::zeros(n, n);
        for (dst, src) in inverse
            .data
            .chunks_exact_mut(n.max(1))
            .zip(aug.chunks_exact(width.max(1)))
        {
            dst.copy_from_slice(&src[n..]);
        }

        Ok(inverse)
    }

    /// Element-wise comparison within an absolute tolerance
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f32) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

/// `target -= pivot * target[col]` over columns `col..`
fn eliminate(target: &mut [f32], pivot: &[f32], col: usize) {
    let factor = target[col];
    if factor == 0.0 {
        return;
    }
    for (t, &p) in target[col..].iter_mut().zip(&pivot[col..]) {
        *t -= p * factor;
    }
}

impl Index<(usize, usize)> for DenseMatrix {
    type Output = f32;

    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        assert!(row < self.rows && col < self.cols, "index ({row}, {col}) out of bounds");
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for DenseMatrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f32 {
        assert!(row < self.rows && col < self.cols, "index ({row}, {col}) out of bounds");
        &mut self.data[row * self.cols + col]
    }
}

/// Square dense matrix whose rows/columns are labeled with node ids
///
/// Row/column `i` corresponds to `ids()[i]`; the assignment is fixed when the
/// matrix is extracted from a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMatrix {
    ids: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    matrix: DenseMatrix,
}

impl NodeMatrix {
    /// Label a square matrix with node ids
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` unless the matrix is `ids.len() x ids.len()`
    pub fn new(ids: Vec<NodeId>, matrix: DenseMatrix) -> Result<Self> {
        if matrix.shape() != (ids.len(), ids.len()) {
            return Err(GraphError::dimension_mismatch(
                "label",
                matrix.shape(),
                (ids.len(), ids.len()),
            ));
        }

        Ok(Self::labeled(ids, matrix))
    }

    pub(crate) fn labeled(ids: Vec<NodeId>, matrix: DenseMatrix) -> Self {
        debug_assert_eq!(matrix.shape(), (ids.len(), ids.len()));
        let index = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        Self { ids, index, matrix }
    }

    /// Node id of every row/column, in index order
    #[must_use]
    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    /// Underlying matrix
    #[must_use]
    pub const fn matrix(&self) -> &DenseMatrix {
        &self.matrix
    }

    /// Underlying matrix, mutable (shape changes are not possible through `&mut`)
    pub fn matrix_mut(&mut self) -> &mut DenseMatrix {
        &mut self.matrix
    }

    /// Split into ids and matrix
    #[must_use]
    pub fn into_parts(self) -> (Vec<NodeId>, DenseMatrix) {
        (self.ids, self.matrix)
    }

    /// Dimensionality (number of labeled nodes)
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check whether the matrix has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Row/column index of a node
    #[must_use]
    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.index.get(&node).copied()
    }

    /// Row of a node
    ///
    /// # Errors
    ///
    /// Returns `UnknownNode` if the node has no row
    pub fn row_of(&self, node: NodeId) -> Result<&[f32]> {
        self.index_of(node)
            .and_then(|i| self.matrix.row(i))
            .ok_or(GraphError::UnknownNode(node))
    }

    /// Value at (`from`, `to`), `None` if either node is unknown
    #[must_use]
    pub fn value(&self, from: NodeId, to: NodeId) -> Option<f32> {
        let row = self.index_of(from)?;
        let col = self.index_of(to)?;
        self.matrix.get(row, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mat(rows: &[&[f32]]) -> DenseMatrix {
        DenseMatrix::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn test_identity() {
        let id = DenseMatrix::identity(3);
        assert_eq!(id.shape(), (3, 3));
        assert_eq!(id[(0, 0)], 1.0);
        assert_eq!(id[(1, 2)], 0.0);
        assert_eq!(id[(2, 2)], 1.0);
    }

    #[test]
    fn test_get_set_bounds() {
        let mut m = DenseMatrix::zeros(2, 3);

        assert!(m.set(1, 2, 5.0));
        assert!(!m.set(2, 0, 1.0));
        assert_eq!(m.get(1, 2), Some(5.0));
        assert_eq!(m.get(0, 3), None);
        assert_eq!(m.row(1), Some(&[0.0, 0.0, 5.0][..]));
    }

    #[test]
    fn test_from_rows_ragged() {
        let err = DenseMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, GraphError::DimensionMismatch { op: "from_rows", .. }));
    }

    #[test]
    fn test_product_rectangular() {
        let a = mat(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let b = mat(&[&[7.0, 8.0], &[9.0, 10.0], &[11.0, 12.0]]);

        let c = a.product(&b).unwrap();

        assert_eq!(c, mat(&[&[58.0, 64.0], &[139.0, 154.0]]));
    }

    #[test]
    fn test_product_dimension_mismatch() {
        let a = DenseMatrix::zeros(2, 3);
        let b = DenseMatrix::zeros(2, 3);

        let err = a.product(&b).unwrap_err();
        assert_eq!(err, GraphError::dimension_mismatch("product", (2, 3), (2, 3)));
    }

    #[test]
    fn test_power() {
        let a = mat(&[&[1.0, 1.0], &[0.0, 1.0]]);

        assert_eq!(a.power(1).unwrap(), a.clone());
        assert_eq!(a.power(2).unwrap(), a.product(&a).unwrap());
        assert_eq!(a.power(5).unwrap(), mat(&[&[1.0, 5.0], &[0.0, 1.0]]));
    }

    #[test]
    fn test_power_zero_rejected() {
        let a = DenseMatrix::identity(2);
        assert!(matches!(a.power(0), Err(GraphError::InvalidParameter { .. })));
        assert!(DenseMatrix::zeros(2, 3).power(2).is_err());
    }

    #[test]
    fn test_scale_and_subtract() {
        let mut a = mat(&[&[1.0, 2.0], &[3.0, 4.0]]);
        a.scale(2.0);
        a.subtract_assign(&DenseMatrix::identity(2)).unwrap();

        assert_eq!(a, mat(&[&[1.0, 4.0], &[6.0, 7.0]]));
        assert!(a.subtract_assign(&DenseMatrix::identity(3)).is_err());
        assert_eq!(a, mat(&[&[1.0, 4.0], &[6.0, 7.0]]));
    }

    #[test]
    fn test_invert_known() {
        let a = mat(&[&[4.0, 7.0], &[2.0, 6.0]]);
        let inv = a.invert().unwrap();

        let expected = mat(&[&[0.6, -0.7], &[-0.2, 0.4]]);
        assert!(inv.approx_eq(&expected, 1e-5), "{inv:?}");
    }

    #[test]
    fn test_invert_requires_row_swap() {
        let a = mat(&[&[0.0, 1.0], &[1.0, 0.0]]);
        let inv = a.invert().unwrap();
        assert!(inv.approx_eq(&a, 1e-6));
    }

    #[test]
    fn test_product_with_inverse_is_identity() {
        let a = mat(&[&[2.0, -1.0, 0.0], &[-1.0, 2.0, -1.0], &[0.0, -1.0, 2.0]]);
        let inv = a.invert().unwrap();

        let id = a.product(&inv).unwrap();
        assert!(id.approx_eq(&DenseMatrix::identity(3), 1e-5), "{id:?}");
    }

    #[test]
    fn test_invert_singular_zero() {
        let a = DenseMatrix::zeros(2, 2);
        assert_eq!(a.invert(), Err(GraphError::SingularMatrix { column: 0 }));
        assert_eq!(a, DenseMatrix::zeros(2, 2));
    }

    #[test]
    fn test_invert_singular_rank_deficient() {
        let a = mat(&[&[1.0, 2.0], &[2.0, 4.0]]);
        assert_eq!(a.invert(), Err(GraphError::SingularMatrix { column: 1 }));
    }

    #[test]
    fn test_invert_non_square() {
        assert!(matches!(
            DenseMatrix::zeros(2, 3).invert(),
            Err(GraphError::DimensionMismatch { op: "invert", .. })
        ));
    }

    #[test]
    fn test_invert_empty() {
        let inv = DenseMatrix::zeros(0, 0).invert().unwrap();
        assert_eq!(inv.shape(), (0, 0));
    }

    #[test]
    fn test_node_matrix_lookup() {
        let ids = vec![NodeId(11), NodeId(12)];
        let m = NodeMatrix::new(ids, mat(&[&[0.0, 0.4], &[0.4, 0.0]])).unwrap();

        assert_eq!(m.index_of(NodeId(12)), Some(1));
        assert_eq!(m.value(NodeId(11), NodeId(12)), Some(0.4));
        assert_eq!(m.row_of(NodeId(12)).unwrap(), &[0.4, 0.0]);
        assert_eq!(m.row_of(NodeId(99)), Err(GraphError::UnknownNode(NodeId(99))));
    }

    #[test]
    fn test_node_matrix_shape_check() {
        let err = NodeMatrix::new(vec![NodeId(1)], DenseMatrix::zeros(2, 2)).unwrap_err();
        assert!(matches!(err, GraphError::DimensionMismatch { .. }));
    }
}
