//! Adjacency extraction and random-walk proximity
//!
//! ```text
//! finite:   W = (1 - alpha) * alpha^steps * A^steps
//! infinite: W = (I - alpha * A)^-1 - I
//! ```
//!
//! `W[i][j]` approximates how strongly node `j` is reached from node `i` by a
//! decayed random walk. Every function comes in a dense flavour (indexed in the
//! graph's ascending node order, see [`NodeMatrix`]) and a sparse flavour
//! (indexed directly by node id).
//!
//! Matrices are fresh snapshots; nothing here writes back into the graph.

use crate::error::{GraphError, Result};
use crate::matrix::{DenseMatrix, NodeMatrix, SparseMatrix};
use crate::storage::{ConceptGraph, NodeId};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

fn check_alpha(alpha: f32) -> Result<()> {
    if alpha.is_finite() && (0.0..=1.0).contains(&alpha) {
        Ok(())
    } else {
        Err(GraphError::invalid_parameter(format!(
            "random-walk alpha must be in [0, 1], got {alpha}"
        )))
    }
}

fn finite_factor(alpha: f32, steps: u32) -> f32 {
    (1.0 - alpha) * alpha.powi(i32::try_from(steps).unwrap_or(i32::MAX))
}

/// Dense symmetric adjacency matrix, rows/columns in ascending node order
///
/// # Example
///
/// ```
/// use concept_graph::{adjacency_matrix, ConceptGraph, NodeId};
///
/// let graph = ConceptGraph::from_edges([(NodeId(7), NodeId(3), "IsA", 0.5)]);
/// let adj = adjacency_matrix(&graph);
///
/// assert_eq!(adj.ids(), &[NodeId(3), NodeId(7)]);
/// assert_eq!(adj.value(NodeId(3), NodeId(7)), Some(0.5));
/// assert_eq!(adj.value(NodeId(7), NodeId(3)), Some(0.5));
/// ```
#[must_use]
pub fn adjacency_matrix(graph: &ConceptGraph) -> NodeMatrix {
    let ids: Vec<NodeId> = graph.nodes().collect();
    let index: HashMap<NodeId, usize> = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
    let mut matrix = DenseMatrix::zeros(ids.len(), ids.len());

    for (a, b, rel) in graph.edges() {
        if let (Some(&i), Some(&j)) = (index.get(&a), index.get(&b)) {
            matrix[(i, j)] = rel.weight;
            matrix[(j, i)] = rel.weight;
        }
    }

    NodeMatrix::labeled(ids, matrix)
}

/// Sparse symmetric adjacency matrix indexed by node id
#[must_use]
pub fn adjacency_matrix_sparse(graph: &ConceptGraph) -> SparseMatrix {
    let mut matrix = SparseMatrix::new();
    for node in graph.nodes() {
        matrix.add_row(node.0);
    }
    for (a, b, rel) in graph.edges() {
        matrix.set(a.0, b.0, rel.weight);
        matrix.set(b.0, a.0, rel.weight);
    }
    matrix
}

/// Finite random-walk matrix `(1 - alpha) * alpha^steps * A^steps`
///
/// # Errors
///
/// Returns `InvalidParameter` if `alpha` is outside `[0, 1]` or `steps == 0`
pub fn finite_random_walk(graph: &ConceptGraph, alpha: f32, steps: u32) -> Result<NodeMatrix> {
    check_alpha(alpha)?;
    let (ids, adjacency) = adjacency_matrix(graph).into_parts();

    let mut walk = adjacency.power(steps)?;
    walk.scale(finite_factor(alpha, steps));

    debug!(nodes = ids.len(), alpha, steps, "finite random walk");
    Ok(NodeMatrix::labeled(ids, walk))
}

/// Sparse variant of [`finite_random_walk`]
///
/// # Errors
///
/// Returns `InvalidParameter` if `alpha` is outside `[0, 1]` or `steps == 0`
pub fn finite_random_walk_sparse(graph: &ConceptGraph, alpha: f32, steps: u32) -> Result<SparseMatrix> {
    check_alpha(alpha)?;

    let mut walk = adjacency_matrix_sparse(graph).power(steps)?;
    walk.scale(finite_factor(alpha, steps));

    debug!(nodes = graph.num_nodes(), cells = walk.nnz(), alpha, steps, "sparse finite random walk");
    Ok(walk)
}

/// Infinite random-walk matrix `(I - alpha * A)^-1 - I`
///
/// # Errors
///
/// Returns `InvalidParameter` if `alpha` is outside `[0, 1]`, and
/// `SingularMatrix` if `I - alpha * A` cannot be inverted
#[tracing::instrument(skip(graph), fields(nodes = graph.num_nodes()), level = "debug")]
pub fn infinite_random_walk(graph: &ConceptGraph, alpha: f32) -> Result<NodeMatrix> {
    check_alpha(alpha)?;
    let (ids, mut adjacency) = adjacency_matrix(graph).into_parts();
    let identity = DenseMatrix::identity(ids.len());

    adjacency.scale(alpha);
    let mut system = identity.clone();
    system.subtract_assign(&adjacency)?;

    let mut walk = system.invert()?;
    walk.subtract_assign(&identity)?;

    Ok(NodeMatrix::labeled(ids, walk))
}

/// Sparse variant of [`infinite_random_walk`]
///
/// # Errors
///
/// Returns `InvalidParameter` if `alpha` is outside `[0, 1]`, and
/// `SingularMatrix` (naming the offending node id) if `I - alpha * A` cannot be
/// inverted
#[tracing::instrument(skip(graph), fields(nodes = graph.num_nodes()), level = "debug")]
pub fn infinite_random_walk_sparse(graph: &ConceptGraph, alpha: f32) -> Result<SparseMatrix> {
    check_alpha(alpha)?;
    let identity = SparseMatrix::identity_over(graph.nodes().map(|n| n.0));

    let mut adjacency = adjacency_matrix_sparse(graph);
    adjacency.scale(alpha);
    let mut system = identity.clone();
    system.subtract_assign(&adjacency);

    let mut walk = system.invert()?;
    walk.subtract_assign(&identity);
    Ok(walk)
}

/// Sum the walk-matrix rows of the seeds into scores for non-seed nodes
///
/// Seeds without a row are ignored; nodes with zero total mass are left out.
#[must_use]
pub fn seed_scores(walk: &NodeMatrix, seeds: &[NodeId]) -> BTreeMap<NodeId, f32> {
    let seed_set: HashSet<NodeId> = seeds.iter().copied().collect();
    let mut scores = BTreeMap::new();

    for &seed in &seed_set {
        let Ok(row) = walk.row_of(seed) else {
            continue;
        };
        for (&node, &mass) in walk.ids().iter().zip(row) {
            if mass != 0.0 && !seed_set.contains(&node) {
                *scores.entry(node).or_insert(0.0) += mass;
            }
        }
    }

    scores.retain(|_, mass| *mass != 0.0);
    scores
}

/// Sparse variant of [`seed_scores`]; matrix indices are node ids
#[must_use]
pub fn seed_scores_sparse(walk: &SparseMatrix, seeds: &[NodeId]) -> BTreeMap<NodeId, f32> {
    let seed_set: HashSet<NodeId> = seeds.iter().copied().collect();
    let mut scores = BTreeMap::new();

    for &seed in &seed_set {
        let Some(row) = walk.row(seed.0) else {
            continue;
        };
        for (col, mass) in row.iter() {
            let node = NodeId(col);
            if mass != 0.0 && !seed_set.contains(&node) {
                *scores.entry(node).or_insert(0.0) += mass;
            }
        }
    }

    scores.retain(|_, mass| *mass != 0.0);
    scores
}
