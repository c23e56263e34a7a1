//! Bounded context extraction
//!
//! Both operations run one FIFO breadth-first pass from the seed with a visited
//! set: a node's score is fixed when it is first discovered and never revised by
//! a later discovery. They differ only in the scoring law:
//!
//! ```text
//! context_chain: score(child) = score(parent) * weight(parent, child)
//! context_dist:  score(child) = weight(parent, child) * exp(-(dist(child) - 1))
//! ```

use crate::storage::{ConceptGraph, NodeId};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// A node reached from the seed, with its BFS distance and score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextNode {
    /// Reached node
    pub node: NodeId,
    /// Hops from the seed (>= 1)
    pub dist: usize,
    /// Score under the operation's scoring law
    pub score: f32,
}

/// Context scored by the product of edge weights along the discovery path
///
/// # Arguments
///
/// * `graph` - Concept graph
/// * `seed` - Start node (excluded from the result)
/// * `max_dist` - Largest distance returned
///
/// # Returns
///
/// Nodes at distance `1..=max_dist`, by descending score, ties in discovery
/// order. Empty if `seed` is not in the graph.
///
/// # Example
///
/// ```
/// use concept_graph::{context_chain, ConceptGraph, NodeId};
///
/// let graph = ConceptGraph::from_edges([
///     (NodeId(11), NodeId(12), "IsA", 0.4),
///     (NodeId(12), NodeId(13), "IsA", 0.5),
/// ]);
///
/// let context = context_chain(&graph, NodeId(11), 2);
/// assert_eq!(context[1].node, NodeId(13));
/// assert!((context[1].score - 0.2).abs() < 1e-6);
/// ```
#[must_use]
pub fn context_chain(graph: &ConceptGraph, seed: NodeId, max_dist: usize) -> Vec<ContextNode> {
    let context = bfs_context(graph, seed, max_dist, |parent, weight| parent.score * weight);
    debug!(seed = %seed, max_dist, found = context.len(), "chained context");
    context
}

/// Context scored by the discovering edge's weight, decayed by distance
///
/// A node first reached at distance `d` over an edge of weight `w` scores
/// `w * exp(-(d - 1))`.
///
/// # Returns
///
/// Nodes at distance `1..=max_dist`, by descending score, ties in discovery
/// order. Empty if `seed` is not in the graph.
#[must_use]
pub fn context_dist(graph: &ConceptGraph, seed: NodeId, max_dist: usize) -> Vec<ContextNode> {
    #[allow(clippy::cast_precision_loss)]
    let context = bfs_context(graph, seed, max_dist, |parent, weight| {
        weight * (-(parent.dist as f32)).exp()
    });
    debug!(seed = %seed, max_dist, found = context.len(), "distance-decayed context");
    context
}

fn bfs_context<F>(graph: &ConceptGraph, seed: NodeId, max_dist: usize, score: F) -> Vec<ContextNode>
where
    F: Fn(&ContextNode, f32) -> f32,
{
    if !graph.has_node(seed) {
        return Vec::new();
    }

    let mut visited = HashSet::from([seed]);
    let mut frontier = VecDeque::from([ContextNode {
        node: seed,
        dist: 0,
        score: 1.0,
    }]);
    let mut found = Vec::new();

    while let Some(current) = frontier.pop_front() {
        if current.dist >= max_dist {
            continue;
        }

        for (neighbor, rel) in graph.edges_of(current.node) {
            if visited.insert(neighbor) {
                let child = ContextNode {
                    node: neighbor,
                    dist: current.dist + 1,
                    score: score(&current, rel.weight),
                };
                found.push(child);
                frontier.push_back(child);
            }
        }
    }

    // Stable sort keeps discovery order among equal scores
    found.sort_by(|a, b| b.score.total_cmp(&a.score));
    found
}
