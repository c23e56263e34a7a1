//! Spreading activation
//!
//! Seeds start at activation 1, every other node at 0. For each seed, one FIFO
//! pass visits the nodes reachable from it, each at most once per seed. A
//! visited non-seed node recomputes
//!
//! ```text
//! act(n) = decay * sum(weight(n, m) * act(m)) over the neighbors m of n
//! ```
//!
//! using the activations current at that moment, and keeps the value only if it
//! raises the node's activation. This is a single bounded pass per seed, not an
//! iteration to a fixed point.

use crate::storage::{ConceptGraph, NodeId};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use tracing::debug;

/// Default decay applied per activation hop
pub const DEFAULT_DECAY: f32 = 0.8;

/// Spread activation from `seeds` through the graph
///
/// # Arguments
///
/// * `graph` - Concept graph
/// * `seeds` - Seed nodes (ids absent from the graph are ignored)
/// * `decay` - Multiplier applied to each recomputed activation
///
/// # Returns
///
/// Activation of every graph node. Activations never decrease during the pass.
///
/// # Example
///
/// ```
/// use concept_graph::{spreading_activation, ConceptGraph, NodeId};
///
/// let graph = ConceptGraph::from_edges([(NodeId(1), NodeId(2), "IsA", 0.5)]);
/// let act = spreading_activation(&graph, &[NodeId(1)], 0.8);
///
/// assert_eq!(act[&NodeId(1)], 1.0);
/// assert!((act[&NodeId(2)] - 0.4).abs() < 1e-6);
/// ```
#[must_use]
pub fn spreading_activation(
    graph: &ConceptGraph,
    seeds: &[NodeId],
    decay: f32,
) -> BTreeMap<NodeId, f32> {
    let seed_set: BTreeSet<NodeId> = seeds.iter().copied().filter(|&s| graph.has_node(s)).collect();
    let mut activation: BTreeMap<NodeId, f32> = graph
        .nodes()
        .map(|node| (node, if seed_set.contains(&node) { 1.0 } else { 0.0 }))
        .collect();

    for &seed in &seed_set {
        let mut visited = HashSet::from([seed]);
        let mut queue = VecDeque::new();
        for (neighbor, _) in graph.edges_of(seed) {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }

        while let Some(node) = queue.pop_front() {
            let mut incoming = 0.0;
            for (neighbor, rel) in graph.edges_of(node) {
                incoming += rel.weight * activation.get(&neighbor).copied().unwrap_or(0.0);
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }

            if !seed_set.contains(&node) {
                let updated = decay * incoming;
                if let Some(current) = activation.get_mut(&node) {
                    if updated > *current {
                        *current = updated;
                    }
                }
            }
        }
    }

    debug!(seeds = seed_set.len(), nodes = activation.len(), decay, "spread activation");
    activation
}
