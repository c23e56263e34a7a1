//! Bounded path enumeration
//!
//! Expands a FIFO frontier of partial paths from the source. A partial path is
//! extended by every neighbor not already on it; reaching the destination emits
//! the path and ends that branch. Each step is weighted by
//! `edge_weight * exp(-len)`, where `len` is the number of edges on the partial
//! path before the step.
//!
//! ```text
//! 11 --IsA--> 13                     (len 1)
//! 11 --IsA--> 12 --IsA--> 13         (len 2)
//! ```

use crate::storage::{ConceptGraph, NodeId};
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

/// One hop of a path: the node reached, the relation label and the step weight
#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    /// Node reached by this step
    pub node: NodeId,
    /// Label of the relation traversed (empty for the source step)
    pub label: String,
    /// Decayed weight of the step (1 for the source step)
    pub weight: f32,
}

/// A path from source to destination, starting with the source step
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConceptPath {
    steps: Vec<PathStep>,
}

impl ConceptPath {
    fn start(node: NodeId) -> Self {
        Self {
            steps: vec![PathStep {
                node,
                label: String::new(),
                weight: 1.0,
            }],
        }
    }

    fn extended(&self, node: NodeId, label: &str, weight: f32) -> Self {
        let mut path = self.clone();
        path.steps.push(PathStep {
            node,
            label: label.to_string(),
            weight,
        });
        path
    }

    fn contains(&self, node: NodeId) -> bool {
        self.steps.iter().any(|step| step.node == node)
    }

    fn last(&self) -> NodeId {
        self.steps.last().map_or(NodeId(0), |step| step.node)
    }

    /// Steps, source first
    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Node sequence, source first
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.steps.iter().map(|step| step.node)
    }

    /// Number of edges
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Check whether the path has no edges
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Product of the step weights
    #[must_use]
    pub fn weight(&self) -> f32 {
        self.steps.iter().map(|step| step.weight).product()
    }
}

impl fmt::Display for ConceptPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, "-{}->", step.label)?;
            }
            write!(f, "{}", step.node)?;
        }
        Ok(())
    }
}

/// Enumerate simple paths from `src` to `dst` with at most `max_len` edges
///
/// When `src == dst` the result holds cycles through the source.
///
/// # Returns
///
/// Every path found, in breadth-first order (shorter paths first). Empty if
/// `src` is not in the graph.
///
/// # Example
///
/// ```
/// use concept_graph::{paths, ConceptGraph, NodeId};
///
/// let graph = ConceptGraph::from_edges([
///     (NodeId(11), NodeId(12), "IsA", 0.4),
///     (NodeId(11), NodeId(13), "CapableOf", 0.1),
///     (NodeId(12), NodeId(13), "IsA", 0.2),
/// ]);
///
/// let found = paths(&graph, NodeId(11), NodeId(13), 2);
/// let rendered: Vec<String> = found.iter().map(ToString::to_string).collect();
/// assert_eq!(rendered, vec!["11-CapableOf->13", "11-IsA->12-IsA->13"]);
/// ```
#[must_use]
pub fn paths(graph: &ConceptGraph, src: NodeId, dst: NodeId, max_len: usize) -> Vec<ConceptPath> {
    let mut found = Vec::new();
    if !graph.has_node(src) {
        return found;
    }

    let mut frontier = VecDeque::from([ConceptPath::start(src)]);

    while let Some(path) = frontier.pop_front() {
        let len = path.len();
        if len >= max_len {
            continue;
        }

        #[allow(clippy::cast_precision_loss)]
        let decay = (-(len as f32)).exp();

        for (neighbor, rel) in graph.edges_of(path.last()) {
            let weight = rel.weight * decay;
            if neighbor == dst {
                found.push(path.extended(neighbor, &rel.label, weight));
            } else if !path.contains(neighbor) {
                frontier.push_back(path.extended(neighbor, &rel.label, weight));
            }
        }
    }

    debug!(src = %src, dst = %dst, max_len, found = found.len(), "enumerated paths");
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> ConceptGraph {
        ConceptGraph::from_edges([
            (NodeId(11), NodeId(12), "IsA", 0.4),
            (NodeId(11), NodeId(13), "CapableOf", 0.1),
            (NodeId(12), NodeId(13), "IsA", 0.2),
        ])
    }

    #[test]
    fn test_direct_and_indirect() {
        let found = paths(&sample_graph(), NodeId(11), NodeId(13), 2);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].nodes().collect::<Vec<_>>(), vec![NodeId(11), NodeId(13)]);
        assert_eq!(
            found[1].nodes().collect::<Vec<_>>(),
            vec![NodeId(11), NodeId(12), NodeId(13)]
        );
    }

    #[test]
    fn test_step_weights_decay() {
        let found = paths(&sample_graph(), NodeId(11), NodeId(13), 2);
        let indirect = &found[1];

        assert_eq!(indirect.steps()[0].weight, 1.0);
        assert!((indirect.steps()[1].weight - 0.4).abs() < 1e-6);
        assert!((indirect.steps()[2].weight - 0.2 * (-1.0f32).exp()).abs() < 1e-6);
        assert!((indirect.weight() - 0.08 * (-1.0f32).exp()).abs() < 1e-6);
    }

    #[test]
    fn test_max_len_bound() {
        let graph = sample_graph();

        let found = paths(&graph, NodeId(11), NodeId(13), 1);
        assert_eq!(found.len(), 1);
        assert!(paths(&graph, NodeId(11), NodeId(13), 0).is_empty());
    }

    #[test]
    fn test_paths_are_simple() {
        let mut graph = sample_graph();
        graph.add_edge(NodeId(12), NodeId(14), "", 1.0);
        graph.add_edge(NodeId(14), NodeId(11), "", 1.0);
        graph.add_edge(NodeId(14), NodeId(13), "", 1.0);

        let found = paths(&graph, NodeId(11), NodeId(13), 5);
        for path in &found {
            let mut nodes: Vec<_> = path.nodes().collect();
            let total = nodes.len();
            nodes.sort();
            nodes.dedup();
            assert_eq!(nodes.len(), total, "{path} repeats a node");
            assert!(path.len() <= 5);
        }
        assert_eq!(found.len(), 5);
    }

    #[test]
    fn test_cycles_back_to_source() {
        let found = paths(&sample_graph(), NodeId(11), NodeId(11), 3);
        let rendered: Vec<_> = found.iter().map(ToString::to_string).collect();

        assert_eq!(
            rendered,
            vec!["11-IsA->12-IsA->11", "11-CapableOf->13-CapableOf->11", "11-IsA->12-IsA->13-CapableOf->11", "11-CapableOf->13-IsA->12-IsA->11"]
        );
    }

    #[test]
    fn test_unknown_source() {
        assert!(paths(&sample_graph(), NodeId(99), NodeId(13), 3).is_empty());
    }
}
