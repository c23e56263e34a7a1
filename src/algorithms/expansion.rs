//! Graph expansion from term associations
//!
//! Grows a concept graph outward from a source term using an association
//! matrix (rows = terms, cells = association scores). At each expanded node the
//! associated terms are ranked by IDF, the most specific ones become nodes, and
//! an unlabeled relation carrying the association score links them to the node.

use crate::config::ExpansionConfig;
use crate::matrix::SparseMatrix;
use crate::storage::{ConceptGraph, NodeId};
use crate::weighting::TermStats;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Expand `graph` breadth-first from `source` over `associations`
///
/// Nodes are expanded while their distance from `source` is below
/// `config.max_dist`; each expanded node contributes at most
/// `config.max_context` associated terms (0 = all), highest IDF first. A term
/// joins the frontier only when its relation to the expanded node is new.
///
/// # Returns
///
/// Number of relations added. Zero, with the graph untouched, if `source` has
/// no association row.
///
/// # Example
///
/// ```
/// use concept_graph::{expand_from_associations, ConceptGraph, ExpansionConfig, NodeId, SparseMatrix};
/// use std::collections::HashMap;
///
/// let mut assoc = SparseMatrix::new();
/// assoc.set(1, 2, 0.4);
/// assoc.set(1, 3, 0.2);
/// let idf: HashMap<NodeId, f32> = [(NodeId(2), 1.0), (NodeId(3), 2.0)].into_iter().collect();
///
/// let mut graph = ConceptGraph::new();
/// let config = ExpansionConfig { max_dist: 1, max_context: 1 };
/// let added = expand_from_associations(&mut graph, &assoc, &idf, NodeId(1), &config);
///
/// assert_eq!(added, 1);
/// assert_eq!(graph.weight(NodeId(1), NodeId(3)), Some(0.2));
/// ```
pub fn expand_from_associations(
    graph: &mut ConceptGraph,
    associations: &SparseMatrix,
    stats: &dyn TermStats,
    source: NodeId,
    config: &ExpansionConfig,
) -> usize {
    if associations.row(source.0).is_none() {
        return 0;
    }

    graph.add_node(source);
    let mut frontier = VecDeque::from([(source, 0_usize)]);
    let mut added = 0;

    while let Some((node, dist)) = frontier.pop_front() {
        if dist >= config.max_dist {
            continue;
        }
        let Some(row) = associations.row(node.0) else {
            continue;
        };

        let mut candidates: Vec<(NodeId, f32, f32)> = row
            .iter()
            .map(|(col, score)| (NodeId(col), score, stats.idf(NodeId(col))))
            .filter(|&(term, _, _)| term != node)
            .collect();
        candidates.sort_by(|a, b| b.2.total_cmp(&a.2));
        if config.max_context > 0 {
            candidates.truncate(config.max_context);
        }

        for (term, score, _) in candidates {
            graph.add_node(term);
            if !graph.has_edge(node, term) {
                graph.add_edge(node, term, "", score);
                frontier.push_back((term, dist + 1));
                added += 1;
                trace!(from = %node, to = %term, score, dist = dist + 1, "added association");
            }
        }
    }

    debug!(source = %source, added, nodes = graph.num_nodes(), "expanded from associations");
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn associations() -> SparseMatrix {
        let mut assoc = SparseMatrix::new();
        assoc.set(1, 2, 0.5);
        assoc.set(1, 3, 0.4);
        assoc.set(1, 4, 0.3);
        assoc.set(2, 5, 0.2);
        assoc.set(2, 1, 0.5);
        assoc.set(5, 6, 0.1);
        assoc
    }

    fn idf() -> HashMap<NodeId, f32> {
        [(2, 3.0), (3, 1.0), (4, 2.0), (5, 1.0), (6, 1.0)]
            .into_iter()
            .map(|(n, v)| (NodeId(n), v))
            .collect()
    }

    #[test]
    fn test_expansion_depth() {
        let mut graph = ConceptGraph::new();
        let config = ExpansionConfig {
            max_dist: 2,
            max_context: 0,
        };

        let added = expand_from_associations(&mut graph, &associations(), &idf(), NodeId(1), &config);

        assert_eq!(added, 4);
        assert!(graph.has_edge(NodeId(2), NodeId(5)));
        assert!(!graph.has_node(NodeId(6)));
        assert_eq!(graph.relation(NodeId(1), NodeId(2)).unwrap().label, "");
    }

    #[test]
    fn test_max_context_prefers_idf() {
        let mut graph = ConceptGraph::new();
        let config = ExpansionConfig {
            max_dist: 1,
            max_context: 2,
        };

        expand_from_associations(&mut graph, &associations(), &idf(), NodeId(1), &config);

        let mut nodes: Vec<_> = graph.nodes().map(|n| n.0).collect();
        nodes.sort_unstable();
        assert_eq!(nodes, vec![1, 2, 4]);
    }

    #[test]
    fn test_existing_relations_kept() {
        let mut graph = ConceptGraph::from_edges([(NodeId(1), NodeId(2), "IsA", 0.9)]);
        let config = ExpansionConfig {
            max_dist: 1,
            max_context: 0,
        };

        let added = expand_from_associations(&mut graph, &associations(), &idf(), NodeId(1), &config);

        assert_eq!(added, 2);
        assert_eq!(graph.weight(NodeId(1), NodeId(2)), Some(0.9));
    }

    #[test]
    fn test_unknown_source() {
        let mut graph = ConceptGraph::new();
        let added = expand_from_associations(
            &mut graph,
            &associations(),
            &idf(),
            NodeId(42),
            &ExpansionConfig::default(),
        );

        assert_eq!(added, 0);
        assert!(graph.is_empty());
    }
}
