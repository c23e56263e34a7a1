//! Relation weighting
//!
//! Graphs loaded from the minimal edge list carry zero weights. This module
//! fills them in from two external collaborators:
//!
//! - a [`RelatednessOracle`], e.g. a term-association matrix, that knows a weight
//!   for some node pairs ([`backfill_from_oracle`])
//! - term statistics ([`TermStats`]) plus per-label priors ([`RelationTable`])
//!   that rescale every relation by term specificity ([`normalize_weights`])
//!
//! # Normalization
//!
//! ```text
//! distinct nonzero weights, descending:  w1 w2 w3 | w4 w5 w6 | w7 w8 w9 w10
//!                                         group 1    group 2    group 3
//! zero edge labelled IsA (group 1)   ->  avg(group 1) * idf
//! nonzero edge                       ->  weight * idf
//! idf = (idf(a) + idf(b)) / 2
//! ```

use crate::matrix::SparseMatrix;
use crate::storage::{ConceptGraph, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use tracing::{debug, warn};

/// Source of known relatedness weights between node pairs
pub trait RelatednessOracle {
    /// Weight for the pair, looked up in either orientation
    fn related_weight(&self, a: NodeId, b: NodeId) -> Option<f32>;
}

impl RelatednessOracle for SparseMatrix {
    fn related_weight(&self, a: NodeId, b: NodeId) -> Option<f32> {
        self.exists(a.0, b.0).or_else(|| self.exists(b.0, a.0))
    }
}

impl RelatednessOracle for ConceptGraph {
    fn related_weight(&self, a: NodeId, b: NodeId) -> Option<f32> {
        self.weight(a, b)
    }
}

impl<S: BuildHasher> RelatednessOracle for HashMap<(NodeId, NodeId), f32, S> {
    fn related_weight(&self, a: NodeId, b: NodeId) -> Option<f32> {
        self.get(&(a, b)).or_else(|| self.get(&(b, a))).copied()
    }
}

/// Per-term specificity
pub trait TermStats {
    /// Inverse document frequency of the term behind `node` (0 if unknown)
    fn idf(&self, node: NodeId) -> f32;
}

impl<S: BuildHasher> TermStats for HashMap<NodeId, f32, S> {
    fn idf(&self, node: NodeId) -> f32 {
        self.get(&node).copied().unwrap_or(0.0)
    }
}

/// Document-frequency statistics of a collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStats {
    /// Number of documents in the collection
    pub doc_count: u64,
    /// Documents containing each term
    pub doc_freq: HashMap<NodeId, u64>,
}

impl CollectionStats {
    /// Create statistics for a collection of `doc_count` documents
    #[must_use]
    pub fn new(doc_count: u64) -> Self {
        Self {
            doc_count,
            doc_freq: HashMap::new(),
        }
    }

    /// Record the document frequency of a term
    #[must_use]
    pub fn with_doc_freq(mut self, node: NodeId, df: u64) -> Self {
        self.doc_freq.insert(node, df);
        self
    }
}

impl TermStats for CollectionStats {
    #[allow(clippy::cast_precision_loss)] // Collection sizes far below 2^52
    fn idf(&self, node: NodeId) -> f32 {
        match self.doc_freq.get(&node) {
            Some(&df) if df > 0 && self.doc_count > 0 => {
                (self.doc_count as f64 / df as f64).ln() as f32
            }
            _ => 0.0,
        }
    }
}

/// Relation labels with prior weights and importance groups (1 = strongest)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationTable {
    /// Prior weight per label
    pub weights: BTreeMap<String, f32>,
    /// Importance group (1..=3) per label
    pub groups: BTreeMap<String, u8>,
    /// Group for labels not in `groups`
    pub default_group: u8,
}

const DEFAULT_RELATIONS: [(&str, f32, u8); 20] = [
    ("IsA", 0.260, 1),
    ("HasProperty", 0.142, 1),
    ("CapableOf", 0.128, 1),
    ("AtLocation", 0.079, 1),
    ("ConceptuallyRelatedTo", 0.069, 1),
    ("UsedFor", 0.069, 1),
    ("HasA", 0.053, 2),
    ("DefinedAs", 0.051, 2),
    ("ReceivesAction", 0.041, 2),
    ("PartOf", 0.030, 2),
    ("CausesDesire", 0.024, 2),
    ("LocatedNear", 0.016, 2),
    ("Causes", 0.010, 2),
    ("HasPrerequisite", 0.010, 3),
    ("Desires", 0.004, 3),
    ("InstanceOf", 0.004, 3),
    ("MadeOf", 0.004, 3),
    ("MotivatedByGoal", 0.004, 3),
    ("HasFirstSubevent", 0.002, 3),
    ("SimilarSize", 0.002, 3),
];

impl Default for RelationTable {
    fn default() -> Self {
        Self {
            weights: DEFAULT_RELATIONS
                .iter()
                .map(|&(label, weight, _)| (label.to_string(), weight))
                .collect(),
            groups: DEFAULT_RELATIONS
                .iter()
                .map(|&(label, _, group)| (label.to_string(), group))
                .collect(),
            default_group: 3,
        }
    }
}

impl RelationTable {
    /// Importance group of a label, clamped to 1..=3
    #[must_use]
    pub fn group_of(&self, label: &str) -> u8 {
        self.groups
            .get(label)
            .copied()
            .unwrap_or(self.default_group)
            .clamp(1, 3)
    }

    /// Prior weight of a label (0 if unknown)
    #[must_use]
    pub fn prior_weight(&self, label: &str) -> f32 {
        self.weights.get(label).copied().unwrap_or(0.0)
    }
}

/// Give zero-weight relations the oracle's weight where it knows the pair
///
/// Returns the number of relations updated.
pub fn backfill_from_oracle(graph: &mut ConceptGraph, oracle: &dyn RelatednessOracle) -> usize {
    let mut updated = 0;
    for (a, b, rel) in graph.relations_mut() {
        if rel.weight == 0.0 {
            if let Some(weight) = oracle.related_weight(a, b) {
                rel.weight = weight;
                updated += 1;
            }
        }
    }
    debug!(updated, "backfilled relation weights from oracle");
    updated
}

/// Average weight of each importance group over the distinct nonzero weights
///
/// Returns `None` when there are three or fewer distinct nonzero weights.
#[must_use]
pub fn group_averages(graph: &ConceptGraph) -> Option<[f32; 3]> {
    let mut distinct: Vec<f32> = graph
        .edges()
        .map(|(_, _, rel)| rel.weight)
        .filter(|&w| w != 0.0)
        .collect();
    distinct.sort_by(|a, b| b.total_cmp(a));
    distinct.dedup();

    let n = distinct.len();
    if n <= 3 {
        return None;
    }

    let bounds = [0, n / 3, 2 * n / 3, n];
    let mut averages = [0.0; 3];
    for (g, avg) in averages.iter_mut().enumerate() {
        let slice = &distinct[bounds[g]..bounds[g + 1]];
        #[allow(clippy::cast_precision_loss)]
        let len = slice.len() as f32;
        *avg = slice.iter().sum::<f32>() / len;
    }
    Some(averages)
}

/// Rescale every relation by term specificity and fill zero weights
///
/// Zero-weight relations get the average weight of their label's group (or the
/// label's prior weight when too few distinct weights exist to form groups);
/// every relation is then scaled by the mean IDF of its endpoints.
///
/// Returns the group averages used, or `None` if the prior-weight fallback was
/// taken.
pub fn normalize_weights(
    graph: &mut ConceptGraph,
    stats: &dyn TermStats,
    table: &RelationTable,
) -> Option<[f32; 3]> {
    let averages = group_averages(graph);
    if averages.is_none() {
        warn!(
            edges = graph.num_edges(),
            "three or fewer distinct relation weights, falling back to label priors"
        );
    }

    for (a, b, rel) in graph.relations_mut() {
        let idf = (stats.idf(a) + stats.idf(b)) / 2.0;
        if rel.weight == 0.0 {
            let base = match averages {
                Some(avg) => avg[usize::from(table.group_of(&rel.label)) - 1],
                None => table.prior_weight(&rel.label),
            };
            rel.weight = base * idf;
        } else {
            rel.weight *= idf;
        }
    }

    debug!(?averages, edges = graph.num_edges(), "normalized relation weights");
    averages
}
