//! Weighted concept graph store
//!
//! Nodes are opaque term/concept ids. Edges are typed and weighted, and undirected:
//! each unordered node pair owns exactly one [`Relation`], and both endpoints reach
//! it through their adjacency sets.
//!
//! ```text
//! adjacency: 11 -> {12, 13}     relations: {11,12} IsA:0.4
//!            12 -> {11, 13}                {11,13} CapableOf:0.1
//!            13 -> {11, 12}                {12,13} IsA:0.2
//! ```
//!
//! Because the relation is stored once, `weight(a, b) == weight(b, a)` holds after
//! every mutation without having to update two copies.

use std::collections::{btree_set, BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Node identifier (term or concept id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Labeled, weighted relation between two nodes
///
/// A weight of `0.0` means "unweighted": the edge was declared but its strength is
/// filled in later (see [`crate::weighting`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    /// Relation type, e.g. `IsA` or `CapableOf` (may be empty)
    pub label: String,
    /// Relation strength
    pub weight: f32,
}

impl Relation {
    /// Create a relation
    pub fn new(label: impl Into<String>, weight: f32) -> Self {
        Self {
            label: label.into(),
            weight,
        }
    }
}

/// Unordered node pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EdgeKey(NodeId, NodeId);

impl EdgeKey {
    fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// Undirected weighted graph of concepts
///
/// Built once per query, mutated only while it is being constructed, then read by
/// the algorithms in [`crate::algorithms`]. Concurrent readers are fine; writers
/// must be externally synchronized.
///
/// # Example
///
/// ```
/// use concept_graph::{ConceptGraph, NodeId};
///
/// let mut graph = ConceptGraph::new();
/// graph.add_edge(NodeId(11), NodeId(12), "IsA", 0.4);
/// graph.add_edge(NodeId(11), NodeId(13), "CapableOf", 0.1);
///
/// assert_eq!(graph.weight(NodeId(12), NodeId(11)), Some(0.4));
/// assert_eq!(graph.edges_of(NodeId(11)).count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConceptGraph {
    /// Neighbor sets, ordered by node id (this is the graph's iteration order)
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,

    /// One relation per unordered node pair
    relations: HashMap<EdgeKey, Relation>,
}

impl ConceptGraph {
    /// Create new empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create graph from (a, b, label, weight) edges
    ///
    /// Later duplicates of the same pair overwrite earlier ones.
    pub fn from_edges<I, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, NodeId, S, f32)>,
        S: Into<String>,
    {
        let mut graph = Self::new();
        for (a, b, label, weight) in edges {
            graph.add_edge(a, b, label, weight);
        }
        graph
    }

    /// Add a node with no edges (no-op if present)
    pub fn add_node(&mut self, node: NodeId) {
        self.adjacency.entry(node).or_default();
    }

    /// Check whether a node exists
    #[must_use]
    pub fn has_node(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    /// Insert or overwrite the relation between `a` and `b`
    ///
    /// Missing endpoints are created. `weight` is expected to be finite.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, label: impl Into<String>, weight: f32) {
        debug_assert!(weight.is_finite(), "edge weight must be finite");
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
        self.relations
            .insert(EdgeKey::new(a, b), Relation::new(label, weight));
    }

    /// Replace label and weight of an existing relation
    ///
    /// Returns `false` (and changes nothing) if `a` and `b` are not related.
    pub fn update_edge(
        &mut self,
        a: NodeId,
        b: NodeId,
        label: impl Into<String>,
        weight: f32,
    ) -> bool {
        match self.relations.get_mut(&EdgeKey::new(a, b)) {
            Some(rel) => {
                rel.label = label.into();
                rel.weight = weight;
                true
            }
            None => false,
        }
    }

    /// Replace the weight of an existing relation, keeping its label
    ///
    /// Returns `false` if `a` and `b` are not related.
    pub fn set_weight(&mut self, a: NodeId, b: NodeId, weight: f32) -> bool {
        match self.relations.get_mut(&EdgeKey::new(a, b)) {
            Some(rel) => {
                rel.weight = weight;
                true
            }
            None => false,
        }
    }

    /// Remove the relation between `a` and `b`, keeping both nodes
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> Option<Relation> {
        let rel = self.relations.remove(&EdgeKey::new(a, b))?;
        if let Some(neighbors) = self.adjacency.get_mut(&a) {
            neighbors.remove(&b);
        }
        if let Some(neighbors) = self.adjacency.get_mut(&b) {
            neighbors.remove(&a);
        }
        Some(rel)
    }

    /// Remove a node together with every relation that references it
    ///
    /// Returns `false` if the node did not exist.
    pub fn remove_node(&mut self, node: NodeId) -> bool {
        let Some(neighbors) = self.adjacency.remove(&node) else {
            return false;
        };

        for neighbor in neighbors {
            self.relations.remove(&EdgeKey::new(node, neighbor));
            if let Some(back) = self.adjacency.get_mut(&neighbor) {
                back.remove(&node);
            }
        }

        true
    }

    /// Relation between `a` and `b`, if any
    #[must_use]
    pub fn relation(&self, a: NodeId, b: NodeId) -> Option<&Relation> {
        self.relations.get(&EdgeKey::new(a, b))
    }

    /// Weight of the relation between `a` and `b`, if any
    #[must_use]
    pub fn weight(&self, a: NodeId, b: NodeId) -> Option<f32> {
        self.relation(a, b).map(|rel| rel.weight)
    }

    /// Check whether `a` and `b` are related
    #[must_use]
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.relations.contains_key(&EdgeKey::new(a, b))
    }

    /// Iterate over (neighbor, relation) pairs of a node
    ///
    /// Unknown nodes yield an empty sequence. Each call starts a fresh pass.
    #[must_use]
    pub fn edges_of(&self, node: NodeId) -> Edges<'_> {
        Edges {
            node,
            neighbors: self.adjacency.get(&node).map(BTreeSet::iter),
            relations: &self.relations,
        }
    }

    /// Number of relations touching a node (0 for unknown nodes)
    #[must_use]
    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency.get(&node).map_or(0, BTreeSet::len)
    }

    /// Iterate over node ids in ascending order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    /// Iterate over every undirected relation once, as (smaller id, larger id, relation)
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, &Relation)> + '_ {
        self.adjacency.iter().flat_map(move |(&node, neighbors)| {
            neighbors
                .range(node..)
                .filter_map(move |&other| self.relation(node, other).map(|rel| (node, other, rel)))
        })
    }

    /// Mutable access to every relation (used by weight normalization)
    pub(crate) fn relations_mut(&mut self) -> impl Iterator<Item = (NodeId, NodeId, &mut Relation)> + '_ {
        self.relations
            .iter_mut()
            .map(|(key, rel)| (key.0, key.1, rel))
    }

    /// Get number of nodes
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    /// Get number of (undirected) relations
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.relations.len()
    }

    /// Check whether any relation carries a nonzero weight
    ///
    /// Graphs loaded from the minimal edge list have none until weighted.
    #[must_use]
    pub fn contains_nonzero_weights(&self) -> bool {
        self.relations.values().any(|rel| rel.weight != 0.0)
    }

    /// Check whether the graph has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

impl fmt::Display for ConceptGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.nodes() {
            write!(f, "{node}:")?;
            for (neighbor, rel) in self.edges_of(node) {
                write!(f, " ({neighbor}[{}]:{})", rel.label, rel.weight)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Iterator over the relations of one node, see [`ConceptGraph::edges_of`]
#[derive(Debug, Clone)]
pub struct Edges<'a> {
    node: NodeId,
    neighbors: Option<btree_set::Iter<'a, NodeId>>,
    relations: &'a HashMap<EdgeKey, Relation>,
}

impl<'a> Iterator for Edges<'a> {
    type Item = (NodeId, &'a Relation);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node;
        let relations = self.relations;
        self.neighbors
            .as_mut()?
            .find_map(|&other| relations.get(&EdgeKey::new(node, other)).map(|rel| (other, rel)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.neighbors
            .as_ref()
            .map_or((0, Some(0)), |it| (0, it.size_hint().1))
    }
}
