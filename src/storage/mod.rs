//! Graph storage layer
//!
//! Provides the symmetric concept graph store plus the textual edge-list and
//! term-association formats used to persist and seed it.

pub mod associations;
pub mod edge_list;
pub mod graph;

pub use associations::{load_associations, parse_associations};
pub use edge_list::{
    load_query_graphs, parse_edge_list, parse_edge_list_with, parse_query_graphs,
    save_query_graphs, to_query_graphs_text, LoadOptions, NumericIds, TermLookup, EMPTY_LABEL,
};
pub use graph::{ConceptGraph, Edges, NodeId, Relation};
