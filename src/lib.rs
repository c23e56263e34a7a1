//! concept-graph: weighted concept graph with dense/sparse matrix kernels
//!
//! # Overview
//!
//! concept-graph stores a typed, weighted, symmetric graph of concepts (term
//! ids linked by labelled relations) and scores relatedness between them:
//! bounded context extraction, path enumeration, spreading activation and
//! random-walk proximity through matrix powers and inversion.
//!
//! # Quick Start
//!
//! ```no_run
//! use concept_graph::{context_chain, infinite_random_walk, ConceptGraph, LoadOptions, NodeId};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut graph = ConceptGraph::new();
//! graph.add_edge(NodeId(11), NodeId(12), "IsA", 0.4);
//! graph.add_edge(NodeId(11), NodeId(13), "CapableOf", 0.1);
//!
//! // Nodes within two hops, scored by chained edge weights
//! let context = context_chain(&graph, NodeId(11), 2);
//! assert_eq!(context[0].node, NodeId(12));
//!
//! // Random-walk proximity (I - alpha * A)^-1 - I
//! let walk = infinite_random_walk(&graph, 0.8)?;
//! assert!(walk.value(NodeId(11), NodeId(12)).is_some());
//!
//! // Round-trip through the edge-list format
//! graph.save_weighted("graph.txt").await?;
//! let loaded = ConceptGraph::load("graph.txt", LoadOptions::default()).await?;
//! assert_eq!(loaded, graph);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Storage**: one relation per unordered node pair, adjacency sets per node
//! - **Persistence**: textual edge lists and term-association lists (tokio I/O)
//! - **Matrices**: dense row-major kernel with Gauss-Jordan inverse, sparse
//!   map-of-rows kernel indexed by node id
//! - **Algorithms**: BFS context, simple paths, spreading activation, finite and
//!   infinite random walks, association-driven expansion
//! - **Weighting**: oracle backfill and IDF/relation-group normalization

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod config;
pub mod error;
pub mod matrix;
pub mod storage;
pub mod weighting;

// Re-export core types
pub use algorithms::{
    adjacency_matrix, adjacency_matrix_sparse, context_chain, context_dist,
    expand_from_associations, finite_random_walk, finite_random_walk_sparse,
    infinite_random_walk, infinite_random_walk_sparse, paths, seed_scores, seed_scores_sparse,
    spreading_activation, ConceptPath, ContextNode, PathStep, DEFAULT_DECAY,
};
pub use config::{ActivationConfig, EngineConfig, ExpansionConfig, WalkConfig};
pub use matrix::{DenseMatrix, NodeMatrix, Row, SparseMatrix};
pub use storage::{
    load_associations, load_query_graphs, parse_associations, parse_edge_list,
    parse_edge_list_with, parse_query_graphs, save_query_graphs, to_query_graphs_text,
    ConceptGraph, Edges, LoadOptions, NodeId, NumericIds, Relation, TermLookup,
};
pub use weighting::{
    backfill_from_oracle, group_averages, normalize_weights, CollectionStats, RelatednessOracle,
    RelationTable, TermStats,
};

// Error type
pub use error::{GraphError, Result};
