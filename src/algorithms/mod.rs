//! Graph algorithms (context, paths, activation, random walks, expansion)
//!
//! Traversals read the store directly through explicit FIFO frontiers; random
//! walks materialize the store into a dense or sparse matrix first.

pub mod activation;
pub mod context;
pub mod expansion;
pub mod paths;
pub mod random_walk;

pub use activation::{spreading_activation, DEFAULT_DECAY};
pub use context::{context_chain, context_dist, ContextNode};
pub use expansion::expand_from_associations;
pub use paths::{paths, ConceptPath, PathStep};
pub use random_walk::{
    adjacency_matrix, adjacency_matrix_sparse, finite_random_walk, finite_random_walk_sparse,
    infinite_random_walk, infinite_random_walk_sparse, seed_scores, seed_scores_sparse,
};
