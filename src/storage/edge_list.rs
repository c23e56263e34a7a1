//! Textual edge-list format
//!
//! # Format
//!
//! ```text
//! 11            <- source line: starts the adjacency block of node 11
//! 12 IsA        <- edge 11 -- 12 labelled IsA, weight 0
//! 13 - 0.25     <- edge 11 -- 13, empty label, weight 0.25
//! 12
//! 11 IsA
//! ```
//!
//! Blank lines are ignored and surrounding whitespace is stripped. The minimal
//! producer ([`ConceptGraph::to_edge_list`]) omits weights; the extended producer
//! ([`ConceptGraph::to_weighted_edge_list`]) appends them. An empty label is
//! written as `-`.
//!
//! A multi-graph container prefixes each graph with a `#<graph-id>` line.
//!
//! Parsers always build into a fresh [`ConceptGraph`], so a failed load never
//! touches a graph the caller already holds.

use super::{ConceptGraph, NodeId};
use crate::error::{GraphError, Result};
use crate::weighting::RelatednessOracle;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::hash::BuildHasher;
use std::path::Path;
use tracing::{debug, warn};

/// Placeholder written for an empty relation label
pub const EMPTY_LABEL: &str = "-";

/// How the reader reacts to lines it cannot parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Skip malformed lines with a warning instead of aborting the load
    pub skip_malformed: bool,
}

impl LoadOptions {
    /// Options that skip malformed lines
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            skip_malformed: true,
        }
    }
}

/// Resolves an edge-list token to a node id
pub trait TermLookup {
    /// Node id for `token`, or `None` if the token is unknown
    fn resolve(&self, token: &str) -> Option<NodeId>;
}

/// Tokens are decimal node ids
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericIds;

impl TermLookup for NumericIds {
    fn resolve(&self, token: &str) -> Option<NodeId> {
        token.parse::<u32>().ok().map(NodeId)
    }
}

impl<S: BuildHasher> TermLookup for HashMap<String, NodeId, S> {
    fn resolve(&self, token: &str) -> Option<NodeId> {
        self.get(token).copied()
    }
}

enum Line<'a> {
    Blank,
    Source(NodeId),
    Edge {
        target: NodeId,
        label: &'a str,
        weight: Option<f32>,
    },
}

fn parse_line<'a>(raw: &'a str, lookup: &dyn TermLookup) -> std::result::Result<Line<'a>, String> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let resolve = |token: &&str| {
        lookup
            .resolve(token)
            .ok_or_else(|| format!("unknown node id {token:?}"))
    };

    match tokens.as_slice() {
        [] => Ok(Line::Blank),
        [id] => Ok(Line::Source(resolve(id)?)),
        [target, label] => Ok(Line::Edge {
            target: resolve(target)?,
            label: decode_label(*label),
            weight: None,
        }),
        [target, label, weight] => {
            let weight = weight
                .parse::<f32>()
                .ok()
                .filter(|w| w.is_finite())
                .ok_or_else(|| format!("invalid weight {weight:?}"))?;
            Ok(Line::Edge {
                target: resolve(target)?,
                label: decode_label(*label),
                weight: Some(weight),
            })
        }
        _ => Err(format!("expected at most 3 tokens, found {}", tokens.len())),
    }
}

fn decode_label(label: &str) -> &str {
    if label == EMPTY_LABEL {
        ""
    } else {
        label
    }
}

fn encode_label(label: &str) -> String {
    if label.is_empty() {
        EMPTY_LABEL.to_string()
    } else {
        label.split_whitespace().collect::<Vec<_>>().join("_")
    }
}

fn recover(err: GraphError, options: LoadOptions) -> Result<()> {
    if options.skip_malformed {
        warn!(error = %err, "skipping malformed edge-list line");
        Ok(())
    } else {
        Err(err)
    }
}

/// Accumulates one graph from a stream of parsed lines
struct GraphBuilder<'o> {
    graph: ConceptGraph,
    source: Option<NodeId>,
    oracle: Option<&'o dyn RelatednessOracle>,
}

impl<'o> GraphBuilder<'o> {
    fn new(oracle: Option<&'o dyn RelatednessOracle>) -> Self {
        Self {
            graph: ConceptGraph::new(),
            source: None,
            oracle,
        }
    }

    fn apply(&mut self, line_no: usize, line: Line<'_>) -> Result<()> {
        match line {
            Line::Blank => Ok(()),
            Line::Source(node) => {
                self.graph.add_node(node);
                self.source = Some(node);
                Ok(())
            }
            Line::Edge {
                target,
                label,
                weight,
            } => {
                let source = self
                    .source
                    .ok_or_else(|| GraphError::malformed(line_no, "edge line before any source line"))?;
                let weight = weight
                    .or_else(|| self.oracle.and_then(|o| o.related_weight(source, target)))
                    .unwrap_or(0.0);
                self.graph.add_edge(source, target, label, weight);
                Ok(())
            }
        }
    }

    fn finish(self) -> ConceptGraph {
        self.graph
    }
}

/// Parse a single graph with numeric node ids
///
/// Edges without an explicit weight get weight 0.
///
/// # Errors
///
/// Returns `MalformedInput` for the first bad line unless
/// `options.skip_malformed` is set
///
/// # Example
///
/// ```
/// use concept_graph::{parse_edge_list, LoadOptions, NodeId};
///
/// let graph = parse_edge_list("11\n12 IsA\n13 IsA 0.5\n", LoadOptions::default()).unwrap();
/// assert_eq!(graph.num_edges(), 2);
/// assert_eq!(graph.weight(NodeId(13), NodeId(11)), Some(0.5));
/// ```
pub fn parse_edge_list(text: &str, options: LoadOptions) -> Result<ConceptGraph> {
    parse_edge_list_with(text, &NumericIds, options)
}

/// Parse a single graph, resolving tokens through `lookup`
///
/// # Errors
///
/// Returns `MalformedInput` for the first bad line unless
/// `options.skip_malformed` is set
pub fn parse_edge_list_with(
    text: &str,
    lookup: &dyn TermLookup,
    options: LoadOptions,
) -> Result<ConceptGraph> {
    let mut builder = GraphBuilder::new(None);

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let outcome = parse_line(raw, lookup)
            .map_err(|reason| GraphError::malformed(line_no, reason))
            .and_then(|line| builder.apply(line_no, line));
        if let Err(err) = outcome {
            recover(err, options)?;
        }
    }

    let graph = builder.finish();
    debug!(nodes = graph.num_nodes(), edges = graph.num_edges(), "parsed edge list");
    Ok(graph)
}

/// Parse a multi-graph container into graphs keyed by their `#` id
///
/// Edges without an explicit weight take `oracle.related_weight(source, target)`
/// when an oracle is given, 0 otherwise.
///
/// # Errors
///
/// Returns `MalformedInput` for the first bad line (including content before the
/// first `#` marker) unless `options.skip_malformed` is set
pub fn parse_query_graphs(
    text: &str,
    lookup: &dyn TermLookup,
    oracle: Option<&dyn RelatednessOracle>,
    options: LoadOptions,
) -> Result<BTreeMap<String, ConceptGraph>> {
    let mut graphs = BTreeMap::new();
    let mut current: Option<(String, GraphBuilder<'_>)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;

        if let Some(pos) = raw.find('#') {
            if let Some((id, builder)) = current.take() {
                graphs.insert(id, builder.finish());
            }
            let id = raw[pos + 1..].trim().to_string();
            current = Some((id, GraphBuilder::new(oracle)));
            continue;
        }

        let outcome = parse_line(raw, lookup)
            .map_err(|reason| GraphError::malformed(line_no, reason))
            .and_then(|line| match (&mut current, line) {
                (_, Line::Blank) => Ok(()),
                (Some((_, builder)), line) => builder.apply(line_no, line),
                (None, _) => Err(GraphError::malformed(line_no, "content before first graph marker")),
            });
        if let Err(err) = outcome {
            recover(err, options)?;
        }
    }

    if let Some((id, builder)) = current {
        graphs.insert(id, builder.finish());
    }

    debug!(graphs = graphs.len(), "parsed query graph container");
    Ok(graphs)
}

/// Render graphs as a multi-graph container with weights
#[must_use]
pub fn to_query_graphs_text(graphs: &BTreeMap<String, ConceptGraph>) -> String {
    let mut out = String::new();
    for (id, graph) in graphs {
        let _ = writeln!(out, "#{id}");
        out.push_str(&graph.to_weighted_edge_list());
    }
    out
}

impl ConceptGraph {
    /// Render the minimal edge list: source lines followed by `target label`
    ///
    /// Every node gets a source line (isolated nodes survive the round trip) and
    /// every relation is listed under both endpoints.
    #[must_use]
    pub fn to_edge_list(&self) -> String {
        self.render(false)
    }

    /// Render the extended edge list with a trailing weight on each edge line
    #[must_use]
    pub fn to_weighted_edge_list(&self) -> String {
        self.render(true)
    }

    fn render(&self, weighted: bool) -> String {
        let mut out = String::new();
        for node in self.nodes() {
            let _ = writeln!(out, "{node}");
            for (nbr, rel) in self.edges_of(node) {
                let label = encode_label(&rel.label);
                if weighted {
                    let _ = writeln!(out, "{nbr} {label} {}", rel.weight);
                } else {
                    let _ = writeln!(out, "{nbr} {label}");
                }
            }
        }
        out
    }

    /// Load a graph from an edge-list file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or a line is malformed (unless
    /// `options.skip_malformed` is set)
    pub async fn load<P: AsRef<Path>>(path: P, options: LoadOptions) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        parse_edge_list(&text, options)
            .with_context(|| format!("Failed to parse edge list {}", path.display()))
    }

    /// Save the minimal (unweighted) edge list
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        write_text(path.as_ref(), self.to_edge_list()).await
    }

    /// Save the extended edge list with weights
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub async fn save_weighted<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        write_text(path.as_ref(), self.to_weighted_edge_list()).await
    }
}

/// Load a multi-graph container file
///
/// # Errors
///
/// Returns error if the file cannot be read or a line is malformed (unless
/// `options.skip_malformed` is set)
pub async fn load_query_graphs<P: AsRef<Path>>(
    path: P,
    lookup: &dyn TermLookup,
    oracle: Option<&dyn RelatednessOracle>,
    options: LoadOptions,
) -> anyhow::Result<BTreeMap<String, ConceptGraph>> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    parse_query_graphs(&text, lookup, oracle, options)
        .with_context(|| format!("Failed to parse query graphs {}", path.display()))
}

/// Save graphs as a multi-graph container file
///
/// # Errors
///
/// Returns error if the file cannot be written
pub async fn save_query_graphs<P: AsRef<Path>>(
    path: P,
    graphs: &BTreeMap<String, ConceptGraph>,
) -> anyhow::Result<()> {
    write_text(path.as_ref(), to_query_graphs_text(graphs)).await
}

async fn write_text(path: &Path, text: String) -> anyhow::Result<()> {
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::SparseMatrix;

    fn sample_graph() -> ConceptGraph {
        let mut graph = ConceptGraph::new();
        graph.add_edge(NodeId(11), NodeId(12), "IsA", 0.5);
        graph.add_edge(NodeId(12), NodeId(13), "", 0.25);
        graph.add_node(NodeId(99));
        graph
    }

    #[test]
    fn test_parse_minimal() {
        let text = "  11 \n12 IsA\n\n13 UsedFor\n12\n13 PartOf\n";
        let graph = parse_edge_list(text, LoadOptions::default()).unwrap();

        assert_eq!(graph.num_nodes(), 3);
        assert_eq!(graph.num_edges(), 3);
        assert_eq!(graph.weight(NodeId(11), NodeId(12)), Some(0.0));
        assert_eq!(graph.relation(NodeId(13), NodeId(12)).unwrap().label, "PartOf");
    }

    #[test]
    fn test_minimal_round_trip_drops_weights() {
        let graph = sample_graph();
        let loaded = parse_edge_list(&graph.to_edge_list(), LoadOptions::default()).unwrap();

        assert_eq!(loaded.nodes().collect::<Vec<_>>(), graph.nodes().collect::<Vec<_>>());
        let triples = |g: &ConceptGraph| {
            g.edges()
                .map(|(a, b, rel)| (a, b, rel.label.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(triples(&loaded), triples(&graph));
        assert!(loaded.edges().all(|(_, _, rel)| rel.weight == 0.0));
    }

    #[test]
    fn test_weighted_round_trip() {
        let graph = sample_graph();
        let loaded =
            parse_edge_list(&graph.to_weighted_edge_list(), LoadOptions::default()).unwrap();

        assert_eq!(loaded, graph);
    }

    #[test]
    fn test_empty_label_placeholder() {
        let text = sample_graph().to_edge_list();
        assert!(text.contains("13 -\n"));
    }

    #[test]
    fn test_malformed_lines() {
        let cases = [
            ("12 IsA\n", 1),
            ("11\nabc IsA\n", 2),
            ("11\n12 IsA heavy\n", 2),
            ("11\n\n12 IsA 0.1 extra\n", 3),
            ("x\n", 1),
        ];

        for (text, line) in cases {
            match parse_edge_list(text, LoadOptions::default()) {
                Err(GraphError::MalformedInput { line: got, .. }) => assert_eq!(got, line, "{text:?}"),
                other => panic!("expected malformed input for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_skip_malformed() {
        let text = "11\n12 IsA\nbogus line here too\n13 IsA\n";
        let graph = parse_edge_list(text, LoadOptions::lenient()).unwrap();

        assert_eq!(graph.num_edges(), 2);
    }

    #[test]
    fn test_vocabulary_lookup() {
        let vocab: HashMap<String, NodeId> = [("dog", 1), ("animal", 2)]
            .into_iter()
            .map(|(w, id)| (w.to_string(), NodeId(id)))
            .collect();

        let graph = parse_edge_list_with("dog\nanimal IsA\n", &vocab, LoadOptions::default()).unwrap();
        assert!(graph.has_edge(NodeId(1), NodeId(2)));

        let err = parse_edge_list_with("dog\ncat IsA\n", &vocab, LoadOptions::default()).unwrap_err();
        assert!(matches!(err, GraphError::MalformedInput { line: 2, .. }));
    }

    #[test]
    fn test_query_graphs_with_oracle() {
        let mut assoc = SparseMatrix::new();
        assoc.set(2, 1, 0.7);

        let text = "#q1\n1\n2 IsA\n3 HasA 0.2\n# q2 \n5\n6 -\n";
        let graphs = parse_query_graphs(text, &NumericIds, Some(&assoc), LoadOptions::default()).unwrap();

        assert_eq!(graphs.keys().collect::<Vec<_>>(), vec!["q1", "q2"]);
        let q1 = &graphs["q1"];
        assert_eq!(q1.weight(NodeId(1), NodeId(2)), Some(0.7));
        assert_eq!(q1.weight(NodeId(1), NodeId(3)), Some(0.2));
        assert_eq!(graphs["q2"].weight(NodeId(5), NodeId(6)), Some(0.0));
    }

    #[test]
    fn test_query_graphs_content_before_marker() {
        let err = parse_query_graphs("1\n#q\n", &NumericIds, None, LoadOptions::default()).unwrap_err();
        assert_eq!(err, GraphError::malformed(1, "content before first graph marker"));
    }

    #[test]
    fn test_query_graphs_text_round_trip() {
        let graphs: BTreeMap<String, ConceptGraph> =
            [("a".to_string(), sample_graph()), ("b".to_string(), ConceptGraph::new())]
                .into_iter()
                .collect();

        let text = to_query_graphs_text(&graphs);
        let loaded = parse_query_graphs(&text, &NumericIds, None, LoadOptions::default()).unwrap();
        assert_eq!(loaded, graphs);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = ConceptGraph::load("/nonexistent/graph.txt", LoadOptions::default()).await;
        assert!(result.is_err());
    }
}
