//! Term association lists
//!
//! Each non-blank line is `<term> <score>`. A score of at least 1 marks the
//! start of a new source term's block; the following lines list associated
//! terms with scores in `(0, 1)`:
//!
//! ```text
//! dog 1
//! animal 0.42
//! leash 0.13
//! cat 1
//! ```
//!
//! Associations at or below the threshold are dropped, as are self-associations.
//! The result is a [`SparseMatrix`] with `(source, term) = score`.

use super::edge_list::{LoadOptions, TermLookup};
use crate::error::{GraphError, Result};
use crate::matrix::SparseMatrix;
use anyhow::Context;
use std::path::Path;
use tracing::{debug, warn};

/// Parse an association list into a sparse matrix
///
/// # Arguments
///
/// * `text` - Association list contents
/// * `lookup` - Resolves terms to node ids
/// * `threshold` - Associations with `score <= threshold` are dropped
/// * `options` - Malformed-line policy
///
/// # Errors
///
/// Returns `MalformedInput` for lines that are not `<term> <score>`, unknown
/// terms, or associations before any source term, unless
/// `options.skip_malformed` is set
///
/// # Example
///
/// ```
/// use concept_graph::{parse_associations, LoadOptions, NumericIds};
///
/// let assoc = parse_associations("1 1\n2 0.4\n3 0.01\n", &NumericIds, 0.05, LoadOptions::default()).unwrap();
/// assert_eq!(assoc.exists(1, 2), Some(0.4));
/// assert_eq!(assoc.exists(1, 3), None);
/// ```
pub fn parse_associations(
    text: &str,
    lookup: &dyn TermLookup,
    threshold: f32,
    options: LoadOptions,
) -> Result<SparseMatrix> {
    let mut matrix = SparseMatrix::new();
    let mut source = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }

        match parse_association(raw, lookup, line_no) {
            Ok((term, score)) if score >= 1.0 => source = Some(term),
            Ok((term, score)) => match source {
                Some(src) if score > threshold && term != src => {
                    matrix.set(src.0, term.0, score);
                }
                Some(_) => {}
                None => {
                    let err = GraphError::malformed(line_no, "association before any source term");
                    skip_or_fail(err, options)?;
                }
            },
            Err(err) => skip_or_fail(err, options)?,
        }
    }

    debug!(rows = matrix.num_rows(), cells = matrix.nnz(), "parsed associations");
    Ok(matrix)
}

fn parse_association(
    raw: &str,
    lookup: &dyn TermLookup,
    line_no: usize,
) -> Result<(crate::storage::NodeId, f32)> {
    let mut tokens = raw.split_whitespace();
    let (Some(term), Some(score), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(GraphError::malformed(line_no, "expected `<term> <score>`"));
    };

    let node = lookup
        .resolve(term)
        .ok_or_else(|| GraphError::malformed(line_no, format!("unknown term {term:?}")))?;
    let score = score
        .parse::<f32>()
        .ok()
        .filter(|s| s.is_finite())
        .ok_or_else(|| GraphError::malformed(line_no, format!("invalid score {score:?}")))?;

    Ok((node, score))
}

fn skip_or_fail(err: GraphError, options: LoadOptions) -> Result<()> {
    if options.skip_malformed {
        warn!(error = %err, "skipping malformed association line");
        Ok(())
    } else {
        Err(err)
    }
}

/// Load an association list file
///
/// # Errors
///
/// Returns error if the file cannot be read or a line is malformed (unless
/// `options.skip_malformed` is set)
pub async fn load_associations<P: AsRef<Path>>(
    path: P,
    lookup: &dyn TermLookup,
    threshold: f32,
    options: LoadOptions,
) -> anyhow::Result<SparseMatrix> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    parse_associations(&text, lookup, threshold, options)
        .with_context(|| format!("Failed to parse associations {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{NodeId, NumericIds};
    use std::collections::HashMap;

    #[test]
    fn test_blocks_and_threshold() {
        let text = "1 1\n2 0.4\n3 0.05\n1 0.9\n\n4 1.0\n2 0.3\n";
        let assoc = parse_associations(text, &NumericIds, 0.05, LoadOptions::default()).unwrap();

        assert_eq!(assoc.exists(1, 2), Some(0.4));
        assert_eq!(assoc.exists(1, 3), None, "score equal to threshold is dropped");
        assert_eq!(assoc.exists(1, 1), None, "self association is dropped");
        assert_eq!(assoc.exists(4, 2), Some(0.3));
        assert_eq!(assoc.nnz(), 2);
    }

    #[test]
    fn test_words() {
        let vocab: HashMap<String, NodeId> = [("dog", 7), ("animal", 8)]
            .into_iter()
            .map(|(w, id)| (w.to_string(), NodeId(id)))
            .collect();

        let assoc = parse_associations("dog 1\nanimal 0.5\n", &vocab, 0.0, LoadOptions::default()).unwrap();
        assert_eq!(assoc.exists(7, 8), Some(0.5));
    }

    #[test]
    fn test_malformed() {
        let err = parse_associations("1 1\n2\n", &NumericIds, 0.0, LoadOptions::default()).unwrap_err();
        assert!(matches!(err, GraphError::MalformedInput { line: 2, .. }));

        let err = parse_associations("2 0.5\n", &NumericIds, 0.0, LoadOptions::default()).unwrap_err();
        assert!(matches!(err, GraphError::MalformedInput { line: 1, .. }));

        let assoc = parse_associations("2 0.5\n1 1\n2 x\n3 0.5\n", &NumericIds, 0.0, LoadOptions::lenient()).unwrap();
        assert_eq!(assoc.nnz(), 1);
        assert_eq!(assoc.exists(1, 3), Some(0.5));
    }

    #[test]
    fn test_load_missing_file() {
        let result = tokio_test::block_on(load_associations(
            "/nonexistent/assoc.txt",
            &NumericIds,
            0.0,
            LoadOptions::default(),
        ));

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("/nonexistent/assoc.txt"), "{message}");
    }
}
