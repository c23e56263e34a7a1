//! Error taxonomy for graph and matrix operations

use crate::storage::NodeId;
use thiserror::Error;

/// Result alias used by every pure (non-I/O) operation in the crate
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised by the graph store, the matrix kernels and the edge-list reader
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Matrix shapes are incompatible for the requested operation.
    ///
    /// This is a programming error; retrying with the same operands fails again.
    #[error("dimension mismatch in {op}: {left:?} vs {right:?}")]
    DimensionMismatch {
        /// Operation that rejected the operands
        op: &'static str,
        /// Shape (rows, cols) of the left operand
        left: (usize, usize),
        /// Shape (rows, cols) of the right operand
        right: (usize, usize),
    },

    /// Gauss-Jordan elimination found no nonzero pivot in a column
    #[error("matrix is singular: no nonzero pivot in column {column}")]
    SingularMatrix {
        /// Column in which elimination stopped
        column: usize,
    },

    /// An edge-list line could not be parsed
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput {
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// A node referenced by the caller is not present
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// A precondition on an argument was violated
    #[error("invalid parameter: {message}")]
    InvalidParameter {
        /// Description of the violated precondition
        message: String,
    },
}

impl GraphError {
    /// Create a `DimensionMismatch` error
    #[must_use]
    pub fn dimension_mismatch(op: &'static str, left: (usize, usize), right: (usize, usize)) -> Self {
        Self::DimensionMismatch { op, left, right }
    }

    /// Create a `MalformedInput` error
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            line,
            reason: reason.into(),
        }
    }

    /// Create an `InvalidParameter` error
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Whether the caller can reasonably recover (pick a fallback) from this error
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::SingularMatrix { .. } | Self::MalformedInput { .. } | Self::UnknownNode(_)
        )
    }
}
