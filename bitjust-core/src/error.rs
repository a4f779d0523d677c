//! Error types.
//!
//! Only the configuration layer and the SAT adapter report recoverable
//! errors. Precondition violations inside the scoring engine are
//! programming faults and panic with the offending node in the message.

use thiserror::Error;

use crate::graph::NodeId;

/// Errors raised while building a scoring configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown justification heuristic: {0}")]
    UnknownHeuristic(String),

    #[error("invalid justification heuristic id: {0}")]
    InvalidHeuristicId(u8),

    #[error("malformed scoring configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the SAT backend adapter.
#[derive(Debug, Error)]
pub enum SatError {
    #[error("literal 0 is reserved as clause terminator")]
    ZeroLiteral,

    #[error("node {0} has no SAT literal")]
    UnmappedNode(NodeId),

    #[error("node {node} already mapped to literal {literal}")]
    AlreadyMapped { node: NodeId, literal: i32 },
}
