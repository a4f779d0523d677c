//! Expression Graph
//!
//! This module implements the shared expression DAG the scoring engine
//! walks over.
//!
//! # Overview
//!
//! The graph is a directed acyclic graph where:
//!
//! - Nodes are terms of the formula (variables, function symbols,
//!   applications, conjunctions, ...)
//! - Edges are signed: an edge may refer to the negation of its target
//!
//! # Design Decisions
//!
//! 1. Nodes are handed out as `Rc` handles. Cloning a handle is the
//!    ownership claim; dropping it is the release. Any table that stores a
//!    node therefore keeps it alive exactly as long as the entry exists.
//!
//! 2. Negation is a flag on the edge, never folded into the handle.
//!
//! 3. Identity is a stable integer id assigned in creation order. Hashing,
//!    equality and ordering of handles go by this id.
//!
//! 4. Traversal marks live in the node as a three-state enum so that the
//!    explicit-stack traversals of the scoring engine need no side table.

mod node;
mod store;

pub use node::{AuxMark, Edge, Node, NodeId, NodeKind, NodeRef};
pub use store::NodeGraph;
