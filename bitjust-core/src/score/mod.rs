//! Justification Scores
//!
//! This module computes, once per relevant node, how expensive it is to
//! justify the node's value, and orders nodes by that cost.
//!
//! # Heuristics
//!
//! ## Minimum depth
//!
//! The score is the length of the shortest path to an input. A conjunction
//! is as shallow as its shallowest operand.
//!
//! ## Minimum applications
//!
//! The score is the set of unique function applications that must be
//! justified on the cheapest path. A conjunction picks its cheapest operand,
//! every other node needs all of them.
//!
//! Both come in a skeleton variant that stops at applications, treating
//! them as inputs.
//!
//! # Implementation Notes
//!
//! All traversals use an explicit stack and the nodes' three-state
//! traversal mark, so deep formulas cannot overflow the call stack. Marks
//! are reset by a guard on every exit path.

mod apply;
mod compare;
mod depth;
mod dispatch;
mod stats;
mod table;
mod traverse;

pub use apply::compute_min_app;
pub use depth::compute_min_depth;
pub use dispatch::Scores;
pub use stats::ScoreStats;
pub use table::{AppScoreTable, ApplySet, DepthScoreTable, Score, ScoreEntry, ScoreTable};
