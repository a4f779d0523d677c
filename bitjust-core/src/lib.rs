//! Bitjust Core
//!
//! This crate provides the decision-heuristic scoring engine of a lazy
//! bit-vector/array solver. Before the decision procedure assigns values to
//! the Boolean structure of a formula, it needs to know which operand of a
//! conjunction is cheaper to satisfy. The engine precomputes such scores
//! once per node and exposes a total order over them.
//!
//! It implements:
//!
//! - An expression graph with signed edges and reference-counted handles
//! - Minimum-depth and minimum-application scores (with skeleton variants)
//! - Dual-propagation seeding from the applications of the skeleton
//! - The score order consumed by the decision procedure
//! - Justification of applications under a Boolean assignment
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: Nodes, signed edges and the node store
//! - `score`: Score tables, scorers, dispatch and comparison
//! - `config`: Heuristic selection and retention options
//! - `context`: The solving context owning graph, formula and scores
//! - `justify`: Justification-based selection of applications
//! - `sat`: The SAT backend interface and adapters
//!
//! # Example
//!
//! ```rust
//! use bitjust_core::{JustHeuristic, ScoringConfig, ScoringContext};
//!
//! let mut ctx = ScoringContext::new(ScoringConfig::new(JustHeuristic::MinApp));
//! let graph = ctx.graph_mut();
//! let f = graph.uf("f");
//! let x = graph.var("x");
//! let v1 = graph.var("v1");
//! let fx = graph.apply(&f, &[x.edge()]);
//! let c1 = graph.and(&v1, &fx);
//! ctx.add_constraint(&c1);
//!
//! ctx.compute_scores();
//!
//! // v1 needs no application to be justified, f(x) needs one.
//! assert!(ctx.less(&fx, &v1));
//! assert!(!ctx.less(&v1, &fx));
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod justify;
pub mod sat;
pub mod score;

pub use config::{JustHeuristic, ScoreRetention, ScoringConfig};
pub use context::ScoringContext;
pub use error::{ConfigError, SatError};
pub use graph::{AuxMark, Edge, Node, NodeGraph, NodeId, NodeKind, NodeRef};
pub use justify::Valuation;
pub use score::ScoreStats;
