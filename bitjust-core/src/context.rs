//! Solving Context
//!
//! The context ties together the expression graph, the formula being solved
//! (constraints and assumptions), the scoring configuration and the score
//! tables. It is the object the decision procedure talks to.
//!
//! # Lifecycle
//!
//! 1. Build the formula in `graph_mut()` and assert it with
//!    `add_constraint` / `assume`.
//! 2. Call `compute_scores` (or `compute_scores_dual_prop`) before the
//!    decision procedure runs.
//! 3. Query `less` / `order_for_sort` / `justified_applies`.
//!
//! Scores persist across calls; later calls only add entries for nodes that
//! have none. `reset_scores` is the only way to drop them.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::config::{JustHeuristic, ScoringConfig};
use crate::graph::{Edge, Node, NodeGraph, NodeId, NodeRef};
use crate::score::{AppScoreTable, DepthScoreTable, ScoreStats, Scores};

/// Key of a signed root: the node id and the sign.
type RootKey = (NodeId, bool);

/// The solving context.
#[derive(Default)]
pub struct ScoringContext {
    pub(crate) graph: NodeGraph,
    pub(crate) constraints: IndexMap<RootKey, Edge>,
    pub(crate) assumptions: IndexMap<RootKey, Edge>,
    pub(crate) config: ScoringConfig,
    pub(crate) scores: Scores,
}

impl ScoringContext {
    /// Create a context with an empty graph.
    pub fn new(config: ScoringConfig) -> Self {
        Self::with_graph(NodeGraph::new(), config)
    }

    /// Create a context over an existing graph.
    pub fn with_graph(graph: NodeGraph, config: ScoringConfig) -> Self {
        Self {
            graph,
            config,
            ..Self::default()
        }
    }

    /// Get the expression graph.
    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    /// Get the expression graph for building new nodes.
    pub fn graph_mut(&mut self) -> &mut NodeGraph {
        &mut self.graph
    }

    /// Get the active configuration.
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Switch the heuristic. Tables computed so far are kept.
    pub fn set_heuristic(&mut self, heuristic: JustHeuristic) {
        self.config.heuristic = heuristic;
    }

    /// Assert a top-level constraint.
    pub fn add_constraint(&mut self, root: impl Into<Edge>) {
        let root = root.into();
        root.node().set_constraint(true);
        self.constraints
            .entry((root.node().id(), root.is_negated()))
            .or_insert(root);
    }

    /// Add an assumption for the next solver call.
    pub fn assume(&mut self, root: impl Into<Edge>) {
        let root = root.into();
        self.assumptions
            .entry((root.node().id(), root.is_negated()))
            .or_insert(root);
    }

    /// Drop all assumptions. Scores computed from them are kept.
    pub fn clear_assumptions(&mut self) {
        self.assumptions.clear();
    }

    /// Constraints in insertion order.
    pub fn constraints(&self) -> impl Iterator<Item = &Edge> {
        self.constraints.values()
    }

    pub fn assumptions(&self) -> impl Iterator<Item = &Edge> {
        self.assumptions.values()
    }

    /// Sign-stripped roots: constraints first, then assumptions.
    pub(crate) fn seeds<'a>(
        constraints: &'a IndexMap<RootKey, Edge>,
        assumptions: &'a IndexMap<RootKey, Edge>,
    ) -> Vec<&'a NodeRef> {
        constraints
            .values()
            .chain(assumptions.values())
            .map(Edge::node)
            .collect()
    }

    /// Compute scores for everything reachable from the constraints and
    /// assumptions. A no-op under `JustHeuristic::None`.
    pub fn compute_scores(&mut self) {
        debug_assert!(self.graph.aux_marks_clear(), "traversal marks left set");
        let seeds = Self::seeds(&self.constraints, &self.assumptions);
        self.scores.dispatch(&self.config, &seeds);
        debug_assert!(self.graph.aux_marks_clear(), "traversal marks left set");
    }

    /// Compute scores seeded from the applications and variables of the
    /// Boolean skeleton, as used by dual propagation.
    pub fn compute_scores_dual_prop(&mut self) {
        debug_assert!(self.graph.aux_marks_clear(), "traversal marks left set");
        let seeds = Self::seeds(&self.constraints, &self.assumptions);
        self.scores.dispatch_dual_prop(&self.config, &seeds);
        debug_assert!(self.graph.aux_marks_clear(), "traversal marks left set");
    }

    /// Whether `a` sorts before `b`, i.e. has the strictly higher score.
    ///
    /// Agrees with `order_for_sort(a, b) == Ordering::Less`.
    pub fn less(&self, a: &impl AsRef<Node>, b: &impl AsRef<Node>) -> bool {
        self.scores.less(self.config.heuristic, a.as_ref(), b.as_ref())
    }

    /// Sort order over scored nodes: higher scores first.
    ///
    /// `Ordering` converts to the conventional `-1 / 0 / 1` with `as i32`.
    pub fn order_for_sort(&self, a: &impl AsRef<Node>, b: &impl AsRef<Node>) -> Ordering {
        self.scores
            .order_for_sort(self.config.heuristic, a.as_ref(), b.as_ref())
    }

    /// Stable sort by `order_for_sort`.
    pub fn sort_by_score(&self, nodes: &mut [NodeRef]) {
        nodes.sort_by(|a, b| self.order_for_sort(a, b));
    }

    /// The depth table, if a depth heuristic ran since the last reset.
    pub fn depth_scores(&self) -> Option<&DepthScoreTable> {
        self.scores.depth()
    }

    /// The application table, if an application heuristic ran since the last reset.
    pub fn app_scores(&self) -> Option<&AppScoreTable> {
        self.scores.app()
    }

    pub fn stats(&self) -> &ScoreStats {
        self.scores.stats()
    }

    /// Drop all scores. The next scoring call starts from scratch.
    pub fn reset_scores(&mut self) {
        self.scores.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraints_are_flagged_and_deduplicated() {
        let mut ctx = ScoringContext::new(ScoringConfig::default());
        let x = ctx.graph_mut().var("x");
        let y = ctx.graph_mut().var("y");
        let conj = ctx.graph_mut().and(&x, &y);

        ctx.add_constraint(&conj);
        ctx.add_constraint(&conj);
        ctx.add_constraint(!x.edge());

        assert!(conj.is_constraint());
        assert!(x.is_constraint());
        assert!(!y.is_constraint());
        assert_eq!(ctx.constraints().count(), 2);
    }

    #[test]
    fn switching_heuristic_keeps_computed_tables() {
        let mut ctx = ScoringContext::new(ScoringConfig::new(JustHeuristic::MinDepth));
        let x = ctx.graph_mut().var("x");
        let y = ctx.graph_mut().var("y");
        let conj = ctx.graph_mut().and(&x, &y);
        ctx.add_constraint(&conj);
        ctx.compute_scores();

        ctx.set_heuristic(JustHeuristic::MinApp);
        assert_eq!(ctx.config().heuristic, JustHeuristic::MinApp);
        assert!(ctx.app_scores().is_none());
        assert_eq!(ctx.depth_scores().map(|t| t.len()), Some(3));

        ctx.compute_scores();
        assert_eq!(ctx.app_scores().map(|t| t.len()), Some(3));
        assert_eq!(ctx.order_for_sort(&x, &conj), Ordering::Equal);
    }

    #[test]
    fn seeds_strip_signs_and_list_constraints_first() {
        let mut ctx = ScoringContext::new(ScoringConfig::default());
        let x = ctx.graph_mut().var("x");
        let y = ctx.graph_mut().var("y");

        ctx.assume(!y.edge());
        ctx.add_constraint(!x.edge());

        let seeds: Vec<_> = ScoringContext::seeds(&ctx.constraints, &ctx.assumptions)
            .into_iter()
            .map(|n| n.id())
            .collect();
        assert_eq!(seeds, vec![x.id(), y.id()]);

        ctx.clear_assumptions();
        assert_eq!(ctx.assumptions().count(), 0);
        assert!(!y.is_constraint());
    }
}
