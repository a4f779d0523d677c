//! Score Dispatch
//!
//! Routes a scoring request to the scorer of the active heuristic and owns
//! the tables the scorers write into. Tables are created on first use and
//! live until `Scores::reset`.

use tracing::debug;

use super::apply::compute_min_app;
use super::depth::compute_min_depth;
use super::stats::ScoreStats;
use super::table::{AppScoreTable, DepthScoreTable};
use super::traverse::MarkGuard;
use crate::config::{JustHeuristic, ScoringConfig};
use crate::graph::{AuxMark, NodeRef};

/// The score tables of a solving context.
#[derive(Debug, Default)]
pub struct Scores {
    pub(crate) depth: Option<DepthScoreTable>,
    pub(crate) app: Option<AppScoreTable>,
    pub(crate) stats: ScoreStats,
}

impl Scores {
    /// Create an empty set of tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// The depth table, if a depth heuristic ever ran.
    pub fn depth(&self) -> Option<&DepthScoreTable> {
        self.depth.as_ref()
    }

    /// The application table, if an application heuristic ever ran.
    pub fn app(&self) -> Option<&AppScoreTable> {
        self.app.as_ref()
    }

    /// Counters accumulated since the last reset.
    pub fn stats(&self) -> &ScoreStats {
        &self.stats
    }

    /// Drop both tables and their claims, and clear the statistics.
    pub fn reset(&mut self) {
        self.depth = None;
        self.app = None;
        self.stats = ScoreStats::default();
    }

    /// Compute scores for everything reachable from `seeds` with the
    /// scorer selected by `config`. Existing entries are never recomputed.
    pub fn dispatch(&mut self, config: &ScoringConfig, seeds: &[&NodeRef]) {
        match config.heuristic {
            JustHeuristic::None => {}
            JustHeuristic::MinDepth | JustHeuristic::MinDepthSkeleton => {
                let table = self.depth.get_or_insert_with(DepthScoreTable::new);
                let scored = compute_min_depth(table, config.heuristic, seeds.iter().copied());
                self.stats.depth_nodes_scored += scored as u64;
            }
            JustHeuristic::MinApp | JustHeuristic::MinAppSkeleton => {
                let table = self.app.get_or_insert_with(AppScoreTable::new);
                let computed =
                    compute_min_app(table, config, &mut self.stats, seeds.iter().copied());
                self.stats.app_nodes_scored += computed as u64;
            }
        }
    }

    /// Score from the leaves of the Boolean skeleton instead of the seeds.
    ///
    /// Only variables and applications are meaningful under dual
    /// propagation, so for the application heuristics every other entry is
    /// dropped afterwards.
    pub fn dispatch_dual_prop(&mut self, config: &ScoringConfig, seeds: &[&NodeRef]) {
        if config.heuristic == JustHeuristic::None {
            return;
        }

        let leaves = skeleton_leaves(seeds);
        debug!(
            heuristic = %config.heuristic,
            seeds = seeds.len(),
            leaves = leaves.len(),
            "dual propagation seeds"
        );
        self.dispatch(config, &leaves);

        if config.heuristic.is_app() {
            if let Some(table) = self.app.as_mut() {
                let pruned = table.retain(|node, _| node.is_bv_var() || node.is_apply());
                self.stats.dual_prop_entries_pruned += pruned as u64;
                debug!(pruned, remaining = table.len(), "pruned dual propagation scores");
            }
        }
    }
}

/// Applications and variables reachable from `seeds` without passing
/// through an application, in discovery order.
pub(crate) fn skeleton_leaves<'a>(seeds: &[&'a NodeRef]) -> Vec<&'a NodeRef> {
    let mut marks = MarkGuard::new();
    let mut stack: Vec<&'a NodeRef> = Vec::new();
    let mut leaves = Vec::new();

    for &seed in seeds {
        stack.push(seed);
        while let Some(cur) = stack.pop() {
            if cur.aux_mark() != AuxMark::Unvisited {
                continue;
            }
            marks.mark(cur, AuxMark::Done);

            if cur.is_apply() || cur.is_bv_var() {
                leaves.push(cur);
                continue;
            }
            stack.extend(cur.children().iter().rev().map(|edge| edge.node()));
        }
    }

    leaves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeGraph;

    #[test]
    fn none_creates_no_tables() {
        let mut graph = NodeGraph::new();
        let x = graph.var("x");

        let mut scores = Scores::new();
        let config = ScoringConfig::new(JustHeuristic::None);
        scores.dispatch(&config, &[&x]);
        scores.dispatch_dual_prop(&config, &[&x]);

        assert!(scores.depth().is_none());
        assert!(scores.app().is_none());
        assert_eq!(scores.stats(), &ScoreStats::default());
    }

    #[test]
    fn routes_to_the_matching_table() {
        let mut graph = NodeGraph::new();
        let x = graph.var("x");
        let y = graph.var("y");
        let conj = graph.and(&x, &y);

        let mut scores = Scores::new();
        scores.dispatch(&ScoringConfig::new(JustHeuristic::MinDepth), &[&conj]);
        assert_eq!(scores.depth().map(|t| t.len()), Some(3));
        assert!(scores.app().is_none());

        scores.dispatch(&ScoringConfig::new(JustHeuristic::MinAppSkeleton), &[&conj]);
        assert_eq!(scores.app().map(|t| t.len()), Some(3));
        assert_eq!(scores.stats().depth_nodes_scored, 3);
        assert_eq!(scores.stats().app_nodes_scored, 3);

        scores.reset();
        assert!(scores.depth().is_none());
        assert!(scores.app().is_none());
    }

    #[test]
    fn skeleton_leaves_stop_at_applications() {
        let mut graph = NodeGraph::new();
        let f = graph.uf("f");
        let x = graph.var("x");
        let y = graph.var("y");
        let fx = graph.apply(&f, &[x.edge()]);
        let eq = graph.eq(&fx, &y);
        let root = graph.and(&eq, !x.edge());

        let leaves: Vec<_> = skeleton_leaves(&[&root]).into_iter().map(|n| n.id()).collect();
        assert_eq!(leaves, vec![fx.id(), y.id(), x.id()]);
        assert!(graph.aux_marks_clear());
    }

    #[test]
    fn dual_prop_keeps_only_variables_and_applications() {
        let mut graph = NodeGraph::new();
        let f = graph.uf("f");
        let x = graph.var("x");
        let y = graph.var("y");
        let fx = graph.apply(&f, &[x.edge()]);
        let eq = graph.eq(&fx, &y);
        let root = graph.and(&eq, &x);

        let mut scores = Scores::new();
        scores.dispatch_dual_prop(&ScoringConfig::new(JustHeuristic::MinApp), &[&root]);

        let table = scores.app().unwrap();
        assert!(table.iter().all(|(node, _)| node.is_bv_var() || node.is_apply()));
        assert!(table.contains(&fx));
        assert!(table.contains(&x));
        assert!(table.contains(&y));
        assert!(!table.contains(&root));
        assert!(!table.contains(&f));
        assert_eq!(scores.stats().dual_prop_entries_pruned, 1);
    }

    #[test]
    fn dual_prop_depth_scores_are_not_pruned() {
        let mut graph = NodeGraph::new();
        let f = graph.uf("f");
        let x = graph.var("x");
        let fx = graph.apply(&f, &[x.edge()]);
        let root = graph.eq(&fx, &x);

        let mut scores = Scores::new();
        scores.dispatch_dual_prop(&ScoringConfig::new(JustHeuristic::MinDepth), &[&root]);

        let table = scores.depth().unwrap();
        assert_eq!(table.get(&fx), Some(&2));
        assert!(table.contains(&f));
        assert!(!table.contains(&root));
    }
}
