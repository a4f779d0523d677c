//! Minimum Application Scores
//!
//! The application score of a node is the set of unique, non-parameterized
//! applications that have to be justified on a cheapest justification path
//! below it. The comparator orders by the size of that set.
//!
//! # Aggregation
//!
//! - A non-parameterized conjunction is justified by one of its operands,
//!   so its set is a copy of the smallest child set (leftmost on ties).
//! - Every other node needs all of its operands, so its set is the union of
//!   all child sets, plus the node itself if it is an application.
//!
//! # Algorithm
//!
//! Two passes over the subgraph reachable from the seeds:
//!
//! 1. Mark pass: a plain DFS recording, for every unscored node, how many
//!    unscored parents will read its set and whether anyone outside those
//!    parents needs it (seeds and operands of conjunctions).
//! 2. Aggregation pass: the same post-order discipline as the depth scores.
//!    Each node's set is built from the cached sets of its children. A
//!    child without a cached set is searched locally for applications.
//!
//! Under `ScoreRetention::Compact` the set of a node that is not needed
//! outside its parents is dropped once the last parent has read it.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use tracing::{debug, trace};

use super::stats::ScoreStats;
use super::table::{AppScoreTable, ApplySet};
use super::traverse::MarkGuard;
use crate::config::{ScoreRetention, ScoringConfig};
use crate::graph::{AuxMark, Node, NodeId, NodeRef};

/// Extend `table` with the application score of every node reachable from
/// `seeds`.
///
/// Does nothing unless the configured heuristic is an application variant.
/// Returns the number of sets computed.
pub fn compute_min_app<'a, I>(
    table: &mut AppScoreTable,
    config: &ScoringConfig,
    stats: &mut ScoreStats,
    seeds: I,
) -> usize
where
    I: IntoIterator<Item = &'a NodeRef>,
{
    if !config.heuristic.is_app() {
        return 0;
    }

    let seeds: Vec<&'a NodeRef> = seeds.into_iter().collect();
    let mut scorer = AppScorer {
        table,
        stats,
        skeleton: config.heuristic.is_skeleton(),
        compact: config.retention == ScoreRetention::Compact,
        pending: HashMap::new(),
        computed: 0,
    };

    let reachable = scorer.mark_pass(&seeds);
    scorer.aggregation_pass(&seeds);

    debug!(
        heuristic = %config.heuristic,
        seeds = seeds.len(),
        reachable,
        computed = scorer.computed,
        total = scorer.table.len(),
        "computed application scores"
    );
    scorer.computed
}

/// Per-node bookkeeping of the mark pass.
#[derive(Debug, Default)]
struct Pending {
    /// Unscored parents that have not read the set yet.
    parents: u32,

    /// The set must stay in the table after all parents have read it.
    required: bool,
}

struct AppScorer<'t> {
    table: &'t mut AppScoreTable,
    stats: &'t mut ScoreStats,
    skeleton: bool,
    compact: bool,
    pending: HashMap<NodeId, Pending>,
    computed: usize,
}

impl AppScorer<'_> {
    /// Visit the unscored part of the reachable subgraph once.
    ///
    /// Returns the number of visited nodes.
    fn mark_pass<'a>(&mut self, seeds: &[&'a NodeRef]) -> usize {
        let mut marks = MarkGuard::new();
        let mut stack: Vec<&'a NodeRef> = Vec::new();

        for &seed in seeds {
            // Seeds are what the caller asks about, never evict them
            if !self.table.contains(seed) {
                self.pending.entry(seed.id()).or_default().required = true;
            }

            stack.push(seed);
            while let Some(cur) = stack.pop() {
                if cur.aux_mark() != AuxMark::Unvisited || self.table.contains(cur) {
                    continue;
                }
                marks.mark(cur, AuxMark::Done);

                if self.skeleton && cur.is_apply() {
                    continue;
                }

                // Count one pending read per parent edge. Operands of a
                // conjunction stay comparable for the decision procedure.
                let branching = cur.is_and() && !cur.is_parameterized();
                for edge in cur.children() {
                    let child = edge.node();
                    if !self.table.contains(child) {
                        let pending = self.pending.entry(child.id()).or_default();
                        pending.parents += 1;
                        pending.required |= branching;
                    }
                    stack.push(child);
                }
            }
        }

        marks.len()
    }

    fn aggregation_pass<'a>(&mut self, seeds: &[&'a NodeRef]) {
        let mut marks = MarkGuard::new();
        let mut stack: Vec<&'a NodeRef> = Vec::new();

        for &seed in seeds {
            stack.push(seed);
            while let Some(cur) = stack.pop() {
                if cur.aux_mark() == AuxMark::Done || self.table.contains(cur) {
                    continue;
                }

                match cur.aux_mark() {
                    AuxMark::Unvisited => {
                        // Leaves, and applications under the skeleton variant
                        if cur.arity() == 0 || (self.skeleton && cur.is_apply()) {
                            marks.mark(cur, AuxMark::Done);
                            let mut set = ApplySet::new();
                            if cur.is_apply() && !cur.is_parameterized() {
                                set.insert(cur);
                            }
                            self.store(cur, set);
                            continue;
                        }

                        marks.mark(cur, AuxMark::Pending);
                        stack.push(cur);
                        stack.extend(cur.children().iter().rev().map(|edge| edge.node()));
                    }
                    AuxMark::Pending => {
                        // All children done, build the set from theirs
                        marks.mark(cur, AuxMark::Done);
                        let set = aggregate(self.table, self.stats, self.skeleton, cur);
                        self.store(cur, set);
                        if self.compact {
                            self.release_children(cur);
                        }
                    }
                    AuxMark::Done => unreachable!(),
                }
            }
        }
    }

    fn store(&mut self, node: &NodeRef, set: ApplySet) {
        trace!(node = %node, applies = set.len(), "application score");
        self.table.insert(node, set);
        self.computed += 1;
    }

    /// Count `node` as having read its children's sets and drop the sets
    /// nobody else needs.
    fn release_children(&mut self, node: &Node) {
        for edge in node.children() {
            let child = edge.node();
            let Some(pending) = self.pending.get_mut(&child.id()) else {
                continue;
            };
            assert!(
                pending.parents > 0,
                "{} released more often than it has parents",
                child
            );
            pending.parents -= 1;

            if pending.parents == 0 && !pending.required && self.table.remove(child).is_some() {
                trace!(node = %child, "evicted application set");
                self.stats.sets_evicted += 1;
            }
        }
    }
}

/// A child's applications, either cached in the table or searched locally.
enum ChildApplies<'s> {
    Cached(&'s ApplySet),
    Collected(ApplySet),
}

impl ChildApplies<'_> {
    fn set(&self) -> &ApplySet {
        match self {
            ChildApplies::Cached(set) => set,
            ChildApplies::Collected(set) => set,
        }
    }
}

/// Build the set of `node` from its children.
fn aggregate(
    table: &AppScoreTable,
    stats: &mut ScoreStats,
    skeleton: bool,
    node: &NodeRef,
) -> ApplySet {
    let mut set = ApplySet::new();
    if node.is_apply() && !node.is_parameterized() {
        set.insert(node);
    }

    if node.is_and() && !node.is_parameterized() {
        let mut cheapest: Option<ChildApplies<'_>> = None;
        for edge in node.children() {
            let candidate = child_applies(table, stats, skeleton, edge.node());
            if cheapest
                .as_ref()
                .map_or(true, |best| candidate.set().len() < best.set().len())
            {
                cheapest = Some(candidate);
            }
        }
        if let Some(cheapest) = cheapest {
            merge_timed(stats, &mut set, cheapest.set());
        }
    } else {
        for edge in node.children() {
            let child = child_applies(table, stats, skeleton, edge.node());
            merge_timed(stats, &mut set, child.set());
        }
    }

    set
}

fn child_applies<'s>(
    table: &'s AppScoreTable,
    stats: &mut ScoreStats,
    skeleton: bool,
    child: &NodeRef,
) -> ChildApplies<'s> {
    match table.get(child) {
        Some(set) => ChildApplies::Cached(set),
        None => {
            stats.fallback_searches += 1;
            trace!(node = %child, "no cached set, searching applications");
            ChildApplies::Collected(collect_unique_applies(child, skeleton))
        }
    }
}

fn merge_timed(stats: &mut ScoreStats, into: &mut ApplySet, from: &ApplySet) {
    let start = Instant::now();
    into.merge(from);
    stats.merge_time += start.elapsed();
}

/// All non-parameterized applications below `root`, without caching
/// anything on the way.
fn collect_unique_applies(root: &NodeRef, skeleton: bool) -> ApplySet {
    let mut applies = ApplySet::new();
    let mut visited = HashSet::new();
    let mut stack = vec![root];

    while let Some(cur) = stack.pop() {
        if !visited.insert(cur.id()) {
            continue;
        }
        if cur.is_apply() {
            if !cur.is_parameterized() {
                applies.insert(cur);
            }
            if skeleton {
                continue;
            }
        }
        stack.extend(cur.children().iter().rev().map(|edge| edge.node()));
    }

    applies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JustHeuristic;
    use crate::graph::NodeGraph;

    fn ids(set: &ApplySet) -> Vec<NodeId> {
        let mut ids: Vec<_> = set.ids().collect();
        ids.sort();
        ids
    }

    fn score(
        table: &mut AppScoreTable,
        config: ScoringConfig,
        seeds: &[&NodeRef],
    ) -> (usize, ScoreStats) {
        let mut stats = ScoreStats::default();
        let computed = compute_min_app(table, &config, &mut stats, seeds.iter().copied());
        (computed, stats)
    }

    #[test]
    fn conjunction_takes_the_smaller_operand() {
        let mut graph = NodeGraph::new();
        let f = graph.uf("f");
        let x = graph.var("x");
        let y = graph.var("y");
        let v1 = graph.var("v1");
        let fx = graph.apply(&f, &[x.edge()]);
        let fy = graph.apply(&f, &[y.edge()]);
        let c1 = graph.and(&v1, &fx);

        let mut table = AppScoreTable::new();
        score(&mut table, ScoringConfig::new(JustHeuristic::MinApp), &[&c1, &fy]);

        assert!(table.get(&v1).unwrap().is_empty());
        assert_eq!(ids(table.get(&fx).unwrap()), vec![fx.id()]);
        assert!(table.get(&c1).unwrap().is_empty());
        assert_eq!(ids(table.get(&fy).unwrap()), vec![fy.id()]);
        assert!(graph.aux_marks_clear());
    }

    #[test]
    fn conjunction_ties_go_to_the_leftmost_operand() {
        let mut graph = NodeGraph::new();
        let f = graph.uf("f");
        let g = graph.uf("g");
        let x = graph.var("x");
        let fx = graph.apply(&f, &[x.edge()]);
        let gx = graph.apply(&g, &[x.edge()]);
        let left = graph.and(&fx, &gx);
        let right = graph.and(&gx, &fx);

        let mut table = AppScoreTable::new();
        score(&mut table, ScoringConfig::new(JustHeuristic::MinApp), &[&left, &right]);

        assert_eq!(ids(table.get(&left).unwrap()), vec![fx.id()]);
        assert_eq!(ids(table.get(&right).unwrap()), vec![gx.id()]);
    }

    #[test]
    fn other_nodes_take_the_union_without_duplicates() {
        let mut graph = NodeGraph::new();
        let f = graph.uf("f");
        let g = graph.uf("g");
        let x = graph.var("x");
        let fx = graph.apply(&f, &[x.edge()]);
        let gfx = graph.apply(&g, &[fx.edge()]);
        let eq = graph.eq(&fx, &gfx);

        let mut table = AppScoreTable::new();
        score(&mut table, ScoringConfig::new(JustHeuristic::MinApp), &[&eq]);

        assert_eq!(ids(table.get(&gfx).unwrap()), vec![fx.id(), gfx.id()]);
        assert_eq!(ids(table.get(&eq).unwrap()), vec![fx.id(), gfx.id()]);
    }

    #[test]
    fn nested_conjunctions_choose_per_level() {
        let mut graph = NodeGraph::new();
        let f = graph.uf("f");
        let x = graph.var("x");
        let y = graph.var("y");
        let fx = graph.apply(&f, &[x.edge()]);
        let fy = graph.apply(&f, &[y.edge()]);
        let both = graph.eq(&fx, &fy);
        let inner = graph.and(&both, &fy);
        let outer = graph.and(&inner, &both);

        let mut table = AppScoreTable::new();
        score(&mut table, ScoringConfig::new(JustHeuristic::MinApp), &[&outer]);

        assert_eq!(ids(table.get(&inner).unwrap()), vec![fy.id()]);
        assert_eq!(ids(table.get(&outer).unwrap()), vec![fy.id()]);
    }

    #[test]
    fn parameterized_applications_are_not_counted() {
        let mut graph = NodeGraph::new();
        let f = graph.uf("f");
        let p = graph.param("p");
        let x = graph.var("x");
        let body = graph.apply(&f, &[p.edge()]);
        let lambda = graph.lambda(&p, &body);
        let call = graph.apply(&lambda, &[x.edge()]);

        let mut table = AppScoreTable::new();
        score(&mut table, ScoringConfig::new(JustHeuristic::MinApp), &[&call]);

        assert!(table.get(&body).unwrap().is_empty());
        assert!(table.get(&lambda).unwrap().is_empty());
        assert_eq!(ids(table.get(&call).unwrap()), vec![call.id()]);
    }

    #[test]
    fn skeleton_treats_applications_as_leaves() {
        let mut graph = NodeGraph::new();
        let f = graph.uf("f");
        let g = graph.uf("g");
        let x = graph.var("x");
        let gx = graph.apply(&g, &[x.edge()]);
        let fgx = graph.apply(&f, &[gx.edge()]);
        let eq = graph.eq(&fgx, &x);

        let mut table = AppScoreTable::new();
        score(&mut table, ScoringConfig::new(JustHeuristic::MinAppSkeleton), &[&eq]);

        assert_eq!(ids(table.get(&fgx).unwrap()), vec![fgx.id()]);
        assert_eq!(ids(table.get(&eq).unwrap()), vec![fgx.id()]);
        assert!(!table.contains(&gx));
        assert!(!table.contains(&f));
    }

    #[test]
    fn compact_retention_keeps_required_scores() {
        let mut graph = NodeGraph::new();
        let f = graph.uf("f");
        let x = graph.var("x");
        let y = graph.var("y");
        let fx = graph.apply(&f, &[x.edge()]);
        let fy = graph.apply(&f, &[y.edge()]);
        let eq = graph.eq(&fx, &fy);
        let root = graph.and(&eq, &fy);

        let mut full = AppScoreTable::new();
        score(&mut full, ScoringConfig::new(JustHeuristic::MinApp), &[&root]);

        let mut compact = AppScoreTable::new();
        let config =
            ScoringConfig::new(JustHeuristic::MinApp).with_retention(ScoreRetention::Compact);
        let (computed, stats) = score(&mut compact, config, &[&root]);

        assert_eq!(computed, full.len());
        assert!(stats.sets_evicted > 0);
        assert_eq!(compact.len() as u64 + stats.sets_evicted, full.len() as u64);
        for node in [&root, &eq, &fy] {
            assert_eq!(compact.get(node), full.get(node));
        }
        assert!(!compact.contains(&fx));
        assert!(!compact.contains(&f));
    }

    #[test]
    fn claims_are_released_with_the_table() {
        let mut graph = NodeGraph::new();
        let f = graph.uf("f");
        let x = graph.var("x");
        let fx = graph.apply(&f, &[x.edge()]);
        let eq = graph.eq(&fx, &x);
        let root = graph.and(&eq, &fx);
        let before: Vec<usize> = graph.iter().map(NodeRef::claims).collect();

        let mut table = AppScoreTable::new();
        score(&mut table, ScoringConfig::new(JustHeuristic::MinApp), &[&root]);
        assert!(fx.claims() > before[fx.id().raw() as usize]);

        drop(table);
        let after: Vec<usize> = graph.iter().map(NodeRef::claims).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn missing_child_sets_are_searched_locally() {
        let mut graph = NodeGraph::new();
        let f = graph.uf("f");
        let g = graph.uf("g");
        let x = graph.var("x");
        let fx = graph.apply(&f, &[x.edge()]);
        let gfx = graph.apply(&g, &[fx.edge()]);
        let eq = graph.eq(&gfx, &x);

        let table = AppScoreTable::new();
        let mut stats = ScoreStats::default();
        let set = aggregate(&table, &mut stats, false, &eq);

        assert_eq!(ids(&set), vec![fx.id(), gfx.id()]);
        assert_eq!(stats.fallback_searches, 2);

        let skeleton = aggregate(&table, &mut stats, true, &eq);
        assert_eq!(ids(&skeleton), vec![gfx.id()]);
    }

    #[test]
    fn rescoring_is_idempotent() {
        let mut graph = NodeGraph::new();
        let f = graph.uf("f");
        let x = graph.var("x");
        let fx = graph.apply(&f, &[x.edge()]);
        let root = graph.and(&fx, &x);

        let mut table = AppScoreTable::new();
        let config = ScoringConfig::new(JustHeuristic::MinApp);
        let (first, _) = score(&mut table, config, &[&root]);
        let snapshot = table.clone();
        let (second, _) = score(&mut table, config, &[&root, &fx]);

        assert_eq!(first, 4);
        assert_eq!(second, 0);
        for (node, set) in snapshot.iter() {
            assert_eq!(table.get(node), Some(set));
        }
    }

    #[test]
    fn depth_heuristics_are_a_no_op() {
        let mut graph = NodeGraph::new();
        let x = graph.var("x");

        let mut table = AppScoreTable::new();
        let (computed, _) = score(&mut table, ScoringConfig::new(JustHeuristic::MinDepth), &[&x]);
        assert_eq!(computed, 0);
        assert!(table.is_empty());
    }
}
