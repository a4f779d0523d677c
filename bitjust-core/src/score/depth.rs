//! Minimum Depth Scores
//!
//! The depth score of a node is the length of the shortest path from it to
//! an input: leaves score 1, every other node scores one more than its
//! cheapest child. Under the skeleton variant applications count as inputs.
//!
//! # Algorithm
//!
//! Iterative post-order DFS with an explicit stack:
//!
//! 1. A node popped while `Unvisited` is marked `Pending` and pushed again
//!    on top of all its children.
//! 2. A node popped while `Pending` is marked `Done`; all its children are
//!    scored by now, so its own score is computed.
//! 3. Nodes that already have a score are skipped.
//!
//! Because the aggregate is a minimum, the result does not depend on the
//! order in which children are visited.

use tracing::{debug, trace};

use super::table::DepthScoreTable;
use super::traverse::MarkGuard;
use crate::config::JustHeuristic;
use crate::graph::{AuxMark, Node, NodeRef};

/// Extend `table` with the depth score of every node reachable from `seeds`.
///
/// Does nothing unless `heuristic` is a depth variant. Returns the number of
/// newly scored nodes.
pub fn compute_min_depth<'a, I>(
    table: &mut DepthScoreTable,
    heuristic: JustHeuristic,
    seeds: I,
) -> usize
where
    I: IntoIterator<Item = &'a NodeRef>,
{
    if !heuristic.is_depth() {
        return 0;
    }

    let skeleton = heuristic.is_skeleton();
    let before = table.len();
    let mut marks = MarkGuard::new();
    let mut stack: Vec<&'a NodeRef> = Vec::new();

    for seed in seeds {
        stack.push(seed);
        while let Some(cur) = stack.pop() {
            // Already scored in this or an earlier call
            if cur.aux_mark() == AuxMark::Done || table.contains(cur) {
                continue;
            }

            match cur.aux_mark() {
                AuxMark::Unvisited => {
                    // Inputs score 1 without descending
                    if cur.arity() == 0 || (skeleton && cur.is_apply()) {
                        table.insert(cur, 1);
                        continue;
                    }

                    // Revisit after all children are scored
                    marks.mark(cur, AuxMark::Pending);
                    stack.push(cur);
                    stack.extend(cur.children().iter().rev().map(|edge| edge.node()));
                }
                AuxMark::Pending => {
                    debug_assert!(cur.arity() > 0);
                    marks.mark(cur, AuxMark::Done);
                    let depth = min_child_depth(table, cur, heuristic) + 1;
                    trace!(node = %cur, depth, "depth score");
                    table.insert(cur, depth);
                }
                AuxMark::Done => unreachable!(),
            }
        }
    }

    let scored = table.len() - before;
    debug!(%heuristic, scored, total = table.len(), "computed depth scores");
    scored
}

fn min_child_depth(table: &DepthScoreTable, node: &Node, heuristic: JustHeuristic) -> u32 {
    node.children()
        .iter()
        .map(|edge| {
            let child = edge.node();
            match table.get(child) {
                Some(depth) => *depth,
                None => panic!(
                    "child {} of {} has no depth score under {}",
                    child, node, heuristic
                ),
            }
        })
        .min()
        .unwrap_or_else(|| panic!("{} has no children to take a depth from", node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeGraph;

    #[test]
    fn leaves_score_one_and_parents_take_min() {
        let mut graph = NodeGraph::new();
        let f = graph.uf("f");
        let x = graph.var("x");
        let v1 = graph.var("v1");
        let fx = graph.apply(&f, &[x.edge()]);
        let eq = graph.eq(&fx, &x);
        let c1 = graph.and(&v1, &eq);

        let mut table = DepthScoreTable::new();
        let scored = compute_min_depth(&mut table, JustHeuristic::MinDepth, [&c1]);

        assert_eq!(scored, 6);
        assert_eq!(table.get(&v1), Some(&1));
        assert_eq!(table.get(&f), Some(&1));
        assert_eq!(table.get(&fx), Some(&2));
        assert_eq!(table.get(&eq), Some(&2));
        assert_eq!(table.get(&c1), Some(&2));
        assert!(graph.aux_marks_clear());
    }

    #[test]
    fn skeleton_cuts_at_applications() {
        let mut graph = NodeGraph::new();
        let f = graph.uf("f");
        let x = graph.var("x");
        let y = graph.var("y");
        let inner = graph.eq(&x, &y);
        let fx = graph.apply(&f, &[inner.edge()]);
        let c = graph.eq(&fx, &y);

        let mut table = DepthScoreTable::new();
        compute_min_depth(&mut table, JustHeuristic::MinDepthSkeleton, [&c]);

        assert_eq!(table.get(&fx), Some(&1));
        assert_eq!(table.get(&c), Some(&2));
        assert!(!table.contains(&inner));
        assert!(!table.contains(&f));
    }

    #[test]
    fn negated_edges_are_stripped() {
        let mut graph = NodeGraph::new();
        let x = graph.var("x");
        let y = graph.var("y");
        let inner = graph.and(!x.edge(), &y);
        let outer = graph.and(!inner.edge(), &x);

        let mut table = DepthScoreTable::new();
        compute_min_depth(&mut table, JustHeuristic::MinDepth, [&outer]);

        assert_eq!(table.get(&inner), Some(&2));
        assert_eq!(table.get(&outer), Some(&2));
    }

    #[test]
    fn existing_entries_are_kept() {
        let mut graph = NodeGraph::new();
        let x = graph.var("x");
        let y = graph.var("y");
        let conj = graph.and(&x, &y);

        let mut table = DepthScoreTable::new();
        compute_min_depth(&mut table, JustHeuristic::MinDepth, [&conj]);
        let again = compute_min_depth(&mut table, JustHeuristic::MinDepth, [&conj, &x]);

        assert_eq!(again, 0);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn other_heuristics_are_a_no_op() {
        let mut graph = NodeGraph::new();
        let x = graph.var("x");

        let mut table = DepthScoreTable::new();
        assert_eq!(compute_min_depth(&mut table, JustHeuristic::MinApp, [&x]), 0);
        assert_eq!(compute_min_depth(&mut table, JustHeuristic::None, [&x]), 0);
        assert!(table.is_empty());
    }
}
