//! Score Comparison
//!
//! Orders nodes by the score the active heuristic computed for them. The
//! order puts higher scores first and is used both for pairwise decisions
//! (`less`) and for sorting (`order_for_sort`). The two always agree.
//!
//! Comparing nodes before any scores exist is allowed and treats all nodes
//! as equal. Once the table exists, both nodes must have an entry.

use std::cmp::Ordering;

use super::dispatch::Scores;
use super::table::{Score, ScoreTable};
use crate::config::JustHeuristic;
use crate::graph::Node;

impl Scores {
    /// Whether `a` sorts before `b` under `heuristic`.
    pub fn less(&self, heuristic: JustHeuristic, a: &Node, b: &Node) -> bool {
        self.order_for_sort(heuristic, a, b) == Ordering::Less
    }

    /// Whether `node` can be compared under `heuristic`.
    ///
    /// True when the node has an entry in the active table, or when that
    /// table does not exist and every pair compares equal.
    pub fn is_scored(&self, heuristic: JustHeuristic, node: &Node) -> bool {
        match heuristic {
            JustHeuristic::None => true,
            JustHeuristic::MinDepth | JustHeuristic::MinDepthSkeleton => {
                self.depth.as_ref().map_or(true, |table| table.contains(node))
            }
            JustHeuristic::MinApp | JustHeuristic::MinAppSkeleton => {
                self.app.as_ref().map_or(true, |table| table.contains(node))
            }
        }
    }

    /// Higher score first; equal scores compare `Equal`.
    pub fn order_for_sort(&self, heuristic: JustHeuristic, a: &Node, b: &Node) -> Ordering {
        let scores = match heuristic {
            JustHeuristic::None => None,
            JustHeuristic::MinDepth | JustHeuristic::MinDepthSkeleton => self
                .depth
                .as_ref()
                .map(|table| score_pair(table, heuristic, a, b)),
            JustHeuristic::MinApp | JustHeuristic::MinAppSkeleton => self
                .app
                .as_ref()
                .map(|table| score_pair(table, heuristic, a, b)),
        };

        match scores {
            Some((sa, sb)) => sb.cmp(&sa),
            None => Ordering::Equal,
        }
    }
}

fn score_pair<V: Score>(
    table: &ScoreTable<V>,
    heuristic: JustHeuristic,
    a: &Node,
    b: &Node,
) -> (usize, usize) {
    (score_of(table, heuristic, a), score_of(table, heuristic, b))
}

fn score_of<V: Score>(table: &ScoreTable<V>, heuristic: JustHeuristic, node: &Node) -> usize {
    match table.get(node) {
        Some(score) => score.magnitude(),
        None => panic!("{} has no score under {}", node, heuristic),
    }
}
