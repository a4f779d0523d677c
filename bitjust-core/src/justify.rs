//! Justification
//!
//! Given a satisfying assignment of the Boolean skeleton, find the
//! applications whose values actually matter for it. A false conjunction
//! only needs one false operand to be justified; this is where the scores
//! come in: among several false operands the cheapest one is followed.

use std::collections::HashSet;

use tracing::debug;

use crate::context::ScoringContext;
use crate::graph::{Edge, Node, NodeKind, NodeRef};

/// A Boolean assignment to the nodes of the formula.
pub trait Valuation {
    /// Value of the node itself (ignoring any edge sign).
    fn value(&self, node: &Node) -> bool;

    /// Value of a signed reference.
    fn edge_value(&self, edge: &Edge) -> bool {
        self.value(edge.node()) != edge.is_negated()
    }
}

impl<F> Valuation for F
where
    F: Fn(&Node) -> bool,
{
    fn value(&self, node: &Node) -> bool {
        self(node)
    }
}

impl ScoringContext {
    /// Applications that have to be justified under `valuation`, in
    /// discovery order.
    ///
    /// Scores must have been computed for the current constraints and
    /// assumptions unless the heuristic is `None`.
    pub fn justified_applies(&self, valuation: &impl Valuation) -> Vec<NodeRef> {
        let mut applies = Vec::new();
        let mut visited = HashSet::new();
        let mut stack: Vec<&NodeRef> = Self::seeds(&self.constraints, &self.assumptions);
        stack.reverse();

        while let Some(cur) = stack.pop() {
            if !visited.insert(cur.id()) {
                continue;
            }

            match cur.kind() {
                NodeKind::Apply => {
                    if !cur.is_parameterized() {
                        applies.push(cur.clone());
                    }
                }
                NodeKind::And if !valuation.value(cur) => {
                    stack.push(self.cheapest_false_operand(cur, valuation).node());
                }
                NodeKind::Cond => {
                    let [condition, then, otherwise] = cur.children() else {
                        panic!("{} does not have three operands", cur);
                    };
                    let taken = if valuation.edge_value(condition) {
                        then
                    } else {
                        otherwise
                    };
                    stack.push(taken.node());
                    stack.push(condition.node());
                }
                _ => stack.extend(cur.children().iter().rev().map(Edge::node)),
            }
        }

        debug!(
            heuristic = %self.config.heuristic,
            applies = applies.len(),
            visited = visited.len(),
            "justified applications"
        );
        applies
    }

    /// The false operand of a false conjunction that is cheapest to justify.
    ///
    /// Operands without a score (dual propagation keeps only variables and
    /// applications) are not compared; the leftmost false operand is kept.
    fn cheapest_false_operand<'a>(&self, node: &'a Node, valuation: &impl Valuation) -> &'a Edge {
        let heuristic = self.config.heuristic;
        let mut cheapest: Option<&Edge> = None;
        for edge in node.children() {
            if valuation.edge_value(edge) {
                continue;
            }
            match cheapest {
                Some(best)
                    if !self.scores.is_scored(heuristic, best.node())
                        || !self.scores.is_scored(heuristic, edge.node())
                        || !self.less(best, edge) => {}
                _ => cheapest = Some(edge),
            }
        }
        cheapest.unwrap_or_else(|| panic!("{} is false but has no false operand", node))
    }
}
