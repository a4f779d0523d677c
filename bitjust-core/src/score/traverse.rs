//! Traversal Marks
//!
//! The scoring passes walk the graph with an explicit stack and record
//! progress in each node's `aux_mark`. `MarkGuard` remembers every node it
//! marked and resets them to `Unvisited` when dropped, so the marks are
//! clean after every call, including when a fault unwinds through it.

use crate::graph::{AuxMark, Node};

/// Call-scoped record of marked nodes (the "unmark stack").
pub(crate) struct MarkGuard<'a> {
    marked: Vec<&'a Node>,
}

impl<'a> MarkGuard<'a> {
    pub(crate) fn new() -> Self {
        Self { marked: Vec::new() }
    }

    /// Set the mark of `node`, remembering it for the reset.
    pub(crate) fn mark(&mut self, node: &'a Node, mark: AuxMark) {
        if node.aux_mark() == AuxMark::Unvisited {
            self.marked.push(node);
        }
        node.set_aux_mark(mark);
    }

    /// Reset every mark set so far.
    pub(crate) fn reset(&mut self) {
        while let Some(node) = self.marked.pop() {
            node.set_aux_mark(AuxMark::Unvisited);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.marked.len()
    }
}

impl Drop for MarkGuard<'_> {
    fn drop(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeGraph;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn guard_resets_on_drop() {
        let mut graph = NodeGraph::new();
        let x = graph.var("x");
        let y = graph.var("y");

        {
            let mut guard = MarkGuard::new();
            guard.mark(&x, AuxMark::Pending);
            guard.mark(&x, AuxMark::Done);
            guard.mark(&y, AuxMark::Pending);
            assert_eq!(guard.len(), 2);
            assert!(!graph.aux_marks_clear());
        }

        assert!(graph.aux_marks_clear());
    }

    #[test]
    fn guard_resets_while_unwinding() {
        let mut graph = NodeGraph::new();
        let x = graph.var("x");

        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut guard = MarkGuard::new();
            guard.mark(&x, AuxMark::Pending);
            panic!("fault in the middle of a traversal");
        }));

        assert!(result.is_err());
        assert!(graph.aux_marks_clear());
    }

    #[test]
    fn explicit_reset_allows_reuse() {
        let mut graph = NodeGraph::new();
        let x = graph.var("x");

        let mut guard = MarkGuard::new();
        guard.mark(&x, AuxMark::Pending);
        guard.reset();
        assert_eq!(x.aux_mark(), AuxMark::Unvisited);
        assert_eq!(guard.len(), 0);

        guard.mark(&x, AuxMark::Done);
        assert_eq!(x.aux_mark(), AuxMark::Done);
    }
}
