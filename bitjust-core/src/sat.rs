//! SAT Backend Adapter
//!
//! The interface the surrounding solver uses to talk to an incremental SAT
//! solver, plus two small adapters built on it:
//!
//! - `CountingBackend` wraps any backend and counts the calls made to it.
//! - `SatValuation` reads the Boolean value of graph nodes from a model.
//!
//! Literals follow the DIMACS convention: non-zero `i32`, negative for
//! negation, `0` terminates a clause passed to `add`.

use std::cell::Cell;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::error::SatError;
use crate::graph::{Node, NodeId};
use crate::justify::Valuation;

/// Result of a SAT call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SatAnswer {
    Sat,
    Unsat,
    /// The budget ran out before an answer was found.
    Unknown,
}

/// An incremental SAT solver.
pub trait SatBackend {
    /// Add a literal to the current clause; `0` closes it.
    fn add(&mut self, lit: i32);

    /// Assume a literal for the next `solve` call only.
    fn assume(&mut self, lit: i32);

    /// Solve under the current assumptions. `budget` limits the effort
    /// where the backend supports it.
    fn solve(&mut self, budget: Option<u32>) -> SatAnswer;

    /// Value of a literal in the last model.
    fn deref(&self, lit: i32) -> bool;

    /// Whether an assumption was part of the last conflict.
    fn failed(&self, lit: i32) -> bool;

    /// Release the solver and all of its clauses.
    fn reset(&mut self);
}

/// Call counters of a `CountingBackend`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SatCounters {
    pub adds: u64,
    pub assumes: u64,
    pub derefs: u64,
    pub fails: u64,
    pub solves: u64,
}

/// Backend wrapper counting every call it forwards.
pub struct CountingBackend<B> {
    inner: B,
    counters: Cell<SatCounters>,
}

impl<B: SatBackend> CountingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            counters: Cell::new(SatCounters::default()),
        }
    }

    /// Counts of all calls forwarded so far.
    pub fn counters(&self) -> SatCounters {
        self.counters.get()
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Unwrap the backend, discarding the counters.
    pub fn into_inner(self) -> B {
        self.inner
    }

    fn bump(&self, update: impl FnOnce(&mut SatCounters)) {
        let mut counters = self.counters.get();
        update(&mut counters);
        self.counters.set(counters);
    }
}

impl<B: SatBackend> SatBackend for CountingBackend<B> {
    fn add(&mut self, lit: i32) {
        self.bump(|c| c.adds += 1);
        self.inner.add(lit);
    }

    fn assume(&mut self, lit: i32) {
        self.bump(|c| c.assumes += 1);
        self.inner.assume(lit);
    }

    fn solve(&mut self, budget: Option<u32>) -> SatAnswer {
        self.bump(|c| c.solves += 1);
        let counters = self.counters();
        debug!(
            adds = counters.adds,
            assumes = counters.assumes,
            derefs = counters.derefs,
            fails = counters.fails,
            ?budget,
            "calling SAT backend"
        );
        let answer = self.inner.solve(budget);
        debug!(?answer, "SAT backend returned");
        answer
    }

    fn deref(&self, lit: i32) -> bool {
        self.bump(|c| c.derefs += 1);
        self.inner.deref(lit)
    }

    fn failed(&self, lit: i32) -> bool {
        self.bump(|c| c.fails += 1);
        self.inner.failed(lit)
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

/// Mapping from graph nodes to the SAT literals encoding them.
#[derive(Debug, Clone, Default)]
pub struct LiteralMap {
    literals: IndexMap<NodeId, i32>,
}

impl LiteralMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `node` is encoded by `literal`.
    pub fn bind(&mut self, node: &Node, literal: i32) -> Result<(), SatError> {
        if literal == 0 {
            return Err(SatError::ZeroLiteral);
        }
        if let Some(&existing) = self.literals.get(&node.id()) {
            return Err(SatError::AlreadyMapped {
                node: node.id(),
                literal: existing,
            });
        }
        self.literals.insert(node.id(), literal);
        Ok(())
    }

    /// Get the literal encoding `node`.
    pub fn literal(&self, node: &Node) -> Result<i32, SatError> {
        self.literals
            .get(&node.id())
            .copied()
            .ok_or(SatError::UnmappedNode(node.id()))
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}

/// Node values read from the model of a SAT backend.
pub struct SatValuation<'a, B> {
    backend: &'a B,
    literals: &'a LiteralMap,
}

impl<'a, B: SatBackend> SatValuation<'a, B> {
    pub fn new(backend: &'a B, literals: &'a LiteralMap) -> Self {
        Self { backend, literals }
    }

    pub fn try_value(&self, node: &Node) -> Result<bool, SatError> {
        Ok(self.backend.deref(self.literals.literal(node)?))
    }
}

impl<B: SatBackend> Valuation for SatValuation<'_, B> {
    fn value(&self, node: &Node) -> bool {
        match self.try_value(node) {
            Ok(value) => value,
            Err(err) => panic!("cannot evaluate {}: {}", node, err),
        }
    }
}
