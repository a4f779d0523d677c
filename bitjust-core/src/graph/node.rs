//! Graph Nodes
//!
//! This module defines the node types that live in the expression graph:
//! identifiers, kinds, signed edges and the reference-counted handle that
//! every owner of a node holds.

use std::cell::Cell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, Not};
use std::rc::Rc;

use smallvec::SmallVec;

/// Unique identifier for a node in the expression graph.
///
/// Ids are assigned in creation order, so every child has a smaller id than
/// any of its parents. The id does not change when a reference is negated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Get the raw ID value.
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of node in the expression graph.
///
/// The scoring engine only distinguishes `And`, `Apply`, `BvVar` and `Uf`;
/// every other kind is treated uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A Boolean constant.
    Const,

    /// A bit-vector variable. These are the inputs of the formula.
    BvVar,

    /// A lambda parameter.
    Param,

    /// An uninterpreted function symbol.
    Uf,

    /// A lambda term binding one parameter.
    Lambda,

    /// A function application. Its value has to be justified separately.
    Apply,

    /// A conjunction.
    And,

    /// An equality.
    Eq,

    /// An if-then-else.
    Cond,
}

impl NodeKind {
    /// Short lowercase name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Const => "const",
            NodeKind::BvVar => "var",
            NodeKind::Param => "param",
            NodeKind::Uf => "uf",
            NodeKind::Lambda => "lambda",
            NodeKind::Apply => "apply",
            NodeKind::And => "and",
            NodeKind::Eq => "eq",
            NodeKind::Cond => "cond",
        }
    }
}

/// Transient traversal mark.
///
/// Every engine call leaves all marks `Unvisited` on return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuxMark {
    /// Not reached by the current traversal.
    #[default]
    Unvisited,

    /// Reached once; its children are on the stack above it.
    Pending,

    /// Post-order visit finished.
    Done,
}

/// A node in the expression graph.
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    symbol: Option<Box<str>>,
    children: SmallVec<[Edge; 3]>,
    parameterized: bool,

    /// Number of parent edges pointing at this node.
    parents: Cell<u32>,

    /// Set once the node is asserted as a top-level constraint.
    constraint: Cell<bool>,

    aux_mark: Cell<AuxMark>,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        kind: NodeKind,
        symbol: Option<Box<str>>,
        children: SmallVec<[Edge; 3]>,
        parameterized: bool,
    ) -> Self {
        Self {
            id,
            kind,
            symbol,
            children,
            parameterized,
            parents: Cell::new(0),
            constraint: Cell::new(false),
            aux_mark: Cell::new(AuxMark::Unvisited),
        }
    }

    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the node's kind.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Symbol of a variable, parameter or function, if any.
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Number of children.
    pub fn arity(&self) -> usize {
        self.children.len()
    }

    /// Signed child references in declaration order.
    pub fn children(&self) -> &[Edge] {
        &self.children
    }

    /// Whether the node depends on a lambda parameter.
    pub fn is_parameterized(&self) -> bool {
        self.parameterized
    }

    /// Check if this is a conjunction.
    pub fn is_and(&self) -> bool {
        self.kind == NodeKind::And
    }

    /// Check if this is a function application.
    pub fn is_apply(&self) -> bool {
        self.kind == NodeKind::Apply
    }

    /// Check if this is a bit-vector variable.
    pub fn is_bv_var(&self) -> bool {
        self.kind == NodeKind::BvVar
    }

    /// Check if this is an uninterpreted function symbol.
    pub fn is_uf(&self) -> bool {
        self.kind == NodeKind::Uf
    }

    /// Number of parent edges.
    pub fn parents(&self) -> u32 {
        self.parents.get()
    }

    pub(crate) fn add_parent(&self) {
        self.parents.set(self.parents.get() + 1);
    }

    /// Whether the node is a top-level constraint.
    pub fn is_constraint(&self) -> bool {
        self.constraint.get()
    }

    pub(crate) fn set_constraint(&self, constraint: bool) {
        self.constraint.set(constraint);
    }

    /// Current traversal mark.
    pub fn aux_mark(&self) -> AuxMark {
        self.aux_mark.get()
    }

    pub(crate) fn set_aux_mark(&self, mark: AuxMark) {
        self.aux_mark.set(mark);
    }
}

impl AsRef<Node> for Node {
    fn as_ref(&self) -> &Node {
        self
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "{}#{}({})", self.kind.name(), self.id, symbol),
            None => write!(f, "{}#{}", self.kind.name(), self.id),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("symbol", &self.symbol)
            .field("children", &self.children)
            .field("parameterized", &self.parameterized)
            .field("parents", &self.parents.get())
            .finish()
    }
}

/// Reference-counted handle to a node.
///
/// Cloning a handle acquires one ownership claim on the node and dropping
/// it releases that claim. Equality, hashing and ordering go by id.
#[derive(Clone)]
pub struct NodeRef(Rc<Node>);

impl NodeRef {
    pub(crate) fn new(node: Node) -> Self {
        Self(Rc::new(node))
    }

    /// Number of live ownership claims on the node.
    pub fn claims(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// A positive edge to this node.
    pub fn edge(&self) -> Edge {
        Edge::new(self.clone(), false)
    }
}

impl Deref for NodeRef {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.0
    }
}

impl AsRef<Node> for NodeRef {
    fn as_ref(&self) -> &Node {
        &self.0
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for NodeRef {}

impl Hash for NodeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRef({})", self.0)
    }
}

/// A signed reference to a node.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    target: NodeRef,
    negated: bool,
}

impl Edge {
    /// Create an edge to `target`, negated if `negated` is set.
    pub fn new(target: NodeRef, negated: bool) -> Self {
        Self { target, negated }
    }

    /// The referenced node with the sign stripped.
    pub fn node(&self) -> &NodeRef {
        &self.target
    }

    /// Whether the edge refers to the negation of its target.
    pub fn is_negated(&self) -> bool {
        self.negated
    }
}

impl Not for Edge {
    type Output = Edge;

    fn not(self) -> Edge {
        Edge {
            target: self.target,
            negated: !self.negated,
        }
    }
}

impl From<NodeRef> for Edge {
    fn from(target: NodeRef) -> Self {
        Edge::new(target, false)
    }
}

impl From<&NodeRef> for Edge {
    fn from(target: &NodeRef) -> Self {
        target.edge()
    }
}

impl AsRef<Node> for Edge {
    fn as_ref(&self) -> &Node {
        &self.target
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "-{}", self.target.id())
        } else {
            write!(f, "{}", self.target.id())
        }
    }
}
