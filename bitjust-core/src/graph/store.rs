//! Node Store
//!
//! The store owns every node of the expression graph and hands out
//! reference-counted handles to them. Structurally identical operator nodes
//! are shared, so the same sub-term always has the same id.

use std::collections::HashMap;

use smallvec::SmallVec;

use super::node::{AuxMark, Edge, Node, NodeId, NodeKind, NodeRef};

/// Key of the unique table: kind plus signed child ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Signature {
    kind: NodeKind,
    children: SmallVec<[(NodeId, bool); 3]>,
}

/// The expression graph.
///
/// Nodes are stored in creation order and indexed by id.
#[derive(Default)]
pub struct NodeGraph {
    /// All nodes, indexed by ID. The graph holds one claim on each.
    nodes: Vec<NodeRef>,

    /// Unique table for operator nodes.
    unique: HashMap<Signature, NodeId>,
}

impl NodeGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a Boolean constant.
    pub fn constant(&mut self, value: bool) -> NodeRef {
        let symbol = if value { "true" } else { "false" };
        self.insert(NodeKind::Const, Some(symbol), SmallVec::new())
    }

    /// Create a fresh bit-vector variable.
    pub fn var(&mut self, symbol: &str) -> NodeRef {
        self.insert(NodeKind::BvVar, Some(symbol), SmallVec::new())
    }

    /// Create a fresh lambda parameter.
    pub fn param(&mut self, symbol: &str) -> NodeRef {
        self.insert(NodeKind::Param, Some(symbol), SmallVec::new())
    }

    /// Create a fresh uninterpreted function symbol.
    pub fn uf(&mut self, symbol: &str) -> NodeRef {
        self.insert(NodeKind::Uf, Some(symbol), SmallVec::new())
    }

    /// Create a lambda term binding `param` in `body`.
    ///
    /// Lambda terms are treated as closed: the lambda itself is never
    /// parameterized, while the nodes of its body may be.
    pub fn lambda(&mut self, param: &NodeRef, body: impl Into<Edge>) -> NodeRef {
        assert_eq!(
            param.kind(),
            NodeKind::Param,
            "lambda binder {} is not a parameter",
            param
        );
        self.insert(NodeKind::Lambda, None, SmallVec::from_iter([param.edge(), body.into()]))
    }

    /// Apply a function (`Uf` or `Lambda`) to arguments.
    pub fn apply(&mut self, fun: &NodeRef, args: &[Edge]) -> NodeRef {
        assert!(
            matches!(fun.kind(), NodeKind::Uf | NodeKind::Lambda),
            "cannot apply non-function {}",
            fun
        );
        let mut children = SmallVec::with_capacity(args.len() + 1);
        children.push(fun.edge());
        children.extend(args.iter().cloned());
        self.insert(NodeKind::Apply, None, children)
    }

    /// Create a conjunction.
    pub fn and(&mut self, a: impl Into<Edge>, b: impl Into<Edge>) -> NodeRef {
        self.insert(NodeKind::And, None, SmallVec::from_iter([a.into(), b.into()]))
    }

    /// Create a disjunction, expressed as a negated conjunction.
    pub fn or(&mut self, a: impl Into<Edge>, b: impl Into<Edge>) -> Edge {
        !self.and(!a.into(), !b.into()).edge()
    }

    /// Create an equality.
    pub fn eq(&mut self, a: impl Into<Edge>, b: impl Into<Edge>) -> NodeRef {
        self.insert(NodeKind::Eq, None, SmallVec::from_iter([a.into(), b.into()]))
    }

    /// Create an if-then-else.
    pub fn cond(
        &mut self,
        condition: impl Into<Edge>,
        then: impl Into<Edge>,
        otherwise: impl Into<Edge>,
    ) -> NodeRef {
        self.insert(
            NodeKind::Cond,
            None,
            SmallVec::from_iter([condition.into(), then.into(), otherwise.into()]),
        )
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&NodeRef> {
        self.nodes.get(id.raw() as usize)
    }

    /// Get the total number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeRef> {
        self.nodes.iter()
    }

    /// Check that no node carries a traversal mark.
    pub fn aux_marks_clear(&self) -> bool {
        self.nodes
            .iter()
            .all(|node| node.aux_mark() == AuxMark::Unvisited)
    }

    fn insert(
        &mut self,
        kind: NodeKind,
        symbol: Option<&str>,
        children: SmallVec<[Edge; 3]>,
    ) -> NodeRef {
        let signature = (!children.is_empty()).then(|| Signature {
            kind,
            children: children
                .iter()
                .map(|edge| (edge.node().id(), edge.is_negated()))
                .collect(),
        });

        if let Some(id) = signature.as_ref().and_then(|s| self.unique.get(s)) {
            return self.nodes[id.raw() as usize].clone();
        }

        let parameterized = match kind {
            NodeKind::Param => true,
            NodeKind::Lambda => false,
            _ => children.iter().any(|edge| edge.node().is_parameterized()),
        };

        for edge in &children {
            edge.node().add_parent();
        }

        let id = NodeId::from(self.nodes.len() as u32);
        let node = NodeRef::new(Node::new(
            id,
            kind,
            symbol.map(Into::into),
            children,
            parameterized,
        ));

        if let Some(signature) = signature {
            self.unique.insert(signature, id);
        }
        self.nodes.push(node.clone());
        node
    }
}
