//! Score Tables
//!
//! A score table maps node identity to a score. Each entry owns a claim on
//! its key node, and an application score owns a claim on every node it
//! contains. Claims are plain `NodeRef` clones, so removing an entry or
//! dropping the table releases exactly what the entry acquired.

use indexmap::IndexMap;

use crate::graph::{Node, NodeId, NodeRef};

/// A score that can be compared by size.
pub trait Score {
    /// The number the comparator orders by.
    fn magnitude(&self) -> usize;
}

impl Score for u32 {
    fn magnitude(&self) -> usize {
        *self as usize
    }
}

/// Set of unique applications ("critical unique applies") of one node.
///
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct ApplySet {
    applies: IndexMap<NodeId, NodeRef>,
}

impl ApplySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, acquiring a claim only if it was not present yet.
    pub fn insert(&mut self, node: &NodeRef) -> bool {
        if self.applies.contains_key(&node.id()) {
            return false;
        }
        self.applies.insert(node.id(), node.clone());
        true
    }

    /// Add every element of `other`, skipping those already present.
    ///
    /// Returns the number of newly inserted elements.
    pub fn merge(&mut self, other: &ApplySet) -> usize {
        other.iter().filter(|node| self.insert(node)).count()
    }

    /// Check if `node` is an element.
    pub fn contains(&self, node: &Node) -> bool {
        self.applies.contains_key(&node.id())
    }

    /// Number of unique applications.
    pub fn len(&self) -> usize {
        self.applies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applies.is_empty()
    }

    /// Iterate over the elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeRef> {
        self.applies.values()
    }

    /// Ids of the contained nodes, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.applies.keys().copied()
    }
}

impl Score for ApplySet {
    fn magnitude(&self) -> usize {
        self.len()
    }
}

impl PartialEq for ApplySet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.ids().all(|id| other.applies.contains_key(&id))
    }
}

impl Eq for ApplySet {}

impl<'a> FromIterator<&'a NodeRef> for ApplySet {
    fn from_iter<I: IntoIterator<Item = &'a NodeRef>>(iter: I) -> Self {
        let mut set = ApplySet::new();
        for node in iter {
            set.insert(node);
        }
        set
    }
}

/// A table entry: the claimed key node and its score.
#[derive(Debug, Clone)]
pub struct ScoreEntry<V> {
    node: NodeRef,
    score: V,
}

impl<V> ScoreEntry<V> {
    /// The node the score belongs to.
    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    pub fn score(&self) -> &V {
        &self.score
    }
}

/// Mapping from node identity to a score.
///
/// Entries are written once. Inserting a node that already has a score is
/// a programming fault.
#[derive(Debug, Clone)]
pub struct ScoreTable<V> {
    entries: IndexMap<NodeId, ScoreEntry<V>>,
}

/// Minimum depth to the inputs.
pub type DepthScoreTable = ScoreTable<u32>;

/// Unique applications on a cheapest justification path.
pub type AppScoreTable = ScoreTable<ApplySet>;

impl<V> Default for ScoreTable<V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<V> ScoreTable<V> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of scored nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, node: &Node) -> bool {
        self.entries.contains_key(&node.id())
    }

    /// Get the score of `node`, if it has one.
    pub fn get(&self, node: &Node) -> Option<&V> {
        self.entries.get(&node.id()).map(|entry| &entry.score)
    }

    pub fn get_by_id(&self, id: NodeId) -> Option<&V> {
        self.entries.get(&id).map(|entry| &entry.score)
    }

    /// Insert the score of `node`, claiming the node.
    ///
    /// # Panics
    ///
    /// Panics if `node` already has a score.
    pub fn insert(&mut self, node: &NodeRef, score: V) {
        let previous = self.entries.insert(
            node.id(),
            ScoreEntry {
                node: node.clone(),
                score,
            },
        );
        assert!(previous.is_none(), "score of {} computed twice", node);
    }

    /// Remove the entry of `node`, releasing its claims.
    pub fn remove(&mut self, node: &Node) -> Option<V> {
        self.entries
            .shift_remove(&node.id())
            .map(|entry| entry.score)
    }

    /// Keep only the entries for which `keep` returns true.
    ///
    /// Returns the number of removed entries.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&NodeRef, &V) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|_, entry| keep(&entry.node, &entry.score));
        before - self.entries.len()
    }

    /// Iterate over all entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeRef, &V)> {
        self.entries.values().map(|entry| (&entry.node, &entry.score))
    }

    /// Remove every entry, releasing all claims.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
