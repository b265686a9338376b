//! Node in the open digraph.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Node identifier, unique within its owning graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    pub(crate) fn shifted(self, offset: usize) -> Self {
        NodeId(self.0 + offset)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(id: usize) -> Self {
        NodeId(id)
    }
}

/// Neighbor id → number of parallel edges.
pub type Multiplicities = BTreeMap<NodeId, usize>;

/// Which neighbors a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Children only.
    Outgoing,
    /// Parents only.
    Incoming,
    Both,
}

/// A node of an open digraph.
///
/// The parent and child maps are only ever mutated through the owning
/// [`OpenDigraph`](super::OpenDigraph), which keeps both endpoints of every
/// edge in agreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node<L = String> {
    pub(crate) id: NodeId,
    pub(crate) label: L,
    pub(crate) parents: Multiplicities,
    pub(crate) children: Multiplicities,
}

impl<L> Node<L> {
    /// Build a node from an explicit description: `parents` and `children`
    /// are `(neighbor id, multiplicity)` pairs. Repeated neighbors accumulate
    /// and zero multiplicities are ignored.
    pub fn new(id: usize, label: L, parents: &[(usize, usize)], children: &[(usize, usize)]) -> Self {
        Self {
            id: NodeId(id),
            label,
            parents: collect_multiplicities(parents.iter().map(|&(n, m)| (NodeId(n), m))),
            children: collect_multiplicities(children.iter().map(|&(n, m)| (NodeId(n), m))),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &L {
        &self.label
    }

    pub fn parents(&self) -> &Multiplicities {
        &self.parents
    }

    pub fn children(&self) -> &Multiplicities {
        &self.children
    }

    pub fn parent_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.parents.keys().copied()
    }

    pub fn child_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.keys().copied()
    }

    /// Neighbor ids selected by `dir`. `Both` lists parents first; a node
    /// that is both parent and child appears twice.
    pub fn neighbor_ids(&self, dir: Direction) -> SmallVec<[NodeId; 8]> {
        match dir {
            Direction::Outgoing => self.child_ids().collect(),
            Direction::Incoming => self.parent_ids().collect(),
            Direction::Both => self.parent_ids().chain(self.child_ids()).collect(),
        }
    }

    /// Multiplicity of the edge `parent -> self`, 0 if absent.
    pub fn parent_multiplicity(&self, parent: NodeId) -> usize {
        self.parents.get(&parent).copied().unwrap_or(0)
    }

    /// Multiplicity of the edge `self -> child`, 0 if absent.
    pub fn child_multiplicity(&self, child: NodeId) -> usize {
        self.children.get(&child).copied().unwrap_or(0)
    }

    /// The only parent, if the node has exactly one parent record.
    pub fn sole_parent(&self) -> Option<NodeId> {
        sole_key(&self.parents)
    }

    /// The only child, if the node has exactly one child record.
    pub fn sole_child(&self) -> Option<NodeId> {
        sole_key(&self.children)
    }

    /// Number of incoming edges, counting multiplicity.
    pub fn in_degree(&self) -> usize {
        self.parents.values().sum()
    }

    /// Number of outgoing edges, counting multiplicity.
    pub fn out_degree(&self) -> usize {
        self.children.values().sum()
    }

    pub fn degree(&self) -> usize {
        self.in_degree() + self.out_degree()
    }

    // ========================================================================
    // One-sided record edits (the graph applies them in symmetric pairs)
    // ========================================================================

    pub(crate) fn add_parent(&mut self, parent: NodeId, multiplicity: usize) {
        if multiplicity > 0 {
            *self.parents.entry(parent).or_insert(0) += multiplicity;
        }
    }

    pub(crate) fn add_child(&mut self, child: NodeId, multiplicity: usize) {
        if multiplicity > 0 {
            *self.children.entry(child).or_insert(0) += multiplicity;
        }
    }

    /// Drop one unit of the parent record; returns false if there was none.
    pub(crate) fn remove_parent_once(&mut self, parent: NodeId) -> bool {
        remove_once(&mut self.parents, parent)
    }

    /// Drop one unit of the child record; returns false if there was none.
    pub(crate) fn remove_child_once(&mut self, child: NodeId) -> bool {
        remove_once(&mut self.children, child)
    }

    pub(crate) fn remove_parent_id(&mut self, parent: NodeId) -> Option<usize> {
        self.parents.remove(&parent)
    }

    pub(crate) fn remove_child_id(&mut self, child: NodeId) -> Option<usize> {
        self.children.remove(&child)
    }
}

impl<L: std::fmt::Display> std::fmt::Display for Node<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Node({}, {}, {}, {})",
            self.id,
            self.label,
            fmt_multiplicities(&self.parents),
            fmt_multiplicities(&self.children),
        )
    }
}

pub(crate) fn collect_multiplicities(pairs: impl IntoIterator<Item = (NodeId, usize)>) -> Multiplicities {
    let mut map = Multiplicities::new();
    for (id, m) in pairs {
        if m > 0 {
            *map.entry(id).or_insert(0) += m;
        }
    }
    map
}

fn remove_once(map: &mut Multiplicities, id: NodeId) -> bool {
    match map.get_mut(&id) {
        Some(m) if *m > 1 => {
            *m -= 1;
            true
        }
        Some(_) => {
            map.remove(&id);
            true
        }
        None => false,
    }
}

fn sole_key(map: &Multiplicities) -> Option<NodeId> {
    let mut keys = map.keys();
    match (keys.next(), keys.next()) {
        (Some(&id), None) => Some(id),
        _ => None,
    }
}

fn fmt_multiplicities(map: &Multiplicities) -> String {
    let inner: Vec<String> = map.iter().map(|(id, m)| format!("{id}: {m}")).collect();
    format!("{{{}}}", inner.join(", "))
}
