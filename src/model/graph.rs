//! The open digraph: an id-indexed node arena with ordered input and output
//! boundary sequences.
//!
//! Every edge is recorded twice, once in the source's `children` map and
//! once in the target's `parents` map, with the same multiplicity. All
//! mutators in this module keep both records in step; [`OpenDigraph::validate`]
//! checks that they did.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::{collect_multiplicities, Node, NodeId};
use crate::{Error, Result};

/// Kind of boundary designation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryKind {
    Input,
    Output,
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryKind::Input => write!(f, "input"),
            BoundaryKind::Output => write!(f, "output"),
        }
    }
}

/// A directed multigraph with designated, ordered input and output nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenDigraph<L = String> {
    pub(crate) inputs: Vec<NodeId>,
    pub(crate) outputs: Vec<NodeId>,
    pub(crate) nodes: BTreeMap<NodeId, Node<L>>,
}

impl<L> Default for OpenDigraph<L> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<L> OpenDigraph<L> {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Build a graph from an explicit description. Nothing is validated;
    /// call [`validate`](Self::validate) when the description comes from
    /// outside.
    pub fn new(inputs: &[usize], outputs: &[usize], nodes: impl IntoIterator<Item = Node<L>>) -> Self {
        Self {
            inputs: inputs.iter().copied().map(NodeId).collect(),
            outputs: outputs.iter().copied().map(NodeId).collect(),
            nodes: nodes.into_iter().map(|n| (n.id, n)).collect(),
        }
    }

    pub fn empty() -> Self {
        Self { inputs: Vec::new(), outputs: Vec::new(), nodes: BTreeMap::new() }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// Replace the input sequence as-is (no validation).
    pub fn set_inputs(&mut self, inputs: Vec<NodeId>) {
        self.inputs = inputs;
    }

    /// Replace the output sequence as-is (no validation).
    pub fn set_outputs(&mut self, outputs: Vec<NodeId>) {
        self.outputs = outputs;
    }

    /// Append an id to the input sequence as-is (no validation).
    pub fn push_input(&mut self, id: NodeId) {
        self.inputs.push(id);
    }

    /// Append an id to the output sequence as-is (no validation).
    pub fn push_output(&mut self, id: NodeId) {
        self.outputs.push(id);
    }

    pub fn is_input(&self, id: NodeId) -> bool {
        self.inputs.contains(&id)
    }

    pub fn is_output(&self, id: NodeId) -> bool {
        self.outputs.contains(&id)
    }

    pub fn is_boundary(&self, id: NodeId) -> bool {
        self.is_input(id) || self.is_output(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Node ids in increasing order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Nodes in increasing id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<L>> + '_ {
        self.nodes.values()
    }

    /// Ids of the nodes that are neither inputs nor outputs.
    pub fn interior_ids(&self) -> Vec<NodeId> {
        self.node_ids().filter(|&id| !self.is_boundary(id)).collect()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<L>> {
        self.nodes.get(&id)
    }

    pub fn get(&self, id: NodeId) -> Result<&Node<L>> {
        self.nodes.get(&id).ok_or(Error::NodeNotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Result<&mut Node<L>> {
        self.nodes.get_mut(&id).ok_or(Error::NodeNotFound(id))
    }

    pub fn nodes_by_ids(&self, ids: &[NodeId]) -> Result<Vec<&Node<L>>> {
        ids.iter().map(|&id| self.get(id)).collect()
    }

    pub fn min_id(&self) -> Option<NodeId> {
        self.nodes.keys().next().copied()
    }

    pub fn max_id(&self) -> Option<NodeId> {
        self.nodes.keys().next_back().copied()
    }

    /// The id the next [`add_node`](Self::add_node) will allocate.
    pub fn new_id(&self) -> NodeId {
        self.max_id().map_or(NodeId(0), |id| id.shifted(1))
    }

    pub fn set_label(&mut self, id: NodeId, label: L) -> Result<()> {
        self.get_mut(id)?.label = label;
        Ok(())
    }

    /// Total number of edges, counting multiplicity.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(Node::out_degree).sum()
    }

    // ========================================================================
    // Edges
    // ========================================================================

    /// Add one edge `src -> dst`.
    pub fn add_edge(&mut self, src: NodeId, dst: NodeId) -> Result<()> {
        self.connect(src, dst, 1)
    }

    pub fn add_edges(&mut self, edges: impl IntoIterator<Item = (NodeId, NodeId)>) -> Result<()> {
        for (src, dst) in edges {
            self.add_edge(src, dst)?;
        }
        Ok(())
    }

    /// Add `multiplicity` parallel edges `src -> dst`.
    pub(crate) fn connect(&mut self, src: NodeId, dst: NodeId, multiplicity: usize) -> Result<()> {
        if !self.contains(dst) {
            return Err(Error::NodeNotFound(dst));
        }
        self.get_mut(src)?.add_child(dst, multiplicity);
        self.get_mut(dst)?.add_parent(src, multiplicity);
        Ok(())
    }

    /// Remove one unit of multiplicity from `src -> dst`.
    pub fn remove_edge(&mut self, src: NodeId, dst: NodeId) -> Result<()> {
        if self.get(src)?.child_multiplicity(dst) == 0 {
            return Err(Error::EdgeNotFound { src, dst });
        }
        self.get_mut(src)?.remove_child_once(dst);
        self.get_mut(dst)?.remove_parent_once(src);
        Ok(())
    }

    pub fn remove_edges(&mut self, edges: impl IntoIterator<Item = (NodeId, NodeId)>) -> Result<()> {
        for (src, dst) in edges {
            self.remove_edge(src, dst)?;
        }
        Ok(())
    }

    /// Remove every parallel edge `src -> dst`; returns the multiplicity
    /// that was removed.
    pub fn remove_parallel_edges(&mut self, src: NodeId, dst: NodeId) -> Result<usize> {
        let multiplicity = self
            .get_mut(src)?
            .remove_child_id(dst)
            .ok_or(Error::EdgeNotFound { src, dst })?;
        self.get_mut(dst)?.remove_parent_id(src);
        Ok(multiplicity)
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Add a node wired to existing `parents` and `children`
    /// (`(neighbor, multiplicity)` pairs). Returns the fresh id.
    pub fn add_node(
        &mut self,
        label: L,
        parents: &[(NodeId, usize)],
        children: &[(NodeId, usize)],
    ) -> Result<NodeId> {
        if let Some(&(missing, _)) = parents
            .iter()
            .chain(children)
            .find(|(id, _)| !self.contains(*id))
        {
            return Err(Error::NodeNotFound(missing));
        }

        let id = self.new_id();
        let parents = collect_multiplicities(parents.iter().copied());
        let children = collect_multiplicities(children.iter().copied());
        for (&p, &m) in &parents {
            self.get_mut(p)?.add_child(id, m);
        }
        for (&c, &m) in &children {
            self.get_mut(c)?.add_parent(id, m);
        }
        self.nodes.insert(id, Node { id, label, parents, children });
        Ok(id)
    }

    /// Remove a node, all edges touching it and its boundary designation.
    ///
    /// Input nodes left without a child and output nodes left without a
    /// parent are removed along with it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let node = self.nodes.remove(&id).ok_or(Error::NodeNotFound(id))?;
        self.inputs.retain(|&i| i != id);
        self.outputs.retain(|&o| o != id);

        let mut orphans = Vec::new();
        for &p in node.parents.keys().filter(|&&p| p != id) {
            if let Some(parent) = self.nodes.get_mut(&p) {
                parent.remove_child_id(id);
                if parent.children.is_empty() && self.inputs.contains(&p) {
                    orphans.push(p);
                }
            }
        }
        for &c in node.children.keys().filter(|&&c| c != id) {
            if let Some(child) = self.nodes.get_mut(&c) {
                child.remove_parent_id(id);
                if child.parents.is_empty() && self.outputs.contains(&c) {
                    orphans.push(c);
                }
            }
        }

        for orphan in orphans {
            tracing::trace!(node = %orphan, removed = %id, "dropping detached boundary node");
            self.remove_node(orphan)?;
        }
        Ok(())
    }

    pub fn remove_nodes(&mut self, ids: impl IntoIterator<Item = NodeId>) -> Result<()> {
        for id in ids {
            self.remove_node(id)?;
        }
        Ok(())
    }

    /// Create a new input node feeding `target` and register it.
    pub fn add_input_node(&mut self, target: NodeId, label: L) -> Result<NodeId> {
        if !self.contains(target) {
            return Err(Error::NodeNotFound(target));
        }
        if self.is_input(target) {
            return Err(Error::DuplicateBoundary { node: target, kind: BoundaryKind::Input });
        }
        let id = self.add_node(label, &[], &[(target, 1)])?;
        self.inputs.push(id);
        Ok(id)
    }

    /// Create a new output node fed by `target` and register it.
    pub fn add_output_node(&mut self, target: NodeId, label: L) -> Result<NodeId> {
        if !self.contains(target) {
            return Err(Error::NodeNotFound(target));
        }
        if self.is_output(target) {
            return Err(Error::DuplicateBoundary { node: target, kind: BoundaryKind::Output });
        }
        let id = self.add_node(label, &[(target, 1)], &[])?;
        self.outputs.push(id);
        Ok(id)
    }

    // ========================================================================
    // Label mapping
    // ========================================================================

    /// Rebuild the graph with every label passed through `f`.
    pub fn map_labels<M>(self, mut f: impl FnMut(NodeId, L) -> M) -> OpenDigraph<M> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|(id, node)| {
                let label = f(id, node.label);
                (id, Node { id, label, parents: node.parents, children: node.children })
            })
            .collect();
        OpenDigraph { inputs: self.inputs, outputs: self.outputs, nodes }
    }

    /// Like [`map_labels`](Self::map_labels), stopping at the first error.
    pub fn try_map_labels<M>(self, mut f: impl FnMut(NodeId, L) -> Result<M>) -> Result<OpenDigraph<M>> {
        let mut nodes = BTreeMap::new();
        for (id, node) in self.nodes {
            let label = f(id, node.label)?;
            nodes.insert(id, Node { id, label, parents: node.parents, children: node.children });
        }
        Ok(OpenDigraph { inputs: self.inputs, outputs: self.outputs, nodes })
    }

    /// Copy the structure into a graph whose labels are computed from the
    /// borrowed ones.
    pub fn relabel<M>(&self, mut f: impl FnMut(NodeId, &L) -> M) -> OpenDigraph<M> {
        let nodes = self
            .nodes
            .iter()
            .map(|(&id, node)| {
                let label = f(id, &node.label);
                (id, Node { id, label, parents: node.parents.clone(), children: node.children.clone() })
            })
            .collect();
        OpenDigraph { inputs: self.inputs.clone(), outputs: self.outputs.clone(), nodes }
    }

    /// Like [`relabel`](Self::relabel), stopping at the first error.
    pub fn try_relabel<M>(&self, mut f: impl FnMut(NodeId, &L) -> Result<M>) -> Result<OpenDigraph<M>> {
        let mut nodes = BTreeMap::new();
        for (&id, node) in &self.nodes {
            let label = f(id, &node.label)?;
            nodes.insert(id, Node { id, label, parents: node.parents.clone(), children: node.children.clone() });
        }
        Ok(OpenDigraph { inputs: self.inputs.clone(), outputs: self.outputs.clone(), nodes })
    }

    // ========================================================================
    // Well-formedness
    // ========================================================================

    /// Check every structural invariant of an open digraph.
    pub fn validate(&self) -> Result<()> {
        self.validate_boundary(BoundaryKind::Input)?;
        self.validate_boundary(BoundaryKind::Output)?;

        for (&key, node) in &self.nodes {
            if key != node.id {
                return Err(Error::structural(key, format!("stored under key {key} but has id {}", node.id)));
            }
            for (&child, &m) in &node.children {
                let back = self
                    .node(child)
                    .ok_or_else(|| Error::structural(key, format!("child {child} does not exist")))?
                    .parent_multiplicity(key);
                if back != m {
                    return Err(Error::structural(
                        key,
                        format!("edge to {child} has multiplicity {m} but {child} records {back}"),
                    ));
                }
            }
            for (&parent, &m) in &node.parents {
                let back = self
                    .node(parent)
                    .ok_or_else(|| Error::structural(key, format!("parent {parent} does not exist")))?
                    .child_multiplicity(key);
                if back != m {
                    return Err(Error::structural(
                        key,
                        format!("edge from {parent} has multiplicity {m} but {parent} records {back}"),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn is_well_formed(&self) -> bool {
        self.validate().is_ok()
    }

    fn validate_boundary(&self, kind: BoundaryKind) -> Result<()> {
        let ids = match kind {
            BoundaryKind::Input => &self.inputs,
            BoundaryKind::Output => &self.outputs,
        };
        let mut seen = BTreeSet::new();
        for &id in ids {
            if !seen.insert(id) {
                return Err(Error::structural(id, format!("listed twice as {kind}")));
            }
            let node = self
                .node(id)
                .ok_or_else(|| Error::structural(id, format!("{kind} id does not exist")))?;
            let (inner, outer, inner_name) = match kind {
                BoundaryKind::Input => (&node.parents, &node.children, "parents"),
                BoundaryKind::Output => (&node.children, &node.parents, "children"),
            };
            if !inner.is_empty() {
                return Err(Error::structural(id, format!("{kind} node must not have {inner_name}")));
            }
            if outer.len() != 1 || outer.values().any(|&m| m != 1) {
                return Err(Error::structural(id, format!("{kind} node needs exactly one edge of multiplicity 1")));
            }
        }
        Ok(())
    }
}

impl<L: fmt::Display> fmt::Display for OpenDigraph<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.nodes.values() {
            writeln!(f, "n{} = {node}", node.id)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn od0() -> OpenDigraph<&'static str> {
        OpenDigraph::new(&[0], &[1], [
            Node::new(0, "v0", &[], &[(1, 1)]),
            Node::new(1, "v1", &[(0, 1)], &[]),
        ])
    }

    fn od1() -> OpenDigraph<&'static str> {
        OpenDigraph::new(&[0, 1], &[5, 6], [
            Node::new(0, "i0", &[], &[(2, 1)]),
            Node::new(1, "i1", &[], &[(2, 1)]),
            Node::new(2, "a", &[(0, 1), (1, 1), (4, 1)], &[(3, 1), (4, 1)]),
            Node::new(3, "b", &[(2, 1)], &[(4, 2), (5, 1)]),
            Node::new(4, "c", &[(2, 1), (3, 2)], &[(2, 1), (6, 1)]),
            Node::new(5, "o0", &[(3, 1)], &[]),
            Node::new(6, "o1", &[(4, 1)], &[]),
        ])
    }

    #[test]
    fn test_display() {
        assert_eq!(od0().to_string(), "n0 = Node(0, v0, {}, {1: 1})\nn1 = Node(1, v1, {0: 1}, {})\n");
    }

    #[test]
    fn test_empty() {
        let g = OpenDigraph::<String>::empty();
        assert!(g.inputs().is_empty());
        assert!(g.outputs().is_empty());
        assert!(g.is_empty());
        assert_eq!(g.new_id(), NodeId(0));
        assert!(g.is_well_formed());
    }

    #[test]
    fn test_new_id_is_fresh() {
        let g = od1();
        assert_eq!(g.new_id(), NodeId(7));
        assert!(!g.contains(g.new_id()));
    }

    #[test]
    fn test_add_edge_is_symmetric() {
        let mut g = od1();
        g.add_edge(NodeId(2), NodeId(3)).unwrap();
        assert_eq!(g.get(NodeId(2)).unwrap().child_multiplicity(NodeId(3)), 2);
        assert_eq!(g.get(NodeId(3)).unwrap().parent_multiplicity(NodeId(2)), 2);
        g.validate().unwrap();
    }

    #[test]
    fn test_add_edge_missing_endpoint() {
        let mut g = od1();
        assert!(matches!(g.add_edge(NodeId(2), NodeId(42)), Err(Error::NodeNotFound(NodeId(42)))));
        assert!(matches!(g.add_edge(NodeId(42), NodeId(2)), Err(Error::NodeNotFound(NodeId(42)))));
        g.validate().unwrap();
    }

    #[test]
    fn test_remove_edge_one_unit() {
        let mut g = od1();
        g.remove_edge(NodeId(3), NodeId(4)).unwrap();
        assert_eq!(g.get(NodeId(3)).unwrap().child_multiplicity(NodeId(4)), 1);
        assert_eq!(g.get(NodeId(4)).unwrap().parent_multiplicity(NodeId(3)), 1);

        g.remove_edge(NodeId(2), NodeId(3)).unwrap();
        assert!(g.get(NodeId(3)).unwrap().parents().is_empty());
        g.validate().unwrap();

        assert!(matches!(
            g.remove_edge(NodeId(2), NodeId(3)),
            Err(Error::EdgeNotFound { .. })
        ));
    }

    #[test]
    fn test_remove_parallel_edges() {
        let mut g = od1();
        assert_eq!(g.remove_parallel_edges(NodeId(3), NodeId(4)).unwrap(), 2);
        assert_eq!(g.get(NodeId(3)).unwrap().child_ids().collect::<Vec<_>>(), vec![NodeId(5)]);
        assert_eq!(g.get(NodeId(4)).unwrap().parent_ids().collect::<Vec<_>>(), vec![NodeId(2)]);
    }

    #[test]
    fn test_add_node_wires_both_sides() {
        let mut g = od1();
        let id = g.add_node("d", &[(NodeId(2), 1)], &[(NodeId(3), 2)]).unwrap();
        assert_eq!(id, NodeId(7));
        assert_eq!(g.get(NodeId(2)).unwrap().child_multiplicity(id), 1);
        assert_eq!(g.get(NodeId(3)).unwrap().parent_multiplicity(id), 2);
        g.validate().unwrap();
    }

    #[test]
    fn test_add_node_rejects_unknown_neighbor() {
        let mut g = od1();
        assert!(matches!(g.add_node("d", &[(NodeId(9), 1)], &[]), Err(Error::NodeNotFound(NodeId(9)))));
        assert_eq!(g.len(), 7);
    }

    #[test]
    fn test_remove_node_cascades_to_inputs() {
        let mut g = od1();
        g.remove_node(NodeId(2)).unwrap();
        assert_eq!(g.node_ids().collect::<Vec<_>>(), vec![NodeId(3), NodeId(4), NodeId(5), NodeId(6)]);
        assert!(g.inputs().is_empty());
        assert!(g.get(NodeId(3)).unwrap().parents().is_empty());
        assert_eq!(g.get(NodeId(4)).unwrap().parent_multiplicity(NodeId(3)), 2);
        assert_eq!(g.get(NodeId(4)).unwrap().child_ids().collect::<Vec<_>>(), vec![NodeId(6)]);
    }

    #[test]
    fn test_remove_node_cascades_to_outputs() {
        let mut g = od1();
        g.remove_node(NodeId(4)).unwrap();
        assert_eq!(g.outputs(), &[NodeId(5)]);
        assert!(!g.contains(NodeId(6)));
        g.validate().unwrap();
    }

    #[test]
    fn test_add_input_and_output_nodes() {
        let mut g = od1();
        let i = g.add_input_node(NodeId(2), "i2").unwrap();
        assert_eq!(i, NodeId(7));
        assert_eq!(g.inputs(), &[NodeId(0), NodeId(1), NodeId(7)]);
        let o = g.add_output_node(NodeId(4), "o2").unwrap();
        assert_eq!(g.get(NodeId(4)).unwrap().child_multiplicity(o), 1);
        g.validate().unwrap();
    }

    #[test]
    fn test_add_boundary_node_errors() {
        let mut g = od1();
        assert!(matches!(
            g.add_input_node(NodeId(0), "x"),
            Err(Error::DuplicateBoundary { node: NodeId(0), kind: BoundaryKind::Input })
        ));
        assert!(matches!(
            g.add_output_node(NodeId(6), "x"),
            Err(Error::DuplicateBoundary { kind: BoundaryKind::Output, .. })
        ));
        assert!(matches!(g.add_input_node(NodeId(40), "x"), Err(Error::NodeNotFound(_))));
    }

    #[test]
    fn test_validate_rejects_bad_boundaries() {
        let i0 = Node::new(0, "i0", &[], &[(2, 1)]);
        let i1 = Node::new(1, "i1", &[], &[(2, 1)]);
        let n1 = Node::new(3, "b", &[(2, 1)], &[(4, 2), (5, 1)]);
        let n2 = Node::new(4, "c", &[(2, 1), (3, 2)], &[(2, 1), (6, 1)]);
        let g = OpenDigraph::new(&[3, 4], &[0, 1], [i0, i1, n1, n2]);
        assert!(matches!(g.validate(), Err(Error::StructuralViolation { .. })));
    }

    #[test]
    fn test_validate_rejects_asymmetric_edge() {
        let g = OpenDigraph::new(&[], &[], [
            Node::new(0, "", &[], &[(1, 2)]),
            Node::new(1, "", &[(0, 1)], &[]),
        ]);
        assert!(!g.is_well_formed());
    }

    #[test]
    fn test_validate_rejects_duplicate_input() {
        let g = OpenDigraph::new(&[0, 0], &[], [
            Node::new(0, "", &[], &[(1, 1)]),
            Node::new(1, "", &[(0, 1)], &[]),
        ]);
        assert!(!g.is_well_formed());
    }

    #[test]
    fn test_map_labels() {
        let g = od0().map_labels(|id, label| format!("{label}#{id}"));
        assert_eq!(g.get(NodeId(1)).unwrap().label(), "v1#1");
    }
}
