//! # Composition Operators
//!
//! Id shifting, parallel union, sequential composition and node fusion on
//! [`OpenDigraph`].
//!
//! The in-place variants (`iparallel`, `icompose`) take their donors by
//! value, so a donor cannot be observed after its nodes moved into the
//! receiver. The copying variants (`parallel`, `compose`) clone both sides.

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::{NodeId, OpenDigraph};
use crate::{Error, Result};

impl<L> OpenDigraph<L> {
    /// Add `offset` to every node id, every id in every multiplicity map and
    /// every boundary id.
    pub fn shift_ids(&mut self, offset: usize) {
        if offset == 0 {
            return;
        }
        let nodes = std::mem::take(&mut self.nodes);
        self.nodes = nodes
            .into_values()
            .map(|mut node| {
                node.id = node.id.shifted(offset);
                node.parents = shift_keys(node.parents, offset);
                node.children = shift_keys(node.children, offset);
                (node.id, node)
            })
            .collect();
        for id in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            *id = id.shifted(offset);
        }
    }

    /// Offset that moves `other` strictly above this graph's ids, or 0 when
    /// the ranges are already disjoint.
    fn offset_for(&self, other: &Self) -> usize {
        match (self.max_id(), other.min_id()) {
            (Some(max), Some(min)) if min <= max => max.0 + 1 - min.0,
            _ => 0,
        }
    }

    /// Disjoint union in place: each donor is shifted clear of the
    /// receiver, then its boundaries are appended and its nodes moved in.
    pub fn iparallel(&mut self, graphs: impl IntoIterator<Item = OpenDigraph<L>>) {
        for mut g in graphs {
            let offset = self.offset_for(&g);
            g.shift_ids(offset);
            debug!(offset, nodes = g.len(), "parallel union");
            self.inputs.append(&mut g.inputs);
            self.outputs.append(&mut g.outputs);
            self.nodes.append(&mut g.nodes);
        }
    }

    /// Disjoint union of copies of `self` and `other`.
    pub fn parallel(&self, other: &Self) -> Self
    where
        L: Clone,
    {
        let mut out = self.clone();
        out.iparallel([other.clone()]);
        out
    }

    /// Sequential composition in place: the i-th output of `self` is wired
    /// to the i-th input of `g` and both boundary nodes disappear. The
    /// receiver keeps its inputs and takes over `g`'s outputs.
    pub fn icompose(&mut self, mut g: OpenDigraph<L>) -> Result<()> {
        if self.outputs.len() != g.inputs.len() {
            return Err(Error::ArityMismatch { outputs: self.outputs.len(), inputs: g.inputs.len() });
        }

        let offset = self.offset_for(&g);
        g.shift_ids(offset);

        let mut splices = Vec::with_capacity(self.outputs.len());
        for (&out, &inp) in self.outputs.iter().zip(&g.inputs) {
            let src = self
                .get(out)?
                .sole_parent()
                .ok_or_else(|| Error::structural(out, "output node without a single parent"))?;
            let dst = g
                .get(inp)?
                .sole_child()
                .ok_or_else(|| Error::structural(inp, "input node without a single child"))?;
            let multiplicity = self.get(out)?.parent_multiplicity(src);
            splices.push((out, inp, src, dst, multiplicity));
        }

        debug!(offset, spliced = splices.len(), "sequential composition");
        self.nodes.append(&mut g.nodes);
        for (out, inp, src, dst, multiplicity) in splices {
            // wire first so neither boundary removal orphans its neighbor
            self.connect(src, dst, multiplicity)?;
            self.remove_node(out)?;
            self.remove_node(inp)?;
        }
        self.outputs = g.outputs;
        Ok(())
    }

    /// Sequential composition of copies of `self` and `other`.
    pub fn compose(&self, other: &Self) -> Result<Self>
    where
        L: Clone,
    {
        let mut out = self.clone();
        out.icompose(other.clone())?;
        Ok(out)
    }

    /// Merge `merge` into `keep`: every edge of `merge` is redirected onto
    /// `keep` (multiplicities accumulate, edges between the two become
    /// self-loops), `keep` optionally takes `label`, and `merge` is deleted
    /// together with any boundary designation it held.
    pub fn fuse(&mut self, keep: NodeId, merge: NodeId, label: Option<L>) -> Result<()> {
        self.get(keep)?;
        self.get(merge)?;
        if keep != merge {
            let merged = self.nodes.remove(&merge).ok_or(Error::NodeNotFound(merge))?;
            self.inputs.retain(|&i| i != merge);
            self.outputs.retain(|&o| o != merge);

            for (&p, &m) in &merged.parents {
                let src = if p == merge { keep } else { p };
                if p != merge {
                    self.get_mut(p)?.remove_child_id(merge);
                }
                self.connect(src, keep, m)?;
            }
            for (&c, &m) in merged.children.iter().filter(|&(&c, _)| c != merge) {
                self.get_mut(c)?.remove_parent_id(merge);
                self.connect(keep, c, m)?;
            }
            tracing::trace!(%keep, %merge, "fused nodes");
        }
        if let Some(label) = label {
            self.set_label(keep, label)?;
        }
        Ok(())
    }
}

fn shift_keys(map: BTreeMap<NodeId, usize>, offset: usize) -> BTreeMap<NodeId, usize> {
    map.into_iter().map(|(id, m)| (id.shifted(offset), m)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;

    /// `i -> n -> o` starting at `base`.
    fn wire(base: usize, label: &'static str) -> OpenDigraph<&'static str> {
        OpenDigraph::new(&[base], &[base + 2], [
            Node::new(base, "i", &[], &[(base + 1, 1)]),
            Node::new(base + 1, label, &[(base, 1)], &[(base + 2, 1)]),
            Node::new(base + 2, "o", &[(base + 1, 1)], &[]),
        ])
    }

    #[test]
    fn test_shift_ids_moves_everything() {
        let mut g = wire(0, "x");
        g.shift_ids(10);
        assert_eq!(g.inputs(), &[NodeId(10)]);
        assert_eq!(g.outputs(), &[NodeId(12)]);
        assert_eq!(g.get(NodeId(11)).unwrap().parent_ids().collect::<Vec<_>>(), vec![NodeId(10)]);
        g.validate().unwrap();
    }

    #[test]
    fn test_parallel_keeps_disjoint_ranges() {
        let g = wire(0, "x").parallel(&wire(5, "y"));
        assert_eq!(g.node_ids().map(|id| id.0).collect::<Vec<_>>(), vec![0, 1, 2, 5, 6, 7]);
        assert_eq!(g.inputs(), &[NodeId(0), NodeId(5)]);
    }

    #[test]
    fn test_parallel_shifts_overlapping_ranges() {
        let g = wire(0, "x").parallel(&wire(1, "y"));
        assert_eq!(g.len(), 6);
        assert_eq!(g.inputs(), &[NodeId(0), NodeId(3)]);
        assert_eq!(g.get(NodeId(4)).unwrap().label(), &"y");
        g.validate().unwrap();
    }

    #[test]
    fn test_iparallel_several_donors() {
        let mut g = wire(0, "x");
        g.iparallel([wire(0, "y"), wire(0, "z")]);
        assert_eq!(g.len(), 9);
        assert_eq!(g.outputs().len(), 3);
        g.validate().unwrap();
    }

    #[test]
    fn test_compose_splices_boundaries() {
        let g = wire(0, "x").compose(&wire(0, "y")).unwrap();
        assert_eq!(g.len(), 4);
        assert_eq!(g.inputs(), &[NodeId(0)]);
        assert_eq!(g.outputs(), &[NodeId(5)]);
        assert_eq!(g.get(NodeId(1)).unwrap().child_ids().collect::<Vec<_>>(), vec![NodeId(4)]);
        g.validate().unwrap();
    }

    #[test]
    fn test_compose_identity_wires() {
        let id = OpenDigraph::new(&[0], &[1], [
            Node::new(0, "", &[], &[(1, 1)]),
            Node::new(1, "", &[(0, 1)], &[]),
        ]);
        let g = id.compose(&id).unwrap();
        assert_eq!(g.len(), 2);
        g.validate().unwrap();
    }

    #[test]
    fn test_compose_arity_mismatch() {
        let two = wire(0, "x").parallel(&wire(0, "y"));
        assert!(matches!(
            wire(0, "z").compose(&two),
            Err(Error::ArityMismatch { outputs: 1, inputs: 2 })
        ));
    }

    #[test]
    fn test_fuse_redirects_edges() {
        let mut g = OpenDigraph::new(&[0], &[4], [
            Node::new(0, "i", &[], &[(1, 1)]),
            Node::new(1, "a", &[(0, 1)], &[(2, 1), (3, 2)]),
            Node::new(2, "b", &[(1, 1)], &[(3, 1)]),
            Node::new(3, "c", &[(1, 2), (2, 1)], &[(4, 1)]),
            Node::new(4, "o", &[(3, 1)], &[]),
        ]);
        g.fuse(NodeId(2), NodeId(3), Some("bc")).unwrap();
        let fused = g.get(NodeId(2)).unwrap();
        assert_eq!(fused.label(), &"bc");
        assert_eq!(fused.parent_multiplicity(NodeId(1)), 3);
        assert_eq!(fused.child_multiplicity(NodeId(2)), 1);
        assert_eq!(fused.child_multiplicity(NodeId(4)), 1);
        assert!(!g.contains(NodeId(3)));
        g.validate().unwrap();
    }
}
