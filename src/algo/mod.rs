//! # Structural Algorithms
//!
//! Pure functions over a borrowed [`OpenDigraph`]: cycle detection,
//! topological layering, unit-weight path search and connected components.
//! None of them mutate the graph.
//!
//! Cycle detection and layering look at the *interior* of the graph: input
//! and output boundary nodes, and the edges touching them, are stripped
//! first. Boundary nodes are acyclic by construction and would otherwise
//! show up as extra sources and sinks.

pub mod acyclic;
pub mod layers;
pub mod path;
pub mod components;

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{NodeId, OpenDigraph};

pub use acyclic::is_cyclic;
pub use layers::{topological_layers, node_depth, depth};
pub use path::{dijkstra, shortest_path, common_ancestors, longest_path, Distances};
pub use components::connected_components;

/// Label-free adjacency of the graph interior, as distinct neighbor sets.
#[derive(Debug, Clone, Default)]
pub(crate) struct Skeleton {
    pub parents: BTreeMap<NodeId, BTreeSet<NodeId>>,
    pub children: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl Skeleton {
    /// Interior nodes of `g` with the edges between them.
    pub fn interior<L>(g: &OpenDigraph<L>) -> Self {
        let mut skeleton = Skeleton::default();
        for node in g.nodes().filter(|n| !g.is_boundary(n.id())) {
            let keep = |id: &NodeId| !g.is_boundary(*id);
            skeleton.parents.insert(node.id(), node.parent_ids().filter(keep).collect());
            skeleton.children.insert(node.id(), node.child_ids().filter(keep).collect());
        }
        skeleton
    }
}
