//! Connected components of the undirected view, seeded from the inputs.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Direction, NodeId, OpenDigraph};

/// Components reachable from the input boundary nodes over parent ∪ child
/// adjacency.
///
/// Returns the component count and each visited node's component index.
/// Components are numbered in input order; an input already swallowed by an
/// earlier component does not open a new one. Nodes no input reaches are
/// left out.
pub fn connected_components<L>(g: &OpenDigraph<L>) -> (usize, BTreeMap<NodeId, usize>) {
    let mut visited: BTreeSet<NodeId> = BTreeSet::new();
    let mut membership = BTreeMap::new();
    let mut count = 0;

    for &input in g.inputs() {
        let mut component = Vec::new();
        let mut stack = vec![input];
        while let Some(id) = stack.pop() {
            let Some(node) = g.node(id) else { continue };
            if !visited.insert(id) {
                continue;
            }
            component.push(id);
            stack.extend(node.neighbor_ids(Direction::Both).into_iter().rev());
        }
        if component.is_empty() {
            continue;
        }
        component.sort_unstable();
        for id in component {
            membership.insert(id, count);
        }
        count += 1;
    }
    (count, membership)
}
