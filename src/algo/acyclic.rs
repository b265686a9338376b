//! Cycle detection by iterative sink peeling.

use std::collections::BTreeMap;

use super::Skeleton;
use crate::model::{NodeId, OpenDigraph};

/// Whether the interior of `g` contains a directed cycle.
///
/// Sinks are peeled round by round: a parent whose last remaining child was
/// peeled becomes a sink of the next round. A round that starts with nodes
/// left but no sink proves a cycle.
pub fn is_cyclic<L>(g: &OpenDigraph<L>) -> bool {
    let skeleton = Skeleton::interior(g);
    let mut remaining: BTreeMap<NodeId, usize> = skeleton
        .children
        .iter()
        .map(|(&id, children)| (id, children.len()))
        .collect();
    let mut leaves: Vec<NodeId> = remaining
        .iter()
        .filter(|&(_, &count)| count == 0)
        .map(|(&id, _)| id)
        .collect();

    while !remaining.is_empty() {
        if leaves.is_empty() {
            return true;
        }
        let mut exposed = Vec::new();
        for leaf in leaves {
            remaining.remove(&leaf);
            for parent in &skeleton.parents[&leaf] {
                if let Some(count) = remaining.get_mut(parent) {
                    *count -= 1;
                    if *count == 0 {
                        exposed.push(*parent);
                    }
                }
            }
        }
        leaves = exposed;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;

    #[test]
    fn test_empty_graph_is_acyclic() {
        assert!(!is_cyclic(&OpenDigraph::<String>::empty()));
    }

    #[test]
    fn test_self_loop_is_cyclic() {
        let g = OpenDigraph::new(&[], &[], [Node::new(0, "", &[(0, 1)], &[(0, 1)])]);
        assert!(is_cyclic(&g));
    }

    #[test]
    fn test_ring_with_tail_is_cyclic() {
        let g = OpenDigraph::new(&[], &[], [
            Node::new(0, "", &[(2, 1)], &[(1, 1)]),
            Node::new(1, "", &[(0, 1)], &[(2, 1), (3, 1)]),
            Node::new(2, "", &[(1, 1)], &[(0, 1)]),
            Node::new(3, "", &[(1, 1)], &[]),
        ]);
        assert!(is_cyclic(&g));
    }

    #[test]
    fn test_diamond_with_parallel_edges_is_acyclic() {
        let g = OpenDigraph::new(&[], &[], [
            Node::new(0, "", &[], &[(1, 2), (2, 1)]),
            Node::new(1, "", &[(0, 2)], &[(3, 1)]),
            Node::new(2, "", &[(0, 1)], &[(3, 3)]),
            Node::new(3, "", &[(1, 1), (2, 3)], &[]),
        ]);
        assert!(!is_cyclic(&g));
    }

    #[test]
    fn test_boundary_nodes_are_ignored() {
        let g = OpenDigraph::new(&[0], &[2], [
            Node::new(0, "", &[], &[(1, 1)]),
            Node::new(1, "", &[(0, 1)], &[(2, 1)]),
            Node::new(2, "", &[(1, 1)], &[]),
        ]);
        assert!(!is_cyclic(&g));
    }
}
