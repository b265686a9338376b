//! Topological layering (Kahn-style root extraction) and node depth.

use std::collections::BTreeMap;

use super::Skeleton;
use crate::model::{NodeId, OpenDigraph};
use crate::{Error, Result};

/// Partition the interior of `g` into layers: layer 0 holds the sources,
/// every later layer the nodes whose parents all sit in earlier layers.
/// Ids within a layer are sorted.
pub fn topological_layers<L>(g: &OpenDigraph<L>) -> Result<Vec<Vec<NodeId>>> {
    let skeleton = Skeleton::interior(g);
    let mut pending: BTreeMap<NodeId, usize> = skeleton
        .parents
        .iter()
        .map(|(&id, parents)| (id, parents.len()))
        .collect();
    let mut layer: Vec<NodeId> = pending
        .iter()
        .filter(|&(_, &count)| count == 0)
        .map(|(&id, _)| id)
        .collect();

    let mut layers = Vec::new();
    while !pending.is_empty() {
        if layer.is_empty() {
            return Err(Error::CyclicGraph);
        }
        let mut next = Vec::new();
        for id in &layer {
            pending.remove(id);
            for child in &skeleton.children[id] {
                if let Some(count) = pending.get_mut(child) {
                    *count -= 1;
                    if *count == 0 {
                        next.push(*child);
                    }
                }
            }
        }
        next.sort_unstable();
        layers.push(std::mem::replace(&mut layer, next));
    }
    Ok(layers)
}

/// Index of the layer containing `id`. Boundary nodes are not layered.
pub fn node_depth<L>(g: &OpenDigraph<L>, id: NodeId) -> Result<usize> {
    topological_layers(g)?
        .iter()
        .position(|layer| layer.binary_search(&id).is_ok())
        .ok_or(Error::NodeNotFound(id))
}

/// Number of topological layers.
pub fn depth<L>(g: &OpenDigraph<L>) -> Result<usize> {
    Ok(topological_layers(g)?.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;

    fn chain(len: usize) -> OpenDigraph<&'static str> {
        OpenDigraph::new(&[], &[], (0..len).map(|i| {
            let parents: Vec<(usize, usize)> = if i > 0 { vec![(i - 1, 1)] } else { vec![] };
            let children: Vec<(usize, usize)> = if i + 1 < len { vec![(i + 1, 1)] } else { vec![] };
            Node::new(i, "", &parents, &children)
        }))
    }

    #[test]
    fn test_chain_has_one_node_per_layer() {
        let layers = topological_layers(&chain(4)).unwrap();
        assert_eq!(layers, vec![vec![NodeId(0)], vec![NodeId(1)], vec![NodeId(2)], vec![NodeId(3)]]);
        assert_eq!(depth(&chain(4)).unwrap(), 4);
        assert_eq!(node_depth(&chain(4), NodeId(2)).unwrap(), 2);
    }

    #[test]
    fn test_empty_graph_has_no_layers() {
        assert!(topological_layers(&OpenDigraph::<String>::empty()).unwrap().is_empty());
    }

    #[test]
    fn test_cycle_is_reported() {
        let g = OpenDigraph::new(&[], &[], [
            Node::new(0, "", &[(1, 1)], &[(1, 1)]),
            Node::new(1, "", &[(0, 1)], &[(0, 1)]),
        ]);
        assert!(matches!(topological_layers(&g), Err(Error::CyclicGraph)));
    }

    #[test]
    fn test_boundary_node_has_no_depth() {
        let g = OpenDigraph::new(&[0], &[], [
            Node::new(0, "", &[], &[(1, 1)]),
            Node::new(1, "", &[(0, 1)], &[]),
        ]);
        assert_eq!(node_depth(&g, NodeId(1)).unwrap(), 0);
        assert!(matches!(node_depth(&g, NodeId(0)), Err(Error::NodeNotFound(NodeId(0)))));
    }
}
