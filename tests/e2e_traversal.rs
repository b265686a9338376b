//! End-to-end tests for the structural algorithms on the worksheet graph.
//!
//! Thirteen interior nodes, two inputs (10, 11) and one output (12):
//!
//! ```text
//!  10 -> 0 -> 3 -> {5, 6, 7}      1 -> {4, 5, 8}     11 -> 2 -> 4
//!  4 -> 6 -> {8, 9}               5 -> 7 -> 12
//! ```

use std::collections::BTreeMap;

use open_digraph::algo::{
    common_ancestors, connected_components, depth, dijkstra, is_cyclic, longest_path, node_depth,
    shortest_path, topological_layers,
};
use open_digraph::{Direction, Error, Node, NodeId, OpenDigraph};
use pretty_assertions::assert_eq;

fn worksheet() -> OpenDigraph {
    let n = |id, parents: &[(usize, usize)], children: &[(usize, usize)]| {
        Node::new(id, String::new(), parents, children)
    };
    OpenDigraph::new(&[10, 11], &[12], [
        n(10, &[], &[(0, 1)]),
        n(11, &[], &[(2, 1)]),
        n(0, &[(10, 1)], &[(3, 1)]),
        n(1, &[], &[(4, 1), (5, 1), (8, 1)]),
        n(2, &[(11, 1)], &[(4, 1)]),
        n(3, &[(0, 1)], &[(5, 1), (6, 1), (7, 1)]),
        n(4, &[(1, 1), (2, 1)], &[(6, 1)]),
        n(5, &[(1, 1), (3, 1)], &[(7, 1)]),
        n(6, &[(3, 1), (4, 1)], &[(8, 1), (9, 1)]),
        n(7, &[(3, 1), (5, 1)], &[(12, 1)]),
        n(8, &[(1, 1), (6, 1)], &[]),
        n(9, &[(6, 1)], &[]),
        n(12, &[(7, 1)], &[]),
    ])
}

fn ids(raw: &[usize]) -> Vec<NodeId> {
    raw.iter().copied().map(NodeId).collect()
}

// ============================================================================
// 1. Fixture sanity
// ============================================================================

#[test]
fn test_worksheet_is_well_formed_and_acyclic() {
    let g = worksheet();
    g.validate().unwrap();
    assert!(!is_cyclic(&g));
}

// ============================================================================
// 2. Dijkstra
// ============================================================================

#[test]
fn test_dijkstra_both_directions() {
    let d = dijkstra(&worksheet(), NodeId(6), None, Direction::Both).unwrap();
    assert_eq!(d.distance(NodeId(6)), Some(0));
    assert_eq!(d.distance(NodeId(3)), Some(1));
    assert_eq!(d.distance(NodeId(7)), Some(2));
    assert_eq!(d.distance(NodeId(12)), Some(3));

    assert_eq!(d.predecessor(NodeId(3)), Some(NodeId(6)));
    assert_eq!(d.predecessor(NodeId(7)), Some(NodeId(3)));
    assert_eq!(d.predecessor(NodeId(12)), Some(NodeId(7)));
}

#[test]
fn test_dijkstra_stops_at_target() {
    let d = dijkstra(&worksheet(), NodeId(0), Some(NodeId(3)), Direction::Outgoing).unwrap();
    assert_eq!(d.distance(NodeId(3)), Some(1));
    assert_eq!(d.distance(NodeId(7)), None);
}

// ============================================================================
// 3. Shortest path
// ============================================================================

#[test]
fn test_shortest_paths() {
    let g = worksheet();
    assert_eq!(shortest_path(&g, NodeId(0), NodeId(7)).unwrap(), Some(ids(&[0, 3, 7])));
    assert_eq!(shortest_path(&g, NodeId(2), NodeId(8)).unwrap(), Some(ids(&[2, 4, 6, 8])));
    assert_eq!(shortest_path(&g, NodeId(1), NodeId(8)).unwrap(), Some(ids(&[1, 8])));
    assert_eq!(shortest_path(&g, NodeId(8), NodeId(1)).unwrap(), None);
}

// ============================================================================
// 4. Common ancestors
// ============================================================================

#[test]
fn test_common_ancestors() {
    let g = worksheet();
    let expected: BTreeMap<NodeId, (usize, usize)> = [(0, (2, 3)), (1, (1, 1)), (3, (1, 2)), (10, (3, 4))]
        .into_iter()
        .map(|(id, d)| (NodeId(id), d))
        .collect();
    assert_eq!(common_ancestors(&g, NodeId(5), NodeId(8)).unwrap(), expected);

    let expected: BTreeMap<NodeId, (usize, usize)> = [
        (0, (3, 3)),
        (1, (1, 3)),
        (2, (3, 3)),
        (3, (2, 2)),
        (4, (2, 2)),
        (6, (1, 1)),
        (10, (4, 4)),
        (11, (4, 4)),
    ]
    .into_iter()
    .map(|(id, d)| (NodeId(id), d))
    .collect();
    assert_eq!(common_ancestors(&g, NodeId(8), NodeId(9)).unwrap(), expected);
}

// ============================================================================
// 5. Layering and depth
// ============================================================================

#[test]
fn test_topological_layers() {
    let layers = topological_layers(&worksheet()).unwrap();
    assert_eq!(layers, vec![ids(&[0, 1, 2]), ids(&[3, 4]), ids(&[5, 6]), ids(&[7, 8, 9])]);
}

#[test]
fn test_node_depth_and_depth() {
    let g = worksheet();
    assert_eq!(node_depth(&g, NodeId(0)).unwrap(), 0);
    assert_eq!(node_depth(&g, NodeId(3)).unwrap(), 1);
    assert_eq!(node_depth(&g, NodeId(5)).unwrap(), 2);
    assert_eq!(node_depth(&g, NodeId(9)).unwrap(), 3);
    assert_eq!(depth(&g).unwrap(), 4);
    assert!(matches!(node_depth(&g, NodeId(12)), Err(Error::NodeNotFound(_))));
}

// ============================================================================
// 6. Longest path
// ============================================================================

#[test]
fn test_longest_paths() {
    let g = worksheet();
    assert_eq!(longest_path(&g, NodeId(0), NodeId(7)).unwrap(), Some((ids(&[0, 3, 5, 7]), 3)));
    assert_eq!(longest_path(&g, NodeId(1), NodeId(8)).unwrap(), Some((ids(&[1, 4, 6, 8]), 3)));
    assert_eq!(longest_path(&g, NodeId(2), NodeId(5)).unwrap(), None);
}

#[test]
fn test_longest_path_needs_acyclic_interior() {
    let mut g = worksheet();
    g.add_edge(NodeId(9), NodeId(1)).unwrap();
    assert!(is_cyclic(&g));
    assert!(matches!(longest_path(&g, NodeId(0), NodeId(7)), Err(Error::CyclicGraph)));
}

// ============================================================================
// 7. Connected components
// ============================================================================

#[test]
fn test_single_component() {
    let (count, membership) = connected_components(&worksheet());
    assert_eq!(count, 1);
    assert_eq!(membership.len(), 13);
    assert!(membership.values().all(|&c| c == 0));
}

#[test]
fn test_components_after_cut() {
    let mut g = worksheet();
    // 5 -> 7 -> 12 is cut off from both inputs
    g.remove_node(NodeId(1)).unwrap();
    g.remove_node(NodeId(3)).unwrap();
    let (count, membership) = connected_components(&g);
    assert_eq!(count, 2);
    assert_eq!(membership[&NodeId(0)], 0);
    assert_eq!(membership[&NodeId(9)], 1);
    assert!(!membership.contains_key(&NodeId(5)));
}
