//! Adjacency matrices.

use super::graph::OpenDigraph;
use super::node::{Node, NodeId};

/// Square matrix of edge multiplicities; `m[i][j]` counts edges `i -> j`.
pub type Matrix = Vec<Vec<usize>>;

impl<L: Default> OpenDigraph<L> {
    /// Graph with nodes `0..n`, default labels and `m[i][j]` edges `i -> j`.
    /// No boundary nodes. Columns past the row count are ignored.
    pub fn from_matrix(m: &Matrix) -> Self {
        let n = m.len();
        let nodes = (0..n).map(|i| {
            let children: Vec<(usize, usize)> = m[i].iter().take(n).copied().enumerate().collect();
            let parents: Vec<(usize, usize)> = (0..n)
                .map(|j| (j, m[j].get(i).copied().unwrap_or(0)))
                .collect();
            Node::new(i, L::default(), &parents, &children)
        });
        OpenDigraph::new(&[], &[], nodes)
    }
}

impl<L> OpenDigraph<L> {
    /// Adjacency matrix over all nodes in id order, with that order.
    pub fn adjacency_matrix(&self) -> (Vec<NodeId>, Matrix) {
        let ids: Vec<NodeId> = self.node_ids().collect();
        let matrix = self
            .nodes()
            .map(|node| ids.iter().map(|&c| node.child_multiplicity(c)).collect())
            .collect();
        (ids, matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_matrix_is_symmetric() {
        let m: Matrix = vec![vec![0, 2, 0], vec![0, 1, 1], vec![1, 0, 0]];
        let g = OpenDigraph::<String>::from_matrix(&m);
        g.validate().unwrap();
        assert_eq!(g.get(NodeId(0)).unwrap().child_multiplicity(NodeId(1)), 2);
        assert_eq!(g.get(NodeId(1)).unwrap().parent_multiplicity(NodeId(1)), 1);
        assert_eq!(g.edge_count(), 5);
    }

    #[test]
    fn test_adjacency_matrix_uses_id_order() {
        let m: Matrix = vec![vec![0, 1], vec![3, 0]];
        let mut g = OpenDigraph::<String>::from_matrix(&m);
        g.shift_ids(4);
        let (ids, back) = g.adjacency_matrix();
        assert_eq!(ids, vec![NodeId(4), NodeId(5)]);
        assert_eq!(back, m);
    }
}
