//! Unit-weight path search: Dijkstra-style expansion, shortest and longest
//! paths, common ancestors.

use std::collections::BTreeMap;

use hashbrown::HashMap;

use super::layers::topological_layers;
use crate::model::{Direction, NodeId, OpenDigraph};
use crate::{Error, Result};

/// Result of a [`dijkstra`] run: distance from the source and predecessor on
/// a shortest path, for every node reached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distances {
    pub dist: HashMap<NodeId, usize>,
    pub prev: HashMap<NodeId, NodeId>,
}

impl Distances {
    pub fn distance(&self, id: NodeId) -> Option<usize> {
        self.dist.get(&id).copied()
    }

    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        self.prev.get(&id).copied()
    }

    /// Walk predecessors back from `target`; `None` if it was never reached.
    pub fn path_to(&self, target: NodeId) -> Option<Vec<NodeId>> {
        if !self.dist.contains_key(&target) {
            return None;
        }
        let mut path = vec![target];
        let mut cur = target;
        while let Some(&p) = self.prev.get(&cur) {
            path.push(p);
            cur = p;
        }
        path.reverse();
        Some(path)
    }
}

/// Dijkstra-style expansion from `src` over unit-weight edges.
///
/// Multiplicity does not shorten or lengthen a hop. The frontier keeps
/// discovery order and the first element of minimum distance is expanded
/// next. With `target` set, the search returns as soon as that node is
/// relaxed.
pub fn dijkstra<L>(
    g: &OpenDigraph<L>,
    src: NodeId,
    target: Option<NodeId>,
    direction: Direction,
) -> Result<Distances> {
    g.get(src)?;
    let mut out = Distances::default();
    out.dist.insert(src, 0);
    let mut frontier = vec![src];

    while let Some(idx) = first_min(&frontier, &out.dist) {
        let u = frontier.remove(idx);
        let du = out.dist[&u];
        for v in g.get(u)?.neighbor_ids(direction) {
            match out.dist.get(&v) {
                None => {
                    frontier.push(v);
                    out.dist.insert(v, du + 1);
                    out.prev.insert(v, u);
                }
                Some(&dv) if dv > du + 1 => {
                    out.dist.insert(v, du + 1);
                    out.prev.insert(v, u);
                }
                Some(_) => {}
            }
            if target == Some(v) {
                return Ok(out);
            }
        }
    }
    Ok(out)
}

fn first_min(frontier: &[NodeId], dist: &HashMap<NodeId, usize>) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (idx, id) in frontier.iter().enumerate() {
        let d = dist[id];
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((idx, d));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Shortest directed path `u -> v` following children, endpoints included.
pub fn shortest_path<L>(g: &OpenDigraph<L>, u: NodeId, v: NodeId) -> Result<Option<Vec<NodeId>>> {
    g.get(v)?;
    let found = dijkstra(g, u, Some(v), Direction::Outgoing)?;
    Ok(found.path_to(v))
}

/// Every node reachable backwards from both `a` and `b`, with its distance
/// to `a` and to `b`. A node counts as its own ancestor at distance 0.
pub fn common_ancestors<L>(g: &OpenDigraph<L>, a: NodeId, b: NodeId) -> Result<BTreeMap<NodeId, (usize, usize)>> {
    let from_a = dijkstra(g, a, None, Direction::Incoming)?;
    let from_b = dijkstra(g, b, None, Direction::Incoming)?;
    Ok(from_a
        .dist
        .iter()
        .filter_map(|(&id, &da)| from_b.distance(id).map(|db| (id, (da, db))))
        .collect())
}

/// Longest directed path `u -> v` in the acyclic interior, with its length
/// in edges. `None` when `v` is not reachable from `u`.
pub fn longest_path<L>(g: &OpenDigraph<L>, u: NodeId, v: NodeId) -> Result<Option<(Vec<NodeId>, usize)>> {
    g.get(v)?;
    let layers = topological_layers(g)?;
    let start = layers
        .iter()
        .position(|layer| layer.binary_search(&u).is_ok())
        .ok_or(Error::NodeNotFound(u))?;
    if u == v {
        return Ok(Some((vec![u], 0)));
    }

    let mut dist: BTreeMap<NodeId, usize> = BTreeMap::from([(u, 0)]);
    let mut prev: BTreeMap<NodeId, NodeId> = BTreeMap::new();
    'layers: for layer in &layers[start + 1..] {
        for &w in layer {
            let mut best: Option<(NodeId, usize)> = None;
            for p in g.get(w)?.parent_ids() {
                if let Some(&dp) = dist.get(&p) {
                    if best.is_none_or(|(_, bd)| dp > bd) {
                        best = Some((p, dp));
                    }
                }
            }
            if let Some((p, dp)) = best {
                dist.insert(w, dp + 1);
                prev.insert(w, p);
            }
            if w == v {
                break 'layers;
            }
        }
    }

    let Some(&length) = dist.get(&v) else {
        return Ok(None);
    };
    let mut path = vec![v];
    let mut cur = v;
    while let Some(&p) = prev.get(&cur) {
        path.push(p);
        cur = p;
    }
    path.reverse();
    Ok(Some((path, length)))
}
