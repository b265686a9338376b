//! # Random Fixtures
//!
//! Random matrices, graphs and circuits for tests and benchmarks. Every
//! generator takes the caller's [`Rng`], so a seeded `StdRng` reproduces a
//! fixture exactly.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::circuit::{BoolCirc, Gate};
use crate::model::{Matrix, NodeId, OpenDigraph};
use crate::{Error, Result};

// ============================================================================
// Options
// ============================================================================

/// Shape constraints for [`random_matrix`].
///
/// When several are set, `triangular` wins over `oriented`, which wins over
/// `symmetric`. `null_diag` always applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixOptions {
    /// No self-loops.
    pub null_diag: bool,
    /// `m[i][j] == m[j][i]`.
    pub symmetric: bool,
    /// At most one direction per pair of distinct nodes.
    pub oriented: bool,
    /// Zero below the diagonal, so every edge goes from a lower to a higher
    /// index.
    pub triangular: bool,
}

/// Named graph shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphForm {
    #[default]
    Free,
    /// Acyclic: strictly upper-triangular.
    Dag,
    Oriented,
    LoopFree,
    Undirected,
    LoopFreeUndirected,
}

impl From<GraphForm> for MatrixOptions {
    fn from(form: GraphForm) -> Self {
        let none = MatrixOptions::default();
        match form {
            GraphForm::Free => none,
            GraphForm::Dag => MatrixOptions { triangular: true, null_diag: true, ..none },
            GraphForm::Oriented => MatrixOptions { oriented: true, ..none },
            GraphForm::LoopFree => MatrixOptions { null_diag: true, ..none },
            GraphForm::Undirected => MatrixOptions { symmetric: true, ..none },
            GraphForm::LoopFreeUndirected => MatrixOptions { symmetric: true, null_diag: true, ..none },
        }
    }
}

// ============================================================================
// Matrices and graphs
// ============================================================================

/// `n` integers drawn uniformly from `0..=bound`.
pub fn random_int_list<R: Rng + ?Sized>(rng: &mut R, n: usize, bound: usize) -> Vec<usize> {
    (0..n).map(|_| rng.gen_range(0..=bound)).collect()
}

/// `n × n` matrix of multiplicities in `0..=bound`, shaped by `options`.
pub fn random_matrix<R: Rng + ?Sized>(rng: &mut R, n: usize, bound: usize, options: MatrixOptions) -> Matrix {
    let mut m: Matrix = (0..n).map(|_| random_int_list(rng, n, bound)).collect();
    for i in 0..n {
        if options.null_diag {
            m[i][i] = 0;
        }
        for j in i + 1..n {
            if options.triangular {
                m[j][i] = 0;
            } else if options.oriented {
                if m[i][j] != 0 {
                    m[j][i] = 0;
                }
            } else if options.symmetric {
                m[j][i] = m[i][j];
            }
        }
    }
    m
}

/// Random graph of `n` interior nodes in the given form, with `inputs`
/// input and `outputs` output nodes attached to random interior nodes.
pub fn random_graph<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    bound: usize,
    inputs: usize,
    outputs: usize,
    form: GraphForm,
) -> Result<OpenDigraph<String>> {
    if n == 0 && inputs + outputs > 0 {
        return Err(Error::StructuralViolation {
            node: None,
            reason: "boundary nodes need at least one interior node".into(),
        });
    }
    let mut g = OpenDigraph::from_matrix(&random_matrix(rng, n, bound, form.into()));
    for _ in 0..inputs {
        let target = NodeId(rng.gen_range(0..n));
        g.add_input_node(target, String::new())?;
    }
    for _ in 0..outputs {
        let target = NodeId(rng.gen_range(0..n));
        g.add_output_node(target, String::new())?;
    }
    Ok(g)
}

// ============================================================================
// Circuits
// ============================================================================

/// Random well-formed circuit built on an `n`-node DAG.
///
/// Sources get inputs and sinks get outputs; surplus boundary nodes are
/// merged pairwise and missing ones are attached to random interior nodes
/// until the counts match. A non-empty circuit has at least one input and
/// one output. Gates follow the degrees: one operand and one consumer is a
/// `Not` or a `Copy`, one operand and several consumers a `Copy`, several
/// operands a binary gate (followed by a `Copy` when it has several
/// consumers).
pub fn random_circuit<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    bound: usize,
    inputs: usize,
    outputs: usize,
) -> Result<BoolCirc> {
    if n == 0 {
        if inputs + outputs > 0 {
            return Err(Error::StructuralViolation {
                node: None,
                reason: "boundary nodes need at least one interior node".into(),
            });
        }
        return BoolCirc::new(OpenDigraph::empty());
    }
    let (inputs, outputs) = (inputs.max(1), outputs.max(1));
    let mut g: OpenDigraph<Gate> = OpenDigraph::from_matrix(&random_matrix(rng, n, bound, GraphForm::Dag.into()));

    for id in g.interior_ids() {
        let node = g.get(id)?;
        let (source, sink) = (node.in_degree() == 0, node.out_degree() == 0);
        if source {
            g.add_input_node(id, Gate::Copy)?;
        }
        if sink {
            g.add_output_node(id, Gate::Copy)?;
        }
    }
    debug!(n, bound, sources = g.inputs().len(), sinks = g.outputs().len(), "random dag");

    while g.inputs().len() > inputs {
        let (a, b) = pick_two(rng, g.inputs());
        let targets = [sole(g.get(a)?.sole_child(), a)?, sole(g.get(b)?.sole_child(), b)?];
        let merged = g.add_node(Gate::Copy, &[], &[(targets[0], 1), (targets[1], 1)])?;
        g.remove_nodes([a, b])?;
        g.add_input_node(merged, Gate::Copy)?;
    }
    while g.outputs().len() > outputs {
        let (a, b) = pick_two(rng, g.outputs());
        let sources = [sole(g.get(a)?.sole_parent(), a)?, sole(g.get(b)?.sole_parent(), b)?];
        let merged = g.add_node(Gate::Copy, &[(sources[0], 1), (sources[1], 1)], &[])?;
        g.remove_nodes([a, b])?;
        g.add_output_node(merged, Gate::Copy)?;
    }
    while g.inputs().len() < inputs {
        let interior = g.interior_ids();
        let target = interior[rng.gen_range(0..interior.len())];
        g.add_input_node(target, Gate::Copy)?;
    }
    while g.outputs().len() < outputs {
        let interior = g.interior_ids();
        let target = interior[rng.gen_range(0..interior.len())];
        g.add_output_node(target, Gate::Copy)?;
    }

    for id in g.interior_ids() {
        let node = g.get(id)?;
        let (indeg, outdeg) = (node.in_degree(), node.out_degree());
        let gate = match (indeg, outdeg) {
            (1, 1) if rng.gen_bool(0.5) => Gate::Not,
            (1, _) => Gate::Copy,
            _ => [Gate::And, Gate::Or, Gate::Xor][rng.gen_range(0..3)],
        };
        if indeg > 1 && outdeg > 1 {
            let children: Vec<(NodeId, usize)> = node.children().iter().map(|(&c, &m)| (c, m)).collect();
            for &(child, _) in &children {
                g.remove_parallel_edges(id, child)?;
            }
            g.add_node(Gate::Copy, &[(id, 1)], &children)?;
        }
        g.set_label(id, gate)?;
    }
    BoolCirc::new(g)
}

/// Two distinct entries of `ids` (which holds at least two).
fn pick_two<R: Rng + ?Sized>(rng: &mut R, ids: &[NodeId]) -> (NodeId, NodeId) {
    let first = rng.gen_range(0..ids.len());
    let mut second = rng.gen_range(0..ids.len() - 1);
    if second >= first {
        second += 1;
    }
    (ids[first], ids[second])
}

fn sole(neighbor: Option<NodeId>, boundary: NodeId) -> Result<NodeId> {
    neighbor.ok_or_else(|| Error::structural(boundary, "boundary node without a single neighbor"))
}
