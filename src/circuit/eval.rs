//! Evaluation by constant propagation.
//!
//! A constant feeding a gate is rewritten into the gate locally until every
//! output boundary node hangs off a constant. Rules, for a constant `b`
//! feeding gate `G`:
//!
//! - `Copy`: `G` is replaced by one constant `b` per outgoing edge.
//! - `Not`: `G` becomes the constant `!b`.
//! - `And`/`Or`: an absorbing `b` (0 for `And`, 1 for `Or`) turns `G` into
//!   `b` and diverts its other operands into discard nodes; a neutral `b`
//!   just disappears.
//! - `Xor`: `b = 1` pushes the other operands into a fresh `Xor` and turns
//!   `G` into its negation; `b = 0` just disappears.
//! - A variadic gate left without operands becomes its identity.

use tracing::{debug, trace, warn};

use super::{BoolCirc, Gate};
use crate::algo::topological_layers;
use crate::model::{NodeId, OpenDigraph};
use crate::{Error, Result};

impl BoolCirc {
    /// Reduce the circuit in place until every output is fed by a constant.
    ///
    /// Every input must be bound: its only child is a constant.
    pub fn evaluate(&mut self) -> Result<()> {
        let g = &mut self.graph;

        // Seed from the bound inputs.
        for input in g.inputs().to_vec() {
            let Some(node) = g.node(input) else { continue };
            let bound = node
                .sole_child()
                .filter(|&c| g.node(c).is_some_and(|n| n.label().is_const()))
                .ok_or_else(|| Error::structural(input, "input is not bound to a constant"))?;
            propagate(g, bound)?;
        }

        let mut pass = 0usize;
        while !is_resolved(g) {
            pass += 1;
            let layers = topological_layers(g)?;
            let mut rewrites = 0usize;
            for &id in layers.first().map(Vec::as_slice).unwrap_or_default() {
                let Some(label) = g.node(id).map(|n| *n.label()) else { continue };
                let changed = match label {
                    Gate::Const(_) => propagate(g, id)?,
                    gate => {
                        neutral_rule(g, id, gate)?;
                        true
                    }
                };
                rewrites += usize::from(changed);
            }
            debug!(pass, layers = layers.len(), rewrites, "evaluation pass");
            if rewrites == 0 {
                warn!(pass, "evaluation stalled");
                return Err(Error::StructuralViolation {
                    node: None,
                    reason: "evaluation made no progress".into(),
                });
            }
        }
        Ok(())
    }

    /// Bits held by the constants feeding the outputs, in output order.
    pub fn output_bits(&self) -> Result<Vec<bool>> {
        self.graph
            .outputs()
            .iter()
            .map(|&out| {
                self.graph
                    .get(out)?
                    .sole_parent()
                    .and_then(|p| self.graph.node(p))
                    .and_then(|p| p.label().bit())
                    .ok_or_else(|| Error::structural(out, "output is not fed by a constant"))
            })
            .collect()
    }

    /// Evaluate a copy of the circuit on `bits`, one per input.
    pub fn evaluate_bits(&self, bits: &[bool]) -> Result<Vec<bool>> {
        if bits.len() != self.inputs().len() {
            return Err(Error::BitCountMismatch { bits: bits.len(), inputs: self.inputs().len() });
        }
        let mut circ = BoolCirc::from_bits(bits);
        circ.icompose(self.clone())?;
        circ.evaluate()?;
        circ.output_bits()
    }
}

/// Every interior node is a constant that feeds an output.
fn is_resolved(g: &OpenDigraph<Gate>) -> bool {
    g.nodes().filter(|n| !g.is_boundary(n.id())).all(|n| {
        n.label().is_const() && n.sole_child().is_some_and(|c| g.is_output(c))
    })
}

/// Push the constant `id` into its consumer. Returns false when the
/// consumer is an output and there is nothing to rewrite.
fn propagate(g: &mut OpenDigraph<Gate>, id: NodeId) -> Result<bool> {
    let node = g.get(id)?;
    let bit = node.label().bit().ok_or_else(|| Error::structural(id, "not a constant"))?;
    let Some(target) = node.sole_child() else {
        // a constant whose consumer went away carries no information
        trace!(node = %id, "dropping dangling constant");
        g.remove_node(id)?;
        return Ok(true);
    };
    if g.is_output(target) {
        return Ok(false);
    }
    let gate = *g.get(target)?.label();
    trace!(constant = %id, bit, target = %target, gate = %gate, "rewrite");
    g.remove_node(id)?;
    match gate {
        Gate::Copy => copy_rule(g, target, bit)?,
        Gate::Not => g.set_label(target, Gate::Const(!bit))?,
        Gate::And => absorb_rule(g, target, bit, false)?,
        Gate::Or => absorb_rule(g, target, bit, true)?,
        Gate::Xor => xor_rule(g, target, bit)?,
        Gate::Const(_) => return Err(Error::structural(target, "constant fed by another constant")),
    }
    Ok(true)
}

fn copy_rule(g: &mut OpenDigraph<Gate>, copy: NodeId, bit: bool) -> Result<()> {
    let children: Vec<(NodeId, usize)> = g.get(copy)?.children().iter().map(|(&c, &m)| (c, m)).collect();
    for (child, multiplicity) in children {
        for _ in 0..multiplicity {
            g.add_node(Gate::Const(bit), &[], &[(child, 1)])?;
        }
    }
    g.remove_node(copy)
}

fn absorb_rule(g: &mut OpenDigraph<Gate>, gate: NodeId, bit: bool, absorbing: bool) -> Result<()> {
    if bit != absorbing {
        return Ok(());
    }
    let parents: Vec<(NodeId, usize)> = g.get(gate)?.parents().iter().map(|(&p, &m)| (p, m)).collect();
    for (parent, multiplicity) in parents {
        g.remove_parallel_edges(parent, gate)?;
        for _ in 0..multiplicity {
            g.add_node(Gate::Copy, &[(parent, 1)], &[])?;
        }
    }
    g.set_label(gate, Gate::Const(bit))
}

fn xor_rule(g: &mut OpenDigraph<Gate>, gate: NodeId, bit: bool) -> Result<()> {
    if !bit {
        return Ok(());
    }
    let parents: Vec<(NodeId, usize)> = g.get(gate)?.parents().iter().map(|(&p, &m)| (p, m)).collect();
    for &(parent, _) in &parents {
        g.remove_parallel_edges(parent, gate)?;
    }
    g.add_node(Gate::Xor, &parents, &[(gate, 1)])?;
    g.set_label(gate, Gate::Not)
}

fn neutral_rule(g: &mut OpenDigraph<Gate>, id: NodeId, gate: Gate) -> Result<()> {
    let bit = gate.identity().ok_or_else(|| Error::LabelViolation {
        node: id,
        label: gate.symbol().to_string(),
        rule: "has no parent to evaluate".into(),
    })?;
    trace!(node = %id, gate = %gate, bit, "neutral element");
    g.set_label(id, Gate::Const(bit))
}
