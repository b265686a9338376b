//! # Boolean Circuits
//!
//! [`BoolCirc`] is an [`OpenDigraph<Gate>`] that passed three checks, in
//! order: open-digraph well-formedness, acyclicity of the interior, and the
//! per-gate degree rules:
//!
//! | gate | rule |
//! |------|------|
//! | `Const` | no parent (or a single input parent) and one child |
//! | `Copy` | one parent |
//! | `And`, `Or`, `Xor` | one child |
//! | `Not` | one parent and one child |
//!
//! Boundary nodes are exempt from the gate rules.

pub mod gate;
pub mod eval;
pub mod parse;
pub mod factory;

use serde::{Deserialize, Serialize};

use crate::algo::is_cyclic;
use crate::model::{Node, NodeId, OpenDigraph};
use crate::{Error, Result};

pub use gate::Gate;
pub use parse::parse_parentheses;

/// A validated boolean circuit.
///
/// Serializes as its graph; deserializing runs [`BoolCirc::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OpenDigraph<Gate>", into = "OpenDigraph<Gate>")]
pub struct BoolCirc {
    graph: OpenDigraph<Gate>,
}

impl BoolCirc {
    /// Validate `graph` and wrap it.
    pub fn new(graph: OpenDigraph<Gate>) -> Result<Self> {
        let circ = Self { graph };
        circ.validate()?;
        Ok(circ)
    }

    /// Parse the text labels of `graph` into gates and validate the result.
    /// Boundary labels are free-form names and are not parsed.
    pub fn from_digraph<L: AsRef<str>>(graph: &OpenDigraph<L>) -> Result<Self> {
        let typed = graph.try_relabel(|id, label| {
            if graph.is_boundary(id) {
                return Ok(Gate::Copy);
            }
            Gate::parse(label.as_ref()).ok_or_else(|| Error::LabelViolation {
                node: id,
                label: label.as_ref().to_string(),
                rule: "is not a gate symbol".into(),
            })
        })?;
        Self::new(typed)
    }

    /// Wrap a graph the caller knows to be valid.
    pub(crate) fn from_valid(graph: OpenDigraph<Gate>) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &OpenDigraph<Gate> {
        &self.graph
    }

    pub fn into_graph(self) -> OpenDigraph<Gate> {
        self.graph
    }

    pub fn inputs(&self) -> &[NodeId] {
        self.graph.inputs()
    }

    pub fn outputs(&self) -> &[NodeId] {
        self.graph.outputs()
    }

    /// Text-labeled copy: gates become their symbols, boundary nodes `""`.
    pub fn to_labeled(&self) -> OpenDigraph<String> {
        self.graph.relabel(|id, gate| {
            if self.graph.is_boundary(id) { String::new() } else { gate.symbol().to_string() }
        })
    }

    /// Run every circuit check.
    pub fn validate(&self) -> Result<()> {
        self.graph.validate()?;
        if is_cyclic(&self.graph) {
            return Err(Error::CyclicGraph);
        }
        for node in self.graph.nodes().filter(|n| !self.graph.is_boundary(n.id())) {
            if let Some(rule) = self.broken_rule(node) {
                return Err(Error::LabelViolation {
                    node: node.id(),
                    label: node.label().symbol().to_string(),
                    rule: rule.into(),
                });
            }
        }
        Ok(())
    }

    fn broken_rule(&self, node: &Node<Gate>) -> Option<&'static str> {
        let (indeg, outdeg) = (node.in_degree(), node.out_degree());
        match node.label() {
            Gate::Const(_) => {
                let bound = indeg == 1 && node.sole_parent().is_some_and(|p| self.graph.is_input(p));
                (!(indeg == 0 || bound) || outdeg != 1)
                    .then_some("must have no parent and exactly one child")
            }
            Gate::Copy => (indeg != 1).then_some("must have exactly one parent"),
            Gate::And | Gate::Or | Gate::Xor => (outdeg != 1).then_some("must have exactly one child"),
            Gate::Not => (indeg != 1 || outdeg != 1).then_some("must have exactly one parent and one child"),
        }
    }

    // ========================================================================
    // Composition
    // ========================================================================

    /// Side-by-side union of copies.
    pub fn parallel(&self, other: &BoolCirc) -> BoolCirc {
        Self::from_valid(self.graph.parallel(&other.graph))
    }

    pub fn iparallel(&mut self, others: impl IntoIterator<Item = BoolCirc>) {
        self.graph.iparallel(others.into_iter().map(BoolCirc::into_graph));
    }

    /// Feed the outputs of `self` into the inputs of `other`.
    ///
    /// The result is validated: a constant bound to an input of `other`
    /// would end up fed by a gate.
    pub fn compose(&self, other: &BoolCirc) -> Result<BoolCirc> {
        Self::new(self.graph.compose(&other.graph)?)
    }

    /// In-place [`compose`](Self::compose). On error `self` is unchanged.
    pub fn icompose(&mut self, other: BoolCirc) -> Result<()> {
        let mut graph = self.graph.clone();
        graph.icompose(other.graph)?;
        *self = Self::new(graph)?;
        Ok(())
    }
}

impl std::fmt::Display for BoolCirc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.graph)
    }
}

impl TryFrom<OpenDigraph<Gate>> for BoolCirc {
    type Error = Error;

    fn try_from(graph: OpenDigraph<Gate>) -> Result<Self> {
        Self::new(graph)
    }
}

impl From<BoolCirc> for OpenDigraph<Gate> {
    fn from(circ: BoolCirc) -> Self {
        circ.graph
    }
}
