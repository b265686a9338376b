//! # open-digraph — Open Directed Multigraphs and Boolean Circuits
//!
//! A mutable multigraph whose edges carry multiplicities, with ordered input
//! and output boundary nodes that act as the wiring interface for
//! composition. On top of it sits a boolean-circuit layer that checks gate
//! degree rules and evaluates circuits by local constant propagation.
//!
//! ## Design Principles
//!
//! 1. **Arena, not pointers**: a graph owns its nodes in an id-indexed map;
//!    edges are multiplicity records keyed by neighbor id on both endpoints.
//! 2. **Algorithms are pure functions**: `algo::*` borrow a graph and never
//!    mutate it.
//! 3. **Composition moves ownership**: `iparallel`/`icompose` consume the
//!    donor graph; `parallel`/`compose` deep-copy.
//! 4. **Typed gates**: circuit labels are parsed once into [`Gate`].
//!
//! ## Quick Start
//!
//! ```rust
//! use open_digraph::BoolCirc;
//!
//! # fn example() -> open_digraph::Result<()> {
//! let adder = BoolCirc::adder(1)?;
//! // a, b, carry-in  →  sum, carry-out
//! assert_eq!(adder.evaluate_bits(&[true, true, false])?, vec![false, true]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Layers
//!
//! | Module | Description |
//! |--------|-------------|
//! | `model` | `Node`, `OpenDigraph`, matrices |
//! | `algo` | cycles, layering, paths, components |
//! | `compose` | shift, parallel, sequential, fusion |
//! | `circuit` | `Gate`, `BoolCirc`, evaluation, parser, factories |
//! | `random` | random matrices, graphs and circuits for fixtures |
//! | `export` | Graphviz dot export/import |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod algo;
pub mod compose;
pub mod circuit;
pub mod random;
pub mod export;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Node, NodeId, Multiplicities, Direction,
    OpenDigraph, BoundaryKind, Matrix,
};

// ============================================================================
// Re-exports: Circuits
// ============================================================================

pub use circuit::{BoolCirc, Gate};

// ============================================================================
// Re-exports: Fixtures & export
// ============================================================================

pub use random::{GraphForm, MatrixOptions};
pub use export::{Dot, DotOptions};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Structural violation{}: {reason}", fmt_node(.node))]
    StructuralViolation { node: Option<NodeId>, reason: String },

    #[error("Label violation: node {node} labeled {label:?} {rule}")]
    LabelViolation { node: NodeId, label: String, rule: String },

    #[error("Graph is cyclic")]
    CyclicGraph,

    #[error("Not found: node {0}")]
    NodeNotFound(NodeId),

    #[error("Not found: edge {src} -> {dst}")]
    EdgeNotFound { src: NodeId, dst: NodeId },

    #[error("Arity mismatch: {outputs} outputs cannot feed {inputs} inputs")]
    ArityMismatch { outputs: usize, inputs: usize },

    #[error("Bit count mismatch: got {bits} bits for {inputs} inputs")]
    BitCountMismatch { bits: usize, inputs: usize },

    #[error("Node {node} is already registered as an {kind} node")]
    DuplicateBoundary { node: NodeId, kind: BoundaryKind },

    #[error("Parse error at position {position}: {message}")]
    ParseError { position: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_node(node: &Option<NodeId>) -> String {
    match node {
        Some(id) => format!(" at node {id}"),
        None => String::new(),
    }
}

impl Error {
    pub(crate) fn structural(node: NodeId, reason: impl Into<String>) -> Self {
        Error::StructuralViolation { node: Some(node), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
