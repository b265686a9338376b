//! # Open Digraph Model
//!
//! The multigraph primitive: nodes addressed by [`NodeId`] inside an arena
//! owned by [`OpenDigraph`], edges recorded as multiplicity maps on both
//! endpoints.
//!
//! Design rule: this module is pure data plus its own invariants. Anything
//! that walks the graph (layering, paths, components) lives in `algo`.

pub mod node;
pub mod graph;
pub mod matrix;

pub use node::{Node, NodeId, Multiplicities, Direction};
pub use graph::{OpenDigraph, BoundaryKind};
pub use matrix::Matrix;
