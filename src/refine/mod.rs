//! Partition refinement over an abstract connectivity source.
//!
//! [`equitable::EquitablePartitionRefiner`] splits cells until every cell is equitable with respect
//! to every other. [`discrete::DiscretePartitionRefiner`] individualizes vertices on top of that
//! until partitions become discrete, yielding the canonical labelling and the automorphism group.

use crate::partition::Cell;
use std::fmt::Debug;

pub mod discrete;
pub mod equitable;

pub use discrete::DiscretePartitionRefiner;
pub use equitable::{EquitablePartitionRefiner, SplitOrder};

/// Vertex count and pairwise connectivity of an object, as consumed by the refiners.
///
/// `connectivity` must be symmetric. This is not checked: an asymmetric implementation silently
/// produces wrong automorphisms.
pub trait Refinable {
    /// Totally ordered summary of a vertex's neighbourhood inside a block.
    /// The order decides how split cells are arranged.
    type Invariant: Ord + Clone + Debug;

    fn vertex_count(&self) -> usize;

    /// 0 if `i` and `j` are not connected, otherwise the edge weight or multiplicity.
    fn connectivity(&self, i: usize, j: usize) -> usize;

    fn neighbours_in_block(&self, block: &Cell, vertex: usize) -> Self::Invariant;
}
