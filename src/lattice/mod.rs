//! Attribute-subset lattice
//!
//! - [`SubsetKey`] - canonical bitset key of an attribute subset
//! - [`SearchNode`] - one lattice position with its cached score and bound
//! - [`LatticeRefiner`] - generates the children of a node under a propagation policy

mod refiner;
mod subset;

pub use refiner::{LanguageOption, LatticeRefiner, Refinement, RefinementPropagation, Refinements};
pub use subset::SubsetKey;

/// A position in the lattice.
///
/// Score and bound are computed once when the node is created.
#[derive(Debug, Clone)]
pub struct SearchNode {
    pub subset: SubsetKey,
    /// Attributes this node may still be refined with
    pub available: SubsetKey,
    pub score: f64,
    /// Upper bound on the score of every subset reachable below this node
    pub bound: f64,
    pub depth: usize,
    /// Blocks of the partition induced by `subset`
    pub blocks: usize,
}

impl SearchNode {
    /// The empty subset, refinable with every attribute in `available`
    pub fn root(available: SubsetKey) -> Self {
        Self {
            subset: SubsetKey::empty(),
            available,
            score: 0.0,
            bound: f64::INFINITY,
            depth: 0,
            blocks: 1,
        }
    }
}
