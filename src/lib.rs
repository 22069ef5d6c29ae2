//! fodiscovery - top-k reliable functional dependency discovery
//!
//! Finds the attribute subsets of a table that best determine a chosen target
//! attribute, scored by the reliable fraction of information.
//!
//! # Modules
//!
//! ## Data
//! - [`data`] - Raw and discretized tables, target selection
//! - [`preprocessing`] - Equal-frequency, target-aware and pass-through discretization
//!
//! ## Scoring
//! - [`lattice`] - Canonical subset keys, search nodes, child generation
//! - [`scoring`] - Fraction of information, permutation-model bias, optimistic estimators
//!
//! ## Search
//! - [`search`] - Beam search, OPUS branch-and-bound, exhaustive reference, batch runs
//!
//! # Example
//!
//! ```no_run
//! use fodiscovery::prelude::*;
//!
//! # fn run(table: &DataTable) -> Result<()> {
//! let config = DiscoveryConfig::default().with_top_k(3);
//! let outcome = discover(table, Target::Last, &config)?;
//! for pattern in &outcome.patterns {
//!     println!("{} {:.4}", pattern.subset, pattern.score);
//! }
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Data
pub mod data;
pub mod preprocessing;

// Scoring
pub mod lattice;
pub mod scoring;

// Search
pub mod search;

pub use search::{discover, discover_discrete};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::data::{Attribute, AttributeKind, DataTable, DiscreteTable, Target};
    pub use crate::error::{DiscoveryError, Result};
    pub use crate::lattice::{LanguageOption, RefinementPropagation, SubsetKey};
    pub use crate::preprocessing::{DiscretizationConfig, DiscretizationType, Discretizer};
    pub use crate::scoring::{ObjectiveKind, OptimisticEstimator};
    pub use crate::search::{
        discover, discover_batch, discover_discrete, exhaustive_top_k, Algorithm, BeamInit,
        BeamSearchEngine, BranchAndBoundEngine, DiscoveryConfig, DiscoveryJob, OperatorOrder,
        Pattern, SearchOutcome, SearchStatistics, Termination, TraverseOrder,
    };
}
