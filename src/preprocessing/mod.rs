//! Discretization preprocessing
//!
//! Turns raw tables into dense integer codes before the search:
//! - Equal-frequency binning (EF)
//! - Target-aware candidate cut points (COP)
//! - Pass-through for pre-discretized predictors (PRE)
//! - Separate equal-frequency binning of a numeric target

mod binning;
mod config;
mod discretizer;

pub use binning::{
    apply_cut_points, equal_frequency_cut_points, find_bin, BinnedColumn, Binner, BinningStrategy,
};
pub use config::{DiscretizationConfig, DiscretizationType};
pub use discretizer::Discretizer;
