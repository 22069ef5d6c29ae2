//! Discretization configuration

use crate::error::{DiscoveryError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Discretization scheme for numeric predictors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DiscretizationType {
    /// Equal-frequency bins
    #[default]
    #[serde(rename = "EF")]
    EqualFrequency,
    /// Target-aware choice among equal-frequency candidate cut points
    #[serde(rename = "COP")]
    CandidateCutPoints,
    /// Predictors are already discrete and pass through by value
    #[serde(rename = "PRE")]
    PreDiscretized,
}

impl FromStr for DiscretizationType {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "EF" => Ok(DiscretizationType::EqualFrequency),
            "COP" => Ok(DiscretizationType::CandidateCutPoints),
            "PRE" => Ok(DiscretizationType::PreDiscretized),
            _ => Err(DiscoveryError::invalid_config(
                "discretization",
                s,
                "expected EF, COP or PRE",
            )),
        }
    }
}

/// Configuration for discretizing a table before the search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscretizationConfig {
    /// Scheme applied to numeric predictors
    pub kind: DiscretizationType,

    /// Number of equal-frequency bins (EF)
    pub num_bins: usize,

    /// Maximum number of bins (COP)
    pub max_bins: usize,

    /// Candidate cut points per final bin (COP)
    pub cut_point_multiplier: usize,

    /// Equal-frequency bins for a numeric target, whatever the predictor scheme
    pub num_bins_for_target: usize,
}

impl Default for DiscretizationConfig {
    fn default() -> Self {
        Self {
            kind: DiscretizationType::EqualFrequency,
            num_bins: 5,
            max_bins: 5,
            cut_point_multiplier: 2,
            num_bins_for_target: 5,
        }
    }
}

impl DiscretizationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equal-frequency binning with `num_bins` bins
    pub fn equal_frequency(num_bins: usize) -> Self {
        Self {
            kind: DiscretizationType::EqualFrequency,
            num_bins,
            ..Self::default()
        }
    }

    /// Target-aware cut point selection
    pub fn candidate_cut_points(max_bins: usize, cut_point_multiplier: usize) -> Self {
        Self {
            kind: DiscretizationType::CandidateCutPoints,
            max_bins,
            cut_point_multiplier,
            ..Self::default()
        }
    }

    /// Predictors already discrete; only the target is binned
    pub fn pre_discretized() -> Self {
        Self {
            kind: DiscretizationType::PreDiscretized,
            ..Self::default()
        }
    }

    /// Builder method to set the number of target bins
    pub fn with_num_bins_for_target(mut self, bins: usize) -> Self {
        self.num_bins_for_target = bins;
        self
    }

    /// Check the parameters the chosen scheme uses
    pub fn validate(&self) -> Result<()> {
        match self.kind {
            DiscretizationType::EqualFrequency if self.num_bins <= 1 => {
                return Err(DiscoveryError::invalid_config(
                    "num_bins",
                    self.num_bins,
                    "must be greater than 1",
                ));
            }
            DiscretizationType::CandidateCutPoints if self.max_bins <= 1 => {
                return Err(DiscoveryError::invalid_config(
                    "max_bins",
                    self.max_bins,
                    "must be greater than 1",
                ));
            }
            DiscretizationType::CandidateCutPoints if self.cut_point_multiplier == 0 => {
                return Err(DiscoveryError::invalid_config(
                    "cut_point_multiplier",
                    self.cut_point_multiplier,
                    "must be at least 1",
                ));
            }
            DiscretizationType::CandidateCutPoints
                if self.max_bins.checked_mul(self.cut_point_multiplier).is_none() =>
            {
                return Err(DiscoveryError::invalid_config(
                    "cut_point_multiplier",
                    self.cut_point_multiplier,
                    "candidate count max_bins * cut_point_multiplier overflows",
                ));
            }
            _ => {}
        }

        if self.num_bins_for_target <= 1 {
            return Err(DiscoveryError::invalid_config(
                "num_bins_for_target",
                self.num_bins_for_target,
                "must be greater than 1",
            ));
        }
        Ok(())
    }
}
