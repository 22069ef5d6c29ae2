//! Search configuration

use crate::error::{DiscoveryError, Result};
use crate::lattice::{LanguageOption, RefinementPropagation};
use crate::preprocessing::DiscretizationConfig;
use crate::scoring::{ObjectiveKind, OptimisticEstimator};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Search engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Algorithm {
    /// Bounded-width level-wise search
    #[serde(rename = "BEAM")]
    Beam,
    /// Exact OPUS-style branch-and-bound
    #[default]
    #[serde(rename = "OPUS")]
    BranchAndBound,
}

impl FromStr for Algorithm {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "BEAM" => Ok(Algorithm::Beam),
            "OPUS" | "BRANCH_AND_BOUND" => Ok(Algorithm::BranchAndBound),
            _ => Err(DiscoveryError::invalid_config(
                "algorithm",
                s,
                "expected BEAM or OPUS",
            )),
        }
    }
}

/// Order in which branch-and-bound pops open nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TraverseOrder {
    /// Shallowest first, then highest potential
    #[default]
    #[serde(rename = "BFSPOTENTIAL")]
    BreadthFirstPotential,
    /// Shallowest first, then highest score
    #[serde(rename = "BFSVALUE")]
    BreadthFirstValue,
    /// Highest potential first
    #[serde(rename = "BESTFSPOTENTIAL")]
    BestFirstPotential,
    /// Highest score first
    #[serde(rename = "BESTFSVALUE")]
    BestFirstValue,
    /// Last pushed first
    #[serde(rename = "DFS")]
    DepthFirst,
}

impl TraverseOrder {
    pub const ALL: [TraverseOrder; 5] = [
        TraverseOrder::BreadthFirstPotential,
        TraverseOrder::BreadthFirstValue,
        TraverseOrder::BestFirstPotential,
        TraverseOrder::BestFirstValue,
        TraverseOrder::DepthFirst,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TraverseOrder::BreadthFirstPotential => "BFSPOTENTIAL",
            TraverseOrder::BreadthFirstValue => "BFSVALUE",
            TraverseOrder::BestFirstPotential => "BESTFSPOTENTIAL",
            TraverseOrder::BestFirstValue => "BESTFSVALUE",
            TraverseOrder::DepthFirst => "DFS",
        }
    }
}

impl FromStr for TraverseOrder {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.to_ascii_uppercase();
        TraverseOrder::ALL
            .into_iter()
            .find(|order| order.label() == upper)
            .ok_or_else(|| {
                DiscoveryError::invalid_config(
                    "traverse_order",
                    s,
                    "expected BFSPOTENTIAL, BFSVALUE, BESTFSPOTENTIAL, BESTFSVALUE or DFS",
                )
            })
    }
}

/// How branch-and-bound hands refinement operators to children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorOrder {
    /// Children sorted by ascending potential; each receives the operators of those before it
    #[default]
    OpusPaper,
    /// Child `X ∪ {a}` receives the operators above `a`
    Lexicographic,
}

impl FromStr for OperatorOrder {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "OPUS_PAPER" => Ok(OperatorOrder::OpusPaper),
            "LEXICOGRAPHIC" => Ok(OperatorOrder::Lexicographic),
            _ => Err(DiscoveryError::invalid_config(
                "operator_order",
                s,
                "expected OPUS_PAPER or LEXICOGRAPHIC",
            )),
        }
    }
}

/// First frontier of the beam search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BeamInit {
    #[default]
    EmptySubset,
    Singletons,
}

/// Configuration of one discovery run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub algorithm: Algorithm,

    /// Number of patterns to return
    pub top_k: usize,

    /// Frontier width (beam only)
    pub beam_width: usize,

    /// Initial beam frontier
    pub beam_init: BeamInit,

    /// Approximation factor; a node is pruned when `bound * alpha <= kth best`
    pub alpha: f64,

    pub traverse_order: TraverseOrder,

    pub operator_order: OperatorOrder,

    pub language: LanguageOption,

    pub estimator: OptimisticEstimator,

    pub propagation: RefinementPropagation,

    pub objective: ObjectiveKind,

    pub discretization: DiscretizationConfig,

    /// Largest pattern size explored
    pub max_depth: Option<usize>,

    /// Stop after creating this many nodes
    pub max_nodes: Option<usize>,

    /// Maximum time in seconds
    pub time_budget_secs: Option<f64>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::BranchAndBound,
            top_k: 1,
            beam_width: 5,
            beam_init: BeamInit::EmptySubset,
            alpha: 1.0,
            traverse_order: TraverseOrder::BreadthFirstPotential,
            operator_order: OperatorOrder::OpusPaper,
            language: LanguageOption::All,
            estimator: OptimisticEstimator::Chain,
            propagation: RefinementPropagation::NonRedundant,
            objective: ObjectiveKind::ReliableFractionOfInformation,
            discretization: DiscretizationConfig::default(),
            max_depth: None,
            max_nodes: None,
            time_budget_secs: None,
        }
    }
}

impl DiscoveryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Branch-and-bound defaults
    pub fn branch_and_bound() -> Self {
        Self::default()
    }

    /// Beam search defaults with the given width
    pub fn beam(beam_width: usize) -> Self {
        Self {
            algorithm: Algorithm::Beam,
            beam_width,
            ..Self::default()
        }
    }

    /// Parse a JSON document; unknown tokens are configuration errors
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_beam_init(mut self, init: BeamInit) -> Self {
        self.beam_init = init;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_traverse_order(mut self, order: TraverseOrder) -> Self {
        self.traverse_order = order;
        self
    }

    pub fn with_operator_order(mut self, order: OperatorOrder) -> Self {
        self.operator_order = order;
        self
    }

    pub fn with_language(mut self, language: LanguageOption) -> Self {
        self.language = language;
        self
    }

    pub fn with_estimator(mut self, estimator: OptimisticEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_propagation(mut self, propagation: RefinementPropagation) -> Self {
        self.propagation = propagation;
        self
    }

    pub fn with_objective(mut self, objective: ObjectiveKind) -> Self {
        self.objective = objective;
        self
    }

    pub fn with_discretization(mut self, discretization: DiscretizationConfig) -> Self {
        self.discretization = discretization;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_max_nodes(mut self, nodes: usize) -> Self {
        self.max_nodes = Some(nodes);
        self
    }

    pub fn with_time_budget(mut self, secs: f64) -> Self {
        self.time_budget_secs = Some(secs);
        self
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Reject invalid parameters before any search work
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(DiscoveryError::invalid_config(
                "top_k",
                self.top_k,
                "must be at least 1",
            ));
        }
        if self.beam_width == 0 {
            return Err(DiscoveryError::invalid_config(
                "beam_width",
                self.beam_width,
                "must be at least 1",
            ));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(DiscoveryError::invalid_config(
                "alpha",
                self.alpha,
                "must lie in (0, 1]",
            ));
        }
        if self.max_depth == Some(0) {
            return Err(DiscoveryError::invalid_config(
                "max_depth",
                0,
                "must be at least 1",
            ));
        }
        if let Some(secs) = self.time_budget_secs {
            if !(secs.is_finite() && secs > 0.0) {
                return Err(DiscoveryError::invalid_config(
                    "time_budget_secs",
                    secs,
                    "must be a positive number of seconds",
                ));
            }
        }
        self.discretization.validate()
    }
}
