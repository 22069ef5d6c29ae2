//! Pattern search
//!
//! This module provides:
//! - [`BeamSearchEngine`] - bounded-width level-wise search
//! - [`BranchAndBoundEngine`] - exact OPUS-style search with optimistic-bound pruning
//! - [`exhaustive_top_k`] - brute-force reference search over every legal subset
//! - [`discover_batch`] - independent searches run in parallel
//!
//! Every engine reports its patterns through a [`ResultCollector`] and its
//! effort through [`SearchStatistics`].

mod batch;
mod beam;
mod branch_bound;
mod config;
mod exhaustive;
mod open_set;
mod results;
mod stats;

pub use batch::{discover_batch, DiscoveryJob};
pub use beam::BeamSearchEngine;
pub use branch_bound::BranchAndBoundEngine;
pub use config::{Algorithm, BeamInit, DiscoveryConfig, OperatorOrder, TraverseOrder};
pub use exhaustive::exhaustive_top_k;
pub use open_set::OpenSet;
pub use results::{Pattern, ResultCollector};
pub use stats::{SearchStatistics, Termination};

use crate::data::{DataTable, DiscreteTable, Target};
use crate::error::{DiscoveryError, Result};
use crate::lattice::{LatticeRefiner, Refinement, SearchNode, SubsetKey};
use crate::preprocessing::Discretizer;
use crate::scoring::{EvaluationCache, ObjectiveFunction, OptimisticEstimator};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Slack allowed between a child's score and its parent's bound
const SOUNDNESS_TOLERANCE: f64 = 1e-9;

/// Ranked patterns and statistics of one search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub target: usize,
    pub algorithm: Algorithm,
    /// Best first
    pub patterns: Vec<Pattern>,
    pub statistics: SearchStatistics,
}

impl SearchOutcome {
    pub fn best(&self) -> Option<&Pattern> {
        self.patterns.first()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.patterns.iter().map(|p| p.score).collect()
    }
}

/// Discretize `table` and search it for the patterns that best determine `target`
pub fn discover(table: &DataTable, target: Target, config: &DiscoveryConfig) -> Result<SearchOutcome> {
    config.validate()?;
    let target = target.resolve(table.num_attributes())?;
    let discrete = Discretizer::new(config.discretization.clone())?.discretize(table, target)?;
    discover_discrete(&discrete, target, config)
}

/// Search an already discretized table
pub fn discover_discrete(
    table: &DiscreteTable,
    target: usize,
    config: &DiscoveryConfig,
) -> Result<SearchOutcome> {
    match config.algorithm {
        Algorithm::Beam => BeamSearchEngine::new(table, target, config)?.run(),
        Algorithm::BranchAndBound => BranchAndBoundEngine::new(table, target, config)?.run(),
    }
}

/// Mutable state threaded through one engine run
pub(crate) struct RunState<'o, O: ObjectiveFunction + ?Sized> {
    pub cache: EvaluationCache<'o, O>,
    pub results: ResultCollector,
    pub stats: SearchStatistics,
    started: Instant,
    max_nodes: Option<usize>,
    time_budget: Option<Duration>,
}

impl<'o, O: ObjectiveFunction + ?Sized> RunState<'o, O> {
    pub fn new(objective: &'o O, config: &DiscoveryConfig, num_attributes: usize) -> Self {
        Self {
            cache: EvaluationCache::new(objective),
            results: ResultCollector::new(config.top_k),
            stats: SearchStatistics::new(num_attributes),
            started: Instant::now(),
            max_nodes: config.max_nodes,
            time_budget: config.time_budget(),
        }
    }

    /// Budget that ends the search now, if any
    pub fn budget_exhausted(&self) -> Option<Termination> {
        if self.max_nodes.is_some_and(|max| self.stats.nodes_created >= max) {
            return Some(Termination::NodeBudget);
        }
        if self.time_budget.is_some_and(|limit| self.started.elapsed() >= limit) {
            return Some(Termination::TimeBudget);
        }
        None
    }

    /// Whether a node with this bound cannot improve the result set
    pub fn prunable(&self, bound: f64, alpha: f64) -> bool {
        self.results.is_full() && bound * alpha <= self.results.threshold()
    }

    /// Evaluate one refinement, offer it as a result and bound it over `extension`.
    ///
    /// Returns `None` when the language discards the child.
    pub fn create_child(
        &mut self,
        refiner: &LatticeRefiner,
        estimator: OptimisticEstimator,
        parent: &SearchNode,
        refinement: Refinement,
        extension: &SubsetKey,
    ) -> Result<Option<SearchNode>> {
        self.stats.nodes_created += 1;
        if !refinement.legal {
            self.stats.nodes_discarded_by_rule += 1;
            return Ok(None);
        }

        let subset = refinement.subset;
        let evaluation = self.cache.evaluate(&subset);
        if !refiner.admits(&mut self.cache, &subset, &evaluation) {
            self.stats.nodes_discarded_by_rule += 1;
            return Ok(None);
        }

        if cfg!(debug_assertions) && evaluation.score > parent.bound + SOUNDNESS_TOLERANCE {
            return Err(DiscoveryError::EstimatorUnsound {
                subset: subset.to_string(),
                score: evaluation.score,
                bound: parent.bound,
            });
        }

        let depth = parent.depth + 1;
        self.stats.record_depth(depth);
        self.results.offer(&subset, evaluation.score);

        let bound = estimator.bound(&mut self.cache, &subset, &evaluation, extension);
        Ok(Some(SearchNode {
            subset,
            available: SubsetKey::empty(),
            score: evaluation.score,
            bound,
            depth,
            blocks: evaluation.blocks,
        }))
    }

    pub fn finish(mut self, target: usize, algorithm: Algorithm) -> SearchOutcome {
        self.stats.elapsed = self.started.elapsed();
        self.stats.evaluations = self.cache.evaluations();
        self.stats.winning_depth = self.results.best().map_or(0, Pattern::depth);

        debug!(
            ?algorithm,
            target,
            patterns = self.results.len(),
            stats = %self.stats,
            "Search finished"
        );

        SearchOutcome {
            target,
            algorithm,
            patterns: self.results.into_patterns(),
            statistics: self.stats,
        }
    }
}
