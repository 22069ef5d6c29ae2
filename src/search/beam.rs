//! Beam search
//!
//! Level-wise search that keeps only the `beam_width` best children of each
//! level:
//!
//! 1. INIT: the frontier is the empty subset or every legal singleton
//! 2. LEVEL_EXPAND: refine every frontier node, score and bound each child
//! 3. LEVEL_SELECT: drop children whose bound cannot beat the k-th best score,
//!    keep the top `beam_width` by score as the next frontier
//!
//! Stops when a level yields no children, at `max_depth`, or when a budget
//! runs out. The result never beats the exact search and equals it whenever
//! no level is ever truncated.

use super::config::{Algorithm, BeamInit, DiscoveryConfig};
use super::{RunState, SearchOutcome};
use crate::data::DiscreteTable;
use crate::error::Result;
use crate::lattice::{LatticeRefiner, RefinementPropagation, SearchNode, SubsetKey};
use crate::scoring::DependencyObjective;
use std::collections::HashSet;
use tracing::{debug, trace, warn};

type State<'o, 'a> = RunState<'o, DependencyObjective<'a>>;

/// Bounded-width level-wise search
pub struct BeamSearchEngine<'a> {
    table: &'a DiscreteTable,
    target: usize,
    config: DiscoveryConfig,
    objective: DependencyObjective<'a>,
    refiner: LatticeRefiner,
}

impl<'a> BeamSearchEngine<'a> {
    /// Validate the configuration and prepare a search for `target`
    pub fn new(table: &'a DiscreteTable, target: usize, config: &DiscoveryConfig) -> Result<Self> {
        config.validate()?;
        let objective = DependencyObjective::new(table, target, config.objective)?;
        let refiner = LatticeRefiner::new(table, target, config.language, config.propagation);

        Ok(Self {
            table,
            target,
            config: config.clone(),
            objective,
            refiner,
        })
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn run(&self) -> Result<SearchOutcome> {
        let mut state = RunState::new(&self.objective, &self.config, self.table.num_attributes());

        debug!(
            target = self.target,
            predictors = self.refiner.universe().len(),
            beam_width = self.config.beam_width,
            estimator = self.config.estimator.label(),
            "Starting beam search"
        );

        let root = SearchNode::root(self.refiner.universe().clone());
        let mut frontier = match self.config.beam_init {
            BeamInit::EmptySubset => vec![root],
            BeamInit::Singletons => {
                let singletons = self.expand_level(&[root], &mut state)?;
                self.survivors(singletons, &mut state, usize::MAX)
            }
        };
        state.stats.record_frontier(frontier.len());

        while let Some(depth) = frontier.first().map(|n| n.depth) {
            if let Some(reason) = state.budget_exhausted() {
                warn!(?reason, nodes = state.stats.nodes_created, "Search budget exhausted");
                state.stats.termination = reason;
                break;
            }
            if self.config.max_depth.is_some_and(|max| depth >= max) {
                break;
            }

            let children = self.expand_level(&frontier, &mut state)?;
            frontier = self.survivors(children, &mut state, self.config.beam_width);
            state.stats.record_frontier(frontier.len());

            trace!(
                depth = depth + 1,
                frontier = frontier.len(),
                threshold = state.results.threshold(),
                "Beam level selected"
            );
        }

        Ok(state.finish(self.target, Algorithm::Beam))
    }

    /// LEVEL_EXPAND: every child of every frontier node, scored, offered and bounded
    fn expand_level(&self, frontier: &[SearchNode], state: &mut State<'_, 'a>) -> Result<Vec<SearchNode>> {
        let members: HashSet<SubsetKey> = frontier.iter().map(|n| n.subset.clone()).collect();
        let mut children = Vec::new();

        for parent in frontier {
            for refinement in self.refiner.refine(parent) {
                if self.refiner.propagation() == RefinementPropagation::NonRedundant
                    && !self
                        .refiner
                        .is_canonical(&refinement.subset, refinement.attribute, &members)
                {
                    continue;
                }

                let extension = self.refiner.extension(&refinement.subset);
                if let Some(mut child) =
                    state.create_child(&self.refiner, self.config.estimator, parent, refinement, &extension)?
                {
                    child.available = self.refiner.universe().clone();
                    children.push(child);
                }
            }
        }
        Ok(children)
    }

    /// LEVEL_SELECT: drop hopeless children, rank by score, deduplicate, truncate
    fn survivors(
        &self,
        mut children: Vec<SearchNode>,
        state: &mut State<'_, 'a>,
        width: usize,
    ) -> Vec<SearchNode> {
        let before = children.len();
        children.retain(|child| !state.prunable(child.bound, 1.0));
        state.stats.nodes_discarded_by_bound += before - children.len();

        children.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.subset.cmp(&b.subset))
        });
        children.dedup_by(|a, b| a.subset == b.subset);
        children.truncate(width);
        children
    }
}
