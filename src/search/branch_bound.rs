//! Exact branch-and-bound search (OPUS)
//!
//! The engine cycles through SELECT_NODE, EXPAND and PRUNE_OR_KEEP until the
//! open set is empty or a budget runs out. A node is discarded as soon as its
//! bound scaled by `alpha` cannot beat the k-th best score, both when it is
//! created and again when it is popped.

use super::config::{Algorithm, DiscoveryConfig, OperatorOrder};
use super::open_set::OpenSet;
use super::{RunState, SearchOutcome};
use crate::data::DiscreteTable;
use crate::error::Result;
use crate::lattice::{LatticeRefiner, RefinementPropagation, SearchNode, SubsetKey};
use crate::scoring::DependencyObjective;
use tracing::{debug, trace, warn};

type State<'o, 'a> = RunState<'o, DependencyObjective<'a>>;

/// Exact top-k search over the subset lattice
pub struct BranchAndBoundEngine<'a> {
    table: &'a DiscreteTable,
    target: usize,
    config: DiscoveryConfig,
    objective: DependencyObjective<'a>,
    refiner: LatticeRefiner,
}

impl<'a> BranchAndBoundEngine<'a> {
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

    /// Run the search to completion or until a budget is exhausted
    pub fn run(&self) -> Result<SearchOutcome> {
        let mut state = RunState::new(&self.objective, &self.config, self.table.num_attributes());
        let mut open = OpenSet::new(self.config.traverse_order);

        debug!(
            target = self.target,
            predictors = self.refiner.universe().len(),
            order = self.config.traverse_order.label(),
            operator_order = ?self.config.operator_order,
            estimator = self.config.estimator.label(),
            alpha = self.config.alpha,
            "Starting branch-and-bound search"
        );

        let root = SearchNode::root(self.refiner.universe().clone());
        match self.config.operator_order {
            OperatorOrder::OpusPaper => open.push(root),
            OperatorOrder::Lexicographic => {
                self.expand_lexicographic(&root, &mut state, &mut open)?
            }
        }

        loop {
            if let Some(reason) = state.budget_exhausted() {
                warn!(?reason, nodes = state.stats.nodes_created, "Search budget exhausted");
                state.stats.termination = reason;
                break;
            }

            let Some(node) = open.pop() else {
                break;
            };
            if state.prunable(node.bound, self.config.alpha) {
                state.stats.nodes_discarded_by_bound += 1;
                continue;
            }

            trace!(
                subset = %node.subset,
                score = node.score,
                bound = node.bound,
                open = open.len(),
                "Expanding node"
            );
            match self.config.operator_order {
                OperatorOrder::OpusPaper => self.expand_opus(&node, &mut state, &mut open)?,
                OperatorOrder::Lexicographic => {
                    self.expand_lexicographic(&node, &mut state, &mut open)?
                }
            }
        }

        state.stats.record_frontier(open.peak());
        Ok(state.finish(self.target, Algorithm::BranchAndBound))
    }

    /// Evaluate all children first, drop the hopeless ones, then hand each survivor
    /// the operators of the survivors with lower potential.
    fn expand_opus(&self, node: &SearchNode, state: &mut State<'_, 'a>, open: &mut OpenSet) -> Result<()> {
        let propagation = self.refiner.propagation();
        let usable = node.available.intersection(self.refiner.legal_attributes());

        let mut children: Vec<(usize, SearchNode)> = Vec::new();
        for refinement in self.refiner.refine(node) {
            let attribute = refinement.attribute;
            let extension = match propagation {
                RefinementPropagation::NonRedundant => usable.without(attribute),
                RefinementPropagation::All => self.refiner.extension(&refinement.subset),
            };
            if let Some(child) =
                state.create_child(&self.refiner, self.config.estimator, node, refinement, &extension)?
            {
                children.push((attribute, child));
            }
        }

        // Pruned attributes leave every sibling's operators
        let before = children.len();
        children.retain(|(_, child)| !state.prunable(child.bound, self.config.alpha));
        state.stats.nodes_discarded_by_bound += before - children.len();

        children.sort_by(|(_, a), (_, b)| {
            a.bound
                .total_cmp(&b.bound)
                .then_with(|| a.subset.cmp(&b.subset))
        });

        let mut granted = SubsetKey::empty();
        for (attribute, mut child) in children {
            child.available = match propagation {
                RefinementPropagation::NonRedundant => {
                    let available = granted.clone();
                    granted.insert(attribute);
                    available
                }
                RefinementPropagation::All => self.refiner.extension(&child.subset),
            };
            if self.expandable(&child) {
                open.push(child);
            }
        }
        Ok(())
    }

    /// Child `X ∪ {a}` may only be refined with operators above `a`
    fn expand_lexicographic(
        &self,
        node: &SearchNode,
        state: &mut State<'_, 'a>,
        open: &mut OpenSet,
    ) -> Result<()> {
        let propagation = self.refiner.propagation();

        for refinement in self.refiner.refine(node) {
            let available = self
                .refiner
                .lexicographic_operators(&node.available, refinement.attribute);
            let extension = match propagation {
                RefinementPropagation::NonRedundant => available.clone(),
                RefinementPropagation::All => self.refiner.extension(&refinement.subset),
            };

            let Some(mut child) =
                state.create_child(&self.refiner, self.config.estimator, node, refinement, &extension)?
            else {
                continue;
            };
            if state.prunable(child.bound, self.config.alpha) {
                state.stats.nodes_discarded_by_bound += 1;
                continue;
            }

            child.available = available;
            if self.expandable(&child) {
                open.push(child);
            }
        }
        Ok(())
    }

    /// Leaves and nodes at the depth limit are never queued
    fn expandable(&self, node: &SearchNode) -> bool {
        let within_depth = self.config.max_depth.map_or(true, |max| node.depth < max);
        within_depth && !self.refiner.operators(node).is_empty()
    }
}
