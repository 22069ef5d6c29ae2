//! Search statistics

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Why a search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Termination {
    /// The open set (or frontier) ran empty
    #[default]
    Exhausted,
    /// `max_nodes` nodes were created
    NodeBudget,
    /// `time_budget_secs` elapsed
    TimeBudget,
}

/// Counters collected during one search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStatistics {
    /// Wall-clock time of the search
    pub elapsed: Duration,
    /// Children generated, including those later discarded
    pub nodes_created: usize,
    /// Nodes dropped because their bound could not beat the k-th best score
    pub nodes_discarded_by_bound: usize,
    /// Nodes dropped by the pattern language
    pub nodes_discarded_by_rule: usize,
    /// Distinct subsets actually scored
    pub evaluations: usize,
    /// Deepest node created
    pub max_depth: usize,
    /// Size of the best pattern
    pub winning_depth: usize,
    /// Peak size of the open set or beam frontier
    pub max_frontier_size: usize,
    /// `2^(attributes - 1)`, the lattice over every non-target attribute
    pub search_space_size: f64,
    pub termination: Termination,
}

impl SearchStatistics {
    /// Empty statistics for a table with `num_attributes` attributes including the target
    pub fn new(num_attributes: usize) -> Self {
        Self {
            search_space_size: 2f64.powi(num_attributes.saturating_sub(1) as i32),
            ..Self::default()
        }
    }

    pub fn record_depth(&mut self, depth: usize) {
        self.max_depth = self.max_depth.max(depth);
    }

    pub fn record_frontier(&mut self, size: usize) {
        self.max_frontier_size = self.max_frontier_size.max(size);
    }

    /// Nodes dropped for either reason
    pub fn nodes_discarded(&self) -> usize {
        self.nodes_discarded_by_bound + self.nodes_discarded_by_rule
    }

    /// Share of the lattice never created, in percent
    pub fn pruned_percentage(&self) -> f64 {
        if self.search_space_size <= 0.0 {
            return 0.0;
        }
        100.0 - 100.0 * self.nodes_created as f64 / self.search_space_size
    }
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "time {:.3}s, created {}, discarded {}, discarded by bound {}, discarded by rule {}, \
             evaluations {}, max depth {}, solution depth {}, max frontier {}, \
             search space {}, pruned {:.2}%, {:?}",
            self.elapsed.as_secs_f64(),
            self.nodes_created,
            self.nodes_discarded(),
            self.nodes_discarded_by_bound,
            self.nodes_discarded_by_rule,
            self.evaluations,
            self.max_depth,
            self.winning_depth,
            self.max_frontier_size,
            self.search_space_size,
            self.pruned_percentage(),
            self.termination,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_space_and_pruning() {
        let mut stats = SearchStatistics::new(5);
        assert_eq!(stats.search_space_size, 16.0);
        stats.nodes_created = 4;
        stats.nodes_discarded_by_bound = 2;
        stats.nodes_discarded_by_rule = 1;
        assert_eq!(stats.nodes_discarded(), 3);
        assert!((stats.pruned_percentage() - 75.0).abs() < 1e-12);
    }

    #[test]
    fn test_peaks() {
        let mut stats = SearchStatistics::new(3);
        stats.record_depth(2);
        stats.record_depth(1);
        stats.record_frontier(7);
        stats.record_frontier(3);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.max_frontier_size, 7);
        assert!(stats.to_string().contains("created 0"));
    }
}
