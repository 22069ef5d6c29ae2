//! Brute-force reference search

use super::config::{Algorithm, DiscoveryConfig};
use super::{RunState, SearchOutcome};
use crate::data::DiscreteTable;
use crate::error::{DiscoveryError, Result};
use crate::lattice::{LatticeRefiner, SubsetKey};
use crate::scoring::DependencyObjective;

/// Largest number of predictors the full enumeration accepts
const MAX_PREDICTORS: usize = 24;

/// True top-k over every non-empty legal subset of the predictors.
///
/// Only `top_k`, `language` and `objective` of the configuration apply.
pub fn exhaustive_top_k(
    table: &DiscreteTable,
    target: usize,
    config: &DiscoveryConfig,
) -> Result<SearchOutcome> {
    config.validate()?;
    let objective = DependencyObjective::new(table, target, config.objective)?;
    let refiner = LatticeRefiner::new(table, target, config.language, config.propagation);

    let predictors = refiner.universe().indices();
    if predictors.len() > MAX_PREDICTORS {
        return Err(DiscoveryError::invalid_config(
            "predictors",
            predictors.len(),
            format!("exhaustive search supports at most {} predictors", MAX_PREDICTORS),
        ));
    }

    let mut state = RunState::new(&objective, config, table.num_attributes());
    for mask in 1u64..(1u64 << predictors.len()) {
        let subset: SubsetKey = predictors
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1u64 << bit) != 0)
            .map(|(_, &attr)| attr)
            .collect();

        state.stats.nodes_created += 1;
        state.stats.record_depth(subset.len());
        if !refiner.is_legal(&mut state.cache, &subset) {
            state.stats.nodes_discarded_by_rule += 1;
            continue;
        }
        let score = state.cache.evaluate(&subset).score;
        state.results.offer(&subset, score);
    }

    Ok(state.finish(target, Algorithm::BranchAndBound))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::LanguageOption;

    #[test]
    fn test_enumerates_every_subset() {
        let table = DiscreteTable::from_columns(
            "t",
            vec![
                ("a", vec![0, 1, 0, 1, 1]),
                ("b", vec![0, 0, 1, 1, 0]),
                ("key", vec![0, 1, 2, 3, 4]),
                ("y", vec![0, 1, 1, 0, 1]),
            ],
        )
        .unwrap();

        let outcome = exhaustive_top_k(&table, 3, &DiscoveryConfig::default().with_top_k(7)).unwrap();
        assert_eq!(outcome.statistics.nodes_created, 7);
        assert_eq!(outcome.patterns.len(), 7);

        let no_keys = DiscoveryConfig::default()
            .with_top_k(7)
            .with_language(LanguageOption::ExcludeKeys);
        let outcome = exhaustive_top_k(&table, 3, &no_keys).unwrap();
        assert_eq!(outcome.patterns.len(), 3);
        assert_eq!(outcome.statistics.nodes_discarded_by_rule, 4);
    }
}
