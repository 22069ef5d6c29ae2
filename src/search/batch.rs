//! Independent searches in parallel

use super::config::DiscoveryConfig;
use super::{discover, SearchOutcome};
use crate::data::{DataTable, Target};
use crate::error::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// One search of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryJob {
    pub target: Target,
    pub config: DiscoveryConfig,
}

impl DiscoveryJob {
    pub fn new(target: Target, config: DiscoveryConfig) -> Self {
        Self { target, config }
    }
}

/// Run every job over the shared table; results come back in job order.
///
/// Each job owns its own engine state, so a failing job does not affect the others.
pub fn discover_batch(table: &DataTable, jobs: &[DiscoveryJob]) -> Vec<Result<SearchOutcome>> {
    let start = Instant::now();
    let outcomes: Vec<Result<SearchOutcome>> = jobs
        .par_iter()
        .map(|job| discover(table, job.target, &job.config))
        .collect();

    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    info!(
        jobs = jobs.len(),
        failed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Batch finished"
    );
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Attribute;
    use crate::error::DiscoveryError;
    use crate::search::Algorithm;

    fn table() -> DataTable {
        DataTable::from_columns(
            "batch",
            vec![
                (Attribute::categorical("a"), vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0]),
                (Attribute::categorical("b"), vec![0.0, 0.0, 1.0, 1.0, 0.0, 1.0]),
                (Attribute::categorical("y"), vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_batch_preserves_order_and_errors() {
        let jobs = vec![
            DiscoveryJob::new(Target::Last, DiscoveryConfig::default()),
            DiscoveryJob::new(Target::Last, DiscoveryConfig::default().with_top_k(0)),
            DiscoveryJob::new(Target::Index(2), DiscoveryConfig::beam(2)),
        ];
        let outcomes = discover_batch(&table(), &jobs);

        assert_eq!(outcomes.len(), 3);
        let first = outcomes[0].as_ref().unwrap();
        assert_eq!(first.best().unwrap().subset.indices(), vec![0]);
        assert!(matches!(outcomes[1], Err(DiscoveryError::InvalidConfig { .. })));
        assert_eq!(outcomes[2].as_ref().unwrap().algorithm, Algorithm::Beam);
    }
}
