//! Optimistic estimators for pruning
//!
//! Every estimator bounds the score of all subsets `Z` with
//! `X ⊆ Z ⊆ X ∪ E`, where `E` is the extension a search may still add below
//! `X`. Writing `Q = X ∪ E`, the bounds use `F(Z) <= F(Q)` and `b0(Z) >= b0(W)`
//! for every `W ⊆ Z`.

use super::{Evaluation, EvaluationCache, ObjectiveFunction};
use crate::error::{DiscoveryError, Result};
use crate::lattice::SubsetKey;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Family of optimistic estimators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimisticEstimator {
    /// No bound; nothing is ever pruned
    None,
    /// `F(Q) - b0(X)`
    Mon,
    /// `max(score(X), F(Q) - min_a b0(X ∪ {a}))`
    #[default]
    Chain,
    /// Single-pass combination of all single and pairwise refinements
    Spc,
}

impl OptimisticEstimator {
    /// Upper bound on the score of every subset between `subset` and `subset ∪ extension`.
    ///
    /// `evaluation` must be the evaluation of `subset` itself.
    pub fn bound<O: ObjectiveFunction + ?Sized>(
        &self,
        cache: &mut EvaluationCache<'_, O>,
        subset: &SubsetKey,
        evaluation: &Evaluation,
        extension: &SubsetKey,
    ) -> f64 {
        if *self == OptimisticEstimator::None {
            return f64::INFINITY;
        }

        let extension = extension.difference(subset);
        // Supersets of a pure subset stay pure and cannot lose bias
        if evaluation.pure || extension.is_empty() {
            return evaluation.score;
        }

        let top = cache.evaluate(&subset.union(&extension)).information;
        match self {
            OptimisticEstimator::None => f64::INFINITY,
            OptimisticEstimator::Mon => top - evaluation.bias,
            OptimisticEstimator::Chain => {
                let min_bias = extension
                    .iter()
                    .map(|a| cache.evaluate(&subset.with(a)).bias)
                    .fold(f64::INFINITY, f64::min);
                evaluation.score.max(top - min_bias)
            }
            OptimisticEstimator::Spc => {
                let attrs = extension.indices();
                let mut best_child = f64::NEG_INFINITY;
                let mut min_pair_bias = f64::INFINITY;
                for (i, &a) in attrs.iter().enumerate() {
                    let child = subset.with(a);
                    best_child = best_child.max(cache.evaluate(&child).score);
                    for &b in &attrs[i + 1..] {
                        min_pair_bias = min_pair_bias.min(cache.evaluate(&child.with(b)).bias);
                    }
                }
                // With a single extension attribute only X and X ∪ {a} are reachable
                let deeper = if attrs.len() >= 2 {
                    top - min_pair_bias
                } else {
                    f64::NEG_INFINITY
                };
                evaluation.score.max(best_child).max(deeper)
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OptimisticEstimator::None => "NONE",
            OptimisticEstimator::Mon => "MON",
            OptimisticEstimator::Chain => "CHAIN",
            OptimisticEstimator::Spc => "SPC",
        }
    }
}

impl FromStr for OptimisticEstimator {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(OptimisticEstimator::None),
            "MON" => Ok(OptimisticEstimator::Mon),
            "CHAIN" => Ok(OptimisticEstimator::Chain),
            "SPC" => Ok(OptimisticEstimator::Spc),
            _ => Err(DiscoveryError::invalid_config(
                "estimator",
                s,
                "expected one of NONE, MON, CHAIN, SPC",
            )),
        }
    }
}
