//! Column binning

use crate::error::{DiscoveryError, Result};
use crate::scoring::{InformationContext, ObjectiveKind, Partition};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Gain below this is treated as no improvement when selecting cut points
const MIN_GAIN: f64 = 1e-12;

/// Strategy for turning one column into dense codes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BinningStrategy {
    /// Equal-frequency bins
    EqualFrequency { num_bins: usize },
    /// Greedy target-aware selection among equal-frequency candidate cuts
    CandidateCutPoints {
        max_bins: usize,
        cut_point_multiplier: usize,
    },
    /// Every distinct value is its own code
    PassThrough,
}

/// Codes of one binned column
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedColumn {
    pub codes: Vec<u32>,
    pub arity: usize,
    /// Upper-inclusive cut points, `None` for pass-through columns
    pub cut_points: Option<Vec<f64>>,
}

/// Column binner
#[derive(Debug, Clone)]
pub struct Binner {
    strategy: BinningStrategy,
}

impl Binner {
    pub fn new(strategy: BinningStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> &BinningStrategy {
        &self.strategy
    }

    /// Bin a column. `target` is required by the target-aware strategy.
    pub fn fit_transform(
        &self,
        values: ArrayView1<'_, f64>,
        target: Option<&InformationContext>,
    ) -> Result<BinnedColumn> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(f64::total_cmp);

        let cuts = match &self.strategy {
            BinningStrategy::PassThrough => return Ok(pass_through(values, &sorted)),
            BinningStrategy::EqualFrequency { num_bins } => {
                equal_frequency_cut_points(&sorted, *num_bins)
            }
            BinningStrategy::CandidateCutPoints {
                max_bins,
                cut_point_multiplier,
            } => {
                let context = target.ok_or_else(|| {
                    DiscoveryError::DataError(
                        "candidate cut points need a discretized target".to_string(),
                    )
                })?;
                let num_candidates = max_bins.checked_mul(*cut_point_multiplier).ok_or_else(|| {
                    DiscoveryError::invalid_config(
                        "cut_point_multiplier",
                        cut_point_multiplier,
                        "candidate count max_bins * cut_point_multiplier overflows",
                    )
                })?;
                let candidates = equal_frequency_cut_points(&sorted, num_candidates);
                select_cut_points(values, &candidates, *max_bins, context)
            }
        };

        let (codes, arity) = apply_cut_points(values, &cuts);
        Ok(BinnedColumn {
            codes,
            arity,
            cut_points: Some(cuts),
        })
    }
}

/// Cut points at ranks `floor(i * n / num_bins)`; each cut is the last value of its bin.
///
/// Equal values never straddle a cut, so duplicates merge neighbouring bins.
pub fn equal_frequency_cut_points(sorted: &[f64], num_bins: usize) -> Vec<f64> {
    let n = sorted.len();
    let mut cuts: Vec<f64> = Vec::new();
    if n == 0 || num_bins <= 1 {
        return cuts;
    }
    // Beyond one bin per value the ranks repeat
    let num_bins = num_bins.min(n);

    let max = sorted[n - 1];
    for i in 1..num_bins {
        let rank = i * n / num_bins;
        if rank == 0 {
            continue;
        }
        let cut = sorted[rank - 1];
        if cut < max && cuts.last().map_or(true, |&last| last < cut) {
            cuts.push(cut);
        }
    }
    cuts
}

/// Bin of `value` given ascending upper-inclusive cut points
pub fn find_bin(value: f64, cuts: &[f64]) -> usize {
    cuts.partition_point(|&c| c < value)
}

/// Codes for every row; missing values get the code after the last bin
pub fn apply_cut_points(values: ArrayView1<'_, f64>, cuts: &[f64]) -> (Vec<u32>, usize) {
    let missing = cuts.len() + 1;
    let mut has_missing = false;
    let codes = values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                has_missing = true;
                missing as u32
            } else {
                find_bin(v, cuts) as u32
            }
        })
        .collect();
    (codes, missing + usize::from(has_missing))
}

fn pass_through(values: ArrayView1<'_, f64>, sorted: &[f64]) -> BinnedColumn {
    let mut distinct = sorted.to_vec();
    distinct.dedup();

    let missing = distinct.len();
    let mut has_missing = false;
    let codes = values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                has_missing = true;
                missing as u32
            } else {
                // present by construction
                distinct.partition_point(|&d| d < v) as u32
            }
        })
        .collect();

    BinnedColumn {
        codes,
        arity: missing + usize::from(has_missing),
        cut_points: None,
    }
}

/// Greedily add the candidate cut that most improves the reliable score against the target
fn select_cut_points(
    values: ArrayView1<'_, f64>,
    candidates: &[f64],
    max_bins: usize,
    context: &InformationContext,
) -> Vec<f64> {
    let score = |cuts: &[f64]| {
        let (codes, arity) = apply_cut_points(values, cuts);
        let partition = Partition::from_codes(ArrayView1::from(&codes[..]), arity);
        context
            .measure(&partition, ObjectiveKind::ReliableFractionOfInformation)
            .score
    };

    let mut chosen: Vec<f64> = Vec::new();
    let mut current = score(&chosen);

    while chosen.len() + 1 < max_bins {
        let mut round_best: Option<(f64, usize)> = None;
        for (i, &cut) in candidates.iter().enumerate() {
            if chosen.contains(&cut) {
                continue;
            }
            let mut trial = chosen.clone();
            let pos = trial.partition_point(|&c| c < cut);
            trial.insert(pos, cut);
            let s = score(&trial);
            if round_best.map_or(true, |(best, _)| s > best) {
                round_best = Some((s, i));
            }
        }

        match round_best {
            Some((s, i)) if s > current + MIN_GAIN => {
                let cut = candidates[i];
                let pos = chosen.partition_point(|&c| c < cut);
                chosen.insert(pos, cut);
                current = s;
            }
            _ => break,
        }
    }
    chosen
}
