//! Top-k result collection

use crate::data::DiscreteTable;
use crate::lattice::SubsetKey;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

/// A discovered attribute subset and its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub subset: SubsetKey,
    pub score: f64,
}

impl Pattern {
    /// Number of attributes in the pattern
    pub fn depth(&self) -> usize {
        self.subset.len()
    }

    /// Human-readable form such as `{age, income} -> risk (0.4213)`
    pub fn describe(&self, table: &DiscreteTable, target: usize) -> String {
        let name = |i: usize| {
            table
                .attribute(i)
                .map_or_else(|| format!("#{}", i), |a| a.name.clone())
        };
        let names: Vec<String> = self.subset.iter().map(name).collect();
        format!("{{{}}} -> {} ({:.4})", names.join(", "), name(target), self.score)
    }
}

/// Ranking wrapper: higher score first, then the canonical subset order
#[derive(Debug, Clone)]
struct Ranked(Pattern);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .score
            .total_cmp(&self.0.score)
            .then_with(|| self.0.subset.cmp(&other.0.subset))
    }
}

/// Keeps the `k` best distinct patterns seen so far
#[derive(Debug, Clone)]
pub struct ResultCollector {
    capacity: usize,
    ranked: BTreeSet<Ranked>,
    members: HashSet<SubsetKey>,
}

impl ResultCollector {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ranked: BTreeSet::new(),
            members: HashSet::new(),
        }
    }

    /// Offer a candidate; returns whether it entered the result set.
    ///
    /// The empty subset and subsets already present are rejected.
    pub fn offer(&mut self, subset: &SubsetKey, score: f64) -> bool {
        if subset.is_empty() || self.capacity == 0 || self.members.contains(subset) {
            return false;
        }

        let candidate = Ranked(Pattern {
            subset: subset.clone(),
            score,
        });
        if self.is_full() {
            match self.ranked.last() {
                Some(worst) if candidate < *worst => {}
                _ => return false,
            }
            if let Some(evicted) = self.ranked.pop_last() {
                self.members.remove(&evicted.0.subset);
            }
        }

        self.members.insert(subset.clone());
        self.ranked.insert(candidate);
        true
    }

    /// Score a candidate must beat once the set is full, `-inf` before
    pub fn threshold(&self) -> f64 {
        if self.is_full() {
            self.ranked.last().map_or(f64::NEG_INFINITY, |r| r.0.score)
        } else {
            f64::NEG_INFINITY
        }
    }

    pub fn is_full(&self) -> bool {
        self.ranked.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, subset: &SubsetKey) -> bool {
        self.members.contains(subset)
    }

    pub fn best(&self) -> Option<&Pattern> {
        self.ranked.first().map(|r| &r.0)
    }

    /// Patterns, best first
    pub fn patterns(&self) -> Vec<Pattern> {
        self.ranked.iter().map(|r| r.0.clone()).collect()
    }

    pub fn into_patterns(self) -> Vec<Pattern> {
        self.ranked.into_iter().map(|r| r.0).collect()
    }
}
