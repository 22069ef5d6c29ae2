//! Dependency scoring
//!
//! This module provides:
//! - [`DependencyObjective`] - fraction of information and its reliable (bias-corrected) form
//! - [`EvaluationCache`] - memoized evaluations so each distinct subset is scored once
//! - [`OptimisticEstimator`] - admissible upper bounds for pruning (NONE, MON, CHAIN, SPC)
//!
//! Monotonicity: the plain fraction of information `F` and the permutation-model
//! bias `b0` both grow along subset inclusion. The reliable score `F - b0` does not,
//! and the estimators only rely on the monotonicity of its two parts.

mod estimator;
mod information;
mod partition;

pub use estimator::OptimisticEstimator;
pub use information::{entropy, InformationContext};
pub use partition::Partition;

use crate::data::DiscreteTable;
use crate::error::{DiscoveryError, Result};
use crate::lattice::SubsetKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Which dependency measure to maximize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectiveKind {
    /// `I(X;Y) / H(Y)`
    FractionOfInformation,
    /// `I(X;Y) / H(Y)` minus its expectation under the permutation model
    #[default]
    ReliableFractionOfInformation,
}

impl FromStr for ObjectiveKind {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "FI" | "FRACTION_OF_INFORMATION" => Ok(ObjectiveKind::FractionOfInformation),
            "RFI" | "RELIABLE_FRACTION_OF_INFORMATION" => {
                Ok(ObjectiveKind::ReliableFractionOfInformation)
            }
            _ => Err(DiscoveryError::invalid_config(
                "objective",
                s,
                "expected FI or RFI",
            )),
        }
    }
}

/// Score of one subset together with the parts the estimators need
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// `information - bias`
    pub score: f64,
    /// Fraction of information `F`, in `[0, 1]`
    pub information: f64,
    /// Expected fraction of information under permutation, zero for the plain measure
    pub bias: f64,
    /// Number of blocks of the induced partition
    pub blocks: usize,
    /// The subset determines the target exactly
    pub pure: bool,
}

/// Scores attribute subsets against a fixed target
pub trait ObjectiveFunction: Send + Sync {
    /// Evaluate one subset; the empty subset always scores 0
    fn evaluate(&self, subset: &SubsetKey) -> Evaluation;

    /// Number of rows the scores are computed over
    fn num_rows(&self) -> usize;

    /// Short name of the measure
    fn name(&self) -> &'static str;
}

/// Information-theoretic dependency measure over a discretized table
pub struct DependencyObjective<'a> {
    table: &'a DiscreteTable,
    target: usize,
    kind: ObjectiveKind,
    context: InformationContext,
}

impl<'a> DependencyObjective<'a> {
    pub fn new(table: &'a DiscreteTable, target: usize, kind: ObjectiveKind) -> Result<Self> {
        if target >= table.num_attributes() {
            return Err(DiscoveryError::TargetAttributeInvalid(format!(
                "index {} out of range for {} attributes",
                target,
                table.num_attributes()
            )));
        }
        let context = InformationContext::new(table.column(target), table.arity(target));
        Ok(Self {
            table,
            target,
            kind,
            context,
        })
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn kind(&self) -> ObjectiveKind {
        self.kind
    }

    pub fn context(&self) -> &InformationContext {
        &self.context
    }
}

impl ObjectiveFunction for DependencyObjective<'_> {
    fn evaluate(&self, subset: &SubsetKey) -> Evaluation {
        debug_assert!(!subset.contains(self.target), "subset holds the target");
        if subset.is_empty() {
            return Evaluation {
                score: 0.0,
                information: 0.0,
                bias: 0.0,
                blocks: 1,
                pure: self.context.target_entropy() <= 0.0,
            };
        }
        let partition = Partition::of_subset(self.table, subset);
        self.context.measure(&partition, self.kind)
    }

    fn num_rows(&self) -> usize {
        self.table.num_rows()
    }

    fn name(&self) -> &'static str {
        match self.kind {
            ObjectiveKind::FractionOfInformation => "fraction of information",
            ObjectiveKind::ReliableFractionOfInformation => "reliable fraction of information",
        }
    }
}

/// Memo of evaluations keyed by subset
pub struct EvaluationCache<'o, O: ObjectiveFunction + ?Sized> {
    objective: &'o O,
    memo: HashMap<SubsetKey, Evaluation>,
    evaluations: usize,
}

impl<'o, O: ObjectiveFunction + ?Sized> EvaluationCache<'o, O> {
    pub fn new(objective: &'o O) -> Self {
        Self {
            objective,
            memo: HashMap::new(),
            evaluations: 0,
        }
    }

    /// Evaluate a subset, computing it only the first time it is seen
    pub fn evaluate(&mut self, subset: &SubsetKey) -> Evaluation {
        if let Some(eval) = self.memo.get(subset) {
            return *eval;
        }
        let eval = self.objective.evaluate(subset);
        self.memo.insert(subset.clone(), eval);
        self.evaluations += 1;
        eval
    }

    /// Number of distinct subsets actually scored
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn objective(&self) -> &O {
        self.objective
    }
}
