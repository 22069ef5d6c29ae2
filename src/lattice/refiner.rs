//! Child generation over the subset lattice

use super::{SearchNode, SubsetKey};
use crate::data::DiscreteTable;
use crate::error::{DiscoveryError, Result};
use crate::scoring::{Evaluation, EvaluationCache, ObjectiveFunction};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// How refinement operators propagate from a node to its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefinementPropagation {
    /// Every attribute not yet in the subset; the same child may be generated repeatedly
    All,
    /// Each subset is generated from a single parent
    #[default]
    NonRedundant,
}

impl FromStr for RefinementPropagation {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ALL" => Ok(RefinementPropagation::All),
            "NON_REDUNDANT" | "NONREDUNDANT" => Ok(RefinementPropagation::NonRedundant),
            _ => Err(DiscoveryError::invalid_config(
                "propagation",
                s,
                "expected ALL or NON_REDUNDANT",
            )),
        }
    }
}

/// Which attribute combinations form legal patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LanguageOption {
    /// Every combination is legal
    #[default]
    All,
    /// Attributes with a distinct value on every row are never used
    ExcludeKeys,
    /// No attribute of a pattern may be determined by the others
    Minimal,
}

impl FromStr for LanguageOption {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ALL" => Ok(LanguageOption::All),
            "EXCLUDE_KEYS" | "NOKEYS" => Ok(LanguageOption::ExcludeKeys),
            "MINIMAL" => Ok(LanguageOption::Minimal),
            _ => Err(DiscoveryError::invalid_config(
                "language",
                s,
                "expected ALL, EXCLUDE_KEYS or MINIMAL",
            )),
        }
    }
}

/// One generated child
#[derive(Debug, Clone)]
pub struct Refinement {
    /// Attribute added to the parent
    pub attribute: usize,
    pub subset: SubsetKey,
    /// False when the language forbids the added attribute
    pub legal: bool,
}

/// Lazy, single-pass sequence of the children of one node
pub struct Refinements<'a> {
    refiner: &'a LatticeRefiner,
    parent: &'a SubsetKey,
    operators: std::vec::IntoIter<usize>,
}

impl Iterator for Refinements<'_> {
    type Item = Refinement;

    fn next(&mut self) -> Option<Refinement> {
        let attribute = self.operators.next()?;
        Some(Refinement {
            attribute,
            subset: self.parent.with(attribute),
            legal: self.refiner.legal.contains(attribute),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.operators.size_hint()
    }
}

/// Generates children of lattice nodes; the target is never an operator
#[derive(Debug, Clone)]
pub struct LatticeRefiner {
    target: usize,
    universe: SubsetKey,
    legal: SubsetKey,
    language: LanguageOption,
    propagation: RefinementPropagation,
}

impl LatticeRefiner {
    pub fn new(
        table: &DiscreteTable,
        target: usize,
        language: LanguageOption,
        propagation: RefinementPropagation,
    ) -> Self {
        let universe: SubsetKey = (0..table.num_attributes()).filter(|&a| a != target).collect();
        let legal = match language {
            LanguageOption::ExcludeKeys => universe.iter().filter(|&a| !table.is_key(a)).collect(),
            LanguageOption::All | LanguageOption::Minimal => universe.clone(),
        };

        Self {
            target,
            universe,
            legal,
            language,
            propagation,
        }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Every non-target attribute
    pub fn universe(&self) -> &SubsetKey {
        &self.universe
    }

    /// Attributes the language allows individually
    pub fn legal_attributes(&self) -> &SubsetKey {
        &self.legal
    }

    pub fn propagation(&self) -> RefinementPropagation {
        self.propagation
    }

    pub fn language(&self) -> LanguageOption {
        self.language
    }

    /// Attributes `node` can be refined with under the propagation policy
    pub fn operators(&self, node: &SearchNode) -> SubsetKey {
        match self.propagation {
            RefinementPropagation::All => self.universe.difference(&node.subset),
            RefinementPropagation::NonRedundant => node.available.difference(&node.subset),
        }
    }

    /// Children of `node`, one per operator, in ascending attribute order
    pub fn refine<'a>(&'a self, node: &'a SearchNode) -> Refinements<'a> {
        Refinements {
            refiner: self,
            parent: &node.subset,
            operators: self.operators(node).indices().into_iter(),
        }
    }

    /// Legal attributes that may still be added to `subset` anywhere in the lattice
    pub fn extension(&self, subset: &SubsetKey) -> SubsetKey {
        self.legal.difference(subset)
    }

    /// Lexicographic operators of the child `parent ∪ {added}`
    pub fn lexicographic_operators(&self, parent_available: &SubsetKey, added: usize) -> SubsetKey {
        parent_available
            .intersection(&self.legal)
            .iter()
            .filter(|&b| b > added)
            .collect()
    }

    /// Whether `parent` is the canonical parent of `child` within `frontier`:
    /// no other parent in the frontier adds a lower attribute.
    pub fn is_canonical(&self, child: &SubsetKey, added: usize, frontier: &HashSet<SubsetKey>) -> bool {
        child
            .iter()
            .take_while(|&b| b < added)
            .all(|b| !frontier.contains(&child.without(b)))
    }

    /// Language check that needs the child's evaluation.
    ///
    /// Under [`LanguageOption::Minimal`] every attribute must split some block of the
    /// partition of the remaining attributes. Minimality is closed under subsets, so a
    /// rejected child can be dropped with its whole subtree.
    pub fn admits<O: ObjectiveFunction + ?Sized>(
        &self,
        cache: &mut EvaluationCache<'_, O>,
        child: &SubsetKey,
        evaluation: &Evaluation,
    ) -> bool {
        match self.language {
            LanguageOption::All | LanguageOption::ExcludeKeys => true,
            LanguageOption::Minimal => child
                .iter()
                .all(|a| cache.evaluate(&child.without(a)).blocks < evaluation.blocks),
        }
    }

    /// Whether the language allows `subset` as a pattern
    pub fn is_legal<O: ObjectiveFunction + ?Sized>(
        &self,
        cache: &mut EvaluationCache<'_, O>,
        subset: &SubsetKey,
    ) -> bool {
        if !subset.is_subset_of(&self.legal) {
            return false;
        }
        let evaluation = cache.evaluate(subset);
        self.admits(cache, subset, &evaluation)
    }
}
