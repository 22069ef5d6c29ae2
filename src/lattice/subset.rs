//! Canonical attribute-subset keys

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

const WORD_BITS: usize = 64;

/// Set of attribute indices backed by a trimmed bitset.
///
/// Trailing zero words are always removed, so two keys holding the same
/// indices compare and hash equal regardless of how they were built.
/// The [`Ord`] implementation is the canonical pattern order: fewer
/// attributes first, then lexicographic order of the ascending indices.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<usize>", into = "Vec<usize>")]
pub struct SubsetKey {
    words: Vec<u64>,
}

impl SubsetKey {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn singleton(index: usize) -> Self {
        let mut key = Self::empty();
        key.insert(index);
        key
    }

    /// All indices in `0..n`
    pub fn full(n: usize) -> Self {
        (0..n).collect()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / WORD_BITS)
            .map_or(false, |w| w & (1u64 << (index % WORD_BITS)) != 0)
    }

    pub fn insert(&mut self, index: usize) {
        let word = index / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (index % WORD_BITS);
    }

    pub fn remove(&mut self, index: usize) {
        if let Some(w) = self.words.get_mut(index / WORD_BITS) {
            *w &= !(1u64 << (index % WORD_BITS));
            self.trim();
        }
    }

    /// Copy of this key with one more index
    pub fn with(&self, index: usize) -> Self {
        let mut key = self.clone();
        key.insert(index);
        key
    }

    /// Copy of this key with one index removed
    pub fn without(&self, index: usize) -> Self {
        let mut key = self.clone();
        key.remove(index);
        key
    }

    pub fn union(&self, other: &Self) -> Self {
        let (long, short) = if self.words.len() >= other.words.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut words = long.words.clone();
        for (w, o) in words.iter_mut().zip(&short.words) {
            *w |= o;
        }
        Self { words }
    }

    pub fn difference(&self, other: &Self) -> Self {
        let mut words = self.words.clone();
        for (w, o) in words.iter_mut().zip(&other.words) {
            *w &= !o;
        }
        let mut key = Self { words };
        key.trim();
        key
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let mut key = Self {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a & b)
                .collect(),
        };
        key.trim();
        key
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.words.iter().enumerate().all(|(i, w)| {
            let o = other.words.get(i).copied().unwrap_or(0);
            w & !o == 0
        })
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(i * WORD_BITS + bit)
            })
        })
    }

    pub fn indices(&self) -> Vec<usize> {
        self.iter().collect()
    }

    /// Largest index, if any
    pub fn last(&self) -> Option<usize> {
        self.words.last().map(|&w| {
            (self.words.len() - 1) * WORD_BITS + (WORD_BITS - 1 - w.leading_zeros() as usize)
        })
    }

    fn trim(&mut self) {
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
    }
}

impl Ord for SubsetKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.len()
            .cmp(&other.len())
            .then_with(|| self.iter().cmp(other.iter()))
    }
}

impl PartialOrd for SubsetKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromIterator<usize> for SubsetKey {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut key = Self::empty();
        for index in iter {
            key.insert(index);
        }
        key
    }
}

impl From<Vec<usize>> for SubsetKey {
    fn from(indices: Vec<usize>) -> Self {
        indices.into_iter().collect()
    }
}

impl From<SubsetKey> for Vec<usize> {
    fn from(key: SubsetKey) -> Self {
        key.indices()
    }
}

impl fmt::Debug for SubsetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for SubsetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, index) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", index)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_canonical_equality() {
        let a: SubsetKey = vec![3, 70, 1].into();
        let b: SubsetKey = vec![70, 1, 3].into();
        assert_eq!(a, b);

        // Removing the high index must shrink the storage back
        let c = a.without(70);
        let d: SubsetKey = vec![1, 3].into();
        assert_eq!(c, d);

        let mut set = HashSet::new();
        set.insert(c);
        assert!(set.contains(&d));
    }

    #[test]
    fn test_set_operations() {
        let a: SubsetKey = vec![0, 2, 4].into();
        let b: SubsetKey = vec![2, 3].into();

        assert_eq!(a.union(&b).indices(), vec![0, 2, 3, 4]);
        assert_eq!(a.difference(&b).indices(), vec![0, 4]);
        assert_eq!(a.intersection(&b).indices(), vec![2]);
        assert!(SubsetKey::singleton(2).is_subset_of(&a));
        assert!(!b.is_subset_of(&a));
        assert_eq!(a.len(), 3);
        assert_eq!(a.last(), Some(4));
        assert!(SubsetKey::empty().is_empty());
        assert_eq!(SubsetKey::full(3).indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_canonical_order() {
        let mut keys: Vec<SubsetKey> = vec![
            vec![1, 2].into(),
            vec![3].into(),
            vec![0, 5].into(),
            vec![0].into(),
        ];
        keys.sort();
        let sorted: Vec<Vec<usize>> = keys.iter().map(|k| k.indices()).collect();
        assert_eq!(sorted, vec![vec![0], vec![3], vec![0, 5], vec![1, 2]]);
    }

    #[test]
    fn test_serialization() {
        let key: SubsetKey = vec![4, 1].into();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "[1,4]");
        let back: SubsetKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert_eq!(key.to_string(), "{1, 4}");
    }
}
