//! Row partitions induced by attribute subsets

use crate::data::DiscreteTable;
use crate::lattice::SubsetKey;
use ndarray::ArrayView1;
use std::collections::HashMap;

/// Lookup tables up to this many slots are allocated densely
const DENSE_LOOKUP_LIMIT: usize = 1 << 16;

/// Assignment of every row to a block of equal values.
///
/// Block ids are numbered by the first row they occur in, so two
/// identical partitions always carry identical id vectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    ids: Vec<u32>,
    blocks: usize,
}

impl Partition {
    /// Single block holding every row (partition of the empty subset)
    pub fn trivial(n_rows: usize) -> Self {
        Self {
            ids: vec![0; n_rows],
            blocks: usize::from(n_rows > 0),
        }
    }

    /// Partition induced by one code column
    pub fn from_codes(codes: ArrayView1<'_, u32>, arity: usize) -> Self {
        Self::trivial(codes.len()).refine(codes, arity)
    }

    /// Partition induced by the joint values of `subset`
    pub fn of_subset(table: &DiscreteTable, subset: &SubsetKey) -> Self {
        subset
            .iter()
            .fold(Self::trivial(table.num_rows()), |partition, attr| {
                partition.refine(table.column(attr), table.arity(attr))
            })
    }

    /// Split every block by the codes of one more attribute
    pub fn refine(&self, codes: ArrayView1<'_, u32>, arity: usize) -> Self {
        let width = arity.max(1);
        let span = self.blocks * width;
        let mut ids = Vec::with_capacity(self.ids.len());
        let mut next = 0u32;

        if span <= DENSE_LOOKUP_LIMIT.max(4 * self.ids.len()) {
            let mut lookup = vec![u32::MAX; span];
            for (&block, &code) in self.ids.iter().zip(codes.iter()) {
                let slot = &mut lookup[block as usize * width + code as usize];
                if *slot == u32::MAX {
                    *slot = next;
                    next += 1;
                }
                ids.push(*slot);
            }
        } else {
            let mut lookup: HashMap<(u32, u32), u32> = HashMap::new();
            for (&block, &code) in self.ids.iter().zip(codes.iter()) {
                let id = *lookup.entry((block, code)).or_insert_with(|| {
                    next += 1;
                    next - 1
                });
                ids.push(id);
            }
        }

        Self {
            ids,
            blocks: next as usize,
        }
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks
    }

    pub fn num_rows(&self) -> usize {
        self.ids.len()
    }

    pub fn block_sizes(&self) -> Vec<u32> {
        let mut sizes = vec![0u32; self.blocks];
        for &id in &self.ids {
            sizes[id as usize] += 1;
        }
        sizes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_refine_first_occurrence_ids() {
        let p = Partition::from_codes(arr1(&[2u32, 0, 2, 1]).view(), 3);
        assert_eq!(p.ids(), &[0, 1, 0, 2]);
        assert_eq!(p.num_blocks(), 3);

        let q = p.refine(arr1(&[0u32, 0, 1, 0]).view(), 2);
        assert_eq!(q.ids(), &[0, 1, 2, 3]);
        assert_eq!(q.block_sizes(), vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_equal_partitions_identical() {
        // Relabelled codes induce the same partition
        let a = Partition::from_codes(arr1(&[1u32, 1, 0, 0, 1]).view(), 2);
        let b = Partition::from_codes(arr1(&[0u32, 0, 1, 1, 0]).view(), 2);
        assert_eq!(a, b);
    }

    #[test]
    fn test_subset_partition_order_independent() {
        let table = DiscreteTable::from_columns(
            "t",
            vec![("a", vec![0, 0, 1, 1]), ("b", vec![0, 1, 0, 1])],
        )
        .unwrap();
        let ab = Partition::of_subset(&table, &vec![0, 1].into());
        assert_eq!(ab.num_blocks(), 4);

        let empty = Partition::of_subset(&table, &SubsetKey::empty());
        assert_eq!(empty.num_blocks(), 1);
        assert_eq!(empty.block_sizes(), vec![4]);
    }
}
