//! Open-node structure of the branch-and-bound search
//!
//! Priority-ordered for the breadth- and best-first orders, a stack for
//! depth-first traversal.

use super::config::TraverseOrder;
use crate::lattice::SearchNode;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A node queued with the key its traverse order ranks it by
#[derive(Debug, Clone)]
struct QueuedNode {
    /// Rank shallower nodes first
    breadth_first: bool,
    depth: usize,
    /// Bound or score, higher pops first
    priority: f64,
    /// Insertion number, earlier pops first among equals
    sequence: u64,
    node: SearchNode,
}

impl PartialEq for QueuedNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedNode {}

impl PartialOrd for QueuedNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the greatest item
        let by_depth = if self.breadth_first {
            other.depth.cmp(&self.depth)
        } else {
            Ordering::Equal
        };
        by_depth
            .then_with(|| self.priority.total_cmp(&other.priority))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Open nodes ordered by a [`TraverseOrder`]
pub struct OpenSet {
    order: TraverseOrder,
    heap: BinaryHeap<QueuedNode>,
    stack: Vec<SearchNode>,
    sequence_counter: u64,
    peak: usize,
}

impl OpenSet {
    pub fn new(order: TraverseOrder) -> Self {
        Self {
            order,
            heap: BinaryHeap::new(),
            stack: Vec::new(),
            sequence_counter: 0,
            peak: 0,
        }
    }

    pub fn push(&mut self, node: SearchNode) {
        let (breadth_first, priority) = match self.order {
            TraverseOrder::DepthFirst => {
                self.stack.push(node);
                self.peak = self.peak.max(self.len());
                return;
            }
            TraverseOrder::BreadthFirstPotential => (true, node.bound),
            TraverseOrder::BreadthFirstValue => (true, node.score),
            TraverseOrder::BestFirstPotential => (false, node.bound),
            TraverseOrder::BestFirstValue => (false, node.score),
        };

        self.heap.push(QueuedNode {
            breadth_first,
            depth: node.depth,
            priority,
            sequence: self.sequence_counter,
            node,
        });
        self.sequence_counter = self.sequence_counter.wrapping_add(1);
        self.peak = self.peak.max(self.len());
    }

    pub fn pop(&mut self) -> Option<SearchNode> {
        match self.order {
            TraverseOrder::DepthFirst => self.stack.pop(),
            _ => self.heap.pop().map(|queued| queued.node),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len() + self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest size reached so far
    pub fn peak(&self) -> usize {
        self.peak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::SubsetKey;

    fn node(attr: usize, depth: usize, score: f64, bound: f64) -> SearchNode {
        SearchNode {
            subset: SubsetKey::singleton(attr),
            available: SubsetKey::empty(),
            score,
            bound,
            depth,
            blocks: 1,
        }
    }

    fn drain(mut open: OpenSet) -> Vec<usize> {
        std::iter::from_fn(|| open.pop())
            .map(|n| n.subset.indices()[0])
            .collect()
    }

    fn filled(order: TraverseOrder) -> OpenSet {
        let mut open = OpenSet::new(order);
        open.push(node(0, 2, 0.9, 0.95));
        open.push(node(1, 1, 0.1, 0.5));
        open.push(node(2, 1, 0.3, 0.4));
        open.push(node(3, 2, 0.2, 0.99));
        open
    }

    #[test]
    fn test_breadth_first_orders() {
        assert_eq!(drain(filled(TraverseOrder::BreadthFirstPotential)), vec![1, 2, 3, 0]);
        assert_eq!(drain(filled(TraverseOrder::BreadthFirstValue)), vec![2, 1, 0, 3]);
    }

    #[test]
    fn test_best_first_orders() {
        assert_eq!(drain(filled(TraverseOrder::BestFirstPotential)), vec![3, 0, 1, 2]);
        assert_eq!(drain(filled(TraverseOrder::BestFirstValue)), vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_depth_first_is_lifo() {
        let open = filled(TraverseOrder::DepthFirst);
        assert_eq!(open.peak(), 4);
        assert_eq!(drain(open), vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_ties_pop_in_insertion_order() {
        let mut open = OpenSet::new(TraverseOrder::BestFirstPotential);
        open.push(node(5, 1, 0.0, 0.5));
        open.push(node(4, 1, 0.0, 0.5));
        assert_eq!(drain(open), vec![5, 4]);
    }
}
