//! Frontier containers shared by every search strategy

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

/// A search state waiting to be expanded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontierEntry {
    /// Index into the search's state arena
    pub state: usize,
    pub priority: f64,
}

/// Core trait for the open set of a search.
///
/// Each implementation fixes the expansion order; the search loop itself is
/// shared.
pub trait Frontier {
    fn push(&mut self, entry: FrontierEntry);

    fn pop(&mut self) -> Option<FrontierEntry>;

    /// Priority of the entry `pop` would return next
    fn peek_priority(&self) -> Option<f64>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Type-erased frontier chosen at run time
pub type BoxedFrontier = Box<dyn Frontier>;

/// First in, first out
#[derive(Debug, Default)]
pub struct FifoFrontier {
    queue: VecDeque<FrontierEntry>,
}

impl Frontier for FifoFrontier {
    fn push(&mut self, entry: FrontierEntry) {
        self.queue.push_back(entry);
    }

    fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    fn peek_priority(&self) -> Option<f64> {
        self.queue.front().map(|entry| entry.priority)
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Last in, first out
#[derive(Debug, Default)]
pub struct LifoFrontier {
    stack: Vec<FrontierEntry>,
}

impl Frontier for LifoFrontier {
    fn push(&mut self, entry: FrontierEntry) {
        self.stack.push(entry);
    }

    fn pop(&mut self) -> Option<FrontierEntry> {
        self.stack.pop()
    }

    fn peek_priority(&self) -> Option<f64> {
        self.stack.last().map(|entry| entry.priority)
    }

    fn len(&self) -> usize {
        self.stack.len()
    }
}

#[derive(Debug)]
struct Ranked {
    priority: f64,
    sequence: u64,
    state: usize,
}

// Reversed so the max-heap yields the lowest priority, earliest push first
impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

/// Minimum priority first; equal priorities pop in insertion order
#[derive(Debug, Default)]
pub struct PriorityFrontier {
    heap: BinaryHeap<Ranked>,
    next_sequence: u64,
}

impl Frontier for PriorityFrontier {
    fn push(&mut self, entry: FrontierEntry) {
        self.heap.push(Ranked {
            priority: entry.priority,
            sequence: self.next_sequence,
            state: entry.state,
        });
        self.next_sequence += 1;
    }

    fn pop(&mut self) -> Option<FrontierEntry> {
        self.heap.pop().map(|ranked| FrontierEntry {
            state: ranked.state,
            priority: ranked.priority,
        })
    }

    fn peek_priority(&self) -> Option<f64> {
        self.heap.peek().map(|ranked| ranked.priority)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(frontier: &mut dyn Frontier) -> Vec<usize> {
        std::iter::from_fn(|| frontier.pop())
            .map(|entry| entry.state)
            .collect()
    }

    fn fill(frontier: &mut dyn Frontier, priorities: &[f64]) {
        for (state, &priority) in priorities.iter().enumerate() {
            frontier.push(FrontierEntry { state, priority });
        }
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = FifoFrontier::default();
        fill(&mut frontier, &[3.0, 1.0, 2.0]);
        assert_eq!(frontier.len(), 3);
        assert_eq!(frontier.peek_priority(), Some(3.0));
        assert_eq!(drain(&mut frontier), vec![0, 1, 2]);
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_lifo_order() {
        let mut frontier = LifoFrontier::default();
        fill(&mut frontier, &[3.0, 1.0, 2.0]);
        assert_eq!(frontier.peek_priority(), Some(2.0));
        assert_eq!(drain(&mut frontier), vec![2, 1, 0]);
    }

    #[test]
    fn test_priority_order_with_stable_ties() {
        let mut frontier = PriorityFrontier::default();
        fill(&mut frontier, &[5.0, 1.0, 3.0, 1.0, 0.5, 3.0]);
        assert_eq!(frontier.peek_priority(), Some(0.5));
        assert_eq!(drain(&mut frontier), vec![4, 1, 3, 2, 5, 0]);
        assert_eq!(frontier.pop(), None);
        assert_eq!(frontier.peek_priority(), None);
    }

    #[test]
    fn test_priority_interleaved_push_pop() {
        let mut frontier: BoxedFrontier = Box::new(PriorityFrontier::default());
        frontier.push(FrontierEntry { state: 0, priority: 4.0 });
        frontier.push(FrontierEntry { state: 1, priority: 2.0 });
        assert_eq!(frontier.pop().map(|e| e.state), Some(1));

        frontier.push(FrontierEntry { state: 2, priority: 4.0 });
        frontier.push(FrontierEntry { state: 3, priority: 1.0 });
        assert_eq!(drain(frontier.as_mut()), vec![3, 0, 2]);
    }
}
