//! Binary min-heap keyed by priority
//!
//! Entries live in a contiguous `Vec` and the implicit tree is addressed by
//! index arithmetic: the children of `i` are `2i + 1` and `2i + 2`, the
//! parent is `(i - 1) / 2`.
//!
//! Ordering among entries with equal priority is unspecified. The heap is
//! not insertion-stable, so two `info` events may come out in either order.

use crate::types::Priority;

/// Min-heap of `(priority, item)` pairs, lowest priority value first
#[derive(Debug, Clone)]
pub struct PriorityHeap<T> {
    entries: Vec<(Priority, T)>,
}

impl<T> Default for PriorityHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PriorityHeap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert an item; O(log n)
    pub fn insert(&mut self, priority: Priority, item: T) {
        self.entries.push((priority, item));
        self.sift_up(self.entries.len() - 1);
    }

    /// The most urgent item without removing it; O(1)
    pub fn peek(&self) -> Option<&T> {
        self.entries.first().map(|(_, item)| item)
    }

    /// Priority of the most urgent item
    pub fn peek_priority(&self) -> Option<Priority> {
        self.entries.first().map(|(p, _)| *p)
    }

    /// Remove and return the most urgent item; O(log n)
    ///
    /// Returns `None` on an empty heap without touching state.
    pub fn extract_min(&mut self) -> Option<T> {
        if self.entries.is_empty() {
            return None;
        }

        let (_, root) = self.entries.swap_remove(0);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some(root)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every pending entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Pending entries in storage order (not priority order)
    pub fn iter(&self) -> impl Iterator<Item = (Priority, &T)> {
        self.entries.iter().map(|(p, item)| (*p, item))
    }

    /// Extract up to `limit` items in priority order
    pub fn drain_sorted(&mut self, limit: usize) -> Vec<T> {
        let mut out = Vec::with_capacity(limit.min(self.entries.len()));
        while out.len() < limit {
            match self.extract_min() {
                Some(item) => out.push(item),
                None => break,
            }
        }
        out
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.entries[index].0 < self.entries[parent].0 {
                self.entries.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;

            if left < len && self.entries[left].0 < self.entries[smallest].0 {
                smallest = left;
            }
            if right < len && self.entries[right].0 < self.entries[smallest].0 {
                smallest = right;
            }

            if smallest == index {
                break;
            }
            self.entries.swap(index, smallest);
            index = smallest;
        }
    }

    #[cfg(test)]
    fn holds_heap_property(&self) -> bool {
        (1..self.entries.len()).all(|i| self.entries[i].0 >= self.entries[(i - 1) / 2].0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(n: u8) -> Priority {
        Priority::new(n).unwrap()
    }

    /// Deterministic pseudo-random priorities in 1..=5
    fn priorities(seed: u64, n: usize) -> Vec<u8> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((state >> 33) % 5) as u8 + 1
            })
            .collect()
    }

    #[test]
    fn test_extract_in_priority_order() {
        let mut heap = PriorityHeap::new();
        heap.insert(p(3), "warning");
        heap.insert(p(1), "critical");
        heap.insert(p(2), "error");

        assert_eq!(heap.extract_min(), Some("critical"));
        assert_eq!(heap.extract_min(), Some("error"));
        assert_eq!(heap.extract_min(), Some("warning"));
        assert_eq!(heap.extract_min(), None);
    }

    #[test]
    fn test_empty_heap() {
        let mut heap: PriorityHeap<u32> = PriorityHeap::new();
        assert!(heap.is_empty());
        assert!(heap.peek().is_none());
        assert!(heap.extract_min().is_none());
        assert_eq!(heap.len(), 0);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_peek_does_not_mutate() {
        let mut heap = PriorityHeap::new();
        heap.insert(p(4), 10);
        heap.insert(p(2), 20);

        assert_eq!(heap.peek(), Some(&20));
        assert_eq!(heap.peek_priority(), Some(p(2)));
        assert_eq!(heap.len(), 2);
        assert_eq!(heap.peek(), Some(&20));
    }

    #[test]
    fn test_size_after_inserts_and_extracts() {
        let mut heap = PriorityHeap::new();
        for (i, prio) in priorities(7, 40).into_iter().enumerate() {
            heap.insert(p(prio), i);
        }
        for _ in 0..15 {
            heap.extract_min();
        }
        assert_eq!(heap.len(), 25);
    }

    #[test]
    fn test_heap_property_after_every_operation() {
        let mut heap = PriorityHeap::new();
        let prios = priorities(42, 200);

        for (i, prio) in prios.iter().enumerate() {
            heap.insert(p(*prio), i);
            assert!(heap.holds_heap_property());
            if i % 3 == 0 {
                heap.extract_min();
                assert!(heap.holds_heap_property());
            }
        }
    }

    #[test]
    fn test_extract_always_returns_global_minimum() {
        let mut heap = PriorityHeap::new();
        let prios = priorities(99, 300);
        for prio in &prios {
            heap.insert(p(*prio), *prio);
        }

        let mut last = 0u8;
        while let Some(prio) = heap.extract_min() {
            let remaining_min = heap.iter().map(|(p, _)| p.get()).min().unwrap_or(5);
            assert!(prio >= last);
            assert!(prio <= remaining_min);
            last = prio;
        }
    }

    #[test]
    fn test_many_ties() {
        let mut heap = PriorityHeap::new();
        for i in 0..100 {
            heap.insert(p(4), i);
        }
        heap.insert(p(1), 1000);

        assert_eq!(heap.extract_min(), Some(1000));
        let mut seen: Vec<i32> = heap.drain_sorted(usize::MAX);
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_drain_sorted_respects_limit() {
        let mut heap = PriorityHeap::with_capacity(8);
        for prio in [5, 3, 1, 4, 2] {
            heap.insert(p(prio), prio);
        }

        assert_eq!(heap.drain_sorted(3), vec![1, 2, 3]);
        assert_eq!(heap.len(), 2);
        heap.clear();
        assert!(heap.is_empty());
    }
}
