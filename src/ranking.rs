//! # Top-K by recency
//! Fixed-capacity structure that keeps the `K` newest records out of a stream
//! of unknown length and arbitrary order.
//!
//! Memory is `O(K)` no matter how many records pass through. The oldest kept
//! record sits at the root of a min-heap, so the "is this newer than what we'd
//! evict?" test is `O(1)` and a replacement is `O(log K)`.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use chrono::{DateTime, Utc};

use crate::model::Record;

/// Heap entry ordered by `published_at` only.
#[derive(Debug)]
struct ByRecency(Record);

impl PartialEq for ByRecency {
    fn eq(&self, other: &Self) -> bool {
        self.0.published_at == other.0.published_at
    }
}

impl Eq for ByRecency {}

impl PartialOrd for ByRecency {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByRecency {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.published_at.cmp(&other.0.published_at)
    }
}

/// Keeps at most `capacity` records, evicting the globally oldest one when a
/// strictly newer record arrives at capacity.
#[derive(Debug)]
pub struct TopK {
    heap: BinaryHeap<Reverse<ByRecency>>,
    capacity: usize,
}

impl TopK {
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Timestamp of the oldest record currently kept.
    pub fn oldest(&self) -> Option<DateTime<Utc>> {
        self.heap.peek().map(|Reverse(e)| e.0.published_at)
    }

    /// Offer a record. Returns `true` if it was kept.
    ///
    /// Ties with the current minimum are discarded: records already present win.
    pub fn insert(&mut self, record: Record) -> bool {
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(ByRecency(record)));
            return true;
        }

        match self.heap.peek_mut() {
            Some(mut min) if record.published_at > min.0 .0.published_at => {
                // PeekMut re-sifts on drop.
                *min = Reverse(ByRecency(record));
                true
            }
            _ => false,
        }
    }

    /// Consume the structure and return its records newest-first.
    pub fn drain(self) -> Vec<Record> {
        // Ascending over `Reverse` is descending by `published_at`.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(e)| e.0)
            .collect()
    }
}
