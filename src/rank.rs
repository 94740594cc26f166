use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassRecord {
    pub class_name: String,
    pub method_count: usize,
}

impl ClassRecord {
    pub fn new(class_name: impl Into<String>, method_count: usize) -> Self {
        Self {
            class_name: class_name.into(),
            method_count,
        }
    }
}

impl fmt::Display for ClassRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.class_name, self.method_count)
    }
}

#[derive(Debug)]
struct Ranked {
    method_count: usize,
    seq: u64,
    record: ClassRecord,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.method_count == other.method_count && self.seq == other.seq
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    // Among equal counts the later offer ranks higher, matching a stable
    // ascending sort of everything offered.
    fn cmp(&self, other: &Self) -> Ordering {
        self.method_count
            .cmp(&other.method_count)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Keeps the `capacity` records with the highest method counts.
///
/// A min-heap bounded at `capacity`: every offer beyond the bound evicts the
/// current minimum, so the heap always holds the top records seen so far.
#[derive(Debug)]
pub struct TopK {
    capacity: usize,
    heap: BinaryHeap<Reverse<Ranked>>,
    next_seq: u64,
}

impl TopK {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.saturating_add(1)),
            next_seq: 0,
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

    pub fn offer(&mut self, record: ClassRecord) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Ranked {
            method_count: record.method_count,
            seq,
            record,
        }));
        if self.heap.len() > self.capacity {
            self.heap.pop();
        }
    }

    pub fn into_ascending(self) -> Vec<ClassRecord> {
        let mut records = self.into_descending();
        records.reverse();
        records
    }

    pub fn into_descending(self) -> Vec<ClassRecord> {
        // Sorting `Reverse` ascending yields the inner records descending.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(ranked)| ranked.record)
            .collect()
    }
}
