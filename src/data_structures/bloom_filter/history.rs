// Copyright (c) 2025 Ring Filter Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Recent-history layer on top of the Bloom filter.
//!
//! A [`HistoryFilter`] remembers the primary seed hash of the last `N`
//! additions in a circular buffer. `test` then only reports an item when the
//! filter bits agree *and* the item is among those recent additions, so
//! entries age out as newer ones arrive.

use parking_lot::RwLock;
use tracing::debug;

use super::error::{BloomError, Result};
use super::filter::BloomFilter;
use super::hash::{FnvSeedHasher, SeedHasher};

/// Fixed-capacity FIFO of seed hashes.
#[derive(Debug, Clone)]
struct History {
    capacity: usize,
    /// Grows to `capacity`, then overwritten in place
    slots: Vec<u64>,
    /// Next slot to overwrite once full
    cursor: usize,
}

impl History {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: Vec::with_capacity(capacity),
            cursor: 0,
        }
    }

    fn push(&mut self, key: u64) {
        if self.slots.len() < self.capacity {
            self.slots.push(key);
        } else {
            self.slots[self.cursor] = key;
        }
        self.cursor = (self.cursor + 1) % self.capacity;
    }

    /// Scan newest to oldest.
    fn contains(&self, key: u64) -> bool {
        let (left, right) = self.slots.split_at(self.cursor.min(self.slots.len()));
        newer_first(left, right).any(|&slot| slot == key)
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.cursor = 0;
    }
}

/// `left` is the slots before the cursor, `right` the rest. The newest entry
/// sits just left of the cursor; before the buffer wraps `right` is empty.
fn newer_first<'a>(left: &'a [u64], right: &'a [u64]) -> impl Iterator<Item = &'a u64> {
    left.iter().rev().chain(right.iter().rev())
}

/// A Bloom filter that only reports items among its last `capacity`
/// additions.
///
/// # Examples
///
/// ```
/// use ring_filter_lib::data_structures::bloom_filter::HistoryFilter;
///
/// let filter = HistoryFilter::new(1_000, 0.01, 2).unwrap();
/// filter.add(b"first");
/// filter.add(b"second");
/// filter.add(b"third");
///
/// assert!(!filter.test(b"first"));
/// assert!(filter.test(b"second"));
/// assert!(filter.test(b"third"));
/// ```
#[derive(Debug)]
pub struct HistoryFilter<H: SeedHasher = FnvSeedHasher> {
    filter: BloomFilter<H>,
    history: RwLock<History>,
}

impl HistoryFilter {
    /// Create a filter sized for `elements` that remembers the last
    /// `history_size` additions.
    pub fn new(elements: u64, false_positive_rate: f64, history_size: usize) -> Result<Self> {
        let filter = BloomFilter::new_by_size(elements, false_positive_rate)?;
        Self::from_filter(filter, history_size)
    }
}

impl<H: SeedHasher> HistoryFilter<H> {
    /// Layer a history of `history_size` entries on an existing filter.
    ///
    /// Items already present in `filter` are not in the history and will
    /// test negative until added again.
    pub fn from_filter(filter: BloomFilter<H>, history_size: usize) -> Result<Self> {
        if history_size == 0 {
            return Err(BloomError::InvalidParameters(
                "history size must be greater than 0".to_string(),
            ));
        }
        debug!(history_size, params = %filter.params(), "Created history filter");
        Ok(Self {
            filter,
            history: RwLock::new(History::new(history_size)),
        })
    }

    /// Add `data` to the filter and record it as the newest history entry.
    pub fn add(&self, data: &[u8]) {
        let (h1, h2) = self.filter.seeds(data);
        let mut history = self.history.write();
        self.filter.add_seeds(h1, h2);
        history.push(h1);
    }

    /// Returns `true` if `data` passes the filter and is among the most
    /// recent additions.
    pub fn test(&self, data: &[u8]) -> bool {
        let (h1, h2) = self.filter.seeds(data);
        let history = self.history.read();
        self.filter.test_seeds(h1, h2) && history.contains(h1)
    }

    /// Clear both the filter and the history.
    pub fn reset(&self) {
        let mut history = self.history.write();
        self.filter.reset();
        history.clear();
    }

    /// Maximum number of remembered additions.
    pub fn capacity(&self) -> usize {
        self.history.read().capacity
    }

    /// Number of remembered additions, at most [`capacity`](Self::capacity).
    pub fn len(&self) -> usize {
        self.history.read().slots.len()
    }

    /// Whether nothing has been added since creation or the last reset.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The underlying Bloom filter.
    pub fn filter(&self) -> &BloomFilter<H> {
        &self.filter
    }
}
