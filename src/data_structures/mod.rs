//! Data structures for the Ring Filter library.
//!
//! The filter store lives here together with its hashing, sizing and
//! encoding helpers. Implementations contain no unsafe code.

pub mod bloom_filter;

// Re-export common data structures
pub use bloom_filter::{BloomError, BloomFilter, FilterParams, HistoryFilter};
