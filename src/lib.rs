//! Ring Filter Library
//!
//! This library contains a thread-safe Bloom filter and the configuration
//! and error plumbing around it. The `ring-filter` binary is a thin
//! command-line demo over this crate; downstream services depend on the
//! library directly.
//!
//! # Architecture
//!
//! - [`data_structures::bloom_filter`]: the filter store, its seed hasher,
//!   sizing math, binary codec and the optional recent-history ring.
//! - [`config`]: file and environment backed settings for building filters
//!   and configuring logging.
//! - [`error`]: application-level error type wrapping everything above.

// Re-export public modules
pub mod config;
pub mod data_structures;
pub mod error;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;

pub use data_structures::bloom_filter::{BloomError, BloomFilter, FilterParams, HistoryFilter};

/// Version information for the Ring Filter library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
