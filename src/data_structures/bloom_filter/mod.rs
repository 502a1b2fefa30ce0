// Copyright (c) 2025 Ring Filter Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Bloom filter for cheap set-membership pre-checks.
//!
//! A space-efficient probabilistic data structure that answers "possibly
//! present" or "definitely absent" for arbitrary byte strings. It is meant to
//! sit in front of expensive exact lookups (disk reads, network calls, cache
//! misses) and turn most misses into a few memory probes.
//!
//! # Features
//!
//! - Sizing from expected element count and target false positive rate.
//! - Double hashing: two base hashes per input, any number of rounds.
//! - Thread-safe behind one read/write lock; concurrent tests never block
//!   each other.
//! - Merging of identically sized filters.
//! - Versioned, fixed byte order binary encoding.
//! - Optional recent-history layer ([`HistoryFilter`]) that ages entries out.
//!
//! # Example
//!
//! ```
//! use ring_filter_lib::data_structures::bloom_filter::{BloomFilter, BloomError};
//!
//! let filter = BloomFilter::new_by_size(1_000, 0.01)?;
//! filter.add(b"hello");
//!
//! assert!(filter.test(b"hello"));
//! assert!(!filter.test(b"world"));
//!
//! // Ship it somewhere else and keep going
//! let bytes = filter.marshal_binary()?;
//! let copy = BloomFilter::from_binary(&bytes)?;
//! assert!(copy.test(b"hello"));
//!
//! // Only identically sized filters merge
//! let other = BloomFilter::new_by_size(1_000, 0.01)?;
//! other.add(b"world");
//! copy.merge(&other)?;
//! assert!(copy.test(b"world"));
//! # Ok::<(), BloomError>(())
//! ```

mod codec;
mod error;
mod filter;
mod hash;
mod history;
mod params;

pub use codec::{FORMAT_VERSION, HEADER_LEN};
pub use error::{BloomError, Result};
pub use filter::BloomFilter;
pub use hash::{derive, FnvSeedHasher, SeedHasher};
pub use history::HistoryFilter;
pub use params::{FilterParams, MAX_HASH_ROUNDS};
