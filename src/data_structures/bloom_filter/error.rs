// Copyright (c) 2025 Ring Filter Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Error types for the Bloom filter.

use super::params::FilterParams;

/// Errors that can occur in Bloom filter operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum BloomError {
    /// Constructor arguments cannot describe a usable filter
    #[error("Invalid filter parameters: {0}")]
    InvalidParameters(String),

    /// Merge between filters with different sizing
    #[error("Incompatible filter parameters: expected {expected}, found {found}")]
    IncompatibleParameters {
        /// Parameters of the filter being merged into
        expected: FilterParams,
        /// Parameters of the filter being merged from
        found: FilterParams,
    },

    /// Encoded input is shorter than the fixed header
    #[error("Truncated filter data: need at least {expected} bytes, got {actual}")]
    TruncatedData {
        /// Minimum number of bytes required
        expected: usize,
        /// Number of bytes supplied
        actual: usize,
    },

    /// Encoded input carries a version tag this build does not understand
    #[error("Unsupported filter format version {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version tag found in the input
        found: u8,
        /// The only version tag this build reads and writes
        supported: u8,
    },

    /// Encoded header and payload disagree
    #[error("Corrupt filter data: {0}")]
    CorruptData(String),
}

/// Result type for Bloom filter operations
pub type Result<T> = std::result::Result<T, BloomError>;
