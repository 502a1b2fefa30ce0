// Copyright (c) 2025 Ring Filter Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Sizing parameters for the Bloom filter.

use std::f64::consts::LN_2;
use std::fmt;

use super::error::{BloomError, Result};

/// Upper bound on hash rounds per operation.
///
/// Sizing from any representable rate stays far below this; it bounds the
/// work a single `add` or `test` does while holding the filter lock.
pub const MAX_HASH_ROUNDS: u64 = 4096;

/// The two numbers that fully determine a filter's layout.
///
/// Two filters can be merged only if their parameters are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterParams {
    /// Number of addressable bits
    bit_count: u64,

    /// Number of derived indices computed per add or test
    hash_rounds: u64,
}

impl FilterParams {
    /// Create parameters from an explicit bit count and hash round count.
    ///
    /// A `hash_rounds` of zero is accepted and yields a filter that reports
    /// every input as present. More than [`MAX_HASH_ROUNDS`] is rejected.
    pub fn new(bit_count: u64, hash_rounds: u64) -> Result<Self> {
        if bit_count == 0 {
            return Err(BloomError::InvalidParameters(
                "bit count must be greater than 0".to_string(),
            ));
        }
        if hash_rounds > MAX_HASH_ROUNDS {
            return Err(BloomError::InvalidParameters(format!(
                "hash rounds {hash_rounds} exceeds the maximum of {MAX_HASH_ROUNDS}"
            )));
        }
        let params = Self {
            bit_count,
            hash_rounds,
        };
        // The buffer length must fit in an isize. Whether it can actually be
        // allocated is only known when the filter is built.
        params.checked_byte_len().ok_or_else(|| {
            BloomError::InvalidParameters(format!(
                "bit count {bit_count} does not fit in memory on this platform"
            ))
        })?;
        Ok(params)
    }

    /// Calculate parameters for a given capacity and false positive rate.
    ///
    /// This uses the formulas:
    /// - m = ceil(-n*ln(p)/(ln(2)^2))
    /// - k = ceil((m/n)*ln(2))
    ///
    /// where n is the expected number of elements and p the target false
    /// positive probability.
    pub fn for_capacity(elements: u64, false_positive_rate: f64) -> Result<Self> {
        if elements == 0 {
            return Err(BloomError::InvalidParameters(
                "expected elements must be greater than 0".to_string(),
            ));
        }
        // Written so that NaN fails the check.
        if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
            return Err(BloomError::InvalidParameters(format!(
                "false positive rate must be between 0.0 and 1.0 exclusive, got {false_positive_rate}"
            )));
        }

        let n = elements as f64;
        let m = -n * false_positive_rate.ln() / (LN_2 * LN_2);
        if !m.is_finite() || m >= u64::MAX as f64 {
            return Err(BloomError::InvalidParameters(format!(
                "{elements} elements at rate {false_positive_rate} needs more than {} bits",
                u64::MAX
            )));
        }

        let bit_count = (m.ceil() as u64).max(1);
        let hash_rounds = ((bit_count as f64 / n) * LN_2).ceil().max(1.0) as u64;
        Self::new(bit_count, hash_rounds)
    }

    /// Number of addressable bits.
    pub fn bit_count(&self) -> u64 {
        self.bit_count
    }

    /// Number of hash rounds per operation.
    pub fn hash_rounds(&self) -> u64 {
        self.hash_rounds
    }

    /// Length of the packed bit buffer in bytes, `ceil(bit_count / 8)`.
    pub fn byte_len(&self) -> usize {
        // Checked at construction.
        self.checked_byte_len().unwrap_or(usize::MAX)
    }

    pub(crate) fn checked_byte_len(&self) -> Option<usize> {
        usize::try_from(self.bit_count.div_ceil(8))
            .ok()
            .filter(|&len| isize::try_from(len).is_ok())
    }
}

impl fmt::Display for FilterParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bits={} rounds={}", self.bit_count, self.hash_rounds)
    }
}
