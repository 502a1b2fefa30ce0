//! Filter configuration module.
//!
//! This module defines how the filter built by the application is sized, and
//! whether a recent-history ring is layered on top of it.

use super::{ConfigResult, Validate};
use crate::data_structures::bloom_filter::{self, BloomFilter, HistoryFilter};
use crate::error::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Bloom filter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterConfig {
    /// Number of distinct elements the filter is sized for
    pub expected_elements: u64,

    /// Target false positive rate at `expected_elements` (0.0 to 1.0 exclusive)
    pub false_positive_rate: f64,

    /// Number of recent additions to remember (0 disables the history ring)
    pub history_size: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            expected_elements: 1_000_000,
            false_positive_rate: 0.001,
            history_size: 0,
        }
    }
}

impl Validate for FilterConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.expected_elements == 0 {
            return Err(ConfigError::ValidationError(
                "expected_elements must be greater than 0".to_string(),
            ));
        }

        if !(self.false_positive_rate > 0.0 && self.false_positive_rate < 1.0) {
            return Err(ConfigError::ValidationError(
                "false_positive_rate must be between 0.0 and 1.0 exclusive".to_string(),
            ));
        }

        Ok(())
    }
}

impl FilterConfig {
    /// Whether a history ring should wrap the filter.
    pub fn uses_history(&self) -> bool {
        self.history_size > 0
    }

    /// Build a plain filter with these settings.
    pub fn build_filter(&self) -> bloom_filter::Result<BloomFilter> {
        BloomFilter::new_by_size(self.expected_elements, self.false_positive_rate)
    }

    /// Build a filter with a history ring of `history_size` entries.
    ///
    /// Fails with `InvalidParameters` when `history_size` is 0.
    pub fn build_history_filter(&self) -> bloom_filter::Result<HistoryFilter> {
        HistoryFilter::new(
            self.expected_elements,
            self.false_positive_rate,
            self.history_size,
        )
    }
}
