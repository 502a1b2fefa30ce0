// Copyright (c) 2025 Ring Filter Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Main implementation of the Bloom filter store.

use std::fmt;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::data_structures::bloom_filter::codec;
use crate::data_structures::bloom_filter::error::{BloomError, Result};
use crate::data_structures::bloom_filter::hash::{indices, FnvSeedHasher, SeedHasher};
use crate::data_structures::bloom_filter::params::FilterParams;

/// Everything guarded by the filter's lock.
#[derive(Clone)]
pub(crate) struct FilterState {
    pub(crate) params: FilterParams,
    /// Packed bits, `params.byte_len()` bytes, LSB-first within a byte
    pub(crate) bits: Vec<u8>,
}

impl FilterState {
    fn zeroed(params: FilterParams) -> Result<Self> {
        let len = params.byte_len();
        let mut bits = Vec::new();
        bits.try_reserve_exact(len).map_err(|err| {
            warn!(%params, bytes = len, error = %err, "Bloom filter allocation failed");
            BloomError::InvalidParameters(format!(
                "cannot allocate {len} bytes for {params}: {err}"
            ))
        })?;
        bits.resize(len, 0);
        Ok(Self { params, bits })
    }

    fn set(&mut self, h1: u64, h2: u64) {
        let params = self.params;
        for index in indices(h1, h2, params.hash_rounds(), params.bit_count()) {
            self.bits[(index / 8) as usize] |= 1 << (index % 8);
        }
    }

    fn contains(&self, h1: u64, h2: u64) -> bool {
        let params = self.params;
        indices(h1, h2, params.hash_rounds(), params.bit_count())
            .all(|index| self.bits[(index / 8) as usize] & (1 << (index % 8)) != 0)
    }

    fn set_bits(&self) -> u64 {
        self.bits.iter().map(|byte| u64::from(byte.count_ones())).sum()
    }

    fn union_with(&mut self, other: &FilterState) -> Result<()> {
        if self.params != other.params {
            warn!(
                expected = %self.params,
                found = %other.params,
                "Rejected merge of incompatible bloom filters"
            );
            return Err(BloomError::IncompatibleParameters {
                expected: self.params,
                found: other.params,
            });
        }
        for (dst, src) in self.bits.iter_mut().zip(&other.bits) {
            *dst |= *src;
        }
        Ok(())
    }
}

/// A thread-safe Bloom filter over byte strings.
///
/// All state sits behind a single read/write lock: `add`, `reset`, `merge`
/// and `unmarshal_binary` take it exclusively, `test` and `marshal_binary`
/// share it. Bit positions come from a [`SeedHasher`], [`FnvSeedHasher`]
/// unless another one is supplied.
///
/// # Examples
///
/// ```
/// use ring_filter_lib::data_structures::bloom_filter::BloomFilter;
///
/// // Support up to 100 elements with less than 1% false positives
/// let filter = BloomFilter::new_by_size(100, 0.01).unwrap();
///
/// filter.add(b"hello");
/// assert!(filter.test(b"hello"));
///
/// filter.reset();
/// assert!(!filter.test(b"hello"));
/// ```
pub struct BloomFilter<H: SeedHasher = FnvSeedHasher> {
    state: RwLock<FilterState>,
    hasher: H,
}

impl BloomFilter {
    /// Create a filter sized for `elements` insertions at the given target
    /// false positive rate.
    ///
    /// # Errors
    ///
    /// [`BloomError::InvalidParameters`] if `elements` is zero, the rate is
    /// not strictly between 0 and 1, or the bit buffer cannot be allocated.
    pub fn new_by_size(elements: u64, false_positive_rate: f64) -> Result<Self> {
        let params = FilterParams::for_capacity(elements, false_positive_rate)?;
        debug!(elements, false_positive_rate, %params, "Sized bloom filter");
        Self::with_hasher(params, FnvSeedHasher)
    }

    /// Create a filter from an explicit bit count and hash round count.
    ///
    /// # Errors
    ///
    /// [`BloomError::InvalidParameters`] if `bit_count` is zero, `hash_rounds`
    /// is above [`MAX_HASH_ROUNDS`](super::MAX_HASH_ROUNDS), or the bit buffer
    /// cannot be allocated.
    pub fn new_by_parameters(bit_count: u64, hash_rounds: u64) -> Result<Self> {
        let params = FilterParams::new(bit_count, hash_rounds)?;
        Self::with_hasher(params, FnvSeedHasher)
    }

    /// Decode a filter previously produced by [`BloomFilter::marshal_binary`].
    pub fn from_binary(data: &[u8]) -> Result<Self> {
        Self::from_binary_with_hasher(data, FnvSeedHasher)
    }
}

impl<H: SeedHasher> BloomFilter<H> {
    /// Create an empty filter with the given parameters and seed hasher.
    ///
    /// Fails with [`BloomError::InvalidParameters`] when the bit buffer
    /// cannot be allocated.
    pub fn with_hasher(params: FilterParams, hasher: H) -> Result<Self> {
        let state = FilterState::zeroed(params)?;
        debug!(%params, bytes = params.byte_len(), "Created bloom filter");
        Ok(Self {
            state: RwLock::new(state),
            hasher,
        })
    }

    /// Decode a filter that was encoded with the same seed hasher.
    pub fn from_binary_with_hasher(data: &[u8], hasher: H) -> Result<Self> {
        let state = decode_logged(data)?;
        Ok(Self {
            state: RwLock::new(state),
            hasher,
        })
    }

    /// Add `data` to the filter.
    pub fn add(&self, data: &[u8]) {
        let (h1, h2) = self.hasher.seed_hash(data);
        self.add_seeds(h1, h2);
    }

    /// Returns `true` if `data` may have been added, `false` if it definitely
    /// was not.
    pub fn test(&self, data: &[u8]) -> bool {
        let (h1, h2) = self.hasher.seed_hash(data);
        self.test_seeds(h1, h2)
    }

    pub(crate) fn seeds(&self, data: &[u8]) -> (u64, u64) {
        self.hasher.seed_hash(data)
    }

    pub(crate) fn add_seeds(&self, h1: u64, h2: u64) {
        self.state.write().set(h1, h2);
    }

    pub(crate) fn test_seeds(&self, h1: u64, h2: u64) -> bool {
        self.state.read().contains(h1, h2)
    }

    /// Clear every bit. Nothing added before the reset tests positive after it.
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.bits.fill(0);
        debug!(params = %state.params, "Reset bloom filter");
    }

    /// OR the bits of `other` into this filter.
    ///
    /// Afterwards everything that tested positive in either filter tests
    /// positive in `self`. `other` is read-locked for the duration, so it
    /// is merged as of a single consistent point in time.
    ///
    /// # Errors
    ///
    /// [`BloomError::IncompatibleParameters`] if the bit counts or hash round
    /// counts differ. `self` is left unchanged.
    pub fn merge(&self, other: &Self) -> Result<()> {
        if std::ptr::eq(self, other) {
            return Ok(());
        }

        // Lock in address order so opposite merges cannot deadlock.
        let merged = if (self as *const Self) < (other as *const Self) {
            let mut target = self.state.write();
            let source = other.state.read();
            target.union_with(&source)?;
            target.params
        } else {
            let source = other.state.read();
            let mut target = self.state.write();
            target.union_with(&source)?;
            target.params
        };

        debug!(params = %merged, "Merged bloom filters");
        Ok(())
    }

    /// Encode the filter as a version byte, the two parameters and the raw
    /// bit buffer.
    ///
    /// This never fails for a constructed filter.
    pub fn marshal_binary(&self) -> Result<Vec<u8>> {
        let state = self.state.read();
        Ok(codec::encode(&state.params, &state.bits))
    }

    /// Replace this filter's parameters and bits with decoded `data`.
    ///
    /// The input is fully validated before anything is replaced; on error
    /// the filter keeps its previous contents.
    pub fn unmarshal_binary(&self, data: &[u8]) -> Result<()> {
        let decoded = decode_logged(data)?;
        *self.state.write() = decoded;
        Ok(())
    }

    /// The filter's current parameters.
    pub fn params(&self) -> FilterParams {
        self.state.read().params
    }

    /// Number of addressable bits.
    pub fn bit_count(&self) -> u64 {
        self.params().bit_count()
    }

    /// Number of hash rounds per operation.
    pub fn hash_rounds(&self) -> u64 {
        self.params().hash_rounds()
    }

    /// Size of the bit buffer in bytes.
    pub fn size_bytes(&self) -> usize {
        self.params().byte_len()
    }

    /// Fraction of bits currently set, between 0.0 and 1.0.
    pub fn fill_ratio(&self) -> f64 {
        let state = self.state.read();
        state.set_bits() as f64 / state.params.bit_count() as f64
    }

    /// Estimate how many distinct items have been added.
    ///
    /// Uses `-(m/k) * ln(1 - X/m)` where `X` is the number of set bits.
    /// Returns infinity once every bit is set, and 0 for a filter with no
    /// hash rounds.
    pub fn estimated_count(&self) -> f64 {
        let state = self.state.read();
        let m = state.params.bit_count() as f64;
        let k = state.params.hash_rounds() as f64;
        if k == 0.0 {
            return 0.0;
        }
        let x = state.set_bits() as f64;
        if x >= m {
            return f64::INFINITY;
        }
        -(m / k) * (1.0 - x / m).ln()
    }
}

fn decode_logged(data: &[u8]) -> Result<FilterState> {
    match codec::decode(data) {
        Ok(state) => {
            debug!(params = %state.params, "Decoded bloom filter");
            Ok(state)
        }
        Err(err) => {
            warn!(error = %err, len = data.len(), "Rejected bloom filter data");
            Err(err)
        }
    }
}

impl<H: SeedHasher + Clone> Clone for BloomFilter<H> {
    fn clone(&self) -> Self {
        Self {
            state: RwLock::new(self.state.read().clone()),
            hasher: self.hasher.clone(),
        }
    }
}

impl<H: SeedHasher> fmt::Debug for BloomFilter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.params();
        f.debug_struct("BloomFilter")
            .field("bit_count", &params.bit_count())
            .field("hash_rounds", &params.hash_rounds())
            .finish_non_exhaustive()
    }
}
