// Copyright (c) 2025 Ring Filter Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Hashing utilities for the Bloom filter.
//!
//! Every input is hashed exactly twice, into a pair of 64-bit seeds. Any
//! number of bit positions are then derived from that pair with the
//! Kirsch–Mitzenmacher construction `h1 + i*h2`, which behaves like `k`
//! independent hash functions at the cost of two.

use std::hash::Hasher;

use fnv::FnvHasher;

/// Offset basis of the standard 64-bit FNV-1a hash.
const FNV_OFFSET_PRIMARY: u64 = 0xcbf2_9ce4_8422_2325;

/// Second offset basis so that the two seeds start from different states.
const FNV_OFFSET_SECONDARY: u64 = 0x8422_2325_cbf2_9ce4;

/// A source of the two base hashes used to index the filter.
///
/// Implementations must be deterministic across processes and platforms:
/// encoded filters and merges rely on every instance agreeing on the
/// positions for a given input.
pub trait SeedHasher: Send + Sync {
    /// Compute the seed pair `(h1, h2)` for `data`.
    fn seed_hash(&self, data: &[u8]) -> (u64, u64);
}

impl<F> SeedHasher for F
where
    F: Fn(&[u8]) -> (u64, u64) + Send + Sync,
{
    fn seed_hash(&self, data: &[u8]) -> (u64, u64) {
        self(data)
    }
}

/// The default seed hasher: two differently keyed FNV-1a passes, each
/// finished with a 64-bit avalanche step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FnvSeedHasher;

impl FnvSeedHasher {
    /// Create a new instance of the FNV seed hasher.
    pub fn new() -> Self {
        Self
    }
}

impl SeedHasher for FnvSeedHasher {
    fn seed_hash(&self, data: &[u8]) -> (u64, u64) {
        let h1 = fmix64(fnv1a(FNV_OFFSET_PRIMARY, data));
        // Odd step keeps the round sequence from stalling on even bit counts.
        let h2 = fmix64(fnv1a(FNV_OFFSET_SECONDARY, data)) | 1;
        (h1, h2)
    }
}

fn fnv1a(key: u64, data: &[u8]) -> u64 {
    let mut hasher = FnvHasher::with_key(key);
    hasher.write(data);
    hasher.finish()
}

/// MurmurHash3 64-bit finalizer.
fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

/// Derive the hash for `round` from a seed pair: `h1 + round*h2`, wrapping.
#[inline]
pub fn derive(h1: u64, h2: u64, round: u64) -> u64 {
    h1.wrapping_add(round.wrapping_mul(h2))
}

/// Iterate the `rounds` bit indices in `[0, bit_count)` for a seed pair.
#[inline]
pub(crate) fn indices(h1: u64, h2: u64, rounds: u64, bit_count: u64) -> impl Iterator<Item = u64> {
    (0..rounds).map(move |round| derive(h1, h2, round) % bit_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_hash_stability() {
        let hasher = FnvSeedHasher::new();
        let first_run = hasher.seed_hash(b"stable_hash_test");
        let second_run = FnvSeedHasher.seed_hash(b"stable_hash_test");

        assert_eq!(first_run, second_run);
    }

    #[test]
    fn test_seed_halves_differ() {
        let (h1, h2) = FnvSeedHasher.seed_hash(b"hello");
        assert_ne!(h1, h2);
        assert_eq!(h2 & 1, 1);
    }

    #[test]
    fn test_different_inputs_produce_different_seeds() {
        let hasher = FnvSeedHasher::new();
        assert_ne!(hasher.seed_hash(b"input1"), hasher.seed_hash(b"input2"));
        assert_ne!(hasher.seed_hash(b""), hasher.seed_hash(b"\0"));
    }

    #[test]
    fn test_derive_is_linear() {
        assert_eq!(derive(10, 3, 0), 10);
        assert_eq!(derive(10, 3, 4), 22);
        assert_eq!(derive(u64::MAX, 2, 1), 1);
    }

    #[test]
    fn test_indices_in_range() {
        let (h1, h2) = FnvSeedHasher.seed_hash(b"test_string");
        let positions: Vec<u64> = indices(h1, h2, 10, 1021).collect();

        assert_eq!(positions.len(), 10);
        assert!(positions.iter().all(|&index| index < 1021));

        // Should have some diversity in the positions
        let unique = positions.iter().collect::<HashSet<_>>();
        assert!(unique.len() >= 5);
    }

    #[test]
    fn test_zero_rounds_yield_nothing() {
        assert_eq!(indices(1, 2, 0, 64).count(), 0);
    }

    #[test]
    fn test_low_bits_spread() {
        // Sequential keys should land evenly across a small table.
        let mut buckets = [0u32; 16];
        for i in 0..16_000u32 {
            let (h1, _) = FnvSeedHasher.seed_hash(i.to_string().as_bytes());
            buckets[(h1 % 16) as usize] += 1;
        }
        assert!(buckets.iter().all(|&count| (800..1200).contains(&count)));
    }

    #[test]
    fn test_closure_seam() {
        let fixed = |_: &[u8]| (7u64, 1u64);
        assert_eq!(fixed.seed_hash(b"anything"), (7, 1));
        let positions: Vec<u64> = indices(7, 1, 3, 8).collect();
        assert_eq!(positions, vec![7, 0, 1]);
    }
}
