// Copyright (c) 2025 Ring Filter Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Integration tests for the Bloom filter public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use test_case::test_case;

use ring_filter_lib::data_structures::bloom_filter::{
    BloomError, BloomFilter, FORMAT_VERSION, HEADER_LEN, MAX_HASH_ROUNDS,
};

// Constants for testing
const ELEMENTS: u64 = 1_000_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;
const THREAD_COUNT: usize = 8;
const ITEMS_PER_THREAD: usize = 1_000;

fn random_keys(seed: u64) -> impl Iterator<Item = [u8; 16]> {
    let mut rng = StdRng::seed_from_u64(seed);
    std::iter::repeat_with(move || {
        let mut key = [0u8; 16];
        rng.fill_bytes(&mut key);
        key
    })
}

#[test]
fn test_false_positive_rate() {
    let filter = BloomFilter::new_by_size(ELEMENTS, FALSE_POSITIVE_RATE).unwrap();

    for key in random_keys(1).take(ELEMENTS as usize) {
        filter.add(&key);
    }

    // A different seed gives strings that were never added
    let false_positives = random_keys(2)
        .take(ELEMENTS as usize)
        .filter(|key| filter.test(key))
        .count();
    let observed_rate = false_positives as f64 / ELEMENTS as f64;

    println!(
        "False positive test - Actual: {observed_rate:.6} ({false_positives}/{ELEMENTS}) - Target: {FALSE_POSITIVE_RATE}"
    );

    // Hundreds expected; allow 2x for statistical variation
    assert!(
        observed_rate < FALSE_POSITIVE_RATE * 2.0,
        "False positive rate too high: {observed_rate}"
    );
}

#[test]
fn test_no_false_negatives_for_inserted_keys() {
    let filter = BloomFilter::new_by_size(10_000, 0.01).unwrap();
    for key in random_keys(3).take(10_000) {
        filter.add(&key);
        assert!(filter.test(&key));
    }
    for key in random_keys(3).take(10_000) {
        assert!(filter.test(&key));
    }
}

#[test_case(100, 1.0 ; "rate of one")]
#[test_case(100, 0.0 ; "rate of zero")]
#[test_case(0, 0.1 ; "zero elements")]
#[test_case(100, -1.0 ; "negative rate")]
fn test_bad_parameters(elements: u64, rate: f64) {
    assert!(matches!(
        BloomFilter::new_by_size(elements, rate),
        Err(BloomError::InvalidParameters(_))
    ));
}

#[test]
fn test_bad_explicit_parameters() {
    assert!(matches!(
        BloomFilter::new_by_parameters(0, 4),
        Err(BloomError::InvalidParameters(_))
    ));
    assert!(BloomFilter::new_by_parameters(1, 0).is_ok());
    assert!(matches!(
        BloomFilter::new_by_parameters(64, MAX_HASH_ROUNDS + 1),
        Err(BloomError::InvalidParameters(_))
    ));
    assert!(matches!(
        BloomFilter::new_by_parameters(u64::MAX, 1),
        Err(BloomError::InvalidParameters(_))
    ));
}

#[test]
fn test_reset() {
    let filter = BloomFilter::new_by_size(10_000, 0.01).unwrap();
    for i in 0..10_000u32 {
        filter.add(i.to_string().as_bytes());
    }

    filter.reset();
    filter.reset();

    // ensure all data was removed
    for i in 0..10_000u32 {
        assert!(!filter.test(i.to_string().as_bytes()));
    }
}

#[test]
fn test_merge() {
    let a = BloomFilter::new_by_size(1_000, 0.01).unwrap();
    let b = BloomFilter::new_by_size(1_000, 0.01).unwrap();
    for i in 0..500u32 {
        a.add(format!("a{i}").as_bytes());
        b.add(format!("b{i}").as_bytes());
    }

    a.merge(&b).unwrap();

    for i in 0..500u32 {
        assert!(a.test(format!("a{i}").as_bytes()));
        assert!(a.test(format!("b{i}").as_bytes()));
    }
}

#[test]
fn test_merge_rejects_different_sizing() {
    let base = BloomFilter::new_by_size(1_000, 0.01).unwrap();
    let other_rate = BloomFilter::new_by_size(1_000, 0.05).unwrap();
    let other_elements = BloomFilter::new_by_size(5_000, 0.01).unwrap();

    for other in [&other_rate, &other_elements] {
        match base.merge(other) {
            Err(BloomError::IncompatibleParameters { expected, found }) => {
                assert_eq!(expected, base.params());
                assert_eq!(found, other.params());
            }
            result => panic!("expected IncompatibleParameters, got {result:?}"),
        }
    }
}

#[test]
fn test_marshal_round_trip_in_place() {
    let source = BloomFilter::new_by_size(1_000, 0.01).unwrap();
    for i in 0..1_000u32 {
        source.add(&i.to_le_bytes());
    }
    let expected: Vec<bool> = (0..5_000u32).map(|i| source.test(&i.to_le_bytes())).collect();

    // Decode into a filter of a completely different shape
    let target = BloomFilter::new_by_parameters(8, 1).unwrap();
    target.unmarshal_binary(&source.marshal_binary().unwrap()).unwrap();

    assert_eq!(target.params(), source.params());
    let actual: Vec<bool> = (0..5_000u32).map(|i| target.test(&i.to_le_bytes())).collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_corrupt_input() {
    let filter = BloomFilter::new_by_size(100, 0.01).unwrap();
    filter.add(b"hello");
    let encoded = filter.marshal_binary().unwrap();
    assert_eq!(encoded[0], FORMAT_VERSION);

    assert!(matches!(
        filter.unmarshal_binary(&[]),
        Err(BloomError::TruncatedData { .. })
    ));
    assert!(matches!(
        filter.unmarshal_binary(&[FORMAT_VERSION]),
        Err(BloomError::TruncatedData { .. })
    ));

    let mut flipped = encoded.clone();
    flipped[0] ^= 0xff;
    assert!(matches!(
        filter.unmarshal_binary(&flipped),
        Err(BloomError::UnsupportedVersion { .. })
    ));

    let short = &encoded[..encoded.len() - 1];
    assert!(matches!(
        BloomFilter::from_binary(short),
        Err(BloomError::CorruptData(_))
    ));
    assert!(matches!(
        BloomFilter::from_binary(&encoded[..HEADER_LEN]),
        Err(BloomError::CorruptData(_))
    ));

    // A header demanding endless hash rounds
    let mut endless = vec![FORMAT_VERSION];
    endless.extend_from_slice(&8u64.to_be_bytes());
    endless.extend_from_slice(&u64::MAX.to_be_bytes());
    endless.push(0xff);
    assert!(matches!(
        filter.unmarshal_binary(&endless),
        Err(BloomError::CorruptData(_))
    ));

    // None of the failures touched the filter
    assert!(filter.test(b"hello"));
    assert_eq!(filter.marshal_binary().unwrap(), encoded);
}

#[test]
fn test_concurrent_adds_and_tests() {
    let filter = Arc::new(BloomFilter::new_by_size(100_000, 0.01).unwrap());
    let barrier = Arc::new(Barrier::new(THREAD_COUNT * 2 + 1)); // Writers + readers + main
    let found_count = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();

    // Spawn writer threads
    for t in 0..THREAD_COUNT {
        let filter = Arc::clone(&filter);
        let barrier = Arc::clone(&barrier);

        handles.push(thread::spawn(move || {
            let start = t * ITEMS_PER_THREAD;
            barrier.wait();
            for i in start..start + ITEMS_PER_THREAD {
                filter.add(&i.to_le_bytes());
            }
        }));
    }

    // Spawn reader threads
    for t in 0..THREAD_COUNT {
        let filter = Arc::clone(&filter);
        let barrier = Arc::clone(&barrier);
        let found_count = Arc::clone(&found_count);

        handles.push(thread::spawn(move || {
            let start = t * ITEMS_PER_THREAD;
            barrier.wait();
            // May see some, may not, depending on timing
            for i in start..start + ITEMS_PER_THREAD {
                if filter.test(&i.to_le_bytes()) {
                    found_count.fetch_add(1, Ordering::Relaxed);
                }
            }
        }));
    }

    // Start all threads at once
    barrier.wait();
    for handle in handles {
        handle.join().unwrap();
    }

    println!("Found during writes: {}", found_count.load(Ordering::Relaxed));

    // After all threads complete, all items should be in the filter
    for i in 0..THREAD_COUNT * ITEMS_PER_THREAD {
        assert!(filter.test(&i.to_le_bytes()), "Value {i} should be in the filter");
    }
}

#[test]
fn test_concurrent_marshal_during_adds() {
    let filter = Arc::new(BloomFilter::new_by_size(10_000, 0.01).unwrap());
    let writer = {
        let filter = Arc::clone(&filter);
        thread::spawn(move || {
            for i in 0..5_000u32 {
                filter.add(&i.to_le_bytes());
            }
        })
    };

    // Every snapshot is a complete, decodable filter
    for _ in 0..50 {
        let snapshot = filter.marshal_binary().unwrap();
        let decoded = BloomFilter::from_binary(&snapshot).unwrap();
        assert_eq!(decoded.params(), filter.params());
    }

    writer.join().unwrap();
    let decoded = BloomFilter::from_binary(&filter.marshal_binary().unwrap()).unwrap();
    for i in 0..5_000u32 {
        assert!(decoded.test(&i.to_le_bytes()));
    }
}
