//! Test modules for the Ring Filter library.
//!
//! This module contains the in-crate test suites:
//! - Configuration loading and validation
//! - Error conversion and display
//! - Property-based tests of the filter using proptest
//! - Shared fixtures and strategies


pub use test_utils::{batch_strategy, bytes_strategy, sizing_strategy, TestFixture};
