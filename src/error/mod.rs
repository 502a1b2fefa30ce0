//! Error module for the Ring Filter application.
//!
//! The filter itself reports [`BloomError`]; this module wraps it together with
//! configuration, IO and serialization failures for the command-line layer.

use thiserror::Error;

use crate::data_structures::bloom_filter::BloomError;

pub mod config;

/// Result type alias used throughout the Ring Filter application.
pub type RingResult<T> = Result<T, RingError>;

/// Core error enum for the Ring Filter application.
#[derive(Error, Debug)]
pub enum RingError {
    /// Errors occurring during configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Errors reported by the filter store.
    #[error("Filter error: {0}")]
    Filter(#[from] BloomError),

    /// IO errors that may occur during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors rendering configuration as TOML.
    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    /// Custom error with message for cases where specific error types are not defined.
    #[error("{0}")]
    Custom(String),
}
