//! Configuration module for the Ring Filter application.
//!
//! This module provides a configuration system that can load settings from
//! files (TOML, YAML, JSON) and override them with environment variables.
//! All configuration values are validated for correctness before use.

use crate::error::config::ConfigError;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod filter;

pub use filter::FilterConfig;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Default environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "RING";

/// A trait for types that can be validated.
pub trait Validate {
    /// Validates that the configuration is correct.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the configuration is valid
    /// * `Err(ConfigError)` if the configuration is invalid
    fn validate(&self) -> ConfigResult<()>;
}

/// Main configuration for the Ring Filter application.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RingConfig {
    /// Filter sizing configuration
    pub filter: FilterConfig,

    /// Log configuration
    pub log: LogConfig,
}

impl Validate for RingConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.filter.validate()?;
        self.log.validate()?;
        Ok(())
    }
}

impl RingConfig {
    /// Render the configuration as a TOML document.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Whether to log in JSON format
    pub json: bool,

    /// Whether to include source code locations in logs
    pub source_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            source_location: true,
        }
    }
}

impl Validate for LogConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::ValidationError(format!(
                "Invalid log level: {}",
                self.level
            ))),
        }
    }
}

/// Configuration loader for the Ring Filter application.
#[derive(Debug)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Optional path to the configuration file
    /// * `env_prefix` - Prefix for environment variables that override configuration values
    pub fn new<P: AsRef<Path>>(config_path: Option<P>, env_prefix: &str) -> Self {
        Self {
            config_path: config_path.map(|p| p.as_ref().to_path_buf()),
            env_prefix: env_prefix.to_string(),
        }
    }

    /// Loads the configuration from defaults, the file and environment
    /// variables, in increasing order of precedence.
    ///
    /// # Returns
    ///
    /// * `Ok(RingConfig)` if the configuration was loaded successfully
    /// * `Err(ConfigError)` if there was an error loading the configuration
    pub fn load(&self) -> ConfigResult<RingConfig> {
        let mut builder = Config::builder();

        // Add default configuration values
        builder = builder.add_source(
            Config::try_from(&RingConfig::default())
                .map_err(|e| ConfigError::ParseError(e.to_string()))?,
        );

        // Add configuration from file if provided
        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }

            let format = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => FileFormat::Toml,
                Some("json") => FileFormat::Json,
                Some("yaml" | "yml") => FileFormat::Yaml,
                _ => {
                    return Err(ConfigError::ParseError(format!(
                        "Unsupported file extension for: {path:?}"
                    )))
                }
            };
            builder = builder.add_source(File::from(path.as_path()).format(format));
        }

        // Add environment variables with prefix
        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        let ring_config: RingConfig = config
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        ring_config.validate()?;

        tracing::debug!(
            path = ?self.config_path,
            env_prefix = %self.env_prefix,
            "Loaded configuration"
        );
        Ok(ring_config)
    }
}
