//! Ring Filter - command-line demo.
//!
//! This is a thin front end over the library: it loads configuration,
//! initializes logging, and exercises a filter built from that configuration.

use clap::{Parser, Subcommand};
use ring_filter_lib::config::{ConfigLoader, FilterConfig, LogConfig, RingConfig, ENV_PREFIX};
use ring_filter_lib::error::config::ConfigError;
use ring_filter_lib::error::{RingError, RingResult};
use ring_filter_lib::{BloomFilter, HistoryFilter};
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line arguments for the Ring Filter demo.
#[derive(Parser, Debug)]
#[clap(name = "ring-filter", version, author, about)]
struct Args {
    /// Path to configuration file
    #[clap(short, long, value_parser, global = true)]
    config: Option<PathBuf>,

    /// Command to execute
    #[clap(subcommand)]
    command: Option<Command>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Test, add, test, reset and test a value, printing each answer
    Demo {
        /// Value to run through the filter
        #[clap(short, long, default_value = "hello")]
        data: String,
    },

    /// Measure the false positive rate of a freshly sized filter
    FpRate {
        /// Number of elements to insert and to probe (defaults to the configured capacity)
        #[clap(short, long)]
        elements: Option<u64>,

        /// Target false positive rate (defaults to the configured rate)
        #[clap(short, long)]
        rate: Option<f64>,
    },

    /// Validate the configuration file
    Validate,

    /// Generate a default configuration file
    GenConfig {
        /// Path to output configuration file
        #[clap(short, long, value_parser)]
        output: PathBuf,
    },
}

/// The operations the demo drives, shared by both filter flavors.
trait Membership {
    fn add(&self, data: &[u8]);
    fn test(&self, data: &[u8]) -> bool;
    fn reset(&self);
}

impl Membership for BloomFilter {
    fn add(&self, data: &[u8]) {
        BloomFilter::add(self, data);
    }

    fn test(&self, data: &[u8]) -> bool {
        BloomFilter::test(self, data)
    }

    fn reset(&self) {
        BloomFilter::reset(self);
    }
}

impl Membership for HistoryFilter {
    fn add(&self, data: &[u8]) {
        HistoryFilter::add(self, data);
    }

    fn test(&self, data: &[u8]) -> bool {
        HistoryFilter::test(self, data)
    }

    fn reset(&self) {
        HistoryFilter::reset(self);
    }
}

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(log: &LogConfig) -> RingResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_line_number(log.source_location)
        .with_file(log.source_location)
        .with_thread_names(true);

    let installed = if log.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.pretty().finish())
    };
    installed
        .map_err(|e| RingError::Custom(format!("Failed to set global tracing subscriber: {e}")))
}

fn demo_session(filter: &dyn Membership, data: &str) {
    let bytes = data.as_bytes();

    println!("{data} in ring :: {}", filter.test(bytes));

    filter.add(bytes);
    println!("{data} in ring :: {}", filter.test(bytes));

    filter.reset();
    println!("{data} in ring :: {}", filter.test(bytes));
}

fn run_demo(config: &FilterConfig, data: &str) -> RingResult<()> {
    if config.uses_history() {
        let filter = config.build_history_filter()?;
        info!(history = filter.capacity(), "Running demo with history ring");
        demo_session(&filter, data);
    } else {
        let filter = config.build_filter()?;
        info!(bits = filter.bit_count(), rounds = filter.hash_rounds(), "Running demo");
        demo_session(&filter, data);
    }
    Ok(())
}

/// Insert `elements` keys, probe as many never-added keys, and report.
///
/// Returns whether the observed rate stayed within the target.
fn run_fp_rate(elements: u64, rate: f64) -> RingResult<bool> {
    let filter = BloomFilter::new_by_size(elements, rate)?;
    info!(
        bits = filter.bit_count(),
        rounds = filter.hash_rounds(),
        bytes = filter.size_bytes(),
        "Measuring false positive rate"
    );

    for i in 0..elements {
        filter.add(i.to_string().as_bytes());
    }
    let false_positives = (elements..elements.saturating_mul(2))
        .filter(|i| filter.test(i.to_string().as_bytes()))
        .count();
    let actual = false_positives as f64 / elements as f64;

    println!(">> Number of elements:  {elements}");
    println!(">> Target false positive rate:  {rate:.6}");
    println!(">> Number of false positives:  {false_positives}");
    println!(">> Actual false positive rate:  {actual:.6}");
    println!(">> Fill ratio:  {:.6}", filter.fill_ratio());

    Ok(actual <= rate)
}

/// Report a configuration error before logging has been configured.
///
/// Uses default logging when a subscriber can still be installed, stderr
/// otherwise. Returns whether the report went through tracing.
fn report_config_error(error: &ConfigError) -> bool {
    match init_logging(&LogConfig::default()) {
        Ok(()) => {
            tracing::error!("Configuration error: {}", error);
            true
        }
        Err(init_error) => {
            eprintln!("Configuration error: {error} ({init_error})");
            false
        }
    }
}

fn load_config(loader: &ConfigLoader) -> RingConfig {
    match loader.load() {
        Ok(config) => config,
        Err(e) => {
            report_config_error(&e);
            process::exit(1);
        }
    }
}

/// Main entry point for the application.
fn main() -> RingResult<()> {
    let args = <Args as clap::Parser>::parse();
    let config_loader = ConfigLoader::new(args.config.as_deref(), ENV_PREFIX);

    match args.command.unwrap_or(Command::Demo {
        data: "hello".to_string(),
    }) {
        Command::Demo { data } => {
            let config = load_config(&config_loader);
            init_logging(&config.log)?;
            run_demo(&config.filter, &data)
        }
        Command::FpRate { elements, rate } => {
            let config = load_config(&config_loader);
            init_logging(&config.log)?;
            let elements = elements.unwrap_or(config.filter.expected_elements);
            let rate = rate.unwrap_or(config.filter.false_positive_rate);

            if !run_fp_rate(elements, rate)? {
                tracing::error!("False positive threshold exceeded");
                process::exit(1);
            }
            Ok(())
        }
        Command::Validate => {
            let config = load_config(&config_loader);
            init_logging(&config.log)?;
            info!("Configuration validated successfully");
            Ok(())
        }
        Command::GenConfig { output } => {
            init_logging(&LogConfig::default())?;
            info!("Generating default configuration");
            let default_config = RingConfig::default();

            // Create parent directories if they don't exist
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }

            std::fs::write(&output, default_config.to_toml()?)?;

            info!("Default configuration written to {:?}", output);
            Ok(())
        }
    }
}
