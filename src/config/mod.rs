//! Configuration management for Mercator.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! Mercator uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for optional settings
//! - Comprehensive validation
//! - Type-safe configuration structs
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mercator::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration from file
//! let config = load_config("mercator.toml")?;
//!
//! // Access configuration sections
//! println!("Data dir: {}", config.source.data_dir);
//! println!("Warehouse: {}", config.warehouse.db_path);
//! println!("Run mode: {}", config.pipeline.mode);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! The configuration is organized into sections:
//!
//! - [`ApplicationConfig`] - Application settings (log level, dry run)
//! - [`SourceConfig`] - Raw extract locations (transactions, FX, holidays)
//! - [`WarehouseConfig`] - SQLite warehouse location
//! - [`PipelineConfig`] - Default run mode
//! - [`ValidationConfig`] - Data quality thresholds
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [source]
//! data_dir = "data/raw"
//! transactions_file = "transactions.csv"
//! fx_rates_file = "ecb_gbp_eur.csv"
//! holidays_file = "uk_bank_holidays.csv"
//!
//! [warehouse]
//! db_path = "${MERCATOR_WAREHOUSE_DIR}/retail.db"
//!
//! [pipeline]
//! mode = "rebuild"
//!
//! [validation]
//! fx_round_trip_tolerance = 1e-6
//! max_sample_keys = 5
//! ```
//!
//! # Environment Variables
//!
//! Use `${VAR_NAME}` syntax for environment variable substitution, or
//! override individual keys with `MERCATOR_<SECTION>_<KEY>`:
//!
//! ```bash
//! export MERCATOR_WAREHOUSE_DB_PATH="/var/lib/mercator/retail.db"
//! export MERCATOR_PIPELINE_MODE="incremental"
//! ```
//!
//! # Validation
//!
//! Configuration is validated on load:
//!
//! ```rust,no_run
//! use mercator::config::load_config;
//!
//! # fn example() {
//! match load_config("mercator.toml") {
//!     Ok(config) => println!("Configuration valid"),
//!     Err(e) => eprintln!("Configuration error: {}", e),
//! }
//! # }
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, LoggingConfig, MercatorConfig, PipelineConfig, SourceConfig,
    ValidationConfig, WarehouseConfig,
};
