//! Configuration schema types
//!
//! This module defines the configuration structure for Mercator. Every
//! section maps to a TOML table and validates itself; the root type ties
//! the sections together.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Main Mercator configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MercatorConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Raw source file locations
    pub source: SourceConfig,

    /// Warehouse store location
    pub warehouse: WarehouseConfig,

    /// Pipeline run settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Data quality thresholds
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MercatorConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate()?;
        self.warehouse.validate()?;
        self.pipeline.validate()?;
        self.validation.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Compute and validate everything but write nothing
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Raw source file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory holding the raw extracts
    pub data_dir: String,

    /// Transaction line extract, relative to `data_dir`
    #[serde(default = "default_transactions_file")]
    pub transactions_file: String,

    /// ECB GBP/EUR observation extract, relative to `data_dir`
    #[serde(default = "default_fx_rates_file")]
    pub fx_rates_file: String,

    /// UK bank-holiday list, relative to `data_dir`
    #[serde(default = "default_holidays_file")]
    pub holidays_file: String,
}

impl SourceConfig {
    /// Full path of the transaction extract
    pub fn transactions_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.transactions_file)
    }

    /// Full path of the FX observation extract
    pub fn fx_rates_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.fx_rates_file)
    }

    /// Full path of the holiday list
    pub fn holidays_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.holidays_file)
    }

    fn validate(&self) -> Result<(), String> {
        if self.data_dir.is_empty() {
            return Err("source.data_dir cannot be empty".to_string());
        }
        for (name, value) in [
            ("source.transactions_file", &self.transactions_file),
            ("source.fx_rates_file", &self.fx_rates_file),
            ("source.holidays_file", &self.holidays_file),
        ] {
            if value.is_empty() {
                return Err(format!("{name} cannot be empty"));
            }
        }
        Ok(())
    }
}

/// Warehouse store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// SQLite database file; parent directories are created on open
    pub db_path: String,
}

impl WarehouseConfig {
    fn validate(&self) -> Result<(), String> {
        if self.db_path.is_empty() {
            return Err("warehouse.db_path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Pipeline run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Default run mode (rebuild or incremental)
    #[serde(default = "default_mode")]
    pub mode: String,
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_modes = ["rebuild", "incremental"];
        if !valid_modes.contains(&self.mode.as_str()) {
            return Err(format!(
                "Invalid pipeline.mode '{}'. Must be one of: {}",
                self.mode,
                valid_modes.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
        }
    }
}

/// Data quality configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum allowed FX round-trip error per fact row
    #[serde(default = "default_fx_round_trip_tolerance")]
    pub fx_round_trip_tolerance: f64,

    /// Offending keys kept per failed rule and rejection reason
    #[serde(default = "default_max_sample_keys")]
    pub max_sample_keys: usize,
}

impl ValidationConfig {
    fn validate(&self) -> Result<(), String> {
        if !(self.fx_round_trip_tolerance > 0.0) {
            return Err(format!(
                "validation.fx_round_trip_tolerance must be > 0, got {}",
                self.fx_round_trip_tolerance
            ));
        }
        if self.max_sample_keys == 0 || self.max_sample_keys > 100 {
            return Err(format!(
                "validation.max_sample_keys must be between 1 and 100, got {}",
                self.max_sample_keys
            ));
        }
        Ok(())
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            fx_round_trip_tolerance: default_fx_round_trip_tolerance(),
            max_sample_keys: default_max_sample_keys(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Mirror logs into a daily-rotated local file
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Emit file logs as JSON lines instead of plain text
    #[serde(default)]
    pub json_format: bool,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            json_format: false,
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_transactions_file() -> String {
    "transactions.csv".to_string()
}

fn default_fx_rates_file() -> String {
    "ecb_gbp_eur.csv".to_string()
}

fn default_holidays_file() -> String {
    "uk_bank_holidays.csv".to_string()
}

fn default_mode() -> String {
    "rebuild".to_string()
}

fn default_fx_round_trip_tolerance() -> f64 {
    1e-6
}

fn default_max_sample_keys() -> usize {
    5
}

fn default_local_path() -> String {
    "logs".to_string()
}
