//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Mercator configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Load configuration (validation runs as part of the load)
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Data Dir: {}", config.source.data_dir);
        println!(
            "  Transactions: {}",
            config.source.transactions_path().display()
        );
        println!("  FX Rates: {}", config.source.fx_rates_path().display());
        println!("  Holidays: {}", config.source.holidays_path().display());
        println!("  Warehouse: {}", config.warehouse.db_path);
        println!("  Run Mode: {}", config.pipeline.mode);
        println!(
            "  FX Round-Trip Tolerance: {}",
            config.validation.fx_round_trip_tolerance
        );
        println!("  Max Sample Keys: {}", config.validation.max_sample_keys);
        println!(
            "  File Logging: {}",
            if config.logging.local_enabled {
                config.logging.local_path.as_str()
            } else {
                "disabled"
            }
        );
        println!();
        Ok(0)
    }
}
