//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "mercator.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Mercator configuration");
        println!();

        // Check if file already exists
        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        // Generate configuration content
        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        // Write to file
        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Point source.data_dir at your raw extracts");
                println!("     (transactions, ECB GBP/EUR rates, UK bank holidays)");
                println!("  3. Validate configuration: mercator validate-config");
                println!("  4. Build the warehouse: mercator run");
                println!("  5. Inspect the result: mercator status --checksums");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Mercator Configuration File
# Retail transaction to dimensional warehouse ETL

[application]
log_level = "info"
dry_run = false

[source]
data_dir = "data/raw"
transactions_file = "transactions.csv"
fx_rates_file = "ecb_gbp_eur.csv"
holidays_file = "uk_bank_holidays.csv"

[warehouse]
db_path = "warehouse/retail.db"

[pipeline]
mode = "rebuild"

[validation]
fx_round_trip_tolerance = 1e-6
max_sample_keys = 5

[logging]
local_enabled = false
local_path = "logs"
json_format = false
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Mercator Configuration File
# Retail transaction to dimensional warehouse ETL
#
# This file contains all configuration options with examples and
# explanations. Values support ${VAR} environment substitution outside
# comments, and every key can be overridden with a MERCATOR_<SECTION>_<KEY>
# environment variable, e.g. MERCATOR_WAREHOUSE_DB_PATH.

[application]
# Log level: trace, debug, info, warn, error
log_level = "info"

# Compute and validate every stage but write nothing
dry_run = false

[source]
# Directory holding the raw extracts
data_dir = "data/raw"

# Transaction line extract (CSV), relative to data_dir.
# Expected header:
#   InvoiceNo,StockCode,Description,Quantity,InvoiceDate,UnitPrice,CustomerID,Country
transactions_file = "transactions.csv"

# ECB GBP per EUR observations (CSV): Date,Rate
fx_rates_file = "ecb_gbp_eur.csv"

# UK bank holidays (CSV): Date,Title
holidays_file = "uk_bank_holidays.csv"

[warehouse]
# SQLite database file. Parent directories are created on first run.
# db_path = "${MERCATOR_WAREHOUSE_DIR}/retail.db"
db_path = "warehouse/retail.db"

[pipeline]
# Default run mode:
#   rebuild     - drop the pipeline tables, re-read the raw files, recompute
#   incremental - recompute derived tables from the staged raw tables
mode = "rebuild"

[validation]
# Maximum allowed |gross_gbp - gross_eur * rate| per fact row
fx_round_trip_tolerance = 1e-6

# Offending keys kept per failed check and rejection reason (1-100)
max_sample_keys = 5

[logging]
# Mirror logs into a daily-rotated file under local_path
local_enabled = false
local_path = "logs"

# Emit the file log as JSON lines instead of plain text
json_format = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "mercator.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "mercator.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generate_minimal_config() {
        let config = InitArgs::generate_minimal_config();
        assert!(config.contains("[source]"));
        assert!(config.contains("[warehouse]"));
        assert!(config.contains("[pipeline]"));
    }

    #[test]
    fn test_generate_config_with_examples() {
        let config = InitArgs::generate_config_with_examples();
        assert!(config.contains("# Mercator Configuration File"));
        assert!(config.contains("fx_round_trip_tolerance"));
        assert!(config.contains("rebuild"));
    }

    #[test]
    fn test_generated_configs_parse_and_validate() {
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config: crate::config::MercatorConfig = toml::from_str(&content).unwrap();
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_existing_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mercator.toml");
        fs::write(&path, "keep me").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };
        let code = args.execute().unwrap();
        assert_eq!(code, 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn test_force_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mercator.toml");
        fs::write(&path, "old").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().to_string(),
            with_examples: false,
            force: true,
        };
        let code = args.execute().unwrap();
        assert_eq!(code, 0);
        assert!(fs::read_to_string(&path).unwrap().contains("[warehouse]"));
    }
}
