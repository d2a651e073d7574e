//! Run command implementation
//!
//! This module implements the `run` command that executes the warehouse
//! build end to end.

use crate::adapters::store::SqliteStore;
use crate::config::load_config;
use crate::core::pipeline::{PipelineRunner, RunMode, SourcePaths};
use crate::core::quality::ValidationSettings;
use clap::Args;
use std::path::Path;
use std::str::FromStr;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - compute and validate everything without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Override run mode (rebuild or incremental)
    #[arg(long)]
    pub mode: Option<String>,

    /// Write the run summary as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub summary: Option<String>,
}

impl RunArgs {
    /// Execute the run command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        // Load configuration
        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Apply CLI overrides
        if let Some(mode) = &self.mode {
            tracing::info!(mode = %mode, "Overriding run mode from CLI");
            config.pipeline.mode = mode.clone();
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        // Validate configuration after overrides
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2); // Configuration error exit code
        }

        let mode = match RunMode::from_str(&config.pipeline.mode) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Invalid run mode: {e}");
                return Ok(2);
            }
        };
        let dry_run = config.application.dry_run;

        // Dry run mode
        if dry_run {
            tracing::info!("Dry run mode enabled - no tables will be written");
            println!("🔍 DRY RUN MODE - No tables will be written");
            println!();
        }

        // Confirmation prompt before a rebuild drops the warehouse tables
        // (unless --yes or dry-run)
        if mode == RunMode::Rebuild && !self.yes && !dry_run {
            println!("Run Configuration:");
            println!("  Mode: {mode}");
            println!("  Warehouse: {}", config.warehouse.db_path);
            println!(
                "  Transactions: {}",
                config.source.transactions_path().display()
            );
            println!("  FX rates: {}", config.source.fx_rates_path().display());
            println!("  Holidays: {}", config.source.holidays_path().display());
            println!();
            print!("A rebuild drops and recreates every pipeline table. Proceed? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Run cancelled.");
                return Ok(0);
            }
        }

        // Open the store. A dry rebuild computes against a throwaway
        // in-memory store so the warehouse file is never created; a dry
        // incremental run still needs the staged tables on disk.
        let open_result = if dry_run && mode == RunMode::Rebuild {
            SqliteStore::open_in_memory()
        } else {
            SqliteStore::open(&config.warehouse.db_path)
        };
        let mut store = match open_result {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open warehouse store");
                eprintln!("Failed to open warehouse store: {e}");
                return Ok(4); // Store unavailable exit code
            }
        };

        let settings = ValidationSettings {
            fx_round_trip_tolerance: config.validation.fx_round_trip_tolerance,
            max_sample_keys: config.validation.max_sample_keys,
        };
        let sources = SourcePaths {
            transactions: config.source.transactions_path(),
            fx_observations: config.source.fx_rates_path(),
            holidays: config.source.holidays_path(),
        };

        tracing::info!("Executing pipeline");
        println!("🚀 Starting {mode} run...");
        println!();

        let summary = match PipelineRunner::new(&mut store, settings)
            .with_dry_run(dry_run)
            .run(mode, &sources)
        {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Pipeline run failed");
                eprintln!("Run failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        // Display summary
        println!();
        println!("📊 Run Summary:");
        println!("  Mode: {}", summary.mode);
        for stage in &summary.stages {
            println!(
                "    {:<12} {:>8} rows  {:>6} ms",
                stage.stage, stage.rows_written, stage.duration_ms
            );
        }
        println!("  Rows written: {}", summary.rows_written());
        println!("  Rejected lines: {}", summary.rejections.total());
        for (reason, count) in summary.rejections.counts() {
            println!("    {reason}: {count}");
        }
        println!("  Collapsed duplicates: {}", summary.collapsed_duplicates);
        println!(
            "  Checks: {} run, {} failed",
            summary.checks.len(),
            summary.failed_checks()
        );
        if let Some(ms) = summary.duration_ms {
            println!("  Duration: {:.2}s", ms as f64 / 1000.0);
        }
        println!();

        // Write summary artifact if requested
        if let Some(path) = &self.summary {
            let json = summary.to_json()?;
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, json)?;
            println!("📄 Summary written to {path}");
            println!();
        }

        // Fatal check failures abort the run above, so anything left
        // here is informational
        if summary.failed_checks() > 0 {
            println!("⚠️  Run completed with informational check failures");
        } else {
            println!("✅ Run completed successfully!");
        }

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args_defaults() {
        let args = RunArgs {
            yes: false,
            dry_run: false,
            mode: None,
            summary: None,
        };

        assert!(!args.yes);
        assert!(!args.dry_run);
        assert!(args.mode.is_none());
        assert!(args.summary.is_none());
    }

    #[test]
    fn test_run_args_with_overrides() {
        let args = RunArgs {
            yes: true,
            dry_run: true,
            mode: Some("incremental".to_string()),
            summary: Some("runs/summary.json".to_string()),
        };

        assert!(args.yes);
        assert!(args.dry_run);
        assert_eq!(args.mode, Some("incremental".to_string()));
        assert_eq!(args.summary, Some("runs/summary.json".to_string()));
    }

    #[test]
    fn test_missing_config_exits_with_config_code() {
        let args = RunArgs {
            yes: true,
            dry_run: false,
            mode: None,
            summary: None,
        };

        let code = args.execute("does-not-exist.toml").unwrap();
        assert_eq!(code, 2);
    }
}
