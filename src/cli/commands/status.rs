//! Status command implementation
//!
//! This module implements the `status` command for displaying the
//! warehouse table inventory and content checksums.

use crate::adapters::store::{SqliteStore, WarehouseStore};
use crate::config::load_config;
use crate::core::quality::table_checksum;
use crate::domain::Result;
use clap::Args;
use std::path::Path;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Include per-table content checksums
    #[arg(long)]
    pub checksums: bool,

    /// Filter by table name
    #[arg(long)]
    pub table: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking warehouse status");

        println!("📊 Warehouse Status");
        println!();

        // Load configuration
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(2); // Configuration error exit code
            }
        };

        // Opening would create an empty database file, so check first
        if !Path::new(&config.warehouse.db_path).exists() {
            println!("No warehouse found at {}.", config.warehouse.db_path);
            println!("Run 'mercator run' to build it.");
            return Ok(0);
        }

        let store = match SqliteStore::open(&config.warehouse.db_path) {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to open warehouse store");
                println!("   Error: {}", e);
                return Ok(4); // Store unavailable exit code
            }
        };

        let inventory = match store.table_inventory() {
            Ok(i) => i,
            Err(e) => {
                println!("❌ Failed to read table inventory");
                println!("   Error: {}", e);
                return Ok(5); // Fatal error exit code
            }
        };

        if inventory.is_empty() {
            println!("Warehouse contains no pipeline tables.");
            println!("Run 'mercator run' to build them.");
            return Ok(0);
        }

        // Filter tables if requested
        let filtered: Vec<_> = inventory
            .iter()
            .filter(|info| {
                self.table
                    .as_ref()
                    .map(|name| info.name == *name)
                    .unwrap_or(true)
            })
            .collect();

        if filtered.is_empty() {
            println!("No tables match the specified filter.");
            return Ok(0);
        }

        println!("Warehouse: {}", config.warehouse.db_path);
        println!("Found {} table(s):", filtered.len());
        println!();

        if self.checksums {
            println!("{:<22} {:>12}  {:<64}", "Table", "Rows", "Checksum");
            println!("{}", "-".repeat(100));
            for info in filtered {
                let checksum = match checksum_for(&store, &info.name) {
                    Ok(c) => c,
                    Err(e) => {
                        println!("❌ Failed to checksum {}: {}", info.name, e);
                        return Ok(5);
                    }
                };
                println!("{:<22} {:>12}  {:<64}", info.name, info.rows, checksum);
            }
        } else {
            println!("{:<22} {:>12}", "Table", "Rows");
            println!("{}", "-".repeat(36));
            for info in filtered {
                println!("{:<22} {:>12}", info.name, info.rows);
            }
        }

        println!();
        Ok(0)
    }
}

/// Content checksum of one pipeline table, read through its typed rows
fn checksum_for(store: &SqliteStore, table: &str) -> Result<String> {
    match table {
        "raw_transactions" => table_checksum(&store.read_raw_transactions()?),
        "raw_fx_observations" => table_checksum(&store.read_raw_fx_observations()?),
        "raw_holidays" => table_checksum(&store.read_raw_holidays()?),
        "dim_product" => table_checksum(&store.read_dim_product()?),
        "dim_customer" => table_checksum(&store.read_dim_customer()?),
        "dim_calendar" => table_checksum(&store.read_dim_calendar()?),
        "daily_fx_rates" => table_checksum(&store.read_daily_fx_rates()?),
        "fct_sales" => table_checksum(&store.read_fct_sales()?),
        "fct_sales_eur" => table_checksum(&store.read_fct_sales_eur()?),
        "agg_country_day" => table_checksum(&store.read_agg_country_day()?),
        other => Ok(format!("unknown table '{other}'")),
    }
}
