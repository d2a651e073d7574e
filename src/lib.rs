// Mercator - Retail Transaction Warehouse ETL Tool
// Copyright (c) 2025 Mercator Contributors
// Licensed under the MIT License

//! # Mercator - Retail Transaction Warehouse ETL
//!
//! Mercator is a batch ETL tool built in Rust that turns raw retail
//! transaction extracts into a small dimensional warehouse: conformed
//! dimensions, GBP and EUR fact tables, a forward-filled daily FX series,
//! and a country/day rollup, all persisted in a single SQLite file.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Ingesting** the three raw CSV extracts (transactions, ECB GBP/EUR
//!   observations, UK bank holidays) into typed records
//! - **Building** the calendar, product and customer dimensions, the
//!   daily FX series, the GBP/EUR fact tables and the country/day rollup
//! - **Validating** every table with fatal and informational quality
//!   checks before it is written
//! - **Persisting** tables with whole-table atomic replacement, plus
//!   staged raw tables that make incremental recomputes possible
//!
//! ## Architecture
//!
//! Mercator follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (builders, quality checks, pipeline)
//! - [`adapters`] - External integrations (CSV ingestion, SQLite store)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mercator::adapters::store::SqliteStore;
//! use mercator::core::pipeline::{PipelineRunner, RunMode, SourcePaths};
//! use mercator::core::quality::ValidationSettings;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = SqliteStore::open("warehouse/retail.db")?;
//!     let sources = SourcePaths {
//!         transactions: "data/raw/transactions.csv".into(),
//!         fx_observations: "data/raw/ecb_gbp_eur.csv".into(),
//!         holidays: "data/raw/uk_bank_holidays.csv".into(),
//!     };
//!
//!     let summary = PipelineRunner::new(&mut store, ValidationSettings::default())
//!         .run(RunMode::Rebuild, &sources)?;
//!
//!     println!("Wrote {} rows", summary.rows_written());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! ### Incremental Recompute
//!
//! A rebuild stages the raw extracts into the store before deriving
//! anything. Incremental runs recompute every derived table from those
//! staged rows without re-reading the source files, and produce
//! byte-identical tables:
//!
//! ```rust,no_run
//! use mercator::adapters::store::SqliteStore;
//! use mercator::core::pipeline::{PipelineRunner, RunMode, SourcePaths};
//! use mercator::core::quality::ValidationSettings;
//!
//! # fn example(sources: &SourcePaths) -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = SqliteStore::open("warehouse/retail.db")?;
//! let summary = PipelineRunner::new(&mut store, ValidationSettings::default())
//!     .run(RunMode::Incremental, sources)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Quality Gates
//!
//! Every stage validates its output before writing. Fatal failures abort
//! the run with the already-committed tables left intact; informational
//! failures are reported in the run summary:
//!
//! ```rust,no_run
//! use mercator::core::quality::{ValidationSettings, check_calendar};
//! use mercator::core::calendar::{build_calendar, DateSpan};
//! use std::collections::BTreeSet;
//!
//! # fn example(span: DateSpan) {
//! let rows = build_calendar(span, &BTreeSet::new());
//! let report = check_calendar(&rows, span, &ValidationSettings::default());
//! assert!(report.passed());
//! # }
//! ```
//!
//! ### Idempotence Checksums
//!
//! Tables checksum over canonically serialized rows, so reruns over the
//! same staged input can be verified byte-for-byte:
//!
//! ```rust,no_run
//! use mercator::core::quality::table_checksum;
//! use mercator::domain::tables::CustomerRow;
//!
//! # fn example(rows: &[CustomerRow]) -> Result<(), Box<dyn std::error::Error>> {
//! let checksum = table_checksum(rows)?;
//! println!("dim_customer {checksum}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Mercator uses the [`domain::MercatorError`] type for all errors:
//!
//! ```rust,no_run
//! use mercator::domain::MercatorError;
//!
//! fn example() -> Result<(), MercatorError> {
//!     // Errors are automatically converted using the ? operator
//!     let _config = mercator::config::load_config("mercator.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Mercator uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn, error};
//!
//! info!("Starting run");
//! warn!(rule = "daily_fx_rates.positive_rates", "Check failed");
//! error!(error = "store unavailable", "Run failed");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
