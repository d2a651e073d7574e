//! Core business logic for Mercator.
//!
//! This module contains the builders and orchestration that turn staged
//! retail extracts into the dimensional warehouse.
//!
//! # Modules
//!
//! - [`calendar`] - Date span detection and calendar dimension rows
//! - [`dimensions`] - Product and customer dimension builders
//! - [`fx`] - Forward-filled daily FX series and currency conversion
//! - [`facts`] - Sales fact construction with dedup and key resolution
//! - [`aggregate`] - Daily per-country rollup
//! - [`quality`] - Stage validation rules, rejection reports, checksums
//! - [`pipeline`] - Stage sequencing under rebuild/incremental modes
//!
//! # Pipeline Workflow
//!
//! The typical run:
//!
//! 1. **Stage**: read the raw files (rebuild) or the staging tables
//!    (incremental)
//! 2. **Calendar**: span the observed dates, flag weekends and holidays
//! 3. **Dimensions**: derive products and customers, inject the unknown
//!    member
//! 4. **FX**: forward-fill the published observations across the span
//! 5. **Facts**: filter, dedup, resolve keys, convert to EUR
//! 6. **Aggregate**: roll facts up per country and day
//! 7. **Report**: surface the run summary with counts and check outcomes
//!
//! Each stage validates before it writes; a fatal check aborts the run
//! with earlier tables already committed and the failed stage's table
//! untouched.
//!
//! # Example
//!
//! ```rust,no_run
//! use mercator::adapters::store::SqliteStore;
//! use mercator::core::pipeline::{PipelineRunner, RunMode, SourcePaths};
//! use mercator::core::quality::ValidationSettings;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = SqliteStore::open("warehouse/retail.db")?;
//! let sources = SourcePaths {
//!     transactions: "data/raw/transactions.csv".into(),
//!     fx_observations: "data/raw/ecb_gbp_eur.csv".into(),
//!     holidays: "data/raw/uk_bank_holidays.csv".into(),
//! };
//!
//! let summary = PipelineRunner::new(&mut store, ValidationSettings::default())
//!     .run(RunMode::Rebuild, &sources)?;
//!
//! println!("Rows written: {}", summary.rows_written());
//! println!("Rows rejected: {}", summary.rejections.total());
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod calendar;
pub mod dimensions;
pub mod facts;
pub mod fx;
pub mod pipeline;
pub mod quality;
