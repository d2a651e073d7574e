//! External system integrations for Mercator.
//!
//! This module provides adapters for the systems at the pipeline's edges:
//!
//! - [`ingest`] - CSV ingestion of the raw source files
//! - [`store`] - Warehouse persistence (trait-based, SQLite implementation)
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies
//! and keep core logic pure. Ingestion adapters are pure functions from a
//! path to typed records; the store is a trait so tests and dry runs can
//! swap in an in-memory engine.
//!
//! ```rust,no_run
//! use mercator::adapters::store::{SqliteStore, WarehouseStore};
//! use mercator::adapters::ingest::read_transactions;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let records = read_transactions(Path::new("data/raw/online_retail.csv"))?;
//!
//! let mut store = SqliteStore::open("build/warehouse.sqlite")?;
//! store.replace_raw_transactions(&records)?;
//! # Ok(())
//! # }
//! ```

pub mod ingest;
pub mod store;
