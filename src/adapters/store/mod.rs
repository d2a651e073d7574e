//! Warehouse store adapters
//!
//! The [`WarehouseStore`] trait is the persistence seam; [`SqliteStore`]
//! is the embedded implementation. Dry runs substitute an in-memory
//! store behind the same trait.

pub mod sqlite;
pub mod traits;

pub use sqlite::SqliteStore;
pub use traits::{WarehouseStore, PIPELINE_TABLES};
