//! Domain models and types for Mercator.
//!
//! This module contains the core domain models, types, and business rules
//! for the warehouse build: typed business keys, raw ingestion records,
//! warehouse table rows, and the error hierarchy.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`InvoiceNo`], [`StockCode`], [`CustomerKey`])
//! - **Raw records** ([`RawTransactionRecord`], [`FxObservation`], [`HolidayRecord`])
//! - **Table rows** ([`ProductRow`], [`SalesFactRow`], [`CountryDayRow`], ...)
//! - **Error types** ([`MercatorError`], [`IngestError`], [`StoreError`], [`StageError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Mercator uses the newtype pattern for business keys to prevent mixing
//! different key types:
//!
//! ```rust
//! use mercator::domain::{InvoiceNo, StockCode};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let invoice = InvoiceNo::new("536365")?;
//! let stock_code = StockCode::new("85123A")?;
//!
//! // This won't compile - type safety prevents mixing keys
//! // let wrong: InvoiceNo = stock_code;  // Compile error!
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, MercatorError>`]:
//!
//! ```rust
//! use mercator::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let _config = mercator::config::load_config("mercator.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod records;
pub mod result;
pub mod tables;

// Re-export commonly used types for convenience
pub use errors::{IngestError, MercatorError, StageError, StoreError};
pub use ids::{CustomerKey, InvoiceNo, StockCode};
pub use records::{FxObservation, HolidayRecord, RawTransactionRecord};
pub use result::Result;
pub use tables::{
    CalendarRow, CountryDayRow, CustomerRow, FxRateRow, ProductRow, SalesFactEurRow, SalesFactRow,
    TableInfo, UNKNOWN_COUNTRY,
};
