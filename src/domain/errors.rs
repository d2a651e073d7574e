//! Domain error types
//!
//! This module defines the error hierarchy for Mercator. All errors are
//! domain-specific and don't expose third-party types. Row-level quality
//! problems are not errors; they travel in stage reports
//! (see [`crate::core::quality::report`]).

use chrono::NaiveDate;
use thiserror::Error;

/// Main Mercator error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum MercatorError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Raw-file ingestion errors
    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    /// Warehouse store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Stage-level pipeline errors
    #[error("Pipeline error: {0}")]
    Stage(#[from] StageError),

    /// Fatal data quality failures
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Ingestion-specific errors
///
/// Structural problems with a raw source file. These abort the run before
/// any core logic executes; value-level problems in otherwise well-formed
/// rows are deferred to the fact builder instead.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Source file could not be opened or read
    #[error("Failed to read {path}: {message}")]
    FileUnreadable { path: String, message: String },

    /// A mandatory column is absent from the header row
    #[error("Missing column '{column}' in {path}")]
    MissingColumn { path: String, column: String },

    /// A record could not be parsed at the CSV level
    #[error("Malformed record in {path} at line {line}: {message}")]
    MalformedRecord {
        path: String,
        line: usize,
        message: String,
    },

    /// A mandatory date field could not be parsed
    #[error("Unparseable date '{value}' in {path} at line {line}")]
    InvalidDate {
        path: String,
        line: usize,
        value: String,
    },

    /// A mandatory numeric field could not be parsed
    #[error("Unparseable number '{value}' for '{column}' in {path} at line {line}")]
    InvalidNumber {
        path: String,
        line: usize,
        column: String,
        value: String,
    },
}

/// Warehouse store errors
///
/// Errors from the embedded relational engine. The engine's own error
/// types stay behind this boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not open or create the store
    #[error("Failed to open store at {path}: {message}")]
    OpenFailed { path: String, message: String },

    /// A table replacement failed; the previous table contents survive
    #[error("Failed to replace table {table}: {message}")]
    ReplaceFailed { table: String, message: String },

    /// A table read failed
    #[error("Failed to read table {table}: {message}")]
    ReadFailed { table: String, message: String },

    /// A stored value could not be mapped onto its domain type
    #[error("Corrupt row in table {table}: {message}")]
    CorruptRow { table: String, message: String },

    /// A maintenance statement failed
    #[error("Store maintenance failed: {0}")]
    MaintenanceFailed(String),
}

/// Stage-level pipeline errors
///
/// Raised by builders when an input invariant is broken. Each one is fatal
/// for the run; previously committed tables are left untouched.
#[derive(Debug, Error)]
pub enum StageError {
    /// No dated transaction rows exist to span the calendar
    #[error("Empty date range: no dated transaction rows to build the calendar from")]
    EmptyDateRange,

    /// A dimension business key appeared more than once post-build
    #[error("Duplicate surrogate key in {dimension}: '{key}' appears {count} times")]
    DuplicateSurrogateKey {
        dimension: String,
        key: String,
        count: usize,
    },

    /// No FX observation exists at or before the calendar span start
    #[error(
        "FX coverage gap: no rate observation at or before {span_start} \
         (earliest observation: {earliest})"
    )]
    FxCoverageGap {
        span_start: NaiveDate,
        earliest: String,
    },

    /// A filled FX rate was missing or non-positive
    #[error("Invalid FX rate for {date}: {rate}")]
    InvalidFxRate { date: NaiveDate, rate: f64 },

    /// A fact date was absent from the filled FX series
    #[error("No FX rate available for transaction date {date}")]
    MissingFxRate { date: NaiveDate },

    /// Two source rows agree on everything except their amounts
    #[error(
        "Conflicting duplicate for invoice {invoice_no}, stock code {stock_code} \
         (source line {line_no}): identical rows disagree on qty/unit_price"
    )]
    ConflictingDuplicate {
        invoice_no: String,
        stock_code: String,
        line_no: usize,
    },
}

// Conversion from std::io::Error
impl From<std::io::Error> for MercatorError {
    fn from(err: std::io::Error) -> Self {
        MercatorError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for MercatorError {
    fn from(err: serde_json::Error) -> Self {
        MercatorError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for MercatorError {
    fn from(err: toml::de::Error) -> Self {
        MercatorError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mercator_error_display() {
        let err = MercatorError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_ingest_error_conversion() {
        let ingest_err = IngestError::MissingColumn {
            path: "data/raw/retail.csv".to_string(),
            column: "InvoiceNo".to_string(),
        };
        let err: MercatorError = ingest_err.into();
        assert!(matches!(err, MercatorError::Ingest(_)));
        assert!(err.to_string().contains("InvoiceNo"));
    }

    #[test]
    fn test_store_error_conversion() {
        let store_err = StoreError::ReplaceFailed {
            table: "fct_sales".to_string(),
            message: "disk full".to_string(),
        };
        let err: MercatorError = store_err.into();
        assert!(matches!(err, MercatorError::Store(_)));
    }

    #[test]
    fn test_stage_error_conversion() {
        let stage_err = StageError::EmptyDateRange;
        let err: MercatorError = stage_err.into();
        assert!(matches!(err, MercatorError::Stage(_)));
    }

    #[test]
    fn test_conflicting_duplicate_display() {
        let err = StageError::ConflictingDuplicate {
            invoice_no: "536365".to_string(),
            stock_code: "85123A".to_string(),
            line_no: 42,
        };
        let msg = err.to_string();
        assert!(msg.contains("536365"));
        assert!(msg.contains("85123A"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn test_fx_coverage_gap_display() {
        let err = StageError::FxCoverageGap {
            span_start: NaiveDate::from_ymd_opt(2010, 1, 4).unwrap(),
            earliest: "2010-02-01".to_string(),
        };
        assert!(err.to_string().contains("2010-01-04"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: MercatorError = io_err.into();
        assert!(matches!(err, MercatorError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: MercatorError = json_err.into();
        assert!(matches!(err, MercatorError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: MercatorError = toml_err.into();
        assert!(matches!(err, MercatorError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        let err = MercatorError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;

        let err = StageError::EmptyDateRange;
        let _: &dyn std::error::Error = &err;

        let err = StoreError::MaintenanceFailed("Test".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
