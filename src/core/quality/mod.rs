//! Data quality validation
//!
//! This module provides the cross-cutting quality layer: row rejection
//! reports, stage validation rules, and table checksums for comparing
//! rebuild output across runs.

pub mod checks;
pub mod checksum;
pub mod report;

pub use checks::{
    check_aggregates, check_calendar, check_dimensions, check_facts, check_fx_series,
    ValidationSettings,
};
pub use checksum::table_checksum;
pub use report::{CheckResult, RejectReason, RejectionLog, RowRejection, Severity, ValidationReport};
