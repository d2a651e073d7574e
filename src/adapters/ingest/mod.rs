//! Raw-file ingestion adapters
//!
//! Each adapter is a pure function from a source path to an ordered list of
//! typed records. Structural problems (unreadable file, missing column,
//! unparseable mandatory date) fail fast with a source-identifying error;
//! value-level problems in otherwise well-formed rows travel onward as
//! `None` fields for the fact builder to adjudicate.

pub mod fx;
pub mod holidays;
pub mod transactions;

pub use fx::read_fx_rates;
pub use holidays::read_holidays;
pub use transactions::read_transactions;

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::errors::IngestError;

/// Opens a CSV reader over `path` with the shared parser settings.
fn open_reader(path: &Path) -> Result<csv::Reader<File>, IngestError> {
    let file = File::open(path).map_err(|e| IngestError::FileUnreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header. If we don't strip it, schema validation will
    // incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn require_columns(
    path: &str,
    header_map: &HashMap<String, usize>,
    columns: &[&str],
) -> Result<(), IngestError> {
    for column in columns {
        if !header_map.contains_key(*column) {
            return Err(IngestError::MissingColumn {
                path: path.to_string(),
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}

/// Returns the trimmed, non-empty value of a column, if present.
fn field<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parses a date, accepting the formats the source extracts actually use.
///
/// ISO first; the classic retail extract carries US-style month-first
/// timestamps, so month-first is tried before day-first. First match wins,
/// keeping parsing deterministic.
fn parse_date(s: &str) -> Option<NaiveDate> {
    const DATETIME_FMTS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M",
        "%d/%m/%Y %H:%M",
    ];
    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"];

    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

fn parse_i64(s: &str) -> Option<i64> {
    s.parse::<i64>().ok()
}

fn parse_finite_f64(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}

/// Parses a customer identifier, tolerating the float rendering (`17850.0`)
/// that spreadsheet round-trips introduce on nullable integer columns.
fn parse_customer_id(s: &str) -> Option<i64> {
    if let Ok(id) = s.parse::<i64>() {
        return Some(id);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}
