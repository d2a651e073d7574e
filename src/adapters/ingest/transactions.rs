//! Transaction extract adapter
//!
//! Reads the retail line-item extract. Every data row must carry a
//! parseable invoice date; everything else is passed through as recorded,
//! with blank or non-numeric values mapped to empty strings / `None`.

use std::path::Path;

use tracing::info;

use crate::domain::errors::IngestError;
use crate::domain::records::RawTransactionRecord;

use super::{
    build_header_map, field, open_reader, parse_customer_id, parse_date, parse_finite_f64,
    parse_i64, require_columns,
};

const REQUIRED_COLUMNS: [&str; 8] = [
    "invoiceno",
    "stockcode",
    "description",
    "quantity",
    "invoicedate",
    "unitprice",
    "customerid",
    "country",
];

/// Reads the transaction extract at `path` in source order.
pub fn read_transactions(path: &Path) -> Result<Vec<RawTransactionRecord>, IngestError> {
    let path_display = path.display().to_string();
    let mut reader = open_reader(path)?;

    let headers = reader
        .headers()
        .map_err(|e| IngestError::FileUnreadable {
            path: path_display.clone(),
            message: format!("failed to read headers: {e}"),
        })?
        .clone();
    let header_map = build_header_map(&headers);
    require_columns(&path_display, &header_map, &REQUIRED_COLUMNS)?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header row; file lines are 1-based
        let line = idx + 2;
        let record = result.map_err(|e| IngestError::MalformedRecord {
            path: path_display.clone(),
            line,
            message: e.to_string(),
        })?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let date_raw = field(&record, &header_map, "invoicedate").unwrap_or("");
        let invoice_date = parse_date(date_raw).ok_or_else(|| IngestError::InvalidDate {
            path: path_display.clone(),
            line,
            value: date_raw.to_string(),
        })?;

        records.push(RawTransactionRecord {
            line_no: line,
            invoice_no: field(&record, &header_map, "invoiceno")
                .unwrap_or_default()
                .to_string(),
            stock_code: field(&record, &header_map, "stockcode")
                .unwrap_or_default()
                .to_string(),
            description: field(&record, &header_map, "description")
                .unwrap_or_default()
                .to_string(),
            qty: field(&record, &header_map, "quantity").and_then(parse_i64),
            invoice_date,
            unit_price: field(&record, &header_map, "unitprice").and_then(parse_finite_f64),
            customer_id: field(&record, &header_map, "customerid").and_then(parse_customer_id),
            country: field(&record, &header_map, "country")
                .unwrap_or_default()
                .to_string(),
        });
    }

    info!(
        path = %path_display,
        rows = records.len(),
        "Ingested transaction extract"
    );
    Ok(records)
}
