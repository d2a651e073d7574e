//! Raw ingestion records
//!
//! Fixed-schema typed records handed back by the ingestion adapters and
//! persisted to the staging tables. Fields that source files leave blank
//! or non-numeric arrive as `None`; adjudicating them is the fact
//! builder's job, not the adapters'.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One transaction line item as it appears in the source extract
///
/// String fields are trimmed but otherwise untouched; a blank invoice
/// number or stock code is preserved here and rejected downstream with a
/// recorded reason. The invoice date is mandatory at ingestion because a
/// row without a parseable date cannot be placed on the calendar at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransactionRecord {
    /// Line number in the source file (1-based, header at line 1)
    pub line_no: usize,

    /// Invoice business key; blank when the source omitted it
    pub invoice_no: String,

    /// Product business key; blank when the source omitted it
    pub stock_code: String,

    /// Free-text product description, possibly blank
    pub description: String,

    /// Signed quantity; `None` when missing or non-numeric in the source
    pub qty: Option<i64>,

    /// Transaction date
    pub invoice_date: NaiveDate,

    /// Unit price in GBP; `None` when missing or non-numeric in the source
    pub unit_price: Option<f64>,

    /// Source customer identifier; `None` maps to the unknown member
    pub customer_id: Option<i64>,

    /// Customer country as recorded on the line
    pub country: String,
}

/// One published FX rate observation (market-open days only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxObservation {
    /// Observation date
    pub date: NaiveDate,

    /// GBP per 1 EUR reference rate
    pub rate_gbp_per_eur: f64,
}

/// One UK bank holiday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayRecord {
    /// Holiday date
    pub date: NaiveDate,

    /// Holiday name as published, possibly blank
    pub name: String,
}
