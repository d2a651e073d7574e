//! Warehouse table row types
//!
//! One struct per warehouse table, matching the stored column set exactly.
//! Each table has a single producing builder; everything downstream only
//! reads these rows.

use super::ids::{CustomerKey, InvoiceNo, StockCode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Country recorded for the unknown customer member
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// One row of `dim_product`
///
/// Type 1 dimension: reruns overwrite attributes in place, no history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    /// Product business key, unique within the table
    pub stock_code: StockCode,

    /// Canonical description (most frequent non-blank source description)
    pub description: String,

    /// Earliest transaction date observed for this product
    pub first_seen_date: NaiveDate,

    /// Latest transaction date observed for this product
    pub last_seen_date: NaiveDate,

    /// True when the product appeared on the latest date in the whole extract
    pub is_active: bool,
}

/// One row of `dim_customer`
///
/// Always contains the unknown member ([`CustomerKey::UNKNOWN`],
/// country [`UNKNOWN_COUNTRY`]) exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRow {
    /// Customer surrogate key
    pub customer_id: CustomerKey,

    /// Most frequent country recorded for this customer
    pub country: String,
}

impl CustomerRow {
    /// The synthetic unknown-member row
    pub fn unknown_member() -> Self {
        Self {
            customer_id: CustomerKey::UNKNOWN,
            country: UNKNOWN_COUNTRY.to_string(),
        }
    }
}

/// One row of `dim_calendar`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRow {
    /// Calendar date
    pub date: NaiveDate,

    /// Saturday or Sunday
    pub is_weekend: bool,

    /// Date appears in the ingested UK bank-holiday list
    pub is_uk_holiday: bool,

    /// ISO-8601 week-numbering year
    pub iso_year: i32,

    /// ISO-8601 week number (week 1 contains the first Thursday)
    pub iso_week: u32,
}

/// One row of `daily_fx_rates`
///
/// Exactly one row per calendar date; gaps in the published series are
/// forward-filled and flagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxRateRow {
    /// Calendar date
    pub date: NaiveDate,

    /// GBP per 1 EUR, published or carried forward
    pub rate_gbp_per_eur: f64,

    /// True when the rate was carried forward rather than published
    pub is_interpolated: bool,
}

/// One row of `fct_sales` (amounts in GBP)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesFactRow {
    /// Invoice business key
    pub invoice_no: InvoiceNo,

    /// Product business key, resolvable in `dim_product`
    pub stock_code: StockCode,

    /// 1-based sequence of this (invoice, stock code) pair in source order;
    /// makes the business key unique
    pub line_seq: u32,

    /// Resolved customer key, [`CustomerKey::UNKNOWN`] when the source was null
    pub customer_id: CustomerKey,

    /// Transaction date
    pub date: NaiveDate,

    /// Signed quantity; negative for returns
    pub qty: i64,

    /// Unit price in GBP, non-negative
    pub unit_price: f64,

    /// `qty * unit_price`; negative for returns
    pub gross_amount: f64,

    /// Invoice carries the reserved cancellation prefix
    pub is_cancellation: bool,
}

/// One row of `fct_sales_eur`
///
/// Mirrors [`SalesFactRow`] with the conversion applied on the
/// transaction's exact date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesFactEurRow {
    /// Invoice business key
    pub invoice_no: InvoiceNo,

    /// Product business key
    pub stock_code: StockCode,

    /// 1-based sequence of this (invoice, stock code) pair in source order
    pub line_seq: u32,

    /// Resolved customer key
    pub customer_id: CustomerKey,

    /// Transaction date
    pub date: NaiveDate,

    /// Signed quantity
    pub qty: i64,

    /// Unit price in GBP
    pub unit_price: f64,

    /// Gross amount in GBP
    pub gross_amount: f64,

    /// Rate applied for this date
    pub rate_gbp_per_eur: f64,

    /// `gross_amount / rate_gbp_per_eur`
    pub gross_amount_eur: f64,

    /// Invoice carries the reserved cancellation prefix
    pub is_cancellation: bool,
}

/// One row of `agg_country_day`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryDayRow {
    /// Aggregation date
    pub date: NaiveDate,

    /// Customer country (via the fact's resolved customer)
    pub country: String,

    /// Distinct non-cancellation invoices
    pub orders: i64,

    /// Line items, cancellations included
    pub items: i64,

    /// Net quantity; full returns net to zero
    pub net_qty: i64,

    /// Net revenue in GBP
    pub net_revenue_gbp: f64,

    /// Net revenue in EUR
    pub net_revenue_eur: f64,
}

/// Name and cardinality of one stored table, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table name
    pub name: String,

    /// Row count
    pub rows: i64,
}
