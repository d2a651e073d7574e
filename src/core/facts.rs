//! Sales fact builder
//!
//! Turns staged transaction lines into `fct_sales` and `fct_sales_eur`.
//! Per line: value-level filtering with recorded reasons, duplicate
//! collapse, product and customer key resolution, amount computation and
//! the exact-date FX conversion. Returns and cancellations are kept with
//! their negative amounts; only the row-level reject reasons exclude a
//! line.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::info;

use super::fx::convert_to_eur;
use super::quality::report::{RejectReason, RejectionLog, RowRejection};
use crate::domain::errors::StageError;
use crate::domain::ids::{CustomerKey, InvoiceNo, StockCode};
use crate::domain::records::RawTransactionRecord;
use crate::domain::tables::{CustomerRow, FxRateRow, ProductRow, SalesFactEurRow, SalesFactRow};

/// Both fact tables plus everything the build excluded or collapsed
#[derive(Debug, Clone)]
pub struct FactBuild {
    /// `fct_sales` rows in source order
    pub gbp: Vec<SalesFactRow>,

    /// `fct_sales_eur` rows, one per GBP row
    pub eur: Vec<SalesFactEurRow>,

    /// Row-level exclusions with reasons
    pub rejections: RejectionLog,

    /// Exact duplicate lines silently collapsed
    pub collapsed_duplicates: usize,

    /// Lines on cancellation invoices (kept, flagged)
    pub cancellation_lines: usize,

    /// Lines resolved to the unknown customer member
    pub unknown_customer_lines: usize,

    /// Staged lines considered
    pub rows_in: usize,

    /// Fact rows emitted per table
    pub rows_out: usize,
}

/// A line that passed value-level filtering, with its keys typed
struct Candidate<'a> {
    record: &'a RawTransactionRecord,
    invoice_no: InvoiceNo,
    stock_code: StockCode,
    qty: i64,
    unit_price: f64,
}

/// Everything identifying a line except its amounts
///
/// Two lines with equal identity are the same source line: equal amounts
/// collapse to one row, different amounts are a conflict the run cannot
/// resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LineIdentity {
    invoice_no: String,
    stock_code: String,
    description: String,
    date: NaiveDate,
    customer_id: Option<i64>,
    country: String,
}

impl LineIdentity {
    fn of(record: &RawTransactionRecord) -> Self {
        Self {
            invoice_no: record.invoice_no.clone(),
            stock_code: record.stock_code.clone(),
            description: record.description.clone(),
            date: record.invoice_date,
            customer_id: record.customer_id,
            country: record.country.clone(),
        }
    }
}

/// Builds both sales fact tables
///
/// `products` and `customers` are the dimensions built earlier in the
/// same run; `fx_rates` is the filled daily series. Lines whose stock
/// code misses the product dimension are excluded and counted; a missing
/// customer resolves to the unknown member instead.
///
/// # Errors
///
/// Returns [`StageError::ConflictingDuplicate`] when two lines agree on
/// everything but their amounts, and [`StageError::MissingFxRate`] when a
/// surviving line's date has no row in the filled series.
pub fn build_sales_facts(
    records: &[RawTransactionRecord],
    products: &[ProductRow],
    customers: &[CustomerRow],
    fx_rates: &[FxRateRow],
    max_samples: usize,
) -> Result<FactBuild, StageError> {
    let product_keys: HashSet<&str> = products.iter().map(|p| p.stock_code.as_str()).collect();
    let customer_keys: HashSet<CustomerKey> = customers.iter().map(|c| c.customer_id).collect();
    let rates: HashMap<NaiveDate, f64> = fx_rates
        .iter()
        .map(|r| (r.date, r.rate_gbp_per_eur))
        .collect();

    let mut rejections = RejectionLog::new(max_samples);
    let mut collapsed_duplicates = 0usize;

    // value-level filtering, keys typed on the way through
    let mut candidates: Vec<Candidate> = Vec::with_capacity(records.len());
    for record in records {
        let invoice_no = match InvoiceNo::new(record.invoice_no.clone()) {
            Ok(invoice_no) => invoice_no,
            Err(_) => {
                reject(&mut rejections, record, RejectReason::BlankInvoiceNo);
                continue;
            }
        };
        let stock_code = match StockCode::new(record.stock_code.clone()) {
            Ok(stock_code) => stock_code,
            Err(_) => {
                reject(&mut rejections, record, RejectReason::BlankStockCode);
                continue;
            }
        };
        let qty = match record.qty {
            Some(qty) => qty,
            None => {
                reject(&mut rejections, record, RejectReason::MissingQuantity);
                continue;
            }
        };
        let unit_price = match record.unit_price {
            Some(price) => price,
            None => {
                reject(&mut rejections, record, RejectReason::MissingUnitPrice);
                continue;
            }
        };
        if unit_price < 0.0 {
            reject(&mut rejections, record, RejectReason::NegativeUnitPrice);
            continue;
        }
        candidates.push(Candidate {
            record,
            invoice_no,
            stock_code,
            qty,
            unit_price,
        });
    }

    // duplicate collapse; same identity with different amounts is fatal
    let mut seen: HashMap<LineIdentity, (i64, u64)> = HashMap::new();
    let mut deduped: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let identity = LineIdentity::of(candidate.record);
        let amounts = (candidate.qty, candidate.unit_price.to_bits());
        match seen.get(&identity) {
            Some(&prior) if prior == amounts => {
                collapsed_duplicates += 1;
            }
            Some(_) => {
                return Err(StageError::ConflictingDuplicate {
                    invoice_no: candidate.record.invoice_no.clone(),
                    stock_code: candidate.record.stock_code.clone(),
                    line_no: candidate.record.line_no,
                });
            }
            None => {
                seen.insert(identity, amounts);
                deduped.push(candidate);
            }
        }
    }

    let mut gbp = Vec::with_capacity(deduped.len());
    let mut eur = Vec::with_capacity(deduped.len());
    let mut line_seqs: HashMap<(String, String), u32> = HashMap::new();
    let mut cancellation_lines = 0usize;
    let mut unknown_customer_lines = 0usize;

    for candidate in deduped {
        if !product_keys.contains(candidate.stock_code.as_str()) {
            reject(&mut rejections, candidate.record, RejectReason::UnknownProduct);
            continue;
        }

        let mut customer_id = CustomerKey::from_source(candidate.record.customer_id);
        if !customer_keys.contains(&customer_id) {
            customer_id = CustomerKey::UNKNOWN;
        }
        if customer_id.is_unknown() {
            unknown_customer_lines += 1;
        }

        let seq_key = (
            candidate.invoice_no.as_str().to_string(),
            candidate.stock_code.as_str().to_string(),
        );
        let line_seq = line_seqs
            .entry(seq_key)
            .and_modify(|seq| *seq += 1)
            .or_insert(1);

        let date = candidate.record.invoice_date;
        let rate_gbp_per_eur = match rates.get(&date) {
            Some(&rate) => rate,
            None => return Err(StageError::MissingFxRate { date }),
        };

        let is_cancellation = candidate.invoice_no.is_cancellation();
        if is_cancellation {
            cancellation_lines += 1;
        }

        let gross_amount = candidate.qty as f64 * candidate.unit_price;
        gbp.push(SalesFactRow {
            invoice_no: candidate.invoice_no.clone(),
            stock_code: candidate.stock_code.clone(),
            line_seq: *line_seq,
            customer_id,
            date,
            qty: candidate.qty,
            unit_price: candidate.unit_price,
            gross_amount,
            is_cancellation,
        });
        eur.push(SalesFactEurRow {
            invoice_no: candidate.invoice_no,
            stock_code: candidate.stock_code,
            line_seq: *line_seq,
            customer_id,
            date,
            qty: candidate.qty,
            unit_price: candidate.unit_price,
            gross_amount,
            rate_gbp_per_eur,
            gross_amount_eur: convert_to_eur(gross_amount, rate_gbp_per_eur),
            is_cancellation,
        });
    }

    let build = FactBuild {
        rows_in: records.len(),
        rows_out: gbp.len(),
        gbp,
        eur,
        rejections,
        collapsed_duplicates,
        cancellation_lines,
        unknown_customer_lines,
    };

    info!(
        rows_in = build.rows_in,
        rows_out = build.rows_out,
        rejected = build.rejections.total(),
        collapsed_duplicates = build.collapsed_duplicates,
        cancellation_lines = build.cancellation_lines,
        unknown_customer_lines = build.unknown_customer_lines,
        "Built sales facts"
    );

    Ok(build)
}

fn reject(log: &mut RejectionLog, record: &RawTransactionRecord, reason: RejectReason) {
    log.record(RowRejection {
        line_no: record.line_no,
        invoice_no: record.invoice_no.clone(),
        stock_code: record.stock_code.clone(),
        reason,
    });
}
