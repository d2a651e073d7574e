//! Dimension builders
//!
//! Derives `dim_product` and `dim_customer` from the staged transaction
//! rows. Both builders are pure functions of their input and emit rows
//! sorted by business key, so rerunning on the same input reproduces the
//! tables byte for byte.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;

use crate::domain::errors::StageError;
use crate::domain::ids::{CustomerKey, StockCode};
use crate::domain::records::RawTransactionRecord;
use crate::domain::tables::{CustomerRow, ProductRow, UNKNOWN_COUNTRY};

/// Product dimension rows plus what was dropped building them
#[derive(Debug, Clone)]
pub struct ProductBuild {
    /// Rows sorted by stock code
    pub rows: Vec<ProductRow>,

    /// Source lines skipped for a blank stock code
    pub dropped_blank_codes: usize,
}

#[derive(Debug)]
struct ProductAcc {
    descriptions: BTreeMap<String, DescriptionVote>,
    first_seen: NaiveDate,
    last_seen: NaiveDate,
}

#[derive(Debug)]
struct DescriptionVote {
    count: usize,
    first_line: usize,
}

/// Builds `dim_product` from staged transaction rows
///
/// Groups lines by stock code. The canonical description is the most
/// frequent non-blank one, breaking ties for the description seen first
/// in source line order. A product is active when its latest line falls
/// on the latest date anywhere in the extract. Lines with a blank stock
/// code are skipped and counted, not fatal.
///
/// # Errors
///
/// Returns [`StageError::DuplicateSurrogateKey`] if a stock code ends up
/// in the output twice.
pub fn build_product_dimension(
    records: &[RawTransactionRecord],
) -> Result<ProductBuild, StageError> {
    let max_date = records.iter().map(|r| r.invoice_date).max();

    let mut groups: BTreeMap<StockCode, ProductAcc> = BTreeMap::new();
    let mut dropped_blank_codes = 0usize;

    for record in records {
        let code = match StockCode::new(record.stock_code.clone()) {
            Ok(code) => code,
            Err(_) => {
                dropped_blank_codes += 1;
                continue;
            }
        };

        let acc = groups.entry(code).or_insert_with(|| ProductAcc {
            descriptions: BTreeMap::new(),
            first_seen: record.invoice_date,
            last_seen: record.invoice_date,
        });
        acc.first_seen = acc.first_seen.min(record.invoice_date);
        acc.last_seen = acc.last_seen.max(record.invoice_date);

        if !record.description.is_empty() {
            let vote = acc
                .descriptions
                .entry(record.description.clone())
                .or_insert(DescriptionVote {
                    count: 0,
                    first_line: record.line_no,
                });
            vote.count += 1;
        }
    }

    let rows: Vec<ProductRow> = groups
        .into_iter()
        .map(|(stock_code, acc)| ProductRow {
            stock_code,
            description: canonical_description(&acc.descriptions),
            first_seen_date: acc.first_seen,
            last_seen_date: acc.last_seen,
            is_active: Some(acc.last_seen) == max_date,
        })
        .collect();

    ensure_unique(rows.iter().map(|r| r.stock_code.as_str()), "dim_product")?;

    info!(
        products = rows.len(),
        dropped_blank_codes, "Built product dimension"
    );

    Ok(ProductBuild {
        rows,
        dropped_blank_codes,
    })
}

/// Builds `dim_customer` from staged transaction rows
///
/// Groups lines by source customer id. A customer's country is the most
/// frequent non-blank one on their lines, breaking ties alphabetically.
/// Lines with no id (or a negative one) fold into the unknown member,
/// which is always present exactly once with country `Unknown`.
///
/// # Errors
///
/// Returns [`StageError::DuplicateSurrogateKey`] if a customer key ends
/// up in the output twice.
pub fn build_customer_dimension(
    records: &[RawTransactionRecord],
) -> Result<Vec<CustomerRow>, StageError> {
    let mut groups: BTreeMap<CustomerKey, BTreeMap<String, usize>> = BTreeMap::new();

    for record in records {
        let key = CustomerKey::from_source(record.customer_id);
        if key.is_unknown() {
            // the unknown member's country is fixed; no votes collected
            continue;
        }
        let countries = groups.entry(key).or_default();
        if !record.country.is_empty() {
            *countries.entry(record.country.clone()).or_insert(0) += 1;
        }
    }

    let mut rows = Vec::with_capacity(groups.len() + 1);
    rows.push(CustomerRow::unknown_member());
    for (customer_id, countries) in groups {
        rows.push(CustomerRow {
            customer_id,
            country: canonical_country(&countries),
        });
    }

    ensure_unique(
        rows.iter().map(|r| r.customer_id.value().to_string()),
        "dim_customer",
    )?;

    info!(customers = rows.len(), "Built customer dimension");

    Ok(rows)
}

/// Most frequent description, ties to the one seen first in line order
fn canonical_description(votes: &BTreeMap<String, DescriptionVote>) -> String {
    let mut best: Option<(&str, &DescriptionVote)> = None;
    for (description, vote) in votes {
        let wins = match best {
            None => true,
            Some((_, b)) => {
                vote.count > b.count || (vote.count == b.count && vote.first_line < b.first_line)
            }
        };
        if wins {
            best = Some((description, vote));
        }
    }
    best.map(|(d, _)| d.to_string()).unwrap_or_default()
}

/// Most frequent country, ties alphabetically first
fn canonical_country(votes: &BTreeMap<String, usize>) -> String {
    let mut best: Option<(&str, usize)> = None;
    // alphabetical iteration, so a strict > keeps the earlier name on ties
    for (country, &count) in votes {
        if best.map(|(_, c)| count > c).unwrap_or(true) {
            best = Some((country, count));
        }
    }
    best.map(|(c, _)| c.to_string())
        .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string())
}

fn ensure_unique<I>(keys: I, dimension: &str) -> Result<(), StageError>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for key in keys {
        *counts.entry(key.into()).or_insert(0) += 1;
    }
    for (key, count) in counts {
        if count > 1 {
            return Err(StageError::DuplicateSurrogateKey {
                dimension: dimension.to_string(),
                key,
                count,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn line(
        line_no: usize,
        stock_code: &str,
        description: &str,
        customer_id: Option<i64>,
        country: &str,
        invoice_date: NaiveDate,
    ) -> RawTransactionRecord {
        RawTransactionRecord {
            line_no,
            invoice_no: "536365".to_string(),
            stock_code: stock_code.to_string(),
            description: description.to_string(),
            qty: Some(6),
            invoice_date,
            unit_price: Some(2.55),
            customer_id,
            country: country.to_string(),
        }
    }

    #[test]
    fn test_product_groups_by_stock_code() {
        let records = vec![
            line(2, "85123A", "WHITE HANGING HEART", Some(17850), "United Kingdom", date(2010, 12, 1)),
            line(3, "85123A", "WHITE HANGING HEART", Some(17850), "United Kingdom", date(2010, 12, 3)),
            line(4, "22423", "REGENCY CAKESTAND", Some(13047), "France", date(2010, 12, 2)),
        ];

        let build = build_product_dimension(&records).unwrap();
        assert_eq!(build.rows.len(), 2);
        assert_eq!(build.dropped_blank_codes, 0);

        // sorted by stock code
        assert_eq!(build.rows[0].stock_code.as_str(), "22423");
        assert_eq!(build.rows[1].stock_code.as_str(), "85123A");

        let heart = &build.rows[1];
        assert_eq!(heart.first_seen_date, date(2010, 12, 1));
        assert_eq!(heart.last_seen_date, date(2010, 12, 3));
    }

    #[test]
    fn test_product_description_most_frequent_wins() {
        let records = vec![
            line(2, "85123A", "WHITE HEART", None, "", date(2010, 12, 1)),
            line(3, "85123A", "WHITE HANGING HEART", None, "", date(2010, 12, 1)),
            line(4, "85123A", "WHITE HANGING HEART", None, "", date(2010, 12, 2)),
        ];

        let build = build_product_dimension(&records).unwrap();
        assert_eq!(build.rows[0].description, "WHITE HANGING HEART");
    }

    #[test]
    fn test_product_description_tie_breaks_to_first_seen() {
        let records = vec![
            line(2, "85123A", "CREAM HEART", None, "", date(2010, 12, 2)),
            line(3, "85123A", "WHITE HEART", None, "", date(2010, 12, 1)),
        ];

        let build = build_product_dimension(&records).unwrap();
        // equal counts; line 2 came first
        assert_eq!(build.rows[0].description, "CREAM HEART");
    }

    #[test]
    fn test_product_blank_descriptions_never_win() {
        let records = vec![
            line(2, "85123A", "", None, "", date(2010, 12, 1)),
            line(3, "85123A", "", None, "", date(2010, 12, 1)),
            line(4, "85123A", "WHITE HEART", None, "", date(2010, 12, 2)),
        ];

        let build = build_product_dimension(&records).unwrap();
        assert_eq!(build.rows[0].description, "WHITE HEART");
    }

    #[test]
    fn test_product_all_blank_descriptions() {
        let records = vec![line(2, "85123A", "", None, "", date(2010, 12, 1))];
        let build = build_product_dimension(&records).unwrap();
        assert_eq!(build.rows[0].description, "");
    }

    #[test]
    fn test_product_blank_stock_codes_dropped_and_counted() {
        let records = vec![
            line(2, "", "MYSTERY ITEM", None, "", date(2010, 12, 1)),
            line(3, "85123A", "WHITE HEART", None, "", date(2010, 12, 1)),
        ];

        let build = build_product_dimension(&records).unwrap();
        assert_eq!(build.rows.len(), 1);
        assert_eq!(build.dropped_blank_codes, 1);
    }

    #[test]
    fn test_product_is_active_on_latest_extract_date() {
        let records = vec![
            line(2, "85123A", "WHITE HEART", None, "", date(2010, 12, 1)),
            line(3, "22423", "CAKESTAND", None, "", date(2010, 12, 9)),
        ];

        let build = build_product_dimension(&records).unwrap();
        let by_code = |code: &str| {
            build
                .rows
                .iter()
                .find(|r| r.stock_code.as_str() == code)
                .unwrap()
        };
        assert!(by_code("22423").is_active);
        assert!(!by_code("85123A").is_active);
    }

    #[test]
    fn test_product_dimension_is_deterministic() {
        let records = vec![
            line(2, "22423", "CAKESTAND", None, "", date(2010, 12, 2)),
            line(3, "85123A", "WHITE HEART", None, "", date(2010, 12, 1)),
            line(4, "85123A", "WHITE HEART", None, "", date(2010, 12, 3)),
        ];

        let first = build_product_dimension(&records).unwrap();
        let second = build_product_dimension(&records).unwrap();
        assert_eq!(first.rows, second.rows);
    }

    #[test]
    fn test_customer_country_most_frequent_wins() {
        let records = vec![
            line(2, "85123A", "X", Some(17850), "United Kingdom", date(2010, 12, 1)),
            line(3, "85123A", "X", Some(17850), "United Kingdom", date(2010, 12, 2)),
            line(4, "85123A", "X", Some(17850), "France", date(2010, 12, 3)),
        ];

        let rows = build_customer_dimension(&records).unwrap();
        let row = rows
            .iter()
            .find(|r| r.customer_id.value() == 17850)
            .unwrap();
        assert_eq!(row.country, "United Kingdom");
    }

    #[test]
    fn test_customer_country_tie_breaks_alphabetically() {
        let records = vec![
            line(2, "85123A", "X", Some(12583), "Norway", date(2010, 12, 1)),
            line(3, "85123A", "X", Some(12583), "France", date(2010, 12, 2)),
        ];

        let rows = build_customer_dimension(&records).unwrap();
        let row = rows
            .iter()
            .find(|r| r.customer_id.value() == 12583)
            .unwrap();
        assert_eq!(row.country, "France");
    }

    #[test]
    fn test_customer_blank_countries_fall_back_to_unknown() {
        let records = vec![line(2, "85123A", "X", Some(12583), "", date(2010, 12, 1))];

        let rows = build_customer_dimension(&records).unwrap();
        let row = rows
            .iter()
            .find(|r| r.customer_id.value() == 12583)
            .unwrap();
        assert_eq!(row.country, UNKNOWN_COUNTRY);
    }

    #[test]
    fn test_customer_unknown_member_always_present_once() {
        let with_nulls = vec![
            line(2, "85123A", "X", None, "United Kingdom", date(2010, 12, 1)),
            line(3, "85123A", "X", Some(-5), "France", date(2010, 12, 1)),
        ];
        let rows = build_customer_dimension(&with_nulls).unwrap();
        let unknowns: Vec<_> = rows.iter().filter(|r| r.customer_id.is_unknown()).collect();
        assert_eq!(unknowns.len(), 1);
        assert_eq!(unknowns[0].country, UNKNOWN_COUNTRY);
        // null and negative ids fold in rather than getting their own rows
        assert_eq!(rows.len(), 1);

        let without_nulls = vec![line(2, "85123A", "X", Some(17850), "United Kingdom", date(2010, 12, 1))];
        let rows = build_customer_dimension(&without_nulls).unwrap();
        assert!(rows.iter().any(|r| r.customer_id.is_unknown()));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_customer_rows_sorted_by_key() {
        let records = vec![
            line(2, "85123A", "X", Some(17850), "United Kingdom", date(2010, 12, 1)),
            line(3, "85123A", "X", Some(12583), "France", date(2010, 12, 1)),
            line(4, "85123A", "X", None, "", date(2010, 12, 1)),
        ];

        let rows = build_customer_dimension(&records).unwrap();
        let keys: Vec<i64> = rows.iter().map(|r| r.customer_id.value()).collect();
        assert_eq!(keys, vec![-1, 12583, 17850]);
    }

    #[test]
    fn test_empty_input_builds_empty_product_dimension() {
        let build = build_product_dimension(&[]).unwrap();
        assert!(build.rows.is_empty());

        // the unknown member exists even with no customers at all
        let rows = build_customer_dimension(&[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].customer_id.is_unknown());
    }
}
