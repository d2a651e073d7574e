//! Stage validation rules
//!
//! One check function per builder stage, each returning a
//! [`ValidationReport`] the orchestrator gates on. Fatal rules cover key
//! integrity and consistency; profiling rules only inform.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;

use super::report::{CheckResult, Severity, ValidationReport};
use crate::core::calendar::DateSpan;
use crate::domain::ids::CustomerKey;
use crate::domain::tables::{
    CalendarRow, CountryDayRow, CustomerRow, FxRateRow, ProductRow, SalesFactEurRow, SalesFactRow,
    UNKNOWN_COUNTRY,
};

/// Tunable thresholds for the validators
#[derive(Debug, Clone)]
pub struct ValidationSettings {
    /// Maximum allowed `|gross_gbp - gross_eur * rate|` per fact row
    pub fx_round_trip_tolerance: f64,

    /// Offending keys kept per failed rule
    pub max_sample_keys: usize,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            fx_round_trip_tolerance: 1e-6,
            max_sample_keys: 5,
        }
    }
}

/// Validates the built calendar against its span
pub fn check_calendar(
    rows: &[CalendarRow],
    span: DateSpan,
    settings: &ValidationSettings,
) -> ValidationReport {
    let mut report = ValidationReport::new("calendar");
    report.push(coverage_check(
        "dim_calendar.complete_coverage",
        rows.iter().map(|r| r.date),
        rows.len(),
        span,
        settings,
    ));
    report
}

/// Validates both dimensions
pub fn check_dimensions(
    products: &[ProductRow],
    customers: &[CustomerRow],
    settings: &ValidationSettings,
) -> ValidationReport {
    let mut report = ValidationReport::new("dimensions");

    report.push(unique_key_check(
        "dim_product.unique_business_key",
        products.iter().map(|p| p.stock_code.as_str().to_string()),
        settings,
    ));
    report.push(unique_key_check(
        "dim_customer.unique_business_key",
        customers.iter().map(|c| c.customer_id.value().to_string()),
        settings,
    ));

    let unknown_members: Vec<&CustomerRow> = customers
        .iter()
        .filter(|c| c.customer_id.is_unknown())
        .collect();
    let well_formed =
        unknown_members.len() == 1 && unknown_members[0].country == UNKNOWN_COUNTRY;
    report.push(if well_formed {
        CheckResult::pass("dim_customer.unknown_member_present", Severity::Fatal)
    } else {
        CheckResult::fail(
            "dim_customer.unknown_member_present",
            Severity::Fatal,
            unknown_members.len(),
            unknown_members
                .iter()
                .take(settings.max_sample_keys)
                .map(|c| format!("{}:{}", c.customer_id, c.country))
                .collect(),
        )
    });

    report
}

/// Validates the filled FX series against its span
pub fn check_fx_series(
    rows: &[FxRateRow],
    span: DateSpan,
    settings: &ValidationSettings,
) -> ValidationReport {
    let mut report = ValidationReport::new("fx");

    report.push(coverage_check(
        "daily_fx_rates.complete_coverage",
        rows.iter().map(|r| r.date),
        rows.len(),
        span,
        settings,
    ));

    let bad: Vec<&FxRateRow> = rows
        .iter()
        .filter(|r| !(r.rate_gbp_per_eur.is_finite() && r.rate_gbp_per_eur > 0.0))
        .collect();
    report.push(if bad.is_empty() {
        CheckResult::pass("daily_fx_rates.positive_rates", Severity::Fatal)
    } else {
        CheckResult::fail(
            "daily_fx_rates.positive_rates",
            Severity::Fatal,
            bad.len(),
            bad.iter()
                .take(settings.max_sample_keys)
                .map(|r| r.date.to_string())
                .collect(),
        )
    });

    report
}

/// Validates both fact tables against the dimensions and each other
pub fn check_facts(
    gbp: &[SalesFactRow],
    eur: &[SalesFactEurRow],
    products: &[ProductRow],
    customers: &[CustomerRow],
    settings: &ValidationSettings,
) -> ValidationReport {
    let mut report = ValidationReport::new("facts");

    let product_keys: HashSet<&str> = products.iter().map(|p| p.stock_code.as_str()).collect();
    let customer_keys: HashSet<CustomerKey> = customers.iter().map(|c| c.customer_id).collect();

    let orphans: Vec<&SalesFactRow> = gbp
        .iter()
        .filter(|r| !product_keys.contains(r.stock_code.as_str()))
        .collect();
    report.push(if orphans.is_empty() {
        CheckResult::pass("fct_sales.product_fk", Severity::Fatal)
    } else {
        CheckResult::fail(
            "fct_sales.product_fk",
            Severity::Fatal,
            orphans.len(),
            orphans
                .iter()
                .take(settings.max_sample_keys)
                .map(|r| r.stock_code.as_str().to_string())
                .collect(),
        )
    });

    let orphans: Vec<&SalesFactRow> = gbp
        .iter()
        .filter(|r| !customer_keys.contains(&r.customer_id))
        .collect();
    report.push(if orphans.is_empty() {
        CheckResult::pass("fct_sales.customer_fk", Severity::Fatal)
    } else {
        CheckResult::fail(
            "fct_sales.customer_fk",
            Severity::Fatal,
            orphans.len(),
            orphans
                .iter()
                .take(settings.max_sample_keys)
                .map(|r| r.customer_id.to_string())
                .collect(),
        )
    });

    report.push(unique_key_check(
        "fct_sales.unique_business_key",
        gbp.iter().map(business_key),
        settings,
    ));

    let negative: Vec<&SalesFactRow> = gbp.iter().filter(|r| r.unit_price < 0.0).collect();
    report.push(if negative.is_empty() {
        CheckResult::pass("fct_sales.non_negative_unit_price", Severity::Fatal)
    } else {
        CheckResult::fail(
            "fct_sales.non_negative_unit_price",
            Severity::Fatal,
            negative.len(),
            negative
                .iter()
                .take(settings.max_sample_keys)
                .map(|r| business_key(r))
                .collect(),
        )
    });

    let gbp_keys: BTreeSet<String> = gbp.iter().map(business_key).collect();
    let eur_keys: BTreeSet<String> = eur.iter().map(eur_business_key).collect();
    let missing: Vec<&String> = gbp_keys.difference(&eur_keys).collect();
    let extra: Vec<&String> = eur_keys.difference(&gbp_keys).collect();
    report.push(if missing.is_empty() && extra.is_empty() {
        CheckResult::pass("fct_sales_eur.mirror_complete", Severity::Fatal)
    } else {
        CheckResult::fail(
            "fct_sales_eur.mirror_complete",
            Severity::Fatal,
            missing.len() + extra.len(),
            missing
                .iter()
                .chain(extra.iter())
                .take(settings.max_sample_keys)
                .map(|k| k.to_string())
                .collect(),
        )
    });

    let breaches: Vec<&SalesFactEurRow> = eur
        .iter()
        .filter(|r| {
            (r.gross_amount - r.gross_amount_eur * r.rate_gbp_per_eur).abs()
                >= settings.fx_round_trip_tolerance
        })
        .collect();
    report.push(if breaches.is_empty() {
        CheckResult::pass("fct_sales_eur.fx_round_trip", Severity::Fatal)
    } else {
        CheckResult::fail(
            "fct_sales_eur.fx_round_trip",
            Severity::Fatal,
            breaches.len(),
            breaches
                .iter()
                .take(settings.max_sample_keys)
                .map(|r| eur_business_key(r))
                .collect(),
        )
    });

    report
}

/// Validates the rollup's key and reconciles its totals with the facts
pub fn check_aggregates(
    agg: &[CountryDayRow],
    gbp: &[SalesFactRow],
    settings: &ValidationSettings,
) -> ValidationReport {
    let mut report = ValidationReport::new("aggregates");

    report.push(unique_key_check(
        "agg_country_day.unique_key",
        agg.iter().map(|r| format!("{}/{}", r.date, r.country)),
        settings,
    ));

    let agg_qty: i64 = agg.iter().map(|r| r.net_qty).sum();
    let fact_qty: i64 = gbp.iter().map(|r| r.qty).sum();
    let agg_revenue: f64 = agg.iter().map(|r| r.net_revenue_gbp).sum();
    let fact_revenue: f64 = gbp.iter().map(|r| r.gross_amount).sum();

    // profiling only: summation order differs between the two totals,
    // so allow a relative tolerance
    let revenue_tolerance = 1e-6 * (1.0 + fact_revenue.abs());
    let mut drift = Vec::new();
    if agg_qty != fact_qty {
        drift.push(format!("net_qty: agg={agg_qty} facts={fact_qty}"));
    }
    if (agg_revenue - fact_revenue).abs() > revenue_tolerance {
        drift.push(format!(
            "net_revenue_gbp: agg={agg_revenue} facts={fact_revenue}"
        ));
    }
    report.push(if drift.is_empty() {
        CheckResult::pass("agg_country_day.reconciles_with_facts", Severity::Informational)
    } else {
        CheckResult::fail(
            "agg_country_day.reconciles_with_facts",
            Severity::Informational,
            drift.len(),
            drift,
        )
    });

    report
}

fn business_key(row: &SalesFactRow) -> String {
    format!("{}/{}/{}", row.invoice_no, row.stock_code, row.line_seq)
}

fn eur_business_key(row: &SalesFactEurRow) -> String {
    format!("{}/{}/{}", row.invoice_no, row.stock_code, row.line_seq)
}

fn coverage_check(
    rule: &str,
    dates: impl Iterator<Item = NaiveDate>,
    row_count: usize,
    span: DateSpan,
    settings: &ValidationSettings,
) -> CheckResult {
    let present: BTreeSet<NaiveDate> = dates.collect();
    let missing: Vec<NaiveDate> = span.iter().filter(|d| !present.contains(d)).collect();
    let outside = present.iter().filter(|d| !span.contains(**d)).count();
    let duplicated = row_count - present.len();

    let affected = missing.len() + outside + duplicated;
    if affected == 0 {
        CheckResult::pass(rule, Severity::Fatal)
    } else {
        CheckResult::fail(
            rule,
            Severity::Fatal,
            affected,
            missing
                .iter()
                .take(settings.max_sample_keys)
                .map(|d| d.to_string())
                .collect(),
        )
    }
}

fn unique_key_check(
    rule: &str,
    keys: impl Iterator<Item = String>,
    settings: &ValidationSettings,
) -> CheckResult {
    let mut counts: std::collections::BTreeMap<String, usize> = std::collections::BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    let duplicated: Vec<(&String, &usize)> = counts.iter().filter(|(_, &c)| c > 1).collect();
    if duplicated.is_empty() {
        CheckResult::pass(rule, Severity::Fatal)
    } else {
        let affected = duplicated.iter().map(|(_, &c)| c - 1).sum();
        CheckResult::fail(
            rule,
            Severity::Fatal,
            affected,
            duplicated
                .iter()
                .take(settings.max_sample_keys)
                .map(|(k, _)| k.to_string())
                .collect(),
        )
    }
}
