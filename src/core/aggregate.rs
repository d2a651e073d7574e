//! Daily country rollup
//!
//! Recomputes `agg_country_day` wholesale from the EUR fact table, which
//! carries both currencies. Net figures include cancellation lines, so a
//! fully returned invoice nets to zero; order counts exclude them.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use tracing::info;

use crate::domain::ids::CustomerKey;
use crate::domain::tables::{CountryDayRow, CustomerRow, SalesFactEurRow, UNKNOWN_COUNTRY};

#[derive(Debug, Default)]
struct DayAcc {
    invoices: HashSet<String>,
    items: i64,
    net_qty: i64,
    net_revenue_gbp: f64,
    net_revenue_eur: f64,
}

/// Builds `agg_country_day` from facts, resolving country via the
/// customer dimension
///
/// Rows come back sorted by date then country. Facts on the unknown
/// member land under the `Unknown` country.
pub fn build_country_day(
    facts: &[SalesFactEurRow],
    customers: &[CustomerRow],
) -> Vec<CountryDayRow> {
    let countries: BTreeMap<CustomerKey, &str> = customers
        .iter()
        .map(|c| (c.customer_id, c.country.as_str()))
        .collect();

    let mut groups: BTreeMap<(NaiveDate, String), DayAcc> = BTreeMap::new();
    for fact in facts {
        let country = countries
            .get(&fact.customer_id)
            .copied()
            .unwrap_or(UNKNOWN_COUNTRY);
        let acc = groups
            .entry((fact.date, country.to_string()))
            .or_default();

        if !fact.is_cancellation {
            acc.invoices.insert(fact.invoice_no.as_str().to_string());
        }
        acc.items += 1;
        acc.net_qty += fact.qty;
        acc.net_revenue_gbp += fact.gross_amount;
        acc.net_revenue_eur += fact.gross_amount_eur;
    }

    let rows: Vec<CountryDayRow> = groups
        .into_iter()
        .map(|((date, country), acc)| CountryDayRow {
            date,
            country,
            orders: acc.invoices.len() as i64,
            items: acc.items,
            net_qty: acc.net_qty,
            net_revenue_gbp: acc.net_revenue_gbp,
            net_revenue_eur: acc.net_revenue_eur,
        })
        .collect();

    info!(
        groups = rows.len(),
        facts = facts.len(),
        "Built country-day rollup"
    );

    rows
}
