//! FX rate enrichment
//!
//! Turns the irregular published rate observations into a complete daily
//! series across the calendar span. The fill is an explicit two-pass
//! algorithm: first the full date skeleton, then a forward walk that
//! carries the last published rate into gaps and flags the copies.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;

use super::calendar::DateSpan;
use crate::domain::errors::StageError;
use crate::domain::records::FxObservation;
use crate::domain::tables::FxRateRow;

/// The filled daily series plus fill statistics
#[derive(Debug, Clone)]
pub struct FxBuild {
    /// One row per calendar date in span order
    pub rows: Vec<FxRateRow>,

    /// Days carrying a published observation
    pub observed_days: usize,

    /// Days carrying a forward-filled copy
    pub filled_days: usize,
}

/// Builds `daily_fx_rates` for `span` from raw observations
///
/// Observations on the same date collapse to the last one read. The day
/// the span opens needs a rate at or on that date; when the market was
/// closed, the nearest prior observation seeds the fill and that day is
/// flagged as interpolated like any other gap day.
///
/// # Errors
///
/// Returns [`StageError::FxCoverageGap`] when no observation exists at or
/// before the span start, and [`StageError::InvalidFxRate`] when a rate
/// that would enter the series is non-positive or non-finite.
pub fn build_fx_series(
    observations: &[FxObservation],
    span: DateSpan,
) -> Result<FxBuild, StageError> {
    let mut observed: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for obs in observations {
        observed.insert(obs.date, obs.rate_gbp_per_eur);
    }

    // seed, in case the span opens on a market-closed day
    let seed = observed
        .range(..=span.start)
        .next_back()
        .map(|(date, rate)| (*date, *rate))
        .ok_or_else(|| StageError::FxCoverageGap {
            span_start: span.start,
            earliest: observed
                .keys()
                .next()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "none".to_string()),
        })?;
    ensure_valid_rate(seed.0, seed.1)?;

    let mut rows = Vec::with_capacity(span.days() as usize);
    let mut carry = seed.1;
    let mut observed_days = 0usize;
    let mut filled_days = 0usize;

    for date in span.iter() {
        match observed.get(&date) {
            Some(&rate) => {
                ensure_valid_rate(date, rate)?;
                carry = rate;
                observed_days += 1;
                rows.push(FxRateRow {
                    date,
                    rate_gbp_per_eur: rate,
                    is_interpolated: false,
                });
            }
            None => {
                filled_days += 1;
                rows.push(FxRateRow {
                    date,
                    rate_gbp_per_eur: carry,
                    is_interpolated: true,
                });
            }
        }
    }

    let mut min_rate = f64::INFINITY;
    let mut max_rate = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for row in &rows {
        min_rate = min_rate.min(row.rate_gbp_per_eur);
        max_rate = max_rate.max(row.rate_gbp_per_eur);
        sum += row.rate_gbp_per_eur;
    }
    info!(
        days = rows.len(),
        observed_days,
        filled_days,
        min_rate,
        max_rate,
        avg_rate = sum / rows.len() as f64,
        "Built daily FX series"
    );

    Ok(FxBuild {
        rows,
        observed_days,
        filled_days,
    })
}

/// Converts a GBP amount with the day's GBP-per-EUR rate
pub fn convert_to_eur(amount_gbp: f64, rate_gbp_per_eur: f64) -> f64 {
    amount_gbp / rate_gbp_per_eur
}

fn ensure_valid_rate(date: NaiveDate, rate: f64) -> Result<(), StageError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(StageError::InvalidFxRate { date, rate })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn obs(d: NaiveDate, rate: f64) -> FxObservation {
        FxObservation {
            date: d,
            rate_gbp_per_eur: rate,
        }
    }

    fn span(start: NaiveDate, end: NaiveDate) -> DateSpan {
        DateSpan { start, end }
    }

    #[test]
    fn test_gap_days_carry_prior_rate() {
        let observations = vec![obs(date(2010, 1, 4), 0.85), obs(date(2010, 1, 7), 0.86)];
        let build =
            build_fx_series(&observations, span(date(2010, 1, 4), date(2010, 1, 7))).unwrap();

        assert_eq!(build.rows.len(), 4);
        assert_eq!(build.observed_days, 2);
        assert_eq!(build.filled_days, 2);

        assert_eq!(build.rows[0].rate_gbp_per_eur, 0.85);
        assert!(!build.rows[0].is_interpolated);

        // 2010-01-05 and 2010-01-06 carry the 0.85 from the 4th
        for row in &build.rows[1..3] {
            assert_eq!(row.rate_gbp_per_eur, 0.85);
            assert!(row.is_interpolated);
        }

        assert_eq!(build.rows[3].rate_gbp_per_eur, 0.86);
        assert!(!build.rows[3].is_interpolated);
    }

    #[test]
    fn test_span_start_seeds_from_prior_observation() {
        let observations = vec![obs(date(2010, 1, 1), 0.84), obs(date(2010, 1, 6), 0.86)];
        let build =
            build_fx_series(&observations, span(date(2010, 1, 4), date(2010, 1, 6))).unwrap();

        assert_eq!(build.rows[0].date, date(2010, 1, 4));
        assert_eq!(build.rows[0].rate_gbp_per_eur, 0.84);
        assert!(build.rows[0].is_interpolated);
    }

    #[test]
    fn test_no_observation_at_or_before_start_fails() {
        let observations = vec![obs(date(2010, 2, 1), 0.85)];
        let err =
            build_fx_series(&observations, span(date(2010, 1, 4), date(2010, 1, 7))).unwrap_err();
        match err {
            StageError::FxCoverageGap {
                span_start,
                earliest,
            } => {
                assert_eq!(span_start, date(2010, 1, 4));
                assert_eq!(earliest, "2010-02-01");
            }
            other => panic!("expected FxCoverageGap, got {other:?}"),
        }
    }

    #[test]
    fn test_no_observations_at_all_fails() {
        let err = build_fx_series(&[], span(date(2010, 1, 4), date(2010, 1, 7))).unwrap_err();
        assert!(matches!(err, StageError::FxCoverageGap { .. }));
    }

    #[test]
    fn test_full_coverage_no_gaps() {
        let observations = vec![obs(date(2010, 1, 1), 0.85)];
        let s = span(date(2010, 1, 1), date(2010, 1, 31));
        let build = build_fx_series(&observations, s).unwrap();

        assert_eq!(build.rows.len() as i64, s.days());
        let mut expected = s.start;
        for row in &build.rows {
            assert_eq!(row.date, expected);
            expected = expected.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_non_positive_rate_fails() {
        let observations = vec![obs(date(2010, 1, 4), 0.85), obs(date(2010, 1, 5), -0.2)];
        let err =
            build_fx_series(&observations, span(date(2010, 1, 4), date(2010, 1, 7))).unwrap_err();
        assert!(matches!(
            err,
            StageError::InvalidFxRate { rate, .. } if rate == -0.2
        ));

        let observations = vec![obs(date(2010, 1, 4), f64::NAN)];
        let err =
            build_fx_series(&observations, span(date(2010, 1, 4), date(2010, 1, 4))).unwrap_err();
        assert!(matches!(err, StageError::InvalidFxRate { .. }));
    }

    #[test]
    fn test_duplicate_observation_dates_last_wins() {
        let observations = vec![obs(date(2010, 1, 4), 0.85), obs(date(2010, 1, 4), 0.87)];
        let build =
            build_fx_series(&observations, span(date(2010, 1, 4), date(2010, 1, 4))).unwrap();
        assert_eq!(build.rows[0].rate_gbp_per_eur, 0.87);
    }

    #[test]
    fn test_observations_past_span_end_ignored() {
        let observations = vec![obs(date(2010, 1, 4), 0.85), obs(date(2010, 3, 1), 0.90)];
        let build =
            build_fx_series(&observations, span(date(2010, 1, 4), date(2010, 1, 5))).unwrap();
        assert_eq!(build.rows.len(), 2);
        assert!(build.rows.iter().all(|r| r.rate_gbp_per_eur == 0.85));
    }

    #[test]
    fn test_conversion_divides_by_rate() {
        let eur = convert_to_eur(15.3, 0.85);
        assert!((eur - 18.0).abs() < 1e-9);
    }
}
