//! Calendar dimension builder
//!
//! Builds one row per date across the observed transaction span, flagged
//! with weekend, UK bank holiday, and ISO-8601 week attributes. Pure and
//! deterministic; the only failure mode is an empty span.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::info;

use crate::domain::errors::StageError;
use crate::domain::tables::CalendarRow;

/// Inclusive date span observed in the transaction extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    /// Derives the span from the dates actually observed
    ///
    /// # Errors
    ///
    /// Returns [`StageError::EmptyDateRange`] when no dates are supplied.
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Result<Self, StageError> {
        let mut iter = dates.into_iter();
        let first = iter.next().ok_or(StageError::EmptyDateRange)?;
        let (start, end) = iter.fold((first, first), |(min, max), d| (min.min(d), max.max(d)));
        Ok(Self { start, end })
    }

    /// Number of days in the span, both endpoints included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Iterates every date in the span in order
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    /// True when `date` falls inside the span
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Builds the calendar dimension for `span`
pub fn build_calendar(span: DateSpan, holidays: &BTreeSet<NaiveDate>) -> Vec<CalendarRow> {
    let rows: Vec<CalendarRow> = span
        .iter()
        .map(|date| {
            let iso = date.iso_week();
            CalendarRow {
                date,
                is_weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
                is_uk_holiday: holidays.contains(&date),
                iso_year: iso.year(),
                iso_week: iso.week(),
            }
        })
        .collect();

    let weekend_days = rows.iter().filter(|r| r.is_weekend).count();
    let holiday_days = rows.iter().filter(|r| r.is_uk_holiday).count();
    info!(
        start = %span.start,
        end = %span.end,
        days = rows.len(),
        weekend_days,
        holiday_days,
        "Built calendar dimension"
    );

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_span_from_unordered_dates() {
        let span = DateSpan::from_dates(vec![
            date(2010, 12, 5),
            date(2010, 12, 1),
            date(2010, 12, 3),
        ])
        .unwrap();
        assert_eq!(span.start, date(2010, 12, 1));
        assert_eq!(span.end, date(2010, 12, 5));
        assert_eq!(span.days(), 5);
    }

    #[test]
    fn test_empty_dates_fail() {
        let result = DateSpan::from_dates(Vec::new());
        assert!(matches!(result, Err(StageError::EmptyDateRange)));
    }

    #[test]
    fn test_single_date_span() {
        let span = DateSpan::from_dates(vec![date(2010, 12, 1)]).unwrap();
        assert_eq!(span.days(), 1);
        assert_eq!(span.iter().count(), 1);
    }

    #[test]
    fn test_calendar_is_gap_free_and_ordered() {
        let span = DateSpan {
            start: date(2010, 12, 1),
            end: date(2010, 12, 10),
        };
        let rows = build_calendar(span, &BTreeSet::new());
        assert_eq!(rows.len(), 10);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.date, date(2010, 12, 1 + i as u32));
        }
    }

    #[test]
    fn test_weekend_flags() {
        let span = DateSpan {
            start: date(2010, 12, 3),
            end: date(2010, 12, 6),
        };
        let rows = build_calendar(span, &BTreeSet::new());
        // Fri, Sat, Sun, Mon
        assert!(!rows[0].is_weekend);
        assert!(rows[1].is_weekend);
        assert!(rows[2].is_weekend);
        assert!(!rows[3].is_weekend);
    }

    #[test]
    fn test_holiday_flag() {
        let span = DateSpan {
            start: date(2010, 12, 27),
            end: date(2010, 12, 29),
        };
        let holidays: BTreeSet<NaiveDate> = [date(2010, 12, 27), date(2010, 12, 28)]
            .into_iter()
            .collect();
        let rows = build_calendar(span, &holidays);
        assert!(rows[0].is_uk_holiday);
        assert!(rows[1].is_uk_holiday);
        assert!(!rows[2].is_uk_holiday);
    }

    #[test]
    fn test_iso_week_year_boundary() {
        // 2011-01-01 is a Saturday and belongs to ISO week 52 of 2010
        let span = DateSpan {
            start: date(2010, 12, 31),
            end: date(2011, 1, 3),
        };
        let rows = build_calendar(span, &BTreeSet::new());
        assert_eq!(rows[0].iso_year, 2010);
        assert_eq!(rows[0].iso_week, 52);
        assert_eq!(rows[1].iso_year, 2010);
        assert_eq!(rows[1].iso_week, 52);
        // 2011-01-03 is the Monday starting ISO week 1 of 2011
        assert_eq!(rows[3].iso_year, 2011);
        assert_eq!(rows[3].iso_week, 1);
    }
}
