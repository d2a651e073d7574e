//! Bank-holiday list adapter

use std::path::Path;

use tracing::info;

use crate::domain::errors::IngestError;
use crate::domain::records::HolidayRecord;

use super::{build_header_map, field, open_reader, parse_date, require_columns};

/// Accepted holiday-name column names, first present wins.
const NAME_COLUMNS: [&str; 3] = ["title", "name", "holiday"];

/// Reads the bank-holiday list at `path` in source order.
pub fn read_holidays(path: &Path) -> Result<Vec<HolidayRecord>, IngestError> {
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
    require_columns(&path_display, &header_map, &["date"])?;

    let name_column = NAME_COLUMNS
        .iter()
        .copied()
        .find(|c| header_map.contains_key(*c));

    let mut holidays = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| IngestError::MalformedRecord {
            path: path_display.clone(),
            line,
            message: e.to_string(),
        })?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let date_raw = field(&record, &header_map, "date").unwrap_or("");
        let date = parse_date(date_raw).ok_or_else(|| IngestError::InvalidDate {
            path: path_display.clone(),
            line,
            value: date_raw.to_string(),
        })?;

        let name = name_column
            .and_then(|c| field(&record, &header_map, c))
            .unwrap_or_default()
            .to_string();

        holidays.push(HolidayRecord { date, name });
    }

    info!(path = %path_display, holidays = holidays.len(), "Ingested bank-holiday list");
    Ok(holidays)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_holiday_list() {
        let file = write_csv(
            "date,title\n\
             2010-12-27,Christmas Day (substitute day)\n\
             2010-12-28,Boxing Day (substitute day)\n",
        );

        let holidays = read_holidays(file.path()).unwrap();
        assert_eq!(holidays.len(), 2);
        assert_eq!(
            holidays[0].date,
            NaiveDate::from_ymd_opt(2010, 12, 27).unwrap()
        );
        assert_eq!(holidays[0].name, "Christmas Day (substitute day)");
    }

    #[test]
    fn test_name_column_is_optional() {
        let file = write_csv("date\n2011-01-03\n");

        let holidays = read_holidays(file.path()).unwrap();
        assert_eq!(holidays.len(), 1);
        assert_eq!(holidays[0].name, "");
    }

    #[test]
    fn test_missing_date_column_fails_fast() {
        let file = write_csv("title\nChristmas\n");

        let err = read_holidays(file.path()).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { .. }));
    }
}
