//! FX reference-rate feed adapter
//!
//! Reads the published GBP-per-EUR series. The feed only carries
//! market-open days, and closed days sometimes appear as placeholder
//! rows (`-` or blank); those are skipped with a count. Gap filling is
//! not this adapter's job.

use std::path::Path;

use tracing::{debug, info};

use crate::domain::errors::IngestError;
use crate::domain::records::FxObservation;

use super::{build_header_map, field, open_reader, parse_date, parse_finite_f64, require_columns};

/// Accepted rate column names, in resolution order. The published export
/// labels the series `OBS_VALUE`; curated extracts use the explicit name.
const RATE_COLUMNS: [&str; 3] = ["rate_gbp_per_eur", "obs_value", "rate"];

/// Reads the FX observation feed at `path` in source order.
pub fn read_fx_rates(path: &Path) -> Result<Vec<FxObservation>, IngestError> {
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

    let rate_column = RATE_COLUMNS
        .iter()
        .copied()
        .find(|c| header_map.contains_key(*c))
        .ok_or_else(|| IngestError::MissingColumn {
            path: path_display.clone(),
            column: "rate_gbp_per_eur".to_string(),
        })?;

    let mut observations = Vec::new();
    let mut placeholder_rows = 0usize;

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

        match field(&record, &header_map, rate_column).and_then(parse_finite_f64) {
            Some(rate_gbp_per_eur) => observations.push(FxObservation {
                date,
                rate_gbp_per_eur,
            }),
            None => {
                placeholder_rows += 1;
                debug!(line, %date, "Skipping placeholder FX row");
            }
        }
    }

    info!(
        path = %path_display,
        observations = observations.len(),
        placeholder_rows,
        "Ingested FX rate feed"
    );
    Ok(observations)
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
    fn test_reads_curated_extract() {
        let file = write_csv(
            "date,rate_gbp_per_eur\n\
             2010-01-04,0.85\n\
             2010-01-07,0.86\n",
        );

        let observations = read_fx_rates(file.path()).unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(
            observations[0].date,
            NaiveDate::from_ymd_opt(2010, 1, 4).unwrap()
        );
        assert_eq!(observations[0].rate_gbp_per_eur, 0.85);
    }

    #[test]
    fn test_reads_published_export_column_name() {
        let file = write_csv("DATE,OBS_VALUE\n2010-01-04,0.8495\n");

        let observations = read_fx_rates(file.path()).unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].rate_gbp_per_eur, 0.8495);
    }

    #[test]
    fn test_placeholder_rows_are_skipped() {
        let file = write_csv(
            "date,rate\n\
             2010-01-04,0.85\n\
             2010-01-05,-\n\
             2010-01-06,\n\
             2010-01-07,0.86\n",
        );

        let observations = read_fx_rates(file.path()).unwrap();
        assert_eq!(observations.len(), 2);
    }

    #[test]
    fn test_missing_rate_column_fails_fast() {
        let file = write_csv("date,price\n2010-01-04,0.85\n");

        let err = read_fx_rates(file.path()).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { .. }));
    }

    #[test]
    fn test_bad_date_fails_fast() {
        let file = write_csv("date,rate\nJan 4th,0.85\n");

        let err = read_fx_rates(file.path()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidDate { .. }));
    }
}
