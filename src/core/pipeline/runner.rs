//! Pipeline orchestration
//!
//! Sequences staging, calendar, dimensions, FX, facts and aggregation
//! against one store session. Every stage validates before it writes, so
//! an aborted run leaves the previously committed tables in place and
//! the failed stage's table untouched.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use super::summary::RunSummary;
use crate::adapters::ingest::{read_fx_rates, read_holidays, read_transactions};
use crate::adapters::store::WarehouseStore;
use crate::core::aggregate::build_country_day;
use crate::core::calendar::{build_calendar, DateSpan};
use crate::core::dimensions::{build_customer_dimension, build_product_dimension};
use crate::core::facts::build_sales_facts;
use crate::core::fx::build_fx_series;
use crate::core::quality::checks::{
    check_aggregates, check_calendar, check_dimensions, check_facts, check_fx_series,
    ValidationSettings,
};
use crate::domain::records::{FxObservation, HolidayRecord, RawTransactionRecord};
use crate::domain::Result;

/// How a run sources its input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Drop every pipeline table, re-ingest the raw files and recompute
    Rebuild,

    /// Recompute every derived table from the staged raw tables without
    /// touching the source files
    Incremental,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Rebuild => write!(f, "rebuild"),
            RunMode::Incremental => write!(f, "incremental"),
        }
    }
}

impl std::str::FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rebuild" => Ok(RunMode::Rebuild),
            "incremental" => Ok(RunMode::Incremental),
            other => Err(format!(
                "unknown mode '{other}' (expected 'rebuild' or 'incremental')"
            )),
        }
    }
}

/// Locations of the three raw source files
#[derive(Debug, Clone)]
pub struct SourcePaths {
    /// Transaction line extract (CSV)
    pub transactions: PathBuf,

    /// Published FX observations (CSV)
    pub fx_observations: PathBuf,

    /// UK bank-holiday list (CSV)
    pub holidays: PathBuf,
}

/// Runs the pipeline stages in order against one store session
///
/// The store handle is passed in explicitly and borrowed for the
/// runner's lifetime; no stage reaches for ambient state.
pub struct PipelineRunner<'a> {
    store: &'a mut dyn WarehouseStore,
    settings: ValidationSettings,
    dry_run: bool,
}

impl<'a> PipelineRunner<'a> {
    /// Creates a runner over an opened store session
    pub fn new(store: &'a mut dyn WarehouseStore, settings: ValidationSettings) -> Self {
        Self {
            store,
            settings,
            dry_run: false,
        }
    }

    /// Computes and validates every stage but skips all store writes
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Executes one full run
    ///
    /// In rebuild mode the raw files are read first; only once all three
    /// parse does the store get dropped and restaged. Incremental mode
    /// reads the staging tables instead and never opens the files.
    ///
    /// # Errors
    ///
    /// Propagates ingestion errors, stage errors, store errors and fatal
    /// validation failures. On error, tables committed by earlier stages
    /// remain as written.
    pub fn run(&mut self, mode: RunMode, sources: &SourcePaths) -> Result<RunSummary> {
        let run_start = Instant::now();
        info!(mode = %mode, dry_run = self.dry_run, "Starting pipeline run");
        let mut summary = RunSummary::new(mode, self.dry_run);

        let stage_start = Instant::now();
        let (transactions, fx_observations, holidays) = match mode {
            RunMode::Rebuild => self.stage_from_files(sources)?,
            RunMode::Incremental => self.stage_from_store()?,
        };
        summary.record_stage(
            "staging",
            transactions.len() + fx_observations.len() + holidays.len(),
            stage_start.elapsed(),
        );

        // calendar
        let stage_start = Instant::now();
        let span = DateSpan::from_dates(transactions.iter().map(|r| r.invoice_date))?;
        let holiday_dates: BTreeSet<_> = holidays.iter().map(|h| h.date).collect();
        let calendar_rows = build_calendar(span, &holiday_dates);
        let report = check_calendar(&calendar_rows, span, &self.settings);
        report.log_summary();
        summary.record_checks(&report);
        report.ensure_passed()?;
        if !self.dry_run {
            self.store.replace_dim_calendar(&calendar_rows)?;
        }
        summary.record_stage("calendar", calendar_rows.len(), stage_start.elapsed());

        // dimensions
        let stage_start = Instant::now();
        let product_build = build_product_dimension(&transactions)?;
        let customers = build_customer_dimension(&transactions)?;
        let report = check_dimensions(&product_build.rows, &customers, &self.settings);
        report.log_summary();
        summary.record_checks(&report);
        report.ensure_passed()?;
        if !self.dry_run {
            self.store.replace_dim_product(&product_build.rows)?;
            self.store.replace_dim_customer(&customers)?;
        }
        summary.record_stage(
            "dimensions",
            product_build.rows.len() + customers.len(),
            stage_start.elapsed(),
        );

        // fx series
        let stage_start = Instant::now();
        let fx_build = build_fx_series(&fx_observations, span)?;
        let report = check_fx_series(&fx_build.rows, span, &self.settings);
        report.log_summary();
        summary.record_checks(&report);
        report.ensure_passed()?;
        if !self.dry_run {
            self.store.replace_daily_fx_rates(&fx_build.rows)?;
        }
        summary.record_stage("fx", fx_build.rows.len(), stage_start.elapsed());

        // facts
        let stage_start = Instant::now();
        let fact_build = build_sales_facts(
            &transactions,
            &product_build.rows,
            &customers,
            &fx_build.rows,
            self.settings.max_sample_keys,
        )?;
        fact_build.rejections.log_summary("facts");
        let report = check_facts(
            &fact_build.gbp,
            &fact_build.eur,
            &product_build.rows,
            &customers,
            &self.settings,
        );
        report.log_summary();
        summary.record_checks(&report);
        report.ensure_passed()?;
        if !self.dry_run {
            self.store.replace_fct_sales(&fact_build.gbp)?;
            self.store.replace_fct_sales_eur(&fact_build.eur)?;
        }
        summary.record_stage(
            "facts",
            fact_build.gbp.len() + fact_build.eur.len(),
            stage_start.elapsed(),
        );
        summary.rejections = fact_build.rejections.clone();
        summary.collapsed_duplicates = fact_build.collapsed_duplicates;

        // aggregates
        let stage_start = Instant::now();
        let agg_rows = build_country_day(&fact_build.eur, &customers);
        let report = check_aggregates(&agg_rows, &fact_build.gbp, &self.settings);
        report.log_summary();
        summary.record_checks(&report);
        report.ensure_passed()?;
        if !self.dry_run {
            self.store.replace_agg_country_day(&agg_rows)?;
        }
        summary.record_stage("aggregates", agg_rows.len(), stage_start.elapsed());

        let summary = summary.with_duration(run_start.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Reads the raw files, then drops and restages the store
    fn stage_from_files(&mut self, sources: &SourcePaths) -> Result<StagedInput> {
        let transactions = read_transactions(&sources.transactions)?;
        let fx_observations = read_fx_rates(&sources.fx_observations)?;
        let holidays = read_holidays(&sources.holidays)?;
        if !self.dry_run {
            self.store.drop_pipeline_tables()?;
            self.store.replace_raw_transactions(&transactions)?;
            self.store.replace_raw_fx_observations(&fx_observations)?;
            self.store.replace_raw_holidays(&holidays)?;
        }
        Ok((transactions, fx_observations, holidays))
    }

    /// Reads the staging tables written by an earlier rebuild
    fn stage_from_store(&mut self) -> Result<StagedInput> {
        Ok((
            self.store.read_raw_transactions()?,
            self.store.read_raw_fx_observations()?,
            self.store.read_raw_holidays()?,
        ))
    }
}

type StagedInput = (
    Vec<RawTransactionRecord>,
    Vec<FxObservation>,
    Vec<HolidayRecord>,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::SqliteStore;
    use crate::core::quality::table_checksum;
    use std::fs;
    use std::path::Path;
    use std::str::FromStr;

    const TRANSACTIONS: &str = "\
InvoiceNo,StockCode,Description,Quantity,InvoiceDate,UnitPrice,CustomerID,Country
536365,85123A,WHITE HANGING HEART T-LIGHT HOLDER,6,12/1/2010 8:26,2.55,17850,United Kingdom
536365,71053,WHITE METAL LANTERN,6,12/1/2010 8:26,3.39,17850,United Kingdom
536367,84879,ASSORTED COLOUR BIRD ORNAMENT,32,12/3/2010 10:15,1.69,,France
C536379,85123A,WHITE HANGING HEART T-LIGHT HOLDER,-6,12/3/2010 9:41,2.55,17850,United Kingdom
";

    const FX_OBSERVATIONS: &str = "\
Date,Rate
2010-11-30,0.8471
2010-12-01,0.8529
2010-12-03,0.8462
";

    const HOLIDAYS: &str = "\
Date,Title
2010-12-27,Christmas Day (substitute day)
";

    fn write_sources(dir: &Path) -> SourcePaths {
        let transactions = dir.join("transactions.csv");
        let fx_observations = dir.join("fx.csv");
        let holidays = dir.join("holidays.csv");
        fs::write(&transactions, TRANSACTIONS).unwrap();
        fs::write(&fx_observations, FX_OBSERVATIONS).unwrap();
        fs::write(&holidays, HOLIDAYS).unwrap();
        SourcePaths {
            transactions,
            fx_observations,
            holidays,
        }
    }

    #[test]
    fn test_rebuild_writes_every_table() {
        let dir = tempfile::tempdir().unwrap();
        let sources = write_sources(dir.path());
        let mut store = SqliteStore::open_in_memory().unwrap();

        let summary = PipelineRunner::new(&mut store, ValidationSettings::default())
            .run(RunMode::Rebuild, &sources)
            .unwrap();

        assert_eq!(summary.stages.len(), 6);
        assert!(summary.duration_ms.is_some());
        assert_eq!(summary.rejections.total(), 0);

        assert_eq!(store.read_dim_product().unwrap().len(), 3);
        // 17850 plus the unknown member absorbing the blank French line
        assert_eq!(store.read_dim_customer().unwrap().len(), 2);
        // span 2010-12-01..2010-12-03
        assert_eq!(store.read_dim_calendar().unwrap().len(), 3);
        assert_eq!(store.read_daily_fx_rates().unwrap().len(), 3);
        assert_eq!(store.read_fct_sales().unwrap().len(), 4);
        assert_eq!(store.read_fct_sales_eur().unwrap().len(), 4);
        assert!(!store.read_agg_country_day().unwrap().is_empty());
        assert_eq!(store.read_raw_transactions().unwrap().len(), 4);

        // the market-closed 2010-12-02 was forward-filled
        let filled: Vec<_> = store
            .read_daily_fx_rates()
            .unwrap()
            .into_iter()
            .filter(|r| r.is_interpolated)
            .collect();
        assert_eq!(filled.len(), 1);
        assert_eq!(filled[0].rate_gbp_per_eur, 0.8529);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sources = write_sources(dir.path());
        let mut store = SqliteStore::open_in_memory().unwrap();

        let summary = PipelineRunner::new(&mut store, ValidationSettings::default())
            .with_dry_run(true)
            .run(RunMode::Rebuild, &sources)
            .unwrap();

        assert!(summary.dry_run);
        assert!(summary.rows_written() > 0);
        assert!(store.table_inventory().unwrap().is_empty());
    }

    #[test]
    fn test_incremental_reproduces_rebuild_output() {
        let dir = tempfile::tempdir().unwrap();
        let sources = write_sources(dir.path());
        let mut store = SqliteStore::open_in_memory().unwrap();

        PipelineRunner::new(&mut store, ValidationSettings::default())
            .run(RunMode::Rebuild, &sources)
            .unwrap();
        let after_rebuild = table_checksum(&store.read_fct_sales().unwrap()).unwrap();

        // incremental must not open the source files
        let gone = SourcePaths {
            transactions: dir.path().join("missing.csv"),
            fx_observations: dir.path().join("missing.csv"),
            holidays: dir.path().join("missing.csv"),
        };
        PipelineRunner::new(&mut store, ValidationSettings::default())
            .run(RunMode::Incremental, &gone)
            .unwrap();
        let after_incremental = table_checksum(&store.read_fct_sales().unwrap()).unwrap();

        assert_eq!(after_rebuild, after_incremental);
    }

    #[test]
    fn test_incremental_without_staging_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sources = write_sources(dir.path());
        let mut store = SqliteStore::open_in_memory().unwrap();

        let result = PipelineRunner::new(&mut store, ValidationSettings::default())
            .run(RunMode::Incremental, &sources);
        assert!(result.is_err());
    }

    #[test]
    fn test_rebuild_fails_fast_before_dropping_tables() {
        let dir = tempfile::tempdir().unwrap();
        let sources = write_sources(dir.path());
        let mut store = SqliteStore::open_in_memory().unwrap();

        PipelineRunner::new(&mut store, ValidationSettings::default())
            .run(RunMode::Rebuild, &sources)
            .unwrap();

        let broken = SourcePaths {
            transactions: dir.path().join("missing.csv"),
            ..sources
        };
        let result = PipelineRunner::new(&mut store, ValidationSettings::default())
            .run(RunMode::Rebuild, &broken);
        assert!(result.is_err());

        // the unreadable file surfaced before any table was dropped
        assert_eq!(store.read_fct_sales().unwrap().len(), 4);
    }

    #[test]
    fn test_run_mode_parses() {
        assert_eq!(RunMode::from_str("rebuild").unwrap(), RunMode::Rebuild);
        assert_eq!(
            RunMode::from_str("INCREMENTAL").unwrap(),
            RunMode::Incremental
        );
        assert!(RunMode::from_str("partial").is_err());
        assert_eq!(RunMode::Rebuild.to_string(), "rebuild");
    }
}
