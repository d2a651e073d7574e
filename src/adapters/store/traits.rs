//! Warehouse store abstraction
//!
//! This module defines the trait the pipeline uses to persist and read
//! tables. The store is an opaque relational engine: every write is a
//! whole-table replacement, atomic at the table level, and every read
//! returns the full typed row set. No builder ever mutates a table it
//! does not produce.

use crate::domain::records::{FxObservation, HolidayRecord, RawTransactionRecord};
use crate::domain::tables::{
    CalendarRow, CountryDayRow, CustomerRow, FxRateRow, ProductRow, SalesFactEurRow, SalesFactRow,
    TableInfo,
};
use crate::domain::Result;

/// Every table the pipeline owns, in dependency order.
///
/// `rebuild` drops exactly this set; anything else living in the same
/// store file is left alone.
pub const PIPELINE_TABLES: [&str; 10] = [
    "raw_transactions",
    "raw_fx_observations",
    "raw_holidays",
    "dim_product",
    "dim_customer",
    "dim_calendar",
    "daily_fx_rates",
    "fct_sales",
    "fct_sales_eur",
    "agg_country_day",
];

/// Persistence seam for the warehouse
///
/// One session object is opened by the orchestrator and passed explicitly
/// through each builder call. Replacement of a table either fully commits
/// or leaves the prior contents untouched.
pub trait WarehouseStore {
    /// Replaces the `raw_transactions` staging table
    fn replace_raw_transactions(&mut self, rows: &[RawTransactionRecord]) -> Result<()>;

    /// Reads the `raw_transactions` staging table in stored order
    fn read_raw_transactions(&self) -> Result<Vec<RawTransactionRecord>>;

    /// Replaces the `raw_fx_observations` staging table
    fn replace_raw_fx_observations(&mut self, rows: &[FxObservation]) -> Result<()>;

    /// Reads the `raw_fx_observations` staging table in stored order
    fn read_raw_fx_observations(&self) -> Result<Vec<FxObservation>>;

    /// Replaces the `raw_holidays` staging table
    fn replace_raw_holidays(&mut self, rows: &[HolidayRecord]) -> Result<()>;

    /// Reads the `raw_holidays` staging table in stored order
    fn read_raw_holidays(&self) -> Result<Vec<HolidayRecord>>;

    /// Replaces the `dim_product` dimension
    fn replace_dim_product(&mut self, rows: &[ProductRow]) -> Result<()>;

    /// Reads the `dim_product` dimension
    fn read_dim_product(&self) -> Result<Vec<ProductRow>>;

    /// Replaces the `dim_customer` dimension
    fn replace_dim_customer(&mut self, rows: &[CustomerRow]) -> Result<()>;

    /// Reads the `dim_customer` dimension
    fn read_dim_customer(&self) -> Result<Vec<CustomerRow>>;

    /// Replaces the `dim_calendar` dimension
    fn replace_dim_calendar(&mut self, rows: &[CalendarRow]) -> Result<()>;

    /// Reads the `dim_calendar` dimension
    fn read_dim_calendar(&self) -> Result<Vec<CalendarRow>>;

    /// Replaces the `daily_fx_rates` series
    fn replace_daily_fx_rates(&mut self, rows: &[FxRateRow]) -> Result<()>;

    /// Reads the `daily_fx_rates` series
    fn read_daily_fx_rates(&self) -> Result<Vec<FxRateRow>>;

    /// Replaces the `fct_sales` fact table
    fn replace_fct_sales(&mut self, rows: &[SalesFactRow]) -> Result<()>;

    /// Reads the `fct_sales` fact table
    fn read_fct_sales(&self) -> Result<Vec<SalesFactRow>>;

    /// Replaces the `fct_sales_eur` fact table
    fn replace_fct_sales_eur(&mut self, rows: &[SalesFactEurRow]) -> Result<()>;

    /// Reads the `fct_sales_eur` fact table
    fn read_fct_sales_eur(&self) -> Result<Vec<SalesFactEurRow>>;

    /// Replaces the `agg_country_day` rollup
    fn replace_agg_country_day(&mut self, rows: &[CountryDayRow]) -> Result<()>;

    /// Reads the `agg_country_day` rollup
    fn read_agg_country_day(&self) -> Result<Vec<CountryDayRow>>;

    /// Drops every pipeline-owned table
    ///
    /// Run at the start of a rebuild. Tables outside
    /// [`PIPELINE_TABLES`] are not touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the drop batch fails; no partial drop is
    /// committed.
    fn drop_pipeline_tables(&mut self) -> Result<()>;

    /// Lists the pipeline tables currently present with their row counts
    ///
    /// Tables that have never been written are omitted.
    fn table_inventory(&self) -> Result<Vec<TableInfo>>;
}
