//! SQLite implementation of the warehouse store
//!
//! Tables live in a single database file. Dates are stored as ISO-8601
//! text, booleans as 0/1 integers. Every table replacement runs inside
//! one transaction (drop, create, insert), so an interrupted run leaves
//! the previous table contents intact.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row, Statement};
use rusqlite::types::FromSql;
use tracing::{debug, info};

use crate::domain::errors::StoreError;
use crate::domain::ids::{CustomerKey, InvoiceNo, StockCode};
use crate::domain::records::{FxObservation, HolidayRecord, RawTransactionRecord};
use crate::domain::tables::{
    CalendarRow, CountryDayRow, CustomerRow, FxRateRow, ProductRow, SalesFactEurRow, SalesFactRow,
    TableInfo,
};
use crate::domain::Result;

use super::traits::{WarehouseStore, PIPELINE_TABLES};

const DDL_RAW_TRANSACTIONS: &str = "
CREATE TABLE raw_transactions (
    line_no INTEGER NOT NULL,
    invoice_no TEXT NOT NULL,
    stock_code TEXT NOT NULL,
    description TEXT NOT NULL,
    qty INTEGER,
    invoice_date TEXT NOT NULL,
    unit_price REAL,
    customer_id INTEGER,
    country TEXT NOT NULL
);";

const DDL_RAW_FX_OBSERVATIONS: &str = "
CREATE TABLE raw_fx_observations (
    date TEXT NOT NULL,
    rate_gbp_per_eur REAL NOT NULL
);";

const DDL_RAW_HOLIDAYS: &str = "
CREATE TABLE raw_holidays (
    date TEXT NOT NULL,
    name TEXT NOT NULL
);";

const DDL_DIM_PRODUCT: &str = "
CREATE TABLE dim_product (
    stock_code TEXT PRIMARY KEY,
    description TEXT NOT NULL,
    first_seen_date TEXT NOT NULL,
    last_seen_date TEXT NOT NULL,
    is_active INTEGER NOT NULL
);";

const DDL_DIM_CUSTOMER: &str = "
CREATE TABLE dim_customer (
    customer_id INTEGER PRIMARY KEY,
    country TEXT NOT NULL
);";

const DDL_DIM_CALENDAR: &str = "
CREATE TABLE dim_calendar (
    date TEXT PRIMARY KEY,
    is_weekend INTEGER NOT NULL,
    is_uk_holiday INTEGER NOT NULL,
    iso_year INTEGER NOT NULL,
    iso_week INTEGER NOT NULL
);";

const DDL_DAILY_FX_RATES: &str = "
CREATE TABLE daily_fx_rates (
    date TEXT PRIMARY KEY,
    rate_gbp_per_eur REAL NOT NULL,
    is_interpolated INTEGER NOT NULL
);";

const DDL_FCT_SALES: &str = "
CREATE TABLE fct_sales (
    invoice_no TEXT NOT NULL,
    stock_code TEXT NOT NULL,
    line_seq INTEGER NOT NULL,
    customer_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    qty INTEGER NOT NULL,
    unit_price REAL NOT NULL,
    gross_amount REAL NOT NULL,
    is_cancellation INTEGER NOT NULL,
    PRIMARY KEY (invoice_no, stock_code, line_seq)
);
CREATE INDEX idx_fct_sales_date ON fct_sales(date);";

const DDL_FCT_SALES_EUR: &str = "
CREATE TABLE fct_sales_eur (
    invoice_no TEXT NOT NULL,
    stock_code TEXT NOT NULL,
    line_seq INTEGER NOT NULL,
    customer_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    qty INTEGER NOT NULL,
    unit_price REAL NOT NULL,
    gross_amount REAL NOT NULL,
    rate_gbp_per_eur REAL NOT NULL,
    gross_amount_eur REAL NOT NULL,
    is_cancellation INTEGER NOT NULL,
    PRIMARY KEY (invoice_no, stock_code, line_seq)
);
CREATE INDEX idx_fct_sales_eur_date ON fct_sales_eur(date);";

const DDL_AGG_COUNTRY_DAY: &str = "
CREATE TABLE agg_country_day (
    date TEXT NOT NULL,
    country TEXT NOT NULL,
    orders INTEGER NOT NULL,
    items INTEGER NOT NULL,
    net_qty INTEGER NOT NULL,
    net_revenue_gbp REAL NOT NULL,
    net_revenue_eur REAL NOT NULL,
    PRIMARY KEY (date, country)
);";

/// Warehouse store backed by an embedded SQLite database
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    path: String,
}

impl SqliteStore {
    /// Opens (creating if necessary) the store at `path`
    ///
    /// The parent directory is created if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> std::result::Result<Self, StoreError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StoreError::OpenFailed {
                    path: display.clone(),
                    message: format!("failed to create parent directory: {e}"),
                })?;
            }
        }

        let conn = Connection::open(path).map_err(|e| StoreError::OpenFailed {
            path: display.clone(),
            message: e.to_string(),
        })?;
        Self::init(conn, display)
    }

    /// Opens a throwaway in-memory store (dry runs and tests)
    pub fn open_in_memory() -> std::result::Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::OpenFailed {
            path: ":memory:".to_string(),
            message: e.to_string(),
        })?;
        Self::init(conn, ":memory:".to_string())
    }

    fn init(conn: Connection, path: String) -> std::result::Result<Self, StoreError> {
        conn.pragma_update(None, "journal_mode", "WAL")
            .and_then(|_| conn.pragma_update(None, "synchronous", "NORMAL"))
            .map_err(|e| StoreError::OpenFailed {
                path: path.clone(),
                message: format!("failed to apply pragmas: {e}"),
            })?;
        debug!(path = %path, "Opened SQLite warehouse store");
        Ok(Self { conn, path })
    }

    /// Location of the underlying database file
    pub fn path(&self) -> &str {
        &self.path
    }

    fn replace_table<T>(
        &mut self,
        table: &str,
        ddl: &str,
        insert_sql: &str,
        rows: &[T],
        bind: impl Fn(&mut Statement<'_>, &T) -> rusqlite::Result<()>,
    ) -> std::result::Result<(), StoreError> {
        let replace_err = |e: rusqlite::Error| StoreError::ReplaceFailed {
            table: table.to_string(),
            message: e.to_string(),
        };

        let tx = self.conn.transaction().map_err(replace_err)?;
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))
            .map_err(replace_err)?;
        tx.execute_batch(ddl).map_err(replace_err)?;
        {
            let mut stmt = tx.prepare(insert_sql).map_err(replace_err)?;
            for row in rows {
                bind(&mut stmt, row).map_err(replace_err)?;
            }
        }
        tx.commit().map_err(replace_err)?;

        debug!(table, rows = rows.len(), "Replaced table");
        Ok(())
    }

    fn read_table<T>(
        &self,
        table: &str,
        sql: &str,
        map: impl Fn(&Row<'_>) -> std::result::Result<T, String>,
    ) -> std::result::Result<Vec<T>, StoreError> {
        let read_err = |e: rusqlite::Error| StoreError::ReadFailed {
            table: table.to_string(),
            message: e.to_string(),
        };

        let mut stmt = self.conn.prepare(sql).map_err(read_err)?;
        let mut rows = stmt.query([]).map_err(read_err)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(read_err)? {
            let mapped = map(row).map_err(|message| StoreError::CorruptRow {
                table: table.to_string(),
                message,
            })?;
            out.push(mapped);
        }
        Ok(out)
    }
}

fn sql_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn col<T: FromSql>(row: &Row<'_>, idx: usize) -> std::result::Result<T, String> {
    row.get(idx).map_err(|e| format!("column {idx}: {e}"))
}

fn col_date(row: &Row<'_>, idx: usize) -> std::result::Result<NaiveDate, String> {
    let text: String = col(row, idx)?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .map_err(|e| format!("column {idx}: bad date '{text}': {e}"))
}

fn col_stock_code(row: &Row<'_>, idx: usize) -> std::result::Result<StockCode, String> {
    StockCode::new(col::<String>(row, idx)?).map_err(|e| format!("column {idx}: {e}"))
}

fn col_invoice_no(row: &Row<'_>, idx: usize) -> std::result::Result<InvoiceNo, String> {
    InvoiceNo::new(col::<String>(row, idx)?).map_err(|e| format!("column {idx}: {e}"))
}

fn col_customer_key(row: &Row<'_>, idx: usize) -> std::result::Result<CustomerKey, String> {
    let value: i64 = col(row, idx)?;
    if value == CustomerKey::UNKNOWN.value() {
        Ok(CustomerKey::UNKNOWN)
    } else {
        CustomerKey::new(value).map_err(|e| format!("column {idx}: {e}"))
    }
}

impl WarehouseStore for SqliteStore {
    fn replace_raw_transactions(&mut self, rows: &[RawTransactionRecord]) -> Result<()> {
        self.replace_table(
            "raw_transactions",
            DDL_RAW_TRANSACTIONS,
            "INSERT INTO raw_transactions (line_no, invoice_no, stock_code, description, qty, \
             invoice_date, unit_price, customer_id, country) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rows,
            |stmt, r| {
                stmt.execute(params![
                    r.line_no as i64,
                    r.invoice_no,
                    r.stock_code,
                    r.description,
                    r.qty,
                    sql_date(r.invoice_date),
                    r.unit_price,
                    r.customer_id,
                    r.country,
                ])
                .map(|_| ())
            },
        )?;
        Ok(())
    }

    fn read_raw_transactions(&self) -> Result<Vec<RawTransactionRecord>> {
        let rows = self.read_table(
            "raw_transactions",
            "SELECT line_no, invoice_no, stock_code, description, qty, invoice_date, \
             unit_price, customer_id, country FROM raw_transactions ORDER BY line_no",
            |row| {
                Ok(RawTransactionRecord {
                    line_no: col::<i64>(row, 0)? as usize,
                    invoice_no: col(row, 1)?,
                    stock_code: col(row, 2)?,
                    description: col(row, 3)?,
                    qty: col(row, 4)?,
                    invoice_date: col_date(row, 5)?,
                    unit_price: col(row, 6)?,
                    customer_id: col(row, 7)?,
                    country: col(row, 8)?,
                })
            },
        )?;
        Ok(rows)
    }

    fn replace_raw_fx_observations(&mut self, rows: &[FxObservation]) -> Result<()> {
        self.replace_table(
            "raw_fx_observations",
            DDL_RAW_FX_OBSERVATIONS,
            "INSERT INTO raw_fx_observations (date, rate_gbp_per_eur) VALUES (?1, ?2)",
            rows,
            |stmt, r| {
                stmt.execute(params![sql_date(r.date), r.rate_gbp_per_eur])
                    .map(|_| ())
            },
        )?;
        Ok(())
    }

    fn read_raw_fx_observations(&self) -> Result<Vec<FxObservation>> {
        let rows = self.read_table(
            "raw_fx_observations",
            "SELECT date, rate_gbp_per_eur FROM raw_fx_observations ORDER BY date",
            |row| {
                Ok(FxObservation {
                    date: col_date(row, 0)?,
                    rate_gbp_per_eur: col(row, 1)?,
                })
            },
        )?;
        Ok(rows)
    }

    fn replace_raw_holidays(&mut self, rows: &[HolidayRecord]) -> Result<()> {
        self.replace_table(
            "raw_holidays",
            DDL_RAW_HOLIDAYS,
            "INSERT INTO raw_holidays (date, name) VALUES (?1, ?2)",
            rows,
            |stmt, r| stmt.execute(params![sql_date(r.date), r.name]).map(|_| ()),
        )?;
        Ok(())
    }

    fn read_raw_holidays(&self) -> Result<Vec<HolidayRecord>> {
        let rows = self.read_table(
            "raw_holidays",
            "SELECT date, name FROM raw_holidays ORDER BY date",
            |row| {
                Ok(HolidayRecord {
                    date: col_date(row, 0)?,
                    name: col(row, 1)?,
                })
            },
        )?;
        Ok(rows)
    }

    fn replace_dim_product(&mut self, rows: &[ProductRow]) -> Result<()> {
        self.replace_table(
            "dim_product",
            DDL_DIM_PRODUCT,
            "INSERT INTO dim_product (stock_code, description, first_seen_date, last_seen_date, \
             is_active) VALUES (?1, ?2, ?3, ?4, ?5)",
            rows,
            |stmt, r| {
                stmt.execute(params![
                    r.stock_code.as_str(),
                    r.description,
                    sql_date(r.first_seen_date),
                    sql_date(r.last_seen_date),
                    r.is_active,
                ])
                .map(|_| ())
            },
        )?;
        Ok(())
    }

    fn read_dim_product(&self) -> Result<Vec<ProductRow>> {
        let rows = self.read_table(
            "dim_product",
            "SELECT stock_code, description, first_seen_date, last_seen_date, is_active \
             FROM dim_product ORDER BY stock_code",
            |row| {
                Ok(ProductRow {
                    stock_code: col_stock_code(row, 0)?,
                    description: col(row, 1)?,
                    first_seen_date: col_date(row, 2)?,
                    last_seen_date: col_date(row, 3)?,
                    is_active: col(row, 4)?,
                })
            },
        )?;
        Ok(rows)
    }

    fn replace_dim_customer(&mut self, rows: &[CustomerRow]) -> Result<()> {
        self.replace_table(
            "dim_customer",
            DDL_DIM_CUSTOMER,
            "INSERT INTO dim_customer (customer_id, country) VALUES (?1, ?2)",
            rows,
            |stmt, r| {
                stmt.execute(params![r.customer_id.value(), r.country])
                    .map(|_| ())
            },
        )?;
        Ok(())
    }

    fn read_dim_customer(&self) -> Result<Vec<CustomerRow>> {
        let rows = self.read_table(
            "dim_customer",
            "SELECT customer_id, country FROM dim_customer ORDER BY customer_id",
            |row| {
                Ok(CustomerRow {
                    customer_id: col_customer_key(row, 0)?,
                    country: col(row, 1)?,
                })
            },
        )?;
        Ok(rows)
    }

    fn replace_dim_calendar(&mut self, rows: &[CalendarRow]) -> Result<()> {
        self.replace_table(
            "dim_calendar",
            DDL_DIM_CALENDAR,
            "INSERT INTO dim_calendar (date, is_weekend, is_uk_holiday, iso_year, iso_week) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rows,
            |stmt, r| {
                stmt.execute(params![
                    sql_date(r.date),
                    r.is_weekend,
                    r.is_uk_holiday,
                    r.iso_year,
                    r.iso_week,
                ])
                .map(|_| ())
            },
        )?;
        Ok(())
    }

    fn read_dim_calendar(&self) -> Result<Vec<CalendarRow>> {
        let rows = self.read_table(
            "dim_calendar",
            "SELECT date, is_weekend, is_uk_holiday, iso_year, iso_week \
             FROM dim_calendar ORDER BY date",
            |row| {
                Ok(CalendarRow {
                    date: col_date(row, 0)?,
                    is_weekend: col(row, 1)?,
                    is_uk_holiday: col(row, 2)?,
                    iso_year: col(row, 3)?,
                    iso_week: col(row, 4)?,
                })
            },
        )?;
        Ok(rows)
    }

    fn replace_daily_fx_rates(&mut self, rows: &[FxRateRow]) -> Result<()> {
        self.replace_table(
            "daily_fx_rates",
            DDL_DAILY_FX_RATES,
            "INSERT INTO daily_fx_rates (date, rate_gbp_per_eur, is_interpolated) \
             VALUES (?1, ?2, ?3)",
            rows,
            |stmt, r| {
                stmt.execute(params![
                    sql_date(r.date),
                    r.rate_gbp_per_eur,
                    r.is_interpolated
                ])
                .map(|_| ())
            },
        )?;
        Ok(())
    }

    fn read_daily_fx_rates(&self) -> Result<Vec<FxRateRow>> {
        let rows = self.read_table(
            "daily_fx_rates",
            "SELECT date, rate_gbp_per_eur, is_interpolated FROM daily_fx_rates ORDER BY date",
            |row| {
                Ok(FxRateRow {
                    date: col_date(row, 0)?,
                    rate_gbp_per_eur: col(row, 1)?,
                    is_interpolated: col(row, 2)?,
                })
            },
        )?;
        Ok(rows)
    }

    fn replace_fct_sales(&mut self, rows: &[SalesFactRow]) -> Result<()> {
        self.replace_table(
            "fct_sales",
            DDL_FCT_SALES,
            "INSERT INTO fct_sales (invoice_no, stock_code, line_seq, customer_id, date, qty, \
             unit_price, gross_amount, is_cancellation) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rows,
            |stmt, r| {
                stmt.execute(params![
                    r.invoice_no.as_str(),
                    r.stock_code.as_str(),
                    r.line_seq,
                    r.customer_id.value(),
                    sql_date(r.date),
                    r.qty,
                    r.unit_price,
                    r.gross_amount,
                    r.is_cancellation,
                ])
                .map(|_| ())
            },
        )?;
        Ok(())
    }

    fn read_fct_sales(&self) -> Result<Vec<SalesFactRow>> {
        let rows = self.read_table(
            "fct_sales",
            "SELECT invoice_no, stock_code, line_seq, customer_id, date, qty, unit_price, \
             gross_amount, is_cancellation \
             FROM fct_sales ORDER BY invoice_no, stock_code, line_seq",
            |row| {
                Ok(SalesFactRow {
                    invoice_no: col_invoice_no(row, 0)?,
                    stock_code: col_stock_code(row, 1)?,
                    line_seq: col(row, 2)?,
                    customer_id: col_customer_key(row, 3)?,
                    date: col_date(row, 4)?,
                    qty: col(row, 5)?,
                    unit_price: col(row, 6)?,
                    gross_amount: col(row, 7)?,
                    is_cancellation: col(row, 8)?,
                })
            },
        )?;
        Ok(rows)
    }

    fn replace_fct_sales_eur(&mut self, rows: &[SalesFactEurRow]) -> Result<()> {
        self.replace_table(
            "fct_sales_eur",
            DDL_FCT_SALES_EUR,
            "INSERT INTO fct_sales_eur (invoice_no, stock_code, line_seq, customer_id, date, \
             qty, unit_price, gross_amount, rate_gbp_per_eur, gross_amount_eur, is_cancellation) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rows,
            |stmt, r| {
                stmt.execute(params![
                    r.invoice_no.as_str(),
                    r.stock_code.as_str(),
                    r.line_seq,
                    r.customer_id.value(),
                    sql_date(r.date),
                    r.qty,
                    r.unit_price,
                    r.gross_amount,
                    r.rate_gbp_per_eur,
                    r.gross_amount_eur,
                    r.is_cancellation,
                ])
                .map(|_| ())
            },
        )?;
        Ok(())
    }

    fn read_fct_sales_eur(&self) -> Result<Vec<SalesFactEurRow>> {
        let rows = self.read_table(
            "fct_sales_eur",
            "SELECT invoice_no, stock_code, line_seq, customer_id, date, qty, unit_price, \
             gross_amount, rate_gbp_per_eur, gross_amount_eur, is_cancellation \
             FROM fct_sales_eur ORDER BY invoice_no, stock_code, line_seq",
            |row| {
                Ok(SalesFactEurRow {
                    invoice_no: col_invoice_no(row, 0)?,
                    stock_code: col_stock_code(row, 1)?,
                    line_seq: col(row, 2)?,
                    customer_id: col_customer_key(row, 3)?,
                    date: col_date(row, 4)?,
                    qty: col(row, 5)?,
                    unit_price: col(row, 6)?,
                    gross_amount: col(row, 7)?,
                    rate_gbp_per_eur: col(row, 8)?,
                    gross_amount_eur: col(row, 9)?,
                    is_cancellation: col(row, 10)?,
                })
            },
        )?;
        Ok(rows)
    }

    fn replace_agg_country_day(&mut self, rows: &[CountryDayRow]) -> Result<()> {
        self.replace_table(
            "agg_country_day",
            DDL_AGG_COUNTRY_DAY,
            "INSERT INTO agg_country_day (date, country, orders, items, net_qty, \
             net_revenue_gbp, net_revenue_eur) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rows,
            |stmt, r| {
                stmt.execute(params![
                    sql_date(r.date),
                    r.country,
                    r.orders,
                    r.items,
                    r.net_qty,
                    r.net_revenue_gbp,
                    r.net_revenue_eur,
                ])
                .map(|_| ())
            },
        )?;
        Ok(())
    }

    fn read_agg_country_day(&self) -> Result<Vec<CountryDayRow>> {
        let rows = self.read_table(
            "agg_country_day",
            "SELECT date, country, orders, items, net_qty, net_revenue_gbp, net_revenue_eur \
             FROM agg_country_day ORDER BY date, country",
            |row| {
                Ok(CountryDayRow {
                    date: col_date(row, 0)?,
                    country: col(row, 1)?,
                    orders: col(row, 2)?,
                    items: col(row, 3)?,
                    net_qty: col(row, 4)?,
                    net_revenue_gbp: col(row, 5)?,
                    net_revenue_eur: col(row, 6)?,
                })
            },
        )?;
        Ok(rows)
    }

    fn drop_pipeline_tables(&mut self) -> Result<()> {
        let maintenance_err =
            |e: rusqlite::Error| StoreError::MaintenanceFailed(e.to_string());

        let batch: String = PIPELINE_TABLES
            .iter()
            .map(|t| format!("DROP TABLE IF EXISTS {t};"))
            .collect();

        let tx = self.conn.transaction().map_err(maintenance_err)?;
        tx.execute_batch(&batch).map_err(maintenance_err)?;
        tx.commit().map_err(maintenance_err)?;

        info!(path = %self.path, "Dropped all pipeline tables");
        Ok(())
    }

    fn table_inventory(&self) -> Result<Vec<TableInfo>> {
        let maintenance_err =
            |e: rusqlite::Error| StoreError::MaintenanceFailed(e.to_string());

        let mut inventory = Vec::new();
        for table in PIPELINE_TABLES {
            let present: i64 = self
                .conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    params![table],
                    |row| row.get(0),
                )
                .map_err(maintenance_err)?;
            if present == 0 {
                continue;
            }

            let rows: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
                .map_err(maintenance_err)?;
            inventory.push(TableInfo {
                name: table.to_string(),
                rows,
            });
        }
        Ok(inventory)
    }
}
