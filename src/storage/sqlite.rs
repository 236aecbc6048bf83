//! SQLite cache implementation

use std::path::{Path, PathBuf};
use std::time::Duration;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params, OptionalExtension};
use serde::de::DeserializeOwned;
use crate::Result;
use crate::record::{CompanyRecord, FilingRecord, FinancialSnapshot, StatementKind};
use super::schema;

/// How long a connection waits on another writer's lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed cache for companies, filings and financial snapshots.
///
/// The store only remembers the database path. Every operation opens its own
/// connection and closes it on return, so the store can be shared freely
/// between request handlers; concurrent writers are serialized by SQLite's
/// file lock.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    /// Open a database file (creates it and the schema if missing)
    pub fn open(path: &Path) -> Result<Self> {
        let store = Self { path: path.to_path_buf() };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        for stmt in schema::all_schema_statements() {
            conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Company Operations ==========

    /// Insert or replace a company, keyed by ticker
    pub fn put_company(&self, company: &CompanyRecord) -> Result<()> {
        let data = serde_json::to_string(company)?;
        self.connect()?.execute(
            r#"
            INSERT OR REPLACE INTO companies (ticker, cik, name, data, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                company.ticker,
                company.cik,
                company.name,
                data,
                Utc::now().timestamp(),
            ],
        )?;
        Ok(())
    }

    /// Get a company by ticker
    pub fn get_company(&self, ticker: &str) -> Result<Option<CompanyRecord>> {
        self.connect()?
            .query_row(
                "SELECT data FROM companies WHERE ticker = ?1",
                [ticker],
                |row| decode_blob(row, 0),
            )
            .optional()
            .map_err(Into::into)
    }

    // ========== Filing Operations ==========

    /// Insert or replace a filing, keyed by accession number
    pub fn put_filing(&self, filing: &FilingRecord) -> Result<()> {
        self.put_filing_at(filing, Utc::now())
    }

    /// Insert or replace a filing with an explicit cache timestamp
    pub fn put_filing_at(&self, filing: &FilingRecord, updated_at: DateTime<Utc>) -> Result<()> {
        let data = serde_json::to_string(filing)?;
        self.connect()?.execute(
            r#"
            INSERT OR REPLACE INTO filings (accession_no, ticker, form, filing_date, data, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                filing.accession_no,
                filing.ticker,
                filing.form,
                filing.filing_date.to_string(),
                data,
                updated_at.timestamp(),
            ],
        )?;
        Ok(())
    }

    /// Get a filing by accession number
    pub fn get_filing(&self, accession_no: &str) -> Result<Option<FilingRecord>> {
        self.connect()?
            .query_row(
                "SELECT data FROM filings WHERE accession_no = ?1",
                [accession_no],
                |row| decode_blob(row, 0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Cached filings for a ticker, newest first, optionally restricted to one form
    pub fn get_filings(&self, ticker: &str, form: Option<&str>) -> Result<Vec<CachedFiling>> {
        let conn = self.connect()?;

        let sql = if form.is_some() {
            "SELECT data, updated_at FROM filings
             WHERE ticker = ?1 AND form = ?2
             ORDER BY filing_date DESC"
        } else {
            "SELECT data, updated_at FROM filings
             WHERE ticker = ?1
             ORDER BY filing_date DESC"
        };

        let mut stmt = conn.prepare(sql)?;

        let filings = if let Some(f) = form {
            stmt.query_map(params![ticker, f], row_to_cached_filing)?
                .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
            stmt.query_map(params![ticker], row_to_cached_filing)?
                .collect::<rusqlite::Result<Vec<_>>>()?
        };

        Ok(filings)
    }

    // ========== Financial Operations ==========

    /// Insert or replace the snapshot for (ticker, statement)
    pub fn put_financial(&self, snapshot: &FinancialSnapshot) -> Result<()> {
        let data = serde_json::to_string(snapshot)?;
        self.connect()?.execute(
            r#"
            INSERT OR REPLACE INTO financials (ticker, statement_type, data, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                snapshot.ticker,
                snapshot.statement.as_str(),
                data,
                snapshot.fetched_at.timestamp(),
            ],
        )?;
        Ok(())
    }

    /// Get the cached snapshot for (ticker, statement)
    pub fn get_financial(&self, ticker: &str, statement: StatementKind) -> Result<Option<FinancialSnapshot>> {
        self.connect()?
            .query_row(
                "SELECT data FROM financials WHERE ticker = ?1 AND statement_type = ?2",
                params![ticker, statement.as_str()],
                |row| decode_blob(row, 0),
            )
            .optional()
            .map_err(Into::into)
    }

    // ========== Statistics ==========

    /// Row counts of every cache table
    pub fn stats(&self) -> Result<CacheStats> {
        let conn = self.connect()?;
        let count = |table: &str| -> Result<usize> {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(CacheStats {
            companies: count("companies")?,
            filings: count("filings")?,
            financials: count("financials")?,
        })
    }
}

/// Deserialize the JSON blob in column `idx`
fn decode_blob<T: DeserializeOwned>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let data: String = row.get(idx)?;
    serde_json::from_str(&data).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_cached_filing(row: &rusqlite::Row) -> rusqlite::Result<CachedFiling> {
    let filing = decode_blob(row, 0)?;
    let ts: i64 = row.get(1)?;
    let updated_at = DateTime::from_timestamp(ts, 0).ok_or_else(|| {
        rusqlite::Error::IntegralValueOutOfRange(1, ts)
    })?;
    Ok(CachedFiling { filing, updated_at })
}

/// A cached filing with the time it was written
#[derive(Debug, Clone)]
pub struct CachedFiling {
    pub filing: FilingRecord,
    pub updated_at: DateTime<Utc>,
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub companies: usize,
    pub filings: usize,
    pub financials: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cache Statistics:")?;
        writeln!(f, "  Companies: {}", self.companies)?;
        writeln!(f, "  Filings: {}", self.filings)?;
        writeln!(f, "  Financials: {}", self.financials)
    }
}
