//! Storage Layer - SQLite-backed cache
//!
//! Tables:
//! - companies(ticker, cik, name, data, updated_at)
//! - filings(accession_no, ticker, form, filing_date, data, updated_at)
//! - financials(ticker, statement_type, data, updated_at)
//!
//! `data` holds the serialized record; the other columns are derived from the
//! same record on every write and exist only for lookups and filtering.

pub mod schema;
pub mod sqlite;

pub use sqlite::{CacheStore, CacheStats, CachedFiling};
