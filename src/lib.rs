//! # EDGAR Explorer
//!
//! REST proxy over SEC EDGAR data with a local SQLite cache.
//!
//! EDGAR Explorer provides:
//! - Company lookup and search by ticker or name
//! - Filing listings per company and across all filers
//! - Balance sheet, income and cash flow statements from XBRL company facts
//! - Attachment listing, download and inline viewing
//! - Write-through caching of companies, filings and financial snapshots

pub mod attachment;
pub mod config;
pub mod explorer;
pub mod provider;
pub mod record;
pub mod server;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use explorer::Explorer;
pub use provider::{EdgarClient, FilingProvider, ProviderError};
pub use record::{CompanyRecord, FilingRecord, FinancialSnapshot, StatementKind};
pub use storage::CacheStore;

/// Result type alias for EDGAR Explorer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for EDGAR Explorer operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
