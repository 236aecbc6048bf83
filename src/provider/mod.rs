//! Filing-data provider
//!
//! `FilingProvider` is the seam between the explorer and the data source.
//! `EdgarClient` implements it against the public SEC EDGAR endpoints; tests
//! substitute their own implementation.

pub mod edgar;
pub mod facts;
pub mod feed;

use async_trait::async_trait;
use axum::body::Bytes;
use std::time::Duration;

use crate::record::{AttachmentInfo, CompanyRecord, FilingRecord, StatementKind, StatementRow};

pub use edgar::EdgarClient;

/// Result type for provider calls
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Provider failures. An outage is never reported as an empty result.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
    }
}

/// Per-statement outcome of one financial facts fetch
pub type StatementSet = Vec<(StatementKind, ProviderResult<Vec<StatementRow>>)>;

/// A single filing as returned by accession-number lookup
#[derive(Debug, Clone)]
pub struct ProviderFiling {
    pub record: FilingRecord,
    pub has_xbrl: bool,
}

/// Immutable settings for the outbound provider client
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// "Name contact@example.com", sent as the User-Agent
    pub identity: String,
    pub timeout: Duration,
    /// Base of www.sec.gov (tickers, archives, current feed)
    pub www_base: String,
    /// Base of data.sec.gov (submissions, company facts)
    pub data_base: String,
}

impl ProviderConfig {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            timeout: Duration::from_secs(crate::config::DEFAULT_REQUEST_TIMEOUT_SECS),
            www_base: "https://www.sec.gov".to_string(),
            data_base: "https://data.sec.gov".to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Lookup service for companies, filings, statements and attachments
#[async_trait]
pub trait FilingProvider: Send + Sync {
    /// Direct lookup by ticker
    async fn company(&self, ticker: &str) -> ProviderResult<CompanyRecord>;

    /// Fuzzy search by ticker or name, best matches first
    async fn search_companies(&self, query: &str, limit: usize) -> ProviderResult<Vec<CompanyRecord>>;

    /// Filings of one company, newest first
    async fn company_filings(&self, ticker: &str, form: Option<&str>) -> ProviderResult<Vec<FilingRecord>>;

    /// All three financial statements from a single facts fetch. The outer
    /// error means the facts could not be fetched at all; an inner error
    /// means that one statement could not be produced.
    async fn financial_statements(&self, ticker: &str) -> ProviderResult<StatementSet>;

    async fn filing(&self, accession_no: &str) -> ProviderResult<ProviderFiling>;

    async fn attachments(&self, accession_no: &str) -> ProviderResult<Vec<AttachmentInfo>>;

    /// Raw content of one attachment
    async fn download(&self, accession_no: &str, filename: &str) -> ProviderResult<Bytes>;

    /// Latest filings across all filers, newest first
    async fn recent_filings(&self, form: Option<&str>, limit: usize) -> ProviderResult<Vec<FilingRecord>>;
}
