//! Explorer - cache policy over a `FilingProvider`
//!
//! Companies and filing list pages are written through to the cache on every
//! successful provider call. Company reads are cache-first; filing lists are
//! served from the cache only when it holds a full, fresh page.

use axum::body::Bytes;
use chrono::{TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::attachment;
use crate::provider::{FilingProvider, ProviderError};
use crate::record::{
    AttachmentInfo, AttachmentLink, CompanyRecord, FilingDetail, FilingRecord, FinancialSnapshot,
    Financials,
};
use crate::storage::{CacheStore, CachedFiling};
use crate::{Error, Result};

/// Maximum number of candidates returned by a fuzzy company search
pub const SEARCH_LIMIT: usize = 10;

/// Raw attachment content ready to be sent
#[derive(Debug, Clone)]
pub struct AttachmentContent {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

pub struct Explorer {
    provider: Arc<dyn FilingProvider>,
    store: CacheStore,
    filings_ttl: Duration,
}

/// Provider `NotFound` stays a not-found; anything else is a provider fault
fn lift(err: ProviderError) -> Error {
    match err {
        ProviderError::NotFound(what) => Error::NotFound(what),
        other => Error::Provider(other),
    }
}

impl Explorer {
    pub fn new(provider: Arc<dyn FilingProvider>, store: CacheStore) -> Self {
        Self {
            provider,
            store,
            filings_ttl: Duration::from_secs(crate::config::DEFAULT_FILINGS_TTL_SECS),
        }
    }

    pub fn with_filings_ttl(mut self, ttl: Duration) -> Self {
        self.filings_ttl = ttl;
        self
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    // ========== Companies ==========

    /// Direct ticker lookup first, fuzzy search on any failure.
    /// Every returned company is cached.
    pub async fn search_companies(&self, query: &str) -> Result<Vec<CompanyRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("search query must not be empty".to_string()));
        }

        let ticker = query.to_uppercase();
        match self.provider.company(&ticker).await {
            Ok(company) => {
                self.store.put_company(&company)?;
                return Ok(vec![company]);
            }
            Err(err) => debug!("direct lookup of {ticker} failed ({err}), falling back to search"),
        }

        let mut candidates = self.provider.search_companies(query, SEARCH_LIMIT).await.map_err(|err| {
            error!("company search for {query:?} failed: {err}");
            Error::Provider(err)
        })?;
        candidates.truncate(SEARCH_LIMIT);

        for company in &candidates {
            self.store.put_company(company)?;
        }
        Ok(candidates)
    }

    /// Cache first, provider on miss
    pub async fn company(&self, ticker: &str) -> Result<CompanyRecord> {
        let ticker = ticker.trim().to_uppercase();
        if let Some(cached) = self.store.get_company(&ticker)? {
            debug!("cache hit for company {ticker}");
            return Ok(cached);
        }

        let company = self.provider.company(&ticker).await.map_err(|err| {
            error!("error getting company {ticker}: {err}");
            lift(err)
        })?;

        self.store.put_company(&company)?;
        Ok(company)
    }

    // ========== Filings ==========

    fn is_fresh(&self, page: &[CachedFiling]) -> bool {
        let Ok(ttl) = TimeDelta::from_std(self.filings_ttl) else {
            return true;
        };
        let now = Utc::now();
        page.iter().all(|cached| now - cached.updated_at <= ttl)
    }

    /// At most `limit` filings of one company, newest first.
    ///
    /// The cache answers when it already holds `limit` filings for the ticker
    /// (and form) and none of them is older than the TTL. Otherwise the
    /// provider is asked and every returned filing is written through.
    pub async fn list_filings(&self, ticker: &str, form: Option<&str>, limit: usize) -> Result<Vec<FilingRecord>> {
        let ticker = ticker.trim().to_uppercase();
        let form = form.map(str::trim).filter(|f| !f.is_empty());

        let cached = self.store.get_filings(&ticker, form)?;
        if !cached.is_empty() && cached.len() >= limit && self.is_fresh(&cached[..limit]) {
            debug!("serving {limit} cached filings for {ticker}");
            return Ok(cached.into_iter().take(limit).map(|c| c.filing).collect());
        }

        let mut filings = self.provider.company_filings(&ticker, form).await.map_err(|err| {
            error!("error getting filings for {ticker}: {err}");
            lift(err)
        })?;
        filings.sort_by(|a, b| b.filing_date.cmp(&a.filing_date));
        filings.truncate(limit);

        for filing in &mut filings {
            filing.ticker = Some(ticker.clone());
            self.store.put_filing(filing)?;
        }
        Ok(filings)
    }

    /// Filings across all filers, newest first. Not cached.
    pub async fn recent_filings(&self, form: Option<&str>, limit: usize) -> Result<Vec<FilingRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let form = form.map(str::trim).filter(|f| !f.is_empty());

        let mut filings = self.provider.recent_filings(form, limit).await.map_err(|err| {
            error!("error getting recent filings: {err}");
            lift(err)
        })?;
        filings.truncate(limit);
        Ok(filings)
    }

    /// Filing metadata and attachments, always fetched live and never cached:
    /// the filings table only ever holds list pages.
    /// A failed attachment listing yields an empty list.
    pub async fn filing(&self, accession_no: &str) -> Result<FilingDetail> {
        let found = self.provider.filing(accession_no).await.map_err(|err| {
            error!("error getting filing {accession_no}: {err}");
            lift(err)
        })?;

        let attachments = match self.provider.attachments(accession_no).await {
            Ok(attachments) => attachments,
            Err(err) => {
                warn!("could not get attachments of {accession_no}: {err}");
                Vec::new()
            }
        };

        Ok(FilingDetail {
            filing: found.record,
            has_xbrl: found.has_xbrl,
            attachments,
        })
    }

    // ========== Financials ==========

    /// The three statements from one facts fetch. A statement the provider
    /// fails to produce is an empty list, and so is every statement when the
    /// facts cannot be fetched at all; the rest are cached and returned.
    pub async fn financials(&self, ticker: &str) -> Result<Financials> {
        let company = self.company(ticker).await?;
        let ticker = company.ticker;

        let mut financials = Financials::default();
        let statements = match self.provider.financial_statements(&ticker).await {
            Ok(statements) => statements,
            Err(err) => {
                warn!("could not get financial facts for {ticker}: {err}");
                return Ok(financials);
            }
        };

        for (statement, outcome) in statements {
            match outcome {
                Ok(rows) => {
                    self.store.put_financial(&FinancialSnapshot {
                        ticker: ticker.clone(),
                        statement,
                        rows: rows.clone(),
                        fetched_at: Utc::now(),
                    })?;
                    financials.set(statement, rows);
                }
                Err(err) => {
                    warn!("could not get {statement} for {ticker}: {err}");
                    financials.set(statement, Vec::new());
                }
            }
        }

        Ok(financials)
    }

    // ========== Attachments ==========

    /// Attachment metadata with download and view URLs
    pub async fn attachments(&self, accession_no: &str) -> Result<Vec<AttachmentLink>> {
        let attachments = self.provider.attachments(accession_no).await.map_err(|err| {
            error!("error getting attachments of {accession_no}: {err}");
            lift(err)
        })?;

        Ok(attachments
            .into_iter()
            .map(|info| {
                let download_url = format!("/api/filing/{}/attachment/{}", accession_no, info.filename);
                AttachmentLink {
                    is_viewable: attachment::is_viewable(&info.filename),
                    view_url: format!("{download_url}/view"),
                    download_url,
                    info,
                }
            })
            .collect())
    }

    async fn find_attachment(&self, accession_no: &str, filename: &str) -> Result<AttachmentInfo> {
        let attachments = self.provider.attachments(accession_no).await.map_err(|err| {
            error!("error getting attachments of {accession_no}: {err}");
            lift(err)
        })?;

        attachments
            .into_iter()
            .find(|a| a.filename == filename)
            .ok_or_else(|| Error::NotFound(format!("Attachment {filename}")))
    }

    /// Raw attachment bytes, typed by file extension
    pub async fn download_attachment(&self, accession_no: &str, filename: &str) -> Result<AttachmentContent> {
        let found = self.find_attachment(accession_no, filename).await?;

        let bytes = self.provider.download(accession_no, &found.filename).await.map_err(|err| {
            error!("error downloading {filename} of {accession_no}: {err}");
            lift(err)
        })?;

        Ok(AttachmentContent {
            content_type: attachment::content_type(&found.filename),
            filename: found.filename,
            bytes,
        })
    }

    /// Like `download_attachment`, but text types are re-encoded as UTF-8
    /// with invalid byte sequences dropped
    pub async fn view_attachment(&self, accession_no: &str, filename: &str) -> Result<AttachmentContent> {
        let mut content = self.download_attachment(accession_no, filename).await?;
        if attachment::is_inline_text(&content.filename) {
            content.bytes = Bytes::from(attachment::decode_text_lossy(&content.bytes));
        }
        Ok(content)
    }
}
