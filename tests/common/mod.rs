#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::NaiveDate;
use edgar_explorer::provider::{FilingProvider, ProviderError, ProviderFiling, ProviderResult, StatementSet};
use edgar_explorer::record::{AttachmentInfo, CompanyRecord, FilingRecord, StatementKind, StatementRow};
use edgar_explorer::{CacheStore, Explorer};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub const APPLE_10K: &str = "0000320193-24-000123";

/// In-memory provider with call counters
#[derive(Default)]
pub struct FakeProvider {
    pub companies: HashMap<String, CompanyRecord>,
    pub filings: Vec<FilingRecord>,
    pub statements: HashMap<StatementKind, Vec<StatementRow>>,
    pub failing_statements: HashSet<StatementKind>,
    /// Facts fetch fails as a whole
    pub facts_unavailable: bool,
    /// Every lookup answers 503, as during an SEC outage
    pub outage: bool,
    pub details: HashMap<String, ProviderFiling>,
    pub attachments: HashMap<String, Vec<(AttachmentInfo, Vec<u8>)>>,
    pub recent: Vec<FilingRecord>,
    pub company_calls: AtomicUsize,
    pub filings_calls: AtomicUsize,
    pub facts_calls: AtomicUsize,
}

fn unavailable(what: &str) -> ProviderError {
    ProviderError::Status {
        status: 503,
        url: format!("fake://{what}"),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn filing(accession_no: &str, form: &str, filed: NaiveDate, ticker: Option<&str>) -> FilingRecord {
    FilingRecord {
        accession_no: accession_no.to_string(),
        form: form.to_string(),
        filing_date: filed,
        company_name: "Apple Inc.".to_string(),
        ticker: ticker.map(str::to_string),
        cik: Some("320193".to_string()),
        description: format!("{form} filing"),
        size: 1000,
    }
}

fn attachment(filename: &str, kind: &str) -> AttachmentInfo {
    AttachmentInfo {
        filename: filename.to_string(),
        description: String::new(),
        kind: kind.to_string(),
        size: 0,
    }
}

fn row(concept: &str, value: f64) -> StatementRow {
    StatementRow {
        concept: concept.to_string(),
        label: concept.to_string(),
        unit: "USD".to_string(),
        value,
        end: date(2024, 9, 28),
        fiscal_year: Some(2024),
        fiscal_period: Some("FY".to_string()),
        form: Some("10-K".to_string()),
        filed: Some(date(2024, 11, 1)),
    }
}

impl FakeProvider {
    /// Apple with eight quarters of 10-Q/10-K filings, statements and one filing with attachments
    pub fn apple() -> Self {
        let mut apple = CompanyRecord::new("AAPL", "320193", "Apple Inc.");
        apple.sic = Some("3571".to_string());
        apple.industry = Some("Electronic Computers".to_string());

        let mut companies = HashMap::new();
        companies.insert("AAPL".to_string(), apple);
        companies.insert("APLE".to_string(), CompanyRecord::new("APLE", "1418091", "Apple Hospitality REIT, Inc."));
        companies.insert("MSFT".to_string(), CompanyRecord::new("MSFT", "789019", "MICROSOFT CORP"));

        let mut filings = Vec::new();
        for (i, year) in [2024, 2023, 2022, 2021].into_iter().enumerate() {
            filings.push(filing(&format!("0000320193-{:02}-0001{:02}", year % 100, i), "10-K", date(year, 11, 1), Some("AAPL")));
            filings.push(filing(&format!("0000320193-{:02}-0000{:02}", year % 100, i), "10-Q", date(year, 8, 2), Some("AAPL")));
        }

        let mut statements = HashMap::new();
        statements.insert(StatementKind::BalanceSheet, vec![row("Assets", 364_980_000_000.0)]);
        statements.insert(StatementKind::IncomeStatement, vec![row("NetIncomeLoss", 93_736_000_000.0)]);
        statements.insert(StatementKind::CashFlow, vec![row("NetCashProvidedByUsedInOperatingActivities", 118_254_000_000.0)]);

        let mut details = HashMap::new();
        details.insert(
            APPLE_10K.to_string(),
            ProviderFiling {
                record: filing(APPLE_10K, "10-K", date(2024, 11, 1), Some("AAPL")),
                has_xbrl: true,
            },
        );

        let mut attachments = HashMap::new();
        attachments.insert(
            APPLE_10K.to_string(),
            vec![
                (attachment("aapl-20240928.htm", "text/html"), b"<html>caf\xc3\xa9 \xff10-K</html>".to_vec()),
                (attachment("report.pdf", "application/pdf"), b"%PDF-1.7\n\xff\xfe\x00binary".to_vec()),
                (attachment("Financial_Report.xlsx", "application/vnd.ms-excel"), vec![0x50, 0x4b, 0x03, 0x04, 0xff]),
            ],
        );

        let recent = vec![
            filing("0000320193-24-000123", "10-K", date(2024, 11, 1), None),
            filing("0001234567-24-000001", "4", date(2024, 10, 31), None),
            filing("0000789019-24-000099", "10-Q", date(2024, 10, 30), None),
        ];

        Self {
            companies,
            filings,
            statements,
            details,
            attachments,
            recent,
            ..Default::default()
        }
    }

    pub fn company_calls(&self) -> usize {
        self.company_calls.load(Ordering::SeqCst)
    }

    pub fn filings_calls(&self) -> usize {
        self.filings_calls.load(Ordering::SeqCst)
    }

    pub fn facts_calls(&self) -> usize {
        self.facts_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FilingProvider for FakeProvider {
    async fn company(&self, ticker: &str) -> ProviderResult<CompanyRecord> {
        self.company_calls.fetch_add(1, Ordering::SeqCst);
        if self.outage {
            return Err(unavailable("company"));
        }
        self.companies
            .get(ticker)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("Company {ticker}")))
    }

    async fn search_companies(&self, query: &str, limit: usize) -> ProviderResult<Vec<CompanyRecord>> {
        let needle = query.to_uppercase();
        let mut hits: Vec<CompanyRecord> = self
            .companies
            .values()
            .filter(|c| c.name.to_uppercase().contains(&needle) || c.ticker.starts_with(&needle))
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn company_filings(&self, ticker: &str, form: Option<&str>) -> ProviderResult<Vec<FilingRecord>> {
        self.filings_calls.fetch_add(1, Ordering::SeqCst);
        if self.outage {
            return Err(unavailable("submissions"));
        }
        if !self.companies.contains_key(ticker) {
            return Err(ProviderError::NotFound(format!("Company {ticker}")));
        }
        Ok(self
            .filings
            .iter()
            .filter(|f| f.ticker.as_deref() == Some(ticker))
            .filter(|f| form.is_none_or(|form| f.form == form))
            .cloned()
            .collect())
    }

    async fn financial_statements(&self, ticker: &str) -> ProviderResult<StatementSet> {
        self.facts_calls.fetch_add(1, Ordering::SeqCst);
        if self.outage || self.facts_unavailable {
            return Err(unavailable(&format!("facts/{ticker}")));
        }
        Ok(StatementKind::all()
            .iter()
            .map(|&statement| {
                let rows = if self.failing_statements.contains(&statement) {
                    Err(ProviderError::Decode(format!("no {statement} for {ticker}")))
                } else {
                    Ok(self.statements.get(&statement).cloned().unwrap_or_default())
                };
                (statement, rows)
            })
            .collect())
    }

    async fn filing(&self, accession_no: &str) -> ProviderResult<ProviderFiling> {
        if self.outage {
            return Err(unavailable("archives"));
        }
        self.details
            .get(accession_no)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("Filing {accession_no}")))
    }

    async fn attachments(&self, accession_no: &str) -> ProviderResult<Vec<AttachmentInfo>> {
        self.attachments
            .get(accession_no)
            .map(|list| list.iter().map(|(info, _)| info.clone()).collect())
            .ok_or_else(|| ProviderError::NotFound(format!("Filing {accession_no}")))
    }

    async fn download(&self, accession_no: &str, filename: &str) -> ProviderResult<Bytes> {
        self.attachments
            .get(accession_no)
            .and_then(|list| list.iter().find(|(info, _)| info.filename == filename))
            .map(|(_, bytes)| Bytes::from(bytes.clone()))
            .ok_or_else(|| ProviderError::NotFound(format!("Attachment {filename}")))
    }

    async fn recent_filings(&self, form: Option<&str>, limit: usize) -> ProviderResult<Vec<FilingRecord>> {
        Ok(self
            .recent
            .iter()
            .filter(|f| form.is_none_or(|form| f.form == form))
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Explorer over a fake provider and a cache in a temp directory
pub struct TestEnv {
    _tmp: TempDir,
    pub provider: Arc<FakeProvider>,
    pub explorer: Explorer,
}

impl TestEnv {
    pub fn new(provider: FakeProvider) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let store = CacheStore::open(&tmp.path().join("edgar_cache.db")).expect("open cache");
        let provider = Arc::new(provider);
        let explorer = Explorer::new(provider.clone(), store);
        Self {
            _tmp: tmp,
            provider,
            explorer,
        }
    }

    pub fn apple() -> Self {
        Self::new(FakeProvider::apple())
    }

    pub fn store(&self) -> &CacheStore {
        self.explorer.store()
    }
}
