//! SEC EDGAR client
//!
//! Endpoints used:
//! - `www.sec.gov/files/company_tickers.json`: ticker directory
//! - `data.sec.gov/submissions/CIK##########.json`: profile and recent filings
//! - `data.sec.gov/api/xbrl/companyfacts/CIK##########.json`: XBRL facts
//! - `www.sec.gov/Archives/edgar/data/{cik}/{accession}/`: filing documents
//! - `www.sec.gov/cgi-bin/browse-edgar?action=getcurrent`: latest filings feed

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::OnceCell;
use tracing::{debug, error};

use super::facts::CompanyFacts;
use super::feed;
use super::{FilingProvider, ProviderConfig, ProviderError, ProviderFiling, ProviderResult, StatementSet};
use crate::record::{AttachmentInfo, CompanyRecord, FilingRecord, StatementKind};

/// HTTP client for the public EDGAR endpoints
pub struct EdgarClient {
    http: Client,
    config: ProviderConfig,
    /// Ticker directory, fetched on first use
    tickers: OnceCell<Vec<TickerEntry>>,
}

impl EdgarClient {
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        let http = reqwest::ClientBuilder::new()
            .user_agent(config.identity.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            config,
            tickers: OnceCell::new(),
        })
    }

    async fn get(&self, url: &str, what: &str) -> ProviderResult<reqwest::Response> {
        debug!("GET {url}");
        let response = self.http.get(url).send().await.map_err(|err| {
            error!("failed to fetch {url}, error({err})");
            err
        })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound(what.to_string())),
            status => Err(ProviderError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> ProviderResult<T> {
        let body = self.get(url, what).await?.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| {
            error!("failed to parse JSON from {url}, error({err})");
            ProviderError::Decode(err.to_string())
        })
    }

    async fn ticker_directory(&self) -> ProviderResult<&[TickerEntry]> {
        let entries = self
            .tickers
            .get_or_try_init(|| async {
                let url = format!("{}/files/company_tickers.json", self.config.www_base);
                let map: HashMap<String, TickerEntry> = self.get_json(&url, "ticker directory").await?;
                let mut entries: Vec<TickerEntry> = map.into_values().collect();
                // the directory is ranked by the numeric map key; keep a stable order
                entries.sort_by(|a, b| a.ticker.cmp(&b.ticker));
                Ok::<_, ProviderError>(entries)
            })
            .await?;
        Ok(entries.as_slice())
    }

    async fn resolve_ticker(&self, ticker: &str) -> ProviderResult<TickerEntry> {
        let ticker = ticker.to_uppercase();
        self.ticker_directory()
            .await?
            .iter()
            .find(|entry| entry.ticker.eq_ignore_ascii_case(&ticker))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("Company {ticker}")))
    }

    async fn submissions(&self, cik: u64) -> ProviderResult<Submissions> {
        let url = format!("{}/submissions/CIK{:010}.json", self.config.data_base, cik);
        self.get_json(&url, &format!("CIK {cik}")).await
    }

    fn archive_url(&self, cik: u64, accession_no: &str) -> String {
        format!(
            "{}/Archives/edgar/data/{}/{}",
            self.config.www_base,
            cik,
            accession_no.replace('-', "")
        )
    }
}

#[async_trait]
impl FilingProvider for EdgarClient {
    async fn company(&self, ticker: &str) -> ProviderResult<CompanyRecord> {
        let entry = self.resolve_ticker(ticker).await?;
        let submissions = self.submissions(entry.cik_str).await?;
        Ok(submissions.company(&entry))
    }

    async fn search_companies(&self, query: &str, limit: usize) -> ProviderResult<Vec<CompanyRecord>> {
        let directory = self.ticker_directory().await?;
        Ok(rank_matches(directory, query, limit)
            .into_iter()
            .map(TickerEntry::to_record)
            .collect())
    }

    async fn company_filings(&self, ticker: &str, form: Option<&str>) -> ProviderResult<Vec<FilingRecord>> {
        let entry = self.resolve_ticker(ticker).await?;
        let submissions = self.submissions(entry.cik_str).await?;
        Ok(submissions
            .filings
            .recent
            .rows(&submissions.name, Some(entry.ticker.as_str()), None)
            .into_iter()
            .map(|(filing, _)| filing)
            .filter(|filing| form.is_none_or(|f| filing.form == f))
            .collect())
    }

    async fn financial_statements(&self, ticker: &str) -> ProviderResult<StatementSet> {
        let entry = self.resolve_ticker(ticker).await?;
        let url = format!(
            "{}/api/xbrl/companyfacts/CIK{:010}.json",
            self.config.data_base, entry.cik_str
        );
        let facts: CompanyFacts = self.get_json(&url, &format!("Financial facts for {}", entry.ticker)).await?;
        if !facts.has_gaap() {
            return Err(ProviderError::NotFound(format!("us-gaap facts for {}", entry.ticker)));
        }
        Ok(StatementKind::all()
            .iter()
            .map(|&statement| (statement, Ok(facts.statement(statement))))
            .collect())
    }

    async fn filing(&self, accession_no: &str) -> ProviderResult<ProviderFiling> {
        let cik = accession_cik(accession_no)?;
        let submissions = self.submissions(cik).await?;
        let ticker = submissions.tickers.first().cloned();

        submissions
            .filings
            .recent
            .rows(&submissions.name, ticker.as_deref(), Some(cik))
            .into_iter()
            .find(|(filing, _)| filing.accession_no == accession_no)
            .map(|(record, has_xbrl)| ProviderFiling { record, has_xbrl })
            .ok_or_else(|| ProviderError::NotFound(format!("Filing {accession_no}")))
    }

    async fn attachments(&self, accession_no: &str) -> ProviderResult<Vec<AttachmentInfo>> {
        let cik = accession_cik(accession_no)?;
        let url = format!("{}/index.json", self.archive_url(cik, accession_no));
        let index: FilingIndex = self.get_json(&url, &format!("Filing {accession_no}")).await?;

        Ok(index
            .directory
            .item
            .into_iter()
            .filter(|item| item.kind != "folder.gif")
            .map(|item| AttachmentInfo {
                kind: crate::attachment::content_type(&item.name).to_string(),
                size: item.size.trim().parse().unwrap_or(0),
                filename: item.name,
                description: String::new(),
            })
            .collect())
    }

    async fn download(&self, accession_no: &str, filename: &str) -> ProviderResult<Bytes> {
        let cik = accession_cik(accession_no)?;
        let url = format!("{}/{}", self.archive_url(cik, accession_no), filename);
        let bytes = self
            .get(&url, &format!("Attachment {filename}"))
            .await?
            .bytes()
            .await?;
        Ok(bytes)
    }

    async fn recent_filings(&self, form: Option<&str>, limit: usize) -> ProviderResult<Vec<FilingRecord>> {
        let mut url = format!(
            "{}/cgi-bin/browse-edgar?action=getcurrent&owner=include&start=0&count={}&output=atom",
            self.config.www_base,
            feed::page_size(limit)
        );
        if let Some(f) = form {
            url.push_str("&type=");
            url.push_str(&f.replace(' ', "+"));
        }

        let body = self.get(&url, "current filings feed").await?.text().await?;
        Ok(feed::parse_current_feed(&body)
            .into_iter()
            .filter(|filing| form.is_none_or(|f| filing.form == f))
            .take(limit)
            .collect())
    }
}

/// CIK encoded in the first ten digits of an accession number
pub fn accession_cik(accession_no: &str) -> ProviderResult<u64> {
    let parts: Vec<&str> = accession_no.split('-').collect();
    let well_formed = matches!(parts.as_slice(), [a, b, c]
        if a.len() == 10 && b.len() == 2 && c.len() == 6
            && parts.iter().all(|p| p.bytes().all(|ch| ch.is_ascii_digit())));

    if !well_formed {
        return Err(ProviderError::NotFound(format!("Filing {accession_no}")));
    }

    parts[0]
        .parse()
        .map_err(|_| ProviderError::NotFound(format!("Filing {accession_no}")))
}

/// Directory entries ranked for a search query: exact ticker, ticker prefix,
/// then name substring. Case-insensitive.
fn rank_matches<'a>(directory: &'a [TickerEntry], query: &str, limit: usize) -> Vec<&'a TickerEntry> {
    let needle = query.trim().to_uppercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<(u8, &TickerEntry)> = directory
        .iter()
        .filter_map(|entry| {
            let ticker = entry.ticker.to_uppercase();
            let rank = if ticker == needle {
                0
            } else if ticker.starts_with(&needle) {
                1
            } else if entry.title.to_uppercase().contains(&needle) {
                2
            } else {
                return None;
            };
            Some((rank, entry))
        })
        .collect();

    ranked.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.ticker.cmp(&b.1.ticker)));
    ranked.into_iter().take(limit).map(|(_, entry)| entry).collect()
}

// de
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct TickerEntry {
    cik_str: u64,
    ticker: String,
    title: String,
}

impl TickerEntry {
    fn to_record(&self) -> CompanyRecord {
        CompanyRecord::new(&self.ticker, self.cik_str.to_string(), &self.title)
    }
}

#[derive(Debug, Deserialize)]
struct Submissions {
    name: String,
    #[serde(default)]
    sic: Option<String>,
    #[serde(rename = "sicDescription", default)]
    sic_description: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tickers: Vec<String>,
    #[serde(default)]
    filings: SubmissionFilings,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

impl Submissions {
    fn company(&self, entry: &TickerEntry) -> CompanyRecord {
        CompanyRecord {
            sic: non_blank(&self.sic),
            industry: non_blank(&self.sic_description),
            description: non_blank(&self.description),
            ..CompanyRecord::new(&entry.ticker, entry.cik_str.to_string(), &self.name)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SubmissionFilings {
    #[serde(default)]
    recent: RecentFilings,
}

/// Column-oriented filing table; index `i` across all vectors is one filing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentFilings {
    #[serde(default)]
    accession_number: Vec<String>,
    #[serde(default)]
    filing_date: Vec<String>,
    #[serde(default)]
    form: Vec<String>,
    #[serde(default)]
    size: Vec<u64>,
    #[serde(rename = "isXBRL", default)]
    is_xbrl: Vec<u8>,
    #[serde(default)]
    primary_doc_description: Vec<String>,
}

impl RecentFilings {
    /// Filings in feed order (newest first) with their XBRL flag
    fn rows(&self, company_name: &str, ticker: Option<&str>, cik: Option<u64>) -> Vec<(FilingRecord, bool)> {
        (0..self.accession_number.len())
            .filter_map(|i| {
                let raw_date = self.filing_date.get(i)?;
                let filing_date = match NaiveDate::parse_from_str(raw_date, "%Y-%m-%d") {
                    Ok(date) => date,
                    Err(err) => {
                        debug!("skipping filing with date {raw_date:?}: {err}");
                        return None;
                    }
                };

                let record = FilingRecord {
                    accession_no: self.accession_number[i].clone(),
                    form: self.form.get(i).cloned().unwrap_or_default(),
                    filing_date,
                    company_name: company_name.to_string(),
                    ticker: ticker.map(str::to_uppercase),
                    cik: cik.map(|c| c.to_string()),
                    description: self.primary_doc_description.get(i).cloned().unwrap_or_default(),
                    size: self.size.get(i).copied().unwrap_or(0),
                };
                Some((record, self.is_xbrl.get(i).is_some_and(|x| *x != 0)))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct FilingIndex {
    directory: IndexDirectory,
}

#[derive(Debug, Deserialize)]
struct IndexDirectory {
    #[serde(default)]
    item: Vec<IndexItem>,
}

#[derive(Debug, Deserialize)]
struct IndexItem {
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    size: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Vec<TickerEntry> {
        vec![
            TickerEntry { cik_str: 320193, ticker: "AAPL".into(), title: "Apple Inc.".into() },
            TickerEntry { cik_str: 1418091, ticker: "APLE".into(), title: "Apple Hospitality REIT, Inc.".into() },
            TickerEntry { cik_str: 789019, ticker: "MSFT".into(), title: "MICROSOFT CORP".into() },
            TickerEntry { cik_str: 1652044, ticker: "GOOGL".into(), title: "Alphabet Inc.".into() },
        ]
    }

    #[test]
    fn test_accession_cik() {
        assert_eq!(accession_cik("0000320193-24-000123").unwrap(), 320193);
        assert!(accession_cik("320193-24-000123").unwrap_err().is_not_found());
        assert!(accession_cik("0000320193-24-00012X").is_err());
        assert!(accession_cik("../etc/passwd").is_err());
    }

    #[test]
    fn test_rank_matches_exact_first() {
        let dir = directory();
        let hits = rank_matches(&dir, "apple", 10);
        let tickers: Vec<_> = hits.iter().map(|e| e.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAPL", "APLE"]);

        let hits = rank_matches(&dir, "aapl", 10);
        assert_eq!(hits[0].ticker, "AAPL");

        assert!(rank_matches(&dir, "   ", 10).is_empty());
        assert_eq!(rank_matches(&dir, "a", 1).len(), 1);
    }

    #[test]
    fn test_submissions_mapping() {
        let json = r#"{
            "cik": "320193",
            "name": "Apple Inc.",
            "sic": "3571",
            "sicDescription": "Electronic Computers",
            "description": "",
            "tickers": ["AAPL"],
            "filings": {
                "recent": {
                    "accessionNumber": ["0000320193-24-000123", "0000320193-24-000081"],
                    "filingDate": ["2024-11-01", "2024-08-02"],
                    "form": ["10-K", "10-Q"],
                    "size": [9876543, 5432100],
                    "isXBRL": [1, 0],
                    "primaryDocDescription": ["10-K", "10-Q"]
                }
            }
        }"#;
        let submissions: Submissions = serde_json::from_str(json).unwrap();

        let company = submissions.company(&directory()[0]);
        assert_eq!(company.ticker, "AAPL");
        assert_eq!(company.cik, "320193");
        assert_eq!(company.industry.as_deref(), Some("Electronic Computers"));
        assert_eq!(company.description, None);

        let rows = submissions.filings.recent.rows("Apple Inc.", Some("aapl"), Some(320193));
        assert_eq!(rows.len(), 2);
        assert!(rows[0].1);
        assert!(!rows[1].1);
        assert_eq!(rows[0].0.ticker.as_deref(), Some("AAPL"));
        assert_eq!(rows[0].0.cik.as_deref(), Some("320193"));
        assert_eq!(rows[1].0.size, 5432100);
    }

    #[test]
    fn test_filing_index_items() {
        let json = r#"{"directory": {"item": [
            {"last-modified": "2024-11-01 06:01:36", "name": "aapl-20240928.htm", "type": "text.gif", "size": "1534922"},
            {"last-modified": "2024-11-01 06:01:36", "name": "Financial_Report.xlsx", "type": "text.gif", "size": ""}
        ], "name": "/Archives/edgar/data/320193/000032019324000123"}}"#;
        let index: FilingIndex = serde_json::from_str(json).unwrap();
        assert_eq!(index.directory.item.len(), 2);
        assert_eq!(index.directory.item[0].size, "1534922");
    }
}
