//! Record types - the uniform shapes every provider result is mapped into
//!
//! Three of them are cached:
//! - `CompanyRecord`: keyed by ticker
//! - `FilingRecord`: keyed by accession number
//! - `FinancialSnapshot`: keyed by (ticker, statement kind)

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A filer as returned by company lookup and search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub ticker: String,
    pub cik: String,
    pub name: String,
    pub sic: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
}

impl CompanyRecord {
    pub fn new(ticker: impl Into<String>, cik: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into().to_uppercase(),
            cik: cik.into(),
            name: name.into(),
            sic: None,
            industry: None,
            description: None,
        }
    }
}

/// One filing submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingRecord {
    pub accession_no: String,
    pub form: String,
    pub filing_date: NaiveDate,
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cik: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub size: u64,
}

/// Filing detail with its attachment listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingDetail {
    #[serde(flatten)]
    pub filing: FilingRecord,
    pub has_xbrl: bool,
    pub attachments: Vec<AttachmentInfo>,
}

/// Metadata of a single document bundled in a filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentInfo {
    pub filename: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub size: u64,
}

/// Attachment metadata plus the URLs the API serves it from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentLink {
    #[serde(flatten)]
    pub info: AttachmentInfo,
    pub is_viewable: bool,
    pub download_url: String,
    pub view_url: String,
}

/// The three financial statements served by the financials endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    BalanceSheet,
    IncomeStatement,
    CashFlow,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::BalanceSheet => "balance_sheet",
            StatementKind::IncomeStatement => "income_statement",
            StatementKind::CashFlow => "cash_flow",
        }
    }

    pub fn all() -> &'static [StatementKind] {
        &[
            StatementKind::BalanceSheet,
            StatementKind::IncomeStatement,
            StatementKind::CashFlow,
        ]
    }
}

impl FromStr for StatementKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "balance_sheet" => Ok(StatementKind::BalanceSheet),
            "income_statement" => Ok(StatementKind::IncomeStatement),
            "cash_flow" => Ok(StatementKind::CashFlow),
            _ => Err(Error::InvalidInput(format!("unknown statement kind: {}", s))),
        }
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line item of a financial statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    pub concept: String,
    pub label: String,
    pub unit: String,
    pub value: f64,
    pub end: NaiveDate,
    pub fiscal_year: Option<i32>,
    pub fiscal_period: Option<String>,
    pub form: Option<String>,
    pub filed: Option<NaiveDate>,
}

/// A cached financial statement for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub ticker: String,
    pub statement: StatementKind,
    pub rows: Vec<StatementRow>,
    pub fetched_at: DateTime<Utc>,
}

/// Response body of the financials endpoint. A statement the provider could
/// not produce is an empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    pub balance_sheet: Vec<StatementRow>,
    pub income_statement: Vec<StatementRow>,
    pub cash_flow: Vec<StatementRow>,
}

impl Financials {
    pub fn set(&mut self, statement: StatementKind, rows: Vec<StatementRow>) {
        match statement {
            StatementKind::BalanceSheet => self.balance_sheet = rows,
            StatementKind::IncomeStatement => self.income_statement = rows,
            StatementKind::CashFlow => self.cash_flow = rows,
        }
    }
}

/// Entry of the fixed form-type reference list.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FormType {
    pub value: &'static str,
    pub text: &'static str,
}

const FORM_TYPES: &[FormType] = &[
    FormType { value: "10-K", text: "10-K - Annual Report" },
    FormType { value: "10-Q", text: "10-Q - Quarterly Report" },
    FormType { value: "8-K", text: "8-K - Current Report" },
    FormType { value: "DEF 14A", text: "DEF 14A - Proxy Statement" },
    FormType { value: "13F-HR", text: "13F-HR - Institutional Holdings" },
    FormType { value: "4", text: "Form 4 - Insider Transactions" },
    FormType { value: "3", text: "Form 3 - Initial Insider Ownership" },
    FormType { value: "5", text: "Form 5 - Annual Insider Summary" },
    FormType { value: "S-1", text: "S-1 - Registration Statement" },
    FormType { value: "424B4", text: "424B4 - Prospectus" },
    FormType { value: "NPORT-P", text: "NPORT-P - Fund Portfolio Holdings" },
];

/// Common SEC form types.
pub fn form_types() -> &'static [FormType] {
    FORM_TYPES
}
