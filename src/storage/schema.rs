//! Database schema definitions

/// SQL to create the companies table
pub const CREATE_COMPANIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS companies (
    ticker TEXT PRIMARY KEY,
    cik TEXT NOT NULL,
    name TEXT NOT NULL,
    data TEXT NOT NULL,
    updated_at INTEGER NOT NULL
)
"#;

/// SQL to create the filings table
pub const CREATE_FILINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS filings (
    accession_no TEXT PRIMARY KEY,
    ticker TEXT,
    form TEXT NOT NULL,
    filing_date TEXT NOT NULL,
    data TEXT NOT NULL,
    updated_at INTEGER NOT NULL
)
"#;

/// SQL to create the financials table
/// One row per (ticker, statement); a refetch replaces the previous snapshot
pub const CREATE_FINANCIALS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS financials (
    ticker TEXT NOT NULL,
    statement_type TEXT NOT NULL,
    data TEXT NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (ticker, statement_type)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_filings_ticker_date ON filings(ticker, filing_date)",
    "CREATE INDEX IF NOT EXISTS idx_filings_form ON filings(form)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_COMPANIES_TABLE,
        CREATE_FILINGS_TABLE,
        CREATE_FINANCIALS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
