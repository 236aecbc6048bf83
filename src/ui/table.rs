use tabled::{settings::Style, Table, Tabled};

use crate::storage::CacheStats;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Table")]
    pub table: String,
    #[tabled(rename = "Rows")]
    pub rows: usize,
}

/// Row counts of the cache tables, one line per table
pub fn stats_table(stats: &CacheStats) -> String {
    let rows = [
        ("companies", stats.companies),
        ("filings", stats.filings),
        ("financials", stats.financials),
    ]
    .into_iter()
    .map(|(table, rows)| TableRow { table: table.to_string(), rows })
    .collect::<Vec<_>>();

    Table::new(&rows).with(Style::rounded()).to_string()
}
