//! Parser for the EDGAR "current events" Atom feed
//!
//! Every submission appears once per role (Filer, Reporting, Subject...), so
//! entries are deduplicated by accession number keeping the first occurrence.

use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::record::FilingRecord;

/// Page sizes the feed accepts
const FEED_PAGE_SIZES: &[usize] = &[10, 20, 40, 80, 100];

/// Smallest page size that covers `limit`, capped at the feed maximum
pub fn page_size(limit: usize) -> usize {
    FEED_PAGE_SIZES
        .iter()
        .copied()
        .find(|size| *size >= limit)
        .unwrap_or(100)
}

struct FeedPatterns {
    entry: Regex,
    title: Regex,
    heading: Regex,
    accession: Regex,
    updated: Regex,
    size: Regex,
}

fn patterns() -> &'static FeedPatterns {
    static PATTERNS: OnceLock<FeedPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| FeedPatterns {
        entry: Regex::new(r"(?s)<entry>(.*?)</entry>").unwrap(),
        title: Regex::new(r"(?s)<title>(.*?)</title>").unwrap(),
        heading: Regex::new(r"^(?P<form>.+?) - (?P<name>.+) \((?P<cik>\d{10})\) \([^)]*\)$").unwrap(),
        accession: Regex::new(r"accession-number=(\d{10}-\d{2}-\d{6})").unwrap(),
        updated: Regex::new(r"<updated>(\d{4}-\d{2}-\d{2})").unwrap(),
        size: Regex::new(r"Size:(?:&lt;/b&gt;|</b>)?\s*(\d+)\s*(KB|MB|GB)").unwrap(),
    })
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn size_in_bytes(amount: u64, unit: &str) -> u64 {
    match unit {
        "KB" => amount.saturating_mul(1 << 10),
        "MB" => amount.saturating_mul(1 << 20),
        "GB" => amount.saturating_mul(1 << 30),
        _ => amount,
    }
}

/// Extract filings from the feed body, feed order preserved.
/// Entries missing a title, accession number or date are skipped.
pub fn parse_current_feed(xml: &str) -> Vec<FilingRecord> {
    let p = patterns();
    let mut seen = HashSet::new();
    let mut filings = Vec::new();

    for entry in p.entry.captures_iter(xml) {
        let body = &entry[1];

        let Some(title) = p.title.captures(body).map(|c| unescape(c[1].trim())) else {
            continue;
        };
        let Some(heading) = p.heading.captures(&title) else {
            tracing::debug!("skipping feed entry with title {:?}", title);
            continue;
        };
        let Some(accession_no) = p.accession.captures(body).map(|c| c[1].to_string()) else {
            continue;
        };
        let Some(filing_date) = p
            .updated
            .captures(body)
            .and_then(|c| NaiveDate::parse_from_str(&c[1], "%Y-%m-%d").ok())
        else {
            continue;
        };

        if !seen.insert(accession_no.clone()) {
            continue;
        }

        let size = p
            .size
            .captures(body)
            .and_then(|c| c[1].parse::<u64>().ok().map(|n| size_in_bytes(n, &c[2])))
            .unwrap_or(0);

        let cik = heading["cik"].trim_start_matches('0').to_string();

        filings.push(FilingRecord {
            accession_no,
            form: heading["form"].to_string(),
            filing_date,
            company_name: heading["name"].to_string(),
            ticker: None,
            cik: Some(cik),
            description: String::new(),
            size,
        });
    }

    filings
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="ISO-8859-1" ?>
<feed xmlns="http://www.w3.org/2005/Atom">
<title>Latest Filings - Fri, 01 Nov 2024 06:05:01 EDT</title>
<updated>2024-11-01T06:05:01-04:00</updated>
<entry>
<title>10-K - Apple Inc. (0000320193) (Filer)</title>
<link rel="alternate" type="text/html" href="https://www.sec.gov/Archives/edgar/data/320193/000032019324000123/0000320193-24-000123-index.htm"/>
<summary type="html"> &lt;b&gt;Filed:&lt;/b&gt; 2024-11-01 &lt;b&gt;AccNo:&lt;/b&gt; 0000320193-24-000123 &lt;b&gt;Size:&lt;/b&gt; 9 MB</summary>
<updated>2024-11-01T06:01:36-04:00</updated>
<category scheme="https://www.sec.gov/" label="form type" term="10-K"/>
<id>urn:tag:sec.gov,2008:accession-number=0000320193-24-000123</id>
</entry>
<entry>
<title>4 - SMITH JOHN (0001234567) (Reporting)</title>
<summary type="html"> &lt;b&gt;Filed:&lt;/b&gt; 2024-10-31 &lt;b&gt;AccNo:&lt;/b&gt; 0001234567-24-000001 &lt;b&gt;Size:&lt;/b&gt; 4 KB</summary>
<updated>2024-10-31T17:30:00-04:00</updated>
<id>urn:tag:sec.gov,2008:accession-number=0001234567-24-000001</id>
</entry>
<entry>
<title>4 - Johnson &amp; Johnson (0000200406) (Issuer)</title>
<summary type="html"> &lt;b&gt;Filed:&lt;/b&gt; 2024-10-31 &lt;b&gt;AccNo:&lt;/b&gt; 0001234567-24-000001 &lt;b&gt;Size:&lt;/b&gt; 4 KB</summary>
<updated>2024-10-31T17:30:00-04:00</updated>
<id>urn:tag:sec.gov,2008:accession-number=0001234567-24-000001</id>
</entry>
<entry>
<title>Malformed entry</title>
<updated>2024-10-31T17:30:00-04:00</updated>
</entry>
</feed>"#;

    #[test]
    fn test_parse_entries() {
        let filings = parse_current_feed(FEED);
        assert_eq!(filings.len(), 2);

        let annual = &filings[0];
        assert_eq!(annual.form, "10-K");
        assert_eq!(annual.company_name, "Apple Inc.");
        assert_eq!(annual.cik.as_deref(), Some("320193"));
        assert_eq!(annual.accession_no, "0000320193-24-000123");
        assert_eq!(annual.filing_date, NaiveDate::from_ymd_opt(2024, 11, 1).unwrap());
        assert_eq!(annual.size, 9 * 1024 * 1024);
    }

    #[test]
    fn test_duplicate_roles_collapsed() {
        let filings = parse_current_feed(FEED);
        let insider: Vec<_> = filings
            .iter()
            .filter(|f| f.accession_no == "0001234567-24-000001")
            .collect();
        assert_eq!(insider.len(), 1);
        assert_eq!(insider[0].company_name, "SMITH JOHN");
        assert_eq!(insider[0].size, 4096);
    }

    #[test]
    fn test_page_size() {
        assert_eq!(page_size(5), 10);
        assert_eq!(page_size(50), 80);
        assert_eq!(page_size(100), 100);
        assert_eq!(page_size(500), 100);
    }

    #[test]
    fn test_unescape_entities() {
        assert_eq!(unescape("Johnson &amp; Johnson"), "Johnson & Johnson");
        assert_eq!(unescape("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_size_units() {
        assert_eq!(size_in_bytes(12, "KB"), 12 * 1024);
        assert_eq!(size_in_bytes(3, "MB"), 3 * 1024 * 1024);
        assert_eq!(size_in_bytes(7, "bytes"), 7);
        assert_eq!(size_in_bytes(u64::MAX / 2, "GB"), u64::MAX);
    }
}
