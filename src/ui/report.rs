use owo_colors::OwoColorize;
use std::net::SocketAddr;
use std::path::Path;

use crate::storage::CacheStats;
use crate::ui::palette::{stderr_palette, stdout_palette};
use crate::ui::stats_table;

const ROCKET: &str = "🚀";
const WARN: &str = "⚠️";
const STATS: &str = "📊";

fn field(marker: &str, label: &str, value: impl std::fmt::Display) {
    let palette = stdout_palette();
    println!(
        "  {} {:<9} {}",
        marker.style(palette.accent),
        format!("{label}:").style(palette.label),
        value
    );
}

/// Printed once the server has its configuration, before binding
pub fn startup_banner(identity: &str, database: &Path, addr: SocketAddr) {
    println!("{} {}", ROCKET, "Starting EDGAR Explorer".style(stdout_palette().title));
    field("👤", "Identity", identity);
    field("🗄️", "Database", database.display());
    field("🌍", "Listening", format!("http://{addr}"));
}

/// Hint for users who have not told the SEC who they are
pub fn identity_hint(env_var: &str) {
    let message = format!("Set {env_var} to 'Your Name your.email@example.com' to identify yourself to the SEC");
    eprintln!("{} {}", WARN, message.style(stderr_palette().caution));
}

pub fn cache_report(database: &Path, stats: &CacheStats) {
    let title = format!("Cache Statistics ({})", database.display());
    println!();
    println!("{} {}", STATS, title.style(stdout_palette().title));
    println!("{}", stats_table(stats));
    println!("{} rows in total", stats.companies + stats.filings + stats.financials);
}
