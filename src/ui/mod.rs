//! Terminal output for the CLI

pub mod palette;
pub mod report;
pub mod table;

pub use palette::Palette;
pub use report::{cache_report, identity_hint, startup_banner};
pub use table::stats_table;
