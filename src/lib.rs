//! League standings trend analysis.
//!
//! Normalizes scraped season tables into a canonical CSV-like form, reads
//! them into a season-indexed table, and runs three analyses over it:
//! consistency filtering, season-over-season point trends with
//! notable-change detection, and top-tier boundary transitions.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod report;
pub mod seasons;
pub mod session;
