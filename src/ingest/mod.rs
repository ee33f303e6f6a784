//! Standings ingestion.
//!
//! Submodules:
//! - `raw_text`: scraped block text → canonical text.
//! - `canonical`: canonical text → `SeasonStandings` / `PointsEntry` rows.
//!
//! `load_standings` chains the two and logs every skipped line.

pub mod canonical;
pub mod raw_text;

use crate::logging::{self, Stage};
use crate::model::{LineDiagnostic, SeasonStandings};

/// Shape of an input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Scraped block text; normalized before reading.
    Raw,
    /// Season headers plus ten-field CSV rows.
    Canonical,
}

/// Everything ingestion produced, including what it threw away.
#[derive(Debug, Clone)]
pub struct LoadedStandings {
    pub standings: SeasonStandings,
    /// The canonical text the table was read from.
    pub canonical: String,
    /// Lines dropped by the normalizer (empty for canonical input).
    pub normalize_diagnostics: Vec<LineDiagnostic>,
    /// Lines skipped by the reader.
    pub read_diagnostics: Vec<LineDiagnostic>,
}

impl LoadedStandings {
    /// Diagnostics that indicate lost data, across both stages.
    pub fn unexpected_count(&self) -> usize {
        self.normalize_diagnostics
            .iter()
            .chain(&self.read_diagnostics)
            .filter(|d| !d.reason.is_expected())
            .count()
    }
}

/// Normalizes (for raw input) and reads a standings document.
pub fn load_standings(text: &str, format: InputFormat) -> LoadedStandings {
    let (canonical, normalize_diagnostics) = match format {
        InputFormat::Raw => {
            let outcome = raw_text::normalize_raw_standings(text);
            for diagnostic in &outcome.diagnostics {
                logging::log_diagnostic(Stage::Normalize, diagnostic);
            }
            let emitted = outcome.value.records;
            let dropped = outcome.diagnostics.len();
            logging::log_parse_summary(Stage::Normalize, emitted + dropped, emitted, dropped);
            (outcome.value.canonical, outcome.diagnostics)
        }
        InputFormat::Canonical => (text.to_string(), Vec::new()),
    };

    let outcome = canonical::read_standings(&canonical);
    for diagnostic in &outcome.diagnostics {
        logging::log_diagnostic(Stage::Read, diagnostic);
    }
    let parsed = outcome.value.len();
    let skipped = outcome.unexpected().count();
    logging::log_parse_summary(Stage::Read, parsed + skipped, parsed, skipped);
    logging::info(
        Stage::Read,
        None,
        &format!(
            "Loaded {} records across {} seasons",
            parsed,
            outcome.value.season_count()
        ),
    );

    LoadedStandings {
        standings: outcome.value,
        canonical,
        normalize_diagnostics,
        read_diagnostics: outcome.diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_and_canonical_inputs_load_the_same_table() {
        let raw = "2021-2022\n1\nAlpha\n38\t25\t5\t8\t70\t30\t40\t80\n2\nBeta\n38\t20\t10\t8\t60\t40\t20\t70\n";
        let canonical = "2021-2022\n1,Alpha,38,25,5,8,70,30,40,80\n2,Beta,38,20,10,8,60,40,20,70";

        let from_raw = load_standings(raw, InputFormat::Raw);
        let from_csv = load_standings(canonical, InputFormat::Canonical);
        assert_eq!(from_raw.canonical, canonical);
        assert_eq!(from_raw.standings.records(), from_csv.standings.records());
        assert_eq!(from_raw.unexpected_count(), 0);
    }

    #[test]
    fn test_unexpected_count_spans_both_stages() {
        let raw = "2021-2022\nAlpha\nBeta\n38\t20\t10\t8\t60\t40\t20\t70\n";
        let loaded = load_standings(raw, InputFormat::Raw);
        assert_eq!(loaded.standings.len(), 1);
        assert_eq!(loaded.normalize_diagnostics.len(), 1);
        assert_eq!(loaded.unexpected_count(), 1);
    }
}
