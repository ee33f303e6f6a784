//! Scraped league-table text → canonical season/record lines.
//!
//! Raw input is organised in blocks:
//!
//! ```text
//! 2021-2022
//! 1
//! Manchester City
//! 38	29	6	3	99	26	73	93
//! 2
//! Liverpool
//! 38	28	8	2	94	26	68	92
//! ```
//!
//! A season header, then repeating groups of an optional bare rank number,
//! a team-name line and a tab-separated statistics line (played, won, drawn,
//! lost, goals for, goals against, goal difference, points). The rank number
//! is ignored; positions come from a counter reset at every header.
//!
//! Output is the canonical text read by `ingest::canonical`: header lines
//! interleaved with ten-field comma-separated rows, no column header row.

use crate::model::{is_season_header, LineDiagnostic, ParseOutcome, SkipReason};

/// Number of tab-separated fields on a statistics line.
pub const STATS_FIELDS: usize = 8;

/// Canonical text plus counts of what went into it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedText {
    pub canonical: String,
    pub seasons: usize,
    pub records: usize,
}

/// A team name waiting for its statistics line.
struct PendingTeam {
    name: String,
    line_number: usize,
}

fn missing(team: PendingTeam, diagnostics: &mut Vec<LineDiagnostic>) {
    diagnostics.push(LineDiagnostic {
        line_number: team.line_number,
        line: team.name.clone(),
        reason: SkipReason::MissingStatistics { team: team.name },
    });
}

fn is_bare_integer(line: &str) -> bool {
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}

/// Splits a statistics line into its eight trimmed fields, or `None` if the
/// line does not hold exactly eight integers.
pub fn parse_stats_line(line: &str) -> Option<Vec<&str>> {
    let fields: Vec<&str> = line
        .split('\t')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    if fields.len() != STATS_FIELDS {
        return None;
    }
    if fields.iter().all(|f| f.parse::<i64>().is_ok()) {
        Some(fields)
    } else {
        None
    }
}

/// Converts raw scraped standings into canonical text.
///
/// Team names that never receive a valid statistics line are dropped and
/// reported as diagnostics rather than lost silently:
///   - a header or end of input while a team is pending → `MissingStatistics`
///   - a tab-free line where statistics were expected is taken as the next
///     team name; the pending team gets `MissingStatistics`
///   - a tabbed line that is not eight integers → `MalformedStatistics`
///
/// Positions only advance when a record is emitted, so every block's
/// positions run `1..=N` over the records actually produced.
pub fn normalize_raw_standings(raw: &str) -> ParseOutcome<NormalizedText> {
    let mut lines_out: Vec<String> = Vec::new();
    let mut diagnostics = Vec::new();
    let mut out = NormalizedText::default();

    let mut position: u32 = 1;
    let mut pending: Option<PendingTeam> = None;

    for (idx, line) in raw.lines().enumerate() {
        let line_number = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if is_season_header(line) {
            if let Some(team) = pending.take() {
                missing(team, &mut diagnostics);
            }
            lines_out.push(line.to_string());
            out.seasons += 1;
            position = 1;
            continue;
        }

        if is_bare_integer(line) {
            continue;
        }

        let Some(team) = pending.take() else {
            pending = Some(PendingTeam {
                name: line.to_string(),
                line_number,
            });
            continue;
        };

        match parse_stats_line(line) {
            Some(stats) => {
                let mut row = Vec::with_capacity(STATS_FIELDS + 2);
                let position_field = position.to_string();
                row.push(position_field.as_str());
                row.push(team.name.as_str());
                row.extend(stats);
                lines_out.push(row.join(","));
                out.records += 1;
                position += 1;
            }
            None if !line.contains('\t') => {
                missing(team, &mut diagnostics);
                pending = Some(PendingTeam {
                    name: line.to_string(),
                    line_number,
                });
            }
            None => {
                diagnostics.push(LineDiagnostic {
                    line_number,
                    line: line.to_string(),
                    reason: SkipReason::MalformedStatistics { team: team.name },
                });
            }
        }
    }

    if let Some(team) = pending.take() {
        missing(team, &mut diagnostics);
    }

    out.canonical = lines_out.join("\n");
    ParseOutcome {
        value: out,
        diagnostics,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
