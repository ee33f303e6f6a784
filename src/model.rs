//! Core data types for the league standings trend service.
//!
//! This module defines the shared domain model imported by all other modules:
//! season keys, per-team-per-season records, the indexed season table, the
//! derived delta/statistics types, and the parse diagnostics that replace
//! silent best-effort skipping.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ---------------------------------------------------------------------------
// Season keys
// ---------------------------------------------------------------------------

/// A canonical `"YYYY-YYYY"` season identifier.
///
/// Both years are always exactly four digits, so the derived lexicographic
/// `Ord` is also chronological order. Everything that sorts seasons relies
/// on this.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SeasonKey(String);

impl SeasonKey {
    /// Parses a season header line. Surrounding whitespace is ignored;
    /// anything other than four digits, a hyphen and four digits is `None`.
    pub fn parse(line: &str) -> Option<SeasonKey> {
        let line = line.trim();
        if is_season_header(line) {
            Some(SeasonKey(line.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeasonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns `true` for exactly `^\d{4}-\d{4}$`.
pub fn is_season_header(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() == 9
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit)
}

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// One team's final table row for one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamSeasonRecord {
    pub season: SeasonKey,
    pub position: u32,
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: i32,
}

impl TeamSeasonRecord {
    pub fn to_points_entry(&self) -> PointsEntry {
        PointsEntry {
            season: self.season.clone(),
            position: self.position,
            team: self.team.clone(),
            points: self.points,
        }
    }
}

/// The three fields the statistical passes actually read, plus the season.
///
/// Produced either from full records or directly by the lightweight reader
/// path, which does not validate the six middle columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointsEntry {
    pub season: SeasonKey,
    pub position: u32,
    pub team: String,
    pub points: i32,
}

// ---------------------------------------------------------------------------
// Season table
// ---------------------------------------------------------------------------

/// All parsed records, stored once, with lookup indexes by season and by team.
///
/// Within a season, records are ordered by position ascending. Team lookups
/// are case-insensitive and return records in season-ascending order.
/// The table is immutable once built.
#[derive(Debug, Clone, Default)]
pub struct SeasonStandings {
    records: Vec<TeamSeasonRecord>,
    by_season: BTreeMap<SeasonKey, Vec<usize>>,
    by_team: HashMap<String, Vec<usize>>,
}

impl SeasonStandings {
    pub fn from_records(records: Vec<TeamSeasonRecord>) -> Self {
        let mut by_season: BTreeMap<SeasonKey, Vec<usize>> = BTreeMap::new();
        for (idx, record) in records.iter().enumerate() {
            by_season.entry(record.season.clone()).or_default().push(idx);
        }
        for indexes in by_season.values_mut() {
            indexes.sort_by_key(|&i| records[i].position);
        }

        let mut by_team: HashMap<String, Vec<usize>> = HashMap::new();
        for indexes in by_season.values() {
            for &idx in indexes {
                by_team
                    .entry(records[idx].team.to_lowercase())
                    .or_default()
                    .push(idx);
            }
        }

        SeasonStandings {
            records,
            by_season,
            by_team,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in the order they were read.
    pub fn records(&self) -> &[TeamSeasonRecord] {
        &self.records
    }

    /// Distinct seasons, oldest first.
    pub fn seasons(&self) -> impl Iterator<Item = &SeasonKey> {
        self.by_season.keys()
    }

    pub fn season_count(&self) -> usize {
        self.by_season.len()
    }

    /// The table for one season, ordered by position.
    pub fn season(&self, key: &SeasonKey) -> Vec<&TeamSeasonRecord> {
        self.by_season
            .get(key)
            .map(|indexes| indexes.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    /// Every record whose team name matches `team` ignoring case,
    /// oldest season first.
    pub fn team_records(&self, team: &str) -> Vec<&TeamSeasonRecord> {
        self.by_team
            .get(&team.to_lowercase())
            .map(|indexes| indexes.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    /// Flattened lightweight view for the statistical passes, in season
    /// then position order.
    pub fn points_entries(&self) -> Vec<PointsEntry> {
        self.by_season
            .values()
            .flatten()
            .map(|&i| self.records[i].to_points_entry())
            .collect()
    }

    /// A new table containing only seasons at or after `first`.
    pub fn since(&self, first: &SeasonKey) -> SeasonStandings {
        let kept = self
            .records
            .iter()
            .filter(|r| &r.season >= first)
            .cloned()
            .collect();
        SeasonStandings::from_records(kept)
    }
}

// ---------------------------------------------------------------------------
// Derived analysis types
// ---------------------------------------------------------------------------

/// Change in a team's points between two seasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointDelta {
    pub team: String,
    pub from_season: SeasonKey,
    pub to_season: SeasonKey,
    /// Widened so that any pair of `i32` point totals has a representable difference.
    pub delta: i64,
}

/// Population statistics over a pool of deltas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionStats {
    pub mean: f64,
    /// Population standard deviation (divides by N).
    pub standard_deviation: f64,
    /// `|stddev / mean| * 100`; `None` when the mean is exactly zero.
    pub coefficient_of_variation: Option<f64>,
}

/// A delta whose distance from the mean exceeds `multiplier * stddev`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotableChange {
    pub delta: PointDelta,
    /// `|delta - mean|`
    pub deviation: f64,
}

/// Why a statistic could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatsUnavailable {
    /// No deltas at all (no team with two or more seasons).
    EmptyPool,
    /// Mean of exactly zero; the coefficient of variation is undefined.
    ZeroMean,
}

impl fmt::Display for StatsUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsUnavailable::EmptyPool => write!(f, "statistics unavailable: no point deltas"),
            StatsUnavailable::ZeroMean => {
                write!(f, "statistics unavailable: mean is zero, coefficient of variation undefined")
            }
        }
    }
}

impl std::error::Error for StatsUnavailable {}

// ---------------------------------------------------------------------------
// Parse diagnostics
// ---------------------------------------------------------------------------

/// Why an input line did not become a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// A `Position,Team,...` column header row.
    ColumnHeader,
    /// Data line that does not split into ten comma-separated fields.
    WrongFieldCount { found: usize },
    /// A numeric column that failed to parse.
    NonNumericField { field: &'static str },
    /// Position column of zero; table positions start at 1.
    InvalidPosition,
    /// Data line with a blank team column.
    EmptyTeam,
    /// Data line seen before any season header.
    NoSeasonHeader,
    /// A team name line that was never followed by a statistics line.
    MissingStatistics { team: String },
    /// The line after a team name was not eight tab-separated numbers.
    MalformedStatistics { team: String },
}

impl SkipReason {
    /// Column headers are routine; everything else means data was lost.
    pub fn is_expected(&self) -> bool {
        matches!(self, SkipReason::ColumnHeader)
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ColumnHeader => write!(f, "column header row"),
            SkipReason::WrongFieldCount { found } => {
                write!(f, "expected 10 fields, found {}", found)
            }
            SkipReason::NonNumericField { field } => write!(f, "non-numeric {}", field),
            SkipReason::InvalidPosition => write!(f, "position must be 1 or greater"),
            SkipReason::EmptyTeam => write!(f, "blank team name"),
            SkipReason::NoSeasonHeader => write!(f, "data row before any season header"),
            SkipReason::MissingStatistics { team } => {
                write!(f, "team '{}' has no statistics line; dropped", team)
            }
            SkipReason::MalformedStatistics { team } => {
                write!(f, "statistics line for '{}' is malformed; dropped", team)
            }
        }
    }
}

/// One skipped input line. `line_number` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDiagnostic {
    pub line_number: usize,
    pub line: String,
    pub reason: SkipReason,
}

/// Parsed value plus every line that was skipped on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome<T> {
    pub value: T,
    pub diagnostics: Vec<LineDiagnostic>,
}

impl<T> ParseOutcome<T> {
    /// Diagnostics that indicate lost data (excludes column headers).
    pub fn unexpected(&self) -> impl Iterator<Item = &LineDiagnostic> {
        self.diagnostics.iter().filter(|d| !d.reason.is_expected())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(season: &str, position: u32, team: &str, points: i32) -> TeamSeasonRecord {
        TeamSeasonRecord {
            season: SeasonKey::parse(season).expect("valid season key"),
            position,
            team: team.to_string(),
            played: 38,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points,
        }
    }

    #[test]
    fn test_season_header_pattern() {
        assert!(is_season_header("2021-2022"));
        assert!(!is_season_header("21-22"));
        assert!(!is_season_header("2021/2022"));
        assert!(!is_season_header("2021-22"));
        assert!(!is_season_header("2021-2022 "));
        assert!(!is_season_header("abcd-efgh"));
    }

    #[test]
    fn test_season_key_parse_trims_whitespace() {
        let key = SeasonKey::parse("  1999-2000\r").expect("trimmed header should parse");
        assert_eq!(key.as_str(), "1999-2000");
    }

    #[test]
    fn test_season_key_ordering_is_chronological() {
        let a = SeasonKey::parse("1999-2000").unwrap();
        let b = SeasonKey::parse("2000-2001").unwrap();
        assert!(a < b, "lexicographic order must match chronological order");
    }

    #[test]
    fn test_season_table_orders_by_position_within_season() {
        let standings = SeasonStandings::from_records(vec![
            record("2020-2021", 2, "Beta", 60),
            record("2020-2021", 1, "Alpha", 70),
        ]);
        let table = standings.season(&SeasonKey::parse("2020-2021").unwrap());
        let teams: Vec<_> = table.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(teams, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_team_lookup_is_case_insensitive_and_season_ascending() {
        let standings = SeasonStandings::from_records(vec![
            record("2021-2022", 1, "Alpha", 80),
            record("2019-2020", 3, "Alpha", 65),
            record("2020-2021", 2, "Beta", 60),
        ]);
        let seasons: Vec<_> = standings
            .team_records("ALPHA")
            .iter()
            .map(|r| r.season.as_str())
            .collect();
        assert_eq!(seasons, vec!["2019-2020", "2021-2022"]);
        assert!(standings.team_records("Gamma").is_empty());
    }

    #[test]
    fn test_since_drops_older_seasons() {
        let standings = SeasonStandings::from_records(vec![
            record("1991-1992", 1, "Alpha", 80),
            record("1992-1993", 1, "Alpha", 84),
            record("1993-1994", 1, "Alpha", 92),
        ]);
        let trimmed = standings.since(&SeasonKey::parse("1992-1993").unwrap());
        assert_eq!(trimmed.len(), 2);
        assert_eq!(trimmed.season_count(), 2);
        assert_eq!(trimmed.seasons().next().unwrap().as_str(), "1992-1993");
    }

    #[test]
    fn test_column_header_is_the_only_expected_skip() {
        assert!(SkipReason::ColumnHeader.is_expected());
        assert!(!SkipReason::NoSeasonHeader.is_expected());
        assert!(!SkipReason::MissingStatistics { team: "Alpha".into() }.is_expected());
    }
}
