//! Canonical standings text → `SeasonStandings`.
//!
//! Reads the normalizer's output, or an externally produced CSV in the same
//! shape: `YYYY-YYYY` header lines, each followed by ten-field rows
//! `position,team,played,won,drawn,lost,goalsFor,goalsAgainst,goalDifference,points`.
//! A `Position,...` column header row after a season header is tolerated.
//!
//! Two read paths:
//!   - `read_standings` validates all ten columns and builds full records;
//!   - `read_points` checks the field count but parses only position, team
//!     and points, for passes that never look at the middle columns.
//!
//! Neither path aborts: bad rows are skipped and reported as diagnostics.

use crate::model::{
    LineDiagnostic, ParseOutcome, PointsEntry, SeasonKey, SeasonStandings, SkipReason,
    TeamSeasonRecord,
};

/// Fields on a canonical data row.
pub const CANONICAL_FIELDS: usize = 10;

/// First column of a column-header row.
pub const COLUMN_HEADER_FIELD: &str = "Position";

/// Column header emitted by `to_canonical_csv` when requested.
pub const COLUMN_HEADER: &str =
    "Position,Team,Played,Won,Drawn,Lost,GoalsFor,GoalsAgainst,GoalDifference,Points";

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

enum CanonicalLine<'a> {
    Blank,
    Season(SeasonKey),
    ColumnHeader,
    Row(Vec<&'a str>),
}

fn classify(line: &str) -> CanonicalLine<'_> {
    let line = line.trim();
    if line.is_empty() {
        return CanonicalLine::Blank;
    }
    if let Some(key) = SeasonKey::parse(line) {
        return CanonicalLine::Season(key);
    }
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields[0] == COLUMN_HEADER_FIELD {
        CanonicalLine::ColumnHeader
    } else {
        CanonicalLine::Row(fields)
    }
}

fn numeric<T: std::str::FromStr>(value: &str, field: &'static str) -> Result<T, SkipReason> {
    value
        .parse()
        .map_err(|_| SkipReason::NonNumericField { field })
}

fn position(value: &str) -> Result<u32, SkipReason> {
    match numeric(value, "position")? {
        0 => Err(SkipReason::InvalidPosition),
        p => Ok(p),
    }
}

/// Walks the text, tracking the current season, and hands every data row to
/// `convert`. Rows `convert` rejects, rows without a season, and column
/// headers become diagnostics.
fn read_rows<T, F>(text: &str, mut convert: F) -> ParseOutcome<Vec<T>>
where
    F: FnMut(&SeasonKey, &[&str]) -> Result<T, SkipReason>,
{
    let mut rows = Vec::new();
    let mut diagnostics = Vec::new();
    let mut current_season: Option<SeasonKey> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let skip = |reason| LineDiagnostic {
            line_number: idx + 1,
            line: raw_line.trim().to_string(),
            reason,
        };

        match classify(raw_line) {
            CanonicalLine::Blank => {}
            CanonicalLine::Season(key) => current_season = Some(key),
            CanonicalLine::ColumnHeader => diagnostics.push(skip(SkipReason::ColumnHeader)),
            CanonicalLine::Row(fields) => {
                let Some(season) = current_season.as_ref() else {
                    diagnostics.push(skip(SkipReason::NoSeasonHeader));
                    continue;
                };
                if fields.len() != CANONICAL_FIELDS {
                    diagnostics.push(skip(SkipReason::WrongFieldCount { found: fields.len() }));
                    continue;
                }
                if fields[1].is_empty() {
                    diagnostics.push(skip(SkipReason::EmptyTeam));
                    continue;
                }
                match convert(season, fields.as_slice()) {
                    Ok(row) => rows.push(row),
                    Err(reason) => diagnostics.push(skip(reason)),
                }
            }
        }
    }

    ParseOutcome {
        value: rows,
        diagnostics,
    }
}

// ---------------------------------------------------------------------------
// Read paths
// ---------------------------------------------------------------------------

fn full_record(season: &SeasonKey, f: &[&str]) -> Result<TeamSeasonRecord, SkipReason> {
    // points first: it is the column every consumer needs
    let points = numeric(f[9], "points")?;
    Ok(TeamSeasonRecord {
        season: season.clone(),
        position: position(f[0])?,
        team: f[1].to_string(),
        played: numeric(f[2], "played")?,
        won: numeric(f[3], "won")?,
        drawn: numeric(f[4], "drawn")?,
        lost: numeric(f[5], "lost")?,
        goals_for: numeric(f[6], "goals for")?,
        goals_against: numeric(f[7], "goals against")?,
        goal_difference: numeric(f[8], "goal difference")?,
        points,
    })
}

fn points_entry(season: &SeasonKey, f: &[&str]) -> Result<PointsEntry, SkipReason> {
    let points = numeric(f[9], "points")?;
    Ok(PointsEntry {
        season: season.clone(),
        position: position(f[0])?,
        team: f[1].to_string(),
        points,
    })
}

/// Parses canonical text into the indexed season table.
pub fn read_standings(text: &str) -> ParseOutcome<SeasonStandings> {
    let outcome = read_rows(text, full_record);
    ParseOutcome {
        value: SeasonStandings::from_records(outcome.value),
        diagnostics: outcome.diagnostics,
    }
}

/// Parses only season, position, team and points from each row, in file
/// order. The six middle columns are counted but not validated.
pub fn read_points(text: &str) -> ParseOutcome<Vec<PointsEntry>> {
    read_rows(text, points_entry)
}

/// Writes a season table back out as canonical text, oldest season first.
pub fn to_canonical_csv(standings: &SeasonStandings, include_column_header: bool) -> String {
    let mut lines = Vec::new();
    for season in standings.seasons() {
        lines.push(season.to_string());
        if include_column_header {
            lines.push(COLUMN_HEADER.to_string());
        }
        for r in standings.season(season) {
            lines.push(format!(
                "{},{},{},{},{},{},{},{},{},{}",
                r.position,
                r.team,
                r.played,
                r.won,
                r.drawn,
                r.lost,
                r.goals_for,
                r.goals_against,
                r.goal_difference,
                r.points
            ));
        }
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = "\
2021-2022
Position,Team,Played,Won,Drawn,Lost,GoalsFor,GoalsAgainst,GoalDifference,Points
1,Manchester City,38,29,6,3,99,26,73,93
2,Liverpool,38,28,8,2,94,26,68,92
2020-2021
1,Manchester City,38,27,5,6,83,32,51,86
2,Manchester United,38,21,11,6,73,44,29,74
";

    fn key(s: &str) -> SeasonKey {
        SeasonKey::parse(s).expect("valid season key")
    }

    #[test]
    fn test_reads_records_into_seasons() {
        let outcome = read_standings(CANONICAL);
        let standings = outcome.value;
        assert_eq!(standings.len(), 4);
        assert_eq!(standings.season_count(), 2);

        let latest = standings.season(&key("2021-2022"));
        assert_eq!(latest[0].team, "Manchester City");
        assert_eq!(latest[0].goal_difference, 73);
        assert_eq!(latest[1].points, 92);
    }

    #[test]
    fn test_column_header_is_skipped_as_expected_diagnostic() {
        let outcome = read_standings(CANONICAL);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].reason, SkipReason::ColumnHeader);
        assert_eq!(outcome.diagnostics[0].line_number, 2);
        assert_eq!(outcome.unexpected().count(), 0);
    }

    #[test]
    fn test_wrong_field_count_is_skipped_not_fatal() {
        let text = "2021-2022\n1,Alpha,38,20\n2,Beta,38,20,10,8,60,40,20,70\n";
        let outcome = read_standings(text);
        assert_eq!(outcome.value.len(), 1);
        assert_eq!(
            outcome.diagnostics[0].reason,
            SkipReason::WrongFieldCount { found: 4 }
        );
    }

    #[test]
    fn test_non_numeric_points_is_skipped() {
        let text = "2021-2022\n1,Alpha,38,20,10,8,60,40,20,n/a\n";
        let outcome = read_points(text);
        assert!(outcome.value.is_empty());
        assert_eq!(
            outcome.diagnostics[0].reason,
            SkipReason::NonNumericField { field: "points" }
        );
    }

    #[test]
    fn test_points_path_ignores_middle_columns() {
        let text = "2021-2022\n3,Alpha,-,-,-,-,-,-,-,70\n";
        let points = read_points(text);
        assert!(points.diagnostics.is_empty());
        assert_eq!(
            points.value,
            vec![PointsEntry {
                season: key("2021-2022"),
                position: 3,
                team: "Alpha".to_string(),
                points: 70,
            }]
        );

        let full = read_standings(text);
        assert!(full.value.is_empty());
        assert_eq!(
            full.diagnostics[0].reason,
            SkipReason::NonNumericField { field: "played" }
        );
    }

    #[test]
    fn test_position_zero_is_rejected_on_both_paths() {
        let text = "2021-2022\n0,Alpha,38,20,10,8,60,40,20,70\n1,Beta,38,22,8,8,64,40,24,74\n";

        let full = read_standings(text);
        let positions: Vec<u32> = full.value.records().iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1], "position 0 must not become a record");
        assert_eq!(full.diagnostics.len(), 1);
        assert_eq!(full.diagnostics[0].reason, SkipReason::InvalidPosition);
        assert_eq!(full.unexpected().count(), 1);

        let points = read_points(text);
        assert_eq!(points.value.len(), 1);
        assert_eq!(points.diagnostics[0].reason, SkipReason::InvalidPosition);
        assert_eq!(points.diagnostics[0].line_number, 2);
    }

    #[test]
    fn test_row_before_any_header_is_reported() {
        let text = "1,Alpha,38,20,10,8,60,40,20,70\n2021-2022\n1,Beta,38,20,10,8,60,40,20,70\n";
        let outcome = read_standings(text);
        assert_eq!(outcome.value.len(), 1);
        assert_eq!(outcome.diagnostics[0].reason, SkipReason::NoSeasonHeader);
    }

    #[test]
    fn test_blank_team_is_reported() {
        let outcome = read_points("2021-2022\n1,,38,20,10,8,60,40,20,70\n");
        assert!(outcome.value.is_empty());
        assert_eq!(outcome.diagnostics[0].reason, SkipReason::EmptyTeam);
    }

    #[test]
    fn test_records_keep_their_governing_season() {
        let outcome = read_points(CANONICAL);
        let seasons: Vec<_> = outcome.value.iter().map(|e| e.season.as_str()).collect();
        assert_eq!(seasons, vec!["2021-2022", "2021-2022", "2020-2021", "2020-2021"]);
    }

    #[test]
    fn test_canonical_csv_round_trip() {
        let standings = read_standings(CANONICAL).value;
        let written = to_canonical_csv(&standings, true);
        let reread = read_standings(&written);
        assert_eq!(reread.value.records().len(), standings.len());
        assert_eq!(reread.unexpected().count(), 0);
        assert!(written.starts_with("2020-2021\nPosition,Team,"));
    }
}
