//! Top-tier boundary transitions.
//!
//! Compares every pair of consecutive seasons (most recent pair first) and
//! reports teams whose position crossed the boundary between rank
//! `boundary` and `boundary + 1`. Only teams present in both seasons are
//! considered; promotion into or relegation out of the league is not a
//! transition.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::logging::{self, Stage};
use crate::model::{PointsEntry, SeasonKey};
use crate::seasons::{distinct_seasons, SeasonOrder};

/// Default boundary: the top four.
pub const TOP_TIER_SIZE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierDirection {
    /// Outside the tier in the previous season, inside it in the current one.
    Into,
    /// Inside the tier in the previous season, outside it in the current one.
    OutOf,
}

impl fmt::Display for TierDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierDirection::Into => write!(f, "into"),
            TierDirection::OutOf => write!(f, "out of"),
        }
    }
}

/// One boundary crossing between two consecutive seasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopTierTransition {
    pub team: String,
    pub previous_season: SeasonKey,
    pub current_season: SeasonKey,
    pub previous_position: u32,
    pub current_position: u32,
    pub previous_points: i32,
    pub current_points: i32,
    /// `current_points - previous_points`, widened like `PointDelta::delta`
    pub point_delta: i64,
    pub direction: TierDirection,
}

impl fmt::Display for TopTierTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} moved {} the top tier from {} to {} (position {} → {}, points {} → {}, {:+})",
            self.team,
            self.direction,
            self.previous_season,
            self.current_season,
            self.previous_position,
            self.current_position,
            self.previous_points,
            self.current_points,
            self.point_delta
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopTierReport {
    pub boundary: u32,
    /// Most recent season pair first; teams in order of first appearance.
    pub transitions: Vec<TopTierTransition>,
    /// Team of every `Into` transition in scan order. Not deduplicated: a
    /// team that entered the tier twice is listed twice.
    pub moved_into: Vec<String>,
}

/// Classifies a position change across the boundary, if any.
pub fn crossing(previous: u32, current: u32, boundary: u32) -> Option<TierDirection> {
    match (previous <= boundary, current <= boundary) {
        (false, true) => Some(TierDirection::Into),
        (true, false) => Some(TierDirection::OutOf),
        _ => None,
    }
}

/// Scans consecutive season pairs for boundary crossings.
///
/// When a team has several rows in one season the last one read wins.
pub fn track_top_tier(entries: &[PointsEntry], boundary: u32) -> TopTierReport {
    let mut team_order: Vec<&str> = Vec::new();
    let mut by_team: HashMap<&str, HashMap<&SeasonKey, &PointsEntry>> = HashMap::new();
    for entry in entries {
        let seasons = by_team.entry(entry.team.as_str()).or_insert_with(|| {
            team_order.push(entry.team.as_str());
            HashMap::new()
        });
        seasons.insert(&entry.season, entry);
    }

    let seasons = distinct_seasons(entries.iter().map(|e| &e.season), SeasonOrder::Descending);

    let mut transitions = Vec::new();
    let mut moved_into = Vec::new();
    for pair in seasons.windows(2) {
        let (current_season, previous_season) = (&pair[0], &pair[1]);
        for team in &team_order {
            let rows = &by_team[team];
            let (Some(current), Some(previous)) = (rows.get(current_season), rows.get(previous_season))
            else {
                continue;
            };
            let Some(direction) = crossing(previous.position, current.position, boundary) else {
                continue;
            };

            if direction == TierDirection::Into {
                moved_into.push(team.to_string());
            }
            let transition = TopTierTransition {
                team: team.to_string(),
                previous_season: previous_season.clone(),
                current_season: current_season.clone(),
                previous_position: previous.position,
                current_position: current.position,
                previous_points: previous.points,
                current_points: current.points,
                point_delta: i64::from(current.points) - i64::from(previous.points),
                direction,
            };
            logging::debug(Stage::TopTier, Some(*team), &transition.to_string());
            transitions.push(transition);
        }
    }

    logging::info(
        Stage::TopTier,
        None,
        &format!(
            "{} top-{} transitions across {} seasons ({} into)",
            transitions.len(),
            boundary,
            seasons.len(),
            moved_into.len()
        ),
    );

    TopTierReport {
        boundary,
        transitions,
        moved_into,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(season: &str, position: u32, team: &str, points: i32) -> PointsEntry {
        PointsEntry {
            season: SeasonKey::parse(season).expect("valid season key"),
            position,
            team: team.to_string(),
            points,
        }
    }

    #[test]
    fn test_crossing_boundary_cases() {
        assert_eq!(crossing(5, 4, 4), Some(TierDirection::Into));
        assert_eq!(crossing(4, 5, 4), Some(TierDirection::OutOf));
        assert_eq!(crossing(1, 4, 4), None);
        assert_eq!(crossing(5, 20, 4), None);
    }

    #[test]
    fn test_move_into_top_four() {
        let entries = vec![
            entry("2020-2021", 6, "Alpha", 55),
            entry("2021-2022", 3, "Alpha", 70),
        ];
        let report = track_top_tier(&entries, TOP_TIER_SIZE);
        assert_eq!(report.transitions.len(), 1);
        let t = &report.transitions[0];
        assert_eq!(t.direction, TierDirection::Into);
        assert_eq!(t.point_delta, 15);
        assert_eq!(t.previous_season.as_str(), "2020-2021");
        assert_eq!(t.current_season.as_str(), "2021-2022");
        assert_eq!(report.moved_into, vec!["Alpha"]);
    }

    #[test]
    fn test_move_out_of_top_four_is_not_in_moved_into_list() {
        let entries = vec![
            entry("2020-2021", 2, "Beta", 80),
            entry("2021-2022", 7, "Beta", 58),
        ];
        let report = track_top_tier(&entries, TOP_TIER_SIZE);
        assert_eq!(report.transitions[0].direction, TierDirection::OutOf);
        assert_eq!(report.transitions[0].point_delta, -22);
        assert!(report.moved_into.is_empty());
    }

    #[test]
    fn test_team_missing_from_one_season_is_ignored() {
        let entries = vec![
            entry("2020-2021", 3, "Alpha", 70),
            entry("2021-2022", 2, "Gamma", 75),
        ];
        let report = track_top_tier(&entries, TOP_TIER_SIZE);
        assert!(report.transitions.is_empty());
    }

    #[test]
    fn test_scan_is_most_recent_pair_first_and_keeps_duplicates() {
        let entries = vec![
            entry("2018-2019", 5, "Alpha", 60),
            entry("2019-2020", 4, "Alpha", 66),
            entry("2020-2021", 6, "Alpha", 58),
            entry("2021-2022", 1, "Alpha", 85),
        ];
        let report = track_top_tier(&entries, TOP_TIER_SIZE);
        let pairs: Vec<_> = report
            .transitions
            .iter()
            .map(|t| (t.current_season.as_str(), t.direction))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("2021-2022", TierDirection::Into),
                ("2020-2021", TierDirection::OutOf),
                ("2019-2020", TierDirection::Into),
            ]
        );
        assert_eq!(report.moved_into, vec!["Alpha", "Alpha"]);
    }

    #[test]
    fn test_custom_boundary() {
        let entries = vec![
            entry("2020-2021", 7, "Alpha", 55),
            entry("2021-2022", 6, "Alpha", 60),
        ];
        assert!(track_top_tier(&entries, 4).transitions.is_empty());
        assert_eq!(track_top_tier(&entries, 6).moved_into, vec!["Alpha"]);
    }

    #[test]
    fn test_extreme_point_totals_do_not_overflow() {
        let entries = vec![
            entry("2020-2021", 6, "Alpha", i32::MIN),
            entry("2021-2022", 3, "Alpha", i32::MAX),
        ];
        let report = track_top_tier(&entries, TOP_TIER_SIZE);
        assert_eq!(report.transitions[0].point_delta, i64::from(i32::MAX) - i64::from(i32::MIN));
    }

    #[test]
    fn test_transition_display() {
        let entries = vec![
            entry("2020-2021", 6, "Alpha", 55),
            entry("2021-2022", 3, "Alpha", 70),
        ];
        let line = track_top_tier(&entries, TOP_TIER_SIZE).transitions[0].to_string();
        assert!(line.starts_with("Alpha moved into the top tier from 2020-2021 to 2021-2022"));
        assert!(line.ends_with("+15)"));
    }
}
