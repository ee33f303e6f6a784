//! Consistency filter: teams with at least T table rows.
//!
//! Counts rows, not distinct seasons. A team listed twice in one season is
//! counted twice; `duplicate_season_rows` finds those rows so callers can
//! report them.

use std::collections::HashMap;

use crate::model::{PointsEntry, SeasonKey};

/// Teams (exact, case-sensitive names) with at least `min_seasons` rows,
/// in order of first appearance.
pub fn consistent_teams(entries: &[PointsEntry], min_seasons: usize) -> Vec<String> {
    appearance_counts(entries)
        .into_iter()
        .filter(|(_, count)| *count >= min_seasons)
        .map(|(team, _)| team)
        .collect()
}

/// Row count per team, in order of first appearance.
pub fn appearance_counts(entries: &[PointsEntry]) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for entry in entries {
        match slot.get(entry.team.as_str()) {
            Some(&i) => order[i].1 += 1,
            None => {
                slot.insert(entry.team.as_str(), order.len());
                order.push((entry.team.clone(), 1));
            }
        }
    }
    order
}

/// `(team, season)` pairs that occur more than once. Each such pair inflates
/// the team's appearance count.
pub fn duplicate_season_rows(entries: &[PointsEntry]) -> Vec<(String, SeasonKey)> {
    let mut seen: HashMap<(&str, &SeasonKey), usize> = HashMap::new();
    let mut duplicates = Vec::new();
    for entry in entries {
        let count = seen.entry((entry.team.as_str(), &entry.season)).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push((entry.team.clone(), entry.season.clone()));
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(season: &str, team: &str) -> PointsEntry {
        PointsEntry {
            season: SeasonKey::parse(season).unwrap(),
            position: 1,
            team: team.to_string(),
            points: 50,
        }
    }

    fn sample() -> Vec<PointsEntry> {
        vec![
            entry("2019-2020", "Alpha"),
            entry("2019-2020", "Beta"),
            entry("2020-2021", "Alpha"),
            entry("2020-2021", "Gamma"),
            entry("2021-2022", "Alpha"),
            entry("2021-2022", "Beta"),
        ]
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(consistent_teams(&sample(), 2), vec!["Alpha", "Beta"]);
        assert_eq!(consistent_teams(&sample(), 3), vec!["Alpha"]);
        assert!(consistent_teams(&sample(), 4).is_empty());
    }

    #[test]
    fn test_higher_threshold_returns_subset() {
        let entries = sample();
        for t in 0..5 {
            let lower = consistent_teams(&entries, t);
            let higher = consistent_teams(&entries, t + 1);
            assert!(
                higher.iter().all(|team| lower.contains(team)),
                "T={} result {:?} is not a subset of T={} result {:?}",
                t + 1,
                higher,
                t,
                lower
            );
        }
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let entries = vec![entry("2019-2020", "Alpha"), entry("2020-2021", "alpha")];
        assert!(consistent_teams(&entries, 2).is_empty());
    }

    #[test]
    fn test_duplicate_rows_are_counted_and_reported() {
        let entries = vec![entry("2019-2020", "Alpha"), entry("2019-2020", "Alpha")];
        assert_eq!(consistent_teams(&entries, 2), vec!["Alpha"]);
        assert_eq!(
            duplicate_season_rows(&entries),
            vec![("Alpha".to_string(), SeasonKey::parse("2019-2020").unwrap())]
        );
    }
}
