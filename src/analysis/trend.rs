//! Season-over-season point trends and notable-change detection.
//!
//! Two analyses share one `TrendAnalyzer`:
//!
//! - **Pool analysis** (`analyze_pool`): every team passing the consistency
//!   filter contributes its consecutive point deltas to one pool. The pool's
//!   population mean/stddev and coefficient of variation (CV) select an
//!   advisory severity multiplier. The advisory value is reported, never
//!   applied automatically.
//! - **Team trend** (`team_trend`): one team's deltas, statistics over that
//!   team's own deltas, and the deltas whose distance from the mean exceeds
//!   `multiplier * stddev`.
//!
//! The analyzer is parameterised by the order deltas are listed in, the
//! sign convention of a delta, and where the flagging multiplier comes from.
//! `PointDelta::from_season` is always the older season and `to_season` the
//! newer one, whatever the listing order.

use serde::{Deserialize, Serialize};

use crate::analysis::consistency::{consistent_teams, duplicate_season_rows};
use crate::logging::{self, Stage};
use crate::model::{
    DistributionStats, NotableChange, PointDelta, PointsEntry, SeasonKey, SeasonStandings,
    StatsUnavailable,
};
use crate::seasons::SeasonOrder;

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Severity bands: CV (percent) strictly above the bound selects the multiplier.
pub const SEVERITY_BANDS: [(f64, f64); 3] = [(1000.0, 2.5), (500.0, 2.0), (100.0, 1.5)];

/// Multiplier for CVs at or below the lowest band.
pub const BASE_MULTIPLIER: f64 = 1.0;

/// Maps a coefficient of variation (percent) to an outlier multiplier.
/// More variable pools get a more conservative (larger) multiplier.
pub fn severity_multiplier(cv: f64) -> f64 {
    SEVERITY_BANDS
        .iter()
        .find(|(bound, _)| cv > *bound)
        .map(|(_, multiplier)| *multiplier)
        .unwrap_or(BASE_MULTIPLIER)
}

impl DistributionStats {
    /// Population mean and standard deviation (divide by N) of `deltas`.
    pub fn from_deltas(deltas: &[i64]) -> Result<DistributionStats, StatsUnavailable> {
        if deltas.is_empty() {
            return Err(StatsUnavailable::EmptyPool);
        }
        let n = deltas.len() as f64;
        let mean = deltas.iter().map(|&d| d as f64).sum::<f64>() / n;
        let variance = deltas
            .iter()
            .map(|&d| (d as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        let standard_deviation = variance.sqrt();

        let coefficient_of_variation = if mean == 0.0 {
            None
        } else {
            Some((standard_deviation / mean).abs() * 100.0)
        };

        Ok(DistributionStats {
            mean,
            standard_deviation,
            coefficient_of_variation,
        })
    }

    /// CV-band multiplier, or `ZeroMean` when the CV is undefined.
    pub fn advisory_multiplier(&self) -> Result<f64, StatsUnavailable> {
        self.coefficient_of_variation
            .map(severity_multiplier)
            .ok_or(StatsUnavailable::ZeroMean)
    }

    /// `true` when `value` lies more than `multiplier` standard deviations
    /// from the mean. Never true for a zero-spread distribution.
    pub fn is_outlier(&self, value: f64, multiplier: f64) -> bool {
        (value - self.mean).abs() > multiplier * self.standard_deviation
    }
}

/// Deltas from `deltas` that lie more than `multiplier` standard deviations
/// from `stats.mean`, in input order.
pub fn notable_changes(
    deltas: &[PointDelta],
    stats: &DistributionStats,
    multiplier: f64,
) -> Vec<NotableChange> {
    deltas
        .iter()
        .filter(|d| stats.is_outlier(d.delta as f64, multiplier))
        .map(|d| NotableChange {
            delta: d.clone(),
            deviation: (d.delta as f64 - stats.mean).abs(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Analyzer configuration
// ---------------------------------------------------------------------------

/// Sign convention of a point delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaDirection {
    /// Newer season's points minus older season's. Positive means improvement.
    #[default]
    LaterMinusEarlier,
    /// Older season's points minus newer season's.
    EarlierMinusLater,
}

/// Where the flagging multiplier comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MultiplierSource {
    /// A caller-supplied constant.
    Fixed(f64),
    /// The CV band of the very deltas being flagged.
    Adaptive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendAnalyzer {
    pub order: SeasonOrder,
    pub direction: DeltaDirection,
    pub multiplier: MultiplierSource,
}

/// One season of a team's series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonPoints {
    pub season: SeasonKey,
    pub position: u32,
    pub points: i32,
}

/// A team's consecutive deltas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamDeltas {
    pub team: String,
    pub deltas: Vec<PointDelta>,
}

/// Result of the pool-wide pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolAnalysis {
    pub min_seasons: usize,
    pub consistent_teams: Vec<String>,
    pub team_deltas: Vec<TeamDeltas>,
    pub stats: Result<DistributionStats, StatsUnavailable>,
    /// CV-band multiplier of the pool. Advisory only.
    pub advisory_multiplier: Result<f64, StatsUnavailable>,
    /// `(team, season)` pairs with more than one row; these inflate the
    /// appearance counts used by the consistency filter.
    pub duplicate_rows: Vec<(String, SeasonKey)>,
}

impl PoolAnalysis {
    /// Every delta value in the pool, team by team.
    pub fn pooled_deltas(&self) -> Vec<i64> {
        self.team_deltas
            .iter()
            .flat_map(|t| t.deltas.iter().map(|d| d.delta))
            .collect()
    }
}

/// Per-team query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamTrendReport {
    /// Team name as stored in the table.
    pub team: String,
    pub points: Vec<SeasonPoints>,
    pub deltas: Vec<PointDelta>,
    pub stats: Result<DistributionStats, StatsUnavailable>,
    pub multiplier: Result<f64, StatsUnavailable>,
    pub notable: Vec<NotableChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TeamTrend {
    /// The name matched no record in any season.
    NotFound { team: String },
    /// Found in at least one season. With a single season `deltas` is empty
    /// and `stats` is `EmptyPool`.
    Found(TeamTrendReport),
}

impl TrendAnalyzer {
    /// Pool preset: oldest first, newer minus older, adaptive multiplier.
    pub fn pool() -> Self {
        TrendAnalyzer {
            order: SeasonOrder::Ascending,
            direction: DeltaDirection::LaterMinusEarlier,
            multiplier: MultiplierSource::Adaptive,
        }
    }

    /// Per-team preset: most recent first, newer minus older, fixed multiplier.
    pub fn per_team(multiplier: f64) -> Self {
        TrendAnalyzer {
            order: SeasonOrder::Descending,
            direction: DeltaDirection::LaterMinusEarlier,
            multiplier: MultiplierSource::Fixed(multiplier),
        }
    }

    /// Consecutive deltas over `series` after ordering it by season.
    /// Rows sharing a season keep their input order.
    pub fn deltas(&self, team: &str, mut series: Vec<SeasonPoints>) -> Vec<PointDelta> {
        self.sort_series(&mut series);
        series
            .windows(2)
            .map(|pair| {
                let (earlier, later) = match self.order {
                    SeasonOrder::Ascending => (&pair[0], &pair[1]),
                    SeasonOrder::Descending => (&pair[1], &pair[0]),
                };
                let (earlier_points, later_points) = (i64::from(earlier.points), i64::from(later.points));
                let delta = match self.direction {
                    DeltaDirection::LaterMinusEarlier => later_points - earlier_points,
                    DeltaDirection::EarlierMinusLater => earlier_points - later_points,
                };
                PointDelta {
                    team: team.to_string(),
                    from_season: earlier.season.clone(),
                    to_season: later.season.clone(),
                    delta,
                }
            })
            .collect()
    }

    fn sort_series(&self, series: &mut [SeasonPoints]) {
        match self.order {
            SeasonOrder::Ascending => series.sort_by(|a, b| a.season.cmp(&b.season)),
            SeasonOrder::Descending => series.sort_by(|a, b| b.season.cmp(&a.season)),
        }
    }

    /// Resolves the flagging multiplier for a set of statistics.
    pub fn resolve_multiplier(&self, stats: &DistributionStats) -> Result<f64, StatsUnavailable> {
        match self.multiplier {
            MultiplierSource::Fixed(m) => Ok(m),
            MultiplierSource::Adaptive => stats.advisory_multiplier(),
        }
    }

    /// Pool-wide pass over teams with at least `min_seasons` rows.
    pub fn analyze_pool(&self, entries: &[PointsEntry], min_seasons: usize) -> PoolAnalysis {
        let teams = consistent_teams(entries, min_seasons);
        let duplicate_rows = duplicate_season_rows(entries);
        for (team, season) in &duplicate_rows {
            logging::warn(
                Stage::Trend,
                Some(team.as_str()),
                &format!("appears more than once in {}; counted once per row", season),
            );
        }

        let team_deltas: Vec<TeamDeltas> = teams
            .iter()
            .map(|team| {
                let series = entries
                    .iter()
                    .filter(|e| &e.team == team)
                    .map(|e| SeasonPoints {
                        season: e.season.clone(),
                        position: e.position,
                        points: e.points,
                    })
                    .collect();
                TeamDeltas {
                    team: team.clone(),
                    deltas: self.deltas(team, series),
                }
            })
            .collect();

        let pooled: Vec<i64> = team_deltas
            .iter()
            .flat_map(|t| t.deltas.iter().map(|d| d.delta))
            .collect();
        let stats = DistributionStats::from_deltas(&pooled);
        let advisory_multiplier = stats.as_ref().map_err(|e| *e).and_then(|s| s.advisory_multiplier());

        logging::info(
            Stage::Trend,
            None,
            &format!(
                "{} teams with >= {} seasons, {} deltas pooled",
                teams.len(),
                min_seasons,
                pooled.len()
            ),
        );
        if let Err(reason) = &advisory_multiplier {
            logging::warn(Stage::Trend, None, &reason.to_string());
        }

        PoolAnalysis {
            min_seasons,
            consistent_teams: teams,
            team_deltas,
            stats,
            advisory_multiplier,
            duplicate_rows,
        }
    }

    /// One team's series, deltas and notable changes. The name is matched
    /// ignoring case; when a team has several rows in one season the first
    /// (highest placed) is used.
    pub fn team_trend(&self, standings: &SeasonStandings, team: &str) -> TeamTrend {
        let records = standings.team_records(team);
        let Some(first) = records.first() else {
            logging::info(Stage::Trend, Some(team), "not found in any season");
            return TeamTrend::NotFound {
                team: team.to_string(),
            };
        };
        let name = first.team.clone();

        let mut points: Vec<SeasonPoints> = Vec::with_capacity(records.len());
        for record in &records {
            if points.last().is_some_and(|p| p.season == record.season) {
                continue;
            }
            points.push(SeasonPoints {
                season: record.season.clone(),
                position: record.position,
                points: record.points,
            });
        }
        self.sort_series(&mut points);

        let deltas = self.deltas(&name, points.clone());
        let stats = DistributionStats::from_deltas(&deltas.iter().map(|d| d.delta).collect::<Vec<_>>());
        let multiplier = stats
            .as_ref()
            .map_err(|e| *e)
            .and_then(|s| self.resolve_multiplier(s));

        let notable = match (&stats, &multiplier) {
            (Ok(s), Ok(m)) => notable_changes(&deltas, s, *m),
            _ => Vec::new(),
        };

        logging::debug(
            Stage::Trend,
            Some(name.as_str()),
            &format!(
                "{} seasons, {} deltas, {} notable",
                points.len(),
                deltas.len(),
                notable.len()
            ),
        );

        TeamTrend::Found(TeamTrendReport {
            team: name,
            points,
            deltas,
            stats,
            multiplier,
            notable,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
