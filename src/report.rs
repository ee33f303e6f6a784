//! Run report: everything one analysis pass produced, serializable to JSON
//! and printable as a console summary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};

use crate::analysis::top_tier::{track_top_tier, TopTierReport};
use crate::analysis::trend::{PoolAnalysis, TeamTrend, TeamTrendReport, TrendAnalyzer};
use crate::config::{AnalysisConfig, ConfigError};
use crate::ingest::LoadedStandings;
use crate::logging::{self, Stage};
use crate::model::{DistributionStats, SeasonKey, SeasonStandings, StatsUnavailable};

// ============================================================================
// Report types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct InputSummary {
    pub records: usize,
    pub seasons: usize,
    pub first_season: Option<SeasonKey>,
    pub last_season: Option<SeasonKey>,
    /// Lines dropped while normalizing raw text.
    pub normalize_skipped: usize,
    /// Lines skipped by the canonical reader, column headers included.
    pub read_skipped: usize,
    /// Skipped lines that lost data.
    pub unexpected: usize,
}

/// Parameters the run was made with.
#[derive(Debug, Clone, Serialize)]
pub struct RunSettings {
    pub min_seasons: usize,
    pub notable_multiplier: f64,
    pub top_tier_size: u32,
    pub first_season: Option<SeasonKey>,
    pub team_analyzer: TrendAnalyzer,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub timestamp: String,
    pub settings: RunSettings,
    pub input: InputSummary,
    pub pool: PoolAnalysis,
    pub top_tier: TopTierReport,
    pub teams: Vec<TeamTrend>,
}

impl AnalysisReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// Running
// ============================================================================

/// Pool analysis, top-tier tracking and one trend query per name in `teams`.
pub fn run_analysis(
    loaded: &LoadedStandings,
    config: &AnalysisConfig,
    teams: &[String],
) -> Result<AnalysisReport, ConfigError> {
    run_analysis_at(loaded, config, teams, Utc::now())
}

/// The table every analysis runs over: `loaded.standings` with the
/// configured `first_season` cut-off applied.
pub fn scoped_standings(
    loaded: &LoadedStandings,
    config: &AnalysisConfig,
) -> Result<SeasonStandings, ConfigError> {
    let Some(first) = config.first_season_key()? else {
        return Ok(loaded.standings.clone());
    };
    let filtered = loaded.standings.since(&first);
    logging::info(
        Stage::System,
        Some(first.as_str()),
        &format!(
            "Analysing {} of {} records from this season onwards",
            filtered.len(),
            loaded.standings.len()
        ),
    );
    Ok(filtered)
}

/// `run_analysis` with an explicit report timestamp.
pub fn run_analysis_at(
    loaded: &LoadedStandings,
    config: &AnalysisConfig,
    teams: &[String],
    now: DateTime<Utc>,
) -> Result<AnalysisReport, ConfigError> {
    let first_season = config.first_season_key()?;
    let standings = scoped_standings(loaded, config)?;

    let entries = standings.points_entries();
    let pool = TrendAnalyzer::pool().analyze_pool(&entries, config.min_seasons);
    let top_tier = track_top_tier(&entries, config.top_tier_size);

    let team_analyzer = config.team_analyzer();
    let team_trends = teams
        .iter()
        .map(|team| team_analyzer.team_trend(&standings, team))
        .collect();

    let mut seasons = standings.seasons();
    let first = seasons.next().cloned();
    let last = seasons.last().cloned().or_else(|| first.clone());

    Ok(AnalysisReport {
        timestamp: now.to_rfc3339(),
        settings: RunSettings {
            min_seasons: config.min_seasons,
            notable_multiplier: config.notable_multiplier,
            top_tier_size: config.top_tier_size,
            first_season,
            team_analyzer,
        },
        input: InputSummary {
            records: standings.len(),
            seasons: standings.season_count(),
            first_season: first,
            last_season: last,
            normalize_skipped: loaded.normalize_diagnostics.len(),
            read_skipped: loaded.read_diagnostics.len(),
            unexpected: loaded.unexpected_count(),
        },
        pool,
        top_tier,
        teams: team_trends,
    })
}

// ============================================================================
// Console output
// ============================================================================

const RULE: &str = "═══════════════════════════════════════════════════════════";

fn format_stats(stats: &DistributionStats) -> String {
    let cv = match stats.coefficient_of_variation {
        Some(cv) => format!("{:.1}%", cv),
        None => "undefined".to_string(),
    };
    format!(
        "mean {:.2}, stddev {:.2}, cv {}",
        stats.mean, stats.standard_deviation, cv
    )
}

fn format_multiplier(multiplier: &Result<f64, StatsUnavailable>) -> String {
    match multiplier {
        Ok(m) => format!("{:.1}", m),
        Err(e) => e.to_string(),
    }
}

/// Per-team query output, shared by the summary and the interactive session.
pub fn write_team_trend<W: Write>(out: &mut W, trend: &TeamTrend) -> io::Result<()> {
    let report: &TeamTrendReport = match trend {
        TeamTrend::NotFound { team } => {
            return writeln!(out, "Team '{}' not found in any season.", team);
        }
        TeamTrend::Found(report) => report,
    };

    writeln!(out, "{} ({} seasons)", report.team, report.points.len())?;
    for p in &report.points {
        writeln!(out, "  {}  pos {:>2}  {:>3} pts", p.season, p.position, p.points)?;
    }

    if report.deltas.is_empty() {
        writeln!(out, "  Only one season on record; no changes to compare.")?;
        return Ok(());
    }

    writeln!(out, "  Season-over-season changes:")?;
    for d in &report.deltas {
        writeln!(out, "    {} → {}  {:+}", d.from_season, d.to_season, d.delta)?;
    }

    match &report.stats {
        Ok(stats) => writeln!(out, "  {}", format_stats(stats))?,
        Err(e) => writeln!(out, "  {}", e)?,
    }

    match &report.multiplier {
        Ok(m) if report.notable.is_empty() => {
            writeln!(out, "  No notable changes (multiplier {:.1}).", m)?;
        }
        Ok(m) => {
            writeln!(out, "  Notable changes (multiplier {:.1}):", m)?;
            for n in &report.notable {
                writeln!(
                    out,
                    "    {} → {}  {:+}  ({:.2} from mean)",
                    n.delta.from_season, n.delta.to_season, n.delta.delta, n.deviation
                )?;
            }
        }
        Err(e) => writeln!(out, "  Notable changes not computed: {}", e)?,
    }
    Ok(())
}

pub fn write_summary<W: Write>(out: &mut W, report: &AnalysisReport) -> io::Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "STANDINGS TREND SUMMARY")?;
    writeln!(out, "{}", RULE)?;

    let input = &report.input;
    let span = match (&input.first_season, &input.last_season) {
        (Some(first), Some(last)) => format!("{} to {}", first, last),
        _ => "no seasons".to_string(),
    };
    writeln!(
        out,
        "Input:            {} records, {} seasons ({})",
        input.records, input.seasons, span
    )?;
    writeln!(
        out,
        "Skipped lines:    {} normalizer, {} reader ({} lost data)",
        input.normalize_skipped, input.read_skipped, input.unexpected
    )?;
    writeln!(out)?;

    let pool = &report.pool;
    writeln!(
        out,
        "Consistent teams: {} with >= {} seasons",
        pool.consistent_teams.len(),
        pool.min_seasons
    )?;
    match &pool.stats {
        Ok(stats) => writeln!(out, "Pooled deltas:    {} ({})", pool.pooled_deltas().len(), format_stats(stats))?,
        Err(e) => writeln!(out, "Pooled deltas:    {}", e)?,
    }
    writeln!(
        out,
        "Advisory multiplier: {}",
        format_multiplier(&pool.advisory_multiplier)
    )?;
    if !pool.duplicate_rows.is_empty() {
        writeln!(out, "Duplicate season rows: {}", pool.duplicate_rows.len())?;
    }
    writeln!(out)?;

    let tier = &report.top_tier;
    writeln!(
        out,
        "Top-{} transitions: {} ({} into)",
        tier.boundary,
        tier.transitions.len(),
        tier.moved_into.len()
    )?;
    for t in &tier.transitions {
        writeln!(out, "  {}", t)?;
    }

    for trend in &report.teams {
        writeln!(out)?;
        write_team_trend(out, trend)?;
    }
    writeln!(out, "{}", RULE)?;
    Ok(())
}

pub fn print_summary(report: &AnalysisReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_summary(&mut handle, report)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{load_standings, InputFormat};
    use chrono::TimeZone;

    const CANONICAL: &str = "\
2019-2020
1,Alpha,38,25,5,8,70,30,40,80
2,Beta,38,20,10,8,60,40,20,70
5,Gamma,38,15,10,13,50,45,5,55
2020-2021
1,Beta,38,25,5,8,70,30,40,80
3,Gamma,38,18,10,10,55,45,10,64
6,Alpha,38,14,10,14,48,48,0,52
2021-2022
2,Alpha,38,22,8,8,66,36,30,74
4,Beta,38,18,12,8,58,42,16,66
7,Gamma,38,12,10,16,40,52,-12,46";

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            min_seasons: 3,
            ..AnalysisConfig::default()
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_report_covers_pool_tier_and_teams() {
        let loaded = load_standings(CANONICAL, InputFormat::Canonical);
        let teams = vec!["alpha".to_string(), "Delta".to_string()];
        let report = run_analysis_at(&loaded, &config(), &teams, fixed_time()).unwrap();

        assert_eq!(report.timestamp, "2024-05-01T12:00:00+00:00");
        assert_eq!(report.input.records, 9);
        assert_eq!(report.input.seasons, 3);
        assert_eq!(report.input.first_season.as_ref().unwrap().as_str(), "2019-2020");
        assert_eq!(report.input.last_season.as_ref().unwrap().as_str(), "2021-2022");
        assert_eq!(report.pool.consistent_teams, vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(report.pool.pooled_deltas().len(), 6);
        assert!(matches!(report.teams[0], TeamTrend::Found(_)));
        assert!(matches!(report.teams[1], TeamTrend::NotFound { .. }));
        assert!(
            report.top_tier.moved_into.contains(&"Gamma".to_string()),
            "Gamma went 5 → 3, got {:?}",
            report.top_tier.moved_into
        );
    }

    #[test]
    fn test_first_season_cut_off() {
        let loaded = load_standings(CANONICAL, InputFormat::Canonical);
        let config = AnalysisConfig {
            first_season: Some("2020-2021".to_string()),
            min_seasons: 2,
            ..AnalysisConfig::default()
        };
        let report = run_analysis_at(&loaded, &config, &[], fixed_time()).unwrap();
        assert_eq!(report.input.records, 6);
        assert_eq!(report.input.seasons, 2);
        assert_eq!(report.settings.first_season.unwrap().as_str(), "2020-2021");
    }

    #[test]
    fn test_json_output_is_valid() {
        let loaded = load_standings(CANONICAL, InputFormat::Canonical);
        let report = run_analysis_at(&loaded, &config(), &["Beta".to_string()], fixed_time()).unwrap();
        let json = report.to_json().expect("report serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(value["input"]["records"], 9);
        assert_eq!(value["top_tier"]["boundary"], 4);
    }

    #[test]
    fn test_summary_lists_transitions_and_queries() {
        let loaded = load_standings(CANONICAL, InputFormat::Canonical);
        let report =
            run_analysis_at(&loaded, &config(), &["Nobody".to_string()], fixed_time()).unwrap();
        let mut out = Vec::new();
        write_summary(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("9 records, 3 seasons (2019-2020 to 2021-2022)"), "{}", text);
        assert!(text.contains("Gamma moved into the top tier"), "{}", text);
        assert!(text.contains("Team 'Nobody' not found in any season."), "{}", text);
    }

    #[test]
    fn test_single_season_team_has_no_changes() {
        let loaded = load_standings("2021-2022\n1,Solo,38,25,5,8,70,30,40,80", InputFormat::Canonical);
        let trend = AnalysisConfig::default().team_analyzer().team_trend(&loaded.standings, "Solo");
        let mut out = Vec::new();
        write_team_trend(&mut out, &trend).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Solo (1 seasons)"), "{}", text);
        assert!(text.contains("no changes to compare"), "{}", text);
    }
}
