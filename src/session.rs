//! Interactive team queries over an injected input source.
//!
//! Reads one team name per line and answers each with that team's trend.
//! Ends on `quit` (any case) or end of input.

use std::error::Error;
use std::io::{self, BufRead, Write};

use crate::analysis::trend::{TeamTrend, TrendAnalyzer};
use crate::config::AnalysisConfig;
use crate::ingest::LoadedStandings;
use crate::logging::{self, Stage};
use crate::model::SeasonStandings;
use crate::report::{scoped_standings, write_team_trend};

pub const PROMPT: &str = "Team name (or 'quit'): ";
pub const QUIT_COMMAND: &str = "quit";

/// Session over the same table and analyzer `report::run_analysis` uses for
/// `--team` queries, so both give the same answer.
pub fn run_configured_session<R, W>(
    input: R,
    output: &mut W,
    loaded: &LoadedStandings,
    config: &AnalysisConfig,
) -> Result<usize, Box<dyn Error>>
where
    R: BufRead,
    W: Write,
{
    let standings = scoped_standings(loaded, config)?;
    let queries = run_team_session(input, output, &standings, &config.team_analyzer())?;
    Ok(queries)
}

/// Runs the query loop. Returns the number of teams queried, found or not.
pub fn run_team_session<R, W>(
    input: R,
    output: &mut W,
    standings: &SeasonStandings,
    analyzer: &TrendAnalyzer,
) -> io::Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut queries = 0;
    let mut lines = input.lines();
    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let Some(line) = lines.next() else {
            writeln!(output)?;
            break;
        };
        let name = line?;
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if name.eq_ignore_ascii_case(QUIT_COMMAND) {
            break;
        }

        queries += 1;
        let trend = analyzer.team_trend(standings, name);
        if let TeamTrend::NotFound { .. } = &trend {
            logging::debug(Stage::System, Some(name), "interactive query matched nothing");
        }
        write_team_trend(output, &trend)?;
    }

    logging::info(
        Stage::System,
        None,
        &format!("Interactive session ended after {} queries", queries),
    );
    Ok(queries)
}
