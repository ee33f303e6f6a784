//! Command-line arguments for the `standings_trend` binary.

use std::path::PathBuf;

use crate::ingest::InputFormat;

pub const USAGE: &str = "\
Usage: standings_trend [OPTIONS] INPUT

Options:
  --config PATH          Analysis config (default: standings.toml if present)
  --raw                  INPUT is scraped raw text; normalize it first
  --team NAME            Per-team trend query (repeatable)
  --interactive          Read team names from stdin until 'quit'
  --json                 Print the report as JSON
  --canonical-out PATH   Write the normalized canonical text to PATH
  -h, --help             Show this help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub format: InputFormat,
    pub teams: Vec<String>,
    pub interactive: bool,
    pub json: bool,
    pub canonical_out: Option<PathBuf>,
    pub input: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(CliArgs),
    Help,
}

/// Parses arguments, program name excluded.
pub fn parse_args<I>(args: I) -> Result<Command, Box<dyn std::error::Error>>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut config = None;
    let mut format = InputFormat::Canonical;
    let mut teams = Vec::new();
    let mut interactive = false;
    let mut json = false;
    let mut canonical_out = None;
    let mut input: Option<PathBuf> = None;

    while let Some(a) = args.next() {
        match a.as_str() {
            "--config" => config = Some(PathBuf::from(args.next().ok_or("Missing value for --config")?)),
            "--raw" => format = InputFormat::Raw,
            "-t" | "--team" => teams.push(args.next().ok_or("Missing team name")?),
            "-i" | "--interactive" => interactive = true,
            "--json" => json = true,
            "--canonical-out" => {
                canonical_out = Some(PathBuf::from(
                    args.next().ok_or("Missing value for --canonical-out")?,
                ))
            }
            "-h" | "--help" => return Ok(Command::Help),
            flag if flag.starts_with('-') => return Err(format!("Unknown arg: {}", flag).into()),
            path => {
                if input.is_some() {
                    return Err(format!("Unexpected extra input: {}", path).into());
                }
                input = Some(PathBuf::from(path));
            }
        }
    }

    let input = input.ok_or("Missing INPUT file")?;
    Ok(Command::Run(CliArgs {
        config,
        format,
        teams,
        interactive,
        json,
        canonical_out,
        input,
    }))
}
