use std::error::Error;
use std::fs;
use std::io;

use standings_trend::cli::{self, Command, USAGE};
use standings_trend::config::load_config_or_default;
use standings_trend::ingest::load_standings;
use standings_trend::logging::{self, Stage};
use standings_trend::report::{print_summary, run_analysis};
use standings_trend::session::run_configured_session;

fn main() {
    if let Err(e) = run() {
        logging::error(Stage::System, None, &e.to_string());
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = match cli::parse_args(std::env::args().skip(1))? {
        Command::Help => {
            eprintln!("{}", USAGE);
            return Ok(());
        }
        Command::Run(args) => args,
    };

    let config = load_config_or_default(args.config.as_deref())?;
    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );
    logging::info(
        Stage::System,
        None,
        &format!("Reading {}", args.input.display()),
    );

    let text = fs::read_to_string(&args.input)
        .map_err(|e| format!("Cannot read {}: {}", args.input.display(), e))?;
    let loaded = load_standings(&text, args.format);

    if let Some(path) = &args.canonical_out {
        fs::write(path, &loaded.canonical)
            .map_err(|e| format!("Cannot write {}: {}", path.display(), e))?;
        logging::info(
            Stage::System,
            None,
            &format!("Wrote canonical standings to {}", path.display()),
        );
    }

    let report = run_analysis(&loaded, &config, &args.teams)?;
    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print_summary(&report)?;
    }

    if args.interactive {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        run_configured_session(stdin.lock(), &mut stdout, &loaded, &config)?;
    }
    Ok(())
}
