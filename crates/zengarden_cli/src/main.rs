//! Command-line entry point for the zen garden core.
//!
//! # Responsibility
//! - Probe core linkage (`ping`, `version`).
//! - Move gardens in and out of a SQLite database as export documents.
//! - Print meditation and journal summaries, and resolve navigation paths.

use clap::{value_parser, Arg, Command};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;
use zengarden_core::db::open_db;
use zengarden_core::{init_from_config, ConfigError, CoreConfig, Route, WellnessApp};

type CliResult = Result<(), Box<dyn Error>>;

fn db_arg() -> Arg {
    Arg::new("db")
        .long("db")
        .value_parser(value_parser!(PathBuf))
        .help("Path to the SQLite database file (defaults to `db_path` from the config)")
}

fn cli() -> Command {
    Command::new("zengarden")
        .version(zengarden_core::core_version())
        .about("Zen garden, meditation and journal core tools")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON configuration file"),
        )
        .subcommand(Command::new("ping").about("Check core linkage"))
        .subcommand(Command::new("version").about("Print the core version"))
        .subcommand(
            Command::new("export")
                .about("Export one garden as JSON")
                .arg(db_arg())
                .arg(Arg::new("id").long("id").required(true).help("Garden id"))
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Output file (stdout when omitted)"),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import a garden export document")
                .arg(db_arg())
                .arg(
                    Arg::new("file")
                        .long("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Export document to import"),
                ),
        )
        .subcommand(
            Command::new("stats")
                .about("Print meditation and journal summaries")
                .arg(db_arg()),
        )
        .subcommand(
            Command::new("route")
                .about("Resolve a navigation path")
                .arg(Arg::new("path").required(true).help("Path such as /journal")),
        )
}

fn load_config(path: Option<&PathBuf>) -> Result<CoreConfig, Box<dyn Error>> {
    let config = match path {
        Some(path) => CoreConfig::from_path(path)?,
        None => CoreConfig::default(),
    };
    init_from_config(&config)?;
    Ok(config)
}

fn run() -> CliResult {
    let matches = cli().get_matches();
    let config = load_config(matches.get_one::<PathBuf>("config"))?;

    match matches.subcommand() {
        Some(("ping", _)) => println!("zengarden_core ping={}", zengarden_core::ping()),
        Some(("version", _)) => {
            println!("zengarden_core version={}", zengarden_core::core_version())
        }
        Some(("export", args)) => {
            let conn = open_db(db_path(&config, args)?)?;
            let app = WellnessApp::sqlite(&conn, config)?;
            let raw_id = args.get_one::<String>("id").ok_or("missing --id")?;
            let id = Uuid::parse_str(raw_id)?;
            let json = app.gardens.export_garden_json(id)?;
            match args.get_one::<PathBuf>("out") {
                Some(out) => {
                    std::fs::write(out, json)?;
                    println!("exported {id} to {}", out.display());
                }
                None => println!("{json}"),
            }
        }
        Some(("import", args)) => {
            let conn = open_db(db_path(&config, args)?)?;
            let app = WellnessApp::sqlite(&conn, config)?;
            let json = std::fs::read_to_string(required_path(args, "file")?)?;
            let garden = app.gardens.import_garden_json(&json)?;
            println!("imported {} elements={}", garden.id, garden.element_count());
        }
        Some(("stats", args)) => {
            let conn = open_db(db_path(&config, args)?)?;
            let mood_days = config.mood_stats_days;
            let app = WellnessApp::sqlite(&conn, config)?;
            let totals = app.meditation.get_total_stats()?;
            println!("sessions={}", totals.total_sessions);
            println!("minutes={}", totals.total_minutes);
            println!("streak={}", totals.streak);
            for (mood, count) in app.journal.get_mood_stats(mood_days)? {
                println!("mood.{}={count}", mood.as_str());
            }
        }
        Some(("route", args)) => {
            let path = args.get_one::<String>("path").ok_or("missing path")?;
            println!("{}", Route::resolve(path).path());
        }
        _ => return Err("unknown command".into()),
    }
    Ok(())
}

fn db_path(config: &CoreConfig, args: &clap::ArgMatches) -> Result<PathBuf, ConfigError> {
    config.resolve_db_path(args.get_one::<PathBuf>("db").map(PathBuf::as_path))
}

fn required_path<'a>(args: &'a clap::ArgMatches, name: &str) -> Result<&'a PathBuf, String> {
    args.get_one::<PathBuf>(name)
        .ok_or_else(|| format!("missing --{name}"))
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_command module=cli status=error");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
