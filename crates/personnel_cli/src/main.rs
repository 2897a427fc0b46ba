//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `personnel_core` linkage.
//! - Print a deterministic summary of an existing store when one is given.

use clap::Parser;
use personnel_core::{
    core_version, init_logging, open_manager, Administrator, LogLevel, LogSettings, RootIdentity,
    StoreSettings,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "personnel", version, about = "Inspect a personnel store")]
struct Cli {
    /// SQLite store to summarize. Migrations run on open.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[arg(long, default_value = "info", value_parser = parse_level)]
    log_level: LogLevel,
}

fn parse_level(value: &str) -> Result<LogLevel, String> {
    LogLevel::parse(value).map_err(|err| err.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    println!("personnel_core version={}", core_version());

    if let Some(log_dir) = cli.log_dir {
        if let Err(err) = init_logging(&LogSettings::new(cli.log_level, log_dir)) {
            eprintln!("logging disabled: {err}");
        }
    }

    let Some(db) = cli.db else {
        return ExitCode::SUCCESS;
    };

    let mut manager = match open_manager(&StoreSettings::file(db), RootIdentity::default()) {
        Ok(manager) => manager,
        Err(err) => {
            eprintln!("failed to open store: {err}");
            return ExitCode::FAILURE;
        }
    };

    let root = manager.root();
    println!("root name={} email={}", root.name(), root.email());

    for league in manager.leagues() {
        let administrator = match league.administrator() {
            Administrator::Root => root.to_string(),
            Administrator::Employee(employee) => employee.to_string(),
        };
        println!(
            "league id={} name={} employees={} administrator={}",
            league.id(),
            league.name(),
            league.employee_count(),
            administrator
        );
    }

    match manager.close() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("failed to close store: {err}");
            ExitCode::FAILURE
        }
    }
}
