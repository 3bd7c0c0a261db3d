//! Roster CLI
//!
//! Runs the scripted student-record demonstration against an in-memory
//! database and prints each result to stdout. Logs go to stderr.

use clap::{Parser, ValueEnum};
use roster_core::logging_facility::{self, Profile};
use roster_store::StoreConfig;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "roster")]
#[command(about = "Roster - student-record ORM sandbox", long_about = None)]
struct Cli {
    /// Logging profile for stderr output
    #[arg(long, value_enum, default_value_t = LogProfile::Quiet)]
    log_profile: LogProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogProfile {
    /// Human-readable, debug level
    Development,
    /// JSON, info level
    Production,
    /// Warnings and errors only
    Quiet,
}

impl From<LogProfile> for Profile {
    fn from(profile: LogProfile) -> Self {
        match profile {
            LogProfile::Development => Profile::Development,
            LogProfile::Production => Profile::Production,
            LogProfile::Quiet => Profile::Quiet,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging_facility::init(cli.log_profile.into());

    let stdout = std::io::stdout();
    let result = commands::demo::execute(&mut stdout.lock(), StoreConfig::default());

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
