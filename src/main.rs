use std::io;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hbnb::console::Console;
use hbnb::construct::Database;
use hbnb::settings::{SETTINGS_FILE, Settings};

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    // stdout belongs to the shell, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(settings: &Settings) -> hbnb::Result<()> {
    let mode = settings.persistence_mode()?;
    let database = Database::new(mode.clone())?;
    info!(?mode, records = database.len(), "store loaded");
    let mut console = Console::new(database, io::stdout());
    console.cmdloop(io::stdin().lock())
}

fn main() -> ExitCode {
    let settings = match Settings::load(SETTINGS_FILE) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&settings);
    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "session ended with an error");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
