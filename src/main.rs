use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use kdt_settings::SettingsStore;
use tracing_subscriber::EnvFilter;

mod error;
mod overrides;
mod place;

use error::{CliError, ErrorCode};
use place::PlaceArgs;

#[derive(Parser)]
#[command(
    name = "kdt-placer",
    version,
    about = "Place keyboard switch footprints from a KDT layout export"
)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file to use instead of the per-user one
    #[arg(long, value_name = "PATH", global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute placements and apply them to a board file
    Place(PlaceArgs),
    /// Check that a layout file parses into keys
    Validate {
        #[arg(value_name = "LAYOUT")]
        layout: PathBuf,
    },
    /// Show the effective settings and where they are stored
    Settings {
        /// Delete the settings file and show the defaults
        #[arg(long)]
        reset: bool,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(ErrorCode::Usage as u8)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.code as u8)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let store = match cli.settings {
        Some(path) => SettingsStore::at(path),
        None => SettingsStore::default_location()?,
    };

    match cli.command {
        Command::Place(args) => place::run_place(args, &store),
        Command::Validate { layout } => place::run_validate(&layout),
        Command::Settings { reset } => place::run_settings(&store, reset),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
