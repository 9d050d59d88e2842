use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use kdt_layout::{inspect_layout, parse_layout_file, LayoutError};
use kdt_pcb::{
    apply_placements, compute_placements, plan_report, MemoryBoard, Outcome, PlacementReport,
};
use kdt_settings::SettingsStore;
use tracing::{info, warn};

use crate::error::CliError;
use crate::overrides::Overrides;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct PlaceArgs {
    /// KDT layout JSON; defaults to the last layout placed
    #[arg(value_name = "LAYOUT")]
    layout: Option<PathBuf>,

    /// Board file to update. Without it placements are only printed.
    #[arg(short, long, value_name = "BOARD")]
    board: Option<PathBuf>,

    /// Write the updated board here instead of overwriting BOARD
    #[arg(short, long, value_name = "PATH", requires = "board")]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Fail when any footprint could not be placed
    #[arg(long)]
    strict: bool,

    /// Do not remember this run's settings
    #[arg(long)]
    no_save: bool,

    #[command(flatten)]
    overrides: Overrides,
}

pub fn run_place(args: PlaceArgs, store: &SettingsStore) -> Result<(), CliError> {
    let saved = store.load()?;
    let mut settings = saved.clone();
    args.overrides.apply(&mut settings);

    let layout = args
        .layout
        .clone()
        .or_else(|| settings.json_file.clone())
        .ok_or_else(|| CliError::usage("no LAYOUT given and no previous layout in settings"))?;
    let layout = absolutize_path(&layout)?;
    settings.json_file = Some(layout.clone());

    // Everything fatal happens before the board is touched.
    let config = settings.to_config()?;
    let nodes = parse_layout_file(&layout)?;
    info!(keys = nodes.len(), layout = %layout.display(), "parsed layout");
    let placements = compute_placements(&nodes, &config)?;

    let report = match &args.board {
        Some(board_path) => {
            let mut board = MemoryBoard::load(board_path)?;
            let report = apply_placements(&mut board, &placements, nodes.len());
            let out = args.output.as_deref().unwrap_or(board_path);
            board.save(out)?;
            info!(path = %out.display(), flips = board.flips(), "wrote board");
            report
        }
        None => plan_report(&placements, nodes.len()),
    };

    print_report(&report, args.format)?;

    if args.strict && report.has_failures() {
        let failed = report.results.iter().filter(|r| !r.success()).count();
        return Err(CliError::placement(format!(
            "{failed} footprint(s) could not be placed"
        )));
    }

    if !args.no_save && settings != saved {
        // The board is already written; a settings failure only costs the defaults.
        if let Err(e) = store.save(&settings) {
            warn!("{e}");
        }
    }
    Ok(())
}

pub fn run_validate(layout: &Path) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(layout).map_err(|source| LayoutError::Io {
        path: layout.to_path_buf(),
        source,
    })?;
    let doc: serde_json::Value = serde_json::from_str(&raw).map_err(LayoutError::from)?;
    let summary = inspect_layout(&doc)?;
    println!("{summary}");
    Ok(())
}

pub fn run_settings(store: &SettingsStore, reset: bool) -> Result<(), CliError> {
    if reset {
        store.reset()?;
        println!("Settings reset.");
    }
    let settings = store.load()?;
    let json = serde_json::to_string_pretty(&settings)
        .context("failed to render settings")?;

    let state = if store.exists() { "" } else { " (not saved yet)" };
    println!("Settings file: {}{state}", store.path().display());
    println!("{json}");
    Ok(())
}

fn print_report(report: &PlacementReport, format: Format) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, report).context("failed to render report")?;
            writeln!(out).context("failed to write report")?;
        }
        Format::Text => {
            for r in &report.results {
                let p = &r.placement;
                let status = match &r.outcome {
                    Outcome::Planned => "planned".to_string(),
                    Outcome::Placed => "placed".to_string(),
                    Outcome::Failed { reason } => format!("failed: {reason}"),
                };
                writeln!(
                    out,
                    "{:<10} {:>10.3} {:>10.3} {:>7.2} {:<5} {status}",
                    p.reference, p.x_mm, p.y_mm, p.rotation_deg, p.side.to_string()
                )
                .context("failed to write report")?;
            }
            writeln!(out, "\n{report}").context("failed to write report")?;
        }
    }
    Ok(())
}

fn absolutize_path(p: &Path) -> Result<PathBuf, CliError> {
    if p.is_absolute() {
        return Ok(p.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| CliError::processing(e.to_string()))?;
    Ok(cwd.join(p))
}
