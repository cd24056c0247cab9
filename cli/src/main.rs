//! fleet-induction - command-line surface of the fleet induction engine
//!
//! ```text
//! fleet-induction simulate --input fleet.csv --config config.json --out runs/
//! fleet-induction rank --input fleet.csv
//! fleet-induction default-config > config.json
//! ```

mod logging;
mod table;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use fleet_induction_core::{
    records_to_trains, trains_to_rows, DayOrchestrator, DayWarning, FleetCheckpoint, FleetState,
    ImportReport, ScoringEngine, SimulationConfig,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Metro fleet induction ranking and simulation")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate the fleet day by day, writing one table per day
    Simulate {
        /// Fleet table (CSV)
        #[arg(long, required_unless_present = "resume")]
        input: Option<PathBuf>,
        /// Configuration (JSON); defaults apply to anything not named
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output directory
        #[arg(long, default_value = "out")]
        out: PathBuf,
        /// Override the number of days to simulate
        #[arg(long)]
        days: Option<usize>,
        /// Override the RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// First simulated date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Write a checkpoint here after the run
        #[arg(long)]
        checkpoint: Option<PathBuf>,
        /// Continue a run from a checkpoint instead of a fleet table
        #[arg(long, conflicts_with = "input")]
        resume: Option<PathBuf>,
    },
    /// Score and rank a fleet table without simulating
    Rank {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output table; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the default configuration as JSON
    DefaultConfig,
}

/// Contents of `warnings.json`
#[derive(Serialize)]
struct RunWarnings<'a> {
    run_id: String,
    warnings: Vec<&'a DayWarning>,
    repairs: &'a [String],
    import: Option<&'a ImportReport>,
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    let config = match path {
        Some(path) => {
            let json =
                fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            SimulationConfig::from_json(&json)
                .with_context(|| format!("loading config {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };
    Ok(config)
}

#[allow(clippy::too_many_arguments)]
fn simulate(
    input: Option<PathBuf>,
    config_path: Option<PathBuf>,
    out: PathBuf,
    days: Option<usize>,
    seed: Option<u64>,
    start_date: Option<NaiveDate>,
    checkpoint_path: Option<PathBuf>,
    resume: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(config_path.as_deref())?;
    if let Some(days) = days {
        config.days = days;
    }
    if let Some(seed) = seed {
        config.rng_seed = seed;
    }

    let mut import_report = None;
    let mut orchestrator = match (resume, input) {
        (Some(path), _) => {
            let json =
                fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            let checkpoint = FleetCheckpoint::from_json(&json)?;
            config.start_date = Some(checkpoint.state.calendar.start_date());
            info!(path = %path.display(), day = checkpoint.state.day(), "resuming from checkpoint");
            DayOrchestrator::restore(config, checkpoint)?
        }
        (None, Some(path)) => {
            let start = start_date
                .or(config.start_date)
                .unwrap_or_else(|| Local::now().date_naive());
            config.start_date = Some(start);

            let records = table::read_records(&path)?;
            let (trains, report) = records_to_trains(&records, start, &config)
                .with_context(|| format!("importing {}", path.display()))?;
            info!(
                trains = trains.len(),
                defaulted = report.total_defaulted(),
                corrected = report.total_corrected(),
                "fleet table imported"
            );
            import_report = Some(report);
            DayOrchestrator::new(config, trains)?
        }
        (None, None) => bail!("either --input or --resume is required"),
    };

    fs::create_dir_all(&out).with_context(|| format!("creating {}", out.display()))?;
    let report = orchestrator.run()?;
    for snapshot in &report.days {
        let path = out.join(format!("day-{}.csv", snapshot.day));
        table::write_rows(&path, &trains_to_rows(&snapshot.trains))?;
    }

    let warnings = RunWarnings {
        run_id: report.run_id.to_string(),
        warnings: report.warnings(),
        repairs: orchestrator.repairs(),
        import: import_report.as_ref(),
    };
    fs::write(out.join("warnings.json"), serde_json::to_string_pretty(&warnings)?)?;

    if let Some(path) = checkpoint_path {
        let json = orchestrator.checkpoint()?.to_json()?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    }

    info!(
        run_id = %report.run_id,
        days = report.days.len(),
        warnings = warnings.warnings.len(),
        out = %out.display(),
        "run complete"
    );
    Ok(())
}

fn rank(input: PathBuf, config_path: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let today = config
        .start_date
        .unwrap_or_else(|| Local::now().date_naive());

    let records = table::read_records(&input)?;
    let (trains, _) = records_to_trains(&records, today, &config)
        .with_context(|| format!("importing {}", input.display()))?;
    let (mut state, _) = FleetState::from_trains(trains, today, &config);
    ScoringEngine::new(config.mileage.service_interval_km).apply(&mut state.trains);

    let rows = trains_to_rows(&state.trains);
    match out {
        Some(path) => table::write_rows(&path, &rows)?,
        None => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for row in &rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Simulate {
            input,
            config,
            out,
            days,
            seed,
            start_date,
            checkpoint,
            resume,
        } => simulate(input, config, out, days, seed, start_date, checkpoint, resume),
        Command::Rank { input, config, out } => rank(input, config, out),
        Command::DefaultConfig => {
            println!("{}", serde_json::to_string_pretty(&SimulationConfig::default())?);
            Ok(())
        }
    }
}
