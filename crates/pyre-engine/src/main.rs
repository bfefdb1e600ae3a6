//! Command-line runner for Pyre levels.
//!
//! Loads a level layout and an instruction list, runs the program the way
//! the game would, and prints a JSON report of the outcome to stdout.
//!
//! # Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load configuration from `pyre-config.yaml` (defaults if missing)
//! 3. Initialize structured logging (tracing)
//! 4. Load the level and build the session
//! 5. Load the instruction list
//! 6. Create the run control and hook Ctrl-C to it
//! 7. Run the program
//! 8. Log the result and print the report

mod error;
mod observer_callback;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use pyre_core::config::{self, PyreConfig};
use pyre_core::runner::{self, RunResult};
use pyre_core::{InstructionList, RunControl, Session};
use pyre_types::{AgentId, GridPos, RunEvent};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::observer_callback::ReportCallback;

#[derive(Debug, Parser)]
#[command(name = "pyre-engine")]
#[command(about = "Run a Pyre instruction list against a level and report the outcome")]
struct Cli {
    /// Level layout (YAML)
    level: PathBuf,

    /// Instruction list (YAML, or JSON with a `.json` extension)
    program: PathBuf,

    /// Engine configuration file
    #[arg(short, long, default_value = "pyre-config.yaml")]
    config: PathBuf,

    /// Playback speed in percent of nominal
    #[arg(long)]
    speed: Option<u32>,

    /// Do not sleep between steps
    #[arg(long)]
    fast: bool,

    /// Stop after this many engine steps (0 = unlimited)
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Leave the event trail out of the report
    #[arg(long)]
    no_events: bool,
}

/// Final position of one priest.
#[derive(Debug, Serialize)]
struct PriestReport {
    id: AgentId,
    position: GridPos,
    alive: bool,
    arrived: bool,
}

/// What the binary prints.
#[derive(Debug, Serialize)]
struct RunReport {
    level: String,
    result: RunResult,
    elapsed_ms: i64,
    reported_at: DateTime<Utc>,
    priests: Vec<PriestReport>,
    objectives_remaining: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<RunEvent>>,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if an input fails to load or the run is refused.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Parse the command line.
    let cli = Cli::parse();

    // 2. Load configuration.
    let mut config = load_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(speed) = cli.speed {
        config.run.speed_percent = speed;
    }
    if let Some(max_ticks) = cli.max_ticks {
        config.run.max_ticks = max_ticks;
    }
    if cli.fast {
        config.run.realtime = false;
    }

    // 3. Initialize structured logging.
    init_tracing(&config.logging.level, cli.json_logs);
    info!(
        step_duration_ms = config.timing.step_duration_ms,
        loop_delay_ms = config.timing.loop_delay_ms,
        max_ticks = config.run.max_ticks,
        speed_percent = config.run.speed_percent,
        realtime = config.run.realtime,
        "Configuration loaded"
    );

    // 4. Load the level.
    let layout = config::load_level(&cli.level)
        .map_err(EngineError::from)
        .with_context(|| format!("loading level {}", cli.level.display()))?;
    let mut session = Session::new(&layout, config.timing).map_err(EngineError::from)?;

    // 5. Load the program.
    let program = InstructionList::from_file(&cli.program)
        .map_err(EngineError::from)
        .with_context(|| format!("loading program {}", cli.program.display()))?;

    // 6. Create the run control.
    let control = Arc::new(RunControl::new(&config.run));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping run");
                control.request_stop();
            }
        });
    }

    // 7. Run the program.
    let mut callback = ReportCallback::new();
    let result = runner::run_program(&mut session, &program, &control, &mut callback)
        .await
        .map_err(EngineError::from)?;

    // 8. Log the result and print the report.
    runner::log_run_end(&result);
    info!(observed_steps = callback.steps(), "pyre-engine run complete");

    let report = RunReport {
        level: session.name().to_owned(),
        elapsed_ms: result
            .finished_at
            .signed_duration_since(result.started_at)
            .num_milliseconds(),
        result,
        reported_at: Utc::now(),
        priests: session
            .roster()
            .iter()
            .map(|a| PriestReport {
                id: a.id,
                position: a.position,
                alive: a.alive,
                arrived: a.arrived,
            })
            .collect(),
        objectives_remaining: session.grid().objectives_remaining(),
        events: (!cli.no_events).then(|| callback.into_events()),
    };
    let json = serde_json::to_string_pretty(&report).map_err(EngineError::from)?;
    println!("{json}");

    Ok(())
}

/// Load the engine configuration, falling back to defaults if the file
/// does not exist.
fn load_config(path: &Path) -> Result<PyreConfig, EngineError> {
    if path.exists() {
        Ok(PyreConfig::from_file(path)?)
    } else {
        let mut config = PyreConfig::default();
        config.logging.apply_env_overrides();
        Ok(config)
    }
}

/// Install the global subscriber. `level` accepts any `EnvFilter`
/// directive; an invalid one falls back to `info`.
fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
